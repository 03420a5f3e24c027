//! Bracket Scheduling Testing
//!
//! Exercises the capture loop against the scripted fake session: plan-order
//! sequencing, retry policy and exhaustion, device rejection, layout
//! mismatch, and cancellation.

use hdrbracket::bracket::{
    capture::capture_exposure_sequence, BracketError, BracketOptions, CancelToken,
};
use hdrbracket::session::CameraSession;
use hdrbracket::testing::session::ScriptedSession;
use hdrbracket::types::ExposurePlan;

fn options(max_retries: u32) -> BracketOptions {
    BracketOptions {
        max_retries_per_shot: max_retries,
        settle_delay_ms: 0,
    }
}

#[tokio::test]
async fn test_successful_run_is_plan_aligned() {
    let mut session = ScriptedSession::new(640, 480, 1);
    let plan = ExposurePlan::new(vec![1000, 4000, 16000]).unwrap();
    let cancel = CancelToken::new();

    let capture = capture_exposure_sequence(&mut session, &plan, &options(3), &cancel)
        .await
        .unwrap();

    assert_eq!(capture.frames.len(), 3);
    assert!(capture.frames.is_complete());
    assert_eq!(capture.attempts, vec![1, 1, 1]);
    assert_eq!(session.set_exposure_calls, vec![1000, 4000, 16000]);
    assert_eq!(session.capture_calls, 3);

    for (frame, &planned) in capture.frames.iter().zip(plan.iter()) {
        assert_eq!(frame.exposure_us, planned);
        assert_eq!(frame.layout(), (640, 480, 1));
        assert!(frame.is_valid());
    }
}

#[tokio::test]
async fn test_retry_exhaustion_counts_and_names_index() {
    // Deterministically failing capture at the middle exposure: the
    // scheduler must spend exactly 1 + max_retries attempts then abort.
    let mut session = ScriptedSession::new(64, 48, 1).fail_always(4000);
    let plan = ExposurePlan::new(vec![1000, 4000, 16000]).unwrap();
    let cancel = CancelToken::new();
    let max_retries = 3;

    let err = capture_exposure_sequence(&mut session, &plan, &options(max_retries), &cancel)
        .await
        .unwrap_err();

    match err {
        BracketError::ShotFailed {
            exposure_index,
            exposure_us,
            attempts,
            ref cause,
        } => {
            assert_eq!(exposure_index, 1);
            assert_eq!(exposure_us, 4000);
            assert_eq!(attempts, max_retries + 1);
            assert!(cause.contains("timed out"), "cause was: {}", cause);
        }
        other => panic!("expected ShotFailed, got {:?}", other),
    }

    // One call for the first shot, then the exhausted attempts.
    assert_eq!(session.capture_calls, 1 + max_retries + 1);
}

#[tokio::test]
async fn test_transient_failures_recover_within_budget() {
    let mut session = ScriptedSession::new(64, 48, 1)
        .fail_n_times(1000, 1)
        .fail_n_times(16000, 3);
    let plan = ExposurePlan::new(vec![1000, 4000, 16000]).unwrap();
    let cancel = CancelToken::new();

    let capture = capture_exposure_sequence(&mut session, &plan, &options(3), &cancel)
        .await
        .unwrap();

    assert_eq!(capture.attempts, vec![2, 1, 4]);
    assert_eq!(capture.frames.len(), 3);
}

#[tokio::test]
async fn test_device_rejection_aborts_with_index() {
    let mut session = ScriptedSession::new(64, 48, 1).with_exposure_range(500, 10_000);
    let plan = ExposurePlan::new(vec![1000, 4000, 16000]).unwrap();
    let cancel = CancelToken::new();

    let err = capture_exposure_sequence(&mut session, &plan, &options(3), &cancel)
        .await
        .unwrap_err();

    match err {
        BracketError::ExposureRejected {
            exposure_index,
            exposure_us,
            ref reason,
        } => {
            assert_eq!(exposure_index, 2);
            assert_eq!(exposure_us, 16000);
            assert!(reason.contains("outside supported range"));
        }
        other => panic!("expected ExposureRejected, got {:?}", other),
    }

    // Retry policy does not apply to exposure changes.
    assert_eq!(session.capture_calls, 2);
}

#[tokio::test]
async fn test_dimension_mismatch_aborts_run() {
    let mut session = ScriptedSession::new(640, 480, 1).mismatch_dimensions_at(4000, 320, 240);
    let plan = ExposurePlan::new(vec![1000, 4000]).unwrap();
    let cancel = CancelToken::new();

    let err = capture_exposure_sequence(&mut session, &plan, &options(0), &cancel)
        .await
        .unwrap_err();

    match err {
        BracketError::DimensionMismatch {
            exposure_index,
            expected,
            got,
        } => {
            assert_eq!(exposure_index, 1);
            assert_eq!(expected, (640, 480, 1));
            assert_eq!(got, (320, 240, 1));
        }
        other => panic!("expected DimensionMismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_run_discards_partial_set() {
    let mut session = ScriptedSession::new(64, 48, 1);
    let plan = ExposurePlan::new(vec![1000, 4000]).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = capture_exposure_sequence(&mut session, &plan, &options(0), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, BracketError::Cancelled { completed: 0 }));
    assert_eq!(session.capture_calls, 0);
}

#[tokio::test]
async fn test_single_entry_plan_captures_one_frame() {
    let mut session = ScriptedSession::new(64, 48, 1);
    let plan = ExposurePlan::new(vec![8000]).unwrap();
    let cancel = CancelToken::new();

    let capture = capture_exposure_sequence(&mut session, &plan, &options(0), &cancel)
        .await
        .unwrap();

    assert_eq!(capture.frames.len(), 1);
    assert!(capture.frames.is_complete());
}

#[tokio::test]
async fn test_closed_session_fails_fast() {
    let mut session = ScriptedSession::new(64, 48, 1);
    session.close();
    let plan = ExposurePlan::new(vec![1000, 4000]).unwrap();
    let cancel = CancelToken::new();

    let err = capture_exposure_sequence(&mut session, &plan, &options(3), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, BracketError::ExposureRejected { exposure_index: 0, .. }));
}
