//! Bracket capture loop.
//!
//! Drives a camera session through an exposure plan, one shot per planned
//! exposure, strictly sequentially. The exposure register is changed exactly
//! once per step and is never touched while a capture is in flight.

use super::{BracketCapture, BracketError, BracketOptions, CancelToken};
use crate::session::CameraSession;
use crate::types::{ExposurePlan, Frame, FrameSet};
use std::time::Instant;

/// Capture one frame per planned exposure, in plan order.
///
/// Each shot is retried up to `options.max_retries_per_shot` times on
/// retryable capture failures (timeout, malformed frame). A shot that still
/// fails aborts the run and names the offending exposure index; the partial
/// frame set is dropped. Cancellation is honored between shots only.
pub async fn capture_exposure_sequence(
    session: &mut dyn CameraSession,
    plan: &ExposurePlan,
    options: &BracketOptions,
    cancel: &CancelToken,
) -> Result<BracketCapture, BracketError> {
    if plan.is_empty() {
        return Err(BracketError::InvalidConfig(
            "exposure plan is empty".to_string(),
        ));
    }

    log::info!(
        "Starting bracket capture on {}: {} exposures, {} retries/shot, {}ms settle",
        session.device_id(),
        plan.len(),
        options.max_retries_per_shot,
        options.settle_delay_ms
    );

    let started = Instant::now();
    let mut frames = FrameSet::for_plan(plan);
    let mut attempts_per_shot = Vec::with_capacity(plan.len());

    for (exposure_index, &exposure_us) in plan.iter().enumerate() {
        if cancel.is_cancelled() {
            log::warn!(
                "Bracket run cancelled before shot {} of {}; discarding {} captured frames",
                exposure_index + 1,
                plan.len(),
                frames.len()
            );
            return Err(BracketError::Cancelled {
                completed: exposure_index,
            });
        }

        log::debug!(
            "Setting exposure {}/{}: {} us",
            exposure_index + 1,
            plan.len(),
            exposure_us
        );

        session
            .set_exposure(exposure_us)
            .map_err(|e| BracketError::ExposureRejected {
                exposure_index,
                exposure_us,
                reason: e.to_string(),
            })?;

        // Let the exposure register settle before the shot.
        if options.settle_delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(options.settle_delay_ms)).await;
        }

        let (frame, attempts) =
            capture_shot(session, exposure_index, exposure_us, options.max_retries_per_shot)?;

        if let Some(first) = frames.first() {
            if frame.layout() != first.layout() {
                return Err(BracketError::DimensionMismatch {
                    exposure_index,
                    expected: first.layout(),
                    got: frame.layout(),
                });
            }
        }

        log::debug!(
            "Captured shot {}/{}: {}x{} ({} bytes, {} attempts)",
            exposure_index + 1,
            plan.len(),
            frame.width,
            frame.height,
            frame.data.len(),
            attempts
        );

        frames.push(frame);
        attempts_per_shot.push(attempts);
    }

    let elapsed_ms = started.elapsed().as_millis() as u64;
    log::info!(
        "Bracket capture complete: {} frames in {}ms",
        frames.len(),
        elapsed_ms
    );

    Ok(BracketCapture {
        frames,
        attempts: attempts_per_shot,
        elapsed_ms,
    })
}

/// One shot with retry policy. Returns the frame and the attempts spent.
fn capture_shot(
    session: &mut dyn CameraSession,
    exposure_index: usize,
    exposure_us: u64,
    max_retries: u32,
) -> Result<(Frame, u32), BracketError> {
    let max_attempts = max_retries + 1;

    for attempt in 1..=max_attempts {
        match session.capture_frame() {
            Ok(frame) => {
                // A frame whose buffer disagrees with its declared layout is
                // a malformed capture, subject to the same retry policy.
                if !frame.is_valid() {
                    log::warn!(
                        "Shot {} attempt {}/{}: malformed frame ({} bytes, expected {})",
                        exposure_index,
                        attempt,
                        max_attempts,
                        frame.data.len(),
                        frame.expected_len()
                    );
                    if attempt == max_attempts {
                        return Err(BracketError::ShotFailed {
                            exposure_index,
                            exposure_us,
                            attempts: attempt,
                            cause: format!(
                                "malformed frame: {} bytes, expected {}",
                                frame.data.len(),
                                frame.expected_len()
                            ),
                        });
                    }
                    continue;
                }
                return Ok((frame, attempt));
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                log::warn!(
                    "Shot {} attempt {}/{} failed: {}",
                    exposure_index,
                    attempt,
                    max_attempts,
                    e
                );
            }
            Err(e) => {
                log::error!(
                    "Shot {} failed after {} attempts: {}",
                    exposure_index,
                    attempt,
                    e
                );
                return Err(BracketError::ShotFailed {
                    exposure_index,
                    exposure_us,
                    attempts: attempt,
                    cause: e.to_string(),
                });
            }
        }
    }

    unreachable!("retry loop returns on every path")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session::ScriptedSession;

    fn options_no_settle(retries: u32) -> BracketOptions {
        BracketOptions {
            max_retries_per_shot: retries,
            settle_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_capture_in_plan_order() {
        let mut session = ScriptedSession::new(8, 8, 1);
        let plan = ExposurePlan::new(vec![16000, 1000, 4000]).unwrap();
        let cancel = CancelToken::new();

        let result =
            capture_exposure_sequence(&mut session, &plan, &options_no_settle(0), &cancel)
                .await
                .unwrap();

        assert_eq!(result.frames.len(), 3);
        assert_eq!(result.attempts, vec![1, 1, 1]);
        assert_eq!(session.set_exposure_calls, vec![16000, 1000, 4000]);
        // Frames carry the exposure they were captured at, in plan order.
        let exposures: Vec<u64> = result.frames.iter().map(|f| f.exposure_us).collect();
        assert_eq!(exposures, vec![16000, 1000, 4000]);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let mut session = ScriptedSession::new(8, 8, 1).fail_n_times(4000, 2);
        let plan = ExposurePlan::new(vec![1000, 4000]).unwrap();
        let cancel = CancelToken::new();

        let result =
            capture_exposure_sequence(&mut session, &plan, &options_no_settle(3), &cancel)
                .await
                .unwrap();

        assert_eq!(result.attempts, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_exposure_rejected_names_index() {
        let mut session = ScriptedSession::new(8, 8, 1).with_exposure_range(500, 8000);
        let plan = ExposurePlan::new(vec![1000, 16000]).unwrap();
        let cancel = CancelToken::new();

        let err = capture_exposure_sequence(&mut session, &plan, &options_no_settle(0), &cancel)
            .await
            .unwrap_err();

        match err {
            BracketError::ExposureRejected {
                exposure_index,
                exposure_us,
                ..
            } => {
                assert_eq!(exposure_index, 1);
                assert_eq!(exposure_us, 16000);
            }
            other => panic!("expected ExposureRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_before_first_shot() {
        let mut session = ScriptedSession::new(8, 8, 1);
        let plan = ExposurePlan::new(vec![1000, 4000]).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = capture_exposure_sequence(&mut session, &plan, &options_no_settle(0), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, BracketError::Cancelled { completed: 0 }));
        assert!(session.set_exposure_calls.is_empty());
    }
}
