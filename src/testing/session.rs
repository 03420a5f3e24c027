//! Scripted camera session
//!
//! A fake [`CameraSession`] with programmable failures, letting tests drive
//! the scheduler through retries, device rejections, and layout mismatches
//! deterministically. Captures produce synthetic ramp frames at whatever
//! exposure was last set.

use crate::session::{CameraSession, SessionError};
use crate::testing::synthetic_data::synthetic_ramp_frame;
use crate::types::Frame;
use std::collections::HashMap;

pub struct ScriptedSession {
    device_id: String,
    width: u32,
    height: u32,
    channels: u32,
    exposure_min_us: u64,
    exposure_max_us: u64,
    current_exposure_us: u64,
    closed: bool,

    /// Remaining scripted failures per exposure value
    failures_remaining: HashMap<u64, u32>,
    /// Exposures whose captures fail on every call
    fail_always: Vec<u64>,
    /// Dimension override per exposure value, for mismatch scenarios
    dimension_overrides: HashMap<u64, (u32, u32)>,

    /// Every exposure value passed to `set_exposure`, in call order
    pub set_exposure_calls: Vec<u64>,
    /// Total `capture_frame` calls
    pub capture_calls: u32,
    /// Number of `close` calls observed
    pub close_calls: u32,
}

impl ScriptedSession {
    pub fn new(width: u32, height: u32, channels: u32) -> Self {
        Self {
            device_id: "scripted".to_string(),
            width,
            height,
            channels,
            exposure_min_us: 20,
            exposure_max_us: 1_000_000,
            current_exposure_us: 10_000,
            closed: false,
            failures_remaining: HashMap::new(),
            fail_always: Vec::new(),
            dimension_overrides: HashMap::new(),
            set_exposure_calls: Vec::new(),
            capture_calls: 0,
            close_calls: 0,
        }
    }

    /// Narrow the exposure range the fake device accepts.
    pub fn with_exposure_range(mut self, min_us: u64, max_us: u64) -> Self {
        self.exposure_min_us = min_us;
        self.exposure_max_us = max_us;
        self
    }

    /// Fail the first `n` captures at `exposure_us` with a timeout, then
    /// succeed.
    pub fn fail_n_times(mut self, exposure_us: u64, n: u32) -> Self {
        self.failures_remaining.insert(exposure_us, n);
        self
    }

    /// Fail every capture at `exposure_us` with a timeout.
    pub fn fail_always(mut self, exposure_us: u64) -> Self {
        self.fail_always.push(exposure_us);
        self
    }

    /// Return frames with different dimensions at `exposure_us`.
    pub fn mismatch_dimensions_at(mut self, exposure_us: u64, width: u32, height: u32) -> Self {
        self.dimension_overrides.insert(exposure_us, (width, height));
        self
    }
}

impl CameraSession for ScriptedSession {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn set_exposure(&mut self, exposure_us: u64) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.set_exposure_calls.push(exposure_us);

        if exposure_us < self.exposure_min_us || exposure_us > self.exposure_max_us {
            return Err(SessionError::Device(format!(
                "exposure {} us outside supported range {}..{}",
                exposure_us, self.exposure_min_us, self.exposure_max_us
            )));
        }

        self.current_exposure_us = exposure_us;
        Ok(())
    }

    fn capture_frame(&mut self) -> Result<Frame, SessionError> {
        if self.closed {
            return Err(SessionError::Closed);
        }
        self.capture_calls += 1;

        let exposure = self.current_exposure_us;
        if self.fail_always.contains(&exposure) {
            return Err(SessionError::Timeout(format!(
                "no frame at {} us",
                exposure
            )));
        }
        if let Some(remaining) = self.failures_remaining.get_mut(&exposure) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SessionError::Timeout(format!(
                    "no frame at {} us",
                    exposure
                )));
            }
        }

        let (width, height) = self
            .dimension_overrides
            .get(&exposure)
            .copied()
            .unwrap_or((self.width, self.height));

        Ok(synthetic_ramp_frame(exposure, width, height, self.channels))
    }

    fn close(&mut self) {
        self.close_calls += 1;
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_uses_last_set_exposure() {
        let mut session = ScriptedSession::new(8, 8, 1);
        session.set_exposure(4000).unwrap();
        let frame = session.capture_frame().unwrap();
        assert_eq!(frame.exposure_us, 4000);
        assert_eq!(session.capture_calls, 1);
    }

    #[test]
    fn test_out_of_range_exposure_rejected() {
        let mut session = ScriptedSession::new(8, 8, 1).with_exposure_range(100, 1000);
        let err = session.set_exposure(5000).unwrap_err();
        assert!(matches!(err, SessionError::Device(_)));
    }

    #[test]
    fn test_scripted_failures_then_success() {
        let mut session = ScriptedSession::new(8, 8, 1).fail_n_times(2000, 2);
        session.set_exposure(2000).unwrap();
        assert!(session.capture_frame().is_err());
        assert!(session.capture_frame().is_err());
        assert!(session.capture_frame().is_ok());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = ScriptedSession::new(8, 8, 1);
        session.close();
        session.close();
        assert_eq!(session.close_calls, 2);
        assert_eq!(session.set_exposure(1000), Err(SessionError::Closed));
        assert!(matches!(
            session.capture_frame(),
            Err(SessionError::Closed)
        ));
    }
}
