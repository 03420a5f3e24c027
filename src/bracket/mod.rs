/// Exposure Bracketing Module
///
/// Implements the bracketed capture loop for HDR imaging:
/// 1. Walk the exposure plan in order, setting the camera exposure per step
/// 2. Wait for the exposure to settle, then capture one frame
/// 3. Retry failed captures up to a per-shot bound
/// 4. Validate every frame against the first frame's layout
///
/// A shot that still fails after its retries aborts the whole run; partial
/// frame sets are discarded, never fused.
pub mod capture;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::FrameSet;

/// Scheduler knobs for one bracket run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketOptions {
    /// Retries per shot after the first attempt fails (0 = one attempt only)
    pub max_retries_per_shot: u32,

    /// Delay between setting exposure and capturing (ms), letting the
    /// exposure register settle before the shot
    pub settle_delay_ms: u64,
}

impl Default for BracketOptions {
    fn default() -> Self {
        Self {
            max_retries_per_shot: 3,
            settle_delay_ms: 100,
        }
    }
}

/// Result of a completed bracket run: the plan-aligned frame set plus
/// per-shot capture metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketCapture {
    /// One frame per planned exposure, in plan order
    pub frames: FrameSet,

    /// Attempts spent on each shot (1 = first try succeeded)
    pub attempts: Vec<u32>,

    /// Wall-clock capture time (ms)
    pub elapsed_ms: u64,
}

/// Signals a running scheduler to stop before its next exposure change.
///
/// Cancellation is only observed between shots, never mid-capture; the
/// partially accumulated frame set is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Bracket scheduling error types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BracketError {
    /// Invalid scheduler input
    InvalidConfig(String),

    /// The device rejected an exposure change
    ExposureRejected {
        exposure_index: usize,
        exposure_us: u64,
        reason: String,
    },

    /// A shot failed after exhausting its retries
    ShotFailed {
        exposure_index: usize,
        exposure_us: u64,
        attempts: u32,
        cause: String,
    },

    /// A captured frame's layout differs from the first frame's
    DimensionMismatch {
        exposure_index: usize,
        expected: (u32, u32, u32),
        got: (u32, u32, u32),
    },

    /// The run was cancelled between shots
    Cancelled { completed: usize },
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Self::ExposureRejected {
                exposure_index,
                exposure_us,
                reason,
            } => {
                write!(
                    f,
                    "Exposure {} ({} us) rejected by device: {}",
                    exposure_index, exposure_us, reason
                )
            }
            Self::ShotFailed {
                exposure_index,
                exposure_us,
                attempts,
                cause,
            } => {
                write!(
                    f,
                    "Shot {} ({} us) failed after {} attempts: {}",
                    exposure_index, exposure_us, attempts, cause
                )
            }
            Self::DimensionMismatch {
                exposure_index,
                expected,
                got,
            } => {
                write!(
                    f,
                    "Frame {} layout mismatch: expected {}x{}x{}, got {}x{}x{}",
                    exposure_index, expected.0, expected.1, expected.2, got.0, got.1, got.2
                )
            }
            Self::Cancelled { completed } => {
                write!(f, "Run cancelled after {} completed shots", completed)
            }
        }
    }
}

impl std::error::Error for BracketError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = BracketOptions::default();
        assert_eq!(options.max_retries_per_shot, 3);
        assert_eq!(options.settle_delay_ms, 100);
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_error_display() {
        let err = BracketError::ShotFailed {
            exposure_index: 2,
            exposure_us: 16000,
            attempts: 4,
            cause: "capture timed out".to_string(),
        };
        assert!(err.to_string().contains("Shot 2"));
        assert!(err.to_string().contains("4 attempts"));

        let err = BracketError::DimensionMismatch {
            exposure_index: 1,
            expected: (640, 480, 1),
            got: (320, 240, 1),
        };
        assert!(err.to_string().contains("layout mismatch"));
        assert!(err.to_string().contains("640x480x1"));
    }
}
