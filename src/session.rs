//! Camera session boundary.
//!
//! The core never opens cameras itself; device discovery, driver loading and
//! USB plumbing live behind this trait. A session owns exactly one open
//! handle and is driven strictly sequentially by the scheduler.

use crate::types::Frame;
use thiserror::Error;

/// Failures at the device boundary.
///
/// `Timeout` and `Corrupt` are per-shot capture failures the scheduler may
/// retry; `Device` and `Closed` are not retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The hardware rejected a request, e.g. an exposure value outside the
    /// device's supported range.
    #[error("device error: {0}")]
    Device(String),

    /// No frame arrived within the device-defined timeout.
    #[error("capture timed out: {0}")]
    Timeout(String),

    /// A frame arrived but its payload is malformed.
    #[error("corrupt frame: {0}")]
    Corrupt(String),

    /// The session handle has been closed.
    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// Whether the scheduler's per-shot retry policy applies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SessionError::Timeout(_) | SessionError::Corrupt(_))
    }
}

/// An open camera handle.
///
/// Implementations own all device timeouts; callers only ever see the
/// resulting `SessionError`. No two operations are ever issued concurrently
/// against the same session.
pub trait CameraSession: Send {
    /// Identifier of the underlying device, carried into captured frames.
    fn device_id(&self) -> &str;

    /// Change the exposure register. Fails with [`SessionError::Device`] if
    /// the value is outside the supported range, or [`SessionError::Closed`]
    /// after `close`.
    fn set_exposure(&mut self, exposure_us: u64) -> Result<(), SessionError>;

    /// Block until one frame is available or the device timeout elapses.
    fn capture_frame(&mut self) -> Result<Frame, SessionError>;

    /// Release the underlying handle. Idempotent.
    fn close(&mut self);
}
