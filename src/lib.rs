//! hdrbracket: exposure-bracketed HDR capture and fusion for machine-vision
//! cameras.
//!
//! This crate drives a camera through an ordered list of exposure durations,
//! collects one frame per setting with bounded retries, validates the frame
//! set, and merges it into a linear radiance map plus a tone-mapped display
//! image.
//!
//! # Features
//! - Deterministic, strictly sequential exposure scheduling with per-shot
//!   retry policy and between-shot cancellation
//! - Radiance recovery with a documented mid-range weighting curve
//! - Drago-style global tone mapping and single-scale exposure fusion
//! - Pluggable camera session and output sink boundaries
//! - Scripted fake session and synthetic frames for offline testing
//!
//! # Usage
//! ```rust,ignore
//! use hdrbracket::bracket::CancelToken;
//! use hdrbracket::config::HdrConfig;
//! use hdrbracket::output::DirectorySink;
//! use hdrbracket::pipeline::run_hdr_capture;
//!
//! # async fn run(mut session: impl hdrbracket::session::CameraSession) {
//! let config = HdrConfig::load_or_default();
//! let mut sink = DirectorySink::new(&config.output.directory);
//! let cancel = CancelToken::new();
//! let result = run_hdr_capture(&mut session, &config, &mut sink, &cancel).await;
//! # }
//! ```
pub mod bracket;
pub mod config;
pub mod errors;
pub mod fusion;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod types;

// Testing utilities - synthetic data and a scripted session for offline tests
pub mod testing;

// Re-exports for convenience
pub use bracket::{BracketCapture, BracketError, BracketOptions, CancelToken};
pub use config::HdrConfig;
pub use errors::HdrError;
pub use fusion::{FusionError, FusionOperator, HdrFusionEngine};
pub use output::{Artifact, DirectorySink, OutputSink};
pub use pipeline::{run_hdr_capture, HdrCaptureResult};
pub use session::{CameraSession, SessionError};
pub use types::{ExposurePlan, Frame, FrameSet, RadianceMap, ToneMappedImage};

/// Initialize logging for the capture pipeline
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "hdrbracket=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_metadata() {
        assert_eq!(NAME, "hdrbracket");
        assert!(!VERSION.is_empty());
        assert!(!DESCRIPTION.is_empty());
    }
}
