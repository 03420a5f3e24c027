use crate::bracket::BracketError;
use crate::fusion::FusionError;
use std::fmt;

/// Top-level error for a bracket-and-fuse run, identifying the stage that
/// failed. A failed run yields no tone-mapped image; there is no partial or
/// best-effort output path.
#[derive(Debug)]
pub enum HdrError {
    /// Invalid plan or parameters, detected before any hardware interaction.
    Configuration(String),
    /// The scheduling stage failed (exposure rejected, retries exhausted,
    /// cancelled, inconsistent frames).
    Capture(BracketError),
    /// The fusion stage failed (empty, incomplete, or mismatched frame set).
    Fusion(FusionError),
}

impl fmt::Display for HdrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HdrError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            HdrError::Capture(err) => write!(f, "Capture error: {}", err),
            HdrError::Fusion(err) => write!(f, "Fusion error: {}", err),
        }
    }
}

impl std::error::Error for HdrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HdrError::Configuration(_) => None,
            HdrError::Capture(err) => Some(err),
            HdrError::Fusion(err) => Some(err),
        }
    }
}

impl From<BracketError> for HdrError {
    fn from(err: BracketError) -> Self {
        HdrError::Capture(err)
    }
}

impl From<FusionError> for HdrError {
    fn from(err: FusionError) -> Self {
        HdrError::Fusion(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_stage() {
        let err = HdrError::Configuration("empty plan".to_string());
        assert!(err.to_string().contains("Configuration"));

        let err = HdrError::Fusion(FusionError::EmptyFrameSet);
        assert!(err.to_string().contains("Fusion"));
    }

    #[test]
    fn test_capture_error_wraps_cause() {
        let err = HdrError::from(BracketError::Cancelled { completed: 2 });
        assert!(err.to_string().contains("cancelled"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
