/// HDR Fusion Module
///
/// Merges a validated frame set into a high-dynamic-range result in two
/// ordered stages:
/// 1. Radiance recovery: weighted per-pixel combination across exposures,
///    trusting mid-range sensor readings most
/// 2. Tone mapping: global logarithmic compression of the radiance map into
///    an 8-bit display image
///
/// A single-scale exposure fusion operator is available as an alternative
/// that blends the brackets directly without recovering radiance.
pub mod exposure_fusion;
pub mod radiance;
pub mod tonemap;

use crate::types::{FrameSet, RadianceMap, ToneMappedImage};
use serde::{Deserialize, Serialize};

pub use tonemap::{BIAS_MAX, BIAS_MIN, DEFAULT_BIAS};

/// Which merge operator the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionOperator {
    /// Radiance recovery followed by tone mapping (the HDR path)
    RadianceToneMap,
    /// Direct weighted blend of the brackets, no radiance map
    ExposureFusion,
}

impl Default for FusionOperator {
    fn default() -> Self {
        FusionOperator::RadianceToneMap
    }
}

/// Fusion parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default)]
    pub operator: FusionOperator,

    /// Tone-mapping bias control, valid in [`BIAS_MIN`], [`BIAS_MAX`].
    /// The operator clamps out-of-range values; the configuration surface
    /// rejects them before capture.
    pub bias: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            operator: FusionOperator::default(),
            bias: DEFAULT_BIAS,
        }
    }
}

/// Both artifacts of a successful HDR fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutput {
    pub radiance: RadianceMap,
    pub tone_mapped: ToneMappedImage,
}

/// HDR fusion error types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusionError {
    /// The frame set has no frames
    EmptyFrameSet,

    /// Fewer frames than the plan called for
    IncompleteFrameSet { expected: usize, got: usize },

    /// Frame layouts differ within the set
    LayoutMismatch {
        index: usize,
        expected: (u32, u32, u32),
        got: (u32, u32, u32),
    },

    /// A frame's buffer disagrees with its declared layout
    CorruptFrame {
        index: usize,
        expected_bytes: usize,
        got_bytes: usize,
    },
}

impl std::fmt::Display for FusionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFrameSet => write!(f, "frame set is empty"),
            Self::IncompleteFrameSet { expected, got } => {
                write!(f, "incomplete frame set: expected {}, got {}", expected, got)
            }
            Self::LayoutMismatch {
                index,
                expected,
                got,
            } => {
                write!(
                    f,
                    "frame {} layout mismatch: expected {}x{}x{}, got {}x{}x{}",
                    index, expected.0, expected.1, expected.2, got.0, got.1, got.2
                )
            }
            Self::CorruptFrame {
                index,
                expected_bytes,
                got_bytes,
            } => {
                write!(
                    f,
                    "frame {} corrupt: {} bytes, expected {}",
                    index, got_bytes, expected_bytes
                )
            }
        }
    }
}

impl std::error::Error for FusionError {}

/// Stateless fusion engine: a pure function of its frame set input plus
/// configuration. Fusing the same set twice yields bit-identical artifacts.
#[derive(Debug, Clone, Default)]
pub struct HdrFusionEngine {
    config: FusionConfig,
}

impl HdrFusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Run the HDR path: radiance recovery, then tone mapping.
    pub fn fuse(&self, frames: &FrameSet) -> Result<FusionOutput, FusionError> {
        validate_frame_set(frames)?;

        log::debug!(
            "Fusing {} frames ({}x{}x{}) with bias {}",
            frames.len(),
            frames.first().map(|f| f.width).unwrap_or(0),
            frames.first().map(|f| f.height).unwrap_or(0),
            frames.first().map(|f| f.channels).unwrap_or(0),
            self.config.bias
        );

        let radiance = radiance::recover_radiance(frames);
        let tone_mapped = tonemap::tone_map(&radiance, self.config.bias);

        Ok(FusionOutput {
            radiance,
            tone_mapped,
        })
    }

    /// Run the exposure-fusion path: blend the brackets directly into an
    /// 8-bit image, no radiance map.
    pub fn fuse_exposures(&self, frames: &FrameSet) -> Result<ToneMappedImage, FusionError> {
        validate_frame_set(frames)?;
        Ok(exposure_fusion::blend_exposures(frames))
    }
}

/// Pre-fusion validation: completeness, layout agreement, buffer integrity.
fn validate_frame_set(frames: &FrameSet) -> Result<(), FusionError> {
    if frames.is_empty() {
        return Err(FusionError::EmptyFrameSet);
    }
    if !frames.is_complete() {
        return Err(FusionError::IncompleteFrameSet {
            expected: frames.planned_len(),
            got: frames.len(),
        });
    }

    let reference = frames.first().expect("non-empty checked above").layout();
    for (index, frame) in frames.iter().enumerate() {
        if frame.layout() != reference {
            return Err(FusionError::LayoutMismatch {
                index,
                expected: reference,
                got: frame.layout(),
            });
        }
        if frame.data.len() != frame.expected_len() {
            return Err(FusionError::CorruptFrame {
                index,
                expected_bytes: frame.expected_len(),
                got_bytes: frame.data.len(),
            });
        }
    }

    Ok(())
}
