/// Radiance recovery
///
/// Estimates per-pixel scene radiance from the multi-exposure observations.
/// Each observation contributes `z / t` (normalized pixel value over exposure
/// time) weighted by a triangular hat that peaks at mid-range values, so
/// saturated and near-zero readings are de-emphasized. When every exposure
/// lands outside the trusted range the pixel falls back to a straight average
/// of the observations, never NaN.
use crate::types::{FrameSet, RadianceMap};

/// Triangular weight over normalized pixel values: 1.0 at mid-range,
/// 0.0 at the sensor's floor and ceiling.
#[inline]
pub(crate) fn hat_weight(z: f32) -> f32 {
    1.0 - (2.0 * z - 1.0).abs()
}

/// Recover a linear radiance map from a validated frame set.
///
/// Callers must have validated the set (non-empty, consistent layout); this
/// function is total over such input. With a single frame the weighted sum
/// and the fallback both reduce to direct normalization of that frame.
pub(crate) fn recover_radiance(frames: &FrameSet) -> RadianceMap {
    let reference = frames.first().expect("validated non-empty");
    let (width, height, channels) = reference.layout();
    let value_count = reference.expected_len();

    let exposures: Vec<f32> = frames.iter().map(|f| f.exposure_seconds()).collect();
    let frame_count = frames.len() as f32;

    let mut data = vec![0.0f32; value_count];

    for (i, out) in data.iter_mut().enumerate() {
        let mut weight_sum = 0.0f32;
        let mut weighted = 0.0f32;
        let mut plain = 0.0f32;

        for (frame, &t) in frames.iter().zip(exposures.iter()) {
            let z = frame.data[i] as f32 / 255.0;
            let observation = z / t;
            let w = hat_weight(z);

            weight_sum += w;
            weighted += w * observation;
            plain += observation;
        }

        // Degenerate column: every exposure saturated or black. Fall back to
        // the straight average of the observations.
        *out = if weight_sum > 0.0 {
            weighted / weight_sum
        } else {
            plain / frame_count
        };
    }

    RadianceMap {
        width,
        height,
        channels,
        data,
    }
}
