/// Exposure fusion
///
/// Blends the bracketed frames directly into an 8-bit image using per-pixel
/// well-exposedness weights, skipping radiance recovery entirely. Single
/// scale: each output pixel is the normalized weighted average of the
/// corresponding input pixels.
use crate::types::{FrameSet, ToneMappedImage};

/// Gaussian well-exposedness weight, peaking at mid-range pixel values.
const EXPOSEDNESS_SIGMA: f32 = 0.2;

#[inline]
fn well_exposedness(z: f32) -> f32 {
    let d = z - 0.5;
    (-(d * d) / (2.0 * EXPOSEDNESS_SIGMA * EXPOSEDNESS_SIGMA)).exp()
}

/// Blend a validated frame set into a display image.
///
/// Pixels where every frame is equally badly exposed (zero total weight
/// cannot occur with a Gaussian, but weights may be uniformly tiny) still
/// normalize cleanly because weights are divided by their own sum.
pub(crate) fn blend_exposures(frames: &FrameSet) -> ToneMappedImage {
    let reference = frames.first().expect("validated non-empty");
    let (width, height, channels) = reference.layout();
    let value_count = reference.expected_len();

    let mut data = vec![0u8; value_count];

    for (i, out) in data.iter_mut().enumerate() {
        let mut weight_sum = 0.0f32;
        let mut blended = 0.0f32;

        for frame in frames.iter() {
            let z = frame.data[i] as f32 / 255.0;
            let w = well_exposedness(z);
            weight_sum += w;
            blended += w * z;
        }

        let value = blended / weight_sum;
        *out = (value * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    ToneMappedImage {
        width,
        height,
        channels,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frame;

    fn gray_frame(values: &[u8], width: u32, height: u32, exposure_us: u64) -> Frame {
        Frame::new(
            values.to_vec(),
            width,
            height,
            1,
            exposure_us,
            "test".to_string(),
        )
    }

    #[test]
    fn test_weight_peaks_at_mid_range() {
        assert!(well_exposedness(0.5) > well_exposedness(0.1));
        assert!(well_exposedness(0.5) > well_exposedness(0.9));
        assert!((well_exposedness(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_prefers_well_exposed_observation() {
        // One frame saturated, one mid-range: the blend should sit close to
        // the mid-range value.
        let set = FrameSet::from_frames(vec![
            gray_frame(&[255], 1, 1, 16000),
            gray_frame(&[128], 1, 1, 1000),
        ]);
        let image = blend_exposures(&set);
        assert!(image.data[0] < 200, "got {}", image.data[0]);
        assert!(image.data[0] > 100, "got {}", image.data[0]);
    }

    #[test]
    fn test_extreme_pixels_stay_in_range() {
        let set = FrameSet::from_frames(vec![
            gray_frame(&[0, 255, 0, 255], 2, 2, 1000),
            gray_frame(&[0, 255, 255, 0], 2, 2, 4000),
        ]);
        let image = blend_exposures(&set);
        assert_eq!(image.data.len(), 4);
        // u8 output is range-safe by construction; the blend must not panic
        // and identical extremes must reproduce themselves.
        assert_eq!(image.data[0], 0);
        assert_eq!(image.data[1], 255);
    }

    #[test]
    fn test_single_frame_identity() {
        let set = FrameSet::from_frames(vec![gray_frame(&[7, 77, 177, 250], 2, 2, 8000)]);
        let image = blend_exposures(&set);
        assert_eq!(image.data, vec![7, 77, 177, 250]);
    }
}
