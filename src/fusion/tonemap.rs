/// Tone mapping
///
/// Compresses an unbounded radiance map into an 8-bit display image with a
/// global logarithmic operator in the style of Drago et al. Brightness
/// response is steered by a single bias control; lower bias lifts shadows,
/// bias 1.0 is a plain logarithmic curve.
use crate::types::{RadianceMap, ToneMappedImage};

pub const BIAS_MIN: f32 = 0.05;
pub const BIAS_MAX: f32 = 1.0;
pub const DEFAULT_BIAS: f32 = 0.85;

/// Clamp a bias control into the operator's valid interval.
pub fn clamp_bias(bias: f32) -> f32 {
    if bias.is_nan() {
        return DEFAULT_BIAS;
    }
    bias.clamp(BIAS_MIN, BIAS_MAX)
}

/// Tone-map a radiance map into the displayable range.
///
/// Out-of-interval bias values are clamped, not rejected. Output dimensions
/// equal the input's and every channel is clipped to [0, 255]; non-finite or
/// non-positive input luminance maps to black rather than propagating NaN.
pub fn tone_map(radiance: &RadianceMap, bias: f32) -> ToneMappedImage {
    let bias = clamp_bias(bias);
    let channels = radiance.channels as usize;
    let pixel_count = radiance.width as usize * radiance.height as usize;

    let mut data = vec![0u8; radiance.data.len()];

    // World luminance per pixel and its maximum.
    let mut luminance = vec![0.0f32; pixel_count];
    let mut max_luminance = 0.0f32;
    for (pixel, lum) in luminance.iter_mut().enumerate() {
        let base = pixel * channels;
        let lw = if channels == 3 {
            0.299 * radiance.data[base]
                + 0.587 * radiance.data[base + 1]
                + 0.114 * radiance.data[base + 2]
        } else {
            radiance.data[base]
        };
        *lum = if lw.is_finite() && lw > 0.0 { lw } else { 0.0 };
        max_luminance = max_luminance.max(*lum);
    }

    // All-black radiance maps to an all-black image.
    if max_luminance <= 0.0 {
        return ToneMappedImage {
            width: radiance.width,
            height: radiance.height,
            channels: radiance.channels,
            data,
        };
    }

    let bias_exponent = bias.ln() / 0.5f32.ln();
    let scale = std::f32::consts::LN_10 / (max_luminance + 1.0).ln();

    for pixel in 0..pixel_count {
        let lw = luminance[pixel];
        if lw <= 0.0 {
            continue;
        }

        let denom = (2.0 + 8.0 * (lw / max_luminance).powf(bias_exponent)).ln();
        let ld = (scale * (lw + 1.0).ln() / denom).clamp(0.0, 1.0);
        let gain = ld / lw;

        let base = pixel * channels;
        for c in 0..channels {
            let value = radiance.data[base + c].max(0.0) * gain * 255.0;
            data[base + c] = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    ToneMappedImage {
        width: radiance.width,
        height: radiance.height,
        channels: radiance.channels,
        data,
    }
}
