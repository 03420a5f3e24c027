//! Synthetic frame generators
//!
//! Frames with known radiometric structure: a linear scene ramp scaled by
//! the exposure duration, clipped at the sensor ceiling. Short exposures
//! underexpose the ramp, long exposures saturate its bright end, which is
//! exactly the regime bracketed fusion exists for.

use crate::types::Frame;

/// Scene-radiance-to-pixel scale: a full-brightness ramp pixel reaches the
/// sensor ceiling at 12750 us.
const RAMP_RESPONSE: f32 = 1.0 / 50.0;

/// Create a frame whose pixel values ramp along the x axis, scaled by the
/// exposure as an ideal linear sensor would.
pub fn synthetic_ramp_frame(exposure_us: u64, width: u32, height: u32, channels: u32) -> Frame {
    let mut data = vec![0u8; (width * height * channels) as usize];
    let denom = (width.max(2) - 1) as f32;

    for y in 0..height {
        for x in 0..width {
            let scene = x as f32 / denom;
            let value = (scene * exposure_us as f32 * RAMP_RESPONSE).min(255.0) as u8;

            let base = ((y * width + x) * channels) as usize;
            for c in 0..channels as usize {
                data[base + c] = value;
            }
        }
    }

    Frame::new(data, width, height, channels, exposure_us, "synthetic".to_string())
}

/// Create a frame with one uniform pixel value everywhere, useful for
/// degenerate-weight cases (all saturated, all black).
pub fn synthetic_uniform_frame(
    value: u8,
    exposure_us: u64,
    width: u32,
    height: u32,
    channels: u32,
) -> Frame {
    Frame::new(
        vec![value; (width * height * channels) as usize],
        width,
        height,
        channels,
        exposure_us,
        "synthetic".to_string(),
    )
}
