//! Core data types for bracketed capture and HDR fusion.

use crate::errors::HdrError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered list of target exposure durations (microseconds) for one bracket run.
///
/// A plan is fixed configuration: it is validated once, before any hardware
/// interaction, and never changes during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposurePlan {
    durations_us: Vec<u64>,
}

impl ExposurePlan {
    /// Build a plan from exposure durations in microseconds.
    ///
    /// Rejects empty plans and non-positive durations. Duplicate values are
    /// accepted but logged, since fusion is ill-conditioned when all
    /// exposures are equal.
    pub fn new(durations_us: Vec<u64>) -> Result<Self, HdrError> {
        if durations_us.is_empty() {
            return Err(HdrError::Configuration(
                "exposure plan must contain at least one duration".to_string(),
            ));
        }
        if let Some(pos) = durations_us.iter().position(|&d| d == 0) {
            return Err(HdrError::Configuration(format!(
                "exposure duration at index {} must be positive",
                pos
            )));
        }

        let mut sorted = durations_us.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() < durations_us.len() {
            log::warn!(
                "exposure plan contains duplicate durations ({} unique of {})",
                sorted.len(),
                durations_us.len()
            );
        }

        Ok(Self { durations_us })
    }

    pub fn len(&self) -> usize {
        self.durations_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations_us.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u64> {
        self.durations_us.iter()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.durations_us
    }
}

/// One captured frame: an immutable pixel buffer plus the exposure it was
/// captured at and a capture timestamp.
///
/// `data` is tightly packed row-major bytes, `channels` interleaved per pixel
/// (1 = grayscale, 3 = RGB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub exposure_us: u64,
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u32,
        exposure_us: u64,
        device_id: String,
    ) -> Self {
        Self {
            width,
            height,
            channels,
            exposure_us,
            timestamp: Utc::now(),
            device_id,
            data,
        }
    }

    /// Bytes a well-formed buffer must contain for this layout.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// True when the buffer matches the declared layout.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && (self.channels == 1 || self.channels == 3)
            && self.data.len() == self.expected_len()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Spatial dimensions plus channel count, the full layout contract a
    /// frame set enforces.
    pub fn layout(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }

    /// Exposure duration in seconds, the unit radiance recovery works in.
    pub fn exposure_seconds(&self) -> f32 {
        self.exposure_us as f32 / 1_000_000.0
    }
}

/// Ordered, validated collection of frames, index-aligned with the exposure
/// plan that produced it. Partial sets are never handed to fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSet {
    planned: usize,
    frames: Vec<Frame>,
}

impl FrameSet {
    /// An empty set that expects one frame per plan entry.
    pub fn for_plan(plan: &ExposurePlan) -> Self {
        Self {
            planned: plan.len(),
            frames: Vec::with_capacity(plan.len()),
        }
    }

    /// Wrap already-captured frames; the set is considered complete as-is.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            planned: frames.len(),
            frames,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames the originating plan called for.
    pub fn planned_len(&self) -> usize {
        self.planned
    }

    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.planned
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

/// Per-pixel linear-light estimate recovered from a frame set. Floating
/// point, unbounded above; same spatial layout as the input frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadianceMap {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<f32>,
}

impl RadianceMap {
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

/// 8-bit-per-channel display image produced by tone mapping. The final
/// artifact of a bracket run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneMappedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<u8>,
}

impl ToneMappedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
