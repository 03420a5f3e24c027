//! Output sink boundary.
//!
//! Persists intermediate bracket frames and final artifacts. File formats
//! and naming destinations are sink concerns; the pipeline only hands over
//! an artifact and an identifier. A store failure never invalidates an
//! artifact already computed in memory.

use crate::types::{Frame, ToneMappedImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Something a sink can persist.
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    /// One captured bracket frame
    Bracket(&'a Frame),
    /// The final tone-mapped image
    ToneMapped(&'a ToneMappedImage),
}

impl Artifact<'_> {
    fn layout(&self) -> (u32, u32, u32) {
        match self {
            Artifact::Bracket(frame) => frame.layout(),
            Artifact::ToneMapped(image) => (image.width, image.height, image.channels),
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Artifact::Bracket(frame) => &frame.data,
            Artifact::ToneMapped(image) => &image.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("unsupported layout: {0} channels")]
    UnsupportedLayout(u32),
}

/// Destination for captured and fused artifacts.
pub trait OutputSink {
    fn store(&mut self, artifact: Artifact<'_>, identifier: &str) -> Result<(), SinkError>;
}

/// Sink writing PNG files into a directory, one file per identifier.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn color_type(channels: u32) -> Result<image::ExtendedColorType, SinkError> {
        match channels {
            1 => Ok(image::ExtendedColorType::L8),
            3 => Ok(image::ExtendedColorType::Rgb8),
            other => Err(SinkError::UnsupportedLayout(other)),
        }
    }
}

impl OutputSink for DirectorySink {
    fn store(&mut self, artifact: Artifact<'_>, identifier: &str) -> Result<(), SinkError> {
        let (width, height, channels) = artifact.layout();
        let color = Self::color_type(channels)?;

        fs::create_dir_all(&self.root).map_err(|e| SinkError::Io(e.to_string()))?;
        let path = self.root.join(format!("{}.png", identifier));

        image::save_buffer(&path, artifact.bytes(), width, height, color).map_err(|e| match e {
            image::ImageError::IoError(io) => SinkError::Io(io.to_string()),
            other => SinkError::Encode(other.to_string()),
        })?;

        log::info!("Stored artifact: {:?}", path);
        Ok(())
    }
}
