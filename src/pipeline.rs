//! Bracket-and-fuse orchestration.
//!
//! Wires the scheduler, fusion engine, and output sink together for one run:
//! capture the plan, fuse the frame set, persist artifacts. The session is
//! closed on every exit path, including failure. Store failures are reported
//! but never invalidate the in-memory result.

use crate::bracket::capture::capture_exposure_sequence;
use crate::bracket::CancelToken;
use crate::config::HdrConfig;
use crate::errors::HdrError;
use crate::fusion::{FusionOperator, HdrFusionEngine};
use crate::output::{Artifact, OutputSink, SinkError};
use crate::session::CameraSession;
use crate::types::{RadianceMap, ToneMappedImage};
use chrono::Utc;
use std::time::Instant;

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct HdrCaptureResult {
    /// The final display image
    pub tone_mapped: ToneMappedImage,

    /// The linear radiance map (absent for the exposure-fusion operator)
    pub radiance: Option<RadianceMap>,

    /// Attempts spent per shot, plan-aligned
    pub attempts: Vec<u32>,

    /// Capture stage wall-clock time (ms)
    pub capture_ms: u64,

    /// Fusion stage wall-clock time (ms)
    pub fusion_ms: u64,

    /// Store failures encountered; artifacts in memory remain valid
    pub storage_errors: Vec<SinkError>,
}

/// Run one bracket-and-fuse cycle against an open session.
///
/// The configuration is validated before the camera is touched; the session
/// is closed when the run ends, whatever the outcome.
pub async fn run_hdr_capture(
    session: &mut dyn CameraSession,
    config: &HdrConfig,
    sink: &mut dyn OutputSink,
    cancel: &CancelToken,
) -> Result<HdrCaptureResult, HdrError> {
    let result = run_inner(session, config, sink, cancel).await;
    session.close();
    result
}

async fn run_inner(
    session: &mut dyn CameraSession,
    config: &HdrConfig,
    sink: &mut dyn OutputSink,
    cancel: &CancelToken,
) -> Result<HdrCaptureResult, HdrError> {
    config.validate().map_err(HdrError::Configuration)?;
    let plan = config.exposure_plan()?;
    let options = config.bracket_options();

    let capture = capture_exposure_sequence(session, &plan, &options, cancel).await?;

    let run_id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let mut storage_errors = Vec::new();

    if config.output.save_brackets {
        for (index, frame) in capture.frames.iter().enumerate() {
            let identifier = format!(
                "{}_{}_{}_{}",
                config.output.prefix,
                run_id,
                index + 1,
                frame.exposure_us
            );
            if let Err(e) = sink.store(Artifact::Bracket(frame), &identifier) {
                log::warn!("Failed to store bracket frame {}: {}", identifier, e);
                storage_errors.push(e);
            }
        }
    }

    let engine = HdrFusionEngine::new(config.fusion_config());
    let fusion_started = Instant::now();

    let (radiance, tone_mapped) = match config.fusion.operator {
        FusionOperator::RadianceToneMap => {
            let output = engine.fuse(&capture.frames)?;
            (Some(output.radiance), output.tone_mapped)
        }
        FusionOperator::ExposureFusion => {
            let image = engine.fuse_exposures(&capture.frames)?;
            (None, image)
        }
    };

    let fusion_ms = fusion_started.elapsed().as_millis() as u64;
    log::info!(
        "Fusion complete: {}x{} in {}ms",
        tone_mapped.width,
        tone_mapped.height,
        fusion_ms
    );

    let identifier = format!("{}_{}_hdr", config.output.prefix, run_id);
    if let Err(e) = sink.store(Artifact::ToneMapped(&tone_mapped), &identifier) {
        log::warn!("Failed to store fused image {}: {}", identifier, e);
        storage_errors.push(e);
    }

    Ok(HdrCaptureResult {
        tone_mapped,
        radiance,
        attempts: capture.attempts,
        capture_ms: capture.elapsed_ms,
        fusion_ms,
        storage_errors,
    })
}
