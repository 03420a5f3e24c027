//! Offline HDR capture demonstration.
//!
//! Runs the full bracket-and-fuse pipeline against the scripted synthetic
//! session, so it works on any machine with no camera attached. Reads
//! `hdrbracket.toml` from the working directory when present and writes the
//! bracket frames and fused PNG into the configured output directory.

use anyhow::{Context, Result};
use hdrbracket::bracket::CancelToken;
use hdrbracket::config::HdrConfig;
use hdrbracket::output::DirectorySink;
use hdrbracket::pipeline::run_hdr_capture;
use hdrbracket::testing::session::ScriptedSession;

#[tokio::main]
async fn main() -> Result<()> {
    hdrbracket::init_logging();

    let config = HdrConfig::load_or_default();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    log::info!(
        "Running bracket capture: {:?} us, bias {}",
        config.capture.exposures_us,
        config.fusion.bias
    );

    let mut session = ScriptedSession::new(640, 480, 1);
    let mut sink = DirectorySink::new(&config.output.directory);
    let cancel = CancelToken::new();

    let result = run_hdr_capture(&mut session, &config, &mut sink, &cancel)
        .await
        .context("bracket run failed")?;

    log::info!(
        "Fused {}x{} image in {}ms capture + {}ms fusion (attempts: {:?})",
        result.tone_mapped.width,
        result.tone_mapped.height,
        result.capture_ms,
        result.fusion_ms,
        result.attempts
    );

    if !result.storage_errors.is_empty() {
        log::warn!(
            "{} artifacts failed to store; result kept in memory",
            result.storage_errors.len()
        );
    }

    Ok(())
}
