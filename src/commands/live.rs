//! Live spectrum analysis of an audio input device.

use std::io;

use crate::analysis::{AnalysisError, Analyzer};
use crate::render::AnsiRenderer;
use crate::source::{CaptureSource, SampleSource};

use super::{describe_summary, load_config, log_session_start, stop_flag, SessionOverrides};

/// Captures from the configured device and redraws the histogram until
/// interrupted.
///
/// # Errors
/// - If the configuration is invalid
/// - If the device cannot be opened
/// - If any pipeline stage fails while running
pub fn handle_live(overrides: &SessionOverrides) -> anyhow::Result<()> {
    tracing::info!("=== specbars live analyzer started ===");

    let config = load_config(overrides)?;
    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, read_timeout={}ms",
        config.audio.device,
        config.audio.sample_rate,
        config.audio.read_timeout_ms
    );

    let timeout = config.read_timeout()?;
    let mut source = CaptureSource::open(&config.audio.device, config.audio.sample_rate, timeout)
    .map_err(|e| {
        tracing::error!("Failed to open capture device: {}", e);
        AnalysisError::Acquisition(e)
    })?;

    let settings = config.settings(source.sample_rate())?;
    log_session_start(&settings);

    let stop = stop_flag()?;
    let mut renderer = AnsiRenderer::new(io::stdout().lock(), settings.nb_bins, settings.display_width);
    let mut analyzer = Analyzer::new(settings)?;

    let result = analyzer.run(&mut source, &mut renderer, &stop);
    renderer.finish()?;

    let summary = result?;
    tracing::info!("{}", describe_summary(&summary));
    Ok(())
}
