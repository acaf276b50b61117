//! Spectrum analysis of a WAV file.

use std::io;
use std::path::Path;

use anyhow::anyhow;

use crate::analysis::{AnalysisError, Analyzer};
use crate::render::AnsiRenderer;
use crate::source::{SampleSource, WavSource};

use super::{describe_summary, load_config, log_session_start, stop_flag, SessionOverrides};

/// Runs a WAV file through the analysis pipeline and prints a summary.
///
/// The file's own sample rate is used for the frequency labels.
///
/// # Errors
/// - If the file cannot be opened or decoded
/// - If the configuration is invalid
/// - If any pipeline stage fails
pub fn handle_file(path: &Path, overrides: &SessionOverrides) -> anyhow::Result<()> {
    tracing::info!("Analyzing file: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", path.display()));
    }

    let config = load_config(overrides)?;
    let mut source = WavSource::open(path).map_err(|e| {
        tracing::error!("Failed to open {}: {}", path.display(), e);
        AnalysisError::Acquisition(e)
    })?;

    if let Some(rate) = overrides.sample_rate {
        if rate != source.sample_rate() {
            tracing::warn!(
                "Ignoring requested sample rate {}Hz; file is {}Hz",
                rate,
                source.sample_rate()
            );
        }
    }

    let settings = config.settings(source.sample_rate())?;
    log_session_start(&settings);

    let stop = stop_flag()?;
    let mut renderer = AnsiRenderer::new(io::stdout().lock(), settings.nb_bins, settings.display_width);
    let mut analyzer = Analyzer::new(settings)?;

    let result = analyzer.run(&mut source, &mut renderer, &stop);
    renderer.finish()?;
    drop(renderer);

    let summary = result?;
    let description = describe_summary(&summary);
    tracing::info!("{}", description);
    println!("{description}");
    Ok(())
}
