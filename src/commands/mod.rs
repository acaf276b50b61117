//! Application command handlers for specbars.
//!
//! # Commands
//! - `live`: Analyze the configured input device in real time
//! - `file`: Analyze a WAV file through the same pipeline
//! - `config`: Open configuration file in user's preferred editor
//! - `init_config`: Print the default configuration
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod file;
pub mod list_devices;
pub mod live;
pub mod logs;

pub use config::{handle_config, handle_init_config};
pub use file::handle_file;
pub use list_devices::handle_list_devices;
pub use live::handle_live;
pub use logs::handle_logs;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::anyhow;

use crate::analysis::{AnalysisSettings, RunSummary, StopReason};
use crate::config::SpecbarsConfig;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub device: Option<String>,
    pub sample_rate: Option<u32>,
    pub calibration_steps: Option<u64>,
}

/// Loads the config file and applies command-line overrides.
///
/// # Errors
/// - If the config file exists but cannot be read or parsed
pub(crate) fn load_config(overrides: &SessionOverrides) -> anyhow::Result<SpecbarsConfig> {
    let mut config = SpecbarsConfig::load()?;

    if let Some(device) = &overrides.device {
        config.audio.device = device.clone();
    }
    if let Some(rate) = overrides.sample_rate {
        config.audio.sample_rate = rate;
    }
    if let Some(steps) = overrides.calibration_steps {
        config.analysis.calibration_steps = steps;
    }

    Ok(config)
}

/// Returns a flag raised by SIGINT or SIGTERM.
///
/// # Errors
/// - If the signal handlers cannot be registered
pub(crate) fn stop_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;
    }
    Ok(stop)
}

pub(crate) fn log_session_start(settings: &AnalysisSettings) {
    tracing::info!(
        "Session: frame_size={}, fft_size={}, nb_bins={}, sample_rate={}Hz, calibration={} {} steps, slicing={}, width={}",
        settings.frame_size,
        settings.fft_size,
        settings.nb_bins,
        settings.sample_rate,
        settings.calibration_steps,
        settings.calibration_policy,
        settings.slice_policy,
        settings.display_width
    );
}

/// Human-readable one-line summary of a finished run.
pub(crate) fn describe_summary(summary: &RunSummary) -> String {
    let reason = match summary.stop_reason {
        StopReason::EndOfStream => "end of stream",
        StopReason::Cancelled => "stopped",
    };
    match summary.bounds {
        Some((min, max)) if min.is_finite() && max.is_finite() => format!(
            "Analyzed {} frames ({reason}), calibrated range {:.1} .. {:.1} dB",
            summary.frames, min, max
        ),
        _ => format!(
            "Analyzed {} frames ({reason}), calibration incomplete",
            summary.frames
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_summary() {
        let summary = RunSummary {
            frames: 12,
            stop_reason: StopReason::EndOfStream,
            bounds: Some((-90.0, -6.0)),
        };
        assert_eq!(
            describe_summary(&summary),
            "Analyzed 12 frames (end of stream), calibrated range -90.0 .. -6.0 dB"
        );

        let summary = RunSummary {
            frames: 0,
            stop_reason: StopReason::Cancelled,
            bounds: None,
        };
        assert_eq!(
            describe_summary(&summary),
            "Analyzed 0 frames (stopped), calibration incomplete"
        );
    }
}
