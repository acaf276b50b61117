//! Mapping of calibrated magnitudes to labelled histogram rows.

use super::{AnalysisSettings, Calibrator};

/// One rendered line of the histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub bin: usize,
    /// Lower frequency bound in Hz.
    pub lower_hz: u32,
    /// Upper frequency bound in Hz (the next bin's lower bound).
    pub upper_hz: u32,
    /// Number of `'='` characters in the bar.
    pub bar_len: usize,
}

impl DisplayRow {
    /// Frequency range label, e.g. `862 - 1034 Hz`.
    pub fn label(&self) -> String {
        format!("{} - {} Hz", self.lower_hz, self.upper_hz)
    }

    pub fn bar(&self) -> String {
        "=".repeat(self.bar_len)
    }
}

/// Lower frequency bound of `bin`, rounded up to a whole hertz.
///
/// Computed in integer arithmetic so labels are exact for any rate.
pub fn bin_lower_hz(bin: usize, sample_rate: u32, fft_size: usize) -> u32 {
    let numerator = bin as u64 * sample_rate as u64;
    let fft_size = fft_size as u64;
    numerator.div_ceil(fft_size) as u32
}

/// Bar length for a normalized level: `floor(level * width)`, within `[0, width]`.
pub fn bar_length(level: f32, width: usize) -> usize {
    let scaled = (level.clamp(0.0, 1.0) * width as f32).floor();
    if scaled.is_nan() {
        return 0;
    }
    (scaled as usize).min(width)
}

/// Builds the rows for one frame of decibel magnitudes.
///
/// Bins `1..nb_bins` are normalized through the calibrator in order; the DC
/// bin is skipped. `rows` is cleared and refilled.
pub fn build_rows(
    magnitudes: &[f32],
    calibrator: &mut Calibrator,
    settings: &AnalysisSettings,
    rows: &mut Vec<DisplayRow>,
) {
    rows.clear();

    for bin in 1..settings.nb_bins.min(magnitudes.len()) {
        let level = calibrator.normalize(magnitudes[bin]);
        rows.push(DisplayRow {
            bin,
            lower_hz: bin_lower_hz(bin, settings.sample_rate, settings.fft_size),
            upper_hz: bin_lower_hz(bin + 1, settings.sample_rate, settings.fft_size),
            bar_len: bar_length(level, settings.display_width),
        });
    }

    calibrator.finish_frame();
}
