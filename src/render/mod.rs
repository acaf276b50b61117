//! Histogram output.
//!
//! The pipeline hands every frame to a [`Renderer`]. [`AnsiRenderer`] redraws
//! the chart in place on a terminal; [`MemoryRenderer`] records the rows for
//! tests.

pub mod ansi;
pub mod memory;

pub use ansi::AnsiRenderer;
pub use memory::{MemoryRenderer, RecordedFrame};

use std::io;

use crate::analysis::{CalibrationState, DisplayRow};

/// Width of the frequency label column, e.g. `  862 -  1034 Hz `.
pub const LABEL_WIDTH: usize = 17;

/// Per-frame context shown alongside the rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStatus {
    /// Zero-based index of the frame in the run.
    pub frame: u64,
    pub calibration: CalibrationState,
    pub calibration_steps: u64,
}

impl FrameStatus {
    pub fn is_calibrating(&self) -> bool {
        self.calibration.samples_seen < self.calibration_steps
    }

    /// One-line summary of the calibration state.
    pub fn summary(&self) -> String {
        if self.is_calibrating() {
            format!(
                "calibrating {}/{}",
                self.calibration.samples_seen, self.calibration_steps
            )
        } else if self.calibration.observed_min.is_finite() && self.calibration.observed_max.is_finite() {
            format!(
                "range {:.1} .. {:.1} dB",
                self.calibration.observed_min, self.calibration.observed_max
            )
        } else {
            "uncalibrated".to_string()
        }
    }
}

/// Destination for rendered histogram frames.
pub trait Renderer {
    /// Draws one frame of rows.
    ///
    /// # Errors
    /// - If writing to the output fails
    fn render(&mut self, rows: &[DisplayRow], status: &FrameStatus) -> io::Result<()>;
}

/// Formats a row as its padded label followed by the bar.
pub fn format_row(row: &DisplayRow) -> String {
    format!("{:>5} - {:>5} Hz {}", row.lower_hz, row.upper_hz, row.bar())
}

/// The two header lines: the 0-100 scale and the axis ruler.
///
/// Ticks sit at 0, 25, 50, 75 and 100 percent of `width` past the label column.
pub fn header_lines(width: usize) -> (String, String) {
    let len = LABEL_WIDTH + width + 1;
    let mut scale = vec![' '; len];
    let mut ruler = vec![' '; len];

    for col in ruler.iter_mut().skip(LABEL_WIDTH) {
        *col = '-';
    }

    for (k, label) in ["0", "25", "50", "75", "100"].iter().enumerate() {
        let tick = LABEL_WIDTH + k * width / 4;
        ruler[tick] = '|';

        // The first label starts at its tick, the others end on theirs.
        let start = if k == 0 {
            tick
        } else {
            (tick + 1).saturating_sub(label.len())
        };
        for (offset, ch) in label.chars().enumerate() {
            if let Some(slot) = scale.get_mut(start + offset) {
                *slot = ch;
            }
        }
    }

    (scale.into_iter().collect(), ruler.into_iter().collect())
}
