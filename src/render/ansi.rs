//! In-place histogram redraw on an ANSI terminal.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveUp, Show},
    queue,
    terminal::{Clear, ClearType},
};

use super::{format_row, header_lines, FrameStatus, Renderer, LABEL_WIDTH};
use crate::analysis::DisplayRow;

/// Redraws the histogram in place using CSI cursor-up and erase-below.
///
/// Each frame is exactly `nb_bins + 2` lines: the two header lines, one row
/// per displayed bin and a status line. Before every frame except the first
/// the cursor moves up over the previous frame, which is then erased.
pub struct AnsiRenderer<W: Write> {
    out: W,
    redraw_lines: u16,
    header: (String, String),
    drawn: bool,
}

impl<W: Write> AnsiRenderer<W> {
    /// Creates a renderer for `nb_bins` bins with full-scale bars of `width`.
    pub fn new(out: W, nb_bins: usize, width: usize) -> Self {
        Self {
            out,
            redraw_lines: u16::try_from(nb_bins + 2).unwrap_or(u16::MAX),
            header: header_lines(width),
            drawn: false,
        }
    }

    /// Restores the cursor after the last frame.
    ///
    /// # Errors
    /// - If writing to the output fails
    pub fn finish(&mut self) -> io::Result<()> {
        if self.drawn {
            queue!(self.out, Show)?;
            self.out.flush()?;
            self.drawn = false;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for AnsiRenderer<W> {
    fn render(&mut self, rows: &[DisplayRow], status: &FrameStatus) -> io::Result<()> {
        if self.drawn {
            queue!(self.out, MoveUp(self.redraw_lines))?;
        } else {
            queue!(self.out, Hide)?;
            self.drawn = true;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;

        writeln!(self.out, "{}", self.header.0)?;
        writeln!(self.out, "{}", self.header.1)?;
        for row in rows {
            writeln!(self.out, "{}", format_row(row))?;
        }
        writeln!(self.out, "{:>width$} {}", "", status.summary(), width = LABEL_WIDTH - 1)?;

        self.out.flush()
    }
}

impl<W: Write> Drop for AnsiRenderer<W> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CalibrationState;

    fn rows(count: usize) -> Vec<DisplayRow> {
        (1..=count)
            .map(|bin| DisplayRow {
                bin,
                lower_hz: bin as u32 * 100,
                upper_hz: (bin as u32 + 1) * 100,
                bar_len: bin,
            })
            .collect()
    }

    fn status(frame: u64) -> FrameStatus {
        FrameStatus {
            frame,
            calibration: CalibrationState::default(),
            calibration_steps: 10,
        }
    }

    #[test]
    fn test_frame_line_count_matches_cursor_up() {
        let mut out = Vec::new();
        {
            let mut renderer = AnsiRenderer::new(&mut out, 4, 80);
            renderer.render(&rows(3), &status(0)).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('\n').count(), 6);
        assert!(!text.contains("\x1b[6A"));
        assert!(text.contains("\x1b[J"));
        assert!(text.contains("  100 -   200 Hz =\n"));
        assert!(text.contains("calibrating 0/10"));
    }

    #[test]
    fn test_redraw_moves_cursor_up() {
        let mut out = Vec::new();
        {
            let mut renderer = AnsiRenderer::new(&mut out, 32, 80);
            renderer.render(&rows(31), &status(0)).unwrap();
            renderer.render(&rows(31), &status(1)).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[34A").count(), 1);
        assert_eq!(text.matches("\x1b[J").count(), 2);

        let second = text.split("\x1b[34A").nth(1).unwrap();
        assert_eq!(second.matches('\n').count(), 34);
    }

    #[test]
    fn test_cursor_restored_on_drop() {
        let mut out = Vec::new();
        {
            let mut renderer = AnsiRenderer::new(&mut out, 4, 40);
            renderer.render(&rows(3), &status(0)).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\x1b[?25h"));
    }
}
