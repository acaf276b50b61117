//! Renderer that records frames instead of drawing them.

use std::io;

use super::{FrameStatus, Renderer};
use crate::analysis::DisplayRow;

/// One captured histogram frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub rows: Vec<DisplayRow>,
    pub status: FrameStatus,
}

impl RecordedFrame {
    /// Row for `bin`, if it was displayed.
    pub fn row(&self, bin: usize) -> Option<&DisplayRow> {
        self.rows.iter().find(|row| row.bin == bin)
    }
}

/// Keeps every rendered frame in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    pub frames: Vec<RecordedFrame>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl Renderer for MemoryRenderer {
    fn render(&mut self, rows: &[DisplayRow], status: &FrameStatus) -> io::Result<()> {
        self.frames.push(RecordedFrame {
            rows: rows.to_vec(),
            status: *status,
        });
        Ok(())
    }
}
