//! In-memory sample source.

use std::collections::VecDeque;

use super::{SampleSource, SourceError};

/// Serves samples from a buffer, then reports end-of-stream.
///
/// Blocks are cut from the front of the buffer, so the last block may be short.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: VecDeque<f32>,
    sample_rate: u32,
}

impl MemorySource {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// A source playing a sine of `frequency` Hz for `frames` blocks of `frame_size`.
    pub fn sine(frequency: f32, amplitude: f32, sample_rate: u32, frame_size: usize, frames: usize) -> Self {
        let step = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
        let samples = (0..frame_size * frames)
            .map(|i| amplitude * (step * i as f32).sin())
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleSource for MemorySource {
    fn read_block(&mut self, count: usize) -> Result<Vec<f32>, SourceError> {
        let take = count.min(self.samples.len());
        Ok(self.samples.drain(..take).collect())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
