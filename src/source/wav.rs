//! WAV file sample source.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::{mix_to_mono, SampleSource, SourceError};

/// Streams a WAV file as mono `f32` blocks.
///
/// Integer samples are scaled into `[-1, 1]` and multi-channel files are mixed
/// down by averaging. A trailing block shorter than requested is discarded so
/// the file ends with a clean end-of-stream.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    channels: usize,
    format: SampleFormat,
    int_scale: f32,
    interleaved: Vec<f32>,
}

impl WavSource<BufReader<File>> {
    /// Opens the WAV file at `path`.
    ///
    /// # Errors
    /// - If the file cannot be opened or has no valid WAV header
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::new(WavReader::open(path)?)
    }
}

impl<R: Read> WavSource<R> {
    pub fn new(reader: WavReader<R>) -> Result<Self, SourceError> {
        let spec = reader.spec();
        tracing::debug!(
            "WAV input: {}Hz, {} channels, {} bits {:?}, {} samples per channel",
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format,
            reader.duration()
        );

        let int_scale = match spec.sample_format {
            SampleFormat::Int => 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32,
            SampleFormat::Float => 1.0,
        };

        Ok(Self {
            channels: spec.channels as usize,
            format: spec.sample_format,
            int_scale,
            interleaved: Vec::new(),
            reader,
        })
    }
}

impl<R: Read> SampleSource for WavSource<R> {
    fn read_block(&mut self, count: usize) -> Result<Vec<f32>, SourceError> {
        let wanted = count * self.channels.max(1);
        self.interleaved.clear();

        match self.format {
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(wanted) {
                    self.interleaved.push(sample?);
                }
            }
            SampleFormat::Int => {
                for sample in self.reader.samples::<i32>().take(wanted) {
                    self.interleaved.push(sample? as f32 * self.int_scale);
                }
            }
        }

        let mut block = Vec::with_capacity(count);
        mix_to_mono(&self.interleaved, self.channels, &mut block);

        if block.len() < count {
            if !block.is_empty() {
                tracing::debug!(
                    "Discarding {} trailing samples (less than one frame)",
                    block.len()
                );
            }
            return Ok(Vec::new());
        }

        Ok(block)
    }

    fn sample_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }
}
