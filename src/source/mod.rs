//! Sample sources feeding the analysis pipeline.
//!
//! A source hands out blocks of mono `f32` samples in `[-1, 1]`. An empty block
//! signals end-of-stream; a non-empty block shorter than requested is a short
//! read and ends the run with an error.

pub mod capture;
pub mod memory;
pub mod wav;

pub use capture::CaptureSource;
pub use memory::MemorySource;
pub use wav::WavSource;

use std::fmt;
use std::time::Duration;

/// Supplier of fixed-size blocks of mono samples.
pub trait SampleSource {
    /// Reads up to `count` samples, blocking until they are available.
    ///
    /// # Errors
    /// - If the underlying device or file fails
    fn read_block(&mut self, count: usize) -> Result<Vec<f32>, SourceError>;

    /// Sample rate of the delivered samples in Hz.
    fn sample_rate(&self) -> u32;
}

/// Failure reported by a sample source.
#[derive(Debug)]
pub enum SourceError {
    /// The input device could not be found or opened.
    Device(String),
    /// The running audio stream reported an error.
    Stream(String),
    /// No samples arrived within the read timeout.
    Timeout(Duration),
    /// The producer side of the stream went away.
    Disconnected,
    /// A file could not be read or decoded.
    Decode(hound::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(msg) => write!(f, "audio device error: {msg}"),
            Self::Stream(msg) => write!(f, "audio stream error: {msg}"),
            Self::Timeout(after) => {
                write!(f, "no audio received within {} ms", after.as_millis())
            }
            Self::Disconnected => write!(f, "audio stream closed unexpectedly"),
            Self::Decode(err) => write!(f, "could not decode audio file: {err}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<hound::Error> for SourceError {
    fn from(err: hound::Error) -> Self {
        Self::Decode(err)
    }
}

/// Averages interleaved frames of `channels` samples into mono.
pub(crate) fn mix_to_mono(data: &[f32], channels: usize, out: &mut Vec<f32>) {
    match channels {
        0 | 1 => out.extend_from_slice(data),
        _ => {
            for chunk in data.chunks_exact(channels) {
                let sum: f32 = chunk.iter().sum();
                out.push(sum / channels as f32);
            }
        }
    }
}
