//! Frame assembly: real sample blocks to complex analysis frames.

use rustfft::num_complex::Complex;

use super::{transform::allocate_zeroed, AnalysisError};

/// Per-sample weighting applied while a frame is assembled.
///
/// Only the rectangular window ships. Tapered windows plug in here without
/// touching the rest of the pipeline.
pub trait WindowFunction: Send {
    /// Weight for sample `index` of a frame of `len` samples.
    fn coefficient(&self, index: usize, len: usize) -> f32;
}

/// Identity window: every sample passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rectangular;

impl WindowFunction for Rectangular {
    fn coefficient(&self, _index: usize, _len: usize) -> f32 {
        1.0
    }
}

/// Turns blocks of `frame_size` real samples into complex frames.
///
/// The frame storage is reused across calls and fully overwritten each time.
pub struct FrameBuffer {
    frame: Vec<Complex<f32>>,
    window: Box<dyn WindowFunction>,
}

impl FrameBuffer {
    /// # Errors
    /// - `TransformAllocation` if the frame storage cannot be allocated
    pub fn new(frame_size: usize) -> Result<Self, AnalysisError> {
        Self::with_window(frame_size, Box::new(Rectangular))
    }

    pub fn with_window(
        frame_size: usize,
        window: Box<dyn WindowFunction>,
    ) -> Result<Self, AnalysisError> {
        Ok(Self {
            frame: allocate_zeroed(frame_size)?,
            window,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame.len()
    }

    /// Embeds `block` into the frame as complex values with zero imaginary part.
    ///
    /// Samples past `frame_size` are ignored.
    ///
    /// # Errors
    /// - `ShortRead` if `block` holds fewer than `frame_size` samples
    pub fn fill(&mut self, block: &[f32]) -> Result<&[Complex<f32>], AnalysisError> {
        let len = self.frame.len();
        if block.len() < len {
            return Err(AnalysisError::ShortRead {
                expected: len,
                got: block.len(),
            });
        }

        for (i, (slot, &sample)) in self.frame.iter_mut().zip(block).enumerate() {
            *slot = Complex::new(sample * self.window.coefficient(i, len), 0.0);
        }

        Ok(&self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_embeds_real_samples() {
        let mut buffer = FrameBuffer::new(8).unwrap();
        let block: Vec<f32> = (0..8).map(|i| i as f32 * 0.1).collect();

        let frame = buffer.fill(&block).unwrap();
        assert_eq!(frame.len(), 8);
        for (c, &s) in frame.iter().zip(&block) {
            assert_eq!(c.re, s);
            assert_eq!(c.im, 0.0);
        }
    }

    #[test]
    fn test_short_block_is_rejected() {
        let mut buffer = FrameBuffer::new(1024).unwrap();
        let err = buffer.fill(&[0.5; 100]).unwrap_err();
        assert_eq!(err.stage(), "acquisition");
        match err {
            AnalysisError::ShortRead { expected, got } => {
                assert_eq!(expected, 1024);
                assert_eq!(got, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unallocatable_frame_is_reported() {
        let err = FrameBuffer::new(usize::MAX / 2).err().unwrap();
        assert_eq!(err.stage(), "transform");
        assert!(matches!(
            err,
            AnalysisError::TransformAllocation { requested } if requested == usize::MAX / 2
        ));
    }

    #[test]
    fn test_custom_window_is_applied() {
        struct Half;
        impl WindowFunction for Half {
            fn coefficient(&self, _index: usize, _len: usize) -> f32 {
                0.5
            }
        }

        let mut buffer = FrameBuffer::with_window(4, Box::new(Half)).unwrap();
        let frame = buffer.fill(&[1.0, -1.0, 2.0, 0.0]).unwrap();
        assert_eq!(frame[0].re, 0.5);
        assert_eq!(frame[1].re, -0.5);
        assert_eq!(frame[2].re, 1.0);
    }
}
