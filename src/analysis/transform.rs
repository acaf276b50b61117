//! Forward DFT over analysis frames.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::{AnalysisError, SlicePolicy, MAX_FRAME_SIZE};

/// A planned forward transform of fixed length with its own working memory.
///
/// The plan and scratch buffer are built once and reused for every frame.
/// Output coefficients are scaled by `1 / fft_size`.
pub struct SpectralTransform {
    fft: Arc<dyn Fft<f32>>,
    slice_policy: SlicePolicy,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralTransform {
    /// Plans a forward transform of `fft_size` points.
    ///
    /// The working buffer is reserved before planning so an oversized request
    /// fails here instead of aborting inside the planner.
    ///
    /// # Errors
    /// - `TransformAllocation` if `fft_size` exceeds [`MAX_FRAME_SIZE`] or the
    ///   working buffers cannot be allocated
    pub fn new(fft_size: usize, slice_policy: SlicePolicy) -> Result<Self, AnalysisError> {
        if fft_size > MAX_FRAME_SIZE {
            return Err(AnalysisError::TransformAllocation {
                requested: fft_size,
            });
        }
        let buffer = allocate_zeroed(fft_size)?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch = allocate_zeroed(fft.get_inplace_scratch_len())?;

        tracing::debug!(
            "Planned {}-point forward transform ({} scratch values, {} slicing)",
            fft_size,
            scratch.len(),
            slice_policy
        );

        Ok(Self {
            fft,
            slice_policy,
            buffer,
            scratch,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.buffer.len()
    }

    /// Transforms the configured sub-window of `frame` and returns the spectrum.
    ///
    /// A frame shorter than the transform is zero-padded. NaN and infinite
    /// inputs propagate to the output.
    pub fn process(&mut self, frame: &[Complex<f32>]) -> &[Complex<f32>] {
        let fft_size = self.buffer.len();
        let window = select_window(frame, fft_size, self.slice_policy);

        self.buffer[..window.len()].copy_from_slice(window);
        self.buffer[window.len()..].fill(Complex::new(0.0, 0.0));

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / fft_size as f32;
        for coefficient in self.buffer.iter_mut() {
            *coefficient *= scale;
        }

        &self.buffer
    }
}

/// Picks the `fft_size` samples of `frame` that the slice policy designates.
fn select_window(frame: &[Complex<f32>], fft_size: usize, policy: SlicePolicy) -> &[Complex<f32>] {
    let len = frame.len().min(fft_size);
    match policy {
        SlicePolicy::Leading => &frame[..len],
        SlicePolicy::Trailing => &frame[frame.len() - len..],
    }
}

/// Zero-filled complex storage, reporting failure instead of aborting.
pub(super) fn allocate_zeroed(len: usize) -> Result<Vec<Complex<f32>>, AnalysisError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| AnalysisError::TransformAllocation { requested: len })?;
    values.resize(len, Complex::new(0.0, 0.0));
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real_frame(samples: &[f32]) -> Vec<Complex<f32>> {
        samples.iter().map(|&s| Complex::new(s, 0.0)).collect()
    }

    #[test]
    fn test_zero_frame_gives_zero_spectrum() {
        let mut transform = SpectralTransform::new(64, SlicePolicy::Leading).unwrap();
        let spectrum = transform.process(&real_frame(&[0.0; 64]));

        assert_eq!(spectrum.len(), 64);
        assert!(spectrum.iter().all(|c| c.norm() == 0.0));
    }

    #[test]
    fn test_impulse_gives_flat_spectrum() {
        let mut samples = [0.0f32; 64];
        samples[0] = 1.0;

        let mut transform = SpectralTransform::new(64, SlicePolicy::Leading).unwrap();
        let spectrum = transform.process(&real_frame(&samples));

        for c in spectrum {
            assert!((c.norm() - 1.0 / 64.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_delayed_impulse_is_still_flat() {
        let mut samples = [0.0f32; 64];
        samples[17] = 1.0;

        let mut transform = SpectralTransform::new(64, SlicePolicy::Leading).unwrap();
        let spectrum = transform.process(&real_frame(&samples));

        let first = spectrum[0].norm();
        assert!(spectrum.iter().all(|c| (c.norm() - first).abs() < 1e-6));
    }

    #[test]
    fn test_sine_peaks_in_its_bin() {
        let n = 64;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 5.0 * i as f32 / n as f32).sin())
            .collect();

        let mut transform = SpectralTransform::new(n, SlicePolicy::Leading).unwrap();
        let spectrum = transform.process(&real_frame(&samples));

        // A unit sine splits its amplitude between the bin and its mirror.
        assert!((spectrum[5].norm() - 0.5).abs() < 1e-4);
        assert!((spectrum[n - 5].norm() - 0.5).abs() < 1e-4);
        assert!(spectrum[3].norm() < 1e-4);
    }

    #[test]
    fn test_slice_policy_selects_sub_window() {
        let mut samples = vec![0.0f32; 256];
        samples[255] = 1.0;
        let frame = real_frame(&samples);

        let mut leading = SpectralTransform::new(64, SlicePolicy::Leading).unwrap();
        assert!(leading.process(&frame).iter().all(|c| c.norm() == 0.0));

        let mut trailing = SpectralTransform::new(64, SlicePolicy::Trailing).unwrap();
        assert!(trailing.process(&frame).iter().all(|c| c.norm() > 0.0));
    }

    #[test]
    fn test_nan_propagates() {
        let mut samples = [0.0f32; 16];
        samples[3] = f32::NAN;

        let mut transform = SpectralTransform::new(16, SlicePolicy::Leading).unwrap();
        let spectrum = transform.process(&real_frame(&samples));
        assert!(spectrum.iter().any(|c| c.re.is_nan() || c.im.is_nan()));
    }

    #[test]
    fn test_oversized_transform_is_refused() {
        let err = SpectralTransform::new(1 << 42, SlicePolicy::Leading).err().unwrap();
        assert_eq!(err.stage(), "transform");
        assert!(matches!(
            err,
            AnalysisError::TransformAllocation { requested } if requested == 1 << 42
        ));
    }

    #[test]
    fn test_failed_reservation_maps_to_allocation_error() {
        let err = allocate_zeroed(usize::MAX / 2).unwrap_err();
        assert!(matches!(err, AnalysisError::TransformAllocation { .. }));

        assert_eq!(allocate_zeroed(0).unwrap().len(), 0);
    }

    #[test]
    fn test_scratch_reuse_overwrites_previous_frame() {
        let mut transform = SpectralTransform::new(32, SlicePolicy::Leading).unwrap();
        let mut samples = [0.0f32; 32];
        samples[0] = 1.0;
        transform.process(&real_frame(&samples));

        let spectrum = transform.process(&real_frame(&[0.0; 32]));
        assert!(spectrum.iter().all(|c| c.norm() == 0.0));
    }
}
