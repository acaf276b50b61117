//! The analyzer session and its run loop.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    histogram, magnitude, AnalysisError, AnalysisSettings, Calibrator, DisplayRow, FrameBuffer,
    SpectralTransform,
};
use crate::render::{FrameStatus, Renderer};
use crate::source::SampleSource;

/// Frames between periodic progress log lines.
const LOG_EVERY_FRAMES: u64 = 100;

/// Why a run loop ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source reported end-of-stream.
    EndOfStream,
    /// The stop flag was raised between frames.
    Cancelled,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub stop_reason: StopReason,
    /// Frozen `(min, max)` bounds, if calibration finished.
    pub bounds: Option<(f32, f32)>,
}

impl RunSummary {
    pub fn calibrated(&self) -> bool {
        self.bounds.is_some()
    }
}

/// One analysis session: owns the transform plan, the calibration state and
/// all per-frame scratch storage.
pub struct Analyzer {
    settings: AnalysisSettings,
    frames: FrameBuffer,
    transform: SpectralTransform,
    calibrator: Calibrator,
    magnitudes: Vec<f32>,
    rows: Vec<DisplayRow>,
    frame_index: u64,
}

impl Analyzer {
    /// Creates a session for `settings`.
    ///
    /// # Errors
    /// - `InvalidSettings` if the constants are inconsistent or out of range
    /// - `TransformAllocation` if the frame or transform memory cannot be allocated
    pub fn new(settings: AnalysisSettings) -> Result<Self, AnalysisError> {
        settings.validate()?;

        let frames = FrameBuffer::new(settings.frame_size)?;
        let transform = SpectralTransform::new(settings.fft_size, settings.slice_policy)?;
        Ok(Self {
            frames,
            calibrator: Calibrator::new(settings.calibration_steps, settings.calibration_policy),
            magnitudes: Vec::with_capacity(settings.fft_size),
            rows: Vec::with_capacity(settings.nb_bins),
            frame_index: 0,
            transform,
            settings,
        })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    /// Frames processed so far.
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Runs one block of `frame_size` samples through the pipeline and renders it.
    ///
    /// # Errors
    /// - `ShortRead` if the block is smaller than a frame
    /// - `Render` if the renderer fails
    pub fn process_block<R>(&mut self, block: &[f32], renderer: &mut R) -> Result<(), AnalysisError>
    where
        R: Renderer + ?Sized,
    {
        let frame = self.frames.fill(block)?;
        let spectrum = self.transform.process(frame);
        magnitude::convert_into(spectrum, &mut self.magnitudes);
        histogram::build_rows(&self.magnitudes, &mut self.calibrator, &self.settings, &mut self.rows);

        let status = FrameStatus {
            frame: self.frame_index,
            calibration: *self.calibrator.state(),
            calibration_steps: self.settings.calibration_steps,
        };
        renderer.render(&self.rows, &status)?;

        self.frame_index += 1;
        Ok(())
    }

    /// Pulls frames from `source` until end-of-stream, an error, or `stop` is raised.
    ///
    /// `stop` is checked between frames; a frame in progress always completes.
    ///
    /// # Errors
    /// - Any fatal `AnalysisError`; the loop never retries
    pub fn run<S, R>(&mut self, source: &mut S, renderer: &mut R, stop: &AtomicBool) -> Result<RunSummary, AnalysisError>
    where
        S: SampleSource + ?Sized,
        R: Renderer + ?Sized,
    {
        if source.sample_rate() != self.settings.sample_rate {
            tracing::warn!(
                "Source delivers {}Hz but labels assume {}Hz",
                source.sample_rate(),
                self.settings.sample_rate
            );
        }

        let stop_reason = loop {
            if stop.load(Ordering::Relaxed) {
                tracing::info!("Stop requested after {} frames", self.frame_index);
                break StopReason::Cancelled;
            }

            let block = source.read_block(self.settings.frame_size).map_err(|e| {
                tracing::error!("Sample acquisition failed: {}", e);
                AnalysisError::from(e)
            })?;
            if block.is_empty() {
                tracing::info!("End of stream after {} frames", self.frame_index);
                break StopReason::EndOfStream;
            }

            self.process_block(&block, renderer).map_err(|e| {
                tracing::error!("Frame {} failed in {} stage: {}", self.frame_index, e.stage(), e);
                e
            })?;

            if self.frame_index % LOG_EVERY_FRAMES == 0 {
                tracing::debug!("Analyzed {} frames", self.frame_index);
            }
        };

        Ok(RunSummary {
            frames: self.frame_index,
            stop_reason,
            bounds: self.calibrator.bounds(),
        })
    }
}
