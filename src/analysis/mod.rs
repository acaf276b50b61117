//! The spectrum analysis pipeline.
//!
//! Samples flow through [`FrameBuffer`], [`SpectralTransform`], the decibel
//! conversion in [`magnitude`], the [`Calibrator`] and finally the row mapping
//! in [`histogram`]. [`Analyzer`] owns one instance of each stage and drives
//! them frame by frame.

pub mod calibrator;
pub mod error;
pub mod frame;
pub mod histogram;
pub mod magnitude;
pub mod pipeline;
pub mod settings;
pub mod transform;

pub use calibrator::{CalibrationState, Calibrator};
pub use error::AnalysisError;
pub use frame::{FrameBuffer, Rectangular, WindowFunction};
pub use histogram::DisplayRow;
pub use pipeline::{Analyzer, RunSummary, StopReason};
pub use settings::{AnalysisSettings, CalibrationPolicy, SlicePolicy, MAX_FRAME_SIZE};
pub use transform::SpectralTransform;
