//! Error types for the analysis pipeline.

use std::fmt;
use std::io;

use crate::source::SourceError;

/// A fatal failure in one stage of the analysis pipeline.
///
/// Every variant aborts the run loop. Degenerate calibration ranges are not
/// errors and never show up here.
#[derive(Debug)]
pub enum AnalysisError {
    /// The session constants are inconsistent or out of range.
    InvalidSettings(String),
    /// The sample source failed to deliver a block.
    Acquisition(SourceError),
    /// The sample source ended in the middle of a frame.
    ShortRead { expected: usize, got: usize },
    /// Working memory for the transform could not be allocated.
    TransformAllocation { requested: usize },
    /// Writing the histogram to its output failed.
    Render(io::Error),
}

impl AnalysisError {
    /// Name of the pipeline stage that failed, used in the operator diagnostic.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidSettings(_) => "configuration",
            Self::Acquisition(_) | Self::ShortRead { .. } => "acquisition",
            Self::TransformAllocation { .. } => "transform",
            Self::Render(_) => "render",
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSettings(msg) => f.write_str(msg),
            Self::Acquisition(err) => write!(f, "failed to read samples: {err}"),
            Self::ShortRead { expected, got } => write!(
                f,
                "sample stream ended mid-frame: expected {expected} samples, got {got}"
            ),
            Self::TransformAllocation { requested } => write!(
                f,
                "could not allocate {requested} complex values of transform scratch memory"
            ),
            Self::Render(err) => write!(f, "failed to write histogram: {err}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Acquisition(err) => Some(err),
            Self::Render(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for AnalysisError {
    fn from(err: SourceError) -> Self {
        Self::Acquisition(err)
    }
}

impl From<io::Error> for AnalysisError {
    fn from(err: io::Error) -> Self {
        Self::Render(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let short = AnalysisError::ShortRead { expected: 1024, got: 10 };
        assert_eq!(short.stage(), "acquisition");
        assert!(short.to_string().contains("expected 1024"));

        let alloc = AnalysisError::TransformAllocation { requested: 64 };
        assert_eq!(alloc.stage(), "transform");

        let render: AnalysisError = io::Error::other("closed").into();
        assert_eq!(render.stage(), "render");

        let settings = AnalysisError::InvalidSettings("nb_bins too large".to_string());
        assert_eq!(settings.stage(), "configuration");
    }
}
