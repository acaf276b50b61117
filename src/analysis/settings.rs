//! Analysis constants fixed for the lifetime of a session.

use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// Largest accepted `frame_size` and `fft_size` (about one million samples).
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// How the calibrator counts learning steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationPolicy {
    /// Every magnitude value fed to the calibrator is one step.
    #[default]
    PerValue,
    /// Every rendered frame is one step; all of its values update the bounds.
    PerFrame,
}

/// Which `fft_size` samples of a larger frame are transformed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlicePolicy {
    /// The first `fft_size` samples of the frame.
    #[default]
    Leading,
    /// The last `fft_size` samples of the frame (most recent audio).
    Trailing,
}

impl std::fmt::Display for CalibrationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerValue => write!(f, "per-value"),
            Self::PerFrame => write!(f, "per-frame"),
        }
    }
}

impl std::fmt::Display for SlicePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leading => write!(f, "leading"),
            Self::Trailing => write!(f, "trailing"),
        }
    }
}

/// The constants of one analyzer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Samples requested from the source per frame.
    pub frame_size: usize,
    /// Transform length, at most `frame_size`.
    pub fft_size: usize,
    /// Displayed bins including the skipped DC bin, at most `fft_size / 2`.
    pub nb_bins: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Learning steps before bounds freeze.
    pub calibration_steps: u64,
    pub calibration_policy: CalibrationPolicy,
    pub slice_policy: SlicePolicy,
    /// Character columns of a full-scale bar.
    pub display_width: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            fft_size: 64,
            nb_bins: 32,
            sample_rate: 11025,
            calibration_steps: 10,
            calibration_policy: CalibrationPolicy::default(),
            slice_policy: SlicePolicy::default(),
            display_width: 80,
        }
    }
}

impl AnalysisSettings {
    /// Checks the sizing constraints between the constants.
    ///
    /// # Errors
    /// - If any size is zero
    /// - If `frame_size` exceeds [`MAX_FRAME_SIZE`] or `fft_size > frame_size`
    /// - If `nb_bins` is below 2 or above `fft_size / 2`
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |msg: String| Err(AnalysisError::InvalidSettings(msg));

        if self.fft_size == 0 {
            return invalid("fft_size must be greater than zero".to_string());
        }
        if self.frame_size > MAX_FRAME_SIZE {
            return invalid(format!(
                "frame_size ({}) must not exceed {}",
                self.frame_size, MAX_FRAME_SIZE
            ));
        }
        if self.fft_size > self.frame_size {
            return invalid(format!(
                "fft_size ({}) must not exceed frame_size ({})",
                self.fft_size, self.frame_size
            ));
        }
        if self.nb_bins < 2 {
            return invalid("nb_bins must be at least 2 (bin 0 is never displayed)".to_string());
        }
        if self.nb_bins > self.fft_size / 2 {
            return invalid(format!(
                "nb_bins ({}) must not exceed fft_size / 2 ({})",
                self.nb_bins,
                self.fft_size / 2
            ));
        }
        if self.sample_rate == 0 {
            return invalid("sample_rate must be greater than zero".to_string());
        }
        if self.display_width == 0 {
            return invalid("display width must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Lines redrawn per frame: the two header lines plus one per bin slot.
    pub fn redraw_lines(&self) -> usize {
        self.nb_bins + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_fft_larger_than_frame() {
        let settings = AnalysisSettings {
            frame_size: 32,
            ..AnalysisSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_bins_past_nyquist() {
        let settings = AnalysisSettings {
            nb_bins: 33,
            ..AnalysisSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = AnalysisSettings {
            nb_bins: 1,
            ..AnalysisSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_frames() {
        let settings = AnalysisSettings {
            frame_size: 1 << 42,
            ..AnalysisSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.stage(), "configuration");

        let settings = AnalysisSettings {
            frame_size: MAX_FRAME_SIZE,
            fft_size: MAX_FRAME_SIZE,
            ..AnalysisSettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_policy_names_match_config_values() {
        assert_eq!(CalibrationPolicy::PerFrame.to_string(), "per-frame");
        assert_eq!(SlicePolicy::Trailing.to_string(), "trailing");
    }
}
