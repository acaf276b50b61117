//! Adaptive display calibration.
//!
//! The calibrator learns the magnitude range from the first values it sees and
//! then maps every later value into `[0, 1]` against those frozen bounds.

use super::CalibrationPolicy;

/// Learned bounds and progress of one calibration run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState {
    pub observed_min: f32,
    pub observed_max: f32,
    pub samples_seen: u64,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            observed_min: f32::INFINITY,
            observed_max: f32::NEG_INFINITY,
            samples_seen: 0,
        }
    }
}

impl CalibrationState {
    fn observe(&mut self, value: f32) {
        self.observed_min = self.observed_min.min(value);
        self.observed_max = self.observed_max.max(value);
    }
}

/// Two-phase normalizer: learning, then active.
#[derive(Debug, Clone)]
pub struct Calibrator {
    state: CalibrationState,
    steps: u64,
    policy: CalibrationPolicy,
    frame_observed: bool,
}

impl Calibrator {
    pub fn new(steps: u64, policy: CalibrationPolicy) -> Self {
        Self {
            state: CalibrationState::default(),
            steps,
            policy,
            frame_observed: false,
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn is_learning(&self) -> bool {
        self.state.samples_seen < self.steps
    }

    /// Frozen `(min, max)` bounds once learning is over.
    pub fn bounds(&self) -> Option<(f32, f32)> {
        (!self.is_learning()).then_some((self.state.observed_min, self.state.observed_max))
    }

    /// Feeds one magnitude value and returns its normalized level.
    ///
    /// Returns 0 while learning. Afterwards returns a value in `[0, 1]`, or 0
    /// when the learned range has no width.
    pub fn normalize(&mut self, value: f32) -> f32 {
        if self.is_learning() {
            self.state.observe(value);
            match self.policy {
                CalibrationPolicy::PerValue => {
                    self.state.samples_seen += 1;
                    self.log_if_complete();
                }
                CalibrationPolicy::PerFrame => self.frame_observed = true,
            }
            return 0.0;
        }

        let range = self.state.observed_max - self.state.observed_min;
        if range <= 0.0 || !range.is_finite() {
            return 0.0;
        }

        let level = (value - self.state.observed_min) / range;
        if level.is_nan() {
            return 0.0;
        }
        level.clamp(0.0, 1.0)
    }

    /// Marks the end of a rendered frame.
    ///
    /// Under the per-frame policy this counts one learning step if the frame
    /// fed any values. It has no effect under the per-value policy.
    pub fn finish_frame(&mut self) {
        if self.policy == CalibrationPolicy::PerFrame && self.frame_observed && self.is_learning() {
            self.state.samples_seen += 1;
            self.log_if_complete();
        }
        self.frame_observed = false;
    }

    fn log_if_complete(&self) {
        if self.state.samples_seen == self.steps {
            tracing::info!(
                "Calibration complete after {} {} steps: min={:.2} dB, max={:.2} dB",
                self.steps,
                self.policy,
                self.state.observed_min,
                self.state.observed_max
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated(values: &[f32]) -> Calibrator {
        let mut calibrator = Calibrator::new(values.len() as u64, CalibrationPolicy::PerValue);
        for &v in values {
            assert_eq!(calibrator.normalize(v), 0.0);
        }
        calibrator
    }

    #[test]
    fn test_starts_with_sentinel_bounds() {
        let calibrator = Calibrator::new(10, CalibrationPolicy::PerValue);
        assert_eq!(calibrator.state().observed_min, f32::INFINITY);
        assert_eq!(calibrator.state().observed_max, f32::NEG_INFINITY);
        assert!(calibrator.bounds().is_none());
    }

    #[test]
    fn test_learning_tracks_bounds() {
        let values = [-12.0, 3.5, -40.0, 0.0, 7.25, -3.0];
        let mut calibrator = Calibrator::new(values.len() as u64, CalibrationPolicy::PerValue);

        for (i, &v) in values.iter().enumerate() {
            let before = calibrator.state().samples_seen;
            assert_eq!(calibrator.normalize(v), 0.0);

            let state = calibrator.state();
            assert_eq!(state.samples_seen, before + 1);
            assert_eq!(state.samples_seen, i as u64 + 1);
            for &seen in &values[..=i] {
                assert!(state.observed_min <= seen && seen <= state.observed_max);
            }
        }

        assert_eq!(calibrator.bounds(), Some((-40.0, 7.25)));
    }

    #[test]
    fn test_bounds_freeze_after_learning() {
        let mut calibrator = calibrated(&[0.0, 10.0]);
        calibrator.normalize(100.0);
        calibrator.normalize(-100.0);

        assert_eq!(calibrator.bounds(), Some((0.0, 10.0)));
        assert_eq!(calibrator.state().samples_seen, 2);
    }

    #[test]
    fn test_active_output_in_unit_range() {
        let mut calibrator = calibrated(&[-80.0, -20.0, -55.0]);
        for v in [-1000.0, -80.0, -79.9, -50.0, -20.0, 0.0, 1e9, f32::INFINITY, f32::NEG_INFINITY] {
            let level = calibrator.normalize(v);
            assert!((0.0..=1.0).contains(&level), "{v} -> {level}");
        }
        assert_eq!(calibrator.normalize(f32::NAN), 0.0);
    }

    #[test]
    fn test_midpoint_and_clamping() {
        let mut calibrator = calibrated(&[0.0, 10.0]);
        assert_eq!(calibrator.normalize(5.0), 0.5);
        assert_eq!(calibrator.normalize(10.0), 1.0);
        assert_eq!(calibrator.normalize(-5.0), 0.0);
        assert_eq!(calibrator.normalize(15.0), 1.0);
    }

    #[test]
    fn test_degenerate_range_returns_zero() {
        let mut calibrator = calibrated(&[-30.0, -30.0, -30.0, -30.0]);
        for v in [-30.0, -31.0, 0.0, 50.0] {
            let level = calibrator.normalize(v);
            assert_eq!(level, 0.0);
        }
    }

    #[test]
    fn test_zero_steps_never_learns() {
        let mut calibrator = Calibrator::new(0, CalibrationPolicy::PerValue);
        assert!(!calibrator.is_learning());
        assert_eq!(calibrator.normalize(3.0), 0.0);
    }

    #[test]
    fn test_per_frame_policy_counts_frames() {
        let mut calibrator = Calibrator::new(2, CalibrationPolicy::PerFrame);

        for v in [-10.0, -2.0, -6.0] {
            assert_eq!(calibrator.normalize(v), 0.0);
        }
        assert_eq!(calibrator.state().samples_seen, 0);
        calibrator.finish_frame();
        assert_eq!(calibrator.state().samples_seen, 1);
        assert!(calibrator.is_learning());

        for v in [-20.0, 0.0] {
            assert_eq!(calibrator.normalize(v), 0.0);
        }
        calibrator.finish_frame();
        assert!(!calibrator.is_learning());
        assert_eq!(calibrator.bounds(), Some((-20.0, 0.0)));

        assert_eq!(calibrator.normalize(-10.0), 0.5);
        calibrator.finish_frame();
        assert_eq!(calibrator.state().samples_seen, 2);
    }

    #[test]
    fn test_finish_frame_is_noop_for_per_value() {
        let mut calibrator = Calibrator::new(5, CalibrationPolicy::PerValue);
        calibrator.normalize(1.0);
        calibrator.finish_frame();
        calibrator.finish_frame();
        assert_eq!(calibrator.state().samples_seen, 1);
    }
}
