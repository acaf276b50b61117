//! Amplitude to decibel conversion.

use rustfft::num_complex::Complex;

/// Smallest amplitude passed to the logarithm (-200 dB).
pub const MAGNITUDE_FLOOR: f32 = 1e-10;

/// Decibel value of a single coefficient: `20 * log10(|c|)`, floored.
///
/// Strictly increasing in `|c|` only for `|c| >= MAGNITUDE_FLOOR`. Anything
/// quieter, zero included, maps to the same -200 dB.
pub fn to_decibels(coefficient: Complex<f32>) -> f32 {
    20.0 * coefficient.norm().max(MAGNITUDE_FLOOR).log10()
}

/// Converts a whole spectrum into `out`, one decibel value per bin.
///
/// `out` is cleared and refilled so it can be reused across frames.
pub fn convert_into(spectrum: &[Complex<f32>], out: &mut Vec<f32>) {
    out.clear();
    out.extend(spectrum.iter().map(|&c| to_decibels(c)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_amplitude_is_zero_db() {
        assert!(to_decibels(Complex::new(1.0, 0.0)).abs() < 1e-6);
        assert!((to_decibels(Complex::new(0.1, 0.0)) + 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_is_floored() {
        let db = to_decibels(Complex::new(0.0, 0.0));
        assert!(db.is_finite());
        assert!((db + 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_flat_below_floor() {
        let floor = to_decibels(Complex::new(MAGNITUDE_FLOOR, 0.0));
        assert_eq!(to_decibels(Complex::new(1e-11, 0.0)), floor);
        assert_eq!(to_decibels(Complex::new(0.0, 1e-12)), floor);
    }

    #[test]
    fn test_monotonic_in_magnitude() {
        // Holds from the floor upwards.
        let magnitudes = [MAGNITUDE_FLOOR, 1e-8, 1e-6, 1e-4, 0.003, 0.5, 0.5001, 1.0, 3.0, 250.0];
        for pair in magnitudes.windows(2) {
            let smaller = to_decibels(Complex::new(0.0, pair[0]));
            let larger = to_decibels(Complex::new(pair[1] * 0.6, pair[1] * 0.8));
            assert!(larger > smaller, "{} dB <= {} dB", larger, smaller);
        }
    }

    #[test]
    fn test_convert_into_reuses_buffer() {
        let mut out = vec![42.0; 10];
        convert_into(&[Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)], &mut out);
        assert_eq!(out.len(), 2);
        assert!(out[0].abs() < 1e-6);
    }
}
