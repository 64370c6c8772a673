//! Band-pass preprocessing for the raw intensity series.
//!
//! A 6-point moving average suppresses quantization and sensor noise, a
//! trailing 20-sample baseline subtraction removes slow illumination and
//! motion drift, and the two are blended 3:1 in favor of the
//! drift-corrected component.

/// Trailing baseline length of the high-pass stage. Filter output is only
/// defined for indices at or beyond this; earlier entries are left at 0.0
/// and are not valid peak-detection input.
pub const HP_WINDOW: usize = 20;

const LP_WINDOW: usize = 5;
const HP_WEIGHT: f32 = 0.75;
const LP_WEIGHT: f32 = 0.25;

/// Applies the combined low-pass/high-pass transform.
///
/// Returns a series the same length as the input, valid over
/// `[HP_WINDOW, n)`.
pub fn preprocess(raw: &[f32]) -> Vec<f32> {
    let n = raw.len();

    // Low-pass: moving average over the current sample and the 5 before it.
    let mut low_pass = vec![0.0f32; n];
    for i in LP_WINDOW..n {
        low_pass[i] = mean(&raw[i - LP_WINDOW..=i]);
    }

    // High-pass: subtract the trailing baseline, excluding the current
    // sample, then blend.
    let mut filtered = vec![0.0f32; n];
    for i in HP_WINDOW..n {
        let high_pass = raw[i] - mean(&raw[i - HP_WINDOW..i]);
        filtered[i] = HP_WEIGHT * high_pass + LP_WEIGHT * low_pass[i];
    }

    filtered
}

pub(crate) fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn output_matches_input_length_with_zero_prefix() {
        let raw = vec![1.0; 50];
        let filtered = preprocess(&raw);
        assert_eq!(filtered.len(), 50);
        assert!(filtered[..HP_WINDOW].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn constant_signal_keeps_only_the_smoothed_component() {
        // High-pass of a constant is zero, so the output settles at
        // 0.25 * the constant.
        let raw = vec![100.0; 60];
        let filtered = preprocess(&raw);
        for &value in &filtered[HP_WINDOW..] {
            assert_relative_eq!(value, 25.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn linear_drift_is_attenuated() {
        // On a unit-slope ramp the high-pass term is a constant 10.5, so
        // the combined output climbs at only the low-pass weight (0.25).
        let raw: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let filtered = preprocess(&raw);
        for pair in filtered[40..].windows(2) {
            assert_relative_eq!(pair[1] - pair[0], 0.25, epsilon = 1e-3);
        }
    }

    #[test]
    fn oscillation_survives_filtering() {
        let raw: Vec<f32> = (0..150)
            .map(|i| 128.0 + 10.0 * (i as f32 * std::f32::consts::TAU / 30.0).sin())
            .collect();
        let filtered = preprocess(&raw);
        let valid = &filtered[HP_WINDOW..];
        let spread = valid.iter().cloned().fold(f32::MIN, f32::max)
            - valid.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread > 5.0, "pulsatile component flattened: {spread}");
    }

    #[test]
    fn too_short_input_is_all_zero() {
        let filtered = preprocess(&[1.0; 10]);
        assert!(filtered.iter().all(|&v| v == 0.0));
    }
}
