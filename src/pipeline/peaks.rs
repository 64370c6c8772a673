//! Adaptive-threshold pulse peak detection.
//!
//! A peak is a rising-to-falling local maximum that clears a rolling
//! statistical threshold and respects a refractory spacing to the previous
//! accepted peak, modeling the physiological minimum inter-beat interval.

use serde::Deserialize;

use super::filter::mean;

/// Tuning knobs for the peak scan.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Rolling window length for the threshold statistics, in samples
    /// (about 3 s at 30 Hz). Before this many samples the threshold keeps
    /// its last value, which is 0.0 at the start of a scan.
    pub warmup: usize,
    /// Minimum spacing between accepted peaks, in samples.
    pub refractory: usize,
    /// Threshold is `mean + threshold_sigma * stddev` over the window.
    pub threshold_sigma: f32,
    /// Multiplier applied to the threshold after each accepted peak, easing
    /// acceptance of the very next beat before the window recomputes.
    pub threshold_decay: f32,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            warmup: 90,
            refractory: 15,
            threshold_sigma: 1.2,
            threshold_decay: 0.95,
        }
    }
}

/// Scans a filtered series for pulse peaks.
///
/// The scan is a pure function of `(signal, config)`: the rising-edge flag,
/// the dynamic threshold and the last-accepted-peak index live only for the
/// duration of one call. Returned indices are strictly increasing and
/// pairwise spaced by more than `config.refractory`.
pub fn detect_peaks(signal: &[f32], config: &PeakConfig) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut threshold = 0.0f32;
    let mut is_rising = false;
    // Initialized one refractory interval back so an immediate first peak
    // is admissible.
    let mut last_peak = -(config.refractory as isize);

    let n = signal.len();
    if n < 3 {
        return peaks;
    }

    for i in 1..n - 1 {
        if i > config.warmup {
            let window = &signal[i - config.warmup..i];
            let window_mean = mean(window);
            let window_std = stddev(window, window_mean);
            threshold = window_mean + config.threshold_sigma * window_std;
        }

        let rising = signal[i] > signal[i - 1];

        if is_rising
            && !rising
            && signal[i] > threshold
            && i as isize - last_peak > config.refractory as isize
        {
            peaks.push(i);
            last_peak = i as isize;
            threshold *= config.threshold_decay;
        }

        is_rising = rising;
    }

    peaks
}

fn stddev(values: &[f32], mean: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}
