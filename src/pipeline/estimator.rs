//! Inter-peak interval to BPM conversion with outlier rejection.

use serde::Deserialize;

/// Sentinel published when no estimate can be formed.
pub const NO_ESTIMATE: u32 = 0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BpmConfig {
    /// Effective rate of the sample series, in Hz. Kept in sync with the
    /// top-level configuration value by [`Configuration::load`].
    ///
    /// [`Configuration::load`]: crate::Configuration::load
    pub sampling_rate_hz: f32,
    /// Minimum number of peaks required to attempt an estimate.
    pub min_peaks: usize,
    /// Intervals outside `median * (1 ± interval_tolerance)` are rejected
    /// as missed or spurious beats.
    pub interval_tolerance: f32,
    pub min_bpm: u32,
    pub max_bpm: u32,
}

impl Default for BpmConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 30.0,
            min_peaks: 3,
            interval_tolerance: 0.3,
            min_bpm: 40,
            max_bpm: 200,
        }
    }
}

/// Converts a strictly increasing peak index list into a clamped BPM, or
/// [`NO_ESTIMATE`] when there are too few peaks or every interval is
/// rejected as an outlier.
pub fn estimate_bpm(peaks: &[usize], config: &BpmConfig) -> u32 {
    if peaks.len() < config.min_peaks {
        return NO_ESTIMATE;
    }

    let intervals: Vec<f32> = peaks.windows(2).map(|w| (w[1] - w[0]) as f32).collect();
    let median = upper_median(&intervals);

    let low = median * (1.0 - config.interval_tolerance);
    let high = median * (1.0 + config.interval_tolerance);
    let kept: Vec<f32> = intervals
        .iter()
        .copied()
        .filter(|&interval| interval >= low && interval <= high)
        .collect();
    if kept.is_empty() {
        return NO_ESTIMATE;
    }

    let mean_interval = kept.iter().sum::<f32>() / kept.len() as f32;
    let bpm = (config.sampling_rate_hz * 60.0 / mean_interval).round() as u32;
    bpm.clamp(config.min_bpm, config.max_bpm)
}

fn upper_median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    sorted[sorted.len() / 2]
}
