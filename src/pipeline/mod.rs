//! The estimation pipeline: buffer snapshot -> filter -> peaks -> BPM.

pub mod estimator;
pub mod filter;
pub mod peaks;

pub use estimator::{estimate_bpm, BpmConfig, NO_ESTIMATE};
pub use filter::preprocess;
pub use peaks::{detect_peaks, PeakConfig};

/// One full estimation pass over a buffer snapshot.
///
/// The pipeline holds configuration only; every pass recomputes the
/// filtered series, the peak list and the BPM from scratch, so repeated
/// calls on the same snapshot return the same value.
#[derive(Debug, Clone)]
pub struct EstimationPipeline {
    min_samples: usize,
    peaks: PeakConfig,
    bpm: BpmConfig,
}

impl EstimationPipeline {
    pub fn new(min_samples: usize, peaks: PeakConfig, bpm: BpmConfig) -> Self {
        Self {
            min_samples,
            peaks,
            bpm,
        }
    }

    /// Runs filter, peak detection and BPM estimation on a snapshot.
    ///
    /// Returns `None` when the snapshot is too short to attempt an
    /// estimate; the caller keeps its prior value in that case. A returned
    /// value may still be [`NO_ESTIMATE`] when too few peaks were found.
    pub fn estimate(&self, snapshot: &[f32]) -> Option<u32> {
        if snapshot.len() < self.min_samples {
            return None;
        }
        let filtered = preprocess(snapshot);
        let peaks = detect_peaks(&filtered, &self.peaks);
        Some(estimate_bpm(&peaks, &self.bpm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> EstimationPipeline {
        EstimationPipeline::new(100, PeakConfig::default(), BpmConfig::default())
    }

    fn pulse_signal(len: usize, period: f32) -> Vec<f32> {
        (0..len)
            .map(|i| 128.0 + 30.0 * (i as f32 * std::f32::consts::TAU / period).sin())
            .collect()
    }

    #[test]
    fn short_snapshot_yields_none() {
        let pipeline = pipeline();
        for len in [0, 1, 50, 99] {
            assert_eq!(pipeline.estimate(&vec![128.0; len]), None, "len {len}");
        }
    }

    #[test]
    fn sixty_bpm_sinusoid_estimates_sixty() {
        // Period 30 at 30 Hz is one beat per second.
        let snapshot = pulse_signal(150, 30.0);
        let bpm = pipeline().estimate(&snapshot).unwrap();
        assert!((57..=63).contains(&bpm), "estimated {bpm}, expected ~60");
    }

    #[test]
    fn faster_pulse_estimates_higher() {
        // Period 20 at 30 Hz: 90 BPM.
        let snapshot = pulse_signal(150, 20.0);
        let bpm = pipeline().estimate(&snapshot).unwrap();
        assert!((85..=95).contains(&bpm), "estimated {bpm}, expected ~90");
    }

    #[test]
    fn estimate_is_pure_in_the_snapshot() {
        let snapshot = pulse_signal(150, 25.0);
        let pipeline = pipeline();
        let first = pipeline.estimate(&snapshot);
        for _ in 0..5 {
            assert_eq!(pipeline.estimate(&snapshot), first);
        }
    }

    #[test]
    fn flat_snapshot_yields_sentinel_not_none() {
        let bpm = pipeline().estimate(&vec![128.0; 150]);
        assert_eq!(bpm, Some(NO_ESTIMATE));
    }
}
