use serde::Deserialize;

use crate::pipeline::{BpmConfig, PeakConfig};

/// Runtime configuration for the heart rate engine.
///
/// `sampling_rate_hz` is the effective rate of the sample series after
/// frame skipping, and it is the only rate constant the BPM formula
/// consumes. `frame_skip` must be chosen so that
/// `camera_fps / frame_skip == sampling_rate_hz`; the defaults assume a
/// 120 fps camera stream thinned to 30 Hz.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub sampling_rate_hz: f32,
    pub frame_skip: u32,
    pub buffer_capacity: usize,
    pub min_samples: usize,
    pub estimation_interval_ms: u64,
    pub frame_channel_size: usize,
    pub estimate_channel_size: usize,
    pub peaks: PeakConfig,
    pub bpm: BpmConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 30.0,
            frame_skip: 4,
            buffer_capacity: 150,
            min_samples: 100,
            estimation_interval_ms: 1000,
            frame_channel_size: 60,
            estimate_channel_size: 16,
            peaks: PeakConfig::default(),
            bpm: BpmConfig::default(),
        }
    }
}

impl Configuration {
    /// Loads configuration from an optional `heartbeat.toml` in the working
    /// directory, overridden by `HEARTBEAT_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("heartbeat").required(false))
            .add_source(config::Environment::with_prefix("HEARTBEAT").try_parsing(true))
            .build()?;
        let mut configuration: Configuration = settings.try_deserialize()?;
        // The estimator reads its rate from the top-level value so the two
        // can never drift apart.
        configuration.bpm.sampling_rate_hz = configuration.sampling_rate_hz;
        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let configuration = Configuration::default();
        assert_eq!(configuration.buffer_capacity, 150);
        assert!(configuration.min_samples <= configuration.buffer_capacity);
        assert_eq!(
            configuration.bpm.sampling_rate_hz,
            configuration.sampling_rate_hz
        );
    }
}
