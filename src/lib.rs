//! # heartbeat
//!
//! Heart rate estimation from camera video frames via remote
//! photoplethysmography (rPPG): skin reflectance varies subtly with blood
//! volume pulse, visible as a brightness oscillation in a region of each
//! frame.
//!
//! The pipeline samples a centered region of interest per frame into a
//! scalar intensity series, keeps a bounded sliding window of samples,
//! band-pass filters the window, detects pulse peaks with an adaptive
//! threshold, and converts peak spacing into beats per minute.
//!
//! ## Example
//!
//! ```ignore
//! use heartbeat::{Configuration, HeartRateEngine};
//!
//! let mut engine = HeartRateEngine::builder(Configuration::default()).build();
//! let frames = engine.frame_sender();
//! engine.start()?;
//!
//! // camera layer sends LumaFrame values through `frames`
//!
//! let bpm = engine.current_estimate(); // 0 until enough signal arrives
//! engine.stop();
//! ```

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod sampler;

pub use buffer::SignalBuffer;
pub use config::Configuration;
pub use engine::{EngineState, HeartRateEngine, HeartRateEngineBuilder};
pub use error::{AppError, EngineError};
pub use frame::LumaFrame;
pub use pipeline::{BpmConfig, EstimationPipeline, PeakConfig, NO_ESTIMATE};
pub use sampler::FrameSampler;
