use thiserror::Error;

// Main application error type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Engine Error: {0}")]
    Engine(#[from] EngineError),
    #[error("Config Error: {0}")]
    Config(#[from] config::ConfigError),
}

// Engine lifecycle error type. Per-frame and per-tick conditions
// (short buffer, malformed pixel addresses, too few peaks) are absorbed
// inside the pipeline and never surface here.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("The engine is already started.")]
    AlreadyStarted,
    #[error("The engine is not running.")]
    NotRunning,
}
