use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Filter design failed: {0}")]
    FilterDesign(String),

    #[error("Coefficient length mismatch in {what}: expected {expected}, got {actual}")]
    CoefficientLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid coefficient: {0}")]
    InvalidCoefficient(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker disconnected: {0}")]
    WorkerDisconnected(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
