pub mod audio;
pub mod coefficients;
pub mod config;
pub mod constants;
pub mod control;
pub mod dtmf;
pub mod error;
pub mod output;
pub mod processing;
pub mod sampling;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::SystemConfig;
pub use error::{FilterError, Result};
pub use processing::SamplingLoop;
pub use wav::{save_capture_wav, save_wav};
