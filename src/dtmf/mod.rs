pub mod detector;
pub mod monitor;
pub mod sequence;

pub use detector::{BlockAnalysis, DtmfDetector};
pub use monitor::{ToneEvent, ToneMonitor};
pub use sequence::{DtmfAction, Indicator, KeySequencer, LogIndicator, SequenceEvent};
