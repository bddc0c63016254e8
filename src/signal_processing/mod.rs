pub mod band_detector;
pub mod butterworth;
pub mod engine;
pub mod filter;
pub mod fir_bandpass;
pub mod fir_core;
pub mod goertzel;
pub mod iir;
pub mod lms;

pub use band_detector::{BandEnergyDetector, BandEvent};
pub use butterworth::{ButterworthFilter, ButterworthShape};
pub use engine::{FilterBank, FilterEngine};
pub use filter::Filter;
pub use fir_bandpass::{FirBandpass, design_bandpass_taps};
pub use fir_core::{FirFilterCore, ShiftRegisterFir};
pub use goertzel::{Goertzel, ToneBlock, goertzel_energy};
pub use iir::{IirCoefficients, IirFilter};
pub use lms::{AdaptiveOutput, DesiredSignal, LmsFilter};
