pub mod capture;
pub mod source;

pub use capture::AudioCapture;
pub use source::{
    AudioSource, DeviceSource, MemorySource, SampleSource, SampleStream, WavFileSource,
};
