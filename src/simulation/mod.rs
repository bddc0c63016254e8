mod measure;
mod noise;
mod signal;

pub use measure::{DetectionMeasurement, SnrPoint, measure_detection, measure_detection_across_snr};
pub use noise::{
    AdditiveNoiseConfig, HumConfig, ImpulseNoiseConfig, NoiseConfig, apply_noise, signal_power,
};
pub use signal::{
    DTMF_TONE_AMPLITUDE, generate_dtmf_key, generate_dtmf_sequence, generate_dual_tone,
    generate_tone, key_frequencies,
};
