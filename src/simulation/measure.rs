use crate::config::SystemConfig;
use crate::dtmf::DtmfDetector;
use crate::signal_processing::{Filter, FilterBank};

use super::{NoiseConfig, apply_noise, generate_dtmf_sequence};

/// Keys decoded from one synthesized signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionMeasurement {
    pub keys: String,
    pub blocks: usize,
}

/// Run `signal` through the configured filter and the DTMF detector
pub fn measure_detection(
    signal: &[f32],
    config: &SystemConfig,
) -> crate::Result<DetectionMeasurement> {
    let sample_rate = config.sampling.period.as_hz();
    let mut bank = FilterBank::from_config(config)?;
    let mut detector = DtmfDetector::from_config(&config.detection, sample_rate)?;

    let mut keys = String::new();
    for &sample in signal {
        if let Some(key) = detector.push_sample(bank.process(sample)) {
            keys.push(key);
        }
    }

    Ok(DetectionMeasurement {
        keys,
        blocks: signal.len() / detector.block_size(),
    })
}

/// Detection outcome for one noise level
#[derive(Debug, Clone, PartialEq)]
pub struct SnrPoint {
    pub snr_db: f32,
    pub decoded: String,
    pub correct: bool,
}

/// Decode `keys` once per SNR level with seeded white noise
pub fn measure_detection_across_snr(
    keys: &str,
    snr_levels_db: &[f32],
    config: &SystemConfig,
    seed: u64,
) -> crate::Result<Vec<SnrPoint>> {
    let sample_rate = config.sampling.period.as_hz();
    let clean = generate_dtmf_sequence(keys, 0.1, 0.1, sample_rate);
    let expected = keys.to_ascii_uppercase();

    snr_levels_db
        .iter()
        .map(|&snr_db| {
            let noise = NoiseConfig::default().with_seed(seed).with_awgn(snr_db);
            let noisy = apply_noise(&clean, &noise, sample_rate);
            let decoded = measure_detection(&noisy, config)?.keys;
            Ok(SnrPoint {
                snr_db,
                correct: decoded == expected,
                decoded,
            })
        })
        .collect()
}
