use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f32::consts::PI;

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub hum: Option<HumConfig>,
    pub impulse: Option<ImpulseNoiseConfig>,
    pub dc_offset: Option<f32>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f32) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }

    pub fn with_hum(mut self, freq_hz: f32, amplitude: f32) -> Self {
        self.hum = Some(HumConfig { freq_hz, amplitude });
        self
    }

    pub fn with_impulse(mut self, rate_hz: f32, amplitude: f32, duration_samples: usize) -> Self {
        self.impulse = Some(ImpulseNoiseConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }

    pub fn with_dc_offset(mut self, offset: f32) -> Self {
        self.dc_offset = Some(offset);
        self
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f32,
}

/// Mains interference
#[derive(Clone, Debug, serde::Deserialize)]
pub struct HumConfig {
    pub freq_hz: f32,
    pub amplitude: f32,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ImpulseNoiseConfig {
    pub rate_hz: f32,
    pub amplitude: f32,
    pub duration_samples: usize,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_power(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f32>() / signal.len() as f32
}

fn apply_additive_noise(signal: &mut [f32], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f32.powf(config.snr_db / 10.0);
    let noise_std = (sig_power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std as f64) else {
        log::warn!("Invalid noise level for {} dB SNR", config.snr_db);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng) as f32;
    }
}

fn apply_hum(signal: &mut [f32], config: &HumConfig, sample_rate: f32) {
    let omega = 2.0 * PI * config.freq_hz / sample_rate;
    for (i, sample) in signal.iter_mut().enumerate() {
        *sample += config.amplitude * (omega * i as f32).sin();
    }
}

fn apply_impulse_noise(
    signal: &mut [f32],
    config: &ImpulseNoiseConfig,
    sample_rate: f32,
    rng: &mut ChaCha8Rng,
) {
    let n = signal.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between_impulses = sample_rate / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f32>() * 2.0 * avg_samples_between_impulses) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples).min(n);

        for sample in signal[pos..end].iter_mut() {
            *sample += sign * config.amplitude;
        }
    }
}

/// Impairments are applied in a fixed order: hum, impulses, offset, then
/// white noise relative to the impaired signal's power
pub fn apply_noise(clean_signal: &[f32], config: &NoiseConfig, sample_rate: f32) -> Vec<f32> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref hum) = config.hum {
        apply_hum(&mut signal, hum, sample_rate);
    }

    if let Some(ref impulse) = config.impulse {
        apply_impulse_noise(&mut signal, impulse, sample_rate, &mut rng);
    }

    if let Some(offset) = config.dc_offset {
        signal.iter_mut().for_each(|s| *s += offset);
    }

    if let Some(ref additive) = config.additive {
        apply_additive_noise(&mut signal, additive, &mut rng);
    }

    signal
}
