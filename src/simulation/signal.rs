use std::f32::consts::PI;

use crate::constants::{DTMF_HIGH_HZ, DTMF_KEYPAD, DTMF_LOW_HZ};

/// Per-tone amplitude of synthesized DTMF keys
pub const DTMF_TONE_AMPLITUDE: f32 = 0.5;

/// Row and column frequencies of a keypad key
pub fn key_frequencies(key: char) -> Option<(f32, f32)> {
    let key = key.to_ascii_uppercase();
    DTMF_KEYPAD.iter().enumerate().find_map(|(row, keys)| {
        keys.iter()
            .position(|&k| k == key)
            .map(|col| (DTMF_LOW_HZ[row], DTMF_HIGH_HZ[col]))
    })
}

/// Sine tone of `amplitude` at `freq_hz`
pub fn generate_tone(freq_hz: f32, amplitude: f32, num_samples: usize, sample_rate: f32) -> Vec<f32> {
    let omega = 2.0 * PI * freq_hz / sample_rate;
    (0..num_samples)
        .map(|i| amplitude * (omega * i as f32).sin())
        .collect()
}

/// Sum of two equal-amplitude tones
pub fn generate_dual_tone(
    low_hz: f32,
    high_hz: f32,
    amplitude: f32,
    num_samples: usize,
    sample_rate: f32,
) -> Vec<f32> {
    let low = generate_tone(low_hz, amplitude, num_samples, sample_rate);
    let high = generate_tone(high_hz, amplitude, num_samples, sample_rate);
    low.iter().zip(high.iter()).map(|(a, b)| a + b).collect()
}

/// One keypad key, or `None` for characters not on the keypad
pub fn generate_dtmf_key(key: char, num_samples: usize, sample_rate: f32) -> Option<Vec<f32>> {
    let (low, high) = key_frequencies(key)?;
    Some(generate_dual_tone(
        low,
        high,
        DTMF_TONE_AMPLITUDE,
        num_samples,
        sample_rate,
    ))
}

/// Keys separated by silence; characters not on the keypad become silence
pub fn generate_dtmf_sequence(
    keys: &str,
    tone_secs: f32,
    gap_secs: f32,
    sample_rate: f32,
) -> Vec<f32> {
    let tone_len = (tone_secs * sample_rate) as usize;
    let gap_len = (gap_secs * sample_rate) as usize;

    let mut samples = vec![0.0; gap_len];
    for key in keys.chars() {
        match generate_dtmf_key(key, tone_len, sample_rate) {
            Some(tone) => samples.extend(tone),
            None => {
                log::warn!("'{}' is not a DTMF key", key);
                samples.extend(std::iter::repeat_n(0.0, tone_len));
            }
        }
        samples.extend(std::iter::repeat_n(0.0, gap_len));
    }
    samples
}
