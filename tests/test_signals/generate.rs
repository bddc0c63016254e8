use std::f32::consts::PI;

const LOW_HZ: [f32; 4] = [697.0, 770.0, 852.0, 941.0];
const HIGH_HZ: [f32; 4] = [1209.0, 1336.0, 1477.0, 1633.0];
const KEYPAD: [&str; 4] = ["123A", "456B", "789C", "*0#D"];

/// Unit impulse followed by zeros
pub fn impulse(len: usize) -> Vec<f32> {
    let mut signal = vec![0.0; len];
    if let Some(first) = signal.first_mut() {
        *first = 1.0;
    }
    signal
}

pub fn sine(freq_hz: f32, amplitude: f32, num_samples: usize, sample_rate: f32) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
        .collect()
}

/// Two-tone keypad signal at 0.5 amplitude per tone
pub fn dtmf_key(key: char, num_samples: usize, sample_rate: f32) -> Vec<f32> {
    let (row, col) = KEYPAD
        .iter()
        .enumerate()
        .find_map(|(r, keys)| keys.find(key).map(|c| (r, c)))
        .unwrap_or_else(|| panic!("{} is not a keypad key", key));
    let low = sine(LOW_HZ[row], 0.5, num_samples, sample_rate);
    let high = sine(HIGH_HZ[col], 0.5, num_samples, sample_rate);
    low.iter().zip(high.iter()).map(|(a, b)| a + b).collect()
}

/// y[n] = Σ h[k]·x[n-k], evaluated naively in f64
pub fn direct_convolution(taps: &[f64], input: &[f32]) -> Vec<f32> {
    (0..input.len())
        .map(|n| {
            taps.iter()
                .enumerate()
                .filter(|&(k, _)| k <= n)
                .map(|(k, &h)| h * input[n - k] as f64)
                .sum::<f64>() as f32
        })
        .collect()
}

/// a[0]·y[n] = Σ b[k]·x[n-k] - Σ_{k≥1} a[k]·y[n-k]
pub fn iir_recurrence(b: &[f64], a: &[f64], input: &[f32]) -> Vec<f32> {
    let mut y: Vec<f64> = Vec::with_capacity(input.len());
    for n in 0..input.len() {
        let mut acc = 0.0;
        for (k, &bk) in b.iter().enumerate() {
            if k <= n {
                acc += bk * input[n - k] as f64;
            }
        }
        for (k, &ak) in a.iter().enumerate().skip(1) {
            if k <= n {
                acc -= ak * y[n - k];
            }
        }
        y.push(acc / a[0]);
    }
    y.into_iter().map(|v| v as f32).collect()
}
