//! Goertzel single-bin tone energy.
//!
//! One second-order resonator per target frequency, run over a block of B
//! samples:
//!
//! ```text
//! coeff = 2·cos(2π·f/Fs)
//! q0    = coeff·q1 - q2 + x[n]
//! |X|   = sqrt(q1² + q2² - q1·q2·coeff)
//! ```
//!
//! O(B) per frequency, which beats an FFT when only a handful of bins matter.

use num_complex::Complex;
use std::f32::consts::PI;

/// Goertzel magnitude of `target_hz` over `block`
pub fn goertzel_energy(target_hz: f32, sample_rate: f32, block: &[f32]) -> f32 {
    Goertzel::new(target_hz, sample_rate).magnitude(block.iter().copied())
}

/// Precomputed Goertzel resonator for one target frequency
#[derive(Debug, Clone, Copy)]
pub struct Goertzel {
    target_hz: f32,
    omega: f32,
    coeff: f32,
}

impl Goertzel {
    pub fn new(target_hz: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * target_hz / sample_rate;
        Self {
            target_hz,
            omega,
            coeff: 2.0 * omega.cos(),
        }
    }

    pub fn target_hz(&self) -> f32 {
        self.target_hz
    }

    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    /// Run the resonator and return the final `(q1, q2)` state
    fn run<I: IntoIterator<Item = f32>>(&self, samples: I) -> (f32, f32) {
        let mut q1 = 0.0f32;
        let mut q2 = 0.0f32;
        for x in samples {
            let q0 = self.coeff * q1 - q2 + x;
            q2 = q1;
            q1 = q0;
        }
        (q1, q2)
    }

    /// Magnitude of the target bin
    pub fn magnitude<I: IntoIterator<Item = f32>>(&self, samples: I) -> f32 {
        let (q1, q2) = self.run(samples);
        (q1 * q1 + q2 * q2 - q1 * q2 * self.coeff).max(0.0).sqrt()
    }

    /// Complex value of the target bin (phase referenced to the block end)
    pub fn bin<I: IntoIterator<Item = f32>>(&self, samples: I) -> Complex<f32> {
        let (q1, q2) = self.run(samples);
        Complex::new(q1 - q2 * self.omega.cos(), q2 * self.omega.sin())
    }
}

/// Fixed-length circular detection block
///
/// Samples are written at a cursor that wraps to zero; a block is complete
/// each time the cursor wraps. Nothing else persists between blocks.
pub struct ToneBlock {
    samples: Vec<f32>,
    cursor: usize,
}

impl ToneBlock {
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len.max(1)],
            cursor: 0,
        }
    }

    /// Store one sample; returns true when this sample completed a block
    pub fn push(&mut self, sample: f32) -> bool {
        self.samples[self.cursor] = sample;
        self.cursor += 1;
        if self.cursor == self.samples.len() {
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Samples from oldest to newest
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples[self.cursor..]
            .iter()
            .chain(self.samples[..self.cursor].iter())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FS: f32 = 8000.0;
    const B: usize = 256;
    const THRESHOLD: f32 = 30.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / FS).sin())
            .collect()
    }

    #[test]
    fn test_on_bin_tone_above_threshold() {
        // 1000 Hz is exactly bin 32 of a 256-sample block at 8 kHz
        let energy = goertzel_energy(1000.0, FS, &sine(1000.0, B));
        assert_relative_eq!(energy, B as f32 / 2.0, max_relative = 0.01);
        assert!(energy > THRESHOLD);
    }

    #[test]
    fn test_far_tone_below_threshold() {
        let energy = goertzel_energy(1000.0, FS, &sine(3000.0, B));
        assert!(energy < THRESHOLD, "leakage {}", energy);
    }

    #[test]
    fn test_dtmf_row_tone_detected() {
        let energy = goertzel_energy(697.0, FS, &sine(697.0, B));
        assert!(energy > 100.0, "energy {}", energy);
        let neighbour = goertzel_energy(941.0, FS, &sine(697.0, B));
        assert!(neighbour < THRESHOLD, "neighbour {}", neighbour);
    }

    #[test]
    fn test_bin_magnitude_matches() {
        let g = Goertzel::new(1000.0, FS);
        let block = sine(1000.0, B);
        let bin = g.bin(block.iter().copied());
        assert_relative_eq!(bin.norm(), g.magnitude(block), max_relative = 1e-3);
    }

    #[test]
    fn test_tone_block_wraps_and_orders() {
        let mut block = ToneBlock::new(4);
        assert!(!block.push(1.0));
        assert!(!block.push(2.0));
        assert!(!block.push(3.0));
        assert!(block.push(4.0));
        assert_eq!(block.iter_oldest_first().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);

        block.push(5.0);
        assert_eq!(block.iter_oldest_first().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0, 5.0]);

        block.clear();
        assert!(block.iter_oldest_first().all(|x| x == 0.0));
    }
}
