use crate::error::{FilterError, Result};
use crate::signal_processing::Filter;

/// Circular-buffer FIR filter
///
/// Contains the delay line, tap coefficients, and convolution logic.
/// `taps[0]` multiplies the most recent sample, so the output is
/// `Σ taps[i] · x[n - i]`.
pub struct FirFilterCore {
    taps: Vec<f64>,
    delay_line: Vec<f64>,
    pos: usize,
}

impl FirFilterCore {
    /// Create a new FIR filter core with the given tap coefficients
    ///
    /// # Errors
    /// Returns `FilterError::InvalidCoefficient` for an empty or non-finite tap set.
    pub fn new(taps: Vec<f64>) -> Result<Self> {
        validate_taps(&taps)?;
        Ok(Self {
            delay_line: vec![0.0; taps.len()],
            taps,
            pos: 0,
        })
    }

    /// Create from a static single-precision table
    pub fn from_table(taps: &[f32]) -> Result<Self> {
        Self::new(taps.iter().map(|&t| t as f64).collect())
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, sample: f32) -> f32 {
        self.delay_line[self.pos] = sample as f64;

        let mut output = 0.0f64;
        let n = self.taps.len();

        // Iterate the ring buffer in two contiguous reverse ranges to avoid
        // modulo arithmetic in the inner convolution loop.
        let mut tap_i = 0usize;
        for delay_idx in (0..=self.pos).rev() {
            output += self.taps[tap_i] * self.delay_line[delay_idx];
            tap_i += 1;
        }
        for delay_idx in ((self.pos + 1)..n).rev() {
            output += self.taps[tap_i] * self.delay_line[delay_idx];
            tap_i += 1;
        }
        debug_assert_eq!(tap_i, n);

        self.pos += 1;
        if self.pos == n {
            self.pos = 0;
        }
        output as f32
    }

    /// Zero the delay line
    pub fn reset(&mut self) {
        self.delay_line.fill(0.0);
        self.pos = 0;
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }
}

impl Filter for FirFilterCore {
    fn process(&mut self, sample: f32) -> f32 {
        FirFilterCore::process(self, sample)
    }

    fn reset(&mut self) {
        FirFilterCore::reset(self)
    }
}

/// Shift-register FIR filter
///
/// Same convolution as [`FirFilterCore`] but the history is physically shifted
/// on every sample so `history[i]` is always `x[n - i]`. Summation order is
/// identical, so both produce bit-identical output for the same taps.
pub struct ShiftRegisterFir {
    taps: Vec<f64>,
    history: Vec<f64>,
}

impl ShiftRegisterFir {
    pub fn new(taps: Vec<f64>) -> Result<Self> {
        validate_taps(&taps)?;
        Ok(Self {
            history: vec![0.0; taps.len()],
            taps,
        })
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        self.history.rotate_right(1);
        self.history[0] = sample as f64;

        let output: f64 = self
            .taps
            .iter()
            .zip(self.history.iter())
            .fold(0.0, |acc, (t, x)| acc + t * x);
        output as f32
    }
}

impl Filter for ShiftRegisterFir {
    fn process(&mut self, sample: f32) -> f32 {
        ShiftRegisterFir::process(self, sample)
    }

    fn reset(&mut self) {
        self.history.fill(0.0);
    }
}

fn validate_taps(taps: &[f64]) -> Result<()> {
    if taps.is_empty() {
        return Err(FilterError::InvalidCoefficient(
            "FIR filter needs at least one tap".into(),
        ));
    }
    if let Some(pos) = taps.iter().position(|t| !t.is_finite()) {
        return Err(FilterError::InvalidCoefficient(format!(
            "FIR tap {} is not finite",
            pos
        )));
    }
    Ok(())
}
