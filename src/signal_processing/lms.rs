//! LMS adaptive transversal filter.
//!
//! ```text
//! y[n]  = Σ w[k]·x[n-k]
//! e[n]  = d[n] - y[n]
//! w[k] += μ·e[n]·x[n-k]
//! ```
//!
//! Stability requires roughly `0 < μ < 2 / (taps · P_x)` where `P_x` is the
//! input power, so μ has to shrink as the input scale grows.

use crate::error::{FilterError, Result};
use crate::signal_processing::Filter;

/// Source of the desired signal `d[n]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DesiredSignal {
    /// `d[n] = k · x[n]`
    ScaledInput(f32),
    /// `d[n]` is supplied by the caller through
    /// [`LmsFilter::process_with_reference`]; plain `process` reuses the last
    /// supplied value
    External,
}

/// Result of one adaptation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveOutput {
    /// Filter output y[n], computed with the weights before the update
    pub output: f32,
    /// Error e[n] = d[n] - y[n]
    pub error: f32,
}

/// Least Mean Squares adaptive filter
pub struct LmsFilter {
    weights: Vec<f64>,
    delay_line: Vec<f64>,
    step_size: f64,
    desired: DesiredSignal,
    reference: f64,
    last_error: f64,
}

impl LmsFilter {
    /// Create an LMS filter with all weights at zero
    ///
    /// # Errors
    /// Returns `FilterError::InvalidCoefficient` for zero taps or a
    /// non-positive step size.
    pub fn new(taps: usize, step_size: f32, desired: DesiredSignal) -> Result<Self> {
        if taps == 0 {
            return Err(FilterError::InvalidCoefficient(
                "adaptive filter needs at least one tap".into(),
            ));
        }
        if !(step_size > 0.0) || !step_size.is_finite() {
            return Err(FilterError::InvalidCoefficient(format!(
                "adaptation rate must be positive, got {}",
                step_size
            )));
        }
        Ok(Self {
            weights: vec![0.0; taps],
            delay_line: vec![0.0; taps],
            step_size: step_size as f64,
            desired,
            reference: 0.0,
            last_error: 0.0,
        })
    }

    /// Run one sample against an explicit desired value and update the weights
    pub fn adapt(&mut self, input: f32, desired: f32) -> AdaptiveOutput {
        self.delay_line.rotate_right(1);
        self.delay_line[0] = input as f64;

        let output: f64 = self
            .weights
            .iter()
            .zip(self.delay_line.iter())
            .map(|(w, x)| w * x)
            .sum();

        let error = desired as f64 - output;
        let gain = self.step_size * error;
        for (w, x) in self.weights.iter_mut().zip(self.delay_line.iter()) {
            *w += gain * x;
        }
        self.last_error = error;

        AdaptiveOutput {
            output: output as f32,
            error: error as f32,
        }
    }

    /// Process a sample with an external reference, remembering the reference
    pub fn process_with_reference(&mut self, input: f32, reference: f32) -> AdaptiveOutput {
        self.reference = reference as f64;
        self.adapt(input, reference)
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let desired = match self.desired {
            DesiredSignal::ScaledInput(k) => k * input,
            DesiredSignal::External => self.reference as f32,
        };
        self.adapt(input, desired).output
    }

    /// Zero weights, history and the held reference
    pub fn reset(&mut self) {
        self.weights.fill(0.0);
        self.delay_line.fill(0.0);
        self.reference = 0.0;
        self.last_error = 0.0;
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn last_error(&self) -> f32 {
        self.last_error as f32
    }

    pub fn desired_signal(&self) -> DesiredSignal {
        self.desired
    }
}

impl Filter for LmsFilter {
    fn process(&mut self, sample: f32) -> f32 {
        LmsFilter::process(self, sample)
    }

    fn reset(&mut self) {
        LmsFilter::reset(self)
    }
}
