//! Direct-form IIR filter driven by explicit `b`/`a` coefficient tables.
//!
//! The output follows
//!
//! ```text
//! y[n] = (Σ_{i=0..N} b[i]·x[n-i] - Σ_{i=1..N} a[i]·y[n-i]) / a[0]
//! ```
//!
//! `a[0]` is always used as the divisor, so non-monic tables are filtered
//! correctly.

use crate::coefficients::IirTable;
use crate::constants::MIN_NORMALIZATION_DIVISOR;
use crate::error::{FilterError, Result};
use crate::signal_processing::Filter;

/// Validated feedforward/feedback coefficient pair
#[derive(Debug, Clone)]
pub struct IirCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl IirCoefficients {
    /// # Errors
    /// - `CoefficientLength` when `b` and `a` differ in length
    /// - `InvalidCoefficient` when empty, non-finite, or `a[0]` is zero
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() {
            return Err(FilterError::InvalidCoefficient(
                "IIR filter needs at least one coefficient".into(),
            ));
        }
        if a.len() != b.len() {
            return Err(FilterError::CoefficientLength {
                what: "IIR feedback",
                expected: b.len(),
                actual: a.len(),
            });
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(FilterError::InvalidCoefficient(
                "IIR coefficients must be finite".into(),
            ));
        }
        if a[0].abs() < MIN_NORMALIZATION_DIVISOR {
            return Err(FilterError::InvalidCoefficient(format!(
                "a[0] = {} cannot normalize the output",
                a[0]
            )));
        }
        Ok(Self { b, a })
    }

    pub fn from_table<const N: usize>(table: &IirTable<N>) -> Result<Self> {
        let (b, a) = table.to_vecs();
        Self::new(b, a)
    }

    pub fn order(&self) -> usize {
        self.b.len() - 1
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }
}

/// IIR filter with explicit input and output histories
///
/// `x[0]` / `y[0]` always hold the newest input / output.
pub struct IirFilter {
    coeffs: IirCoefficients,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl IirFilter {
    pub fn new(coeffs: IirCoefficients) -> Self {
        let len = coeffs.b.len();
        Self {
            coeffs,
            x: vec![0.0; len],
            y: vec![0.0; len],
        }
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        self.x.rotate_right(1);
        self.x[0] = sample as f64;

        let feedforward: f64 = self
            .coeffs
            .b
            .iter()
            .zip(self.x.iter())
            .map(|(b, x)| b * x)
            .sum();

        // y has not been shifted yet: y[i - 1] is y[n - i]
        let feedback: f64 = self.coeffs.a[1..]
            .iter()
            .zip(self.y.iter())
            .map(|(a, y)| a * y)
            .sum();

        let output = (feedforward - feedback) / self.coeffs.a[0];

        self.y.rotate_right(1);
        self.y[0] = output;

        output as f32
    }

    pub fn reset(&mut self) {
        self.x.fill(0.0);
        self.y.fill(0.0);
    }

    pub fn coefficients(&self) -> &IirCoefficients {
        &self.coeffs
    }

    /// Input history, newest first
    pub fn input_history(&self) -> &[f64] {
        &self.x
    }

    /// Output history, newest first
    pub fn output_history(&self) -> &[f64] {
        &self.y
    }
}

impl Filter for IirFilter {
    fn process(&mut self, sample: f32) -> f32 {
        IirFilter::process(self, sample)
    }

    fn reset(&mut self) {
        IirFilter::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::{BUTTERWORTH_LOWPASS_800HZ, DTMF_1209_IIR};
    use approx::assert_abs_diff_eq;

    /// Closed-form evaluation of the difference equation with zero initial state
    fn reference_response(b: &[f64], a: &[f64], input: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; input.len()];
        for n in 0..input.len() {
            let mut acc = 0.0;
            for i in 0..b.len() {
                if n >= i {
                    acc += b[i] * input[n - i];
                }
            }
            for i in 1..a.len() {
                if n >= i {
                    acc -= a[i] * y[n - i];
                }
            }
            y[n] = acc / a[0];
        }
        y
    }

    #[test]
    fn test_impulse_response_matches_recurrence() {
        let coeffs = IirCoefficients::from_table(&BUTTERWORTH_LOWPASS_800HZ).unwrap();
        let (b, a) = (coeffs.b().to_vec(), coeffs.a().to_vec());
        let mut filter = IirFilter::new(coeffs);

        let mut impulse = vec![0.0f64; 32];
        impulse[0] = 1.0;
        let expected = reference_response(&b, &a, &impulse);

        for (n, &x) in impulse.iter().enumerate() {
            let y = filter.process(x as f32);
            assert_abs_diff_eq!(y as f64, expected[n], epsilon = 1e-6);
        }
        // first sample is b[0] / a[0]
        assert_abs_diff_eq!(expected[0], b[0], epsilon = 1e-12);
    }

    #[test]
    fn test_non_unity_a0_is_normalized() {
        let b = vec![0.2, 0.3];
        let a = vec![1.0, -0.5];
        let scaled_b: Vec<f64> = b.iter().map(|c| c * 4.0).collect();
        let scaled_a: Vec<f64> = a.iter().map(|c| c * 4.0).collect();

        let mut monic = IirFilter::new(IirCoefficients::new(b, a).unwrap());
        let mut scaled = IirFilter::new(IirCoefficients::new(scaled_b, scaled_a).unwrap());

        for n in 0..20 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(monic.process(x), scaled.process(x), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_first_order_closed_form() {
        // y[n] = x[n] + 0.5 y[n-1]  =>  impulse response 0.5^n
        let coeffs = IirCoefficients::new(vec![1.0, 0.0], vec![1.0, -0.5]).unwrap();
        let mut filter = IirFilter::new(coeffs);
        for n in 0..10 {
            let y = filter.process(if n == 0 { 1.0 } else { 0.0 });
            assert_abs_diff_eq!(y, 0.5f32.powi(n), epsilon = 1e-7);
        }
    }

    #[test]
    fn test_histories_newest_first() {
        let coeffs = IirCoefficients::new(vec![1.0, 0.0], vec![1.0, 0.0]).unwrap();
        let mut filter = IirFilter::new(coeffs);
        filter.process(1.0);
        filter.process(2.0);
        assert_eq!(filter.input_history(), &[2.0, 1.0]);
        assert_eq!(filter.output_history(), &[2.0, 1.0]);
        filter.reset();
        assert_eq!(filter.output_history(), &[0.0, 0.0]);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = IirCoefficients::new(vec![1.0, 2.0, 3.0], vec![1.0, 0.5]).unwrap_err();
        assert!(matches!(
            err,
            FilterError::CoefficientLength {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_a0_rejected() {
        assert!(IirCoefficients::new(vec![1.0], vec![0.0]).is_err());
        assert!(IirCoefficients::new(vec![], vec![]).is_err());
        assert!(IirCoefficients::new(vec![1.0, f64::NAN], vec![1.0, 0.0]).is_err());
    }

    #[test]
    fn test_table_order() {
        let coeffs = IirCoefficients::from_table(&DTMF_1209_IIR).unwrap();
        assert_eq!(coeffs.order(), 6);
        assert_eq!(IirFilter::new(coeffs).output_history().len(), 7);
    }
}
