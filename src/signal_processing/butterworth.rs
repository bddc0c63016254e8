use crate::config::{BandShape, ButterworthConfig};
use crate::error::{FilterError, Result};
use crate::signal_processing::Filter;
use iir_filters::filter::{DirectForm2Transposed, Filter as _};
use iir_filters::filter_design::{FilterType, butter};
use iir_filters::sos::zpk2sos;

/// Butterworth response shape with its band edges in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButterworthShape {
    Lowpass(f32),
    Highpass(f32),
    Bandpass(f32, f32),
}

impl ButterworthShape {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Lowpass(fc) => FilterType::LowPass(fc as f64),
            Self::Highpass(fc) => FilterType::HighPass(fc as f64),
            Self::Bandpass(lo, hi) => FilterType::BandPass(lo as f64, hi as f64),
        }
    }
}

/// Butterworth filter designed at run time as a cascade of second-order sections
pub struct ButterworthFilter {
    filter: DirectForm2Transposed,
    shape: ButterworthShape,
    sample_rate: f32,
    order: usize,
}

impl ButterworthFilter {
    pub fn new(shape: ButterworthShape, sample_rate: f32, order: usize) -> Result<Self> {
        let nyquist = sample_rate / 2.0;
        let edges_ok = match shape {
            ButterworthShape::Lowpass(fc) | ButterworthShape::Highpass(fc) => {
                fc > 0.0 && fc < nyquist
            }
            ButterworthShape::Bandpass(lo, hi) => lo > 0.0 && lo < hi && hi < nyquist,
        };
        if order == 0 || !edges_ok {
            return Err(FilterError::FilterDesign(format!(
                "Invalid Butterworth parameters: {:?}, order {}, sample_rate {}",
                shape, order, sample_rate
            )));
        }

        Ok(Self {
            filter: design(shape, sample_rate, order)?,
            shape,
            sample_rate,
            order,
        })
    }

    pub fn from_config(config: &ButterworthConfig, sample_rate: f32) -> Result<Self> {
        let shape = match config.shape {
            BandShape::Lowpass => ButterworthShape::Lowpass(config.low_hz),
            BandShape::Highpass => ButterworthShape::Highpass(config.low_hz),
            BandShape::Bandpass => ButterworthShape::Bandpass(config.low_hz, config.high_hz),
        };
        Self::new(shape, sample_rate, config.order)
    }

    /// Filter single sample
    pub fn process(&mut self, sample: f32) -> f32 {
        self.filter.filter(sample as f64) as f32
    }

    pub fn shape(&self) -> ButterworthShape {
        self.shape
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

impl Filter for ButterworthFilter {
    fn process(&mut self, sample: f32) -> f32 {
        ButterworthFilter::process(self, sample)
    }

    fn reset(&mut self) {
        // The section states are private, so rebuild from the stored design.
        // The parameters were accepted once already.
        match design(self.shape, self.sample_rate, self.order) {
            Ok(filter) => self.filter = filter,
            Err(e) => log::error!("Butterworth redesign failed on reset: {}", e),
        }
    }
}

fn design(shape: ButterworthShape, sample_rate: f32, order: usize) -> Result<DirectForm2Transposed> {
    let zpk = butter(order as u32, shape.filter_type(), sample_rate as f64)
        .map_err(|e| FilterError::FilterDesign(format!("{:?}", e)))?;

    // Convert to second-order sections
    let sos = zpk2sos(&zpk, None).map_err(|e| FilterError::FilterDesign(format!("{:?}", e)))?;

    Ok(DirectForm2Transposed::new(&sos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn rms_after(output: &[f32], skip: usize) -> f32 {
        (output.iter().skip(skip).map(|x| x * x).sum::<f32>() / (output.len() - skip) as f32)
            .sqrt()
    }

    fn tone(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_butterworth_design() {
        assert!(ButterworthFilter::new(ButterworthShape::Lowpass(800.0), 8000.0, 4).is_ok());
        assert!(ButterworthFilter::new(ButterworthShape::Highpass(2000.0), 48000.0, 2).is_ok());
        assert!(
            ButterworthFilter::new(ButterworthShape::Bandpass(400.0, 600.0), 48000.0, 4).is_ok()
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(ButterworthFilter::new(ButterworthShape::Lowpass(5000.0), 8000.0, 4).is_err());
        assert!(
            ButterworthFilter::new(ButterworthShape::Bandpass(900.0, 700.0), 8000.0, 4).is_err()
        );
        assert!(ButterworthFilter::new(ButterworthShape::Lowpass(800.0), 8000.0, 0).is_err());
    }

    #[test]
    fn test_lowpass_passes_low_rejects_high() {
        let mut pass = ButterworthFilter::new(ButterworthShape::Lowpass(800.0), 8000.0, 4).unwrap();
        let mut output = tone(200.0, 8000.0, 4000);
        pass.process_buffer(&mut output);
        let gain_db = 20.0 * (rms_after(&output, 1000) / (0.5f32).sqrt()).log10();
        assert!(gain_db > -3.0, "Passband too attenuated: {} dB", gain_db);

        let mut stop = ButterworthFilter::new(ButterworthShape::Lowpass(800.0), 8000.0, 4).unwrap();
        let mut output = tone(3000.0, 8000.0, 4000);
        stop.process_buffer(&mut output);
        let gain_db = 20.0 * (rms_after(&output, 1000) / (0.5f32).sqrt()).log10();
        assert!(gain_db < -20.0, "Stopband not attenuated: {} dB", gain_db);
    }

    #[test]
    fn test_bandpass_passes_center_frequency() {
        let mut filter =
            ButterworthFilter::new(ButterworthShape::Bandpass(400.0, 600.0), 48000.0, 4).unwrap();

        let input = tone(500.0, 48000.0, 4800);
        let mut output = input.clone();
        filter.process_buffer(&mut output);

        let attenuation_db = 20.0 * (rms_after(&output, 1000) / rms_after(&input, 1000)).log10();
        assert!(
            attenuation_db > -3.0,
            "Center frequency too attenuated: {} dB",
            attenuation_db
        );
    }

    #[test]
    fn test_reset_restores_zero_state() {
        let mut filter =
            ButterworthFilter::new(ButterworthShape::Lowpass(800.0), 8000.0, 4).unwrap();
        let first: Vec<f32> = (0..16).map(|_| filter.process(1.0)).collect();
        filter.reset();
        let again: Vec<f32> = (0..16).map(|_| filter.process(1.0)).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_from_config() {
        let config = ButterworthConfig::default();
        let filter = ButterworthFilter::from_config(&config, 8000.0).unwrap();
        assert_eq!(filter.shape(), ButterworthShape::Lowpass(800.0));
        assert_eq!(filter.order(), 4);
    }
}
