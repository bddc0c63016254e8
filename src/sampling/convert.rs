use crate::config::{ActuationConfig, SamplingConfig};

/// Legal range of acquired samples
///
/// Clamping happens here, between acquisition and filtering, never inside a
/// filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputRange {
    pub min: f32,
    pub max: f32,
}

impl InputRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp into range; NaN maps to `min`
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<&SamplingConfig> for InputRange {
    fn from(config: &SamplingConfig) -> Self {
        let (min, max) = config.input_range();
        Self { min, max }
    }
}

/// ADC code to volts
#[derive(Debug, Clone, Copy)]
pub struct AdcScale {
    max_code: u16,
    reference_volts: f32,
    centered: bool,
}

impl AdcScale {
    pub fn new(bits: u8, reference_volts: f32, centered: bool) -> Self {
        let bits = bits.clamp(1, 16) as u32;
        Self {
            max_code: ((1u32 << bits) - 1) as u16,
            reference_volts,
            centered,
        }
    }

    /// Convert a raw code; codes above full scale read as full scale
    pub fn to_volts(&self, code: u16) -> f32 {
        let code = code.min(self.max_code);
        let volts = code as f32 * self.reference_volts / self.max_code as f32;
        if self.centered {
            volts - self.reference_volts / 2.0
        } else {
            volts
        }
    }

    pub fn max_code(&self) -> u16 {
        self.max_code
    }
}

impl From<&SamplingConfig> for AdcScale {
    fn from(config: &SamplingConfig) -> Self {
        Self::new(
            config.adc_bits,
            config.adc_reference_volts,
            config.adc_centered,
        )
    }
}

/// Clamp-then-quantize mapping onto the DAC/PWM code range
///
/// The value is clamped into `[min, max]` before scaling, so anything far out
/// of range saturates at the end codes instead of wrapping.
#[derive(Debug, Clone, Copy)]
pub struct OutputQuantizer {
    min: f32,
    max: f32,
    max_code: u16,
}

impl OutputQuantizer {
    pub fn new(min: f32, max: f32, bits: u8) -> Self {
        let bits = bits.clamp(1, 16) as u32;
        Self {
            min,
            max,
            max_code: ((1u32 << bits) - 1) as u16,
        }
    }

    pub fn quantize(&self, value: f32) -> u16 {
        let clamped = if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        };
        let scaled = (clamped - self.min) / (self.max - self.min) * self.max_code as f32;
        // truncating cast; clamped already, so only rounding can overshoot
        (scaled as u32).min(self.max_code as u32) as u16
    }

    /// Value at the bottom edge of `code`
    pub fn code_to_value(&self, code: u16) -> f32 {
        self.min + code.min(self.max_code) as f32 * (self.max - self.min) / self.max_code as f32
    }

    pub fn max_code(&self) -> u16 {
        self.max_code
    }
}

impl From<&ActuationConfig> for OutputQuantizer {
    fn from(config: &ActuationConfig) -> Self {
        Self::new(config.min, config.max, config.bits)
    }
}
