//! Configuration for the sampling and filtering pipeline.
//!
//! Every section has a `Default` that reproduces the bench setup (8 kHz
//! sampling, 10-bit ADC centered at mid-code, 8-bit DAC) and can be overridden
//! from a TOML file:
//!
//! ```toml
//! [sampling]
//! period = "125us"
//!
//! [filter]
//! kind = "iir"
//!
//! [adaptive]
//! step_size = 0.002
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::coefficients;
use crate::constants::{DTMF_HIGH_HZ, DTMF_LOW_HZ, MIN_SAMPLE_PERIOD_US};
use crate::error::{FilterError, Result};

/// Sampling rate, given as a rate or as a period
///
/// Can be given either as a rate in Hz or as a period in microseconds; the
/// sample clock works in whole microseconds.
///
/// # Parsing formats
/// - `8000` - rate in Hz (no suffix)
/// - `8000hz` or `8000Hz` - rate in Hz (explicit)
/// - `125us` or `125μs` - period in microseconds
///
/// # Example
/// ```
/// use samplefilter::config::SamplePeriod;
///
/// let period: SamplePeriod = "125us".parse().unwrap();
/// assert_eq!(period.as_interval_us(), 125);
/// assert!((period.as_hz() - 8000.0).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "SamplePeriodRepr")]
pub struct SamplePeriod(f32);

impl SamplePeriod {
    /// Create from a rate in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Create from a period in microseconds
    pub fn from_interval_us(us: f32) -> Self {
        Self(1_000_000.0 / us)
    }

    /// Sampling rate in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }

    /// Period in whole microseconds, as used by the sample clock
    pub fn as_interval_us(&self) -> u32 {
        ((1_000_000.0 / self.0).round() as u32).max(MIN_SAMPLE_PERIOD_US)
    }
}

impl Default for SamplePeriod {
    fn default() -> Self {
        Self::from_hz(8000.0)
    }
}

impl fmt::Display for SamplePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}hz", self.0)
    }
}

impl FromStr for SamplePeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(num) = s.strip_suffix("us").or_else(|| s.strip_suffix("μs")) {
            let us: f32 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid interval: {}", s))?;
            if us <= 0.0 {
                return Err("interval must be positive".to_string());
            }
            return Ok(Self::from_interval_us(us));
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid rate: {}", s))?;
        if hz <= 0.0 {
            return Err("rate must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SamplePeriodRepr {
    Hz(f32),
    Text(String),
}

impl TryFrom<SamplePeriodRepr> for SamplePeriod {
    type Error = String;

    fn try_from(repr: SamplePeriodRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            SamplePeriodRepr::Hz(hz) if hz > 0.0 => Ok(Self::from_hz(hz)),
            SamplePeriodRepr::Hz(_) => Err("rate must be positive".to_string()),
            SamplePeriodRepr::Text(s) => s.parse(),
        }
    }
}

/// Filter family run by the engine
///
/// The numeric ids match the single-character selection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Output equals input
    #[default]
    Bypass,
    /// Finite impulse response convolution
    Fir,
    /// Direct-form difference equation with feedback
    Iir,
    /// LMS adaptive transversal filter
    Adaptive,
    /// Butterworth cascade designed at startup
    Butterworth,
}

impl FilterKind {
    /// Map a selection id to a filter kind.
    ///
    /// Unknown ids fall back to `Bypass` so the sampling loop keeps running.
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => Self::Bypass,
            1 => Self::Fir,
            2 => Self::Iir,
            3 => Self::Adaptive,
            4 => Self::Butterworth,
            other => {
                log::warn!("Unknown filter id {}, falling back to bypass", other);
                Self::Bypass
            }
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Bypass => 0,
            Self::Fir => 1,
            Self::Iir => 2,
            Self::Adaptive => 3,
            Self::Butterworth => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::Fir => "FIR",
            Self::Iir => "IIR",
            Self::Adaptive => "adaptive LMS",
            Self::Butterworth => "Butterworth",
        }
    }
}

/// Response shape for the designed Butterworth filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandShape {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Where the LMS filter gets its desired signal from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Desired = `desired_gain` times the current input sample
    ScaledInput,
    /// Desired signal supplied by the caller alongside every sample
    External,
}

/// System-wide configuration
///
/// Use `SystemConfig::default()` for the bench defaults or
/// [`SystemConfig::load`] to read a TOML file.
///
/// # Example
/// ```
/// use samplefilter::config::{FilterKind, SystemConfig};
///
/// let mut config = SystemConfig::default();
/// config.filter.kind = FilterKind::Fir;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Acquisition timing and ADC scaling
    pub sampling: SamplingConfig,
    /// Active filter and its coefficients
    pub filter: FilterConfig,
    /// LMS adaptive filter parameters
    pub adaptive: AdaptiveConfig,
    /// Capture buffer sizing
    pub capture: CaptureConfig,
    /// DAC/PWM output range and resolution
    pub actuation: ActuationConfig,
    /// Tone detection parameters
    pub detection: DetectionConfig,
    /// Export pacing
    pub telemetry: TelemetryConfig,
}

/// Acquisition configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Sampling period (default 8 kHz)
    pub period: SamplePeriod,
    /// ADC resolution in bits
    pub adc_bits: u8,
    /// ADC reference voltage
    pub adc_reference_volts: f32,
    /// Subtract mid-code so the input is centered on zero
    pub adc_centered: bool,
}

/// Filter selection and coefficients
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter active at startup
    pub kind: FilterKind,
    /// FIR taps, tap 0 multiplies the newest sample
    pub fir_taps: Vec<f64>,
    /// IIR feedforward coefficients
    pub iir_b: Vec<f64>,
    /// IIR feedback coefficients, `a[0]` is the normalization divisor
    pub iir_a: Vec<f64>,
    /// Designed Butterworth filter
    pub butterworth: ButterworthConfig,
}

/// Butterworth design parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ButterworthConfig {
    pub shape: BandShape,
    /// Cutoff (lowpass/highpass) or lower band edge (bandpass) in Hz
    pub low_hz: f32,
    /// Upper band edge in Hz (bandpass only)
    pub high_hz: f32,
    pub order: usize,
}

/// LMS adaptive filter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Number of adaptive taps
    pub taps: usize,
    /// Adaptation rate μ
    pub step_size: f32,
    /// Source of the desired signal
    pub reference: ReferenceMode,
    /// Scale applied to the input when `reference` is `ScaledInput`
    pub desired_gain: f32,
}

/// Capture buffer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Number of (raw, filtered) pairs held before sealing
    pub capacity: usize,
    /// Log progress every this many stored samples (0 disables)
    pub progress_interval: usize,
}

/// Actuation output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActuationConfig {
    /// Value mapped to code 0
    pub min: f32,
    /// Value mapped to the highest code
    pub max: f32,
    /// Output resolution in bits
    pub bits: u8,
}

/// Tone detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Goertzel block length in samples
    pub block_size: usize,
    /// Minimum Goertzel magnitude for a tone to count as present
    pub threshold: f32,
    /// Low (row) group frequencies in Hz
    pub low_hz: Vec<f32>,
    /// High (column) group frequencies in Hz
    pub high_hz: Vec<f32>,
    /// Sliding window length for the per-band energy detector
    pub band_window: usize,
    /// Fraction of the window that must exceed `band_threshold`
    pub band_ratio: f32,
    /// Per-sample energy threshold for the per-band energy detector
    pub band_threshold: f32,
}

/// Export pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Flush the export sink every this many records (0 disables)
    pub flush_every: usize,
    /// Pause after each flush in milliseconds
    pub pause_ms: u64,
    /// Append a timestamp column to exported records
    pub include_timestamp: bool,
}

impl SamplingConfig {
    /// Legal range for acquired samples, in volts
    pub fn input_range(&self) -> (f32, f32) {
        if self.adc_centered {
            let half = self.adc_reference_volts / 2.0;
            (-half, half)
        } else {
            (0.0, self.adc_reference_volts)
        }
    }
}

impl DetectionConfig {
    /// Reject tone frequencies that cannot be measured at `sample_rate`
    ///
    /// Checked when a detector is built, so a configuration that never
    /// detects tones can sample below the DTMF band.
    pub fn check_sample_rate(&self, sample_rate: f32) -> Result<()> {
        let nyquist = sample_rate / 2.0;
        match self
            .low_hz
            .iter()
            .chain(self.high_hz.iter())
            .find(|&&f| !(f > 0.0 && f < nyquist))
        {
            Some(f) => Err(FilterError::Config(format!(
                "detection frequency {} Hz outside (0, {}) Hz",
                f, nyquist
            ))),
            None => Ok(()),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period: SamplePeriod::default(),
            adc_bits: 10,
            adc_reference_volts: 3.3,
            adc_centered: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::Bypass,
            fir_taps: coefficients::LOWPASS_FIR_11.iter().map(|&c| c as f64).collect(),
            iir_b: coefficients::BUTTERWORTH_LOWPASS_800HZ
                .b
                .iter()
                .map(|&c| c as f64)
                .collect(),
            iir_a: coefficients::BUTTERWORTH_LOWPASS_800HZ
                .a
                .iter()
                .map(|&c| c as f64)
                .collect(),
            butterworth: ButterworthConfig::default(),
        }
    }
}

impl Default for ButterworthConfig {
    fn default() -> Self {
        Self {
            shape: BandShape::Lowpass,
            low_hz: 800.0,
            high_hz: 1600.0,
            order: 4,
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            taps: 21,
            step_size: 0.001,
            reference: ReferenceMode::ScaledInput,
            desired_gain: 0.7,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            capacity: 2048,
            progress_interval: 200,
        }
    }
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            min: -1.65,
            max: 1.65,
            bits: 8,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            block_size: 256,
            threshold: 30.0,
            low_hz: DTMF_LOW_HZ.to_vec(),
            high_hz: DTMF_HIGH_HZ.to_vec(),
            band_window: 100,
            band_ratio: 0.7,
            band_threshold: 0.01,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            flush_every: 100,
            pause_ms: 5,
            include_timestamp: true,
        }
    }
}

impl SystemConfig {
    /// Parse a TOML document; missing sections keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FilterError::Config(format!("{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FilterError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject settings that cannot run.
    ///
    /// Coefficient lengths are checked again when the filters are built.
    pub fn validate(&self) -> Result<()> {
        if !(self.sampling.period.as_hz() > 0.0) {
            return Err(FilterError::Config("sample rate must be positive".into()));
        }
        if self.sampling.adc_bits == 0 || self.sampling.adc_bits > 16 {
            return Err(FilterError::Config(format!(
                "adc_bits must be 1-16, got {}",
                self.sampling.adc_bits
            )));
        }
        if self.capture.capacity == 0 {
            return Err(FilterError::Config("capture capacity must be > 0".into()));
        }
        if self.adaptive.taps == 0 {
            return Err(FilterError::Config("adaptive taps must be > 0".into()));
        }
        if !(self.adaptive.step_size > 0.0) {
            return Err(FilterError::Config(format!(
                "adaptive step size must be positive, got {}",
                self.adaptive.step_size
            )));
        }
        if !(self.actuation.max > self.actuation.min) {
            return Err(FilterError::Config(format!(
                "actuation range is empty: [{}, {}]",
                self.actuation.min, self.actuation.max
            )));
        }
        if self.actuation.bits == 0 || self.actuation.bits > 16 {
            return Err(FilterError::Config(format!(
                "actuation bits must be 1-16, got {}",
                self.actuation.bits
            )));
        }
        if self.detection.block_size == 0 {
            return Err(FilterError::Config("detection block size must be > 0".into()));
        }
        if self.detection.low_hz.is_empty() || self.detection.high_hz.is_empty() {
            return Err(FilterError::Config(
                "detection groups must not be empty".into(),
            ));
        }
        if self.detection.band_window == 0 {
            return Err(FilterError::Config("band window must be > 0".into()));
        }
        Ok(())
    }
}
