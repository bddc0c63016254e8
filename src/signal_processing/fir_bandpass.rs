use crate::constants::{MAX_NORMALIZED_FREQ, MIN_NORMALIZED_FREQ};
use crate::error::{FilterError, Result};
use crate::signal_processing::{Filter, FirFilterCore};
use pm_remez::{BandSetting, constant, pm_parameters, pm_remez};

/// Design equiripple bandpass taps with the Parks-McClellan (Remez) algorithm
///
/// # Arguments
/// * `low_hz` - Lower pass band edge in Hz
/// * `high_hz` - Upper pass band edge in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `num_taps` - Number of taps, rounded up to odd for Type I linear phase
/// * `transition_hz` - Transition bandwidth on each side of the pass band
///
/// # Errors
/// Returns `FilterError::FilterDesign` if the bands overlap or the designer fails
pub fn design_bandpass_taps(
    low_hz: f32,
    high_hz: f32,
    sample_rate: f32,
    num_taps: usize,
    transition_hz: f32,
) -> Result<Vec<f64>> {
    let num_taps = if num_taps.is_multiple_of(2) {
        num_taps + 1
    } else {
        num_taps
    };

    let normalize = |hz: f32| (hz / sample_rate) as f64;
    let trans_norm = normalize(transition_hz);

    let pass_start = normalize(low_hz);
    let pass_end = normalize(high_hz);
    let stop1_end = (pass_start - trans_norm).max(MIN_NORMALIZED_FREQ);
    let stop2_start = (pass_end + trans_norm).min(MAX_NORMALIZED_FREQ);

    if pass_start <= stop1_end || pass_end >= stop2_start || pass_start >= pass_end {
        return Err(FilterError::FilterDesign(format!(
            "Invalid band: low={}, high={}, sample_rate={}, transition={}",
            low_hz, high_hz, sample_rate, transition_hz
        )));
    }

    let bands = [
        BandSetting::new(0.0, stop1_end, constant(0.0))
            .map_err(|e| FilterError::FilterDesign(format!("Lower stopband: {:?}", e)))?,
        BandSetting::new(pass_start, pass_end, constant(1.0))
            .map_err(|e| FilterError::FilterDesign(format!("Passband: {:?}", e)))?,
        BandSetting::new(stop2_start, 0.5, constant(0.0))
            .map_err(|e| FilterError::FilterDesign(format!("Upper stopband: {:?}", e)))?,
    ];

    let params = pm_parameters(num_taps, &bands)
        .map_err(|e| FilterError::FilterDesign(format!("PM parameters: {:?}", e)))?;

    let design =
        pm_remez(&params).map_err(|e| FilterError::FilterDesign(format!("PM Remez: {:?}", e)))?;

    Ok(design.impulse_response)
}

/// Linear-phase FIR bandpass designed at run time
///
/// Used to isolate a single DTMF tone ahead of a [`BandEnergyDetector`].
///
/// [`BandEnergyDetector`]: crate::signal_processing::BandEnergyDetector
pub struct FirBandpass {
    core: FirFilterCore,
    center_hz: f32,
}

impl FirBandpass {
    pub fn new(
        low_hz: f32,
        high_hz: f32,
        sample_rate: f32,
        num_taps: usize,
        transition_hz: f32,
    ) -> Result<Self> {
        let taps = design_bandpass_taps(low_hz, high_hz, sample_rate, num_taps, transition_hz)?;
        Ok(Self {
            core: FirFilterCore::new(taps)?,
            center_hz: (low_hz + high_hz) / 2.0,
        })
    }

    /// Band of `±half_width_hz` around a single tone
    pub fn around(
        center_hz: f32,
        half_width_hz: f32,
        sample_rate: f32,
        num_taps: usize,
        transition_hz: f32,
    ) -> Result<Self> {
        Self::new(
            center_hz - half_width_hz,
            center_hz + half_width_hz,
            sample_rate,
            num_taps,
            transition_hz,
        )
    }

    pub fn process(&mut self, sample: f32) -> f32 {
        self.core.process(sample)
    }

    pub fn num_taps(&self) -> usize {
        self.core.num_taps()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.core.group_delay_samples()
    }

    pub fn center_hz(&self) -> f32 {
        self.center_hz
    }
}

impl Filter for FirBandpass {
    fn process(&mut self, sample: f32) -> f32 {
        FirBandpass::process(self, sample)
    }

    fn reset(&mut self) {
        self.core.reset()
    }
}
