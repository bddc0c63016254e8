use crate::coefficients::IirTable;
use crate::config::DetectionConfig;
use crate::error::Result;
use crate::signal_processing::{
    BandEnergyDetector, BandEvent, Filter, FirBandpass, FirFilterCore, IirCoefficients, IirFilter,
};

const MONITOR_TAPS: usize = 127;
const MONITOR_HALF_WIDTH_HZ: f32 = 30.0;
const MONITOR_TRANSITION_HZ: f32 = 120.0;

/// Detection edge for one monitored tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEvent {
    pub tone_hz: f32,
    pub event: BandEvent,
}

/// Single-tone detector: band filter followed by a sliding energy vote
pub struct ToneMonitor {
    tone_hz: f32,
    filter: Box<dyn Filter + Send>,
    detector: BandEnergyDetector,
    last_output: f32,
}

impl ToneMonitor {
    pub fn new(tone_hz: f32, filter: Box<dyn Filter + Send>, detector: BandEnergyDetector) -> Self {
        Self {
            tone_hz,
            filter,
            detector,
            last_output: 0.0,
        }
    }

    /// Monitor with a Parks-McClellan bandpass designed around `tone_hz`
    pub fn designed(tone_hz: f32, sample_rate: f32, config: &DetectionConfig) -> Result<Self> {
        let filter = FirBandpass::around(
            tone_hz,
            MONITOR_HALF_WIDTH_HZ,
            sample_rate,
            MONITOR_TAPS,
            MONITOR_TRANSITION_HZ,
        )?;
        Ok(Self::new(tone_hz, Box::new(filter), band_detector(config)))
    }

    /// Monitor with a fixed FIR table
    pub fn from_fir_table(tone_hz: f32, taps: &[f32], config: &DetectionConfig) -> Result<Self> {
        let filter = FirFilterCore::from_table(taps)?;
        Ok(Self::new(tone_hz, Box::new(filter), band_detector(config)))
    }

    /// Monitor with a fixed IIR table
    pub fn from_iir_table<const N: usize>(
        tone_hz: f32,
        table: &IirTable<N>,
        config: &DetectionConfig,
    ) -> Result<Self> {
        let filter = IirFilter::new(IirCoefficients::from_table(table)?);
        Ok(Self::new(tone_hz, Box::new(filter), band_detector(config)))
    }

    pub fn process(&mut self, sample: f32) -> Option<ToneEvent> {
        self.last_output = self.filter.process(sample);
        let event = self.detector.update(self.last_output)?;
        match event {
            BandEvent::Detected => log::info!("Tone {} Hz detected", self.tone_hz),
            BandEvent::Lost => log::info!("Tone {} Hz lost", self.tone_hz),
        }
        Some(ToneEvent {
            tone_hz: self.tone_hz,
            event,
        })
    }

    pub fn is_detected(&self) -> bool {
        self.detector.is_detected()
    }

    /// Last band filter output
    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    /// Energy of the last band filter output
    pub fn last_energy(&self) -> f32 {
        self.last_output * self.last_output
    }

    pub fn tone_hz(&self) -> f32 {
        self.tone_hz
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.detector.reset();
        self.last_output = 0.0;
    }
}

fn band_detector(config: &DetectionConfig) -> BandEnergyDetector {
    BandEnergyDetector::new(config.band_window, config.band_threshold, config.band_ratio)
}
