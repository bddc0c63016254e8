use crate::config::DetectionConfig;
use crate::constants::DTMF_KEYPAD;
use crate::error::Result;
use crate::signal_processing::{Goertzel, ToneBlock};

/// Energies of one evaluated block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockAnalysis {
    /// Goertzel magnitude per low-group frequency
    pub low: Vec<f32>,
    /// Goertzel magnitude per high-group frequency
    pub high: Vec<f32>,
    /// Strongest low-group index
    pub low_index: usize,
    /// Strongest high-group index
    pub high_index: usize,
    /// Keypad symbol when both group maxima exceed the threshold
    pub key: Option<char>,
}

/// Two-group Goertzel classifier with change-only reporting
///
/// Each completed block is evaluated for every low and high frequency. A key
/// needs the strongest tone of BOTH groups above the threshold, which rejects
/// a single strong tone. A key is reported only when it differs from the last
/// reported one; a block with no qualifying key clears the memory, so pressing
/// the same key twice reports it twice.
pub struct DtmfDetector {
    low: Vec<Goertzel>,
    high: Vec<Goertzel>,
    threshold: f32,
    block: ToneBlock,
    last_key: Option<char>,
    last: Option<BlockAnalysis>,
}

impl DtmfDetector {
    pub fn new(
        low_hz: &[f32],
        high_hz: &[f32],
        sample_rate: f32,
        block_size: usize,
        threshold: f32,
    ) -> Self {
        Self {
            low: low_hz.iter().map(|&f| Goertzel::new(f, sample_rate)).collect(),
            high: high_hz.iter().map(|&f| Goertzel::new(f, sample_rate)).collect(),
            threshold,
            block: ToneBlock::new(block_size),
            last_key: None,
            last: None,
        }
    }

    /// Build from configuration, checking every tone against `sample_rate`
    pub fn from_config(config: &DetectionConfig, sample_rate: f32) -> Result<Self> {
        config.check_sample_rate(sample_rate)?;
        Ok(Self::new(
            &config.low_hz,
            &config.high_hz,
            sample_rate,
            config.block_size,
            config.threshold,
        ))
    }

    /// Feed one sample; evaluates the block when it fills
    ///
    /// Returns a key only on a change of detected key.
    pub fn push_sample(&mut self, sample: f32) -> Option<char> {
        if !self.block.push(sample) {
            return None;
        }
        let samples: Vec<f32> = self.block.iter_oldest_first().collect();
        let analysis = self.analyze(&samples);
        self.report(analysis)
    }

    /// Evaluate a complete external block and apply the debounce
    pub fn process_block(&mut self, block: &[f32]) -> Option<char> {
        let analysis = self.analyze(block);
        self.report(analysis)
    }

    /// Energies and classification for `block`, without touching the debounce
    pub fn analyze(&self, block: &[f32]) -> BlockAnalysis {
        let low: Vec<f32> = self
            .low
            .iter()
            .map(|g| g.magnitude(block.iter().copied()))
            .collect();
        let high: Vec<f32> = self
            .high
            .iter()
            .map(|g| g.magnitude(block.iter().copied()))
            .collect();

        let low_index = argmax(&low);
        let high_index = argmax(&high);

        let qualifies = low.get(low_index).is_some_and(|&e| e > self.threshold)
            && high.get(high_index).is_some_and(|&e| e > self.threshold);
        let key = if qualifies {
            DTMF_KEYPAD
                .get(low_index)
                .and_then(|row| row.get(high_index))
                .copied()
        } else {
            None
        };

        BlockAnalysis {
            low,
            high,
            low_index,
            high_index,
            key,
        }
    }

    fn report(&mut self, analysis: BlockAnalysis) -> Option<char> {
        let key = analysis.key;
        log::debug!(
            "DTMF block low {:?} high {:?} -> {:?}",
            analysis.low,
            analysis.high,
            key
        );
        self.last = Some(analysis);

        match key {
            Some(k) if self.last_key != Some(k) => {
                self.last_key = Some(k);
                log::info!("Key detected: {}", k);
                Some(k)
            }
            Some(_) => None,
            None => {
                self.last_key = None;
                None
            }
        }
    }

    /// Energies of the most recent block, low group first
    pub fn last_energies(&self) -> Vec<f32> {
        self.last
            .as_ref()
            .map(|a| a.low.iter().chain(a.high.iter()).copied().collect())
            .unwrap_or_default()
    }

    /// Per-frequency presence flags for the last block, low group first
    pub fn present(&self) -> Vec<bool> {
        self.last_energies()
            .into_iter()
            .map(|e| e > self.threshold)
            .collect()
    }

    pub fn last_analysis(&self) -> Option<&BlockAnalysis> {
        self.last.as_ref()
    }

    pub fn last_key(&self) -> Option<char> {
        self.last_key
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    pub fn reset(&mut self) {
        self.block.clear();
        self.last_key = None;
        self.last = None;
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
