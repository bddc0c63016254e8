/// Edge reported by [`BandEnergyDetector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandEvent {
    Detected,
    Lost,
}

/// Sliding-vote energy detector for one filtered band
///
/// Each sample votes "present" when its instantaneous energy `y²` exceeds the
/// threshold. The band counts as detected while more than `ratio` of the last
/// `window` votes are present. Only transitions are reported.
///
/// The vote count is updated incrementally from a circular buffer, like a
/// moving average, so each sample is O(1).
pub struct BandEnergyDetector {
    votes: Vec<bool>,
    index: usize,
    count: usize,
    threshold: f32,
    ratio: f32,
    detected: bool,
}

impl BandEnergyDetector {
    /// # Arguments
    /// * `window` - Number of votes in the sliding window
    /// * `threshold` - Per-sample energy threshold
    /// * `ratio` - Fraction of the window that must vote present (0.0-1.0)
    pub fn new(window: usize, threshold: f32, ratio: f32) -> Self {
        Self {
            votes: vec![false; window.max(1)],
            index: 0,
            count: 0,
            threshold,
            ratio: ratio.clamp(0.0, 1.0),
            detected: false,
        }
    }

    /// Feed one filtered sample; returns an event only when the state flips
    pub fn update(&mut self, filtered: f32) -> Option<BandEvent> {
        let vote = filtered * filtered > self.threshold;

        if self.votes[self.index] {
            self.count -= 1;
        }
        if vote {
            self.count += 1;
        }
        self.votes[self.index] = vote;
        self.index = (self.index + 1) % self.votes.len();

        let now = self.count as f32 > self.ratio * self.votes.len() as f32;
        if now == self.detected {
            return None;
        }
        self.detected = now;
        Some(if now {
            BandEvent::Detected
        } else {
            BandEvent::Lost
        })
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Fraction of the window currently voting present
    pub fn fill_ratio(&self) -> f32 {
        self.count as f32 / self.votes.len() as f32
    }

    pub fn reset(&mut self) {
        self.votes.fill(false);
        self.index = 0;
        self.count = 0;
        self.detected = false;
    }
}
