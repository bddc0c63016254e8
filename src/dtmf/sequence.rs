//! Key sequences delimited by `*` and `#`, and the actions they trigger.

use std::fmt;
use std::time::Duration;

const BLINK_SHORT: Duration = Duration::from_millis(200);
const BLINK_LONG: Duration = Duration::from_millis(1000);
const ACCESS_HOLD: Duration = Duration::from_millis(2000);
const PULSE_HOLD: Duration = Duration::from_millis(5000);

/// What a detected key did to the sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEvent {
    /// `*` cleared the sequence
    Started,
    /// A key was appended; holds the sequence so far
    Extended(String),
    /// `#` terminated the sequence; holds the finished command
    Completed(String),
}

/// Collects keys between `*` and `#`
///
/// Keys received without a leading `*` are still appended.
#[derive(Debug, Default)]
pub struct KeySequencer {
    buffer: String,
}

impl KeySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: char) -> SequenceEvent {
        match key {
            '*' => {
                self.buffer.clear();
                log::info!("Command start");
                SequenceEvent::Started
            }
            '#' => {
                let command = std::mem::take(&mut self.buffer);
                log::info!("Sequence complete: {:?}", command);
                SequenceEvent::Completed(command)
            }
            other => {
                self.buffer.push(other);
                log::debug!("Sequence so far: {}", self.buffer);
                SequenceEvent::Extended(self.buffer.clone())
            }
        }
    }

    pub fn current(&self) -> &str {
        &self.buffer
    }
}

/// Indicator action bound to a completed sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DtmfAction {
    On,
    Off,
    AccessGranted,
    Blink { times: u32, period: Duration },
    Pulse(Duration),
    Unrecognized(String),
}

impl DtmfAction {
    pub fn from_sequence(command: &str) -> Self {
        match command {
            "1" => Self::On,
            "0" => Self::Off,
            "3" => Self::AccessGranted,
            "2" => Self::Blink {
                times: 3,
                period: BLINK_LONG,
            },
            "4" => Self::Blink {
                times: 3,
                period: BLINK_SHORT,
            },
            "5" => Self::Pulse(PULSE_HOLD),
            "7" => Self::Blink {
                times: 2,
                period: BLINK_LONG,
            },
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Drive an indicator through this action
    pub fn execute<I: Indicator + ?Sized>(&self, indicator: &mut I) {
        match self {
            Self::On => indicator.set(true),
            Self::Off => indicator.set(false),
            Self::AccessGranted => {
                indicator.set(true);
                indicator.hold(ACCESS_HOLD);
                indicator.set(false);
            }
            Self::Blink { times, period } => {
                for _ in 0..*times {
                    indicator.set(true);
                    indicator.hold(*period);
                    indicator.set(false);
                    indicator.hold(*period);
                }
            }
            Self::Pulse(duration) => {
                indicator.set(true);
                indicator.hold(*duration);
                indicator.set(false);
            }
            Self::Unrecognized(command) => log::warn!("Unrecognized command {:?}", command),
        }
    }
}

impl fmt::Display for DtmfAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "indicator on"),
            Self::Off => write!(f, "indicator off"),
            Self::AccessGranted => write!(f, "access granted"),
            Self::Blink { times, period } => {
                write!(f, "blink {} times every {} ms", times, period.as_millis())
            }
            Self::Pulse(d) => write!(f, "indicator on for {} ms", d.as_millis()),
            Self::Unrecognized(cmd) => write!(f, "unrecognized command {:?}", cmd),
        }
    }
}

/// Output driven by DTMF actions (an LED, a relay, a log line)
pub trait Indicator {
    fn set(&mut self, on: bool);

    /// Keep the current state for `duration`
    fn hold(&mut self, duration: Duration);
}

/// Indicator that only logs; holds return immediately
#[derive(Debug, Default)]
pub struct LogIndicator {
    on: bool,
}

impl LogIndicator {
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Indicator for LogIndicator {
    fn set(&mut self, on: bool) {
        if on != self.on {
            log::info!("Indicator {}", if on { "ON" } else { "OFF" });
        }
        self.on = on;
    }

    fn hold(&mut self, duration: Duration) {
        log::debug!("Indicator hold {} ms", duration.as_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        steps: Vec<(bool, u64)>,
        on: bool,
    }

    impl Indicator for Recorder {
        fn set(&mut self, on: bool) {
            self.on = on;
        }

        fn hold(&mut self, duration: Duration) {
            self.steps.push((self.on, duration.as_millis() as u64));
        }
    }

    #[test]
    fn test_sequence_between_delimiters() {
        let mut seq = KeySequencer::new();
        assert_eq!(seq.push('9'), SequenceEvent::Extended("9".into()));
        assert_eq!(seq.push('*'), SequenceEvent::Started);
        assert_eq!(seq.push('1'), SequenceEvent::Extended("1".into()));
        assert_eq!(seq.push('2'), SequenceEvent::Extended("12".into()));
        assert_eq!(seq.push('#'), SequenceEvent::Completed("12".into()));
        assert_eq!(seq.current(), "");
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(DtmfAction::from_sequence("1"), DtmfAction::On);
        assert_eq!(DtmfAction::from_sequence("0"), DtmfAction::Off);
        assert_eq!(DtmfAction::from_sequence("3"), DtmfAction::AccessGranted);
        assert_eq!(
            DtmfAction::from_sequence("4"),
            DtmfAction::Blink {
                times: 3,
                period: Duration::from_millis(200)
            }
        );
        assert_eq!(
            DtmfAction::from_sequence("5"),
            DtmfAction::Pulse(Duration::from_secs(5))
        );
        assert_eq!(
            DtmfAction::from_sequence("12"),
            DtmfAction::Unrecognized("12".into())
        );
    }

    #[test]
    fn test_blink_drives_indicator() {
        let mut rec = Recorder::default();
        DtmfAction::from_sequence("7").execute(&mut rec);
        assert_eq!(
            rec.steps,
            vec![(true, 1000), (false, 1000), (true, 1000), (false, 1000)]
        );
        assert!(!rec.on);
    }

    #[test]
    fn test_on_off_and_log_indicator() {
        let mut ind = LogIndicator::default();
        DtmfAction::On.execute(&mut ind);
        assert!(ind.is_on());
        DtmfAction::AccessGranted.execute(&mut ind);
        assert!(!ind.is_on());
        DtmfAction::Unrecognized("99".into()).execute(&mut ind);
        assert!(!ind.is_on());
    }
}
