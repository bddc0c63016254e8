//! Commands accepted by the sampling loop.
//!
//! | Input        | Command                                  |
//! |--------------|------------------------------------------|
//! | `0`..`4`     | select filter by id (other ids: bypass)  |
//! | `c`          | start a capture                          |
//! | `s`          | export the capture                       |
//! | `r`          | reset filters and capture                |
//! | `DATA:<x>`   | store one externally supplied sample     |
//! | `PROCESS:<x>`| filter one sample without storing it     |

use std::str::FromStr;

use crate::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SelectFilter(u8),
    StartCapture,
    Export,
    Reset,
    Data(f32),
    Process(f32),
}

impl FromStr for Command {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let unknown = || FilterError::UnknownCommand(line.to_string());

        if let Some((keyword, value)) = line.split_once(':') {
            let value: f32 = value.trim().parse().map_err(|_| unknown())?;
            return match keyword.trim().to_ascii_uppercase().as_str() {
                "DATA" => Ok(Self::Data(value)),
                "PROCESS" => Ok(Self::Process(value)),
                _ => Err(unknown()),
            };
        }

        if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
            return line.parse().map(Self::SelectFilter).map_err(|_| unknown());
        }

        match line.to_ascii_lowercase().as_str() {
            "c" => Ok(Self::StartCapture),
            "s" => Ok(Self::Export),
            "r" => Ok(Self::Reset),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_character_commands() {
        assert_eq!("c".parse::<Command>().unwrap(), Command::StartCapture);
        assert_eq!(" S\n".parse::<Command>().unwrap(), Command::Export);
        assert_eq!("r".parse::<Command>().unwrap(), Command::Reset);
        assert_eq!("3".parse::<Command>().unwrap(), Command::SelectFilter(3));
        // out-of-range ids parse; the filter bank maps them to bypass
        assert_eq!("9".parse::<Command>().unwrap(), Command::SelectFilter(9));
    }

    #[test]
    fn test_sample_commands() {
        assert_eq!("DATA:1.5".parse::<Command>().unwrap(), Command::Data(1.5));
        assert_eq!("process: -0.25".parse::<Command>().unwrap(), Command::Process(-0.25));
    }

    #[test]
    fn test_unknown_commands_rejected() {
        for input in ["", "x", "capture", "DATA:abc", "FOO:1", "999"] {
            let err = input.parse::<Command>().unwrap_err();
            assert!(matches!(err, FilterError::UnknownCommand(_)), "{:?}", input);
        }
    }
}
