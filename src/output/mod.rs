mod csv;
mod export;
mod json;
mod text;

use chrono::Utc;

pub use self::csv::CsvFormatter;
pub use self::export::ExportWriter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Something the detection pipeline reports
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    /// DTMF key reported after debounce
    Key(char),
    /// `*...#` sequence finished
    Sequence(String),
    /// Action bound to a finished sequence
    Action(String),
    /// Single-tone monitor edge
    Tone { tone_hz: f32, detected: bool },
}

pub struct EventOutput {
    /// Position in the input stream, in samples
    pub sample_index: u64,
    /// Same position in seconds
    pub seconds: f32,
    pub event: DetectionEvent,
}

pub trait Formatter: Send {
    fn format(&self, output: &EventOutput) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn timestamp_millis() -> u64 {
    Utc::now().timestamp_millis() as u64
}

impl DetectionEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Sequence(_) => "sequence",
            Self::Action(_) => "action",
            Self::Tone { .. } => "tone",
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Key(k) => k.to_string(),
            Self::Sequence(s) | Self::Action(s) => s.clone(),
            Self::Tone { tone_hz, detected } => {
                format!("{:.0}:{}", tone_hz, if *detected { "on" } else { "off" })
            }
        }
    }
}
