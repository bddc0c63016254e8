use super::{EventOutput, Formatter, iso8601_timestamp};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, output: &EventOutput) -> String {
        format!(
            "{},{},{:.4},{},{}",
            iso8601_timestamp(),
            output.sample_index,
            output.seconds,
            output.event.kind(),
            output.event.value()
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,sample,seconds,event,value")
    }
}
