use super::{EventOutput, Formatter, iso8601_timestamp};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, output: &EventOutput) -> String {
        serde_json::json!({
            "ts": iso8601_timestamp(),
            "sample": output.sample_index,
            "seconds": output.seconds,
            "event": output.event.kind(),
            "value": output.event.value(),
        })
        .to_string()
    }
}
