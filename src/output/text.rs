use super::{DetectionEvent, EventOutput, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, output: &EventOutput) -> String {
        let body = match &output.event {
            DetectionEvent::Key(k) => format!("Key detected: {}", k),
            DetectionEvent::Sequence(s) => format!("Sequence complete: {}", s),
            DetectionEvent::Action(a) => format!("Action: {}", a),
            DetectionEvent::Tone { tone_hz, detected } => format!(
                "Tone {:.0} Hz {}",
                tone_hz,
                if *detected { "DETECTED" } else { "lost" }
            ),
        };
        if self.verbose {
            format!(
                "[{:>8.3} s, sample {:>8}] {}",
                output.seconds, output.sample_index, body
            )
        } else {
            format!("[{:>8.3} s] {}", output.seconds, body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_format() {
        let out = EventOutput {
            sample_index: 8000,
            seconds: 1.0,
            event: DetectionEvent::Key('5'),
        };
        assert_eq!(TextFormatter::new(false).format(&out), "[   1.000 s] Key detected: 5");
        assert!(TextFormatter::new(true).format(&out).contains("sample     8000"));
    }
}
