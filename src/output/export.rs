use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crate::config::TelemetryConfig;
use crate::constants::{EXPORT_END_MARKER, EXPORT_START_MARKER};
use crate::sampling::CaptureRecord;

/// Writes a capture in the line protocol
///
/// ```text
/// DATA_START
/// index,input,output,timestamp
/// 0,0.1250,0.0312,1718000000000
/// ...
/// DATA_END
/// ```
///
/// The sink is flushed every `flush_every` records followed by a short pause,
/// so a slow serial-style consumer is never flooded.
pub struct ExportWriter<W: Write> {
    writer: W,
    flush_every: usize,
    pause: Duration,
    include_timestamp: bool,
}

impl<W: Write> ExportWriter<W> {
    pub fn new(writer: W, config: &TelemetryConfig) -> Self {
        Self {
            writer,
            flush_every: config.flush_every,
            pause: Duration::from_millis(config.pause_ms),
            include_timestamp: config.include_timestamp,
        }
    }

    pub fn header(&self) -> &'static str {
        if self.include_timestamp {
            "index,input,output,timestamp"
        } else {
            "index,input,output"
        }
    }

    /// Write one complete export; returns the number of records written.
    ///
    /// Record `i` is stamped `base_millis + i`.
    pub fn write_capture<I>(&mut self, records: I, base_millis: u64) -> io::Result<usize>
    where
        I: IntoIterator<Item = CaptureRecord>,
    {
        writeln!(self.writer, "{}", EXPORT_START_MARKER)?;
        writeln!(self.writer, "{}", self.header())?;

        let mut count = 0;
        for record in records {
            if self.include_timestamp {
                writeln!(
                    self.writer,
                    "{},{:.4},{:.4},{}",
                    record.index,
                    record.raw,
                    record.filtered,
                    base_millis + record.index as u64
                )?;
            } else {
                writeln!(
                    self.writer,
                    "{},{:.4},{:.4}",
                    record.index, record.raw, record.filtered
                )?;
            }
            count += 1;

            if self.flush_every > 0 && count % self.flush_every == 0 {
                self.writer.flush()?;
                if !self.pause.is_zero() {
                    thread::sleep(self.pause);
                }
            }
        }

        writeln!(self.writer, "{}", EXPORT_END_MARKER)?;
        self.writer.flush()?;
        log::info!("Exported {} samples", count);
        Ok(count)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
