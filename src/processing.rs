use std::io::Write;
use std::time::Instant;

use crossbeam_channel::{Receiver, TryRecvError};
use rolling_stats::Stats;

use crate::audio::SampleSource;
use crate::config::SystemConfig;
use crate::control::Command;
use crate::dtmf::DtmfDetector;
use crate::error::Result;
use crate::output::{ExportWriter, timestamp_millis};
use crate::sampling::{
    AdcScale, CaptureBuffer, InputRange, OutputQuantizer, PushStatus, SampleClock,
};
use crate::signal_processing::{Filter, FilterBank};

/// Receives one quantized output code per processed sample (DAC, PWM pin)
pub trait Actuator {
    fn write(&mut self, code: u16);
}

/// Actuator that keeps the last code and a count
#[derive(Debug, Default)]
pub struct LatchActuator {
    pub last_code: Option<u16>,
    pub writes: u64,
}

impl Actuator for LatchActuator {
    fn write(&mut self, code: u16) {
        self.last_code = Some(code);
        self.writes += 1;
    }
}

/// Everything that happened to one accepted sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleReport {
    /// Acquired value after clamping
    pub input: f32,
    pub output: f32,
    pub code: u16,
    /// Capture status when a capture is running
    pub capture: Option<PushStatus>,
    /// DTMF key, reported on change only
    pub key: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The period has not elapsed yet
    Idle,
    Sampled(SampleReport),
    /// The source has no more samples
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    Done,
    /// Result of a `PROCESS` command
    Processed(f32),
    /// Number of records written by an export
    Exported(usize),
}

/// Processing-time statistics in microseconds
#[derive(Debug, Clone, Copy)]
pub struct LoopStats {
    pub samples: u64,
    pub overruns: u64,
    pub mean_us: f32,
    pub max_us: f32,
}

/// Single-threaded cooperative sampling loop
///
/// Each [`tick`](Self::tick) polls pending commands, checks the sample clock
/// and, when a period has elapsed, runs one sample to completion: acquire,
/// clamp, filter, quantize, actuate, capture and detect.
pub struct SamplingLoop<A: Actuator> {
    clock: SampleClock,
    adc: AdcScale,
    input_range: InputRange,
    bank: FilterBank,
    quantizer: OutputQuantizer,
    actuator: A,
    capture: CaptureBuffer,
    capturing: bool,
    progress_interval: usize,
    detector: Option<DtmfDetector>,
    commands: Option<Receiver<Command>>,
    export: Option<ExportWriter<Box<dyn Write + Send>>>,
    timing: Stats<f32>,
    samples: u64,
    overruns: u64,
}

impl<A: Actuator> SamplingLoop<A> {
    pub fn new(config: &SystemConfig, actuator: A) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clock: SampleClock::new(config.sampling.period.as_interval_us()),
            adc: AdcScale::from(&config.sampling),
            input_range: InputRange::from(&config.sampling),
            bank: FilterBank::from_config(config)?,
            quantizer: OutputQuantizer::from(&config.actuation),
            actuator,
            capture: CaptureBuffer::new(config.capture.capacity),
            capturing: false,
            progress_interval: config.capture.progress_interval,
            detector: None,
            commands: None,
            export: None,
            timing: Stats::new(),
            samples: 0,
            overruns: 0,
        })
    }

    /// Run DTMF detection on the filtered signal
    pub fn with_detector(mut self, detector: DtmfDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Poll this channel for commands at the start of every tick
    pub fn with_commands(mut self, rx: Receiver<Command>) -> Self {
        self.commands = Some(rx);
        self
    }

    /// Destination of `s` (export) commands
    pub fn with_export(mut self, writer: Box<dyn Write + Send>, config: &SystemConfig) -> Self {
        self.export = Some(ExportWriter::new(writer, &config.telemetry));
        self
    }

    /// One pass of the cooperative loop at time `now` (µs)
    pub fn tick<S: SampleSource + ?Sized>(&mut self, now: u32, source: &mut S) -> TickOutcome {
        self.poll_commands();

        if self.clock.overran(now) {
            self.overruns += 1;
            log::debug!(
                "Sample late by {} us",
                self.clock.elapsed(now) - self.clock.period_us()
            );
        }
        if !self.clock.should_sample(now) {
            return TickOutcome::Idle;
        }

        match source.next_sample() {
            Some(raw) => TickOutcome::Sampled(self.process_sample(raw)),
            None => TickOutcome::Exhausted,
        }
    }

    fn poll_commands(&mut self) {
        let Some(rx) = self.commands.as_ref() else {
            return;
        };
        let mut pending = Vec::new();
        let mut closed = false;
        loop {
            match rx.try_recv() {
                Ok(command) => pending.push(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }
        if closed {
            log::debug!("Command channel closed");
            self.commands = None;
        }
        for command in pending {
            if let Err(e) = self.handle_command(command) {
                log::warn!("Command {:?} failed: {}", command, e);
            }
        }
    }

    /// Process one ADC reading
    pub fn process_code(&mut self, code: u16) -> SampleReport {
        let volts = self.adc.to_volts(code);
        self.process_sample(volts)
    }

    /// Acquire-side processing of one raw sample
    pub fn process_sample(&mut self, raw: f32) -> SampleReport {
        let input = self.input_range.clamp(raw);

        let start = Instant::now();
        let output = self.bank.process(input);
        self.timing
            .update(start.elapsed().as_secs_f32() * 1_000_000.0);

        let code = self.quantizer.quantize(output);
        self.actuator.write(code);
        self.samples += 1;

        let capture = if self.capturing {
            Some(self.store(input, output))
        } else {
            None
        };

        let key = self
            .detector
            .as_mut()
            .and_then(|detector| detector.push_sample(output));

        SampleReport {
            input,
            output,
            code,
            capture,
            key,
        }
    }

    fn store(&mut self, input: f32, output: f32) -> PushStatus {
        let status = self.capture.push(input, output);
        match status {
            PushStatus::Sealed => {
                self.capturing = false;
                log::info!("Capture complete: {} samples", self.capture.len());
            }
            PushStatus::Stored => {
                if self.progress_interval > 0 && self.capture.len() % self.progress_interval == 0 {
                    log::info!(
                        "Captured {}/{}",
                        self.capture.len(),
                        self.capture.capacity()
                    );
                }
            }
            PushStatus::Rejected => {}
        }
        status
    }

    pub fn handle_command(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::SelectFilter(id) => {
                self.bank.select_id(id);
            }
            Command::StartCapture => {
                self.capture.reset();
                self.capturing = true;
                log::info!(
                    "Capture started ({} samples, {} filter)",
                    self.capture.capacity(),
                    self.bank.active().label()
                );
            }
            Command::Export => return self.export_capture().map(CommandOutcome::Exported),
            Command::Reset => {
                self.bank.reset_all();
                self.capture.reset();
                self.capturing = false;
                if let Some(detector) = self.detector.as_mut() {
                    detector.reset();
                }
                log::info!("Filters and capture reset");
            }
            Command::Data(value) => {
                let input = self.input_range.clamp(value);
                let output = self.bank.process(input);
                self.store(input, output);
            }
            Command::Process(value) => {
                let output = self.bank.process(self.input_range.clamp(value));
                log::info!("PROCESS {} -> {}", value, output);
                return Ok(CommandOutcome::Processed(output));
            }
        }
        Ok(CommandOutcome::Done)
    }

    fn export_capture(&mut self) -> Result<usize> {
        if self.capture.is_empty() {
            log::warn!("Nothing captured, send 'c' first");
            return Ok(0);
        }
        self.capturing = false;
        self.capture.seal();

        let Some(writer) = self.export.as_mut() else {
            log::warn!("No export destination configured");
            return Ok(0);
        };
        let count = writer.write_capture(self.capture.drain(), timestamp_millis())?;
        self.capture.reset();
        Ok(count)
    }

    pub fn stats(&self) -> LoopStats {
        let (mean_us, max_us) = if self.timing.count > 0 {
            (self.timing.mean, self.timing.max)
        } else {
            (0.0, 0.0)
        };
        LoopStats {
            samples: self.samples,
            overruns: self.overruns,
            mean_us,
            max_us,
        }
    }

    pub fn capture(&self) -> &CaptureBuffer {
        &self.capture
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn filters(&self) -> &FilterBank {
        &self.bank
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn detector(&self) -> Option<&DtmfDetector> {
        self.detector.as_ref()
    }
}
