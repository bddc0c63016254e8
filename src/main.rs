use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::Sender;

use samplefilter::audio::{AudioSource, DeviceSource, SampleSource, SampleStream, WavFileSource};
use samplefilter::config::{FilterKind, SamplePeriod, SystemConfig};
use samplefilter::constants::DEVICE_BUFFER_FRAMES;
use samplefilter::control::Command;
use samplefilter::dtmf::{DtmfAction, DtmfDetector, KeySequencer, LogIndicator, SequenceEvent};
use samplefilter::processing::{LatchActuator, SamplingLoop, TickOutcome};
use samplefilter::sampling::{ClockSource, MonotonicClock, SimulatedClock};

#[derive(Parser, Debug)]
#[command(name = "samplefilter")]
#[command(about = "Fixed-rate sampling, filtering and DTMF detection", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Read samples from a WAV file instead of the input device
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// WAV channel to use (0-based)
    #[arg(long, default_value = "0")]
    channel: usize,

    /// Input device name (substring match)
    #[arg(short = 'd', long)]
    device: Option<String>,

    /// Initial filter
    #[arg(short = 'f', long, value_enum)]
    filter: Option<FilterKind>,

    /// Sample rate or period (e.g., "8000", "125us")
    #[arg(short = 'r', long)]
    rate: Option<SamplePeriod>,

    /// Decode DTMF keys from the filtered signal
    #[arg(long)]
    dtmf: bool,

    /// Start a capture as soon as sampling begins
    #[arg(long)]
    capture: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => SystemConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SystemConfig::default(),
    };
    if let Some(kind) = args.filter {
        config.filter.kind = kind;
    }
    if let Some(rate) = args.rate {
        config.sampling.period = rate;
    }

    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
    if args.capture {
        cmd_tx.send(Command::StartCapture)?;
    }
    spawn_command_reader(cmd_tx);

    let mut sampling = SamplingLoop::new(&config, LatchActuator::default())?
        .with_commands(cmd_rx)
        .with_export(Box::new(std::io::stdout()), &config);
    if args.dtmf {
        let detector =
            DtmfDetector::from_config(&config.detection, config.sampling.period.as_hz())?;
        sampling = sampling.with_detector(detector);
    }

    eprintln!("=== samplefilter ===");
    eprintln!("Sample rate: {}", config.sampling.period);
    eprintln!("Filter: {}", config.filter.kind.label());
    eprintln!("Commands: 0-4 select filter, c capture, s export, r reset, DATA:x, PROCESS:x");

    let period_us = config.sampling.period.as_interval_us();
    match &args.input {
        Some(path) => {
            let source = WavFileSource::new(path, DEVICE_BUFFER_FRAMES as usize, args.channel)
                .with_context(|| format!("opening {}", path.display()))?;
            let wav_rate = source.sample_rate();
            if wav_rate as f32 != config.sampling.period.as_hz() {
                log::warn!(
                    "WAV is {} Hz, sampling at {}",
                    wav_rate,
                    config.sampling.period
                );
            }
            // offline input runs as fast as possible on simulated time
            let clock = SimulatedClock::new(0);
            let mut stream = SampleStream::new(source);
            run(&mut sampling, &mut stream, &clock, |c| c.advance(period_us));
        }
        None => {
            let rate = config.sampling.period.as_hz().round() as u32;
            let source =
                DeviceSource::new(rate, 1, DEVICE_BUFFER_FRAMES, args.device.as_deref())?;
            let clock = MonotonicClock::new();
            let mut stream = SampleStream::new(source);
            run(&mut sampling, &mut stream, &clock, |_| std::thread::yield_now());
        }
    }

    let stats = sampling.stats();
    eprintln!(
        "Processed {} samples, {} overruns, filter time mean {:.2} us max {:.2} us",
        stats.samples, stats.overruns, stats.mean_us, stats.max_us
    );
    Ok(())
}

/// Tick until the source runs dry; `idle` runs after every pass
fn run<S, C, F>(sampling: &mut SamplingLoop<LatchActuator>, source: &mut S, clock: &C, idle: F)
where
    S: SampleSource,
    C: ClockSource,
    F: Fn(&C),
{
    let mut sequencer = KeySequencer::new();
    let mut indicator = LogIndicator::default();

    loop {
        match sampling.tick(clock.now_us(), source) {
            TickOutcome::Exhausted => break,
            TickOutcome::Sampled(report) => {
                if let Some(key) = report.key {
                    eprintln!("Key: {}", key);
                    if let SequenceEvent::Completed(command) = sequencer.push(key) {
                        let action = DtmfAction::from_sequence(&command);
                        eprintln!("Sequence *{}# -> {}", command, action);
                        action.execute(&mut indicator);
                    }
                }
            }
            TickOutcome::Idle => {}
        }
        idle(clock);
    }
}

/// Parse stdin lines into commands for the sampling loop
fn spawn_command_reader(tx: Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        }
    });
}
