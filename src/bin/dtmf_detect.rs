use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use samplefilter::audio::{AudioSource, WavFileSource};
use samplefilter::config::{FilterKind, SamplePeriod, SystemConfig};
use samplefilter::dtmf::{
    DtmfAction, DtmfDetector, KeySequencer, LogIndicator, SequenceEvent, ToneMonitor,
};
use samplefilter::output::{
    DetectionEvent, EventOutput, Formatter, OutputFormat, create_formatter,
};
use samplefilter::sampling::CaptureBuffer;
use samplefilter::signal_processing::{BandEvent, Filter, FilterBank};

#[derive(Parser, Debug)]
#[command(name = "dtmf_detect")]
#[command(about = "Decode DTMF keys and monitor tones in WAV files", long_about = None)]
struct Args {
    /// WAV files to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Filter applied before detection
    #[arg(long, value_enum)]
    filter: Option<FilterKind>,

    /// WAV channel to analyze (0-based)
    #[arg(long, default_value = "0")]
    channel: usize,

    /// Goertzel block size in samples
    #[arg(long)]
    block_size: Option<usize>,

    /// Goertzel magnitude threshold
    #[arg(long)]
    threshold: Option<f32>,

    /// Also watch single tones through narrow bandpass filters (Hz, repeatable)
    #[arg(short = 't', long = "tone")]
    tones: Vec<f32>,

    /// Dump audio to WAV file (stereo: left=input, right=filtered)
    #[arg(long)]
    dump_audio: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileAnalysis {
    filename: String,
    sample_rate: u32,
    sample_count: usize,
    keys: String,
    sequences: Vec<String>,
    low_energy: Option<StatsSummary>,
    high_energy: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
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
        Some(path) => SystemConfig::load(path)?,
        None => SystemConfig::default(),
    };
    if let Some(kind) = args.filter {
        config.filter.kind = kind;
    }
    if let Some(block_size) = args.block_size {
        config.detection.block_size = block_size;
    }
    if let Some(threshold) = args.threshold {
        config.detection.threshold = threshold;
    }

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| analyze_file(path, &config, &args, formatter.as_ref()))
        .collect();

    match args.format {
        OutputFormat::Json => eprintln!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text | OutputFormat::Csv => print_summary(&results),
    }

    Ok(())
}

fn analyze_file(
    path: &Path,
    config: &SystemConfig,
    args: &Args,
    formatter: &dyn Formatter,
) -> FileAnalysis {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match analyze_file_impl(path, &filename, config, args, formatter) {
        Ok(analysis) => analysis,
        Err(e) => FileAnalysis {
            filename,
            sample_rate: 0,
            sample_count: 0,
            keys: String::new(),
            sequences: Vec::new(),
            low_energy: None,
            high_energy: None,
            error: Some(format!("{:#}", e)),
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    filename: &str,
    config: &SystemConfig,
    args: &Args,
    formatter: &dyn Formatter,
) -> anyhow::Result<FileAnalysis> {
    let mut source = WavFileSource::new(path, 1024, args.channel)?;
    let sample_rate = source.sample_rate();

    // the file decides the rate
    let mut config = config.clone();
    config.sampling.period = SamplePeriod::from_hz(sample_rate as f32);
    config.validate()?;
    let rate = sample_rate as f32;

    let mut bank = FilterBank::from_config(&config)?;
    let mut detector = DtmfDetector::from_config(&config.detection, rate)?;
    let mut monitors = args
        .tones
        .iter()
        .map(|&tone| ToneMonitor::designed(tone, rate, &config.detection))
        .collect::<samplefilter::Result<Vec<_>>>()?;
    let mut sequencer = KeySequencer::new();
    let mut indicator = LogIndicator::default();
    let mut dump = args
        .dump_audio
        .as_ref()
        .map(|_| CaptureBuffer::new(source.len()));

    let mut low_stats: Stats<f32> = Stats::new();
    let mut high_stats: Stats<f32> = Stats::new();
    let mut keys = String::new();
    let mut sequences = Vec::new();
    let block_size = detector.block_size();

    let emit = |index: u64, event: DetectionEvent| {
        let output = EventOutput {
            sample_index: index,
            seconds: index as f32 / rate,
            event,
        };
        println!("{}", formatter.format(&output));
    };

    let mut index: u64 = 0;
    while let Some(buffer) = source.next_buffer()? {
        for raw in buffer {
            let filtered = bank.process(raw);
            if let Some(capture) = dump.as_mut() {
                capture.push(raw, filtered);
            }

            for monitor in monitors.iter_mut() {
                if let Some(tone) = monitor.process(filtered) {
                    emit(
                        index,
                        DetectionEvent::Tone {
                            tone_hz: tone.tone_hz,
                            detected: tone.event == BandEvent::Detected,
                        },
                    );
                }
            }

            let key = detector.push_sample(filtered);
            if (index + 1) % block_size as u64 == 0 {
                if let Some(analysis) = detector.last_analysis() {
                    low_stats.update(analysis.low[analysis.low_index]);
                    high_stats.update(analysis.high[analysis.high_index]);
                }
            }

            if let Some(key) = key {
                keys.push(key);
                emit(index, DetectionEvent::Key(key));
                if let SequenceEvent::Completed(command) = sequencer.push(key) {
                    let action = DtmfAction::from_sequence(&command);
                    action.execute(&mut indicator);
                    emit(index, DetectionEvent::Sequence(command.clone()));
                    emit(index, DetectionEvent::Action(action.to_string()));
                    sequences.push(command);
                }
            }
            index += 1;
        }
    }

    if let (Some(dir), Some(capture)) = (args.dump_audio.as_ref(), dump.as_mut()) {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let dump_path = dir.join(format!("{}_filtered.wav", stem));
        capture.seal();
        eprintln!("Writing {} samples to {}", capture.len(), dump_path.display());
        samplefilter::save_capture_wav(&dump_path, capture.drain(), sample_rate)?;
    }

    Ok(FileAnalysis {
        filename: filename.to_string(),
        sample_rate,
        sample_count: index as usize,
        keys,
        sequences,
        low_energy: StatsSummary::from_stats(&low_stats),
        high_energy: StatsSummary::from_stats(&high_stats),
        error: None,
    })
}

fn print_summary(results: &[FileAnalysis]) {
    eprintln!();
    eprintln!(
        "{:<40} {:>8} {:>10} {:>12} {:>12}  Keys",
        "File", "Rate", "Samples", "LowPeak", "HighPeak"
    );
    eprintln!("{}", "-".repeat(96));

    for result in results {
        if let Some(ref err) = result.error {
            eprintln!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }
        let peak = |s: &Option<StatsSummary>| {
            s.as_ref()
                .map(|s| format!("{:.1}", s.max))
                .unwrap_or_else(|| "-".to_string())
        };
        eprintln!(
            "{:<40} {:>8} {:>10} {:>12} {:>12}  {}",
            result.filename,
            result.sample_rate,
            result.sample_count,
            peak(&result.low_energy),
            peak(&result.high_energy),
            result.keys
        );
        if !result.sequences.is_empty() {
            eprintln!("  Sequences: {}", result.sequences.join(", "));
        }
    }
}
