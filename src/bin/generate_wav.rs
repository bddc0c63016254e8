use anyhow::{Context, Result};
use clap::Parser;
use samplefilter::save_wav;
use samplefilter::simulation::{
    AdditiveNoiseConfig, HumConfig, ImpulseNoiseConfig, NoiseConfig, apply_noise,
    generate_dtmf_sequence, key_frequencies,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate synthetic DTMF WAV files with configurable noise")]
struct Args {
    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Key sequences, comma-separated (e.g., "*1#,*25#,0123")
    #[arg(short, long, default_value = "*1#,*0#,*2#,*3#")]
    keys: String,

    /// Number of trials per sequence
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Tone length per key in milliseconds
    #[arg(long, default_value_t = 100.0)]
    tone_ms: f32,

    /// Silence between keys in milliseconds
    #[arg(long, default_value_t = 100.0)]
    gap_ms: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 8000)]
    sample_rate: u32,

    /// Output filename prefix
    #[arg(long, default_value = "dtmf")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f32>,

    /// Mains hum frequency in Hz (CLI override)
    #[arg(long)]
    hum_hz: Option<f32>,

    /// Impulse noise rate in Hz (CLI override)
    #[arg(long)]
    impulse_rate: Option<f32>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    keys: String,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: u32,
    tone_ms: f32,
    gap_ms: f32,
    files: Vec<ManifestEntry>,
}

fn parse_sequences(s: &str) -> Result<Vec<String>> {
    s.split(',')
        .map(|part| {
            let keys = part.trim().to_ascii_uppercase();
            if keys.is_empty() {
                anyhow::bail!("Empty key sequence in {:?}", s);
            }
            if let Some(bad) = keys.chars().find(|&c| key_frequencies(c).is_none()) {
                anyhow::bail!("'{}' is not a DTMF key", bad);
            }
            Ok(keys)
        })
        .collect()
}

/// `*` and `#` are not filename-friendly
fn file_label(keys: &str) -> String {
    keys.chars()
        .map(|c| match c {
            '*' => 's',
            '#' => 'p',
            other => other,
        })
        .collect()
}

fn load_toml_config(path: &PathBuf) -> Result<NoiseConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(base: &NoiseConfig, args: &Args, seed: u64) -> NoiseConfig {
    let mut config = base.clone().with_seed(seed);

    if let Some(snr) = args.snr {
        config.additive = Some(AdditiveNoiseConfig { snr_db: snr });
    }

    if let Some(hum_hz) = args.hum_hz {
        config.hum = Some(HumConfig {
            freq_hz: hum_hz,
            amplitude: 0.2,
        });
    }

    if let Some(impulse_rate) = args.impulse_rate {
        config.impulse = Some(ImpulseNoiseConfig {
            rate_hz: impulse_rate,
            amplitude: 1.0,
            duration_samples: 3,
        });
    }

    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let base_noise = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        NoiseConfig::default()
    };

    let sequences = parse_sequences(&args.keys)?;
    let base_seed = args.seed.unwrap_or(0);
    let sample_rate = args.sample_rate as f32;

    let mut manifest_entries = Vec::new();
    let total_files = sequences.len() * args.trials as usize;
    let mut file_count = 0;

    for (n, keys) in sequences.iter().enumerate() {
        let clean = generate_dtmf_sequence(
            keys,
            args.tone_ms / 1000.0,
            args.gap_ms / 1000.0,
            sample_rate,
        );

        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + n as u64;
            let noise_config = build_noise_config(&base_noise, &args, seed);
            let signal = apply_noise(&clean, &noise_config, sample_rate);

            let filename = format!("{}_{}_t{:02}.wav", args.prefix, file_label(keys), trial);
            let filepath = args.output_dir.join(&filename);

            save_wav(&filepath, &signal, args.sample_rate).context("Failed to write WAV file")?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                keys: keys.clone(),
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: args.sample_rate,
            tone_ms: args.tone_ms,
            gap_ms: args.gap_ms,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
