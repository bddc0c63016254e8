use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crossbeam_channel::Receiver;
use hound::WavReader;

use super::AudioCapture;

/// Buffer-at-a-time mono audio input
pub trait AudioSource: Send {
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<f32>>>;
    fn sample_rate(&self) -> u32;
}

/// Sample-at-a-time input polled by the sampling loop
pub trait SampleSource {
    /// Next sample, or `None` when the input is exhausted
    fn next_sample(&mut self) -> Option<f32>;
}

pub struct DeviceSource {
    rx: Receiver<Vec<f32>>,
    sample_rate: u32,
    _capture: AudioCapture,
}

impl DeviceSource {
    pub fn new(
        sample_rate: u32,
        channels: u16,
        buffer_frames: u32,
        device_name: Option<&str>,
    ) -> anyhow::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(10);
        let capture = AudioCapture::new(sample_rate, channels, buffer_frames, tx, device_name)?;
        Ok(Self {
            rx,
            sample_rate,
            _capture: capture,
        })
    }
}

impl AudioSource for DeviceSource {
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<f32>>> {
        match self.rx.recv() {
            Ok(data) => Ok(Some(data)),
            Err(_) => Ok(None),
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// WAV file input; multi-channel files are reduced to one channel
pub struct WavFileSource {
    samples: Vec<f32>,
    position: usize,
    chunk_size: usize,
    sample_rate: u32,
}

impl WavFileSource {
    /// Open `path` and keep `channel` (0-based) of every frame
    pub fn new<P: AsRef<Path>>(path: P, chunk_size: usize, channel: usize) -> anyhow::Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        let channels = spec.channels as usize;
        if channel >= channels {
            anyhow::bail!("Channel {} requested from a {}-channel file", channel, channels);
        }

        let sample_rate = spec.sample_rate;
        let interleaved = Self::read_samples(reader, &spec)?;
        let samples = interleaved
            .into_iter()
            .skip(channel)
            .step_by(channels)
            .collect();

        Ok(Self {
            samples,
            position: 0,
            chunk_size: chunk_size.max(1),
            sample_rate,
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> anyhow::Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AudioSource for WavFileSource {
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<f32>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(chunk))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// In-memory samples, for tests and synthesized input
pub struct MemorySource {
    samples: Vec<f32>,
    position: usize,
}

impl MemorySource {
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl SampleSource for MemorySource {
    fn next_sample(&mut self) -> Option<f32> {
        let sample = self.samples.get(self.position).copied()?;
        self.position += 1;
        Some(sample)
    }
}

/// Adapts a buffered [`AudioSource`] to per-sample reads
pub struct SampleStream<S: AudioSource> {
    source: S,
    pending: Vec<f32>,
    position: usize,
    finished: bool,
}

impl<S: AudioSource> SampleStream<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: Vec::new(),
            position: 0,
            finished: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }
}

impl<S: AudioSource> SampleSource for SampleStream<S> {
    fn next_sample(&mut self) -> Option<f32> {
        while self.position >= self.pending.len() {
            if self.finished {
                return None;
            }
            match self.source.next_buffer() {
                Ok(Some(buffer)) => {
                    self.pending = buffer;
                    self.position = 0;
                }
                Ok(None) => self.finished = true,
                Err(e) => {
                    log::error!("Audio source failed: {}", e);
                    self.finished = true;
                }
            }
        }
        let sample = self.pending[self.position];
        self.position += 1;
        Some(sample)
    }
}
