use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::sampling::CaptureRecord;

/// Write mono float samples
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Dump a capture as stereo: left = input, right = filtered output
pub fn save_capture_wav<P, I>(path: P, records: I, sample_rate: u32) -> Result<(), hound::Error>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = CaptureRecord>,
{
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for record in records {
        writer.write_sample(record.raw)?;
        writer.write_sample(record.filtered)?;
    }
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::CaptureBuffer;

    #[test]
    fn test_capture_dump_is_stereo() {
        let mut capture = CaptureBuffer::new(3);
        capture.push(0.5, 0.25);
        capture.push(-0.5, -0.25);

        let path = std::env::temp_dir().join(format!("capture_{}.wav", std::process::id()));
        save_capture_wav(&path, capture.records(), 8000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.5, 0.25, -0.5, -0.25]);
        std::fs::remove_file(&path).unwrap();
    }
}
