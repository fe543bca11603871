//! WAV boundary adapter.
//!
//! The pipeline itself never parses or writes containers; this module plays
//! the external decoder/encoder roles for uncompressed WAV so the repo is
//! usable end to end. Samples cross the boundary as interleaved f32.

use crate::error::WavError;
use crate::types::SignalBuffer;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Export sample encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Pcm16,
    #[default]
    Float32,
}

/// Load a WAV file, normalizing integer PCM to f32 in [-1, 1] and keeping
/// the channel layout interleaved as stored.
pub fn load<P: AsRef<Path>>(path: P) -> Result<SignalBuffer, WavError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
    };

    Ok(SignalBuffer::new(samples, spec.sample_rate, spec.channels))
}

/// Write the processed buffer out unchanged: the sample values and rate
/// handed over are exactly the final processed ones.
pub fn export<P: AsRef<Path>>(
    path: P,
    buffer: &SignalBuffer,
    format: ExportFormat,
) -> Result<(), WavError> {
    let spec = WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: match format {
            ExportFormat::Pcm16 => 16,
            ExportFormat::Float32 => 32,
        },
        sample_format: match format {
            ExportFormat::Pcm16 => SampleFormat::Int,
            ExportFormat::Float32 => SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::create(path, spec)?;
    match format {
        ExportFormat::Pcm16 => {
            for &s in &buffer.samples {
                writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
            }
        }
        ExportFormat::Float32 => {
            for &s in &buffer.samples {
                writer.write_sample(s)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}
