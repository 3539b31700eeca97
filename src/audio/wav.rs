//! 16-bit PCM mono WAV encoding.
//!
//! Output is the canonical RIFF/WAVE layout: a 44-byte header (`"RIFF"`,
//! riff size, `"WAVE"`, 16-byte `fmt ` chunk with format code 1, `"data"`,
//! data size) followed by little-endian i16 samples. Out-of-range f32 input
//! is clamped here, at encode time, never earlier in the pipeline.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::pcm::f32_to_pcm16;
use crate::error::{Result, VocalisError};

fn mono_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn wav_err(e: hound::Error) -> VocalisError {
    match e {
        hound::Error::IoError(io) => VocalisError::Io(io),
        other => VocalisError::Wav(other.to_string()),
    }
}

/// Encode `samples` as 16-bit PCM mono WAV into any seekable sink.
pub fn write_wav<W: Write + Seek>(sink: W, samples: &[f32], sample_rate: u32) -> Result<()> {
    let mut writer = WavWriter::new(sink, mono_spec(sample_rate)).map_err(wav_err)?;
    for &sample in samples {
        writer.write_sample(f32_to_pcm16(sample)).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}

/// Encode `samples` as a WAV file at `path`, overwriting any existing file.
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let mut writer = WavWriter::create(path, mono_spec(sample_rate)).map_err(wav_err)?;
    for &sample in samples {
        writer.write_sample(f32_to_pcm16(sample)).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}

/// Encode `samples` into an in-memory WAV byte buffer.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, samples, sample_rate)?;
    Ok(cursor.into_inner())
}
