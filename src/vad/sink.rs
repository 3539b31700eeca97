//! Segment sink: detected slices in, WAV files out.
//!
//! The sink is pure data-in / bytes-out — it sees already-resampled,
//! already-normalized buffers and owns nothing but the output directory
//! and the running file counter. Files are named `segment_<N>.wav` with
//! `N` starting at 1; the counter advances only on a successful write.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio::wav::write_wav_file;
use crate::error::Result;

use super::VadDetector;

pub struct SegmentSink {
    output_dir: PathBuf,
    sample_rate: u32,
    counter: u32,
}

impl SegmentSink {
    /// Create the sink, creating `output_dir` if needed.
    pub fn new(output_dir: impl Into<PathBuf>, sample_rate: u32) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            sample_rate,
            counter: 0,
        })
    }

    /// Write `samples` as the next numbered segment file.
    pub fn write_next(&mut self, samples: &[f32]) -> Result<PathBuf> {
        let next = self.counter + 1;
        let path = self.output_dir.join(format!("segment_{next}.wav"));
        write_wav_file(&path, samples, self.sample_rate)?;
        self.counter = next;
        debug!(path = ?path, samples = samples.len(), "segment written");
        Ok(path)
    }

    /// Segments successfully written so far.
    pub fn count(&self) -> u32 {
        self.counter
    }
}

/// Batch export: run a full `process_audio` pass over `samples` and write
/// each detected segment as a WAV under `output_dir`.
///
/// Slices are written exactly as detected — no padding and no
/// normalization, unlike the streaming emitter. Returns the segment count;
/// a failed write aborts the export.
pub fn export_segments(
    detector: &mut VadDetector,
    samples: &[f32],
    output_dir: impl AsRef<Path>,
) -> Result<usize> {
    let spans = detector.segment_sample_spans(samples)?;
    let mut sink = SegmentSink::new(output_dir.as_ref(), detector.config().sample_rate)?;
    for &(start, end) in &spans {
        let end = (end as usize).min(samples.len());
        let start = (start as usize).min(end);
        sink.write_next(&samples[start..end])?;
    }
    Ok(spans.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ScriptedModel;
    use crate::vad::VadConfig;

    #[test]
    fn files_numbered_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = SegmentSink::new(dir.path(), 16_000).unwrap();

        sink.write_next(&vec![0.1f32; 512]).unwrap();
        sink.write_next(&vec![0.2f32; 256]).unwrap();

        assert_eq!(sink.count(), 2);
        assert!(dir.path().join("segment_1.wav").exists());
        assert!(dir.path().join("segment_2.wav").exists());
        assert!(!dir.path().join("segment_0.wav").exists());
    }

    #[test]
    fn export_writes_unnormalized_slices() {
        let mut probs = vec![0.9f32; 20];
        probs.extend(vec![0.0f32; 20]);
        let mut detector = VadDetector::with_model(
            VadConfig::default(),
            Box::new(ScriptedModel::new(probs)),
        )
        .unwrap();

        // Quiet constant signal: normalization would boost it to 0.9 peak,
        // batch export must leave it at 0.25.
        let audio = vec![0.25f32; 512 * 40];
        let dir = tempfile::tempdir().unwrap();
        let written = export_segments(&mut detector, &audio, dir.path()).unwrap();
        assert_eq!(written, 1);

        let mut reader = hound::WavReader::open(dir.path().join("segment_1.wav")).unwrap();
        let peak = reader
            .samples::<i16>()
            .map(|s| (s.unwrap() as f32 / 32768.0).abs())
            .fold(0.0f32, f32::max);
        assert!((peak - 0.25).abs() < 0.01, "peak {peak}");
    }

    #[test]
    fn export_with_no_segments_writes_nothing() {
        let mut detector = VadDetector::with_model(
            VadConfig::default(),
            Box::new(ScriptedModel::constant(0.0, 40)),
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let written = export_segments(&mut detector, &vec![0.0f32; 512 * 40], dir.path()).unwrap();
        assert_eq!(written, 0);
        assert!(!dir.path().join("segment_1.wav").exists());
    }
}
