//! Streaming segmenter: chunk-fed detection with WAV emission.
//!
//! The stream overlays debounced consecutive-window counters on the
//! per-frame kernel instead of reusing the batch hysteresis machine:
//! two consecutive speech windows open a segment (backdated to the first
//! of them), a debounced silence run closes it, and each closed segment
//! is padded, optionally resampled, peak-normalized and written as
//! `segment_<N>.wav`.
//!
//! Chunk tails are buffered, not discarded: frames are cut from the
//! accumulated session buffer at a cursor, so any chunking of the same
//! audio produces identical framing. The accumulated buffer keeps the
//! whole session so every emitted slice stays addressable.
//!
//! The stream borrows its detector mutably for its whole life — dropping
//! the detector while a stream exists is a compile error, and nothing else
//! can touch the detector mid-stream.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::audio::resample::resample;
use crate::error::Result;

use super::sink::SegmentSink;
use super::VadDetector;

/// Consecutive speech windows required before a segment opens.
const MIN_SPEECH_WINDOWS: u32 = 2;

pub struct VadStream<'d> {
    detector: &'d mut VadDetector,
    sink: SegmentSink,
    sample_rate: u32,
    output_rate: u32,
    window: usize,
    min_silence_windows: u32,
    min_speech_samples: u64,
    speech_pad_samples: u64,

    /// Every sample ever pushed into this stream.
    accumulated: Vec<f32>,
    /// Samples already cut into windows; `accumulated[framed..]` is the tail
    /// still waiting for a full window.
    framed: usize,

    in_speech: bool,
    speech_start_sample: u64,
    speech_end_sample: u64,
    consec_speech: u32,
    consec_silence: u32,
}

impl<'d> VadStream<'d> {
    /// Stream at the detector's sample rate, writing segments to `output_dir`.
    pub fn new(detector: &'d mut VadDetector, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let rate = detector.config().sample_rate;
        Self::with_output_rate(detector, output_dir, rate)
    }

    /// Stream writing WAV files at `output_rate` instead of the input rate.
    pub fn with_output_rate(
        detector: &'d mut VadDetector,
        output_dir: impl Into<PathBuf>,
        output_rate: u32,
    ) -> Result<Self> {
        if output_rate == 0 {
            return Err(crate::error::VocalisError::Config(
                "output sample rate must be positive".into(),
            ));
        }
        let config = detector.config();
        let sample_rate = config.sample_rate;
        let window = config.window_size();
        let min_silence_windows =
            (u64::from(sample_rate) * u64::from(config.min_silence_ms) / 1000) as u32
                / window as u32
                + 1;
        let min_speech_samples = config.min_speech_samples();
        let speech_pad_samples = config.speech_pad_samples();
        let sink = SegmentSink::new(output_dir, output_rate)?;

        Ok(Self {
            detector,
            sink,
            sample_rate,
            output_rate,
            window,
            min_silence_windows,
            min_speech_samples,
            speech_pad_samples,
            accumulated: Vec::new(),
            framed: 0,
            in_speech: false,
            speech_start_sample: 0,
            speech_end_sample: 0,
            consec_speech: 0,
            consec_silence: 0,
        })
    }

    /// Feed a chunk of any length at the stream's sample rate.
    ///
    /// Returns the number of segments written during this call. An
    /// inference failure propagates with the stream positioned exactly
    /// after the last successful frame; the failed chunk's samples stay
    /// buffered.
    pub fn process_chunk(&mut self, samples: &[f32]) -> Result<usize> {
        self.accumulated.extend_from_slice(samples);

        let mut written = 0;
        while self.framed + self.window <= self.accumulated.len() {
            let t = self.framed as u64;
            let result = self
                .detector
                .infer_frame(&self.accumulated[self.framed..self.framed + self.window])?;
            self.framed += self.window;
            if self.observe_window(result.is_voice, t) {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Feed a chunk captured at `input_sample_rate`, coercing it to the
    /// stream's rate with the linear resampler first when they differ.
    pub fn process_chunk_resampled(
        &mut self,
        samples: &[f32],
        input_sample_rate: u32,
    ) -> Result<usize> {
        if input_sample_rate == self.sample_rate {
            return self.process_chunk(samples);
        }
        let coerced = resample(samples, input_sample_rate, self.sample_rate);
        self.process_chunk(&coerced)
    }

    /// Close the stream: emit a still-open segment if it meets the minimum
    /// speech duration, and return the total number of segments written.
    pub fn finalize(mut self) -> Result<u32> {
        if self.in_speech
            && self.speech_end_sample - self.speech_start_sample >= self.min_speech_samples
        {
            self.emit(self.speech_start_sample, self.speech_end_sample);
        }
        debug!(total = self.sink.count(), "stream finalized");
        Ok(self.sink.count())
    }

    /// Segments written so far.
    pub fn segments_written(&self) -> u32 {
        self.sink.count()
    }

    /// Samples pushed but not yet framed (always less than one window).
    pub fn buffered_samples(&self) -> usize {
        self.accumulated.len() - self.framed
    }

    /// Samples consumed by framing so far.
    pub fn samples_processed(&self) -> u64 {
        self.framed as u64
    }

    /// Advance the debounce counters for the window starting at sample `t`.
    /// Returns true when a segment was closed *and* written.
    fn observe_window(&mut self, is_voice: bool, t: u64) -> bool {
        if is_voice {
            self.consec_speech += 1;
            self.consec_silence = 0;
            if !self.in_speech && self.consec_speech >= MIN_SPEECH_WINDOWS {
                self.in_speech = true;
                // Backdate to the first window of the run.
                self.speech_start_sample =
                    t - u64::from(self.consec_speech - 1) * self.window as u64;
                debug!(start = self.speech_start_sample, "stream speech onset");
            }
            if self.in_speech {
                self.speech_end_sample = t + self.window as u64;
            }
            false
        } else {
            self.consec_silence += 1;
            self.consec_speech = 0;
            if self.in_speech && self.consec_silence >= self.min_silence_windows {
                let (start, end) = (self.speech_start_sample, self.speech_end_sample);
                self.in_speech = false;
                self.consec_speech = 0;
                self.consec_silence = 0;
                if end - start >= self.min_speech_samples {
                    return self.emit(start, end);
                }
                debug!(start, end, "dropping short stream segment");
            }
            false
        }
    }

    /// Pad, slice, resample, normalize and write one segment.
    /// Returns false (and keeps the counter) when the WAV write fails.
    fn emit(&mut self, start: u64, end: u64) -> bool {
        let padded_start = start.saturating_sub(self.speech_pad_samples) as usize;
        let padded_end = ((end + self.speech_pad_samples) as usize).min(self.accumulated.len());
        let slice = &self.accumulated[padded_start..padded_end];

        let mut audio = if self.output_rate != self.sample_rate {
            resample(slice, self.sample_rate, self.output_rate)
        } else {
            slice.to_vec()
        };

        let peak = audio.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        if peak > 0.0 {
            let gain = 0.9 / peak;
            for sample in &mut audio {
                *sample *= gain;
            }
        }

        match self.sink.write_next(&audio) {
            Ok(path) => {
                debug!(?path, start, end, "stream segment emitted");
                true
            }
            Err(e) => {
                warn!(start, end, "segment write failed, skipping: {e}");
                false
            }
        }
    }
}
