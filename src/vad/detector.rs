//! `VadDetector` — the public detection façade.
//!
//! Construction is initialization: `new` loads the model and returns a
//! ready detector or fails with a model-load error; an uninitialized
//! detector value is unrepresentable. `reset()` returns the detector to
//! its freshly-constructed state any number of times, and inference
//! resources are released on drop.

#[cfg(feature = "onnx")]
use std::path::Path;

use tracing::error;

use crate::error::{Result, VocalisError};
use crate::inference::AcousticModel;

#[cfg(feature = "onnx")]
use crate::inference::SileroSession;

use super::batch::BatchSegmenter;
use super::frame::FrameEngine;
use super::{VadConfig, VadResult, VadSegment};

pub struct VadDetector {
    config: VadConfig,
    engine: FrameEngine,
    batch: BatchSegmenter,
}

impl std::fmt::Debug for VadDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VadDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl VadDetector {
    /// Load the Silero model from `model_path` and build a ready detector.
    #[cfg(feature = "onnx")]
    pub fn new(config: VadConfig, model_path: impl AsRef<Path>) -> Result<Self> {
        let model = SileroSession::from_file(model_path)?;
        Self::with_model(config, Box::new(model))
    }

    /// Build a detector over any `AcousticModel` implementation.
    pub fn with_model(config: VadConfig, model: Box<dyn AcousticModel>) -> Result<Self> {
        config.validate()?;
        let window = config.window_size();
        Ok(Self {
            engine: FrameEngine::new(model, config.sample_rate, window),
            batch: BatchSegmenter::new(&config),
            config,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &VadConfig {
        &self.config
    }

    /// Run exactly one window through the model without touching the batch
    /// state machine. This is the shared per-frame kernel under both
    /// `process_chunk` and the streaming segmenter.
    ///
    /// # Errors
    /// `BadFrameSize` if `samples` is not exactly one window;
    /// `Inference` if the forward pass fails. Neither mutates any state.
    pub fn infer_frame(&mut self, samples: &[f32]) -> Result<VadResult> {
        let window = self.engine.window();
        if samples.len() != window {
            return Err(VocalisError::BadFrameSize {
                got: samples.len(),
                expected: window,
            });
        }
        let probability = self.engine.advance(samples)?;
        let frame_start = self.engine.current_sample() - window as u64;
        Ok(VadResult {
            is_voice: probability >= self.config.threshold,
            probability,
            timestamp_ms: (frame_start * 1000 / u64::from(self.config.sample_rate)) as i64,
        })
    }

    /// Score one window and advance the batch segmentation machine.
    ///
    /// Segments detected this way accumulate internally and are returned by
    /// the next `process_audio` pass; chunk-fed callers who want segment
    /// output should use `VadStream` instead.
    pub fn process_chunk(&mut self, samples: &[f32]) -> Result<VadResult> {
        let result = self.infer_frame(samples)?;
        self.batch
            .observe(result.probability, self.engine.current_sample());
        Ok(result)
    }

    /// Batch pass: reset, consume `samples` in consecutive windows (dropping
    /// any final partial window) and return the detected segments.
    ///
    /// An inference failure aborts the pass; the segments finalized before
    /// the failure are returned and the error is logged.
    pub fn process_audio(&mut self, samples: &[f32]) -> Result<Vec<VadSegment>> {
        self.reset();
        let window = self.engine.window();
        for frame in samples.chunks_exact(window) {
            match self.engine.advance(frame) {
                Ok(prob) => self.batch.observe(prob, self.engine.current_sample()),
                Err(e) => {
                    error!(
                        at_sample = self.engine.current_sample(),
                        "inference failed mid-pass, aborting: {e}"
                    );
                    return Ok(self.batch.segments().to_vec());
                }
            }
        }
        self.batch.finalize(samples.len() as u64);
        Ok(self.batch.segments().to_vec())
    }

    /// Batch pass returning per-segment `[start, end)` **sample** indices,
    /// for callers slicing PCM directly.
    pub fn segment_sample_spans(&mut self, samples: &[f32]) -> Result<Vec<(u64, u64)>> {
        let rate = f64::from(self.config.sample_rate);
        let spans = self
            .process_audio(samples)?
            .iter()
            .map(|seg| {
                (
                    (f64::from(seg.start_time_s) * rate).round() as u64,
                    (f64::from(seg.end_time_s) * rate).round() as u64,
                )
            })
            .collect();
        Ok(spans)
    }

    /// Zero the model context, recurrent state and sample clock, and clear
    /// all segmentation state.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.batch.reset();
    }
}
