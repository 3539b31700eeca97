//! Voice activity detection: data model, frame pipeline, and the two
//! segmentation state machines (batch and streaming).
//!
//! The batch machine (`process_audio`) and the streaming overlay
//! (`VadStream`) are deliberately **not** equivalent: streaming requires two
//! consecutive speech windows before opening a segment and a debounced
//! silence run before closing, so boundaries can differ from the batch
//! hysteresis by a window or two. Both sit on the same per-frame kernel
//! (`VadDetector::infer_frame`).

mod batch;
mod frame;

pub mod detector;
pub mod sink;
pub mod stream;

pub use detector::VadDetector;
pub use sink::{export_segments, SegmentSink};
pub use stream::VadStream;

use crate::error::{Result, VocalisError};

/// Samples of acoustic context carried between consecutive windows.
pub const CONTEXT_SAMPLES: usize = 64;

/// Hysteresis width: speech closes at `threshold - HYSTERESIS`, not at
/// `threshold`, suppressing rapid toggling around the decision boundary.
pub(crate) const HYSTERESIS: f32 = 0.15;

/// Silence run length (ms) after which a max-speech split checkpoint is set.
pub(crate) const SPLIT_SILENCE_MS: u64 = 98;

/// True for the sample rates the detector accepts.
pub fn is_valid_sample_rate(rate: u32) -> bool {
    rate == 8000 || rate == 16_000
}

/// Detector configuration. Immutable once a detector is constructed.
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// Input sample rate (Hz). Must be 8000 or 16000. Default: 16000.
    pub sample_rate: u32,
    /// Speech probability threshold in `[0, 1]`. Default: 0.5.
    pub threshold: f32,
    /// Minimum speech duration for a segment to be emitted (ms). Default: 250.
    pub min_speech_ms: u32,
    /// Minimum silence run before a segment closes (ms). Default: 100.
    pub min_silence_ms: u32,
    /// Padding applied around emitted stream segments (ms). Default: 30.
    pub speech_pad_ms: u32,
    /// Maximum speech duration before a forced split (s). Default: 30.0.
    pub max_speech_s: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            threshold: 0.5,
            min_speech_ms: 250,
            min_silence_ms: 100,
            speech_pad_ms: 30,
            max_speech_s: 30.0,
        }
    }
}

impl VadConfig {
    /// Validate every field's domain.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_sample_rate(self.sample_rate) {
            return Err(VocalisError::Config(format!(
                "unsupported sample rate {} (expected 8000 or 16000)",
                self.sample_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(VocalisError::Config(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        if self.max_speech_s <= 0.0 || !self.max_speech_s.is_finite() {
            return Err(VocalisError::Config(format!(
                "max_speech_s {} must be positive and finite",
                self.max_speech_s
            )));
        }
        Ok(())
    }

    /// Model window size in samples: 512 at 16 kHz, 256 at 8 kHz (32 ms).
    pub fn window_size(&self) -> usize {
        32 * self.sample_rate as usize / 1000
    }

    pub(crate) fn sr_per_ms(&self) -> u64 {
        u64::from(self.sample_rate) / 1000
    }

    pub(crate) fn min_speech_samples(&self) -> u64 {
        self.sr_per_ms() * u64::from(self.min_speech_ms)
    }

    pub(crate) fn min_silence_samples(&self) -> u64 {
        self.sr_per_ms() * u64::from(self.min_silence_ms)
    }

    pub(crate) fn speech_pad_samples(&self) -> u64 {
        self.sr_per_ms() * u64::from(self.speech_pad_ms)
    }

    /// Samples an open segment may span before the forced split, accounting
    /// for the window granularity and the pad applied at both ends.
    pub(crate) fn max_speech_samples(&self) -> u64 {
        let total = (f64::from(self.sample_rate) * f64::from(self.max_speech_s)) as u64;
        total.saturating_sub(self.window_size() as u64 + 2 * self.speech_pad_samples())
    }
}

/// Per-frame detection outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadResult {
    /// `probability >= threshold` for this frame.
    pub is_voice: bool,
    /// Raw model speech probability in `[0, 1]`.
    pub probability: f32,
    /// Start-of-frame time on the sample clock (ms). Strictly monotone
    /// across frames within one detector lifetime.
    pub timestamp_ms: i64,
}

/// A detected speech segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VadSegment {
    /// Segment start (seconds from the start of the pass).
    pub start_time_s: f32,
    /// Segment end (seconds). Always greater than `start_time_s`.
    pub end_time_s: f32,
    /// Mean frame probability observed while the segment was open, in `[0, 1]`.
    pub confidence: f32,
    /// Always true for emitted segments.
    pub is_speech: bool,
}

impl VadSegment {
    pub fn duration_s(&self) -> f32 {
        self.end_time_s - self.start_time_s
    }
}
