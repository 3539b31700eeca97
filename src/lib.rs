//! # vocalis
//!
//! Streaming voice activity detection built on the Silero VAD v5 ONNX
//! model: mono f32 PCM in, timestamped speech segments out.
//!
//! ## Architecture
//!
//! ```text
//! f32 samples → FrameEngine (64-sample context carry)
//!                    │
//!            AcousticModel::infer  (ort session | scripted stub)
//!                    │ per-frame probability
//!        ┌───────────┴───────────┐
//!   BatchSegmenter          VadStream counters
//!   (process_audio)         (debounce + backdating)
//!        │                       │
//!   Vec<VadSegment>         pad → resample → normalize → segment_<N>.wav
//! ```
//!
//! Batch and streaming share the one per-frame kernel
//! (`VadDetector::infer_frame`) but keep separate segmentation rules; their
//! boundaries can differ by a window or two by design.
//!
//! ## Quick start
//!
//! ```no_run
//! use vocalis::{VadConfig, VadDetector, VadStream};
//!
//! # fn main() -> vocalis::Result<()> {
//! let mut detector = VadDetector::new(VadConfig::default(), "silero_vad_v5.onnx")?;
//!
//! // Batch over a finite buffer:
//! let audio = vec![0.0f32; 16_000];
//! let segments = detector.process_audio(&audio)?;
//!
//! // Or streaming, one chunk at a time:
//! let mut stream = VadStream::new(&mut detector, "segments/")?;
//! stream.process_chunk(&audio)?;
//! let total = stream.finalize()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod inference;
pub mod vad;

pub use error::{Result, VocalisError};
pub use inference::{AcousticModel, ScriptedModel};
pub use vad::{
    export_segments, is_valid_sample_rate, VadConfig, VadDetector, VadResult, VadSegment,
    VadStream,
};

#[cfg(feature = "onnx")]
pub use inference::SileroSession;

/// Engine version, tied to the model generation it wraps.
pub const VERSION: &str = "1.0.0-silero-v5";
