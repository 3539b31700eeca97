//! Acoustic model abstraction.
//!
//! The `AcousticModel` trait decouples the frame pipeline and both
//! segmentation state machines from the ONNX backend: swap in
//! `SileroSession` (the real model) or `ScriptedModel` (deterministic test
//! stub) without touching the detector.
//!
//! `&mut self` on `infer` intentionally expresses that backends are not
//! thread-safe — callers must serialize, which exclusive borrows enforce.

pub mod scripted;

#[cfg(feature = "onnx")]
pub mod silero;

pub use scripted::ScriptedModel;

#[cfg(feature = "onnx")]
pub use silero::SileroSession;

use crate::error::Result;

/// Flat length of the recurrent model state: 2 layers × 1 batch × 128 units.
pub const STATE_LEN: usize = 2 * 128;

/// Contract for one forward pass of the acoustic model.
pub trait AcousticModel: Send {
    /// Score one context-prefixed window.
    ///
    /// # Parameters
    /// - `input`: `context ++ window` samples (576 at 16 kHz, 320 at 8 kHz).
    /// - `state`: recurrent state, `STATE_LEN` floats. Overwritten in place
    ///   with the model's next state on success; untouched on error.
    /// - `sample_rate`: 8000 or 16000, forwarded to the graph's `sr` input.
    ///
    /// # Returns
    /// The speech probability in `[0, 1]` for this window.
    fn infer(&mut self, input: &[f32], state: &mut [f32], sample_rate: u32) -> Result<f32>;

    /// Reset any backend-internal state. The recurrent `state` tensor lives
    /// with the caller; most backends have nothing to do here.
    fn reset(&mut self) {}
}
