//! `ScriptedModel` — deterministic stand-in for the neural model.
//!
//! Replays a fixed probability sequence, one value per `infer` call, so the
//! framing and segmentation machinery can be exercised end-to-end without
//! the ONNX model binary. Exhausting the script yields silence (0.0).

use tracing::debug;

use super::AcousticModel;
use crate::error::Result;

/// Probability-replay stub model.
pub struct ScriptedModel {
    probs: Vec<f32>,
    cursor: usize,
}

impl ScriptedModel {
    /// Replay `probs` in order, then 0.0 forever.
    pub fn new(probs: Vec<f32>) -> Self {
        Self { probs, cursor: 0 }
    }

    /// A script of `frames` windows all scoring `prob`.
    pub fn constant(prob: f32, frames: usize) -> Self {
        Self::new(vec![prob; frames])
    }

    /// How many windows have been scored since construction or reset.
    pub fn frames_scored(&self) -> usize {
        self.cursor
    }
}

impl AcousticModel for ScriptedModel {
    fn infer(&mut self, _input: &[f32], _state: &mut [f32], _sample_rate: u32) -> Result<f32> {
        let prob = self.probs.get(self.cursor).copied().unwrap_or(0.0);
        self.cursor += 1;
        Ok(prob)
    }

    fn reset(&mut self) {
        debug!("ScriptedModel::reset — rewinding script");
        self.cursor = 0;
    }
}
