//! Fixed-window frame pipeline with carried acoustic context.
//!
//! Every window handed to the model is prefixed with the trailing 64
//! samples of the previous model input, and the recurrent state tensor is
//! carried across calls. Mutation happens only after a successful forward
//! pass, so an inference failure leaves the engine exactly at the last
//! good frame.

use crate::error::Result;
use crate::inference::{AcousticModel, STATE_LEN};

use super::CONTEXT_SAMPLES;

pub(crate) struct FrameEngine {
    model: Box<dyn AcousticModel>,
    context: [f32; CONTEXT_SAMPLES],
    state: Vec<f32>,
    /// Reused `context ++ window` scratch buffer.
    input_buf: Vec<f32>,
    window: usize,
    sample_rate: u32,
    current_sample: u64,
}

impl FrameEngine {
    pub fn new(model: Box<dyn AcousticModel>, sample_rate: u32, window: usize) -> Self {
        Self {
            model,
            context: [0.0; CONTEXT_SAMPLES],
            state: vec![0.0; STATE_LEN],
            input_buf: Vec::with_capacity(CONTEXT_SAMPLES + window),
            window,
            sample_rate,
            current_sample: 0,
        }
    }

    /// Run one window through the model; returns the speech probability.
    ///
    /// On success the context is refreshed from the tail of this input, the
    /// recurrent state is replaced by the model's output state, and the
    /// sample clock advances by exactly one window.
    pub fn advance(&mut self, frame: &[f32]) -> Result<f32> {
        debug_assert_eq!(frame.len(), self.window);

        self.input_buf.clear();
        self.input_buf.extend_from_slice(&self.context);
        self.input_buf.extend_from_slice(frame);

        let prob = self
            .model
            .infer(&self.input_buf, &mut self.state, self.sample_rate)?;

        let tail = self.input_buf.len() - CONTEXT_SAMPLES;
        self.context.copy_from_slice(&self.input_buf[tail..]);
        self.current_sample += self.window as u64;

        Ok(prob)
    }

    /// Total input samples consumed since construction or the last reset.
    pub fn current_sample(&self) -> u64 {
        self.current_sample
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Zero the context and recurrent state and rewind the sample clock.
    pub fn reset(&mut self) {
        self.context = [0.0; CONTEXT_SAMPLES];
        self.state.iter_mut().for_each(|v| *v = 0.0);
        self.current_sample = 0;
        self.model.reset();
    }
}
