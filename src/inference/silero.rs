//! Silero VAD v5 ONNX session via the `ort` crate.
//!
//! ## Model I/O
//!
//! | Name     | Shape        | DType | Direction |
//! |----------|--------------|-------|-----------|
//! | `input`  | `[1, W+64]`  | f32   | in        |
//! | `state`  | `[2, 1, 128]`| f32   | in/out    |
//! | `sr`     | `[1]`        | i64   | in        |
//! | `output` | `[1, 1]`     | f32   | out       |
//! | `stateN` | `[2, 1, 128]`| f32   | out       |
//!
//! `W` is 512 at 16 kHz and 256 at 8 kHz; the leading 64 samples are the
//! acoustic context carried from the previous window.
//!
//! The session runs with one intra-op and one inter-op worker; no
//! parallelism is exposed upward. Graph-signature mismatches are rejected
//! at load time so a bad model file can never reach the frame pipeline.

use std::path::Path;

use ndarray::{Array1, Array2, Array3};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::{Session, SessionInputValue};
use ort::value::Value;
use tracing::info;

use super::{AcousticModel, STATE_LEN};
use crate::error::{Result, VocalisError};

/// Owns the loaded Silero VAD session and its resolved tensor names.
pub struct SileroSession {
    session: Session,
    input_name: String,
    state_name: String,
    sr_name: String,
    output_name: String,
    state_out_name: String,
}

impl SileroSession {
    /// Load the model from `path`.
    ///
    /// # Errors
    /// `ModelNotFound` if the file does not exist; `ModelLoad` if the file
    /// is malformed or the graph signature does not match Silero v5.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VocalisError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }

        let size_mb = std::fs::metadata(path)
            .map(|m| m.len() as f64 / 1_048_576.0)
            .unwrap_or(0.0);

        info!("=== SileroSession Startup Report ===");
        info!("  path: {:?}", path);
        info!("  size: {:.2} MB", size_mb);

        let session = build_session()?
            .commit_from_file(path)
            .map_err(|e| VocalisError::ModelLoad(e.to_string()))?;

        Self::from_session(session)
    }

    /// Load the model from an in-memory buffer.
    pub fn from_memory(model_bytes: &[u8]) -> Result<Self> {
        info!("=== SileroSession Startup Report ===");
        info!("  source: memory ({} bytes)", model_bytes.len());

        let session = build_session()?
            .commit_from_memory(model_bytes)
            .map_err(|e| VocalisError::ModelLoad(e.to_string()))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self> {
        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|outlet| outlet.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|outlet| outlet.name().to_string())
            .collect();

        info!("  inputs: {:?}", input_names);
        info!("  outputs: {:?}", output_names);

        let input_name = require_name(&input_names, "input")?;
        let state_name = require_name(&input_names, "state")?;
        let sr_name = require_name(&input_names, "sr")?;
        let output_name = require_name(&output_names, "output")?;
        let state_out_name = require_name(&output_names, "stateN")?;

        info!("=== SileroSession ready ===");

        Ok(Self {
            session,
            input_name,
            state_name,
            sr_name,
            output_name,
            state_out_name,
        })
    }
}

fn build_session() -> Result<SessionBuilder> {
    SessionBuilder::new()
        .map_err(|e| VocalisError::ModelLoad(e.to_string()))?
        .with_intra_threads(1)
        .map_err(|e| VocalisError::ModelLoad(e.to_string()))?
        .with_inter_threads(1)
        .map_err(|e| VocalisError::ModelLoad(e.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::All)
        .map_err(|e| VocalisError::ModelLoad(e.to_string()))
}

fn require_name(candidates: &[String], wanted: &str) -> Result<String> {
    candidates
        .iter()
        .find(|name| name.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| {
            VocalisError::ModelLoad(format!(
                "graph signature mismatch: no `{wanted}` tensor (found {candidates:?})"
            ))
        })
}

impl AcousticModel for SileroSession {
    fn infer(&mut self, input: &[f32], state: &mut [f32], sample_rate: u32) -> Result<f32> {
        debug_assert_eq!(state.len(), STATE_LEN);

        let input_arr = Array2::<f32>::from_shape_vec((1, input.len()), input.to_vec())
            .map_err(|e| VocalisError::Inference(e.to_string()))?;
        let state_arr = Array3::<f32>::from_shape_vec((2, 1, 128), state.to_vec())
            .map_err(|e| VocalisError::Inference(e.to_string()))?;
        let sr_arr = Array1::<i64>::from_elem(1, i64::from(sample_rate));

        let input_val = Value::from_array(input_arr)
            .map_err(|e: ort::Error| VocalisError::Inference(e.to_string()))?;
        let state_val = Value::from_array(state_arr)
            .map_err(|e: ort::Error| VocalisError::Inference(e.to_string()))?;
        let sr_val = Value::from_array(sr_arr)
            .map_err(|e: ort::Error| VocalisError::Inference(e.to_string()))?;

        let input_values: Vec<(String, SessionInputValue<'_>)> = vec![
            (self.input_name.clone(), input_val.into()),
            (self.state_name.clone(), state_val.into()),
            (self.sr_name.clone(), sr_val.into()),
        ];

        let outputs = self
            .session
            .run(input_values)
            .map_err(|e| VocalisError::Inference(e.to_string()))?;

        let prob_out = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| VocalisError::Inference("missing probability output".into()))?;
        let (_, prob_data) = prob_out
            .try_extract_tensor::<f32>()
            .map_err(|e| VocalisError::Inference(e.to_string()))?;
        let prob = prob_data.first().copied().unwrap_or(0.0);

        let state_out = outputs
            .get(self.state_out_name.as_str())
            .ok_or_else(|| VocalisError::Inference("missing state output".into()))?;
        let (_, state_data) = state_out
            .try_extract_tensor::<f32>()
            .map_err(|e| VocalisError::Inference(e.to_string()))?;
        if state_data.len() != state.len() {
            return Err(VocalisError::Inference(format!(
                "state output length {} != {}",
                state_data.len(),
                state.len()
            )));
        }
        state.copy_from_slice(state_data);

        Ok(prob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_model_not_found() {
        let err = SileroSession::from_file("/nonexistent/silero_vad_v5.onnx").unwrap_err();
        assert!(matches!(err, VocalisError::ModelNotFound { .. }));
    }

    #[test]
    fn garbage_bytes_rejected_at_load() {
        let err = SileroSession::from_memory(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, VocalisError::ModelLoad(_)));
    }

    #[test]
    fn require_name_is_case_insensitive_and_strict() {
        let names = vec!["Input".to_string(), "state".to_string()];
        assert_eq!(require_name(&names, "input").unwrap(), "Input");
        assert!(require_name(&names, "sr").is_err());
    }
}
