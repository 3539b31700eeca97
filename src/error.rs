use thiserror::Error;

/// All errors produced by vocalis.
#[derive(Debug, Error)]
pub enum VocalisError {
    #[error("model file not found: {path}")]
    ModelNotFound { path: std::path::PathBuf },

    #[error("model load error: {0}")]
    ModelLoad(String),

    #[error("bad frame size: got {got} samples, expected {expected}")]
    BadFrameSize { got: usize, expected: usize },

    #[error("inference error: {0}")]
    Inference(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV encode error: {0}")]
    Wav(String),
}

pub type Result<T> = std::result::Result<T, VocalisError>;
