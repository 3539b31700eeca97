//! Audio utilities: PCM conversion, rate conversion, WAV encoding.
//!
//! Everything here is pure data-in / data-out. The detector consumes mono
//! f32 in `[-1.0, 1.0]`; these helpers bridge to and from 16-bit PCM and
//! arbitrary sample rates at the edges.

pub mod pcm;
pub mod resample;
pub mod wav;

pub use pcm::{f32_buffer_to_pcm16, f32_to_pcm16, pcm16_buffer_to_f32, pcm16_to_f32};
pub use resample::resample;
pub use wav::{encode_wav, write_wav, write_wav_file};
