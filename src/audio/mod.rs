// src/audio/mod.rs
//
// Audio normalization applied before every transcription call.

pub mod processing;

pub use processing::{resample, resample_for_whisper, resampled_len, WHISPER_SAMPLE_RATE};
