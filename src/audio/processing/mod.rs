// Audio Processing Module
//
// - resampling.rs: Sample rate conversion to whisper's 16kHz input rate

pub mod resampling;

pub use resampling::{resample, resample_for_whisper, resampled_len, WHISPER_SAMPLE_RATE};
