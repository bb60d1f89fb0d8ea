// whisper-bridge - Transcription bridge over whisper.cpp
//
// Thin orchestration layer between a host's audio buffers and whisper.cpp:
// - Engine lifecycle with exclusive ownership of the model context
// - Sample-rate normalization to 16kHz
// - Decoding parameter derivation
// - Result assembly from per-segment output

// Performance logging macros - exported for use by other modules
#[macro_use]
pub mod macros;

pub mod audio;
pub mod whisper_engine;

pub use whisper_engine::{
    EngineOptions, EngineRegistry, InitializeOptions, TranscriptionEngine, TranscriptionError,
    TranscriptionResult, TranscriptionSegment, VersionInfo, WhisperEngine,
};

/// Version and capability metadata for the whisper.cpp build
pub fn get_version() -> VersionInfo {
    EngineRegistry::<whisper_engine::WhisperModelContext>::version()
}
