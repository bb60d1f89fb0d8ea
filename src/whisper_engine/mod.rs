// Whisper Engine Module
//
// Split into focused files:
// - types.rs: EngineOptions, TranscriptionResult and boundary structs
// - error.rs: TranscriptionError
// - params.rs: Decoding parameter derivation
// - assembler.rs: Segment text joining and result assembly
// - backend.rs: ModelContext trait (seam to whisper.cpp)
// - whisper_backend.rs: whisper-rs implementation and GPU detection
// - engine.rs: Core TranscriptionEngine lifecycle and transcription
// - registry.rs: EngineRegistry boundary handle
// - model_registry.rs: Model paths and download status
// - downloader.rs: Model downloading

pub mod types;
pub mod error;
pub mod params;
pub mod assembler;
pub mod backend;
pub mod whisper_backend;
pub mod engine;
pub mod registry;
pub mod model_registry;
pub mod downloader;

pub use types::{EngineOptions, InitializeOptions, TranscriptionResult, TranscriptionSegment, VersionInfo};
pub use error::TranscriptionError;
pub use params::{build_decoding_params, DecodingParams, DecodingStrategy};
pub use assembler::{assemble_result, join_segment_text, trim_transcript};
pub use backend::{ModelContext, RawSegment};
pub use whisper_backend::{acceleration_backend, log_acceleration_capabilities, WhisperModelContext};
pub use engine::TranscriptionEngine;
pub use registry::EngineRegistry;

/// Engine backed by whisper.cpp
pub type WhisperEngine = TranscriptionEngine<WhisperModelContext>;
