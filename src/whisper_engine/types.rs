// Whisper Engine - Options, results and version metadata
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

use super::error::TranscriptionError;

/// Language sentinel meaning "let the engine decide"
pub const AUTO_LANGUAGE: &str = "auto";

/// Engine configuration, copied into the engine when it is constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Path to a ggml whisper model
    pub model_path: PathBuf,
    /// ISO language code, or "auto"
    pub language: String,
    /// Translate the transcript to English
    pub translate: bool,
    /// Accepted for compatibility; segment timestamps are always produced
    pub with_timestamps: bool,
    /// Decoder threads, 0 selects the default
    pub threads: u32,
    /// Request GPU (Metal/CUDA/Vulkan) when the context is created
    pub use_gpu: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            language: AUTO_LANGUAGE.to_string(),
            translate: false,
            with_timestamps: true,
            threads: 0,
            use_gpu: true,
        }
    }
}

impl EngineOptions {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_translate(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_gpu(mut self, use_gpu: bool) -> Self {
        self.use_gpu = use_gpu;
        self
    }
}

/// Options as they arrive from a host boundary (JSON-shaped, all optional)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOptions {
    pub model_path: Option<String>,
    pub language: Option<String>,
    pub threads: Option<i32>,
    pub use_gpu: Option<bool>,
}

impl TryFrom<InitializeOptions> for EngineOptions {
    type Error = TranscriptionError;

    fn try_from(options: InitializeOptions) -> Result<Self, Self::Error> {
        let model_path = options
            .model_path
            .filter(|path| !path.is_empty())
            .ok_or_else(|| TranscriptionError::InvalidArgument("modelPath is required".to_string()))?;

        let mut engine_options = EngineOptions::new(model_path);
        if let Some(language) = options.language {
            engine_options.language = language;
        }
        if let Some(threads) = options.threads {
            // Negative counts fall back to the default just like 0
            engine_options.threads = threads.max(0) as u32;
        }
        if let Some(use_gpu) = options.use_gpu {
            engine_options.use_gpu = use_gpu;
        }
        Ok(engine_options)
    }
}

/// A contiguous span of decoded audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionSegment {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    /// whisper.cpp exposes no per-segment confidence, always 1.0
    pub confidence: f32,
}

/// Result of one transcription call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResult {
    pub text: String,
    pub language: String,
    pub duration_ms: f64,
    pub segments: Vec<TranscriptionSegment>,
}

/// Static version and capability metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub addon: String,
    pub whisper: String,
    pub acceleration: String,
}
