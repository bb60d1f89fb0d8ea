// Whisper Engine - Boundary handle owning the active engine
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::backend::ModelContext;
use super::engine::TranscriptionEngine;
use super::error::TranscriptionError;
use super::types::{EngineOptions, InitializeOptions, TranscriptionResult, VersionInfo};
use super::whisper_backend::WhisperModelContext;

/// Holds at most one active engine for a host boundary.
///
/// The handle is owned by the caller and passed to every operation instead of
/// living in a global. Every call takes the inner lock for its whole duration,
/// which is what keeps two transcriptions out of the same whisper context.
pub struct EngineRegistry<C: ModelContext = WhisperModelContext> {
    engine: Mutex<Option<TranscriptionEngine<C>>>,
}

impl<C: ModelContext> Default for EngineRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ModelContext> EngineRegistry<C> {
    pub fn new() -> Self {
        Self {
            engine: Mutex::new(None),
        }
    }

    // The slot is only ever replaced wholesale, so a panic mid-call cannot
    // leave it half-updated.
    fn slot(&self) -> MutexGuard<'_, Option<TranscriptionEngine<C>>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a new engine, releasing any current one first.
    ///
    /// On failure no engine is left behind.
    pub fn initialize(&self, options: InitializeOptions) -> Result<(), TranscriptionError> {
        let options = EngineOptions::try_from(options)?;
        self.initialize_with(options)
    }

    pub fn initialize_with(&self, options: EngineOptions) -> Result<(), TranscriptionError> {
        let mut slot = self.slot();
        if let Some(mut previous) = slot.take() {
            log::info!("Releasing current engine before loading {}", options.model_path.display());
            previous.cleanup();
        }

        *slot = Some(TranscriptionEngine::new(options)?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.slot().as_ref().is_some_and(|engine| engine.is_ready())
    }

    /// Transcribe with the active engine. `sample_rate` comes straight from the
    /// host and is validated here.
    pub fn transcribe(&self, samples: &[f32], sample_rate: i32) -> Result<TranscriptionResult, TranscriptionError> {
        let mut slot = self.slot();
        let engine = slot
            .as_mut()
            .filter(|engine| engine.is_ready())
            .ok_or(TranscriptionError::NotReady)?;

        if sample_rate <= 0 {
            return Err(TranscriptionError::InvalidArgument(format!(
                "sampleRate must be positive, got {}",
                sample_rate
            )));
        }

        engine.transcribe(samples, sample_rate as u32)
    }

    /// Language used by the active engine's last transcription
    pub fn detected_language(&self) -> Option<String> {
        self.slot()
            .as_ref()
            .map(|engine| engine.detected_language().to_string())
    }

    /// Release the active engine. Safe to call at any time.
    pub fn cleanup(&self) {
        if let Some(mut engine) = self.slot().take() {
            engine.cleanup();
        }
    }

    /// Static version and capability metadata
    pub fn version() -> VersionInfo {
        VersionInfo {
            addon: env!("CARGO_PKG_VERSION").to_string(),
            whisper: C::engine_version().to_string(),
            acceleration: C::acceleration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whisper_engine::engine::tests::{fake_model, FakeContext};

    fn init_options(path: &std::path::Path) -> InitializeOptions {
        InitializeOptions {
            model_path: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_registry_is_not_initialized() {
        let registry = EngineRegistry::<FakeContext>::new();
        assert!(!registry.is_initialized());
        assert_eq!(registry.detected_language(), None);
    }

    #[test]
    fn test_cleanup_before_initialize_is_noop() {
        let registry = EngineRegistry::<FakeContext>::new();
        registry.cleanup();
        registry.cleanup();
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_initialize_and_cleanup() {
        let model = fake_model(serde_json::json!({ "segments": [[0, 100, "hi"]] }));
        let registry = EngineRegistry::<FakeContext>::new();

        registry.initialize(init_options(model.path())).unwrap();
        assert!(registry.is_initialized());

        registry.cleanup();
        assert!(!registry.is_initialized());
        registry.cleanup();
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_initialize_requires_model_path() {
        let registry = EngineRegistry::<FakeContext>::new();
        let result = registry.initialize(InitializeOptions::default());
        assert!(matches!(result, Err(TranscriptionError::InvalidArgument(_))));
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_failed_initialize_leaves_nothing_behind() {
        let registry = EngineRegistry::<FakeContext>::new();
        let result = registry.initialize(init_options(std::path::Path::new("/nonexistent/model.bin")));
        assert!(matches!(result, Err(TranscriptionError::EngineLoad { .. })));
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_failed_reinitialize_releases_previous_engine() {
        let model = fake_model(serde_json::json!({}));
        let registry = EngineRegistry::<FakeContext>::new();
        registry.initialize(init_options(model.path())).unwrap();

        let result = registry.initialize(init_options(std::path::Path::new("/nonexistent/model.bin")));
        assert!(result.is_err());
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_transcribe_requires_engine() {
        let registry = EngineRegistry::<FakeContext>::new();
        let result = registry.transcribe(&[0.0; 1600], 16_000);
        assert_eq!(result, Err(TranscriptionError::NotReady));
    }

    #[test]
    fn test_transcribe_rejects_non_positive_sample_rate() {
        let model = fake_model(serde_json::json!({}));
        let registry = EngineRegistry::<FakeContext>::new();
        registry.initialize(init_options(model.path())).unwrap();

        for rate in [0, -16_000] {
            let result = registry.transcribe(&[0.0; 1600], rate);
            assert!(matches!(result, Err(TranscriptionError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_transcribe_through_registry() {
        let model = fake_model(serde_json::json!({ "segments": [[0, 80, " Guten"], [80, 160, " Tag"]] }));
        let registry = EngineRegistry::<FakeContext>::new();
        registry
            .initialize(InitializeOptions {
                model_path: Some(model.path().to_string_lossy().into_owned()),
                language: Some("de".to_string()),
                threads: Some(2),
                use_gpu: Some(false),
            })
            .unwrap();

        let result = registry.transcribe(&vec![0.0; 48_000], 48_000).unwrap();
        assert_eq!(result.text, "Guten Tag");
        assert_eq!(result.language, "de");
        assert_eq!(registry.detected_language(), Some("de".to_string()));
    }

    #[test]
    fn test_version_is_static() {
        let version = EngineRegistry::<FakeContext>::version();
        assert_eq!(version.addon, env!("CARGO_PKG_VERSION"));
        assert_eq!(version.whisper, "fake-engine 0.0");
        assert_eq!(version.acceleration, "none");
    }
}
