// Whisper Engine - Core Engine
use std::path::Path;
use std::time::Instant;
use crate::audio::{resample_for_whisper, WHISPER_SAMPLE_RATE};
use crate::perf_debug;

use super::assembler::assemble_result;
use super::backend::ModelContext;
use super::error::TranscriptionError;
use super::params::build_decoding_params;
use super::types::{EngineOptions, TranscriptionResult};
use super::whisper_backend::WhisperModelContext;

/// Owns exactly one loaded model context and runs transcriptions against it.
///
/// `transcribe` takes `&mut self`: the underlying context must never be entered
/// by two calls at once, so shared use has to go through a lock such as
/// [`EngineRegistry`](super::registry::EngineRegistry).
pub struct TranscriptionEngine<C: ModelContext = WhisperModelContext> {
    context: Option<C>,
    options: EngineOptions,
    detected_language: String,
    ready: bool,
}

impl<C: ModelContext> TranscriptionEngine<C> {
    /// Load the model named by `options.model_path`.
    ///
    /// Nothing is retained when loading fails.
    pub fn new(options: EngineOptions) -> Result<Self, TranscriptionError> {
        if options.model_path.as_os_str().is_empty() {
            return Err(TranscriptionError::InvalidArgument("modelPath is required".to_string()));
        }

        C::suppress_engine_logs();

        let started = Instant::now();
        let context = C::load(&options.model_path, options.use_gpu).map_err(|cause| {
            log::error!("Failed to load model {}: {}", options.model_path.display(), cause);
            TranscriptionError::EngineLoad {
                model_path: options.model_path.clone(),
                cause,
            }
        })?;

        log::info!(
            "Transcription engine ready in {:.2}s (language: {}, threads: {})",
            started.elapsed().as_secs_f64(),
            options.language,
            options.threads
        );

        Ok(Self {
            context: Some(context),
            options,
            detected_language: String::new(),
            ready: true,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready && self.context.is_some()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Language used by the most recent transcription.
    ///
    /// Auto-detection is disabled, so this is the configured language after
    /// defaulting, not something whisper detected.
    pub fn detected_language(&self) -> &str {
        &self.detected_language
    }

    /// Transcribe mono samples captured at `sample_rate`
    pub fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> Result<TranscriptionResult, TranscriptionError> {
        if !self.is_ready() {
            return Err(TranscriptionError::NotReady);
        }
        let context = self.context.as_mut().ok_or(TranscriptionError::NotReady)?;

        let started = Instant::now();

        let audio = if sample_rate != WHISPER_SAMPLE_RATE {
            resample_for_whisper(samples, sample_rate)
        } else {
            std::borrow::Cow::Borrowed(samples)
        };

        let params = build_decoding_params(&self.options);

        let raw_segments = context
            .decode(&params, &audio)
            .map_err(|code| TranscriptionError::Decode { code })?;

        self.detected_language = params.effective_language().to_string();

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        perf_debug!(
            "Transcribed {} samples ({}Hz) into {} segments in {:.1}ms",
            samples.len(),
            sample_rate,
            raw_segments.len(),
            duration_ms
        );

        Ok(assemble_result(raw_segments, &self.detected_language, duration_ms))
    }

    /// File-based transcription is declared but not built; decode the file
    /// yourself and call [`transcribe`](Self::transcribe).
    pub fn transcribe_file(&mut self, _path: &Path) -> Result<TranscriptionResult, TranscriptionError> {
        Err(TranscriptionError::Unimplemented("transcribe_file"))
    }

    /// Release the model context. Safe to call any number of times.
    pub fn cleanup(&mut self) {
        if self.context.take().is_some() {
            log::info!("Whisper model unloaded");
        }
        self.ready = false;
    }
}

impl<C: ModelContext> Drop for TranscriptionEngine<C> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use super::super::backend::RawSegment;
    use super::super::params::DecodingParams;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    pub static LOADED: AtomicUsize = AtomicUsize::new(0);
    pub static RELEASED: AtomicUsize = AtomicUsize::new(0);

    /// Scripted context: the "model file" is JSON describing what to return
    #[derive(Debug, serde::Deserialize)]
    pub struct FakeContext {
        #[serde(default)]
        pub segments: Vec<(i64, i64, String)>,
        #[serde(default)]
        pub status: i32,
        #[serde(skip)]
        pub last_params: Option<DecodingParams>,
        #[serde(skip)]
        pub last_sample_count: usize,
    }

    impl ModelContext for FakeContext {
        fn load(model_path: &Path, _use_gpu: bool) -> Result<Self, String> {
            let contents = std::fs::read_to_string(model_path).map_err(|e| e.to_string())?;
            let context: FakeContext = serde_json::from_str(&contents).map_err(|e| e.to_string())?;
            LOADED.fetch_add(1, Ordering::SeqCst);
            Ok(context)
        }

        fn decode(&mut self, params: &DecodingParams, samples: &[f32]) -> Result<Vec<RawSegment>, i32> {
            self.last_params = Some(params.clone());
            self.last_sample_count = samples.len();
            if self.status != 0 {
                return Err(self.status);
            }
            Ok(self
                .segments
                .iter()
                .map(|(t0, t1, text)| RawSegment { t0: *t0, t1: *t1, text: text.clone() })
                .collect())
        }

        fn suppress_engine_logs() {}

        fn engine_version() -> &'static str {
            "fake-engine 0.0"
        }

        fn acceleration() -> String {
            "none".to_string()
        }
    }

    impl Drop for FakeContext {
        fn drop(&mut self) {
            RELEASED.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn fake_model(json: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();
        file
    }

    fn engine_with(json: serde_json::Value, language: &str) -> (TranscriptionEngine<FakeContext>, NamedTempFile) {
        let model = fake_model(json);
        let options = EngineOptions::new(model.path()).with_language(language);
        (TranscriptionEngine::new(options).unwrap(), model)
    }

    fn sine(seconds: f32, sample_rate: u32) -> Vec<f32> {
        let len = (seconds * sample_rate as f32) as usize;
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_new_engine_is_ready() {
        let (engine, _model) = engine_with(serde_json::json!({}), "auto");
        assert!(engine.is_ready());
        assert_eq!(engine.detected_language(), "");
    }

    #[test]
    fn test_missing_model_fails_with_load_error() {
        let result = TranscriptionEngine::<FakeContext>::new(EngineOptions::new("/nonexistent/path/to/model.bin"));
        match result {
            Err(TranscriptionError::EngineLoad { model_path, .. }) => {
                assert_eq!(model_path, Path::new("/nonexistent/path/to/model.bin"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected load failure"),
        }
    }

    #[test]
    fn test_empty_model_path_is_invalid() {
        let result = TranscriptionEngine::<FakeContext>::new(EngineOptions::default());
        assert!(matches!(result, Err(TranscriptionError::InvalidArgument(_))));
    }

    #[test]
    fn test_transcribe_assembles_segments() {
        let (mut engine, _model) = engine_with(
            serde_json::json!({ "segments": [[0, 120, " Hello"], [120, 300, "world."]] }),
            "auto",
        );

        let result = engine.transcribe(&sine(1.0, 16_000), 16_000).unwrap();
        assert_eq!(result.text, "Hello world.");
        assert_eq!(result.language, "en");
        assert!(result.duration_ms >= 0.0);
        assert_eq!(result.segments[1].start_ms, 1200);
        assert_eq!(result.segments[1].end_ms, 3000);
        assert_eq!(engine.detected_language(), "en");
    }

    #[test]
    fn test_transcribe_passes_16k_audio_through() {
        let (mut engine, _model) = engine_with(serde_json::json!({}), "de");
        engine.transcribe(&sine(1.0, 16_000), 16_000).unwrap();

        let context = engine.context.as_ref().unwrap();
        assert_eq!(context.last_sample_count, 16_000);
        assert_eq!(context.last_params.as_ref().unwrap().language, "de");
    }

    #[test]
    fn test_transcribe_resamples_other_rates() {
        let (mut engine, _model) = engine_with(serde_json::json!({}), "auto");
        engine.transcribe(&sine(1.0, 44_100), 44_100).unwrap();
        assert_eq!(engine.context.as_ref().unwrap().last_sample_count, 16_000);

        engine.transcribe(&sine(0.5, 8_000), 8_000).unwrap();
        assert_eq!(engine.context.as_ref().unwrap().last_sample_count, 8_000);
    }

    #[test]
    fn test_decode_failure_carries_status() {
        let (mut engine, _model) = engine_with(serde_json::json!({ "status": 8 }), "auto");
        let result = engine.transcribe(&sine(0.1, 16_000), 16_000);
        assert_eq!(result, Err(TranscriptionError::Decode { code: 8 }));
        // Still usable after a failed decode
        assert!(engine.is_ready());
        assert_eq!(engine.detected_language(), "");
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let (mut engine, _model) = engine_with(serde_json::json!({}), "auto");
        engine.cleanup();
        assert!(!engine.is_ready());
        engine.cleanup();
        assert!(!engine.is_ready());

        let result = engine.transcribe(&sine(0.1, 16_000), 16_000);
        assert_eq!(result, Err(TranscriptionError::NotReady));
    }

    #[test]
    fn test_context_released_on_cleanup_and_drop() {
        let released_before = RELEASED.load(Ordering::SeqCst);
        {
            let (mut engine, _model) = engine_with(serde_json::json!({}), "auto");
            engine.cleanup();
            engine.cleanup();
        }
        {
            let (_engine, _model) = engine_with(serde_json::json!({}), "auto");
        }
        // Other tests run in parallel, so only check a lower bound
        assert!(RELEASED.load(Ordering::SeqCst) >= released_before + 2);
    }

    #[test]
    fn test_transcribe_file_is_unimplemented() {
        let (mut engine, _model) = engine_with(serde_json::json!({}), "auto");
        let result = engine.transcribe_file(Path::new("speech.wav"));
        assert_eq!(result, Err(TranscriptionError::Unimplemented("transcribe_file")));
    }
}
