// Whisper Engine - whisper-rs backed model context and GPU detection
use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::sync::Once;
use whisper_rs::whisper_rs_sys;
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperError,
};
use crate::perf_trace;

use super::backend::{ModelContext, RawSegment};
use super::params::{DecodingParams, DecodingStrategy};

static LOG_HOOKS: Once = Once::new();

/// Detect available GPU acceleration capabilities
pub fn detect_gpu_acceleration() -> bool {
    cfg!(target_os = "macos") || cfg!(feature = "cuda") || cfg!(feature = "vulkan") || cfg!(feature = "hipblas")
}

/// Human readable description of the acceleration compiled into whisper.cpp
pub fn acceleration_backend() -> String {
    let mut backends: Vec<&str> = Vec::new();

    if cfg!(target_os = "macos") || cfg!(feature = "metal") {
        backends.push("Metal GPU");
    }
    if cfg!(feature = "coreml") {
        backends.push("CoreML (ANE accelerated)");
    }
    if cfg!(feature = "cuda") {
        backends.push("NVIDIA CUDA");
    }
    if cfg!(feature = "vulkan") {
        backends.push("Vulkan GPU");
    }
    if cfg!(feature = "hipblas") {
        backends.push("AMD ROCm (HIP)");
    }
    if cfg!(feature = "openblas") {
        backends.push("OpenBLAS");
    }
    if cfg!(feature = "openmp") {
        backends.push("OpenMP");
    }

    if backends.is_empty() {
        "CPU".to_string()
    } else {
        backends.join(" + ")
    }
}

/// Log hardware acceleration capabilities
pub fn log_acceleration_capabilities() {
    log::info!(
        "Hardware acceleration support: {} ({})",
        if detect_gpu_acceleration() { "enabled" } else { "disabled" },
        acceleration_backend()
    );
}

/// whisper.cpp status code behind a whisper-rs error.
///
/// `full()` maps the known whisper_full failures onto dedicated variants;
/// everything that never came from a status code reports -1.
pub fn status_code(error: &WhisperError) -> i32 {
    match error {
        WhisperError::GenericError(code) => *code,
        WhisperError::FailedToEncode => 7,
        WhisperError::FailedToDecode => 8,
        WhisperError::UnableToCalculateSpectrogram => -1,
        _ => -1,
    }
}

unsafe extern "C" fn discard_whisper_log(
    _level: whisper_rs_sys::ggml_log_level,
    _text: *const c_char,
    _user_data: *mut c_void,
) {
}

/// Exclusively owned whisper.cpp context
pub struct WhisperModelContext {
    context: WhisperContext,
}

impl WhisperModelContext {
    fn full_params(params: &DecodingParams) -> FullParams<'_, '_> {
        let strategy = match params.strategy {
            DecodingStrategy::Greedy { best_of } => SamplingStrategy::Greedy { best_of },
        };

        let mut full_params = FullParams::new(strategy);
        full_params.set_language(Some(params.language.as_str()));
        full_params.set_detect_language(params.detect_language);
        full_params.set_translate(params.translate);
        full_params.set_no_timestamps(params.no_timestamps);
        full_params.set_n_threads(params.n_threads as i32);
        full_params.set_single_segment(params.single_segment);
        full_params.set_token_timestamps(params.token_timestamps);
        full_params.set_n_max_text_ctx(params.max_text_ctx);
        full_params.set_print_progress(params.print_output);
        full_params.set_print_realtime(params.print_output);
        full_params.set_print_special(params.print_output);
        full_params.set_print_timestamps(params.print_output);
        full_params
    }
}

impl ModelContext for WhisperModelContext {
    fn load(model_path: &Path, use_gpu: bool) -> Result<Self, String> {
        let path = model_path
            .to_str()
            .ok_or_else(|| "model path is not valid UTF-8".to_string())?;

        let context_param = WhisperContextParameters {
            use_gpu,
            ..Default::default()
        };

        let context = WhisperContext::new_with_params(path, context_param).map_err(|e| e.to_string())?;
        log::info!(
            "Loaded whisper model {} (GPU requested: {}, backend: {})",
            model_path.display(),
            use_gpu,
            acceleration_backend()
        );

        Ok(Self { context })
    }

    fn decode(&mut self, params: &DecodingParams, samples: &[f32]) -> Result<Vec<RawSegment>, i32> {
        // whisper_full treats too-short input as an empty decode, whisper-rs rejects it outright
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.context.create_state().map_err(|e| {
            log::warn!("Failed to create whisper state: {}", e);
            status_code(&e)
        })?;

        state.full(Self::full_params(params), samples).map_err(|e| {
            log::warn!("whisper_full failed: {}", e);
            status_code(&e)
        })?;

        let num_segments = state.full_n_segments().map_err(|e| status_code(&e))?;
        let mut segments = Vec::with_capacity(num_segments.max(0) as usize);

        for i in 0..num_segments {
            let text = state.full_get_segment_text_lossy(i).map_err(|e| status_code(&e))?;
            let t0 = state.full_get_segment_t0(i).map_err(|e| status_code(&e))?;
            let t1 = state.full_get_segment_t1(i).map_err(|e| status_code(&e))?;

            perf_trace!("Segment {} ({:.2}s-{:.2}s): '{}'", i, t0 as f64 / 100.0, t1 as f64 / 100.0, text);

            segments.push(RawSegment { t0, t1, text });
        }

        Ok(segments)
    }

    fn suppress_engine_logs() {
        LOG_HOOKS.call_once(|| {
            // whisper_log_set also routes ggml's output through the callback
            unsafe {
                whisper_rs_sys::whisper_log_set(Some(discard_whisper_log), std::ptr::null_mut());
            }
        });
    }

    fn engine_version() -> &'static str {
        "whisper.cpp (whisper-rs 0.13)"
    }

    fn acceleration() -> String {
        acceleration_backend()
    }
}
