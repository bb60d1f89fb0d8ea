// Whisper Engine - Decoding parameter derivation
use super::types::{EngineOptions, AUTO_LANGUAGE};

/// Language used when the options ask for auto-detection
pub const FALLBACK_LANGUAGE: &str = "en";

/// Thread count used when the options leave it at 0
pub const DEFAULT_THREADS: u32 = 4;

/// Upper bound on the text context carried between windows
pub const MAX_TEXT_CTX: i32 = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingStrategy {
    Greedy { best_of: i32 },
}

/// Everything whisper.cpp needs for one full-pipeline decode
#[derive(Debug, Clone, PartialEq)]
pub struct DecodingParams {
    pub strategy: DecodingStrategy,
    pub language: String,
    pub detect_language: bool,
    pub translate: bool,
    pub no_timestamps: bool,
    pub n_threads: u32,
    pub single_segment: bool,
    pub token_timestamps: bool,
    pub max_text_ctx: i32,
    pub print_output: bool,
}

impl DecodingParams {
    /// Language actually handed to the decoder
    pub fn effective_language(&self) -> &str {
        &self.language
    }
}

/// Derive the decoding parameters for one call.
///
/// whisper's language auto-detection proved unreliable, so it is always
/// disabled and "auto" decodes as English. `with_timestamps` is not consulted;
/// segment timestamps are always on.
pub fn build_decoding_params(options: &EngineOptions) -> DecodingParams {
    let language = if options.language.is_empty() || options.language == AUTO_LANGUAGE {
        FALLBACK_LANGUAGE.to_string()
    } else {
        options.language.clone()
    };

    let n_threads = if options.threads > 0 {
        options.threads
    } else {
        DEFAULT_THREADS
    };

    DecodingParams {
        strategy: DecodingStrategy::Greedy { best_of: 1 },
        language,
        detect_language: false,
        translate: options.translate,
        no_timestamps: false,
        n_threads,
        single_segment: false,
        token_timestamps: true,
        max_text_ctx: MAX_TEXT_CTX,
        print_output: false,
    }
}
