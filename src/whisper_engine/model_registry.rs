// Whisper Engine - Model location and download status
use std::path::{Path, PathBuf};

/// Environment variable overriding the model directory
pub const MODEL_DIR_ENV: &str = "WHISPER_BRIDGE_MODEL_DIR";

/// The model the bridge ships support for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: &'static str,
    pub size: &'static str,
    pub languages: &'static str,
    pub url: &'static str,
}

pub const WHISPER_MODEL: ModelSpec = ModelSpec {
    name: "large-v3-turbo",
    size: "1.5 GB",
    languages: "100 languages",
    url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3-turbo.bin",
};

/// Language codes the large-v3-turbo model decodes
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "af", "am", "ar", "as", "az", "ba", "be", "bg", "bn", "bo", "br", "bs", "ca", "cs", "cy",
    "da", "de", "el", "en", "es", "et", "eu", "fa", "fi", "fo", "fr", "gl", "gu", "ha", "haw",
    "he", "hi", "hr", "ht", "hu", "hy", "id", "is", "it", "ja", "jw", "ka", "kk", "km", "kn",
    "ko", "la", "lb", "ln", "lo", "lt", "lv", "mg", "mi", "mk", "ml", "mn", "mr", "ms", "mt",
    "my", "ne", "nl", "nn", "no", "oc", "pa", "pl", "ps", "pt", "ro", "ru", "sa", "sd", "si",
    "sk", "sl", "sn", "so", "sq", "sr", "su", "sv", "sw", "ta", "te", "tg", "th", "tk", "tl",
    "tr", "tt", "uk", "ur", "uz", "vi", "yi", "yo", "yue", "zh",
];

/// Whether `code` names a language the model can decode. "auto" is not a language.
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Hugging Face repository holding the compiled CoreML encoder
pub const COREML_REPO: &str = "sebastian-software/whisper-coreml-models";
pub const COREML_MODEL_NAME: &str = "ggml-large-v3-turbo-encoder.mlmodelc";

pub fn coreml_api_url() -> String {
    format!("https://huggingface.co/api/models/{}", COREML_REPO)
}

pub fn coreml_download_url() -> String {
    format!("https://huggingface.co/{}/resolve/main", COREML_REPO)
}

/// `$WHISPER_BRIDGE_MODEL_DIR`, or `<cache dir>/whisper-bridge/models`
pub fn default_model_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(MODEL_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }

    dirs::cache_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("whisper-bridge")
        .join("models")
}

fn resolve_dir(model_dir: Option<&Path>) -> PathBuf {
    model_dir.map(Path::to_path_buf).unwrap_or_else(default_model_dir)
}

/// Path of the ggml `.bin` model
pub fn model_path(model_dir: Option<&Path>) -> PathBuf {
    resolve_dir(model_dir).join(format!("ggml-{}.bin", WHISPER_MODEL.name))
}

/// Path of the CoreML encoder bundle whisper.cpp looks for next to the model
pub fn coreml_model_path(model_dir: Option<&Path>) -> PathBuf {
    resolve_dir(model_dir).join(COREML_MODEL_NAME)
}

pub fn is_bin_model_downloaded(model_dir: Option<&Path>) -> bool {
    model_path(model_dir).exists()
}

pub fn is_coreml_model_downloaded(model_dir: Option<&Path>) -> bool {
    coreml_model_path(model_dir).exists()
}

/// Whether everything this build needs is on disk. The CoreML encoder only
/// matters when whisper.cpp was built with CoreML.
pub fn is_model_downloaded(model_dir: Option<&Path>) -> bool {
    is_bin_model_downloaded(model_dir) && (!cfg!(feature = "coreml") || is_coreml_model_downloaded(model_dir))
}

/// Format bytes as a short human readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let value = bytes as f64;
    if value < KB {
        format!("{} B", bytes)
    } else if value < MB {
        format!("{:.1} KB", value / KB)
    } else if value < GB {
        format!("{:.1} MB", value / MB)
    } else {
        format!("{:.2} GB", value / GB)
    }
}
