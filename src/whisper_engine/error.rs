// Whisper Engine - Error types
use std::path::PathBuf;

/// Failures surfaced by the engine and its boundary handle
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionError {
    /// Malformed or missing input at the boundary
    InvalidArgument(String),
    /// whisper.cpp could not load the model file
    EngineLoad { model_path: PathBuf, cause: String },
    /// No model is loaded
    NotReady,
    /// whisper_full returned a non-zero status
    Decode { code: i32 },
    /// Declared in the contract but not built
    Unimplemented(&'static str),
}

impl std::fmt::Display for TranscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::EngineLoad { model_path, cause } => write!(
                f,
                "Failed to load Whisper model from: {}: {}",
                model_path.display(),
                cause
            ),
            Self::NotReady => write!(f, "Whisper engine not initialized"),
            Self::Decode { code } => {
                write!(f, "Whisper transcription failed with code: {}", code)
            }
            Self::Unimplemented(operation) => write!(
                f,
                "{} not yet implemented - use transcribe() with samples",
                operation
            ),
        }
    }
}

impl std::error::Error for TranscriptionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            TranscriptionError::NotReady.to_string(),
            "Whisper engine not initialized"
        );
        assert_eq!(
            TranscriptionError::Decode { code: 7 }.to_string(),
            "Whisper transcription failed with code: 7"
        );

        let load = TranscriptionError::EngineLoad {
            model_path: PathBuf::from("/missing.bin"),
            cause: "no such file".to_string(),
        };
        let message = load.to_string();
        assert!(message.contains("/missing.bin"));
        assert!(message.contains("no such file"));

        assert!(TranscriptionError::Unimplemented("transcribe_file")
            .to_string()
            .starts_with("transcribe_file not yet implemented"));
        assert!(TranscriptionError::InvalidArgument("modelPath is required".to_string())
            .to_string()
            .contains("modelPath"));
    }
}
