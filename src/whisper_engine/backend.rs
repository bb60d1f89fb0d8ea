// Whisper Engine - Model context abstraction
//
// The acoustic model and its decoder live outside this crate. `ModelContext`
// is the seam: whisper-rs in production, a scripted fake in tests.
use std::path::Path;

use super::params::DecodingParams;

/// One decoded segment as the engine reports it (bounds in engine ticks)
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub t0: i64,
    pub t1: i64,
    pub text: String,
}

/// A loaded, ready-to-decode model.
///
/// Dropping the value releases the native context. Implementations are not
/// required to support concurrent decodes; callers hold `&mut self`.
pub trait ModelContext: Send + Sized {
    /// Load the model file. Errors carry the engine's description of the cause.
    fn load(model_path: &Path, use_gpu: bool) -> Result<Self, String>;

    /// Run the full decode pipeline on 16kHz mono samples and collect the
    /// segments in chronological order. `Err` carries the engine status code.
    fn decode(&mut self, params: &DecodingParams, samples: &[f32]) -> Result<Vec<RawSegment>, i32>;

    /// Silence the engine's own diagnostic output. Must be idempotent.
    fn suppress_engine_logs();

    /// Engine version string
    fn engine_version() -> &'static str;

    /// Description of the compiled-in acceleration backend
    fn acceleration() -> String;
}
