// Whisper Engine - Result assembly from raw segments
use super::backend::RawSegment;
use super::types::{TranscriptionResult, TranscriptionSegment};

/// whisper.cpp reports segment bounds in centiseconds
pub const TICKS_TO_MS: i64 = 10;

/// Placeholder until the engine exposes a real score
pub const PLACEHOLDER_CONFIDENCE: f32 = 1.0;

const TRIMMED_CHARS: [char; 4] = [' ', '\t', '\n', '\r'];

/// Concatenate segment texts, adding one space at a boundary only when the
/// next segment doesn't already start with one.
pub fn join_segment_text<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut full_text = String::new();
    for text in texts {
        if !full_text.is_empty() && !text.is_empty() && !text.starts_with(' ') {
            full_text.push(' ');
        }
        full_text.push_str(text);
    }
    full_text
}

/// Strip leading/trailing spaces, tabs, and line breaks
pub fn trim_transcript(text: &str) -> &str {
    text.trim_matches(TRIMMED_CHARS.as_slice())
}

pub fn to_segment(raw: RawSegment) -> TranscriptionSegment {
    TranscriptionSegment {
        start_ms: raw.t0 * TICKS_TO_MS,
        end_ms: raw.t1 * TICKS_TO_MS,
        text: raw.text,
        confidence: PLACEHOLDER_CONFIDENCE,
    }
}

/// Build the caller-facing result from the engine's ordered segments
pub fn assemble_result(raw_segments: Vec<RawSegment>, language: &str, duration_ms: f64) -> TranscriptionResult {
    let segments: Vec<TranscriptionSegment> = raw_segments.into_iter().map(to_segment).collect();
    let full_text = join_segment_text(segments.iter().map(|s| s.text.as_str()));

    TranscriptionResult {
        text: trim_transcript(&full_text).to_string(),
        language: language.to_string(),
        duration_ms,
        segments,
    }
}
