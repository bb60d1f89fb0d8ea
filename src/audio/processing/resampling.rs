// Audio Processing - Resampling
use std::borrow::Cow;
use log::debug;

/// Sample rate whisper.cpp expects for all input audio
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Number of samples produced when converting `input_len` samples between rates.
///
/// Computed in integer arithmetic so the result is exactly
/// `floor(input_len * to_sample_rate / from_sample_rate)`.
pub fn resampled_len(input_len: usize, from_sample_rate: u32, to_sample_rate: u32) -> usize {
    if from_sample_rate == 0 {
        return 0;
    }
    ((input_len as u128 * to_sample_rate as u128) / from_sample_rate as u128) as usize
}

/// Linear-interpolation resampler for mono audio.
///
/// This is intentionally low fidelity: there is no anti-aliasing filter, so
/// downsampling folds energy above the new Nyquist frequency back into the
/// signal. Good enough for speech going into whisper.
///
/// Returns the input untouched (borrowed) when the rates already match.
pub fn resample(input: &[f32], from_sample_rate: u32, to_sample_rate: u32) -> Cow<'_, [f32]> {
    if from_sample_rate == to_sample_rate {
        return Cow::Borrowed(input);
    }

    let output_len = resampled_len(input.len(), from_sample_rate, to_sample_rate);
    if input.is_empty() || output_len == 0 {
        return Cow::Owned(Vec::new());
    }

    let last = input.len() - 1;
    let step = from_sample_rate as f64 / to_sample_rate as f64;

    let output: Vec<f32> = (0..output_len)
        .map(|i| {
            let src_idx = i as f64 * step;
            let idx0 = (src_idx.floor() as usize).min(last);
            let idx1 = (idx0 + 1).min(last);
            let frac = src_idx - idx0 as f64;
            (input[idx0] as f64 * (1.0 - frac) + input[idx1] as f64 * frac) as f32
        })
        .collect();

    debug!(
        "Linear resampling {}Hz -> {}Hz: {} samples -> {} samples",
        from_sample_rate,
        to_sample_rate,
        input.len(),
        output.len()
    );

    Cow::Owned(output)
}

/// Resample to the rate whisper.cpp requires
pub fn resample_for_whisper(input: &[f32], sample_rate: u32) -> Cow<'_, [f32]> {
    resample(input, sample_rate, WHISPER_SAMPLE_RATE)
}
