use crate::error::ProcessError;
use crate::types::SignalBuffer;

/// Apply linear gain followed by hard clipping: `clamp(s * gain, -clip, +clip)`.
///
/// Gain runs first on purpose — boosted gain can push samples past the clip
/// range, which simulates hard limiting after a boost. `gain == 0` yields
/// silence; a threshold at or above the post-gain peak leaves the signal
/// untouched. Empty in, empty out.
pub fn apply(
    buffer: &SignalBuffer,
    gain: f32,
    clip_threshold: f32,
) -> Result<SignalBuffer, ProcessError> {
    if !gain.is_finite() || gain < 0.0 {
        return Err(ProcessError::Configuration(format!(
            "gain must be a non-negative finite number, got {gain}"
        )));
    }
    if !clip_threshold.is_finite() || clip_threshold <= 0.0 {
        return Err(ProcessError::Configuration(format!(
            "clip threshold must be positive, got {clip_threshold}"
        )));
    }

    let samples = buffer
        .samples
        .iter()
        .map(|&s| (s * gain).clamp(-clip_threshold, clip_threshold))
        .collect();

    Ok(SignalBuffer::new(samples, buffer.sample_rate, buffer.channels))
}
