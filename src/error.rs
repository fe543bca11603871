use thiserror::Error;

/// Failures of the core pipeline. All stages are deterministic pure
/// functions, so every error is a caller-input problem; nothing retries.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Invalid numeric parameter: non-positive sample rate, negative gain,
    /// non-positive clip threshold, zero display budget, bad FFT geometry.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A length-dependent stage was given fewer samples than it needs.
    #[error("need at least {needed} samples but only {available} are available")]
    InsufficientSamples { needed: usize, available: usize },
}

/// Failure at the WAV boundary adapter. Kept apart from `ProcessError` so
/// decode problems never masquerade as core pipeline errors.
#[derive(Debug, Error)]
#[error("wav i/o failed: {0}")]
pub struct WavError(#[from] pub hound::Error);
