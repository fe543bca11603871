//! Audio transformation and analysis pipeline: gain and hard clipping,
//! multi-algorithm sample-rate conversion, short-time spectral analysis,
//! and display decimation over fully buffered signals.
//!
//! The pipeline is synchronous and pure: every stage maps an in-memory
//! buffer to a new one, the original decoded signal is never mutated, and
//! rerunning with new parameters is idempotent. Container decode/encode and
//! rendering live outside the core; see [`wav`] for the WAV boundary
//! adapter.

pub mod config;
pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod wav;

pub use config::{PipelineConfig, ResampleAlgorithm};
pub use dsp::resample::RatioApproximation;
pub use error::{ProcessError, WavError};
pub use pipeline::{Pipeline, PipelineOutput};
pub use types::{SignalBuffer, SpectrogramMatrix, SpectrogramSeries, WaveformSeries};
