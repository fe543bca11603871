use crate::error::ProcessError;
use serde::{Deserialize, Serialize};

/// Sample-rate conversion algorithm. A closed set so dispatch is exhaustive
/// and each variant can be tested in isolation; they span a quality/cost
/// spectrum the caller trades off explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleAlgorithm {
    /// Windowed-sinc interpolation, Blackman window. Fast but clean.
    HighQuality,
    /// Windowed-sinc with a longer kernel and Blackman-Harris window.
    /// Lower passband ripple, higher stopband attenuation, more compute.
    VeryHighQuality,
    /// Rational-ratio polyphase FIR. The ratio is reduced to a bounded
    /// denominator; any approximation is surfaced on the outcome.
    PolyphaseFir,
    /// Piecewise-linear interpolation. Cheapest, most aliasing.
    Linear,
}

/// The full configuration surface of one pipeline invocation, passed
/// explicitly rather than held as ambient state. Immutable per run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Linear amplitude scale, applied before clipping. Must be >= 0.
    pub gain: f32,
    /// Hard clip magnitude. Must be > 0.
    pub clip_threshold: f32,
    /// Output sample rate; `None` keeps the source rate (identity).
    pub target_sample_rate: Option<u32>,
    pub algorithm: ResampleAlgorithm,
    /// STFT window size; `None` derives it from the post-resample rate.
    pub fft_size: Option<usize>,
    /// STFT hop; `None` uses a quarter of the window.
    pub hop_size: Option<usize>,
    /// Point budget for the waveform display series.
    pub waveform_points: usize,
    /// Row (frequency) budget for the spectrogram display series.
    pub spectrogram_freq_bins: usize,
    /// Column (time) budget for the spectrogram display series.
    pub spectrogram_time_frames: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gain: 1.0,
            clip_threshold: 1.0,
            target_sample_rate: None,
            algorithm: ResampleAlgorithm::HighQuality,
            fft_size: None,
            hop_size: None,
            waveform_points: 2000,
            spectrogram_freq_bins: 1024,
            spectrogram_time_frames: 2000,
        }
    }
}

impl PipelineConfig {
    /// Reject invalid parameters before any processing happens.
    pub fn validate(&self) -> Result<(), ProcessError> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(ProcessError::Configuration(format!(
                "gain must be a non-negative finite number, got {}",
                self.gain
            )));
        }
        if !self.clip_threshold.is_finite() || self.clip_threshold <= 0.0 {
            return Err(ProcessError::Configuration(format!(
                "clip threshold must be positive, got {}",
                self.clip_threshold
            )));
        }
        if self.target_sample_rate == Some(0) {
            return Err(ProcessError::Configuration(
                "target sample rate must be positive".into(),
            ));
        }
        if let Some(n) = self.fft_size {
            if n == 0 || !n.is_power_of_two() {
                return Err(ProcessError::Configuration(format!(
                    "fft size must be a power of two, got {n}"
                )));
            }
        }
        if self.hop_size == Some(0) {
            return Err(ProcessError::Configuration("hop size must be positive".into()));
        }
        if self.waveform_points == 0
            || self.spectrogram_freq_bins == 0
            || self.spectrogram_time_frames == 0
        {
            return Err(ProcessError::Configuration(
                "display point budgets must be positive".into(),
            ));
        }
        Ok(())
    }
}
