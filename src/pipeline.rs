use crate::config::PipelineConfig;
use crate::dsp::resample::RatioApproximation;
use crate::dsp::{amplitude, decimate, resample, stft};
use crate::error::ProcessError;
use crate::types::{SignalBuffer, SpectrogramSeries, WaveformSeries};

/// Everything one pipeline pass produces: the processed signal (the export
/// hand-off) and the two display series derived from it.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub processed: SignalBuffer,
    pub waveform: WaveformSeries,
    pub spectrogram: SpectrogramSeries,
    /// Set when PolyphaseFir could not hit the requested rate exactly.
    pub resample_note: Option<RatioApproximation>,
}

/// Fixed-order orchestration: amplitude -> resample, then the waveform
/// decimator and the spectral analyzer + decimator both read the
/// post-resample buffer. Stateless across invocations; a parameter change
/// reruns the whole pass from the original decoded buffer.
#[derive(Clone, Copy, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, input: &SignalBuffer) -> Result<PipelineOutput, ProcessError> {
        let config = &self.config;
        config.validate()?;
        if input.sample_rate == 0 {
            return Err(ProcessError::Configuration(
                "input sample rate must be positive".into(),
            ));
        }

        let shaped = amplitude::apply(input, config.gain, config.clip_threshold)?;

        let target_rate = config.target_sample_rate.unwrap_or(input.sample_rate);
        let outcome = resample::resample(&shaped, target_rate, config.algorithm)?;
        let processed = outcome.buffer;

        // The post-resample rate is the single source of truth for all
        // downstream axis computations.
        let rate = processed.sample_rate;
        let mono = processed.mixdown();

        let fft_size = config
            .fft_size
            .unwrap_or_else(|| stft::fft_size_for_rate(rate));
        let hop_size = config
            .hop_size
            .unwrap_or_else(|| stft::hop_for_fft_size(fft_size));

        let matrix = stft::analyze(mono.as_ref(), rate, fft_size, hop_size)?;
        let waveform = decimate::waveform(mono.as_ref(), rate, config.waveform_points)?;
        let spectrogram = decimate::spectrogram(
            &matrix,
            config.spectrogram_freq_bins,
            config.spectrogram_time_frames,
        )?;

        log::debug!(
            "pipeline pass: {} frames @ {} Hz -> {} frames @ {} Hz, {} waveform points, {}x{} spectrogram",
            input.frames(),
            input.sample_rate,
            processed.frames(),
            rate,
            waveform.points.len(),
            spectrogram.frequencies.len(),
            spectrogram.times.len(),
        );

        Ok(PipelineOutput {
            processed,
            waveform,
            spectrogram,
            resample_note: outcome.approximation,
        })
    }
}
