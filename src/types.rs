use serde::Serialize;
use std::borrow::Cow;

/// A decoded audio signal: interleaved f32 samples plus rate and channel count.
///
/// Every pipeline stage produces a new `SignalBuffer`; the original decoded
/// buffer is never mutated, so pre- and post-processing metadata can be shown
/// side by side.
#[derive(Clone, Debug, PartialEq)]
pub struct SignalBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SignalBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Rebuild an interleaved buffer from planar per-channel sample vectors.
    /// All channels must have equal length.
    pub fn from_planar(planar: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        if planar.is_empty() {
            return Self::mono(Vec::new(), sample_rate);
        }
        let channels = planar.len();
        let frames = planar[0].len();
        let mut samples = Vec::with_capacity(channels * frames);
        for frame in 0..frames {
            for ch in &planar {
                samples.push(ch[frame]);
            }
        }
        Self::new(samples, sample_rate, channels as u16)
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Extract one channel as a planar sample vector.
    pub fn channel(&self, index: usize) -> Vec<f32> {
        let stride = self.channels.max(1) as usize;
        self.samples
            .iter()
            .skip(index)
            .step_by(stride)
            .copied()
            .collect()
    }

    /// Split into planar per-channel vectors.
    pub fn to_planar(&self) -> Vec<Vec<f32>> {
        (0..self.channels.max(1) as usize)
            .map(|i| self.channel(i))
            .collect()
    }

    /// Mono view of the signal: the samples themselves for mono buffers,
    /// an averaged mixdown otherwise. Display analysis works on this.
    pub fn mixdown(&self) -> Cow<'_, [f32]> {
        let stride = self.channels.max(1) as usize;
        if stride == 1 {
            return Cow::Borrowed(&self.samples);
        }
        let mixed = self
            .samples
            .chunks_exact(stride)
            .map(|frame| frame.iter().sum::<f32>() / stride as f32)
            .collect();
        Cow::Owned(mixed)
    }
}

/// dB-scaled magnitude STFT, row-major with one row per frequency bin.
///
/// Values are normalized to the loudest bin in the whole matrix (0 dB) and
/// floored for display stability, so every entry is in `[floor, 0]`.
#[derive(Clone, Debug)]
pub struct SpectrogramMatrix {
    /// Row-major dB values, `frequencies.len() * times.len()` entries.
    pub db: Vec<f32>,
    /// Hz per row, strictly increasing: `bin_i = i * sample_rate / fft_size`.
    pub frequencies: Vec<f64>,
    /// Seconds per column: `frame_j = j * hop_size / sample_rate`.
    pub times: Vec<f64>,
}

impl SpectrogramMatrix {
    pub fn rows(&self) -> usize {
        self.frequencies.len()
    }

    pub fn cols(&self) -> usize {
        self.times.len()
    }

    pub fn value(&self, bin: usize, frame: usize) -> f32 {
        self.db[bin * self.cols() + frame]
    }
}

/// One retained waveform sample, positioned in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WaveformPoint {
    pub time: f64,
    pub amplitude: f32,
}

/// Bounded-size waveform view: a strided subsequence of the true signal,
/// ready for an external renderer. Derived per render request, no lifecycle.
#[derive(Clone, Debug, Serialize)]
pub struct WaveformSeries {
    pub points: Vec<WaveformPoint>,
}

/// Bounded-size spectrogram view with explicit axis arrays, so a renderer
/// needs no knowledge of sample rate or FFT parameters.
#[derive(Clone, Debug, Serialize)]
pub struct SpectrogramSeries {
    pub frequencies: Vec<f64>,
    pub times: Vec<f64>,
    /// `frequencies.len()` rows of `times.len()` dB values.
    pub db: Vec<Vec<f32>>,
}
