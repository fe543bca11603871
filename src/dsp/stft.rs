use crate::error::ProcessError;
use crate::types::SpectrogramMatrix;
use realfft::RealFftPlanner;
use std::cell::RefCell;
use std::collections::HashMap;

/// Display floor for dB values; keeps log scaling stable around silence.
pub const DB_FLOOR: f32 = -80.0;

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f32>> = RefCell::new(RealFftPlanner::new());
    static HANN_CACHE: RefCell<HashMap<usize, Vec<f32>>> = RefCell::new(HashMap::new());
}

fn hann_window(size: usize) -> Vec<f32> {
    HANN_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry(size)
            .or_insert_with(|| {
                (0..size)
                    .map(|i| {
                        0.5 * (1.0
                            - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
                    })
                    .collect()
            })
            .clone()
    })
}

/// Window size as a function of sample rate. High rates get a larger window
/// so frequency resolution (`rate / N`) stays comparable across rates.
pub fn fft_size_for_rate(sample_rate: u32) -> usize {
    if sample_rate >= 96_000 {
        4096
    } else {
        2048
    }
}

/// Default hop: a quarter window, 75% overlap.
pub fn hop_for_fft_size(fft_size: usize) -> usize {
    (fft_size / 4).max(1)
}

/// Hann-windowed magnitude STFT converted to a dB matrix.
///
/// Frames start at multiples of `hop_size`; each contributes the magnitudes
/// of the first `fft_size / 2 + 1` bins as one column. The whole matrix is
/// normalized to its loudest bin (`20 * log10(m / max)`), so the ceiling is
/// exactly 0 dB and everything else is negative, floored at [`DB_FLOOR`].
///
/// A window longer than the signal fails fast with `InsufficientSamples`
/// rather than silently shrinking, which would change the reported
/// frequency resolution without notice.
pub fn analyze(
    samples: &[f32],
    sample_rate: u32,
    fft_size: usize,
    hop_size: usize,
) -> Result<SpectrogramMatrix, ProcessError> {
    if sample_rate == 0 {
        return Err(ProcessError::Configuration(
            "sample rate must be positive".into(),
        ));
    }
    if fft_size == 0 || !fft_size.is_power_of_two() {
        return Err(ProcessError::Configuration(format!(
            "fft size must be a power of two, got {fft_size}"
        )));
    }
    if hop_size == 0 {
        return Err(ProcessError::Configuration("hop size must be positive".into()));
    }
    if samples.len() < fft_size {
        return Err(ProcessError::InsufficientSamples {
            needed: fft_size,
            available: samples.len(),
        });
    }

    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(fft_size));
    let window = hann_window(fft_size);
    let n_bins = fft_size / 2 + 1;

    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let mut columns: Vec<Vec<f32>> = Vec::new();
    let mut times = Vec::new();

    let mut pos = 0;
    while pos + fft_size <= samples.len() {
        for (inp, (&s, &w)) in input
            .iter_mut()
            .zip(samples[pos..pos + fft_size].iter().zip(window.iter()))
        {
            *inp = s * w;
        }
        fft.process(&mut input, &mut spectrum).expect("FFT failed");

        columns.push(spectrum.iter().map(|c| c.norm()).collect());
        times.push(pos as f64 / sample_rate as f64);
        pos += hop_size;
    }

    // Global max across the whole analysis anchors the dB scale at 0.
    let max_mag = columns
        .iter()
        .flat_map(|col| col.iter())
        .copied()
        .fold(0.0f32, f32::max);

    let cols = columns.len();
    let mut db = vec![DB_FLOOR; n_bins * cols];
    if max_mag > 0.0 {
        for (frame, col) in columns.iter().enumerate() {
            for (bin, &mag) in col.iter().enumerate() {
                if mag > 0.0 {
                    db[bin * cols + frame] = (20.0 * (mag / max_mag).log10()).max(DB_FLOOR);
                }
            }
        }
    }

    let frequencies = (0..n_bins)
        .map(|i| i as f64 * sample_rate as f64 / fft_size as f64)
        .collect();

    Ok(SpectrogramMatrix {
        db,
        frequencies,
        times,
    })
}
