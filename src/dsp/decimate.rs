use crate::error::ProcessError;
use crate::types::{SpectrogramMatrix, SpectrogramSeries, WaveformPoint, WaveformSeries};

/// Indices retained when reducing `len` items to at most `cap`.
///
/// Pure point selection, never interpolation or averaging, so everything
/// displayed is a verifiable subsequence of the true data. Short inputs
/// keep every index; longer ones keep exactly `cap` indices at fractional
/// stride `len / cap` (44100 samples at a 1000-point budget retain every
/// 44.1th sample on average). Brief transients between retained points can
/// be missed; the target use is visual inspection, not peak metering.
pub fn decimate_indices(len: usize, cap: usize) -> Result<Vec<usize>, ProcessError> {
    if cap == 0 {
        return Err(ProcessError::Configuration(
            "display point budget must be positive".into(),
        ));
    }
    if len <= cap {
        return Ok((0..len).collect());
    }
    Ok((0..cap).map(|i| i * len / cap).collect())
}

/// Reduce a mono sample slice to a bounded (time, amplitude) series.
pub fn waveform(
    samples: &[f32],
    sample_rate: u32,
    max_points: usize,
) -> Result<WaveformSeries, ProcessError> {
    if sample_rate == 0 {
        return Err(ProcessError::Configuration(
            "sample rate must be positive".into(),
        ));
    }
    let points = decimate_indices(samples.len(), max_points)?
        .into_iter()
        .map(|i| WaveformPoint {
            time: i as f64 / sample_rate as f64,
            amplitude: samples[i],
        })
        .collect();
    Ok(WaveformSeries { points })
}

/// Reduce a spectrogram matrix to bounded row/column counts. Rows and
/// columns decimate independently, and the axis arrays are decimated with
/// the same indices so labels stay aligned with the retained data.
pub fn spectrogram(
    matrix: &SpectrogramMatrix,
    max_freq_bins: usize,
    max_time_frames: usize,
) -> Result<SpectrogramSeries, ProcessError> {
    let row_idx = decimate_indices(matrix.rows(), max_freq_bins)?;
    let col_idx = decimate_indices(matrix.cols(), max_time_frames)?;

    let db = row_idx
        .iter()
        .map(|&r| col_idx.iter().map(|&c| matrix.value(r, c)).collect())
        .collect();

    Ok(SpectrogramSeries {
        frequencies: row_idx.iter().map(|&r| matrix.frequencies[r]).collect(),
        times: col_idx.iter().map(|&c| matrix.times[c]).collect(),
        db,
    })
}
