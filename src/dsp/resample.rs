use crate::config::ResampleAlgorithm;
use crate::error::ProcessError;
use crate::types::SignalBuffer;
use serde::Serialize;
use std::f64::consts::PI;

/// Largest denominator the polyphase filter bank will accept after ratio
/// reduction. Ratios that cannot be represented within this bound are
/// approximated and the deviation reported on the outcome.
pub const MAX_POLYPHASE_DENOMINATOR: u32 = 1000;

/// Taps per polyphase branch of the prototype lowpass.
const POLYPHASE_TAPS_PER_PHASE: usize = 48;

/// Cutoff safety margin below the narrower Nyquist, shared by all FIR paths.
const CUTOFF_GUARD: f64 = 0.95;

/// Sinc kernel half-width (zero crossings per side) for the two
/// windowed-sinc qualities.
const HIGH_QUALITY_HALF_WIDTH: usize = 16;
const VERY_HIGH_QUALITY_HALF_WIDTH: usize = 64;

/// The polyphase ratio bound forced a nearby rational; the output rate
/// differs slightly from the requested one. Informational, never fatal.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RatioApproximation {
    pub requested_hz: u32,
    pub achieved_hz: f64,
    pub up: u32,
    pub down: u32,
}

/// A resampled buffer plus the ratio deviation, if any.
#[derive(Clone, Debug)]
pub struct ResampleOutcome {
    pub buffer: SignalBuffer,
    pub approximation: Option<RatioApproximation>,
}

/// Convert `buffer` to `target_rate` with the selected algorithm.
///
/// Equal rates short-circuit to a bit-equal copy before any algorithm runs;
/// an empty buffer yields an empty buffer at the target rate. Otherwise the
/// output holds `round(frames * target / source)` frames per channel.
/// Multi-channel buffers are split planar, converted per channel, and
/// re-interleaved.
pub fn resample(
    buffer: &SignalBuffer,
    target_rate: u32,
    algorithm: ResampleAlgorithm,
) -> Result<ResampleOutcome, ProcessError> {
    let source_rate = buffer.sample_rate;
    if source_rate == 0 || target_rate == 0 {
        return Err(ProcessError::Configuration(format!(
            "sample rates must be positive, got {source_rate} -> {target_rate}"
        )));
    }
    if buffer.samples.len() % buffer.channels.max(1) as usize != 0 {
        return Err(ProcessError::Configuration(format!(
            "{} samples cannot be interleaved as {} channels",
            buffer.samples.len(),
            buffer.channels
        )));
    }
    if target_rate == source_rate {
        return Ok(ResampleOutcome {
            buffer: buffer.clone(),
            approximation: None,
        });
    }
    if buffer.is_empty() {
        return Ok(ResampleOutcome {
            buffer: SignalBuffer::new(Vec::new(), target_rate, buffer.channels),
            approximation: None,
        });
    }

    let (out, approximation) = match algorithm {
        ResampleAlgorithm::Linear => (
            per_channel(buffer, target_rate, |ch| {
                linear_channel(ch, source_rate, target_rate)
            }),
            None,
        ),
        ResampleAlgorithm::HighQuality => (
            per_channel(buffer, target_rate, |ch| {
                sinc_channel(ch, source_rate, target_rate, HIGH_QUALITY_HALF_WIDTH, blackman)
            }),
            None,
        ),
        ResampleAlgorithm::VeryHighQuality => (
            per_channel(buffer, target_rate, |ch| {
                sinc_channel(
                    ch,
                    source_rate,
                    target_rate,
                    VERY_HIGH_QUALITY_HALF_WIDTH,
                    blackman_harris,
                )
            }),
            None,
        ),
        ResampleAlgorithm::PolyphaseFir => {
            let (up, down) = bounded_ratio(target_rate, source_rate, MAX_POLYPHASE_DENOMINATOR);
            let exact = up as u64 * source_rate as u64 == down as u64 * target_rate as u64;
            let achieved_hz = source_rate as f64 * up as f64 / down as f64;
            let out_rate = if exact {
                target_rate
            } else {
                achieved_hz.round() as u32
            };
            let out = per_channel(buffer, out_rate, |ch| polyphase_channel(ch, up, down));
            let approximation = (!exact).then_some(RatioApproximation {
                requested_hz: target_rate,
                achieved_hz,
                up,
                down,
            });
            (out, approximation)
        }
    };

    log::debug!(
        "resampled {} -> {} Hz ({:?}): {} -> {} frames",
        source_rate,
        out.sample_rate,
        algorithm,
        buffer.frames(),
        out.frames()
    );

    Ok(ResampleOutcome {
        buffer: out,
        approximation,
    })
}

/// Run a per-channel converter over every channel and re-interleave.
fn per_channel(
    buffer: &SignalBuffer,
    out_rate: u32,
    convert: impl Fn(&[f32]) -> Vec<f32>,
) -> SignalBuffer {
    if buffer.channels <= 1 {
        return SignalBuffer::mono(convert(&buffer.samples), out_rate);
    }
    let planar = buffer
        .to_planar()
        .iter()
        .map(|ch| convert(ch))
        .collect::<Vec<_>>();
    SignalBuffer::from_planar(planar, out_rate)
}

fn output_len(frames: usize, source_rate: u32, target_rate: u32) -> usize {
    (frames as f64 * target_rate as f64 / source_rate as f64).round() as usize
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Blackman window over normalized position `x` in [-1, 1].
fn blackman(x: f64) -> f64 {
    let px = PI * x;
    0.42 + 0.5 * px.cos() + 0.08 * (2.0 * px).cos()
}

/// 4-term Blackman-Harris window over `x` in [-1, 1]. Higher sidelobe
/// rejection than Blackman at the cost of a wider main lobe.
fn blackman_harris(x: f64) -> f64 {
    let px = PI * x;
    0.35875 + 0.48829 * px.cos() + 0.14128 * (2.0 * px).cos() + 0.01168 * (3.0 * px).cos()
}

/// Band-limited reconstruction at the new sample instants via windowed-sinc
/// interpolation. When downsampling, the kernel stretches by the rate ratio
/// so the cutoff tracks the *target* Nyquist and aliasing stays suppressed.
fn sinc_channel(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
    half_width: usize,
    window: fn(f64) -> f64,
) -> Vec<f32> {
    let out_len = output_len(samples.len(), source_rate, target_rate);
    let step = source_rate as f64 / target_rate as f64;
    // Relative cutoff: fraction of the source Nyquist that survives.
    let cutoff = CUTOFF_GUARD * (target_rate as f64 / source_rate as f64).min(1.0);
    let support = half_width as f64 / cutoff;
    let len = samples.len() as isize;

    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * step;
        let k_first = (pos - support).ceil() as isize;
        let k_last = (pos + support).floor() as isize;
        let mut acc = 0.0f64;
        for k in k_first.max(0)..=k_last.min(len - 1) {
            let t = pos - k as f64;
            let w = window(t * cutoff / half_width as f64);
            acc += samples[k as usize] as f64 * cutoff * sinc(cutoff * t) * w;
        }
        out.push(acc as f32);
    }
    out
}

/// Piecewise-linear interpolation at the new sample instants. Cheapest of
/// the four; keeps whatever images fold back below the new Nyquist.
fn linear_channel(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    let out_len = output_len(samples.len(), source_rate, target_rate);
    let step = source_rate as f64 / target_rate as f64;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples[(idx + 1).min(last)];
            a + frac * (b - a)
        })
        .collect()
}

/// Reduce `target/source` by gcd; if the reduced denominator exceeds
/// `max_denominator`, scan for the nearest representable rational instead.
fn bounded_ratio(target_rate: u32, source_rate: u32, max_denominator: u32) -> (u32, u32) {
    let g = gcd(target_rate, source_rate);
    let (up, down) = (target_rate / g, source_rate / g);
    if down <= max_denominator {
        return (up, down);
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let mut best = (1u32, 1u32);
    let mut best_err = f64::INFINITY;
    for den in 1..=max_denominator {
        let num = (ratio * den as f64).round().max(1.0) as u32;
        let err = (num as f64 / den as f64 - ratio).abs();
        if err < best_err {
            best_err = err;
            best = (num, den);
        }
    }
    best
}

fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Rational-ratio resampling by `up/down` through a windowed-sinc prototype
/// lowpass, evaluated polyphase-style: for each output sample only the taps
/// that land on real input samples are touched, so upsample-by-`up` never
/// materializes.
fn polyphase_channel(samples: &[f32], up: u32, down: u32) -> Vec<f32> {
    let up = up as usize;
    let down = down as usize;
    let taps = up * POLYPHASE_TAPS_PER_PHASE + 1;
    let center = (taps - 1) / 2;

    // Cutoff in cycles per upsampled sample: the narrower of the two Nyquists.
    let cutoff = CUTOFF_GUARD * 0.5 / up.max(down) as f64;
    let h: Vec<f64> = (0..taps)
        .map(|t| {
            let x = t as f64 - center as f64;
            up as f64 * 2.0 * cutoff * sinc(2.0 * cutoff * x) * blackman(x / center as f64)
        })
        .collect();

    let out_len = (samples.len() as f64 * up as f64 / down as f64).round() as usize;
    let len = samples.len() as isize;
    let taps_i = taps as isize;
    let up_i = up as isize;

    let mut out = Vec::with_capacity(out_len);
    for j in 0..out_len {
        // Position of this output sample in the (virtual) upsampled stream,
        // shifted by the filter's group delay.
        let m = (j * down + center) as isize;
        let k_first = (m - taps_i + 1 + up_i - 1).div_euclid(up_i);
        let k_last = m.div_euclid(up_i);
        let mut acc = 0.0f64;
        for k in k_first.max(0)..=k_last.min(len - 1) {
            acc += samples[k as usize] as f64 * h[(m - k * up_i) as usize];
        }
        out.push(acc as f32);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, secs: f64) -> Vec<f32> {
        let n = (sample_rate as f64 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    fn rms(samples: &[f32]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        (samples.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
    }

    const ALL: [ResampleAlgorithm; 4] = [
        ResampleAlgorithm::HighQuality,
        ResampleAlgorithm::VeryHighQuality,
        ResampleAlgorithm::PolyphaseFir,
        ResampleAlgorithm::Linear,
    ];

    #[test]
    fn identity_is_bit_equal_for_every_algorithm() {
        let buffer = SignalBuffer::mono(sine(440.0, 44100, 0.1), 44100);
        for algorithm in ALL {
            let out = resample(&buffer, 44100, algorithm).unwrap();
            assert_eq!(out.buffer, buffer);
            assert!(out.approximation.is_none());
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let buffer = SignalBuffer::mono(vec![], 44100);
        for algorithm in ALL {
            let out = resample(&buffer, 22050, algorithm).unwrap();
            assert!(out.buffer.is_empty());
            assert_eq!(out.buffer.sample_rate, 22050);
        }
    }

    #[test]
    fn zero_rate_is_rejected() {
        let buffer = SignalBuffer::mono(vec![0.0; 16], 44100);
        assert!(matches!(
            resample(&buffer, 0, ResampleAlgorithm::Linear),
            Err(ProcessError::Configuration(_))
        ));
    }

    #[test]
    fn output_length_tracks_rate_ratio() {
        let buffer = SignalBuffer::mono(sine(440.0, 44100, 0.25), 44100);
        let n = buffer.frames() as f64;
        for target in [22050u32, 48000, 8000, 96000] {
            for algorithm in ALL {
                let out = resample(&buffer, target, algorithm).unwrap().buffer;
                let expected = (n * target as f64 / 44100.0).round();
                let got = out.frames() as f64;
                assert!(
                    (got - expected).abs() <= 1.0,
                    "{algorithm:?} to {target} Hz: got {got}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn high_quality_preserves_passband_tone() {
        let source_rate = 44100;
        let target_rate = 48000;
        let buffer = SignalBuffer::mono(sine(440.0, source_rate, 0.5), source_rate);
        let out = resample(&buffer, target_rate, ResampleAlgorithm::HighQuality)
            .unwrap()
            .buffer;

        // Compare against the analytic tone away from the edges.
        let mut worst = 0.0f64;
        for i in 1000..out.frames() - 1000 {
            let expected = (2.0 * PI * 440.0 * i as f64 / target_rate as f64).sin();
            worst = worst.max((out.samples[i] as f64 - expected).abs());
        }
        assert!(worst < 0.02, "worst passband error {worst}");
    }

    #[test]
    fn polyphase_rejects_aliasing_better_than_linear() {
        // 15 kHz lies above the 11025 Hz Nyquist of the target rate; a good
        // filter removes it, linear interpolation folds it back instead.
        let buffer = SignalBuffer::mono(sine(15_000.0, 44100, 0.25), 44100);
        let poly = resample(&buffer, 22050, ResampleAlgorithm::PolyphaseFir)
            .unwrap()
            .buffer;
        let linear = resample(&buffer, 22050, ResampleAlgorithm::Linear)
            .unwrap()
            .buffer;

        let rms_poly = rms(&poly.samples[100..poly.frames() - 100]);
        let rms_linear = rms(&linear.samples[100..linear.frames() - 100]);
        assert!(rms_linear > 0.3, "aliased tone should survive linear: {rms_linear}");
        assert!(rms_poly < 0.05, "polyphase should suppress the tone: {rms_poly}");
    }

    #[test]
    fn very_high_quality_attenuates_more_than_high_quality() {
        // 11.6 kHz sits in the transition band just above the 11025 Hz
        // target Nyquist, where kernel length actually differentiates the
        // two qualities. Deeper in the stopband both residuals bottom out
        // at the numeric noise floor and cannot be compared.
        let buffer = SignalBuffer::mono(sine(11_600.0, 44100, 0.25), 44100);
        let hq = resample(&buffer, 22050, ResampleAlgorithm::HighQuality)
            .unwrap()
            .buffer;
        let vhq = resample(&buffer, 22050, ResampleAlgorithm::VeryHighQuality)
            .unwrap()
            .buffer;

        let rms_hq = rms(&hq.samples[200..hq.frames() - 200]);
        let rms_vhq = rms(&vhq.samples[200..vhq.frames() - 200]);
        assert!(rms_hq < 0.1, "transition-band leak through HQ: {rms_hq}");
        assert!(
            rms_vhq < rms_hq * 0.1,
            "VHQ ({rms_vhq}) should attenuate well below HQ ({rms_hq})"
        );
    }

    #[test]
    fn exact_polyphase_ratio_reports_no_approximation() {
        let buffer = SignalBuffer::mono(sine(440.0, 44100, 0.1), 44100);
        let out = resample(&buffer, 22050, ResampleAlgorithm::PolyphaseFir).unwrap();
        assert!(out.approximation.is_none());
        assert_eq!(out.buffer.sample_rate, 22050);

        // 44100 -> 48000 reduces to 160/147, within the denominator bound.
        let out = resample(&buffer, 48000, ResampleAlgorithm::PolyphaseFir).unwrap();
        assert!(out.approximation.is_none());
        assert_eq!(out.buffer.sample_rate, 48000);
    }

    #[test]
    fn unrepresentable_ratio_surfaces_the_achieved_rate() {
        // 44101/44100 is irreducible with a denominator far above the bound.
        let buffer = SignalBuffer::mono(sine(440.0, 44100, 0.1), 44100);
        let out = resample(&buffer, 44101, ResampleAlgorithm::PolyphaseFir).unwrap();
        let note = out.approximation.expect("ratio cannot be exact");
        assert_eq!(note.requested_hz, 44101);
        assert!(note.down <= MAX_POLYPHASE_DENOMINATOR);
        assert!((note.achieved_hz - 44101.0).abs() < 5.0);
    }

    #[test]
    fn stereo_channels_stay_separated() {
        let left = sine(440.0, 44100, 0.2);
        let right = vec![0.0f32; left.len()];
        let buffer = SignalBuffer::from_planar(vec![left, right], 44100);

        let out = resample(&buffer, 48000, ResampleAlgorithm::HighQuality)
            .unwrap()
            .buffer;
        assert_eq!(out.channels, 2);
        let right_out = out.channel(1);
        assert!(right_out.iter().all(|s| s.abs() < 1e-3));
        assert!(rms(&out.channel(0)) > 0.5);
    }

    #[test]
    fn mismatched_channel_layout_is_rejected() {
        // One sample declared stereo cannot be split into equal channels.
        let buffer = SignalBuffer::new(vec![0.5], 44100, 2);
        for algorithm in ALL {
            assert!(matches!(
                resample(&buffer, 22050, algorithm),
                Err(ProcessError::Configuration(_))
            ));
        }
    }

    #[test]
    fn bounded_ratio_reduces_exactly_when_possible() {
        assert_eq!(bounded_ratio(22050, 44100, 1000), (1, 2));
        assert_eq!(bounded_ratio(48000, 44100, 1000), (160, 147));
    }
}
