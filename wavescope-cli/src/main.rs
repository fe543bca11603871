use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use wavescope::wav::{self, ExportFormat};
use wavescope::{Pipeline, PipelineConfig, ResampleAlgorithm, SignalBuffer};

/// Load a WAV file, apply gain/clipping and sample-rate conversion, and
/// emit the processed audio plus render-ready waveform/spectrogram series.
#[derive(Parser)]
#[command(name = "wavescope", version)]
struct Args {
    /// Input WAV file (PCM or float)
    input: PathBuf,

    /// Linear gain applied before clipping
    #[arg(long, default_value_t = 1.0)]
    gain: f32,

    /// Hard clip magnitude
    #[arg(long = "clip", default_value_t = 1.0)]
    clip_threshold: f32,

    /// Target sample rate in Hz (defaults to the source rate)
    #[arg(long)]
    target_rate: Option<u32>,

    /// Resampling algorithm
    #[arg(long, value_enum, default_value = "high-quality")]
    algorithm: AlgorithmArg,

    /// STFT window size override (power of two)
    #[arg(long)]
    fft_size: Option<usize>,

    /// STFT hop override in samples
    #[arg(long)]
    hop_size: Option<usize>,

    /// Waveform display point budget
    #[arg(long, default_value_t = 2000)]
    waveform_points: usize,

    /// Spectrogram frequency-bin budget
    #[arg(long, default_value_t = 1024)]
    freq_bins: usize,

    /// Spectrogram time-frame budget
    #[arg(long, default_value_t = 2000)]
    time_frames: usize,

    /// Write the processed audio to this WAV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export as 16-bit PCM instead of 32-bit float
    #[arg(long)]
    pcm16: bool,

    /// Dump the waveform display series as JSON
    #[arg(long)]
    waveform_json: Option<PathBuf>,

    /// Dump the spectrogram display series as JSON
    #[arg(long)]
    spectrogram_json: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlgorithmArg {
    HighQuality,
    VeryHighQuality,
    PolyphaseFir,
    Linear,
}

impl From<AlgorithmArg> for ResampleAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::HighQuality => ResampleAlgorithm::HighQuality,
            AlgorithmArg::VeryHighQuality => ResampleAlgorithm::VeryHighQuality,
            AlgorithmArg::PolyphaseFir => ResampleAlgorithm::PolyphaseFir,
            AlgorithmArg::Linear => ResampleAlgorithm::Linear,
        }
    }
}

fn describe(label: &str, buffer: &SignalBuffer) {
    println!(
        "{label}: {:.2} s, {} Hz, {} channel(s), {} frames",
        buffer.duration_secs(),
        buffer.sample_rate,
        buffer.channels,
        buffer.frames()
    );
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let input = wav::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    describe("input", &input);

    let config = PipelineConfig {
        gain: args.gain,
        clip_threshold: args.clip_threshold,
        target_sample_rate: args.target_rate,
        algorithm: args.algorithm.into(),
        fft_size: args.fft_size,
        hop_size: args.hop_size,
        waveform_points: args.waveform_points,
        spectrogram_freq_bins: args.freq_bins,
        spectrogram_time_frames: args.time_frames,
    };

    let output = Pipeline::new(config).run(&input)?;
    describe("output", &output.processed);

    if let Some(note) = &output.resample_note {
        log::warn!(
            "requested {} Hz is not representable with denominator <= {}; achieved {:.2} Hz ({}:{})",
            note.requested_hz,
            wavescope::dsp::resample::MAX_POLYPHASE_DENOMINATOR,
            note.achieved_hz,
            note.up,
            note.down
        );
    }

    if let Some(path) = &args.output {
        let format = if args.pcm16 {
            ExportFormat::Pcm16
        } else {
            ExportFormat::Float32
        };
        wav::export(path, &output.processed, format)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    if let Some(path) = &args.waveform_json {
        write_json(path, &output.waveform)?;
        println!("wrote {}", path.display());
    }

    if let Some(path) = &args.spectrogram_json {
        write_json(path, &output.spectrogram)?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
