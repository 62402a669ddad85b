use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use audiocodec::resample::{SincQuality, spawn_stream};
use audiocodec::{EngineKind, Pool, Preset, ResamplerParams, Wav};
use clap::{Args, ValueEnum};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::Cli;

#[derive(Clone, Copy, ValueEnum)]
enum EngineArg {
    Linear,
    Sinc,
    Fft,
    #[cfg(feature = "soxr")]
    Soxr,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Linear => EngineKind::Linear,
            EngineArg::Sinc => EngineKind::Sinc {
                quality: SincQuality::default(),
            },
            EngineArg::Fft => EngineKind::Fft,
            #[cfg(feature = "soxr")]
            EngineArg::Soxr => EngineKind::Soxr {
                quality: Default::default(),
            },
        }
    }
}

#[derive(Args)]
pub struct ResampleCommand {
    /// Input WAV file (linear PCM, mono)
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Target preset, e.g. PCM_16000_16
    #[arg(long)]
    to: Preset,

    /// Conversion engine
    #[arg(long, value_enum, default_value = "fft")]
    engine: EngineArg,

    /// Engine working buffer in milliseconds
    #[arg(long, default_value_t = 100)]
    buffer_ms: u64,

    /// Size of the frames fed to the resampler, in milliseconds
    #[arg(long, default_value_t = 20)]
    frame_ms: u64,

    /// Save the raw incoming and outgoing streams to this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

impl ResampleCommand {
    pub async fn run(&self, _cli: &Cli) -> anyhow::Result<()> {
        let bytes = std::fs::read(&self.input)
            .with_context(|| format!("read {}", self.input.display()))?;
        let source = Wav::from_bytes(&bytes)
            .with_context(|| format!("parse {}", self.input.display()))?;
        if self.frame_ms == 0 {
            bail!("--frame-ms must be positive");
        }

        let params = ResamplerParams::new(
            source.codec(),
            self.to.codec(),
            Duration::from_millis(self.buffer_ms),
        );
        let pool = Pool::for_engine(self.engine.into());
        let mut resampler = pool.get(params).context("create resampler")?;
        if self.debug_dir.is_some() {
            resampler.enable_debug();
        }
        info!(
            from = %params.incoming,
            to = %params.outgoing,
            engine = resampler.engine_name(),
            "resampling"
        );

        let frame_size = params
            .incoming
            .size_for_duration(Duration::from_millis(self.frame_ms))
            .max(params.incoming.sample_size());
        let frames: Vec<Vec<u8>> = source
            .data()
            .chunks(frame_size)
            .map(<[u8]>::to_vec)
            .collect();
        debug!(frames = frames.len(), frame_size, "feeding frames");

        let (tx, rx) = mpsc::channel(4);
        let (mut out_rx, handle) = spawn_stream(resampler, rx, 4);
        let feeder = tokio::spawn(async move {
            for frame in frames {
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        let mut target = Wav::new(params.outgoing);
        while let Some(chunk) = out_rx.recv().await {
            target.write(&chunk)?;
        }
        feeder.await?;
        let mut resampler = handle.await?.context("resample")?;

        std::fs::write(&self.output, target.to_vec())
            .with_context(|| format!("write {}", self.output.display()))?;
        info!(
            output = %self.output.display(),
            bytes = target.data_size(),
            duration_ms = target.duration().as_millis() as u64,
            "done"
        );

        if let Some(dir) = &self.debug_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create {}", dir.display()))?;
            save(dir, "incoming.wav", |f| resampler.save_incoming(f))?;
            save(dir, "outgoing.wav", |f| resampler.save_outgoing(f))?;
        }

        pool.put(resampler).context("return resampler to pool")?;
        Ok(())
    }
}

fn save<F>(dir: &Path, name: &str, export: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut std::fs::File) -> Result<usize, audiocodec::ResampleError>,
{
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path)
        .with_context(|| format!("create {}", path.display()))?;
    let n = export(&mut file).with_context(|| format!("save {}", path.display()))?;
    debug!(path = %path.display(), bytes = n, "debug stream saved");
    Ok(())
}
