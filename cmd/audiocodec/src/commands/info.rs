use std::path::PathBuf;

use anyhow::Context;
use audiocodec::{Codec, Wav};
use clap::Args;
use serde::Serialize;

use super::output;
use crate::Cli;

#[derive(Args)]
pub struct InfoCommand {
    /// WAV file to inspect
    file: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WavInfo {
    codec: Codec,
    preset: String,
    builtin: bool,
    data_size: usize,
    sample_count: usize,
    duration_ms: u64,
}

impl InfoCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let bytes = std::fs::read(&self.file)
            .with_context(|| format!("read {}", self.file.display()))?;
        let wav = Wav::from_bytes(&bytes)
            .with_context(|| format!("parse {}", self.file.display()))?;

        let codec = wav.codec();
        let info = WavInfo {
            codec,
            preset: codec.preset(),
            builtin: codec.builtin_preset().is_some(),
            data_size: wav.data_size(),
            sample_count: codec.sample_count_for_size(wav.data_size()),
            duration_ms: wav.duration().as_millis() as u64,
        };

        output(cli, &info, || {
            println!("File:      {}", self.file.display());
            println!("Codec:     {} ({} Hz, {} bit)", codec.name(), codec.sample_rate(), codec.bit_rate());
            println!(
                "Preset:    {}{}",
                info.preset,
                if info.builtin { "" } else { " (not built-in)" }
            );
            println!("Data size: {} bytes", info.data_size);
            println!("Samples:   {}", info.sample_count);
            println!("Duration:  {} ms", info.duration_ms);
        })
    }
}
