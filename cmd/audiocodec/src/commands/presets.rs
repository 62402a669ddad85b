use audiocodec::Preset;
use clap::Args;
use serde::Serialize;

use super::output;
use crate::Cli;

#[derive(Args)]
pub struct PresetsCommand {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetRow {
    preset: Preset,
    name: String,
    sample_rate: u32,
    bit_rate: u32,
}

impl PresetsCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let rows: Vec<PresetRow> = Preset::ALL
            .into_iter()
            .map(|preset| {
                let codec = preset.codec();
                PresetRow {
                    preset,
                    name: codec.name().to_string(),
                    sample_rate: codec.sample_rate(),
                    bit_rate: codec.bit_rate(),
                }
            })
            .collect();

        output(cli, &rows, || {
            println!("{:<14} {:<6} {:>8} {:>5}", "PRESET", "NAME", "RATE", "BITS");
            for row in &rows {
                println!(
                    "{:<14} {:<6} {:>8} {:>5}",
                    row.preset, row.name, row.sample_rate, row.bit_rate
                );
            }
        })
    }
}
