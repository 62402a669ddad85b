//! CLI commands module.

mod info;
mod presets;
mod resample;

pub use info::InfoCommand;
pub use presets::PresetsCommand;
pub use resample::ResampleCommand;

use serde::Serialize;

use crate::Cli;

/// Prints `value` as pretty JSON when `--json` is set, otherwise runs `text`.
pub(crate) fn output<T: Serialize>(cli: &Cli, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}
