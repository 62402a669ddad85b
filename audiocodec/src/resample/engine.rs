//! Conversion engine contract and engine selection.

use serde::{Deserialize, Serialize};

use super::linear::LinearEngine;
use super::rubato::RubatoEngine;
use super::ResamplerParams;
use crate::error::EngineError;

/// Rate conversion backend driven by a [`Resampler`](super::Resampler).
///
/// Engines work on mono, normalized `f32` samples. They may hold input back
/// (algorithmic delay); that tail is drained with [`Engine::flush`] once the
/// stream has ended.
pub trait Engine: Send {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Largest number of input samples accepted by one `process` call.
    fn input_capacity(&self) -> usize;

    /// Converts `input` and appends the produced samples to `output`.
    ///
    /// With `end_of_input` set the engine also emits everything it still
    /// holds, as if `flush` had been called until empty.
    fn process(
        &mut self,
        input: &[f32],
        end_of_input: bool,
        output: &mut Vec<f32>,
    ) -> Result<(), EngineError>;

    /// Signals end of input and drains up to `output.len()` held samples,
    /// returning how many were written. Returns 0 once nothing is left.
    fn flush(&mut self, output: &mut [f32]) -> Result<usize, EngineError>;

    /// Drops all held input and output, keeping allocated state.
    fn reset(&mut self) -> Result<(), EngineError>;

    /// Releases backend resources. Later calls fail with
    /// [`EngineError::Released`].
    fn release(&mut self) -> Result<(), EngineError>;
}

/// Interpolation quality of the sinc engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SincQuality {
    Fast,
    #[default]
    Medium,
    Best,
}

/// SoX resampler quality recipe.
#[cfg(feature = "soxr")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoxrQuality {
    Quick,
    Low,
    Medium,
    #[default]
    High,
    VeryHigh,
}

/// Selects the conversion engine a resampler is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum EngineKind {
    /// Linear interpolation. Cheap, no look-ahead.
    Linear,
    /// Band-limited sinc interpolation (rubato).
    Sinc {
        #[serde(default)]
        quality: SincQuality,
    },
    /// FFT-based synchronous resampling (rubato).
    #[default]
    Fft,
    /// libsoxr.
    #[cfg(feature = "soxr")]
    Soxr {
        #[serde(default)]
        quality: SoxrQuality,
    },
}

impl EngineKind {
    /// Builds an engine for `params`.
    pub fn build(&self, params: &ResamplerParams) -> Result<Box<dyn Engine>, EngineError> {
        let in_rate = params.incoming.sample_rate();
        let out_rate = params.outgoing.sample_rate();
        let capacity = params
            .incoming
            .sample_count_for_duration(params.buffer_duration)
            .max(1);

        let engine: Box<dyn Engine> = match *self {
            EngineKind::Linear => Box::new(LinearEngine::new(in_rate, out_rate, capacity)),
            EngineKind::Sinc { quality } => {
                Box::new(RubatoEngine::sinc(in_rate, out_rate, capacity, quality)?)
            }
            EngineKind::Fft => Box::new(RubatoEngine::fft(in_rate, out_rate, capacity)?),
            #[cfg(feature = "soxr")]
            EngineKind::Soxr { quality } => Box::new(super::soxr::SoxrEngine::new(
                in_rate, out_rate, capacity, quality,
            )?),
        };
        Ok(engine)
    }
}
