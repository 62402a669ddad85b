use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ResampleError;
use crate::preset::Preset;
use crate::resample::{EngineKind, Resampler, ResamplerParams};

/// Resampler settings as loaded from configuration.
///
/// ```json
/// {
///   "incoming": "PCM_44100_32",
///   "outgoing": "PCM_16000_16",
///   "buffer_duration_ms": 100,
///   "engine": { "kind": "sinc", "quality": "best" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampleConfig {
    pub incoming: Preset,
    pub outgoing: Preset,
    #[serde(default = "default_buffer_duration_ms")]
    pub buffer_duration_ms: u64,
    #[serde(default)]
    pub engine: EngineKind,
    /// Record incoming and outgoing streams for later export.
    #[serde(default)]
    pub debug: bool,
}

fn default_buffer_duration_ms() -> u64 {
    100
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            incoming: Preset::Pcm24kHz16b,
            outgoing: Preset::Pcm16kHz16b,
            buffer_duration_ms: default_buffer_duration_ms(),
            engine: EngineKind::default(),
            debug: false,
        }
    }
}

impl ResampleConfig {
    pub fn new(incoming: Preset, outgoing: Preset) -> Self {
        Self {
            incoming,
            outgoing,
            ..Self::default()
        }
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_buffer_duration(mut self, duration: Duration) -> Self {
        self.buffer_duration_ms = duration.as_millis() as u64;
        self
    }

    /// Pooling key for this configuration.
    pub fn params(&self) -> ResamplerParams {
        ResamplerParams::new(
            self.incoming.codec(),
            self.outgoing.codec(),
            Duration::from_millis(self.buffer_duration_ms),
        )
    }

    /// Builds a resampler, with the debug tap on if configured.
    pub fn build(&self) -> Result<Resampler, ResampleError> {
        let mut resampler = Resampler::new(self.params(), self.engine)?;
        if self.debug {
            resampler.enable_debug();
        }
        Ok(resampler)
    }
}

/// Pool limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Idle resamplers kept per key; unbounded when unset.
    #[serde(default)]
    pub max_idle_per_key: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resample::SincQuality;

    #[test]
    fn test_defaults() {
        let config: ResampleConfig =
            serde_json::from_str(r#"{"incoming":"PCM_8000_16","outgoing":"pcm_16000_16"}"#)
                .unwrap();
        assert_eq!(config, ResampleConfig::new(Preset::Pcm8kHz16b, Preset::Pcm16kHz16b));
        assert_eq!(config.buffer_duration_ms, 100);
        assert_eq!(config.engine, EngineKind::Fft);
        assert!(!config.debug);
    }

    #[test]
    fn test_full_config() {
        let config: ResampleConfig = serde_json::from_str(
            r#"{
                "incoming": "PCM_44100_32",
                "outgoing": "PCM_16000_16",
                "buffer_duration_ms": 20,
                "engine": {"kind": "sinc", "quality": "best"},
                "debug": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.engine, EngineKind::Sinc { quality: SincQuality::Best });

        let params = config.params();
        assert_eq!(params.incoming, Preset::Pcm44kHz32b.codec());
        assert_eq!(params.buffer_duration, Duration::from_millis(20));

        let resampler = config.build().unwrap();
        assert!(resampler.is_debug_enabled());
        assert_eq!(resampler.engine_name(), "sinc");
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let err = serde_json::from_str::<ResampleConfig>(
            r#"{"incoming":"PCM_48000_16","outgoing":"PCM_16000_16"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("PCM_48000_16"));
    }

    #[test]
    fn test_build_rejects_companded() {
        let config = ResampleConfig::new(Preset::PcmA8kHz8b, Preset::Pcm16kHz16b)
            .with_engine(EngineKind::Linear);
        assert!(matches!(config.build(), Err(ResampleError::NotPcm(_))));
    }

    #[test]
    fn test_build_rejects_huge_buffer() {
        let config: ResampleConfig = serde_json::from_str(&format!(
            r#"{{"incoming":"PCM_44100_32","outgoing":"PCM_16000_16","buffer_duration_ms":{},"engine":{{"kind":"linear"}}}}"#,
            u64::MAX
        ))
        .unwrap();
        assert!(matches!(
            config.build(),
            Err(ResampleError::BufferTooLarge(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = ResampleConfig::new(Preset::Pcm8kHz16b, Preset::Pcm24kHz16b)
            .with_buffer_duration(Duration::from_millis(40))
            .with_engine(EngineKind::Linear);
        assert_eq!(config.buffer_duration_ms, 40);
        assert_eq!(config.build().unwrap().engine_name(), "linear");
    }

    #[test]
    fn test_pool_options() {
        let opts: PoolOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.max_idle_per_key, None);
        let opts: PoolOptions = serde_json::from_str(r#"{"max_idle_per_key":4}"#).unwrap();
        assert_eq!(opts.max_idle_per_key, Some(4));
    }
}
