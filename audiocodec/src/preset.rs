//! Built-in codec presets.
//!
//! A preset is the stable string vocabulary for codec identity used in
//! configuration and logs. Codec values are produced on demand from the
//! preset, so there is no process-wide codec state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, CodecName};
use crate::error::CodecError;

/// Closed set of built-in codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// `PCM_8000_16`
    Pcm8kHz16b,
    /// `PCM_16000_16`
    Pcm16kHz16b,
    /// `PCM_24000_16`
    Pcm24kHz16b,
    /// `PCM_44100_32`
    Pcm44kHz32b,
    /// `PCMA_8000_8`
    PcmA8kHz8b,
    /// `PCMU_8000_8`
    PcmU8kHz8b,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Pcm8kHz16b,
        Preset::Pcm16kHz16b,
        Preset::Pcm24kHz16b,
        Preset::Pcm44kHz32b,
        Preset::PcmA8kHz8b,
        Preset::PcmU8kHz8b,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Preset::Pcm8kHz16b => "PCM_8000_16",
            Preset::Pcm16kHz16b => "PCM_16000_16",
            Preset::Pcm24kHz16b => "PCM_24000_16",
            Preset::Pcm44kHz32b => "PCM_44100_32",
            Preset::PcmA8kHz8b => "PCMA_8000_8",
            Preset::PcmU8kHz8b => "PCMU_8000_8",
        }
    }

    /// Returns the codec this preset names.
    pub const fn codec(&self) -> Codec {
        match self {
            Preset::Pcm8kHz16b => Codec::from_parts(CodecName::Pcm, 8_000, 16),
            Preset::Pcm16kHz16b => Codec::from_parts(CodecName::Pcm, 16_000, 16),
            Preset::Pcm24kHz16b => Codec::from_parts(CodecName::Pcm, 24_000, 16),
            Preset::Pcm44kHz32b => Codec::from_parts(CodecName::Pcm, 44_100, 32),
            Preset::PcmA8kHz8b => Codec::from_parts(CodecName::PcmA, 8_000, 8),
            Preset::PcmU8kHz8b => Codec::from_parts(CodecName::PcmU, 8_000, 8),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = CodecError;

    /// Parses a preset key, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CodecError::UnknownPreset(s.to_string()))
    }
}

impl From<Preset> for Codec {
    fn from(preset: Preset) -> Self {
        preset.codec()
    }
}

impl TryFrom<Codec> for Preset {
    type Error = CodecError;

    fn try_from(codec: Codec) -> Result<Self, Self::Error> {
        codec
            .builtin_preset()
            .ok_or_else(|| CodecError::UnknownPreset(codec.preset()))
    }
}

impl Serialize for Preset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
