//! Codec descriptions: format tag, sample rate and bit depth.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::preset::Preset;

/// Format tag of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecName {
    /// Linear PCM.
    #[serde(rename = "PCM")]
    Pcm,
    /// G.711 A-law.
    #[serde(rename = "PCMA")]
    PcmA,
    /// G.711 u-law.
    #[serde(rename = "PCMU")]
    PcmU,
}

impl CodecName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CodecName::Pcm => "PCM",
            CodecName::PcmA => "PCMA",
            CodecName::PcmU => "PCMU",
        }
    }

    /// Returns true for raw linear PCM.
    pub const fn is_pcm(&self) -> bool {
        matches!(self, CodecName::Pcm)
    }

    /// WAVE `fmt ` compression code.
    pub const fn format_tag(&self) -> u16 {
        match self {
            CodecName::Pcm => 1,
            CodecName::PcmA => 6,
            CodecName::PcmU => 7,
        }
    }

    /// Maps a WAVE compression code back to a name.
    pub const fn from_format_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(CodecName::Pcm),
            6 => Some(CodecName::PcmA),
            7 => Some(CodecName::PcmU),
            _ => None,
        }
    }
}

impl fmt::Display for CodecName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecName {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PCM" => Ok(CodecName::Pcm),
            "PCMA" => Ok(CodecName::PcmA),
            "PCMU" => Ok(CodecName::PcmU),
            _ => Err(CodecError::UnknownName(s.to_string())),
        }
    }
}

/// Immutable description of a mono audio stream.
///
/// `bit_rate` is the sample width in bits (8, 16 or 32), so the sample size
/// in bytes is always a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCodec")]
pub struct Codec {
    name: CodecName,
    sample_rate: u32,
    bit_rate: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCodec {
    name: CodecName,
    sample_rate: u32,
    bit_rate: u32,
}

impl TryFrom<RawCodec> for Codec {
    type Error = CodecError;

    fn try_from(raw: RawCodec) -> Result<Self, Self::Error> {
        Codec::new(raw.name, raw.sample_rate, raw.bit_rate)
    }
}

impl Codec {
    /// Creates a codec, validating the sample rate and bit depth.
    pub fn new(name: CodecName, sample_rate: u32, bit_rate: u32) -> Result<Self, CodecError> {
        if sample_rate == 0 {
            return Err(CodecError::InvalidSampleRate(sample_rate));
        }
        if !matches!(bit_rate, 8 | 16 | 32) {
            return Err(CodecError::InvalidBitRate(bit_rate));
        }
        Ok(Self::from_parts(name, sample_rate, bit_rate))
    }

    /// Creates a linear PCM codec.
    pub fn pcm(sample_rate: u32, bit_rate: u32) -> Result<Self, CodecError> {
        Self::new(CodecName::Pcm, sample_rate, bit_rate)
    }

    pub(crate) const fn from_parts(name: CodecName, sample_rate: u32, bit_rate: u32) -> Self {
        Self {
            name,
            sample_rate,
            bit_rate,
        }
    }

    pub const fn name(&self) -> CodecName {
        self.name
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample width in bits.
    pub const fn bit_rate(&self) -> u32 {
        self.bit_rate
    }

    /// Bytes per sample.
    pub const fn sample_size(&self) -> usize {
        (self.bit_rate / 8) as usize
    }

    /// Number of bytes needed to hold `duration` of audio.
    pub fn size_for_duration(&self, duration: Duration) -> usize {
        self.size_for_sample_count(self.sample_count_for_duration(duration))
    }

    /// Number of bytes needed to hold `count` samples. Saturates at
    /// `usize::MAX`.
    pub fn size_for_sample_count(&self, count: usize) -> usize {
        count.saturating_mul(self.sample_size())
    }

    /// Number of samples in `duration`, at millisecond precision. Saturates
    /// at `usize::MAX`.
    pub fn sample_count_for_duration(&self, duration: Duration) -> usize {
        let count = self.sample_rate as u128 * duration.as_millis() / 1000;
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Number of whole samples in `size` bytes. Trailing partial bytes are dropped.
    pub fn sample_count_for_size(&self, size: usize) -> usize {
        size / self.sample_size()
    }

    /// Duration of `size` bytes, truncated to whole milliseconds.
    ///
    /// Computed as `samples / (rate / 1000)` with two integer divisions, so
    /// rates that are not multiples of 1000 lose precision. Rates below
    /// 1000 Hz yield zero.
    pub fn duration_for_size(&self, size: usize) -> Duration {
        let samples_per_ms = (self.sample_rate / 1000) as usize;
        if samples_per_ms == 0 {
            return Duration::ZERO;
        }
        let millis = self.sample_count_for_size(size) / samples_per_ms;
        Duration::from_millis(millis as u64)
    }

    /// Exact equality over name, rate and bit depth.
    pub fn is_equal(&self, other: &Codec) -> bool {
        self == other
    }

    /// Returns true for raw linear PCM.
    pub const fn is_linear_pcm(&self) -> bool {
        self.name.is_pcm()
    }

    /// Canonical `"{NAME}_{RATE}_{BITS}"` key.
    pub fn preset(&self) -> String {
        format!("{}_{}_{}", self.name, self.sample_rate, self.bit_rate)
    }

    /// The built-in preset matching this codec, if there is one.
    pub fn builtin_preset(&self) -> Option<Preset> {
        Preset::ALL.into_iter().find(|p| p.codec() == *self)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.name, self.sample_rate, self.bit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_size() {
        assert_eq!(Codec::pcm(8000, 16).unwrap().sample_size(), 2);
        assert_eq!(Codec::pcm(44100, 32).unwrap().sample_size(), 4);
        assert_eq!(
            Codec::new(CodecName::PcmA, 8000, 8).unwrap().sample_size(),
            1
        );
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert_eq!(
            Codec::pcm(0, 16).unwrap_err(),
            CodecError::InvalidSampleRate(0)
        );
        assert_eq!(
            Codec::pcm(8000, 24).unwrap_err(),
            CodecError::InvalidBitRate(24)
        );
    }

    #[test]
    fn test_size_for_duration() {
        let codec = Codec::pcm(8000, 16).unwrap();
        assert_eq!(codec.size_for_duration(Duration::from_secs(1)), 16000);
        assert_eq!(codec.size_for_duration(Duration::from_millis(20)), 320);
        // Sub-millisecond precision is dropped.
        assert_eq!(codec.size_for_duration(Duration::from_micros(1999)), 16);
    }

    #[test]
    fn test_sample_count_for_duration_44k() {
        let codec = Codec::pcm(44100, 32).unwrap();
        assert_eq!(codec.sample_count_for_duration(Duration::from_millis(10)), 441);
        assert_eq!(codec.sample_count_for_duration(Duration::from_millis(1)), 44);
    }

    #[test]
    fn test_sample_count_for_huge_duration_saturates() {
        let codec = Codec::pcm(44100, 32).unwrap();
        let huge = Duration::from_millis(u64::MAX);
        assert_eq!(codec.sample_count_for_duration(huge), usize::MAX);
        assert_eq!(codec.sample_count_for_duration(Duration::MAX), usize::MAX);
        assert_eq!(codec.size_for_duration(huge), usize::MAX);

        let hour = Duration::from_secs(3600);
        assert_eq!(codec.sample_count_for_duration(hour), 44100 * 3600);
        assert!(codec.sample_count_for_duration(hour) <= codec.sample_count_for_duration(huge));
    }

    #[test]
    fn test_sample_count_for_size_drops_partial() {
        let codec = Codec::pcm(16000, 16).unwrap();
        assert_eq!(codec.sample_count_for_size(4), 2);
        assert_eq!(codec.sample_count_for_size(5), 2);
        assert_eq!(codec.size_for_sample_count(3), 6);
    }

    #[test]
    fn test_duration_for_size_double_truncation() {
        let codec = Codec::pcm(8000, 16).unwrap();
        assert_eq!(codec.duration_for_size(16000), Duration::from_secs(1));
        // 15 samples / 8 samples-per-ms = 1ms
        assert_eq!(codec.duration_for_size(30), Duration::from_millis(1));

        // 44100 / 1000 = 44, so 441 samples are 10ms but 440 samples are too.
        let codec = Codec::pcm(44100, 32).unwrap();
        assert_eq!(codec.duration_for_size(441 * 4), Duration::from_millis(10));
        assert_eq!(codec.duration_for_size(440 * 4), Duration::from_millis(10));
        assert_eq!(codec.duration_for_size(44100 * 4), Duration::from_millis(1002));
    }

    #[test]
    fn test_duration_for_size_low_rate() {
        let codec = Codec::pcm(500, 16).unwrap();
        assert_eq!(codec.duration_for_size(1000), Duration::ZERO);
    }

    #[test]
    fn test_sizes_monotonic_in_duration() {
        let codec = Codec::pcm(44100, 32).unwrap();
        let mut last_count = 0;
        let mut last_size = 0;
        for ms in 0..2000u64 {
            let d = Duration::from_millis(ms);
            let count = codec.sample_count_for_duration(d);
            let size = codec.size_for_duration(d);
            assert!(count >= last_count);
            assert!(size >= last_size);
            last_count = count;
            last_size = size;
        }
    }

    #[test]
    fn test_equality() {
        let a = Codec::pcm(8000, 16).unwrap();
        let b = Codec::pcm(8000, 16).unwrap();
        let c = Codec::pcm(8000, 32).unwrap();
        let d = Codec::new(CodecName::PcmA, 8000, 16).unwrap();
        assert!(a.is_equal(&b));
        assert!(!a.is_equal(&c));
        assert!(!a.is_equal(&d));
    }

    #[test]
    fn test_preset_key() {
        assert_eq!(Codec::pcm(8000, 16).unwrap().preset(), "PCM_8000_16");
        assert_eq!(
            Codec::new(CodecName::PcmU, 8000, 8).unwrap().preset(),
            "PCMU_8000_8"
        );
        assert_eq!(
            Codec::pcm(16000, 16).unwrap().builtin_preset(),
            Some(Preset::Pcm16kHz16b)
        );
        assert_eq!(Codec::pcm(48000, 16).unwrap().builtin_preset(), None);
    }

    #[test]
    fn test_is_linear_pcm() {
        assert!(Codec::pcm(8000, 16).unwrap().is_linear_pcm());
        assert!(!Codec::new(CodecName::PcmA, 8000, 8).unwrap().is_linear_pcm());
        assert!(!Codec::new(CodecName::PcmU, 8000, 8).unwrap().is_linear_pcm());
    }

    #[test]
    fn test_name_parse_case_insensitive() {
        assert_eq!("pcma".parse::<CodecName>().unwrap(), CodecName::PcmA);
        assert_eq!("PcmU".parse::<CodecName>().unwrap(), CodecName::PcmU);
        assert!(matches!(
            "opus".parse::<CodecName>(),
            Err(CodecError::UnknownName(_))
        ));
    }

    #[test]
    fn test_format_tags() {
        for name in [CodecName::Pcm, CodecName::PcmA, CodecName::PcmU] {
            assert_eq!(CodecName::from_format_tag(name.format_tag()), Some(name));
        }
        assert_eq!(CodecName::from_format_tag(3), None);
    }

    #[test]
    fn test_serde_codec() {
        let codec = Codec::pcm(8000, 16).unwrap();
        let json = serde_json::to_string(&codec).unwrap();
        assert_eq!(json, r#"{"name":"PCM","sampleRate":8000,"bitRate":16}"#);

        let parsed: Codec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, codec);

        let bad = serde_json::from_str::<Codec>(r#"{"name":"PCM","sampleRate":8000,"bitRate":12}"#);
        assert!(bad.is_err());
    }
}
