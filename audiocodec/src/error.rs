use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors returned when building or parsing codec descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("preset {0:?} does not exist")]
    UnknownPreset(String),

    #[error("codec name {0:?} does not exist")]
    UnknownName(String),

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("invalid bit rate: {0} (expected 8, 16 or 32)")]
    InvalidBitRate(u32),
}

/// Errors returned by the WAV container.
#[derive(Debug, Error)]
pub enum WavError {
    #[error("wav file is not editable")]
    NotEditable,

    #[error("invalid WAV: missing RIFF/WAVE")]
    Invalid,

    #[error("invalid WAV: truncated chunk")]
    Truncated,

    #[error("unsupported WAV format: format tag={0}")]
    UnsupportedFormat(u16),

    #[error("unsupported WAV: only mono supported by Codec, got {0} channels")]
    StereoNotSupported(u16),

    #[error("invalid fmt chunk: size={size}")]
    InvalidFmtChunk { size: u32 },

    #[error("fmt chunk not found")]
    MissingFmtChunk,

    #[error("data chunk not found")]
    MissingDataChunk,

    #[error("invalid WAV codec: {0}")]
    Codec(#[from] CodecError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors reported by a conversion engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine construction failed: {0}")]
    Construction(String),

    #[error("engine process failed: {}", format_code(.code, .message))]
    Process { code: Option<i32>, message: String },

    #[error("engine reset failed: {0}")]
    Reset(String),

    #[error("engine released")]
    Released,
}

fn format_code(code: &Option<i32>, message: &str) -> String {
    match code {
        Some(code) => format!("error code: {code}; {message}"),
        None => message.to_string(),
    }
}

impl EngineError {
    /// Creates a process error without a numeric diagnostic code.
    pub fn process(message: impl Into<String>) -> Self {
        EngineError::Process {
            code: None,
            message: message.into(),
        }
    }
}

/// Errors returned by resamplers and the resampler pool.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("allowed only PCM codec, got {0}")]
    NotPcm(String),

    #[error("incoming and outgoing codecs are equal: {0}")]
    CodecsEqual(String),

    #[error("not supported bit rate: {0}")]
    UnsupportedBitDepth(u32),

    #[error("buffer duration {0:?} holds less than one sample")]
    BufferTooSmall(Duration),

    #[error("buffer duration {0:?} is too long")]
    BufferTooLarge(Duration),

    #[error("debug capture is disabled")]
    DebugDisabled,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Wav(#[from] WavError),
}
