//! Telephony-grade audio codec model, WAV container and pooled resampling.
//!
//! - [`codec`]: codec identity (PCM, A-law, u-law) and size/duration math
//! - [`preset`]: the six built-in codecs and their string keys
//! - [`sample`]: little-endian integer samples to normalized `f32` and back
//! - [`wav`]: RIFF/WAVE build and parse
//! - [`resample`]: resamplers over pluggable engines, a keyed pool and a
//!   channel-driven stream wrapper
//!
//! # Example
//!
//! ```rust
//! use audiocodec::resample::{EngineKind, Pool, ResamplerParams};
//! use audiocodec::{Preset, Wav};
//! use std::time::Duration;
//!
//! let params = ResamplerParams::new(
//!     Preset::Pcm8kHz16b.codec(),
//!     Preset::Pcm16kHz16b.codec(),
//!     Duration::from_millis(20),
//! );
//! let pool = Pool::for_engine(EngineKind::Linear);
//!
//! let frame = vec![0u8; params.incoming.size_for_duration(Duration::from_millis(20))];
//! let mut lease = pool.checkout(params).unwrap();
//! let mut out = lease.resample(&frame).unwrap().to_vec();
//! out.extend_from_slice(lease.flush().unwrap());
//!
//! let mut wav = Wav::new(params.outgoing);
//! wav.write(&out).unwrap();
//! let bytes = wav.to_vec();
//! assert_eq!(Wav::from_bytes(&bytes).unwrap().data_size(), out.len());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod preset;
pub mod resample;
pub mod sample;
pub mod wav;

pub use codec::{Codec, CodecName};
pub use config::{PoolOptions, ResampleConfig};
pub use error::{CodecError, EngineError, ResampleError, WavError};
pub use preset::Preset;
pub use resample::{EngineKind, Pool, Resampler, ResamplerParams};
pub use wav::Wav;
