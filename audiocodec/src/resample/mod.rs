//! Sample rate conversion between linear PCM codecs.
//!
//! A [`Resampler`] owns one conversion [`Engine`] and handles the byte
//! framing around it: decoding, chunking to the engine capacity, encoding
//! and the optional debug tap. A [`Pool`] keeps idle resamplers keyed by
//! [`ResamplerParams`] so warm engines are reused.
//!
//! # Example
//!
//! ```rust
//! use audiocodec::resample::{EngineKind, Pool, ResamplerParams};
//! use audiocodec::Preset;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), audiocodec::ResampleError> {
//! let pool = Pool::for_engine(EngineKind::Fft);
//! let params = ResamplerParams::new(
//!     Preset::Pcm8kHz16b.codec(),
//!     Preset::Pcm16kHz16b.codec(),
//!     Duration::from_millis(100),
//! );
//!
//! // 20 ms of silence, fed as the only frame of the stream.
//! let frame = vec![0u8; params.incoming.size_for_duration(Duration::from_millis(20))];
//! let mut lease = pool.checkout(params)?;
//! let out = lease.resample_last(&frame)?.to_vec();
//! assert_eq!(out.len(), params.outgoing.size_for_duration(Duration::from_millis(20)));
//!
//! drop(lease);
//! assert_eq!(pool.idle_count(&params), 1);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use crate::codec::Codec;
use crate::error::ResampleError;
use crate::sample::SampleFormat;

mod engine;
#[cfg(feature = "soxr")]
mod ffi;
mod linear;
mod pool;
mod resampler;
mod rubato;
#[cfg(feature = "soxr")]
mod soxr;
mod stream;
#[cfg(test)]
pub(crate) mod testing;

pub use engine::{Engine, EngineKind, SincQuality};
#[cfg(feature = "soxr")]
pub use engine::SoxrQuality;
pub use linear::LinearEngine;
pub use pool::{Lease, Pool, Reusable};
pub use resampler::Resampler;
pub use self::rubato::RubatoEngine;
#[cfg(feature = "soxr")]
pub use soxr::SoxrEngine;
pub use stream::spawn_stream;

/// Longest engine working buffer a resampler accepts.
pub const MAX_BUFFER_DURATION: Duration = Duration::from_secs(10);

/// Pooling key: the codec pair and the engine working-buffer duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResamplerParams {
    pub incoming: Codec,
    pub outgoing: Codec,
    pub buffer_duration: Duration,
}

impl ResamplerParams {
    pub fn new(incoming: Codec, outgoing: Codec, buffer_duration: Duration) -> Self {
        Self {
            incoming,
            outgoing,
            buffer_duration,
        }
    }

    /// Checks that a resampler can be built for these parameters and
    /// returns the incoming and outgoing sample layouts.
    pub fn validate(&self) -> Result<(SampleFormat, SampleFormat), ResampleError> {
        for codec in [&self.incoming, &self.outgoing] {
            if !codec.is_linear_pcm() {
                return Err(ResampleError::NotPcm(codec.preset()));
            }
        }
        if self.incoming.is_equal(&self.outgoing) {
            return Err(ResampleError::CodecsEqual(self.incoming.preset()));
        }

        let decoder = SampleFormat::from_bit_rate(self.incoming.bit_rate())
            .ok_or(ResampleError::UnsupportedBitDepth(self.incoming.bit_rate()))?;
        let encoder = SampleFormat::from_bit_rate(self.outgoing.bit_rate())
            .ok_or(ResampleError::UnsupportedBitDepth(self.outgoing.bit_rate()))?;

        if self.buffer_duration > MAX_BUFFER_DURATION {
            return Err(ResampleError::BufferTooLarge(self.buffer_duration));
        }
        if self.incoming.sample_count_for_duration(self.buffer_duration) == 0
            || self.outgoing.sample_count_for_duration(self.buffer_duration) == 0
        {
            return Err(ResampleError::BufferTooSmall(self.buffer_duration));
        }
        Ok((decoder, encoder))
    }
}
