use std::io;

use tracing::{debug, trace};

use super::engine::{Engine, EngineKind};
use super::ResamplerParams;
use crate::codec::Codec;
use crate::error::ResampleError;
use crate::sample::SampleFormat;
use crate::wav::Wav;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Active,
}

struct DebugTap {
    incoming: Wav<'static>,
    outgoing: Wav<'static>,
}

impl DebugTap {
    fn record(wav: &mut Wav<'static>, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if let Err(e) = wav.write(bytes) {
            trace!(error = %e, "debug tap write skipped");
        }
    }
}

/// Converts byte frames between two linear PCM codecs.
///
/// A resampler is single-owner: it is driven through `&mut self` and moved
/// in and out of a [`Pool`](super::Pool), never shared.
pub struct Resampler {
    params: ResamplerParams,
    engine: Box<dyn Engine>,
    decoder: SampleFormat,
    encoder: SampleFormat,
    input: Vec<f32>,
    output: Vec<f32>,
    /// Flush buffer, one working buffer of outgoing samples.
    drain: Vec<f32>,
    out_bytes: Vec<u8>,
    state: State,
    debug: Option<DebugTap>,
}

impl Resampler {
    /// Creates a resampler using an engine of the given kind.
    pub fn new(params: ResamplerParams, kind: EngineKind) -> Result<Self, ResampleError> {
        params.validate()?;
        let engine = kind.build(&params)?;
        Self::with_engine(params, engine)
    }

    /// Creates a resampler around an already constructed engine.
    pub fn with_engine(
        params: ResamplerParams,
        engine: Box<dyn Engine>,
    ) -> Result<Self, ResampleError> {
        let (decoder, encoder) = params.validate()?;
        let drain_len = params
            .outgoing
            .sample_count_for_duration(params.buffer_duration);

        debug!(
            engine = engine.name(),
            incoming = %params.incoming,
            outgoing = %params.outgoing,
            buffer_ms = params.buffer_duration.as_millis() as u64,
            "resampler created"
        );

        Ok(Self {
            params,
            decoder,
            encoder,
            input: Vec::with_capacity(engine.input_capacity()),
            output: Vec::new(),
            drain: vec![0.0; drain_len],
            out_bytes: Vec::new(),
            state: State::Idle,
            debug: None,
            engine,
        })
    }

    pub fn params(&self) -> ResamplerParams {
        self.params
    }

    pub fn incoming_codec(&self) -> Codec {
        self.params.incoming
    }

    pub fn outgoing_codec(&self) -> Codec {
        self.params.outgoing
    }

    /// Name of the conversion engine.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// True once a frame has been fed since construction or the last reset.
    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Converts one frame of incoming bytes.
    ///
    /// The returned slice may be empty while the engine fills its delay
    /// line. Trailing bytes that do not form a whole sample are ignored.
    pub fn resample(&mut self, frame: &[u8]) -> Result<&[u8], ResampleError> {
        self.convert(frame, false)
    }

    /// Converts the final frame of a stream and appends everything the
    /// engine still holds.
    pub fn resample_last(&mut self, frame: &[u8]) -> Result<&[u8], ResampleError> {
        self.convert(frame, true)
    }

    fn convert(&mut self, frame: &[u8], last: bool) -> Result<&[u8], ResampleError> {
        self.out_bytes.clear();
        let size = self.decoder.size();
        let aligned = &frame[..frame.len() - frame.len() % size];
        if aligned.is_empty() && !last {
            return Ok(&self.out_bytes);
        }
        self.state = State::Active;

        let chunk_bytes = self.engine.input_capacity().max(1) * size;
        let mut chunks = aligned.chunks(chunk_bytes).peekable();
        if chunks.peek().is_none() {
            self.output.clear();
            self.engine.process(&[], true, &mut self.output)?;
            self.encoder.encode_into(&self.output, &mut self.out_bytes);
        }
        while let Some(chunk) = chunks.next() {
            let end_of_input = last && chunks.peek().is_none();
            self.input.clear();
            self.decoder.decode_into(chunk, &mut self.input);
            self.output.clear();
            self.engine
                .process(&self.input, end_of_input, &mut self.output)?;
            self.encoder.encode_into(&self.output, &mut self.out_bytes);
        }

        if let Some(tap) = &mut self.debug {
            DebugTap::record(&mut tap.incoming, aligned);
            DebugTap::record(&mut tap.outgoing, &self.out_bytes);
        }
        Ok(&self.out_bytes)
    }

    /// Drains the samples the engine still holds.
    ///
    /// Keeps asking the engine until one drain comes back short of a full
    /// working buffer.
    pub fn flush(&mut self) -> Result<&[u8], ResampleError> {
        self.out_bytes.clear();
        loop {
            let n = self.engine.flush(&mut self.drain)?;
            self.encoder
                .encode_into(&self.drain[..n], &mut self.out_bytes);
            if n < self.drain.len() {
                break;
            }
        }

        if let Some(tap) = &mut self.debug {
            DebugTap::record(&mut tap.outgoing, &self.out_bytes);
        }
        Ok(&self.out_bytes)
    }

    /// Returns the resampler to its freshly constructed state. The debug
    /// tap and its recording are dropped.
    pub fn reset(&mut self) -> Result<(), ResampleError> {
        self.engine.reset()?;
        self.input.clear();
        self.output.clear();
        self.out_bytes.clear();
        self.debug = None;
        self.state = State::Idle;
        Ok(())
    }

    /// Releases the engine.
    pub fn free(mut self) -> Result<(), ResampleError> {
        self.engine.release()?;
        Ok(())
    }

    /// Starts recording incoming and outgoing bytes. Keeps an existing
    /// recording.
    pub fn enable_debug(&mut self) {
        if self.debug.is_none() {
            self.debug = Some(DebugTap {
                incoming: Wav::new(self.params.incoming),
                outgoing: Wav::new(self.params.outgoing),
            });
        }
    }

    /// Stops recording and discards what was recorded.
    pub fn disable_debug(&mut self) {
        self.debug = None;
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.debug.is_some()
    }

    /// Exports the recorded incoming stream as WAV. Further recording into
    /// the exported container is dropped.
    pub fn save_incoming<W: io::Write + ?Sized>(
        &mut self,
        sink: &mut W,
    ) -> Result<usize, ResampleError> {
        let tap = self.debug.as_mut().ok_or(ResampleError::DebugDisabled)?;
        Ok(tap.incoming.export_to(sink)?)
    }

    /// Exports the recorded outgoing stream as WAV. Further recording into
    /// the exported container is dropped.
    pub fn save_outgoing<W: io::Write + ?Sized>(
        &mut self,
        sink: &mut W,
    ) -> Result<usize, ResampleError> {
        let tap = self.debug.as_mut().ok_or(ResampleError::DebugDisabled)?;
        Ok(tap.outgoing.export_to(sink)?)
    }
}

impl std::fmt::Debug for Resampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resampler")
            .field("params", &self.params)
            .field("engine", &self.engine.name())
            .field("state", &self.state)
            .field("debug", &self.debug.is_some())
            .finish()
    }
}
