//! Rubato-backed engines.
//!
//! Pure Rust sample rate conversion with the rubato crate. The synchronous
//! FFT resampler is the default engine; the asynchronous sinc resampler is
//! available with a selectable interpolation quality.

use std::collections::VecDeque;

use rubato::{
    FftFixedIn, Resampler as RubatoResampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

use super::engine::{Engine, SincQuality};
use crate::error::EngineError;

/// Engine wrapping a mono rubato resampler.
///
/// Rubato consumes fixed-size chunks, so input is buffered until a whole
/// chunk is available. The leading `output_delay()` frames are dropped so
/// the output lines up with the input, and at end of input the stream is
/// padded until `round(consumed * out_rate / in_rate)` samples have been
/// produced.
pub struct RubatoEngine<R> {
    name: &'static str,
    inner: R,
    in_rate: u32,
    out_rate: u32,
    capacity: usize,
    /// Input waiting for a full chunk.
    pending: Vec<f32>,
    out_buf: Vec<Vec<f32>>,
    /// Output frames still to drop.
    delay: usize,
    consumed: u64,
    emitted: u64,
    /// Output produced at end of input, drained by `flush`.
    tail: VecDeque<f32>,
    released: bool,
}

impl RubatoEngine<FftFixedIn<f32>> {
    /// Creates an FFT engine taking `capacity` input samples per chunk.
    pub fn fft(in_rate: u32, out_rate: u32, capacity: usize) -> Result<Self, EngineError> {
        let inner = FftFixedIn::<f32>::new(in_rate as usize, out_rate as usize, capacity, 1, 1)
            .map_err(|e| EngineError::Construction(e.to_string()))?;
        Ok(Self::from_inner("fft", inner, in_rate, out_rate, capacity))
    }
}

impl RubatoEngine<SincFixedIn<f32>> {
    /// Creates a sinc-interpolating engine taking `capacity` input samples
    /// per chunk.
    pub fn sinc(
        in_rate: u32,
        out_rate: u32,
        capacity: usize,
        quality: SincQuality,
    ) -> Result<Self, EngineError> {
        let ratio = out_rate as f64 / in_rate as f64;
        let inner = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(quality), capacity, 1)
            .map_err(|e| EngineError::Construction(e.to_string()))?;
        Ok(Self::from_inner("sinc", inner, in_rate, out_rate, capacity))
    }
}

fn sinc_parameters(quality: SincQuality) -> SincInterpolationParameters {
    match quality {
        SincQuality::Fast => SincInterpolationParameters {
            sinc_len: 64,
            f_cutoff: 0.91,
            oversampling_factor: 128,
            interpolation: SincInterpolationType::Linear,
            window: WindowFunction::Hann2,
        },
        SincQuality::Medium => SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.925,
            oversampling_factor: 256,
            interpolation: SincInterpolationType::Cubic,
            window: WindowFunction::BlackmanHarris2,
        },
        SincQuality::Best => SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            oversampling_factor: 256,
            interpolation: SincInterpolationType::Cubic,
            window: WindowFunction::BlackmanHarris2,
        },
    }
}

impl<R: RubatoResampler<f32>> RubatoEngine<R> {
    fn from_inner(name: &'static str, inner: R, in_rate: u32, out_rate: u32, capacity: usize) -> Self {
        let out_buf = inner.output_buffer_allocate(true);
        let delay = inner.output_delay();
        Self {
            name,
            inner,
            in_rate,
            out_rate,
            capacity,
            pending: Vec::with_capacity(capacity),
            out_buf,
            delay,
            consumed: 0,
            emitted: 0,
            tail: VecDeque::new(),
            released: false,
        }
    }

    fn check_released(&self) -> Result<(), EngineError> {
        if self.released {
            Err(EngineError::Released)
        } else {
            Ok(())
        }
    }

    /// Output samples owed for everything consumed so far.
    fn expected_output(&self) -> u64 {
        let in_rate = self.in_rate as u64;
        (self.consumed * self.out_rate as u64 + in_rate / 2) / in_rate
    }

    /// Pads the stream to its full length, moves the remaining output into
    /// `tail` and rewinds the inner resampler for the next stream.
    fn finish(&mut self) -> Result<(), EngineError> {
        if self.consumed == 0 {
            return Ok(());
        }
        let expected = self.expected_output();

        if !self.pending.is_empty() {
            let input: [&[f32]; 1] = [&self.pending[..]];
            let (_, written) = self
                .inner
                .process_partial_into_buffer(Some(&input[..]), &mut self.out_buf, None)
                .map_err(|e| EngineError::process(e.to_string()))?;
            take_output(
                &self.out_buf[0][..written],
                &mut self.delay,
                &mut self.emitted,
                &mut self.tail,
            );
            self.pending.clear();
        }

        while self.emitted < expected {
            let (_, written) = self
                .inner
                .process_partial_into_buffer(None::<&[Vec<f32>]>, &mut self.out_buf, None)
                .map_err(|e| EngineError::process(e.to_string()))?;
            if written == 0 {
                break;
            }
            take_output(
                &self.out_buf[0][..written],
                &mut self.delay,
                &mut self.emitted,
                &mut self.tail,
            );
        }

        if self.emitted > expected {
            let excess = ((self.emitted - expected) as usize).min(self.tail.len());
            self.tail.truncate(self.tail.len() - excess);
        }

        self.rewind();
        Ok(())
    }

    fn rewind(&mut self) {
        self.inner.reset();
        self.pending.clear();
        self.delay = self.inner.output_delay();
        self.consumed = 0;
        self.emitted = 0;
    }
}

/// Appends `frames` to `dst`, dropping the first `delay` of them.
fn take_output(frames: &[f32], delay: &mut usize, emitted: &mut u64, dst: &mut impl Extend<f32>) {
    let skip = (*delay).min(frames.len());
    *delay -= skip;
    let kept = &frames[skip..];
    *emitted += kept.len() as u64;
    dst.extend(kept.iter().copied());
}

impl<R: RubatoResampler<f32> + Send> Engine for RubatoEngine<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn input_capacity(&self) -> usize {
        self.capacity
    }

    fn process(
        &mut self,
        input: &[f32],
        end_of_input: bool,
        output: &mut Vec<f32>,
    ) -> Result<(), EngineError> {
        self.check_released()?;
        output.extend(self.tail.drain(..));

        self.pending.extend_from_slice(input);
        self.consumed += input.len() as u64;

        loop {
            let need = self.inner.input_frames_next();
            if self.pending.len() < need {
                break;
            }
            let chunk: [&[f32]; 1] = [&self.pending[..need]];
            let (used, written) = self
                .inner
                .process_into_buffer(&chunk[..], &mut self.out_buf, None)
                .map_err(|e| EngineError::process(e.to_string()))?;
            take_output(
                &self.out_buf[0][..written],
                &mut self.delay,
                &mut self.emitted,
                output,
            );
            self.pending.drain(..used);
        }

        if end_of_input {
            self.finish()?;
            output.extend(self.tail.drain(..));
        }
        Ok(())
    }

    fn flush(&mut self, output: &mut [f32]) -> Result<usize, EngineError> {
        self.check_released()?;
        if self.tail.is_empty() {
            self.finish()?;
        }
        let n = output.len().min(self.tail.len());
        for (dst, s) in output.iter_mut().zip(self.tail.drain(..n)) {
            *dst = s;
        }
        Ok(n)
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        self.check_released()?;
        self.rewind();
        self.tail.clear();
        Ok(())
    }

    fn release(&mut self) -> Result<(), EngineError> {
        self.released = true;
        self.pending = Vec::new();
        self.tail = VecDeque::new();
        Ok(())
    }
}
