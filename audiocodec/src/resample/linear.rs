//! Linear-interpolation engine.

use super::engine::Engine;
use crate::error::EngineError;

/// Streaming linear interpolator.
///
/// Each output sample interpolates between the previous and the current
/// input sample, so the output lags the input by one input sample and the
/// engine never holds anything back for `flush`.
#[derive(Debug, Clone)]
pub struct LinearEngine {
    /// Input samples advanced per output sample.
    step: f64,
    /// Fractional read head relative to the start of the next input block.
    index: f64,
    /// Last sample of the previous block.
    last: f32,
    capacity: usize,
    released: bool,
}

impl LinearEngine {
    pub fn new(in_rate: u32, out_rate: u32, capacity: usize) -> Self {
        Self {
            step: in_rate as f64 / out_rate as f64,
            index: 0.0,
            last: 0.0,
            capacity,
            released: false,
        }
    }
}

impl Engine for LinearEngine {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn input_capacity(&self) -> usize {
        self.capacity
    }

    fn process(
        &mut self,
        input: &[f32],
        _end_of_input: bool,
        output: &mut Vec<f32>,
    ) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        let n = input.len();
        if n == 0 {
            return Ok(());
        }

        while self.index < n as f64 {
            let idx = self.index as usize;
            let frac = self.index.fract() as f32;
            let s1 = if idx == 0 { self.last } else { input[idx - 1] };
            let s2 = input[idx];
            output.push(s1 + (s2 - s1) * frac);
            self.index += self.step;
        }

        self.index -= n as f64;
        self.last = input[n - 1];
        Ok(())
    }

    fn flush(&mut self, _output: &mut [f32]) -> Result<usize, EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        Ok(0)
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        self.index = 0.0;
        self.last = 0.0;
        Ok(())
    }

    fn release(&mut self) -> Result<(), EngineError> {
        self.released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut LinearEngine, input: &[f32]) -> Vec<f32> {
        let mut out = Vec::new();
        engine.process(input, false, &mut out).unwrap();
        out
    }

    #[test]
    fn test_upsample_doubles() {
        let mut engine = LinearEngine::new(8000, 16000, 160);
        let out = run(&mut engine, &[0.5; 160]);
        assert_eq!(out.len(), 320);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.25);
        assert!(out[2..].iter().all(|s| *s == 0.5));
    }

    #[test]
    fn test_downsample_halves() {
        let mut engine = LinearEngine::new(16000, 8000, 320);
        let input: Vec<f32> = (0..320).map(|i| i as f32 / 320.0).collect();
        let out = run(&mut engine, &input);
        assert_eq!(out.len(), 160);
        // Output k sits on input 2k - 1.
        assert_eq!(out[1], input[1]);
        assert_eq!(out[10], input[19]);
    }

    #[test]
    fn test_block_boundaries_are_seamless() {
        let input: Vec<f32> = (0..441).map(|i| ((i * 7) % 100) as f32 / 100.0).collect();

        // Step 1.25 keeps the read head exact in binary.
        let mut whole = LinearEngine::new(10000, 8000, 441);
        let expected = run(&mut whole, &input);

        let mut split = LinearEngine::new(10000, 8000, 441);
        let mut got = run(&mut split, &input[..100]);
        got.extend(run(&mut split, &input[100..317]));
        got.extend(run(&mut split, &input[317..]));

        assert_eq!(got, expected);
    }

    #[test]
    fn test_empty_input() {
        let mut engine = LinearEngine::new(8000, 16000, 160);
        assert!(run(&mut engine, &[]).is_empty());
        let mut buf = [0.0; 16];
        assert_eq!(engine.flush(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let input = [0.1, -0.4, 0.9, 0.3];
        let mut engine = LinearEngine::new(8000, 24000, 4);
        let first = run(&mut engine, &input);
        run(&mut engine, &[0.7; 5]);
        engine.reset().unwrap();
        assert_eq!(run(&mut engine, &input), first);
    }

    #[test]
    fn test_released() {
        let mut engine = LinearEngine::new(8000, 16000, 160);
        engine.release().unwrap();
        let mut out = Vec::new();
        assert_eq!(
            engine.process(&[0.0], false, &mut out),
            Err(EngineError::Released)
        );
        assert_eq!(engine.reset(), Err(EngineError::Released));
    }
}
