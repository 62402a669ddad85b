//! Scripted engine for resampler and pool tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::engine::Engine;
use crate::error::EngineError;

/// Shared view into one or more [`ScriptedEngine`]s.
#[derive(Debug, Clone, Default)]
pub(crate) struct Probe {
    /// Length of every `process` call, in samples.
    pub chunks: Arc<Mutex<Vec<usize>>>,
    /// End-of-input flag of every `process` call.
    pub eoi: Arc<Mutex<Vec<bool>>>,
    pub resets: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
    pub fail_reset: Arc<AtomicBool>,
    pub fail_process: Arc<AtomicBool>,
}

impl Probe {
    pub fn chunks(&self) -> Vec<usize> {
        self.chunks.lock().clone()
    }

    pub fn eoi(&self) -> Vec<bool> {
        self.eoi.lock().clone()
    }
}

/// Identity engine that holds back the last `delay` samples until flushed.
pub(crate) struct ScriptedEngine {
    capacity: usize,
    delay: usize,
    held: VecDeque<f32>,
    probe: Probe,
    released: bool,
}

impl ScriptedEngine {
    pub fn new(capacity: usize, delay: usize) -> (Self, Probe) {
        let probe = Probe::default();
        (Self::with_probe(capacity, delay, probe.clone()), probe)
    }

    pub fn with_probe(capacity: usize, delay: usize, probe: Probe) -> Self {
        Self {
            capacity,
            delay,
            held: VecDeque::new(),
            probe,
            released: false,
        }
    }
}

impl Engine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
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
        if self.released {
            return Err(EngineError::Released);
        }
        self.probe.chunks.lock().push(input.len());
        self.probe.eoi.lock().push(end_of_input);
        if self.probe.fail_process.load(Ordering::SeqCst) {
            return Err(EngineError::Process {
                code: Some(6),
                message: "injected failure".to_string(),
            });
        }

        self.held.extend(input.iter().copied());
        let keep = if end_of_input { 0 } else { self.delay };
        while self.held.len() > keep {
            if let Some(s) = self.held.pop_front() {
                output.push(s);
            }
        }
        Ok(())
    }

    fn flush(&mut self, output: &mut [f32]) -> Result<usize, EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        let n = output.len().min(self.held.len());
        for (dst, s) in output.iter_mut().zip(self.held.drain(..n)) {
            *dst = s;
        }
        Ok(n)
    }

    fn reset(&mut self) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        self.probe.resets.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_reset.load(Ordering::SeqCst) {
            return Err(EngineError::Reset("injected failure".to_string()));
        }
        self.held.clear();
        Ok(())
    }

    fn release(&mut self) -> Result<(), EngineError> {
        self.released = true;
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
