use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::resampler::Resampler;
use crate::error::ResampleError;

/// Runs `resampler` over a channel of frames on the blocking thread pool.
///
/// Empty frames are skipped and only non-empty output is forwarded, in
/// order. When `input` closes the resampler is flushed once and the output
/// channel closed. Any error ends the task and closes the output; the
/// error is returned from the join handle. On success the join handle
/// yields the resampler back so it can be reset and pooled.
pub fn spawn_stream(
    mut resampler: Resampler,
    mut input: mpsc::Receiver<Vec<u8>>,
    capacity: usize,
) -> (
    mpsc::Receiver<Vec<u8>>,
    JoinHandle<Result<Resampler, ResampleError>>,
) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        while let Some(frame) = input.blocking_recv() {
            if frame.is_empty() {
                continue;
            }
            let out = resampler.resample(&frame)?;
            if !out.is_empty() && tx.blocking_send(out.to_vec()).is_err() {
                debug!("stream output dropped, stopping");
                return Ok(resampler);
            }
        }

        let tail = resampler.flush()?;
        if !tail.is_empty() && tx.blocking_send(tail.to_vec()).is_err() {
            debug!("stream output dropped before flush");
        }
        Ok(resampler)
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::error::EngineError;
    use crate::preset::Preset;
    use crate::resample::ResamplerParams;
    use crate::resample::testing::{Probe, ScriptedEngine};

    fn scripted(delay: usize) -> (Resampler, Probe) {
        let params = ResamplerParams::new(
            Preset::Pcm8kHz16b.codec(),
            Preset::Pcm16kHz16b.codec(),
            Duration::from_millis(20),
        );
        let (engine, probe) = ScriptedEngine::new(160, delay);
        (Resampler::with_engine(params, Box::new(engine)).unwrap(), probe)
    }

    #[tokio::test]
    async fn test_stream_forwards_and_flushes() {
        let (resampler, probe) = scripted(6);
        let (tx, rx) = mpsc::channel(4);
        let (mut out, handle) = spawn_stream(resampler, rx, 4);

        tx.send(vec![1, 0, 2, 0]).await.unwrap();
        tx.send(Vec::new()).await.unwrap();
        tx.send(vec![3, 0, 4, 0, 5, 0, 6, 0, 7, 0]).await.unwrap();
        drop(tx);

        let mut chunks = Vec::new();
        while let Some(chunk) = out.recv().await {
            chunks.push(chunk);
        }

        // 7 samples in, 6 held: one sample from the frames, six from flush.
        assert_eq!(chunks, vec![vec![1, 0], vec![2, 0, 3, 0, 4, 0, 5, 0, 6, 0, 7, 0]]);
        // The empty frame never reached the engine.
        assert_eq!(probe.chunks(), vec![2, 5]);

        let resampler = handle.await.unwrap().unwrap();
        assert!(resampler.is_active());
    }

    #[tokio::test]
    async fn test_stream_error_closes_output() {
        let (resampler, probe) = scripted(0);
        probe.fail_process.store(true, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(1);
        let (mut out, handle) = spawn_stream(resampler, rx, 1);
        tx.send(vec![1, 0]).await.unwrap();

        assert!(out.recv().await.is_none());
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            ResampleError::Engine(EngineError::Process { .. })
        ));
    }

    #[tokio::test]
    async fn test_stream_empty_input() {
        let (resampler, _) = scripted(0);
        let (tx, rx) = mpsc::channel(1);
        let (mut out, handle) = spawn_stream(resampler, rx, 1);
        drop(tx);

        assert!(out.recv().await.is_none());
        let resampler = handle.await.unwrap().unwrap();
        assert!(!resampler.is_active());
    }
}
