use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::debug;

use super::{CancellationToken, ChannelProgress, LdCalculator, LdConfig, LdError, LdMatrices};
use crate::variant::VariantRecord;

/// LD computation running on its own thread.
///
/// The caller polls [`LdTask::latest_progress`], may [`LdTask::cancel`] at
/// any time, and collects the result with [`LdTask::join`].
#[derive(Debug)]
pub struct LdTask {
    handle: JoinHandle<Result<LdMatrices, LdError>>,
    progress: Receiver<f64>,
    latest: f64,
    token: CancellationToken,
}

impl LdTask {
    /// Start computing LD over `records` in the background.
    pub fn spawn<R>(records: Vec<R>, config: LdConfig) -> Self
    where
        R: VariantRecord + Send + 'static,
    {
        Self::spawn_with_token(records, config, CancellationToken::new())
    }

    /// Like [`LdTask::spawn`], but observing a caller-owned token. A token
    /// cancelled before the call makes the worker stop before its first locus.
    pub fn spawn_with_token<R>(records: Vec<R>, config: LdConfig, token: CancellationToken) -> Self
    where
        R: VariantRecord + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker_token = token.clone();
        let handle = thread::spawn(move || {
            let sink = ChannelProgress(tx);
            LdCalculator::new(config).calculate(&records, &sink, &worker_token)
        });
        debug!("spawned linkage disequilibrium worker");
        Self {
            handle,
            progress: rx,
            latest: 0.0,
            token,
        }
    }

    /// Ask the worker to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token shared with the worker.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Most recent progress fraction, draining any queued updates.
    pub fn latest_progress(&mut self) -> f64 {
        while let Ok(fraction) = self.progress.try_recv() {
            self.latest = fraction;
        }
        self.latest
    }

    /// Whether the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return its result.
    pub fn join(self) -> Result<LdMatrices, LdError> {
        self.handle.join().map_err(|_| LdError::WorkerPanicked)?
    }
}
