use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Receiver of best-effort progress fractions in `[0, 1]`.
///
/// Implementations must not block; a lost update is not an error.
pub trait ProgressSink {
    /// Report that `fraction` of the work is done.
    fn report(&self, fraction: f64);
}

impl<F: Fn(f64)> ProgressSink for F {
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Sink that drops every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

/// Sink that forwards updates over a channel, ignoring a hung-up receiver.
#[derive(Debug, Clone)]
pub struct ChannelProgress(pub Sender<f64>);

impl ProgressSink for ChannelProgress {
    fn report(&self, fraction: f64) {
        let _ = self.0.send(fraction);
    }
}

/// Shared flag for cooperative cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn clones_share_cancellation() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelProgress(tx);
        sink.report(0.5);
        assert_eq!(rx.recv().unwrap(), 0.5);
        drop(rx);
        sink.report(0.75);
    }
}
