//! Wait primitives for the log drain.

use std::future::Future;
use std::time::Duration;

/// Something that can wait out a display interval.
///
/// The drain only ever waits through this trait, so tests and headless
/// drivers can swap real time for something faster.
pub trait Delay: Send + Sync + 'static {
    /// Resolve after `interval`.
    fn wait(&self, interval: Duration) -> impl Future<Output = ()> + Send;
}

/// Waits on the tokio timer. Honours paused test time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn wait(&self, interval: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(interval)
    }
}

/// Does not wait at all, only yields to the scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&self, _interval: Duration) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}
