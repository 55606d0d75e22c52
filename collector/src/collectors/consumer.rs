use super::liveness::BoxFuture;
use crate::metrics::Snapshot;
use eyre::Result;

/// Receives the snapshot of every refresh cycle, e.g. to render or export it.
pub trait Consumer: Send + Sync {
    /// Handle one snapshot. Errors are logged by the monitor and do not fail the cycle.
    fn consume<'a>(&'a mut self, snapshot: &'a Snapshot) -> BoxFuture<'a, Result<()>>;

    /// Get the name of this consumer
    fn name(&self) -> &'static str;
}
