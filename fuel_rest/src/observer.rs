//! Code used for reporting the progress of long-running operations.

use tracing::{debug, info};

/// Receives human-readable progress messages from the orchestrator.
pub trait Observer: Send + Sync {
    /// A step-by-step message, such as "Starting deploy...".
    fn debug(&self, message: &str);

    /// A message worth showing by default, such as a newly created cluster.
    fn info(&self, message: &str);
}

/// Forwards progress messages to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn debug(&self, message: &str) {
        debug!("{}", message);
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }
}
