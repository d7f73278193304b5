use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::bail;
use crate::destination::Destination;
use crate::error::{ErrorKind, ReplicatorResult};
use crate::statement::{Batch, ExecutionOptions, Mutation, Statement};

#[derive(Debug, Default)]
struct Inner {
    mutations: Vec<Mutation>,
    failures_remaining: usize,
}

/// In-memory destination for testing and dry runs.
///
/// [`MemoryDestination`] records every mutation it is asked to execute, in order, so that
/// tests can inspect exactly what would have been sent to the destination cluster. It can also
/// be told to fail the next executions to exercise error propagation.
#[derive(Debug, Clone, Default)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDestination {
    /// Creates a new empty memory destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all mutations executed so far.
    pub async fn mutations(&self) -> Vec<Mutation> {
        let inner = self.inner.lock().await;
        inner.mutations.clone()
    }

    /// Clears all recorded mutations.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.mutations.clear();
    }

    /// Makes the next `count` executions fail with [`ErrorKind::DestinationQueryFailed`].
    ///
    /// Failed executions are not recorded.
    pub async fn fail_next(&self, count: usize) {
        let mut inner = self.inner.lock().await;
        inner.failures_remaining = count;
    }

    async fn record(&self, mutation: Mutation) -> ReplicatorResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            bail!(
                ErrorKind::DestinationQueryFailed,
                "Destination rejected the write",
                format!(
                    "injected failure for {} statement(s)",
                    mutation.statements().len()
                )
            );
        }

        debug!(
            statements = mutation.statements().len(),
            timestamp = mutation.options().timestamp,
            "recording mutation"
        );
        inner.mutations.push(mutation);

        Ok(())
    }
}

impl Destination for MemoryDestination {
    fn name() -> &'static str {
        "memory"
    }

    async fn shutdown(&self) -> ReplicatorResult<()> {
        let inner = self.inner.lock().await;
        info!(
            mutations = inner.mutations.len(),
            "shutting down memory destination"
        );

        Ok(())
    }

    async fn execute(
        &self,
        statement: Statement,
        options: ExecutionOptions,
    ) -> ReplicatorResult<()> {
        self.record(Mutation::Single { statement, options }).await
    }

    async fn execute_batch(&self, batch: Batch) -> ReplicatorResult<()> {
        self.record(Mutation::Batch(batch)).await
    }
}
