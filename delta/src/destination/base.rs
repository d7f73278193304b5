use std::future::Future;

use crate::error::ReplicatorResult;
use crate::statement::{Batch, ExecutionOptions, Statement};

/// Trait for clusters that receive translated mutations.
///
/// [`Destination`] implementations own the session to the destination cluster. Statement texts
/// are stable per table, so implementations are expected to prepare each distinct query once
/// and reuse it.
///
/// Failures are returned verbatim to the caller. A destination must not retry on its own: the
/// translator marks which writes are idempotent through [`ExecutionOptions::idempotent`], and
/// retry policy belongs to the layer driving the translator.
///
/// The trait also provides an optional [`Destination::shutdown`] method with a default no-op
/// implementation.
pub trait Destination {
    /// Returns the name of the destination.
    fn name() -> &'static str;

    /// Propagates the shutdown signal to the destination.
    fn shutdown(&self) -> impl Future<Output = ReplicatorResult<()>> + Send {
        async { Ok(()) }
    }

    /// Executes a single statement.
    ///
    /// Used for row, partition and range deletes.
    fn execute(
        &self,
        statement: Statement,
        options: ExecutionOptions,
    ) -> impl Future<Output = ReplicatorResult<()>> + Send;

    /// Executes the statements of one insert or update event as an unlogged batch.
    ///
    /// An unlogged batch is not atomic across partitions and may be partially applied when it
    /// fails.
    fn execute_batch(&self, batch: Batch) -> impl Future<Output = ReplicatorResult<()>> + Send;
}
