use cql::types::ParseTableNameError;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The source cluster address is empty.
    #[error("`source.address` cannot be empty")]
    EmptySourceAddress,
    /// The destination cluster address is empty.
    #[error("`destination.address` cannot be empty")]
    EmptyDestinationAddress,
    /// The replicated table is not a `keyspace.table` identifier.
    #[error("Invalid `source.table`: {0}")]
    InvalidTableName(#[from] ParseTableNameError),
}
