use cql::types::TableName;
use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Source cluster and the CDC-enabled table to replicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Address of a node in the source cluster.
    pub address: String,
    /// Fully qualified `keyspace.table` name.
    pub table: String,
}

impl SourceConfig {
    /// Returns the parsed table name.
    pub fn table_name(&self) -> Result<TableName, ValidationError> {
        Ok(self.table.parse()?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptySourceAddress);
        }

        self.table_name().map(|_| ())
    }
}
