use cql::types::Consistency;
use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Destination cluster that receives the replicated mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DestinationConfig {
    /// Address of a node in the destination cluster.
    pub address: String,
    /// Consistency level used for every write. Defaults to `one`.
    #[serde(default)]
    pub consistency: Consistency,
}

impl DestinationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyDestinationAddress);
        }

        Ok(())
    }
}
