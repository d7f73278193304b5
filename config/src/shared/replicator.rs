use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{DestinationConfig, SourceConfig, ValidationError};

/// Complete configuration of a replicator process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReplicatorConfig {
    pub source: SourceConfig,
    pub destination: DestinationConfig,
    /// Emits every executed statement and its bind values at `debug` level.
    #[serde(default)]
    pub log_statements: bool,
}

impl ReplicatorConfig {
    /// Validates the source and destination sections.
    ///
    /// Must succeed before a translator is constructed from this configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.destination.validate()
    }
}

impl Config for ReplicatorConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}
