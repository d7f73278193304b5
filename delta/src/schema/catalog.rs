use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use cql::catalog::KeyspaceMetadata;
use tokio::sync::Mutex;

use crate::error::ReplicatorResult;

/// Source of destination schema metadata.
///
/// Implementations typically read `system_schema` through a cluster session. The lookup is
/// performed once per table when a translator is created.
pub trait SchemaCatalog {
    /// Returns the tables and user types of `keyspace`, or `None` if it does not exist.
    fn keyspace_metadata(
        &self,
        keyspace: &str,
    ) -> impl Future<Output = ReplicatorResult<Option<KeyspaceMetadata>>> + Send;
}

/// In-memory [`SchemaCatalog`] for tests and for embedding with a known schema.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    keyspaces: Arc<Mutex<HashMap<String, KeyspaceMetadata>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a keyspace.
    pub async fn insert_keyspace(&self, keyspace: KeyspaceMetadata) {
        let mut keyspaces = self.keyspaces.lock().await;
        keyspaces.insert(keyspace.name.clone(), keyspace);
    }
}

impl SchemaCatalog for MemoryCatalog {
    async fn keyspace_metadata(&self, keyspace: &str) -> ReplicatorResult<Option<KeyspaceMetadata>> {
        let keyspaces = self.keyspaces.lock().await;
        Ok(keyspaces.get(keyspace).cloned())
    }
}
