use std::collections::HashMap;

use cql::types::{ColumnType, TableName};

/// Role of a column in the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    PartitionKey,
    ClusteringKey,
    Regular,
}

/// Resolved shape of a destination table.
///
/// Key columns are ordered by their position in the key, which fixes bind order and the
/// meaning of clustering ranges. Built once per table and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: TableName,
    partition_key: Vec<String>,
    clustering_key: Vec<String>,
    regular: Vec<String>,
    column_types: HashMap<String, ColumnType>,
}

impl TableSchema {
    /// Creates a schema from already ordered column groups.
    ///
    /// Every column named in a group must have an entry in `column_types`.
    pub fn new(
        name: TableName,
        partition_key: Vec<String>,
        clustering_key: Vec<String>,
        regular: Vec<String>,
        column_types: HashMap<String, ColumnType>,
    ) -> TableSchema {
        Self {
            name,
            partition_key,
            clustering_key,
            regular,
            column_types,
        }
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn partition_key_columns(&self) -> &[String] {
        &self.partition_key
    }

    pub fn clustering_key_columns(&self) -> &[String] {
        &self.clustering_key
    }

    pub fn regular_columns(&self) -> &[String] {
        &self.regular
    }

    /// Partition key columns followed by clustering key columns.
    pub fn key_columns(&self) -> impl Iterator<Item = &String> {
        self.partition_key.iter().chain(self.clustering_key.iter())
    }

    pub fn column_type(&self, column: &str) -> Option<&ColumnType> {
        self.column_types.get(column)
    }

    pub fn column_role(&self, column: &str) -> Option<ColumnRole> {
        if self.partition_key.iter().any(|c| c == column) {
            Some(ColumnRole::PartitionKey)
        } else if self.clustering_key.iter().any(|c| c == column) {
            Some(ColumnRole::ClusteringKey)
        } else if self.regular.iter().any(|c| c == column) {
            Some(ColumnRole::Regular)
        } else {
            None
        }
    }
}
