//! Catalog metadata as reported by a cluster's schema tables.
//!
//! The structs mirror the rows of `system_schema.tables`, `system_schema.columns` and
//! `system_schema.types`: column types are kept in their textual form and parsed with
//! [`crate::types::parse_type`] by whoever needs the resolved [`crate::types::ColumnType`].

use std::collections::HashMap;

/// Role of a column as recorded in the catalog's `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    PartitionKey,
    Clustering,
    Regular,
    Static,
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub kind: ColumnKind,
    /// Position within the partition or clustering key. Ignored for other kinds.
    pub position: usize,
    /// Type definition as written in the catalog, e.g. `frozen<list<text>>`.
    pub type_text: String,
}

impl ColumnMetadata {
    pub fn new(
        name: impl Into<String>,
        kind: ColumnKind,
        position: usize,
        type_text: impl Into<String>,
    ) -> ColumnMetadata {
        Self {
            name: name.into(),
            kind,
            position,
            type_text: type_text.into(),
        }
    }
}

/// Metadata of a table, with columns in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub keyspace: String,
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> TableMetadata {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn partition_key(mut self, name: &str, type_text: &str) -> Self {
        let position = self.count(ColumnKind::PartitionKey);
        self.columns.push(ColumnMetadata::new(
            name,
            ColumnKind::PartitionKey,
            position,
            type_text,
        ));
        self
    }

    pub fn clustering_key(mut self, name: &str, type_text: &str) -> Self {
        let position = self.count(ColumnKind::Clustering);
        self.columns.push(ColumnMetadata::new(
            name,
            ColumnKind::Clustering,
            position,
            type_text,
        ));
        self
    }

    pub fn regular(mut self, name: &str, type_text: &str) -> Self {
        self.columns
            .push(ColumnMetadata::new(name, ColumnKind::Regular, 0, type_text));
        self
    }

    pub fn static_column(mut self, name: &str, type_text: &str) -> Self {
        self.columns
            .push(ColumnMetadata::new(name, ColumnKind::Static, 0, type_text));
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.name == name)
    }

    fn count(&self, kind: ColumnKind) -> usize {
        self.columns.iter().filter(|c| c.kind == kind).count()
    }
}

/// A user-defined type declaration. Field names and types are parallel and in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTypeMetadata {
    pub keyspace: String,
    pub name: String,
    pub field_names: Vec<String>,
    pub field_types: Vec<String>,
}

impl UserTypeMetadata {
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> UserTypeMetadata {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            field_names: Vec::new(),
            field_types: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, type_text: &str) -> Self {
        self.field_names.push(name.to_string());
        self.field_types.push(type_text.to_string());
        self
    }

    /// Iterates over `(name, type_text)` pairs in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.field_names
            .iter()
            .map(String::as_str)
            .zip(self.field_types.iter().map(String::as_str))
    }
}

/// Tables and user types of a keyspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyspaceMetadata {
    pub name: String,
    pub tables: HashMap<String, TableMetadata>,
    pub user_types: HashMap<String, UserTypeMetadata>,
}

impl KeyspaceMetadata {
    pub fn new(name: impl Into<String>) -> KeyspaceMetadata {
        Self {
            name: name.into(),
            tables: HashMap::new(),
            user_types: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    pub fn with_user_type(mut self, user_type: UserTypeMetadata) -> Self {
        self.user_types.insert(user_type.name.clone(), user_type);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assigns_key_positions() {
        let table = TableMetadata::new("ks", "t")
            .partition_key("a", "int")
            .partition_key("b", "int")
            .clustering_key("c", "text")
            .regular("v", "int");

        assert_eq!(table.column("b").map(|c| c.position), Some(1));
        assert_eq!(table.column("c").map(|c| c.position), Some(0));
        assert_eq!(table.column("v").map(|c| c.kind), Some(ColumnKind::Regular));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn user_type_fields_keep_declared_order() {
        let address = UserTypeMetadata::new("ks", "address")
            .field("street", "text")
            .field("zip", "int");

        let fields: Vec<_> = address.fields().collect();
        assert_eq!(fields, vec![("street", "text"), ("zip", "int")]);
    }
}
