//! Destination schema introspection.
//!
//! Classifies the columns of a destination table into partition key, clustering key and
//! regular groups, and resolves each column's catalog type into a [`cql::types::ColumnType`].

mod catalog;
mod introspect;
mod table;

pub use catalog::{MemoryCatalog, SchemaCatalog};
pub use introspect::{build_table_schema, introspect};
pub use table::{ColumnRole, TableSchema};
