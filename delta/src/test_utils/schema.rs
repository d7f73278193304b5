use cql::catalog::{KeyspaceMetadata, TableMetadata, UserTypeMetadata};
use cql::types::TableName;

use crate::schema::{MemoryCatalog, TableSchema, build_table_schema};
use crate::translator::{DeltaTranslator, TranslatorOptions};

pub const KEYSPACE: &str = "ks";

/// `ks.t`: `id int` partition key, `seq int` clustering key, `val int`, `tags set<text>` and
/// `items list<text>`.
pub const SIMPLE_TABLE: &str = "t";

/// `ks.wide`: a composite partition key `(p1 int, p2 text)`, three `int` clustering columns and
/// regular columns covering maps, user types, tuples and frozen collections.
pub const WIDE_TABLE: &str = "wide";

pub fn example_keyspace() -> KeyspaceMetadata {
    KeyspaceMetadata::new(KEYSPACE)
        .with_user_type(
            UserTypeMetadata::new(KEYSPACE, "address")
                .field("street", "text")
                .field("city", "text")
                .field("zip", "int"),
        )
        .with_table(
            TableMetadata::new(KEYSPACE, SIMPLE_TABLE)
                .partition_key("id", "int")
                .clustering_key("seq", "int")
                .regular("val", "int")
                .regular("tags", "set<text>")
                .regular("items", "list<text>"),
        )
        .with_table(
            TableMetadata::new(KEYSPACE, WIDE_TABLE)
                .partition_key("p1", "int")
                .partition_key("p2", "text")
                .clustering_key("c1", "int")
                .clustering_key("c2", "int")
                .clustering_key("c3", "int")
                .regular("attrs", "map<text, int>")
                .regular("home", "address")
                .regular("point", "tuple<int, int>")
                .regular("history", "frozen<list<text>>")
                .static_column("owner", "text"),
        )
}

/// Returns a catalog holding [`example_keyspace`].
pub async fn example_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog.insert_keyspace(example_keyspace()).await;

    catalog
}

pub fn example_schema(table: &str) -> TableSchema {
    build_table_schema(&example_keyspace(), &TableName::new(KEYSPACE, table))
        .expect("example table should resolve")
}

pub fn example_translator(table: &str) -> DeltaTranslator {
    DeltaTranslator::new(example_schema(table), TranslatorOptions::default())
}
