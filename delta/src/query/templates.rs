use std::collections::HashMap;
use std::sync::Arc;

use cql::types::{ColumnType, quote_identifier};

use crate::query::markers::{column_marker, equality_conditions};
use crate::schema::TableSchema;
use crate::types::BoundKind;

/// Number of range-delete templates stored per clustering column.
///
/// Each side of the range is inclusive, exclusive or absent, which gives nine combinations. The
/// one with both sides absent is not a range and is never stored.
pub const RANGE_TEMPLATES_PER_COLUMN: usize = 8;

const ABSENT_BOUND: usize = 2;

/// Returns the position of the range-delete template for a bound on clustering column `depth`.
///
/// Returns `None` when both sides are absent.
pub fn range_delete_index(
    depth: usize,
    left: Option<BoundKind>,
    right: Option<BoundKind>,
) -> Option<usize> {
    let left = left.map_or(ABSENT_BOUND, |kind| kind.offset());
    let right = right.map_or(ABSENT_BOUND, |kind| kind.offset());

    if left == ABSENT_BOUND && right == ABSENT_BOUND {
        return None;
    }

    Some(RANGE_TEMPLATES_PER_COLUMN * depth + left + 3 * right)
}

/// Set, add and remove statements of a non-frozen set or map column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionTemplates {
    pub overwrite: Arc<str>,
    pub add: Arc<str>,
    pub remove: Arc<str>,
}

/// Statements writing one field of a non-frozen user-defined type column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplates {
    pub name: String,
    pub set: Arc<str>,
    pub clear: Arc<str>,
}

/// Statement texts of one regular column, chosen by how the column can be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnTemplates {
    /// Native types, tuples and frozen containers. Written and deleted as a whole.
    Atomic {
        overwrite: Arc<str>,
        delete: Arc<str>,
    },
    List {
        clear: Arc<str>,
        append: Arc<str>,
        remove: Arc<str>,
    },
    Set(CollectionTemplates),
    Map(CollectionTemplates),
    UserDefined {
        overwrite: Arc<str>,
        /// One entry per field, in declared order.
        fields: Vec<FieldTemplates>,
    },
}

/// Precomputed statement texts for one destination table.
///
/// Built once from the schema so that translating an event only binds values.
#[derive(Debug, Clone)]
pub struct QueryTemplates {
    insert_row_marker: Arc<str>,
    row_delete: Arc<str>,
    partition_delete: Arc<str>,
    range_deletes: Vec<Arc<str>>,
    columns: HashMap<String, ColumnTemplates>,
}

impl QueryTemplates {
    pub fn new(schema: &TableSchema) -> QueryTemplates {
        let table = schema.name().as_quoted_identifier();

        let partition_conditions = equality_conditions(schema, schema.partition_key_columns());
        let clustering_conditions = equality_conditions(schema, schema.clustering_key_columns());
        let key_conditions = partition_conditions
            .iter()
            .chain(clustering_conditions.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(" AND ");

        let key_columns = schema
            .key_columns()
            .map(|column| quote_identifier(column).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        let key_markers = schema
            .key_columns()
            .map(|column| column_marker(schema, column))
            .collect::<Vec<_>>()
            .join(", ");

        let insert_row_marker =
            format!("INSERT INTO {table} ({key_columns}) VALUES ({key_markers}) USING TTL ?");
        let row_delete = format!("DELETE FROM {table} WHERE {key_conditions}");
        let partition_delete = format!(
            "DELETE FROM {table} WHERE {}",
            partition_conditions.join(" AND ")
        );

        let range_deletes = build_range_deletes(
            &table,
            schema.clustering_key_columns(),
            &partition_conditions,
            &clustering_conditions,
        );

        let columns = schema
            .regular_columns()
            .iter()
            .filter_map(|column| {
                let column_type = schema.column_type(column)?;
                let templates = column_templates(
                    &table,
                    column,
                    column_type,
                    &column_marker(schema, column),
                    &key_conditions,
                );
                Some((column.clone(), templates))
            })
            .collect();

        Self {
            insert_row_marker: Arc::from(insert_row_marker),
            row_delete: Arc::from(row_delete),
            partition_delete: Arc::from(partition_delete),
            range_deletes,
            columns,
        }
    }

    /// Row-marker insert, bound to the key values followed by the TTL.
    pub fn insert_row_marker(&self) -> &Arc<str> {
        &self.insert_row_marker
    }

    pub fn row_delete(&self) -> &Arc<str> {
        &self.row_delete
    }

    pub fn partition_delete(&self) -> &Arc<str> {
        &self.partition_delete
    }

    /// Returns the range-delete template at `index`, see [`range_delete_index`].
    pub fn range_delete(&self, index: usize) -> Option<&Arc<str>> {
        self.range_deletes.get(index)
    }

    pub fn range_delete_count(&self) -> usize {
        self.range_deletes.len()
    }

    pub fn column(&self, column: &str) -> Option<&ColumnTemplates> {
        self.columns.get(column)
    }
}

fn build_range_deletes(
    table: &str,
    clustering_key: &[String],
    partition_conditions: &[String],
    clustering_conditions: &[String],
) -> Vec<Arc<str>> {
    const START_OPERATORS: [&str; 3] = [">=", ">", ""];
    const END_OPERATORS: [&str; 3] = ["<=", "<", ""];

    let mut templates = Vec::with_capacity(clustering_key.len() * RANGE_TEMPLATES_PER_COLUMN);

    for (depth, column) in clustering_key.iter().enumerate() {
        let column = quote_identifier(column);
        let prefix = partition_conditions
            .iter()
            .chain(clustering_conditions[..depth].iter())
            .cloned()
            .collect::<Vec<_>>();

        for index in 0..RANGE_TEMPLATES_PER_COLUMN {
            let start = START_OPERATORS[index % 3];
            let end = END_OPERATORS[index / 3];

            let mut conditions = prefix.clone();
            if !start.is_empty() {
                conditions.push(format!("{column} {start} ?"));
            }
            if !end.is_empty() {
                conditions.push(format!("{column} {end} ?"));
            }

            templates.push(Arc::from(format!(
                "DELETE FROM {table} WHERE {}",
                conditions.join(" AND ")
            )));
        }
    }

    templates
}

fn column_templates(
    table: &str,
    column: &str,
    column_type: &ColumnType,
    marker: &str,
    keys: &str,
) -> ColumnTemplates {
    let column = quote_identifier(column);

    let collection = || CollectionTemplates {
        overwrite: Arc::from(format!(
            "UPDATE {table} USING TTL ? SET {column} = ? WHERE {keys}"
        )),
        add: Arc::from(format!(
            "UPDATE {table} USING TTL ? SET {column} = {column} + ? WHERE {keys}"
        )),
        remove: Arc::from(format!(
            "UPDATE {table} USING TTL ? SET {column} = {column} - ? WHERE {keys}"
        )),
    };

    let atomic = || ColumnTemplates::Atomic {
        overwrite: Arc::from(format!(
            "UPDATE {table} USING TTL ? SET {column} = {marker} WHERE {keys}"
        )),
        delete: Arc::from(format!("DELETE {column} FROM {table} WHERE {keys}")),
    };

    if !column_type.is_multi_cell() {
        return atomic();
    }

    match column_type {
        ColumnType::List { .. } => ColumnTemplates::List {
            clear: Arc::from(format!(
                "DELETE {column} FROM {table} USING TIMESTAMP ? WHERE {keys}"
            )),
            append: Arc::from(format!(
                "UPDATE {table} USING TTL ? SET {column}[SCYLLA_TIMEUUID_LIST_INDEX(?)] = ? WHERE {keys}"
            )),
            remove: Arc::from(format!(
                "UPDATE {table} SET {column}[SCYLLA_TIMEUUID_LIST_INDEX(?)] = null WHERE {keys}"
            )),
        },
        ColumnType::Set { .. } => ColumnTemplates::Set(collection()),
        ColumnType::Map { .. } => ColumnTemplates::Map(collection()),
        ColumnType::UserDefined { definition, .. } => ColumnTemplates::UserDefined {
            overwrite: Arc::from(format!(
                "UPDATE {table} USING TTL ? SET {column} = ? WHERE {keys}"
            )),
            fields: definition
                .fields
                .iter()
                .map(|(name, _)| {
                    let field = quote_identifier(name);
                    FieldTemplates {
                        name: name.clone(),
                        set: Arc::from(format!(
                            "UPDATE {table} USING TTL ? SET {column}.{field} = ? WHERE {keys}"
                        )),
                        clear: Arc::from(format!(
                            "UPDATE {table} USING TTL ? SET {column}.{field} = null WHERE {keys}"
                        )),
                    }
                })
                .collect(),
        },
        _ => atomic(),
    }
}
