use std::collections::HashMap;
use std::sync::Arc;

use cql::catalog::{ColumnKind, ColumnMetadata, KeyspaceMetadata};
use cql::types::{ColumnType, TableName, TypeSpec, UserDefinedType, parse_type};
use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, ReplicatorResult};
use crate::replicator_error;
use crate::schema::catalog::SchemaCatalog;
use crate::schema::table::TableSchema;

/// Looks up `table_name` in the catalog and resolves its schema.
///
/// Fails with [`ErrorKind::MissingKeyspace`] or [`ErrorKind::MissingTable`] if the table does
/// not exist, and with [`ErrorKind::InvalidColumnType`] or [`ErrorKind::MissingUserType`] if a
/// column type cannot be resolved.
pub async fn introspect<C>(catalog: &C, table_name: &TableName) -> ReplicatorResult<TableSchema>
where
    C: SchemaCatalog,
{
    let Some(keyspace) = catalog.keyspace_metadata(&table_name.keyspace).await? else {
        bail!(
            ErrorKind::MissingKeyspace,
            "Keyspace does not exist in the destination",
            format!("keyspace `{}` was not found", table_name.keyspace)
        );
    };

    build_table_schema(&keyspace, table_name)
}

/// Builds the schema of `table_name` from the metadata of its keyspace.
///
/// Static columns are written the same way as regular ones and are classified as regular.
pub fn build_table_schema(
    keyspace: &KeyspaceMetadata,
    table_name: &TableName,
) -> ReplicatorResult<TableSchema> {
    let Some(table) = keyspace.tables.get(&table_name.name) else {
        bail!(
            ErrorKind::MissingTable,
            "Table does not exist in the destination",
            format!("table `{table_name}` was not found")
        );
    };

    let mut resolver = TypeResolver::new(keyspace);

    let mut partition_key: Vec<&ColumnMetadata> = Vec::new();
    let mut clustering_key: Vec<&ColumnMetadata> = Vec::new();
    let mut regular = Vec::new();
    let mut column_types = HashMap::with_capacity(table.columns.len());

    for column in &table.columns {
        match column.kind {
            ColumnKind::PartitionKey => partition_key.push(column),
            ColumnKind::Clustering => clustering_key.push(column),
            ColumnKind::Regular | ColumnKind::Static => regular.push(column.name.clone()),
        }

        let column_type = resolver.resolve_column(table_name, column)?;
        column_types.insert(column.name.clone(), column_type);
    }

    if partition_key.is_empty() {
        bail!(
            ErrorKind::ConfigError,
            "Table has no partition key columns",
            format!("table `{table_name}` reports no partition key")
        );
    }

    partition_key.sort_by_key(|column| column.position);
    clustering_key.sort_by_key(|column| column.position);

    let schema = TableSchema::new(
        table_name.clone(),
        partition_key.into_iter().map(|c| c.name.clone()).collect(),
        clustering_key.into_iter().map(|c| c.name.clone()).collect(),
        regular,
        column_types,
    );

    debug!(
        table = %table_name,
        partition_key = ?schema.partition_key_columns(),
        clustering_key = ?schema.clustering_key_columns(),
        regular = ?schema.regular_columns(),
        "resolved table schema"
    );

    Ok(schema)
}

/// Resolves catalog type definitions against the user types of one keyspace.
struct TypeResolver<'a> {
    keyspace: &'a KeyspaceMetadata,
    user_types: HashMap<String, Arc<UserDefinedType>>,
    /// User types whose fields are currently being resolved.
    resolving: Vec<String>,
}

impl<'a> TypeResolver<'a> {
    fn new(keyspace: &'a KeyspaceMetadata) -> Self {
        Self {
            keyspace,
            user_types: HashMap::new(),
            resolving: Vec::new(),
        }
    }

    fn resolve_column(
        &mut self,
        table_name: &TableName,
        column: &ColumnMetadata,
    ) -> ReplicatorResult<ColumnType> {
        let spec = parse_type(&column.type_text).map_err(|err| {
            replicator_error!(
                ErrorKind::InvalidColumnType,
                "Column type definition could not be parsed",
                format!(
                    "column `{}` of `{table_name}` has type `{}`: {err}",
                    column.name, column.type_text
                ),
                source: err
            )
        })?;

        self.resolve(&spec)
    }

    fn resolve(&mut self, spec: &TypeSpec) -> ReplicatorResult<ColumnType> {
        let column_type = match spec {
            TypeSpec::Native(native) => ColumnType::Native(*native),
            TypeSpec::List(element) => ColumnType::List {
                element: Box::new(self.resolve(element)?),
                frozen: false,
            },
            TypeSpec::Set(element) => ColumnType::Set {
                element: Box::new(self.resolve(element)?),
                frozen: false,
            },
            TypeSpec::Map(key, value) => ColumnType::Map {
                key: Box::new(self.resolve(key)?),
                value: Box::new(self.resolve(value)?),
                frozen: false,
            },
            TypeSpec::Tuple(elements) => ColumnType::Tuple(
                elements
                    .iter()
                    .map(|element| self.resolve(element))
                    .collect::<ReplicatorResult<Vec<_>>>()?,
            ),
            TypeSpec::Frozen(inner) => self.resolve(inner)?.into_frozen(),
            TypeSpec::UserType(name) => ColumnType::UserDefined {
                definition: self.user_type(name)?,
                frozen: false,
            },
        };

        Ok(column_type)
    }

    fn user_type(&mut self, name: &str) -> ReplicatorResult<Arc<UserDefinedType>> {
        if let Some(definition) = self.user_types.get(name) {
            return Ok(definition.clone());
        }

        if self.resolving.iter().any(|resolving| resolving == name) {
            bail!(
                ErrorKind::InvalidColumnType,
                "User-defined type references itself",
                format!("type `{name}` is part of a reference cycle")
            );
        }

        let keyspace = self.keyspace;
        let Some(metadata) = keyspace.user_types.get(name) else {
            bail!(
                ErrorKind::MissingUserType,
                "User-defined type does not exist in the destination",
                format!("type `{name}` was not found in keyspace `{}`", keyspace.name)
            );
        };

        self.resolving.push(name.to_string());
        let mut fields = Vec::with_capacity(metadata.field_names.len());
        for (field_name, type_text) in metadata.fields() {
            let spec = parse_type(type_text)?;
            fields.push((field_name.to_string(), self.resolve(&spec)?));
        }
        self.resolving.pop();

        let definition = Arc::new(UserDefinedType {
            keyspace: metadata.keyspace.clone(),
            name: metadata.name.clone(),
            fields,
        });
        self.user_types
            .insert(name.to_string(), Arc::clone(&definition));

        Ok(definition)
    }
}
