//! Translation of change events into destination mutations.
//!
//! A [`DeltaTranslator`] is bound to one destination table. It turns every change event into
//! the statements that reproduce the same write on the destination: the same timestamps, the
//! same TTLs and, for non-frozen collections and user-defined types, the same cell-level
//! edits rather than the resulting value.

use std::sync::Arc;

use cql::types::{ColumnType, Consistency, CqlValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::bail;
use crate::destination::Destination;
use crate::error::{ErrorKind, ReplicatorResult};
#[cfg(feature = "failpoints")]
use crate::failpoints::{
    DELTA_TRANSLATOR__BEFORE_BATCH_EXECUTION, DELTA_TRANSLATOR__BEFORE_DELETE_EXECUTION,
    replicator_fail_point,
};
use crate::query::{
    CollectionTemplates, ColumnTemplates, FieldTemplates, QueryTemplates, push_key_values,
    push_value, resolve_range, tuple_arity,
};
use crate::schema::TableSchema;
use crate::statement::{Batch, BindValue, ExecutionOptions, Mutation, Statement};
use crate::types::{
    ChangeEvent, ColumnChange, ListChange, MapChange, OperationType, ScalarChange, SetChange,
    UdtChange,
};

/// Options applied to every mutation a translator produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorOptions {
    pub consistency: Consistency,
    /// Logs every statement with its bind values at `debug` level before it is executed.
    #[serde(default)]
    pub log_statements: bool,
}

/// Mutation produced from the events at the front of a slice.
struct Unit {
    operation: OperationType,
    /// Number of events the unit was built from.
    consumed: usize,
    /// `None` when the events require no write.
    mutation: Option<Mutation>,
}

/// Translates change events of one table into destination mutations.
///
/// Holds no per-event state, so a translator can be shared between tasks. Events of the same
/// partition must still be handed to it in source order.
#[derive(Debug, Clone)]
pub struct DeltaTranslator {
    schema: Arc<TableSchema>,
    templates: Arc<QueryTemplates>,
    options: TranslatorOptions,
}

impl DeltaTranslator {
    pub fn new(schema: TableSchema, options: TranslatorOptions) -> DeltaTranslator {
        let templates = QueryTemplates::new(&schema);

        info!(
            table = %schema.name(),
            partition_key = ?schema.partition_key_columns(),
            clustering_key = ?schema.clustering_key_columns(),
            regular_columns = schema.regular_columns().len(),
            range_templates = templates.range_delete_count(),
            consistency = %options.consistency,
            "created delta translator"
        );

        Self {
            schema: Arc::new(schema),
            templates: Arc::new(templates),
            options,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn templates(&self) -> &QueryTemplates {
        &self.templates
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// Translates `events` without executing anything.
    ///
    /// Fails on the first event that cannot be translated.
    pub fn plan(&self, events: &[ChangeEvent]) -> ReplicatorResult<Vec<Mutation>> {
        let mut mutations = Vec::with_capacity(events.len());
        let mut position = 0;

        while position < events.len() {
            let unit = self.translate_unit(&events[position..])?;
            position += unit.consumed;
            mutations.extend(unit.mutation);
        }

        Ok(mutations)
    }

    /// Translates `events` and executes the resulting mutations in order.
    ///
    /// Each mutation is executed before the next event is translated. Processing stops at the
    /// first error, so earlier mutations stay applied and later events are not attempted.
    pub async fn consume<D>(&self, destination: &D, events: &[ChangeEvent]) -> ReplicatorResult<()>
    where
        D: Destination + Sync,
    {
        let mut position = 0;

        while position < events.len() {
            let unit = self.translate_unit(&events[position..])?;
            position += unit.consumed;

            let Some(mutation) = unit.mutation else {
                debug!(
                    table = %self.schema.name(),
                    operation = %unit.operation,
                    "change produced no statements, skipping"
                );
                continue;
            };

            self.execute(destination, unit.operation, mutation).await?;
        }

        Ok(())
    }

    async fn execute<D>(
        &self,
        destination: &D,
        operation: OperationType,
        mutation: Mutation,
    ) -> ReplicatorResult<()>
    where
        D: Destination + Sync,
    {
        if self.options.log_statements {
            for statement in mutation.statements() {
                debug!(table = %self.schema.name(), %operation, %statement, "executing statement");
            }
        }

        let statements = mutation.statements().len();
        let result = match mutation {
            Mutation::Single { statement, options } => {
                #[cfg(feature = "failpoints")]
                replicator_fail_point(DELTA_TRANSLATOR__BEFORE_DELETE_EXECUTION)?;

                destination.execute(statement, options).await
            }
            Mutation::Batch(batch) => {
                #[cfg(feature = "failpoints")]
                replicator_fail_point(DELTA_TRANSLATOR__BEFORE_BATCH_EXECUTION)?;

                destination.execute_batch(batch).await
            }
        };

        if let Err(err) = &result {
            error!(
                table = %self.schema.name(),
                %operation,
                statements,
                error = %err,
                "failed to apply change to destination"
            );
        }

        result
    }

    fn translate_unit(&self, events: &[ChangeEvent]) -> ReplicatorResult<Unit> {
        let Some((event, rest)) = events.split_first() else {
            bail!(ErrorKind::InvalidData, "No change event to translate");
        };

        let operation = event.operation;
        let (mutation, consumed) = match operation {
            OperationType::Insert => (self.write(event, true)?, 1),
            OperationType::Update => (self.write(event, false)?, 1),
            OperationType::RowDelete => (Some(self.row_delete(event)?), 1),
            OperationType::PartitionDelete => (Some(self.partition_delete(event)?), 1),
            OperationType::RangeDeleteStart(_) => {
                let Some(end) = rest.first() else {
                    bail!(
                        ErrorKind::InvalidData,
                        "Range delete start is not followed by its end bound",
                        format!("start event at timestamp {} is the last event", event.timestamp)
                    );
                };
                (Some(self.range_delete(event, end)?), 2)
            }
            OperationType::RangeDeleteEnd(_)
            | OperationType::PreImage
            | OperationType::PostImage => {
                bail!(
                    ErrorKind::UnsupportedOperation,
                    "Change event operation is not supported",
                    format!(
                        "cannot apply a {operation} event to `{}`",
                        self.schema.name()
                    )
                );
            }
        };

        Ok(Unit {
            operation,
            consumed,
            mutation,
        })
    }

    fn execution_options(&self, timestamp: i64, idempotent: bool) -> ExecutionOptions {
        ExecutionOptions {
            consistency: self.options.consistency,
            timestamp,
            idempotent,
        }
    }

    /// Builds the batch of an insert or update event.
    ///
    /// Inserts start with a row-marker write so that the row exists even when every regular
    /// column of the event is a deletion.
    fn write(&self, event: &ChangeEvent, insert: bool) -> ReplicatorResult<Option<Mutation>> {
        let mut keys = Vec::new();
        push_key_values(&mut keys, &self.schema, self.schema.key_columns(), event)?;

        let ttl = BindValue::Value(event.ttl_value());
        let mut statements = Vec::new();

        if insert {
            let mut values = keys.clone();
            values.push(ttl.clone());
            statements.push(Statement::new(
                Arc::clone(self.templates.insert_row_marker()),
                values,
            ));
        }

        for column in self.schema.regular_columns() {
            let Some(change) = event.change(column) else {
                continue;
            };
            let Some(templates) = self.templates.column(column) else {
                continue;
            };

            let writer = ColumnWriter {
                schema: &self.schema,
                column,
                ttl: &ttl,
                keys: &keys,
                statements: &mut statements,
            };
            writer.write(event, templates, change)?;
        }

        if statements.is_empty() {
            return Ok(None);
        }

        // Batches are not marked idempotent even though every statement in them is.
        Ok(Some(Mutation::Batch(Batch {
            statements,
            options: self.execution_options(event.timestamp, false),
        })))
    }

    fn row_delete(&self, event: &ChangeEvent) -> ReplicatorResult<Mutation> {
        let mut values = Vec::new();
        push_key_values(&mut values, &self.schema, self.schema.key_columns(), event)?;

        Ok(Mutation::Single {
            statement: Statement::new(Arc::clone(self.templates.row_delete()), values),
            options: self.execution_options(event.timestamp, true),
        })
    }

    fn partition_delete(&self, event: &ChangeEvent) -> ReplicatorResult<Mutation> {
        let mut values = Vec::new();
        push_key_values(
            &mut values,
            &self.schema,
            self.schema.partition_key_columns(),
            event,
        )?;

        Ok(Mutation::Single {
            statement: Statement::new(Arc::clone(self.templates.partition_delete()), values),
            options: self.execution_options(event.timestamp, true),
        })
    }

    fn range_delete(&self, start: &ChangeEvent, end: &ChangeEvent) -> ReplicatorResult<Mutation> {
        let range = resolve_range(&self.schema, start, end)?;

        let Some(query) = self.templates.range_delete(range.template_index) else {
            bail!(
                ErrorKind::InvalidData,
                "Range delete has no matching template",
                format!(
                    "template {} does not exist for `{}`",
                    range.template_index,
                    self.schema.name()
                )
            );
        };

        Ok(Mutation::Single {
            statement: Statement::new(Arc::clone(query), range.values),
            options: self.execution_options(start.timestamp, true),
        })
    }
}

/// Appends the statements writing one regular column of an insert or update event.
struct ColumnWriter<'a> {
    schema: &'a TableSchema,
    column: &'a str,
    ttl: &'a BindValue,
    /// Key values bound to the trailing `WHERE` clause of every statement.
    keys: &'a [BindValue],
    statements: &'a mut Vec<Statement>,
}

impl ColumnWriter<'_> {
    fn write(
        self,
        event: &ChangeEvent,
        templates: &ColumnTemplates,
        change: &ColumnChange,
    ) -> ReplicatorResult<()> {
        match (templates, change) {
            (ColumnTemplates::Atomic { overwrite, delete }, ColumnChange::Scalar(change)) => {
                self.scalar(overwrite, delete, change)
            }
            (
                ColumnTemplates::List {
                    clear,
                    append,
                    remove,
                },
                ColumnChange::List(change),
            ) => {
                self.list(event, clear, append, remove, change);
                Ok(())
            }
            (ColumnTemplates::Set(templates), ColumnChange::Set(change)) => {
                self.set(templates, change);
                Ok(())
            }
            (ColumnTemplates::Map(templates), ColumnChange::Map(change)) => {
                self.map(templates, change);
                Ok(())
            }
            (ColumnTemplates::UserDefined { overwrite, fields }, ColumnChange::Udt(change)) => {
                self.user_defined(overwrite, fields, change)
            }
            (_, change) => {
                let column_type = self
                    .schema
                    .column_type(self.column)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                bail!(
                    ErrorKind::InvalidData,
                    "Column change does not match the column type",
                    format!(
                        "column `{}` of `{}` has type `{column_type}` but the event carries a {} change",
                        self.column,
                        self.schema.name(),
                        change.kind_name()
                    )
                );
            }
        }
    }

    fn push(&mut self, query: &Arc<str>, mut values: Vec<BindValue>) {
        values.extend_from_slice(self.keys);
        self.statements.push(Statement::new(Arc::clone(query), values));
    }

    fn scalar(
        mut self,
        overwrite: &Arc<str>,
        delete: &Arc<str>,
        change: &ScalarChange,
    ) -> ReplicatorResult<()> {
        if change.deleted {
            self.push(delete, Vec::new());
        } else if let Some(value) = &change.value {
            let mut values = vec![self.ttl.clone()];
            push_value(&mut values, tuple_arity(self.schema, self.column), value)?;
            self.push(overwrite, values);
        }

        Ok(())
    }

    fn list(
        mut self,
        event: &ChangeEvent,
        clear: &Arc<str>,
        append: &Arc<str>,
        remove: &Arc<str>,
        change: &ListChange,
    ) {
        if change.is_reset {
            // The clear must lose against appends carried by the same event.
            let timestamp = if change.appended.is_empty() {
                event.timestamp
            } else {
                event.timestamp.saturating_sub(1)
            };
            self.push(clear, vec![CqlValue::BigInt(timestamp).into()]);
        }

        for (cell, value) in &change.appended {
            self.push(
                append,
                vec![
                    self.ttl.clone(),
                    CqlValue::Timeuuid(*cell).into(),
                    value.clone().into(),
                ],
            );
        }

        for cell in &change.removed {
            self.push(remove, vec![CqlValue::Timeuuid(*cell).into()]);
        }
    }

    fn set(mut self, templates: &CollectionTemplates, change: &SetChange) {
        if change.is_reset {
            let value = CqlValue::Set(change.added.clone());
            self.push(&templates.overwrite, vec![self.ttl.clone(), value.into()]);
            return;
        }

        if !change.added.is_empty() {
            let value = CqlValue::Set(change.added.clone());
            self.push(&templates.add, vec![self.ttl.clone(), value.into()]);
        }
        if !change.removed.is_empty() {
            let value = CqlValue::Set(change.removed.clone());
            self.push(&templates.remove, vec![self.ttl.clone(), value.into()]);
        }
    }

    fn map(mut self, templates: &CollectionTemplates, change: &MapChange) {
        if change.is_reset {
            let value = CqlValue::Map(change.added.clone());
            self.push(&templates.overwrite, vec![self.ttl.clone(), value.into()]);
            return;
        }

        if !change.added.is_empty() {
            let value = CqlValue::Map(change.added.clone());
            self.push(&templates.add, vec![self.ttl.clone(), value.into()]);
        }
        if !change.removed.is_empty() {
            // Map entries are removed by key.
            let value = CqlValue::Set(change.removed.clone());
            self.push(&templates.remove, vec![self.ttl.clone(), value.into()]);
        }
    }

    fn user_defined(
        mut self,
        overwrite: &Arc<str>,
        fields: &[FieldTemplates],
        change: &UdtChange,
    ) -> ReplicatorResult<()> {
        if let Some(position) = change
            .removed_fields
            .iter()
            .find(|position| **position >= fields.len())
        {
            bail!(
                ErrorKind::InvalidData,
                "Removed field does not exist in the user-defined type",
                format!(
                    "column `{}` has {} fields but field {position} was removed",
                    self.column,
                    fields.len()
                )
            );
        }
        if let Some(name) = change
            .added_fields
            .keys()
            .find(|name| !fields.iter().any(|field| &field.name == *name))
        {
            bail!(
                ErrorKind::InvalidData,
                "Written field does not exist in the user-defined type",
                format!("column `{}` has no field `{name}`", self.column)
            );
        }

        if change.is_reset {
            let Some(ColumnType::UserDefined { definition, .. }) =
                self.schema.column_type(self.column)
            else {
                bail!(
                    ErrorKind::InvalidData,
                    "Column is not a user-defined type",
                    format!("column `{}` of `{}`", self.column, self.schema.name())
                );
            };

            let value = CqlValue::UserDefinedType {
                keyspace: definition.keyspace.clone(),
                name: definition.name.clone(),
                fields: fields
                    .iter()
                    .map(|field| {
                        (
                            field.name.clone(),
                            change.added_fields.get(&field.name).cloned(),
                        )
                    })
                    .collect(),
            };
            self.push(overwrite, vec![self.ttl.clone(), value.into()]);

            return Ok(());
        }

        for (position, field) in fields.iter().enumerate() {
            if change.removed_fields.contains(&position) {
                self.push(&field.clear, vec![self.ttl.clone()]);
            } else if let Some(value) = change.added_fields.get(&field.name) {
                self.push(&field.set, vec![self.ttl.clone(), value.clone().into()]);
            }
        }

        Ok(())
    }
}
