use std::borrow::Cow;
use std::iter;

use cql::types::{ColumnType, CqlValue, quote_identifier};

use crate::bail;
use crate::error::{ErrorKind, ReplicatorResult};
use crate::schema::TableSchema;
use crate::statement::BindValue;
use crate::types::ChangeEvent;

/// Returns the bind marker for a value of `column_type`.
///
/// Tuples are bound element by element, so a tuple of arity N renders as `(?, ..., ?)`.
/// Every other type is a single `?`, including tuples nested in collections or UDT fields.
pub fn bind_marker(column_type: &ColumnType) -> Cow<'static, str> {
    match column_type.tuple_arity() {
        Some(arity) => Cow::Owned(format!("({})", vec!["?"; arity].join(", "))),
        None => Cow::Borrowed("?"),
    }
}

/// Renders `col = <marker>` for each column, quoting identifiers as needed.
pub(crate) fn equality_conditions<'a>(
    schema: &TableSchema,
    columns: impl IntoIterator<Item = &'a String>,
) -> Vec<String> {
    columns
        .into_iter()
        .map(|column| format!("{} = {}", quote_identifier(column), column_marker(schema, column)))
        .collect()
}

pub(crate) fn column_marker(schema: &TableSchema, column: &str) -> Cow<'static, str> {
    schema
        .column_type(column)
        .map(bind_marker)
        .unwrap_or(Cow::Borrowed("?"))
}

/// Number of bind values a column marker consumes when the column is a tuple.
pub(crate) fn tuple_arity(schema: &TableSchema, column: &str) -> Option<usize> {
    schema.column_type(column).and_then(ColumnType::tuple_arity)
}

/// Appends the bind values of one column marker, flattening tuples into their elements.
pub(crate) fn push_value(
    values: &mut Vec<BindValue>,
    arity: Option<usize>,
    value: &CqlValue,
) -> ReplicatorResult<()> {
    let Some(arity) = arity else {
        values.push(BindValue::Value(value.clone()));
        return Ok(());
    };

    let Some(elements) = value.as_tuple() else {
        bail!(
            ErrorKind::InvalidData,
            "Expected a tuple value",
            format!("value `{value}` bound to a tuple column is not a tuple")
        );
    };

    if elements.len() != arity {
        bail!(
            ErrorKind::InvalidData,
            "Tuple value has the wrong number of elements",
            format!(
                "expected {arity} elements, found {} in `{value}`",
                elements.len()
            )
        );
    }

    values.extend(
        elements
            .iter()
            .map(|element| BindValue::from_option(element.as_ref())),
    );

    Ok(())
}

/// Appends the values of `columns` taken from the event's keys.
///
/// A key column missing from the event is bound as unset.
pub(crate) fn push_key_values<'a>(
    values: &mut Vec<BindValue>,
    schema: &TableSchema,
    columns: impl IntoIterator<Item = &'a String>,
    event: &ChangeEvent,
) -> ReplicatorResult<()> {
    for column in columns {
        let arity = tuple_arity(schema, column);
        match event.key(column) {
            Some(value) => push_value(values, arity, value)?,
            None => values.extend(iter::repeat_n(BindValue::Unset, arity.unwrap_or(1))),
        }
    }

    Ok(())
}
