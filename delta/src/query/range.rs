use cql::types::CqlValue;

use crate::bail;
use crate::error::{ErrorKind, ReplicatorResult};
use crate::query::markers::{push_key_values, push_value, tuple_arity};
use crate::query::templates::range_delete_index;
use crate::schema::TableSchema;
use crate::statement::BindValue;
use crate::types::{BoundKind, ChangeEvent, OperationType};

/// A clustering range recovered from the start and end events of a range tombstone.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringRange {
    /// Position of the ranged clustering column. Columns before it are matched by equality.
    pub depth: usize,
    pub left: Option<BoundKind>,
    pub right: Option<BoundKind>,
    /// Position of the matching range-delete template.
    pub template_index: usize,
    /// Bind values in marker order: partition key, equality prefix, then the bounds.
    pub values: Vec<BindValue>,
}

/// Resolves the clustering range described by a range-delete start and end event.
///
/// Clustering columns are scanned in key order. While both events carry a value the column is
/// part of the equality prefix. The first column where only one side has a value is ranged on
/// that side only. When neither side has a value, the previous column is the ranged one with
/// both of its recorded values as bounds, which is also the outcome if every column has both.
pub fn resolve_range(
    schema: &TableSchema,
    start: &ChangeEvent,
    end: &ChangeEvent,
) -> ReplicatorResult<ClusteringRange> {
    let OperationType::RangeDeleteStart(start_kind) = start.operation else {
        bail!(
            ErrorKind::InvalidData,
            "Range delete does not begin with a start bound",
            format!("found {} instead", start.operation)
        );
    };
    let OperationType::RangeDeleteEnd(end_kind) = end.operation else {
        bail!(
            ErrorKind::InvalidData,
            "Range delete start is not followed by its end bound",
            format!("found {} instead", end.operation)
        );
    };

    let clustering_key = schema.clustering_key_columns();
    if clustering_key.is_empty() {
        bail!(
            ErrorKind::InvalidData,
            "Range delete on a table without clustering columns",
            format!("table `{}` has no clustering key", schema.name())
        );
    }

    let mut two_sided: Vec<(&CqlValue, &CqlValue)> = Vec::with_capacity(clustering_key.len());
    let mut bound = None;

    for (i, column) in clustering_key.iter().enumerate() {
        match (start.key(column), end.key(column)) {
            (Some(left), Some(right)) => two_sided.push((left, right)),
            (Some(left), None) => {
                bound = Some((i, Some(left), None));
                break;
            }
            (None, Some(right)) => {
                bound = Some((i, None, Some(right)));
                break;
            }
            (None, None) => {
                let Some(&(left, right)) = two_sided.last() else {
                    bail!(
                        ErrorKind::InvalidData,
                        "Range delete does not bound any clustering column",
                        format!("neither bound has a value for `{column}`")
                    );
                };
                bound = Some((i - 1, Some(left), Some(right)));
                break;
            }
        }
    }

    let (depth, left, right) = match bound {
        Some(bound) => bound,
        None => {
            let Some(&(left, right)) = two_sided.last() else {
                bail!(
                    ErrorKind::InvalidData,
                    "Range delete does not bound any clustering column"
                );
            };
            (clustering_key.len() - 1, Some(left), Some(right))
        }
    };

    let left_kind = left.map(|_| start_kind);
    let right_kind = right.map(|_| end_kind);
    let Some(template_index) = range_delete_index(depth, left_kind, right_kind) else {
        bail!(
            ErrorKind::InvalidData,
            "Range delete does not bound any clustering column"
        );
    };

    let mut values = Vec::new();
    push_key_values(&mut values, schema, schema.partition_key_columns(), start)?;
    for (column, (value, _)) in clustering_key.iter().zip(&two_sided[..depth]) {
        push_value(&mut values, tuple_arity(schema, column), value)?;
    }
    values.extend(left.map(|value| BindValue::Value(value.clone())));
    values.extend(right.map(|value| BindValue::Value(value.clone())));

    Ok(ClusteringRange {
        depth,
        left: left_kind,
        right: right_kind,
        template_index,
        values,
    })
}

#[cfg(test)]
mod tests {
    use cql::catalog::{KeyspaceMetadata, TableMetadata};
    use cql::types::TableName;

    use super::*;
    use crate::schema::build_table_schema;

    fn schema() -> TableSchema {
        let keyspace = KeyspaceMetadata::new("ks").with_table(
            TableMetadata::new("ks", "r")
                .partition_key("id", "int")
                .clustering_key("a", "int")
                .clustering_key("b", "int")
                .clustering_key("c", "int"),
        );
        build_table_schema(&keyspace, &TableName::new("ks", "r")).unwrap()
    }

    fn start(kind: BoundKind, keys: &[(&str, i32)]) -> ChangeEvent {
        keys.iter().fold(
            ChangeEvent::new(OperationType::RangeDeleteStart(kind), 10).with_key("id", 1),
            |event, (column, value)| event.with_key(*column, *value),
        )
    }

    fn end(kind: BoundKind, keys: &[(&str, i32)]) -> ChangeEvent {
        keys.iter().fold(
            ChangeEvent::new(OperationType::RangeDeleteEnd(kind), 10).with_key("id", 1),
            |event, (column, value)| event.with_key(*column, *value),
        )
    }

    fn ints(values: &[i32]) -> Vec<BindValue> {
        values
            .iter()
            .map(|value| BindValue::Value(CqlValue::Int(*value)))
            .collect()
    }

    #[test]
    fn left_bound_only() {
        let range = resolve_range(
            &schema(),
            &start(BoundKind::Inclusive, &[("a", 5)]),
            &end(BoundKind::Inclusive, &[]),
        )
        .unwrap();

        assert_eq!(range.depth, 0);
        assert_eq!(range.left, Some(BoundKind::Inclusive));
        assert_eq!(range.right, None);
        assert_eq!(range.template_index, 6);
        assert_eq!(range.values, ints(&[1, 5]));
    }

    #[test]
    fn right_bound_after_equality_prefix() {
        let range = resolve_range(
            &schema(),
            &start(BoundKind::Inclusive, &[("a", 2)]),
            &end(BoundKind::Exclusive, &[("a", 2), ("b", 9)]),
        )
        .unwrap();

        assert_eq!(range.depth, 1);
        assert_eq!(range.template_index, 8 + 2 + 3);
        assert_eq!(range.values, ints(&[1, 2, 9]));
    }

    #[test]
    fn previous_column_is_two_sided_when_both_sides_stop() {
        let range = resolve_range(
            &schema(),
            &start(BoundKind::Exclusive, &[("a", 2), ("b", 3)]),
            &end(BoundKind::Inclusive, &[("a", 2), ("b", 7)]),
        )
        .unwrap();

        assert_eq!(range.depth, 1);
        assert_eq!(range.left, Some(BoundKind::Exclusive));
        assert_eq!(range.right, Some(BoundKind::Inclusive));
        assert_eq!(range.template_index, 8 + 1);
        assert_eq!(range.values, ints(&[1, 2, 3, 7]));
    }

    #[test]
    fn last_column_is_two_sided_when_every_column_is_bound() {
        let range = resolve_range(
            &schema(),
            &start(BoundKind::Inclusive, &[("a", 1), ("b", 2), ("c", 3)]),
            &end(BoundKind::Exclusive, &[("a", 1), ("b", 2), ("c", 8)]),
        )
        .unwrap();

        assert_eq!(range.depth, 2);
        assert_eq!(range.template_index, 16 + 3);
        assert_eq!(range.values, ints(&[1, 1, 2, 3, 8]));
    }

    #[test]
    fn rejects_ill_formed_pairs() {
        let schema = schema();

        let err = resolve_range(
            &schema,
            &start(BoundKind::Inclusive, &[]),
            &end(BoundKind::Inclusive, &[]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let err = resolve_range(
            &schema,
            &start(BoundKind::Inclusive, &[("a", 1)]),
            &start(BoundKind::Inclusive, &[("a", 2)]),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
