use std::collections::{BTreeSet, HashMap};

use cql::types::CqlValue;
use uuid::Uuid;

use crate::types::{
    BoundKind, ChangeEvent, ColumnChange, ListChange, MapChange, OperationType, ScalarChange,
    SetChange, UdtChange,
};

/// An event on `ks.t` keyed by `id` and `seq`.
pub fn simple_event(operation: OperationType, id: i32, seq: i32, timestamp: i64) -> ChangeEvent {
    ChangeEvent::new(operation, timestamp)
        .with_key("id", id)
        .with_key("seq", seq)
}

pub fn insert(id: i32, seq: i32, timestamp: i64) -> ChangeEvent {
    simple_event(OperationType::Insert, id, seq, timestamp)
}

pub fn update(id: i32, seq: i32, timestamp: i64) -> ChangeEvent {
    simple_event(OperationType::Update, id, seq, timestamp)
}

pub fn row_delete(id: i32, seq: i32, timestamp: i64) -> ChangeEvent {
    simple_event(OperationType::RowDelete, id, seq, timestamp)
}

pub fn partition_delete(id: i32, timestamp: i64) -> ChangeEvent {
    ChangeEvent::new(OperationType::PartitionDelete, timestamp).with_key("id", id)
}

/// A range-delete bound carrying only the partition key `id`.
pub fn range_start(kind: BoundKind, id: i32, timestamp: i64) -> ChangeEvent {
    ChangeEvent::new(OperationType::RangeDeleteStart(kind), timestamp).with_key("id", id)
}

pub fn range_end(kind: BoundKind, id: i32, timestamp: i64) -> ChangeEvent {
    ChangeEvent::new(OperationType::RangeDeleteEnd(kind), timestamp).with_key("id", id)
}

pub fn set_value(value: impl Into<CqlValue>) -> ColumnChange {
    ColumnChange::Scalar(ScalarChange {
        deleted: false,
        value: Some(value.into()),
    })
}

pub fn delete_value() -> ColumnChange {
    ColumnChange::Scalar(ScalarChange {
        deleted: true,
        value: None,
    })
}

pub fn text_set(added: &[&str], removed: &[&str]) -> ColumnChange {
    ColumnChange::Set(SetChange {
        is_reset: false,
        added: added.iter().map(|value| CqlValue::from(*value)).collect(),
        removed: removed.iter().map(|value| CqlValue::from(*value)).collect(),
    })
}

pub fn text_list(is_reset: bool, appended: &[(Uuid, &str)], removed: &[Uuid]) -> ColumnChange {
    ColumnChange::List(ListChange {
        is_reset,
        appended: appended
            .iter()
            .map(|(cell, value)| (*cell, CqlValue::from(*value)))
            .collect(),
        removed: removed.to_vec(),
    })
}

pub fn int_map(is_reset: bool, added: &[(&str, i32)], removed: &[&str]) -> ColumnChange {
    ColumnChange::Map(MapChange {
        is_reset,
        added: added
            .iter()
            .map(|(key, value)| (CqlValue::from(*key), CqlValue::Int(*value)))
            .collect(),
        removed: removed.iter().map(|key| CqlValue::from(*key)).collect(),
    })
}

pub fn udt(is_reset: bool, added: &[(&str, CqlValue)], removed: &[usize]) -> ColumnChange {
    ColumnChange::Udt(UdtChange {
        is_reset,
        added_fields: added
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect::<HashMap<_, _>>(),
        removed_fields: removed.iter().copied().collect::<BTreeSet<_>>(),
    })
}
