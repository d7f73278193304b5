use std::collections::{BTreeSet, HashMap};
use std::fmt;

use cql::types::CqlValue;
use uuid::Uuid;

/// Whether a range tombstone bound includes the bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    Inclusive,
    Exclusive,
}

impl BoundKind {
    /// Offset of the bound kind in the range-delete template table.
    pub fn offset(&self) -> usize {
        match self {
            BoundKind::Inclusive => 0,
            BoundKind::Exclusive => 1,
        }
    }
}

/// Operation recorded in a CDC log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Row state before the write. Only present when pre-images are enabled on the source.
    PreImage,
    Update,
    Insert,
    RowDelete,
    PartitionDelete,
    RangeDeleteStart(BoundKind),
    RangeDeleteEnd(BoundKind),
    /// Row state after the write. Only present when post-images are enabled on the source.
    PostImage,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::PreImage => f.write_str("pre-image"),
            OperationType::Update => f.write_str("update"),
            OperationType::Insert => f.write_str("insert"),
            OperationType::RowDelete => f.write_str("row delete"),
            OperationType::PartitionDelete => f.write_str("partition delete"),
            OperationType::RangeDeleteStart(BoundKind::Inclusive) => {
                f.write_str("range delete start (inclusive)")
            }
            OperationType::RangeDeleteStart(BoundKind::Exclusive) => {
                f.write_str("range delete start (exclusive)")
            }
            OperationType::RangeDeleteEnd(BoundKind::Inclusive) => {
                f.write_str("range delete end (inclusive)")
            }
            OperationType::RangeDeleteEnd(BoundKind::Exclusive) => {
                f.write_str("range delete end (exclusive)")
            }
            OperationType::PostImage => f.write_str("post-image"),
        }
    }
}

/// Change of an atomic column: a native type, a frozen collection or UDT, or a tuple.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarChange {
    pub deleted: bool,
    pub value: Option<CqlValue>,
}

/// Cell-level change of a non-frozen list.
///
/// Cells are addressed by the timeuuid key the source assigned to them, not by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListChange {
    pub is_reset: bool,
    /// Appended cells in source order.
    pub appended: Vec<(Uuid, CqlValue)>,
    pub removed: Vec<Uuid>,
}

/// Change of a non-frozen set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetChange {
    /// When set, `added` holds the complete new value of the column.
    pub is_reset: bool,
    pub added: Vec<CqlValue>,
    pub removed: Vec<CqlValue>,
}

/// Change of a non-frozen map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapChange {
    /// When set, `added` holds the complete new value of the column.
    pub is_reset: bool,
    pub added: Vec<(CqlValue, CqlValue)>,
    /// Keys of the removed entries.
    pub removed: Vec<CqlValue>,
}

/// Change of a non-frozen user-defined type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UdtChange {
    pub is_reset: bool,
    /// Fields written with a non-null value.
    pub added_fields: HashMap<String, CqlValue>,
    /// Positions of the removed fields in the type's declared field order.
    pub removed_fields: BTreeSet<usize>,
}

/// Change of a regular column carried by an event.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    Scalar(ScalarChange),
    List(ListChange),
    Set(SetChange),
    Map(MapChange),
    Udt(UdtChange),
}

impl ColumnChange {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnChange::Scalar(_) => "scalar",
            ColumnChange::List(_) => "list",
            ColumnChange::Set(_) => "set",
            ColumnChange::Map(_) => "map",
            ColumnChange::Udt(_) => "udt",
        }
    }
}

/// One decoded row of the CDC log.
///
/// Key columns map to the value recorded for them; a missing key column (as in the bounds of a
/// range tombstone) is simply absent. Regular columns only appear in `changes` when the write
/// touched them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub operation: OperationType,
    /// Write timestamp in microseconds since the epoch.
    pub timestamp: i64,
    /// Time to live in seconds.
    pub ttl: Option<i32>,
    pub keys: HashMap<String, CqlValue>,
    pub changes: HashMap<String, ColumnChange>,
}

impl ChangeEvent {
    pub fn new(operation: OperationType, timestamp: i64) -> ChangeEvent {
        Self {
            operation,
            timestamp,
            ttl: None,
            keys: HashMap::new(),
            changes: HashMap::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: i32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_key(mut self, column: impl Into<String>, value: impl Into<CqlValue>) -> Self {
        self.keys.insert(column.into(), value.into());
        self
    }

    pub fn with_change(mut self, column: impl Into<String>, change: ColumnChange) -> Self {
        self.changes.insert(column.into(), change);
        self
    }

    /// Returns the value of a key column, if present.
    pub fn key(&self, column: &str) -> Option<&CqlValue> {
        self.keys.get(column)
    }

    pub fn change(&self, column: &str) -> Option<&ColumnChange> {
        self.changes.get(column)
    }

    /// TTL to bind for `USING TTL ?`. A missing TTL binds zero, which means no expiry.
    pub fn ttl_value(&self) -> CqlValue {
        CqlValue::Int(self.ttl.unwrap_or(0))
    }
}
