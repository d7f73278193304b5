//! Statement texts and bind values derived from a table's schema.

mod markers;
mod range;
mod templates;

pub use markers::bind_marker;
pub use range::{ClusteringRange, resolve_range};
pub use templates::{
    CollectionTemplates, ColumnTemplates, FieldTemplates, QueryTemplates,
    RANGE_TEMPLATES_PER_COLUMN, range_delete_index,
};

pub(crate) use markers::{push_key_values, push_value, tuple_arity};
