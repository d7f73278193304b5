//! Statements and batches sent to the destination cluster.

use std::fmt;
use std::sync::Arc;

use cql::types::{Consistency, CqlValue};

/// A bind parameter of a prepared statement.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// Leaves the column unmodified. Distinct from [`BindValue::Null`], which writes a
    /// tombstone.
    Unset,
    Null,
    Value(CqlValue),
}

impl BindValue {
    pub fn from_option(value: Option<&CqlValue>) -> BindValue {
        match value {
            Some(value) => BindValue::Value(value.clone()),
            None => BindValue::Null,
        }
    }
}

impl From<CqlValue> for BindValue {
    fn from(value: CqlValue) -> Self {
        BindValue::Value(value)
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Unset => f.write_str("<unset>"),
            BindValue::Null => f.write_str("null"),
            BindValue::Value(value) => write!(f, "{value}"),
        }
    }
}

/// A query text and the values bound to its markers, in marker order.
///
/// The text is shared with the precomputed templates it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub query: Arc<str>,
    pub values: Vec<BindValue>,
}

impl Statement {
    pub fn new(query: Arc<str>, values: Vec<BindValue>) -> Statement {
        Self { query, values }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.query)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// Execution parameters attached to a statement or a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub consistency: Consistency,
    /// Default write timestamp in microseconds. `USING TIMESTAMP` clauses take precedence.
    pub timestamp: i64,
    /// Whether the driver may safely retry the write.
    pub idempotent: bool,
}

/// Statements of one insert or update event, sent as a single unlogged batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub statements: Vec<Statement>,
    pub options: ExecutionOptions,
}

/// A unit of work produced from one event, or from one range-delete pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Single {
        statement: Statement,
        options: ExecutionOptions,
    },
    Batch(Batch),
}

impl Mutation {
    /// Returns the statements of this mutation in execution order.
    pub fn statements(&self) -> &[Statement] {
        match self {
            Mutation::Single { statement, .. } => std::slice::from_ref(statement),
            Mutation::Batch(batch) => &batch.statements,
        }
    }

    pub fn options(&self) -> &ExecutionOptions {
        match self {
            Mutation::Single { options, .. } => options,
            Mutation::Batch(batch) => &batch.options,
        }
    }
}
