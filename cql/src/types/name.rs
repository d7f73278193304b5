use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors returned when parsing a [`TableName`] from its textual form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseTableNameError {
    /// The identifier does not have the `keyspace.table` shape.
    #[error("table name `{0}` is not fully qualified, expected `keyspace.table`")]
    NotQualified(String),
}

/// A fully qualified CQL table name consisting of a keyspace and a table name.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TableName {
    /// The keyspace containing the table.
    pub keyspace: String,
    /// The name of the table within the keyspace.
    pub name: String,
}

impl TableName {
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> TableName {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
        }
    }

    /// Returns the table name with both parts quoted according to CQL identifier rules.
    ///
    /// Plain lower-case identifiers are emitted verbatim, so `ks.t` stays `ks.t`.
    pub fn as_quoted_identifier(&self) -> String {
        let quoted_keyspace = quote_identifier(&self.keyspace);
        let quoted_name = quote_identifier(&self.name);

        format!("{quoted_keyspace}.{quoted_name}")
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.name)
    }
}

impl FromStr for TableName {
    type Err = ParseTableNameError;

    /// Splits on the first `.`; everything after it belongs to the table name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((keyspace, name)) if !keyspace.is_empty() && !name.is_empty() => {
                Ok(TableName::new(keyspace, name))
            }
            _ => Err(ParseTableNameError::NotQualified(s.to_string())),
        }
    }
}

/// Quotes a CQL identifier if it would not survive unquoted.
///
/// Unquoted CQL identifiers are case-insensitive, so anything that is not a lower-case
/// `[a-z][a-z0-9_]*` identifier gets wrapped in double quotes with embedded quotes doubled.
pub fn quote_identifier(identifier: &str) -> Cow<'_, str> {
    if is_plain_identifier(identifier) {
        return Cow::Borrowed(identifier);
    }

    Cow::Owned(format!("\"{}\"", identifier.replace('"', "\"\"")))
}

fn is_plain_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
