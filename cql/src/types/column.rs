use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::types::quote_identifier;

/// Native (non-composite) CQL data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Ascii,
    BigInt,
    Blob,
    Boolean,
    Counter,
    Date,
    Decimal,
    Double,
    Duration,
    Float,
    Inet,
    Int,
    SmallInt,
    Text,
    Time,
    Timestamp,
    Timeuuid,
    TinyInt,
    Uuid,
    Varint,
}

impl NativeType {
    /// Returns the CQL name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeType::Ascii => "ascii",
            NativeType::BigInt => "bigint",
            NativeType::Blob => "blob",
            NativeType::Boolean => "boolean",
            NativeType::Counter => "counter",
            NativeType::Date => "date",
            NativeType::Decimal => "decimal",
            NativeType::Double => "double",
            NativeType::Duration => "duration",
            NativeType::Float => "float",
            NativeType::Inet => "inet",
            NativeType::Int => "int",
            NativeType::SmallInt => "smallint",
            NativeType::Text => "text",
            NativeType::Time => "time",
            NativeType::Timestamp => "timestamp",
            NativeType::Timeuuid => "timeuuid",
            NativeType::TinyInt => "tinyint",
            NativeType::Uuid => "uuid",
            NativeType::Varint => "varint",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`NativeType::from_str`] for names that are not native CQL types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNativeType;

impl FromStr for NativeType {
    type Err = UnknownNativeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let native_type = match s.to_ascii_lowercase().as_str() {
            "ascii" => NativeType::Ascii,
            "bigint" => NativeType::BigInt,
            "blob" => NativeType::Blob,
            "boolean" => NativeType::Boolean,
            "counter" => NativeType::Counter,
            "date" => NativeType::Date,
            "decimal" => NativeType::Decimal,
            "double" => NativeType::Double,
            "duration" => NativeType::Duration,
            "float" => NativeType::Float,
            "inet" => NativeType::Inet,
            "int" => NativeType::Int,
            "smallint" => NativeType::SmallInt,
            "text" | "varchar" => NativeType::Text,
            "time" => NativeType::Time,
            "timestamp" => NativeType::Timestamp,
            "timeuuid" => NativeType::Timeuuid,
            "tinyint" => NativeType::TinyInt,
            "uuid" => NativeType::Uuid,
            "varint" => NativeType::Varint,
            _ => return Err(UnknownNativeType),
        };

        Ok(native_type)
    }
}

/// Definition of a user-defined type with its fields in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDefinedType {
    /// Keyspace in which the type is declared.
    pub keyspace: String,
    /// Name of the type.
    pub name: String,
    /// Field names and types, in the order the catalog declares them.
    pub fields: Vec<(String, ColumnType)>,
}

impl UserDefinedType {
    /// Returns the position of `field` in the declared field order.
    pub fn field_position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(name, _)| name == field)
    }
}

/// Fully resolved type of a column.
///
/// Frozen-ness is an orthogonal flag on the container variants. Tuples are always frozen and
/// native types are single-cell by nature, so neither carries the flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Native(NativeType),
    List {
        element: Box<ColumnType>,
        frozen: bool,
    },
    Set {
        element: Box<ColumnType>,
        frozen: bool,
    },
    Map {
        key: Box<ColumnType>,
        value: Box<ColumnType>,
        frozen: bool,
    },
    UserDefined {
        definition: Arc<UserDefinedType>,
        frozen: bool,
    },
    Tuple(Vec<ColumnType>),
}

impl ColumnType {
    /// Returns `true` for non-frozen lists, sets, maps and user-defined types, whose cells can
    /// be written individually.
    ///
    /// Everything else can only be overwritten or deleted as a whole.
    pub fn is_multi_cell(&self) -> bool {
        match self {
            ColumnType::List { frozen, .. }
            | ColumnType::Set { frozen, .. }
            | ColumnType::Map { frozen, .. }
            | ColumnType::UserDefined { frozen, .. } => !frozen,
            ColumnType::Native(_) | ColumnType::Tuple(_) => false,
        }
    }

    /// Returns the number of elements if this is a tuple type.
    pub fn tuple_arity(&self) -> Option<usize> {
        match self {
            ColumnType::Tuple(elements) => Some(elements.len()),
            _ => None,
        }
    }

    /// Returns a copy of this type with the frozen flag set on every container, recursively.
    pub fn into_frozen(self) -> ColumnType {
        match self {
            ColumnType::Native(native) => ColumnType::Native(native),
            ColumnType::List { element, .. } => ColumnType::List {
                element: Box::new(element.into_frozen()),
                frozen: true,
            },
            ColumnType::Set { element, .. } => ColumnType::Set {
                element: Box::new(element.into_frozen()),
                frozen: true,
            },
            ColumnType::Map { key, value, .. } => ColumnType::Map {
                key: Box::new(key.into_frozen()),
                value: Box::new(value.into_frozen()),
                frozen: true,
            },
            ColumnType::UserDefined { definition, .. } => ColumnType::UserDefined {
                definition,
                frozen: true,
            },
            ColumnType::Tuple(elements) => {
                ColumnType::Tuple(elements.into_iter().map(ColumnType::into_frozen).collect())
            }
        }
    }
}

impl fmt::Display for ColumnType {
    /// Renders the type the way the catalog spells it, e.g. `frozen<list<text>>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (inner, frozen) = match self {
            ColumnType::Native(native) => return write!(f, "{native}"),
            ColumnType::Tuple(elements) => {
                f.write_str("tuple<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                return f.write_str(">");
            }
            ColumnType::List { element, frozen } => (format!("list<{element}>"), *frozen),
            ColumnType::Set { element, frozen } => (format!("set<{element}>"), *frozen),
            ColumnType::Map { key, value, frozen } => (format!("map<{key}, {value}>"), *frozen),
            ColumnType::UserDefined { definition, frozen } => {
                (quote_identifier(&definition.name).into_owned(), *frozen)
            }
        };

        if frozen {
            write!(f, "frozen<{inner}>")
        } else {
            f.write_str(&inner)
        }
    }
}
