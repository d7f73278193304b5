use bigdecimal::BigDecimal;
use std::fmt;
use std::net::IpAddr;
use uuid::Uuid;

/// A decoded CQL value.
///
/// Nullable positions (tuple elements and user-defined type fields) use [`Option`], mirroring
/// how the native protocol distinguishes a null element from a present one.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    Ascii(String),
    BigInt(i64),
    Blob(Vec<u8>),
    Boolean(bool),
    Counter(i64),
    /// Days since the epoch, centred at 2^31.
    Date(u32),
    Decimal(BigDecimal),
    Double(f64),
    Duration {
        months: i32,
        days: i32,
        nanoseconds: i64,
    },
    Empty,
    Float(f32),
    Inet(IpAddr),
    Int(i32),
    SmallInt(i16),
    Text(String),
    /// Nanoseconds since midnight.
    Time(i64),
    /// Milliseconds since the epoch.
    Timestamp(i64),
    Timeuuid(Uuid),
    TinyInt(i8),
    Uuid(Uuid),
    /// Two's complement big-endian representation.
    Varint(Vec<u8>),
    List(Vec<CqlValue>),
    Set(Vec<CqlValue>),
    Map(Vec<(CqlValue, CqlValue)>),
    Tuple(Vec<Option<CqlValue>>),
    UserDefinedType {
        keyspace: String,
        name: String,
        fields: Vec<(String, Option<CqlValue>)>,
    },
}

impl CqlValue {
    /// Returns the tuple elements if this value is a tuple.
    pub fn as_tuple(&self) -> Option<&[Option<CqlValue>]> {
        match self {
            CqlValue::Tuple(elements) => Some(elements),
            _ => None,
        }
    }
}

impl From<bool> for CqlValue {
    fn from(value: bool) -> Self {
        CqlValue::Boolean(value)
    }
}

impl From<i32> for CqlValue {
    fn from(value: i32) -> Self {
        CqlValue::Int(value)
    }
}

impl From<i64> for CqlValue {
    fn from(value: i64) -> Self {
        CqlValue::BigInt(value)
    }
}

impl From<&str> for CqlValue {
    fn from(value: &str) -> Self {
        CqlValue::Text(value.to_string())
    }
}

impl From<String> for CqlValue {
    fn from(value: String) -> Self {
        CqlValue::Text(value)
    }
}

impl From<Uuid> for CqlValue {
    fn from(value: Uuid) -> Self {
        CqlValue::Uuid(value)
    }
}

impl fmt::Display for CqlValue {
    /// Renders the value as a CQL literal, used when logging statements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CqlValue::Ascii(value) | CqlValue::Text(value) => {
                write!(f, "'{}'", value.replace('\'', "''"))
            }
            CqlValue::BigInt(value) | CqlValue::Counter(value) => write!(f, "{value}"),
            CqlValue::Blob(bytes) | CqlValue::Varint(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            CqlValue::Boolean(value) => write!(f, "{value}"),
            CqlValue::Date(value) => write!(f, "{value}"),
            CqlValue::Decimal(value) => write!(f, "{value}"),
            CqlValue::Double(value) => write!(f, "{value}"),
            CqlValue::Duration {
                months,
                days,
                nanoseconds,
            } => write!(f, "{months}mo{days}d{nanoseconds}ns"),
            CqlValue::Empty => f.write_str("''"),
            CqlValue::Float(value) => write!(f, "{value}"),
            CqlValue::Inet(value) => write!(f, "'{value}'"),
            CqlValue::Int(value) => write!(f, "{value}"),
            CqlValue::SmallInt(value) => write!(f, "{value}"),
            CqlValue::Time(value) | CqlValue::Timestamp(value) => write!(f, "{value}"),
            CqlValue::Timeuuid(value) | CqlValue::Uuid(value) => write!(f, "{value}"),
            CqlValue::TinyInt(value) => write!(f, "{value}"),
            CqlValue::List(elements) => write_sequence(f, '[', ']', elements.iter()),
            CqlValue::Set(elements) => write_sequence(f, '{', '}', elements.iter()),
            CqlValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            CqlValue::Tuple(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_nullable(f, element.as_ref())?;
                }
                f.write_str(")")
            }
            CqlValue::UserDefinedType { fields, .. } => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: ")?;
                    write_nullable(f, value.as_ref())?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_sequence<'a>(
    f: &mut fmt::Formatter<'_>,
    open: char,
    close: char,
    elements: impl Iterator<Item = &'a CqlValue>,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, element) in elements.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{element}")?;
    }
    write!(f, "{close}")
}

fn write_nullable(f: &mut fmt::Formatter<'_>, value: Option<&CqlValue>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => f.write_str("null"),
    }
}
