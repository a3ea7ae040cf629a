//! Transport-neutral reply values.

use redis::Value;

/// A reply from the search engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Missing value.
    Nil,
    /// Integer.
    Integer(i64),
    /// Binary-safe string.
    Bulk(Vec<u8>),
    /// Simple status string, e.g. `OK`.
    Status(String),
    /// Floating point number (RESP3).
    Double(f64),
    /// Nested sequence.
    Array(Vec<Reply>),
    /// Error returned by the server for this command.
    Error(String),
}

impl Reply {
    /// Bulk reply from text.
    pub fn bulk(s: impl Into<String>) -> Self {
        Self::Bulk(s.into().into_bytes())
    }

    /// Read the reply as text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Bulk(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Self::Status(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Double(d) => Some(d.to_string()),
            _ => None,
        }
    }

    /// Read the reply as an integer. Numeric strings are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Bulk(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            Self::Status(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read the reply as a float. Numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::Integer(i) => Some(*i as f64),
            Self::Bulk(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            Self::Status(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrow the items of an array reply.
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Check if the server returned an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Short name of the variant, used in decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Integer(_) => "integer",
            Self::Bulk(_) => "bulk string",
            Self::Status(_) => "status",
            Self::Double(_) => "double",
            Self::Array(_) => "array",
            Self::Error(_) => "error",
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => Self::Nil,
            Value::Int(i) => Self::Integer(i),
            Value::BulkString(b) => Self::Bulk(b),
            Value::SimpleString(s) => Self::Status(s),
            Value::Okay => Self::Status("OK".to_string()),
            Value::Double(d) => Self::Double(d),
            Value::Boolean(b) => Self::Integer(i64::from(b)),
            Value::VerbatimString { text, .. } => Self::Bulk(text.into_bytes()),
            Value::Array(items) | Value::Set(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            Value::Map(pairs) => Self::Array(
                pairs
                    .into_iter()
                    .flat_map(|(k, v)| [Self::from(k), Self::from(v)])
                    .collect(),
            ),
            Value::ServerError(err) => Self::Error(match err.details() {
                Some(details) => format!("{} {}", err.code(), details),
                None => err.code().to_string(),
            }),
            other => Self::Error(format!("unsupported reply type: {:?}", other)),
        }
    }
}
