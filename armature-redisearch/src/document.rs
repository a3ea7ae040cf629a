//! Documents, field values, and indexing options.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Result, SearchError};

/// A numeric field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
}

impl Number {
    /// Canonical decimal form: integers as-is, floats in shortest
    /// round-trip form (`1.0` becomes `"1"`).
    pub fn to_arg(&self) -> Result<String> {
        match *self {
            Self::Int(v) => Ok(v.to_string()),
            Self::Float(v) => format_float(v),
        }
    }
}

pub(crate) fn format_float(v: f64) -> Result<String> {
    if !v.is_finite() {
        return Err(SearchError::Encoding(format!(
            "cannot encode non-finite number {}",
            v
        )));
    }
    Ok(format!("{}", v))
}

/// A document field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(Number),
    /// Tag list, joined with `,` on the wire.
    Tag(Vec<String>),
}

impl FieldValue {
    /// Borrow the value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a number.
    ///
    /// Text values are parsed, since search replies return every value as text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(Number::Int(v)) => Some(*v as f64),
            Self::Number(Number::Float(v)) => Some(*v),
            Self::Text(s) => s.parse().ok(),
            Self::Tag(_) => None,
        }
    }

    /// Wire form of the value.
    pub fn to_arg(&self) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Number(n) => n.to_arg(),
            Self::Tag(tags) => Ok(tags.join(",")),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(Number::Int(v)) => write!(f, "{}", v),
            Self::Number(Number::Float(v)) => write!(f, "{}", v),
            Self::Tag(tags) => f.write_str(&tags.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::Tag(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    Self::Number(Number::Int(value as i64))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_uint {
    ($($t:ty),*) => {
        $(
            // Values past i64::MAX are sent as their exact decimal text.
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    match i64::try_from(value) {
                        Ok(v) => Self::Number(Number::Int(v)),
                        Err(_) => Self::Text(value.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_uint!(u64, usize);

impl From<f32> for FieldValue {
    /// Widened through the shortest `f32` text so `0.1f32` encodes as `"0.1"`.
    fn from(value: f32) -> Self {
        let widened = value.to_string().parse::<f64>().unwrap_or(value as f64);
        Self::Number(Number::Float(widened))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

/// A document to index, or a document returned by a search.
///
/// Fields keep insertion order, so encoding a document is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within an index.
    pub id: String,
    /// Base relevance score in `[0, 1]`. Populated on search results only
    /// when scores were requested.
    pub score: f64,
    /// Optional payload bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,
    /// Field name/value pairs in insertion (or reply) order.
    pub fields: Vec<(String, FieldValue)>,
}

impl Document {
    /// Create a document with an id and a score.
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
            payload: None,
            fields: Vec::new(),
        }
    }

    /// Set a field, overwriting an existing value in place.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field through a mutable reference.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Check if the document has a field.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

/// Options for `FT.ADD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingOptions {
    /// Document language, used for stemming.
    pub language: Option<String>,
    /// Index without storing the document body (`NOSAVE`).
    pub no_save: bool,
    /// Replace an existing document with the same id (`REPLACE`).
    pub replace: bool,
    /// Update only the supplied fields. Implies `replace`.
    pub partial: bool,
}

impl IndexingOptions {
    /// Replace documents that already exist.
    pub fn replace() -> Self {
        Self {
            replace: true,
            ..Default::default()
        }
    }

    /// Partially update documents that already exist.
    pub fn partial() -> Self {
        Self {
            replace: true,
            partial: true,
            ..Default::default()
        }
    }

    /// Set the document language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_in_place() {
        let doc = Document::new("doc1", 1.0)
            .set("title", "Hello world")
            .set("body", "foo bar")
            .set("title", "Bye");

        let names: Vec<&str> = doc.field_names().collect();
        assert_eq!(names, vec!["title", "body"]);
        assert_eq!(doc.get("title").and_then(FieldValue::as_str), Some("Bye"));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(FieldValue::from(42).to_arg().unwrap(), "42");
        assert_eq!(FieldValue::from(-7i64).to_arg().unwrap(), "-7");
        assert_eq!(FieldValue::from(1.0).to_arg().unwrap(), "1");
        assert_eq!(FieldValue::from(0.25).to_arg().unwrap(), "0.25");
        assert_eq!(FieldValue::from(1e21).to_arg().unwrap(), "1000000000000000000000");
        assert!(FieldValue::from(f64::NAN).to_arg().is_err());
    }

    #[test]
    fn test_f32_keeps_short_form() {
        assert_eq!(FieldValue::from(0.1f32).to_arg().unwrap(), "0.1");
        assert_eq!(FieldValue::from(0.07f32).to_arg().unwrap(), "0.07");
        assert_eq!(FieldValue::from(2.5f32).to_arg().unwrap(), "2.5");
        assert!(FieldValue::from(f32::INFINITY).to_arg().is_err());
    }

    #[test]
    fn test_wide_unsigned_values() {
        let items = vec![1, 2, 3];
        assert_eq!(FieldValue::from(items.len()).to_arg().unwrap(), "3");
        assert_eq!(FieldValue::from(7u64), FieldValue::Number(Number::Int(7)));
        assert_eq!(
            FieldValue::from(u64::MAX).to_arg().unwrap(),
            "18446744073709551615"
        );
        let doc = Document::new("doc1", 1.0).set("count", items.len());
        assert_eq!(doc.get("count").and_then(FieldValue::as_f64), Some(3.0));
    }

    #[test]
    fn test_tag_value_joined() {
        let value = FieldValue::from(vec!["red".to_string(), "blue".to_string()]);
        assert_eq!(value.to_arg().unwrap(), "red,blue");
    }

    #[test]
    fn test_text_value_as_number() {
        assert_eq!(FieldValue::from("90").as_f64(), Some(90.0));
        assert_eq!(FieldValue::from("hello").as_f64(), None);
    }

    #[test]
    fn test_partial_implies_replace() {
        let opts = IndexingOptions::partial();
        assert!(opts.replace);
        assert!(opts.partial);
    }
}
