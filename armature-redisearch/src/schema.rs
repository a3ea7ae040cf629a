//! Index schema and field definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Result, SearchError};

/// Field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Full-text field.
    Text,
    /// Numeric field, filterable with `@field:[min max]`.
    Numeric,
    /// Geo point field.
    Geo,
    /// Tag field (exact-match, separator delimited).
    Tag,
}

impl FieldKind {
    /// Type keyword used in `FT.CREATE`.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Numeric => "NUMERIC",
            Self::Geo => "GEO",
            Self::Tag => "TAG",
        }
    }
}

/// Options for text fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextFieldOptions {
    /// Relevance weight, 1.0 by default.
    pub weight: f64,
    /// Keep the value in the sorting vector.
    pub sortable: bool,
    /// Store the value without full-text indexing it. Requires `sortable`.
    pub no_index: bool,
}

impl Default for TextFieldOptions {
    fn default() -> Self {
        Self {
            weight: 1.0,
            sortable: false,
            no_index: false,
        }
    }
}

/// Options for numeric fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericFieldOptions {
    /// Keep the value in the sorting vector.
    pub sortable: bool,
    /// Do not index the value. Requires `sortable`.
    pub no_index: bool,
}

/// Options for tag fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFieldOptions {
    /// Separator between tags, `,` on the server when unset.
    pub separator: Option<char>,
    /// Do not index the value.
    pub no_index: bool,
}

/// Options for geo fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoFieldOptions {
    /// Do not index the value.
    pub no_index: bool,
}

/// Kind-specific field options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldOptions {
    /// Text options.
    Text(TextFieldOptions),
    /// Numeric options.
    Numeric(NumericFieldOptions),
    /// Geo options.
    Geo(GeoFieldOptions),
    /// Tag options.
    Tag(TagFieldOptions),
}

/// A schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Kind and options.
    pub options: FieldOptions,
}

impl Field {
    /// Text field with default options.
    pub fn text(name: impl Into<String>) -> Self {
        Self::text_with_options(name, TextFieldOptions::default())
    }

    /// Text field with explicit options.
    pub fn text_with_options(name: impl Into<String>, options: TextFieldOptions) -> Self {
        Self {
            name: name.into(),
            options: FieldOptions::Text(options),
        }
    }

    /// Sortable text field.
    pub fn sortable_text(name: impl Into<String>, weight: f64) -> Self {
        Self::text_with_options(
            name,
            TextFieldOptions {
                weight,
                sortable: true,
                no_index: false,
            },
        )
    }

    /// Numeric field.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::numeric_with_options(name, NumericFieldOptions::default())
    }

    /// Sortable numeric field.
    pub fn sortable_numeric(name: impl Into<String>) -> Self {
        Self::numeric_with_options(
            name,
            NumericFieldOptions {
                sortable: true,
                no_index: false,
            },
        )
    }

    /// Numeric field with explicit options.
    pub fn numeric_with_options(name: impl Into<String>, options: NumericFieldOptions) -> Self {
        Self {
            name: name.into(),
            options: FieldOptions::Numeric(options),
        }
    }

    /// Geo field.
    pub fn geo(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: FieldOptions::Geo(GeoFieldOptions::default()),
        }
    }

    /// Tag field.
    pub fn tag(name: impl Into<String>) -> Self {
        Self::tag_with_options(name, TagFieldOptions::default())
    }

    /// Tag field with explicit options.
    pub fn tag_with_options(name: impl Into<String>, options: TagFieldOptions) -> Self {
        Self {
            name: name.into(),
            options: FieldOptions::Tag(options),
        }
    }

    /// Field kind.
    pub fn kind(&self) -> FieldKind {
        match self.options {
            FieldOptions::Text(_) => FieldKind::Text,
            FieldOptions::Numeric(_) => FieldKind::Numeric,
            FieldOptions::Geo(_) => FieldKind::Geo,
            FieldOptions::Tag(_) => FieldKind::Tag,
        }
    }

    /// Check the field on its own, independent of its schema.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SearchError::Encoding("field name is empty".to_string()));
        }
        match self.options {
            FieldOptions::Text(opts) => {
                if !(opts.weight.is_finite() && opts.weight > 0.0) {
                    return Err(SearchError::Encoding(format!(
                        "field `{}`: weight must be a positive number, got {}",
                        self.name, opts.weight
                    )));
                }
                if opts.no_index && !opts.sortable {
                    return Err(no_index_without_sortable(&self.name));
                }
            }
            FieldOptions::Numeric(opts) => {
                if opts.no_index && !opts.sortable {
                    return Err(no_index_without_sortable(&self.name));
                }
            }
            FieldOptions::Geo(_) | FieldOptions::Tag(_) => {}
        }
        Ok(())
    }
}

fn no_index_without_sortable(name: &str) -> SearchError {
    SearchError::Encoding(format!("field `{}`: NOINDEX requires SORTABLE", name))
}

/// Stop-word policy for an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stopwords {
    /// Use the server's built-in list.
    #[default]
    Default,
    /// Index every word (`STOPWORDS 0`).
    Disabled,
    /// Use a custom list.
    Custom(Vec<String>),
}

/// Index-level options for `FT.CREATE`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Default stemming language.
    pub language: Option<String>,
    /// Default document score.
    pub score: Option<f64>,
    /// Stop-word policy.
    pub stopwords: Stopwords,
    /// Do not store per-term field flags (`NOFIELDS`).
    pub no_field_flags: bool,
    /// Do not store term frequencies (`NOFREQS`).
    pub no_frequencies: bool,
    /// Do not store term offsets (`NOOFFSETS`). Disables highlighting.
    pub no_offset_vectors: bool,
}

impl IndexOptions {
    /// Set the default language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the default document score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the stop-word policy.
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }
}

/// Index schema: ordered fields plus index options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Index options.
    pub options: IndexOptions,
}

impl Schema {
    /// Create an empty schema.
    pub fn new(options: IndexOptions) -> Self {
        Self {
            fields: Vec::new(),
            options,
        }
    }

    /// Append a field. Validation happens when the schema is encoded.
    pub fn add_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check every field and reject duplicate names.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(SearchError::Encoding("schema has no fields".to_string()));
        }
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            field.validate()?;
            if !seen.insert(field.name.as_str()) {
                return Err(SearchError::Encoding(format!(
                    "duplicate field `{}`",
                    field.name
                )));
            }
        }
        if let Some(score) = self.options.score
            && !(0.0..=1.0).contains(&score)
        {
            return Err(SearchError::Encoding(format!(
                "default score must be within [0, 1], got {}",
                score
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_field_keeps_order() {
        let schema = Schema::new(IndexOptions::default())
            .add_field(Field::text("foo"))
            .add_field(Field::sortable_numeric("bar"))
            .add_field(Field::geo("loc"));

        let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["foo", "bar", "loc"]);
        assert_eq!(schema.field("bar").map(Field::kind), Some(FieldKind::Numeric));
    }

    #[test]
    fn test_validation_is_deferred() {
        // Building never fails; validation reports the problem.
        let schema = Schema::new(IndexOptions::default())
            .add_field(Field::text("foo"))
            .add_field(Field::text("foo"));
        assert!(matches!(schema.validate(), Err(SearchError::Encoding(_))));

        let schema = Schema::new(IndexOptions::default()).add_field(Field::text(""));
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_no_index_requires_sortable() {
        let field = Field::text_with_options(
            "f1",
            TextFieldOptions {
                no_index: true,
                ..Default::default()
            },
        );
        assert!(field.validate().is_err());

        let field = Field::text_with_options(
            "f1",
            TextFieldOptions {
                weight: 1.0,
                sortable: true,
                no_index: true,
            },
        );
        assert!(field.validate().is_ok());
    }

    #[test]
    fn test_weight_must_be_positive() {
        let field = Field::sortable_text("title", 0.0);
        assert!(field.validate().is_err());
        assert!(Field::sortable_text("title", 5.0).validate().is_ok());
    }
}
