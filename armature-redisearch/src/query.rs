//! Search query builder.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Query flags. Some of them change the shape of the search reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFlags(u32);

impl QueryFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Do not expand or stem query terms.
    pub const VERBATIM: Self = Self(0x01);
    /// Return ids only.
    pub const NO_CONTENT: Self = Self(0x02);
    /// Return the relevance score of each document.
    pub const WITH_SCORES: Self = Self(0x04);
    /// Require query terms to appear in order.
    pub const IN_ORDER: Self = Self(0x08);
    /// Do not filter stop words from the query.
    pub const NO_STOPWORDS: Self = Self(0x10);
    /// Return the payload of each document.
    pub const WITH_PAYLOADS: Self = Self(0x20);

    /// Check if every flag in `other` is set.
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Check if no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for QueryFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for QueryFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Number of results to skip.
    pub offset: usize,
    /// Maximum number of results to return.
    pub num: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self { offset: 0, num: 10 }
    }
}

/// Sort order on a sortable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    /// Sortable field name.
    pub field: String,
    /// Ascending when true.
    pub ascending: bool,
}

/// Highlighting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightOptions {
    /// Fields to highlight, all returned text fields when empty.
    pub fields: Vec<String>,
    /// Open and close tags.
    pub tags: (String, String),
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            tags: ("<b>".to_string(), "</b>".to_string()),
        }
    }
}

/// Summarization options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOptions {
    /// Fields to summarize, all returned text fields when empty.
    pub fields: Vec<String>,
    /// Approximate fragment length in tokens.
    pub fragment_len: usize,
    /// Number of fragments.
    pub num_fragments: usize,
    /// Separator placed after each fragment.
    pub separator: String,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            fragment_len: 20,
            num_fragments: 3,
            separator: "... ".to_string(),
        }
    }
}

/// A search query.
///
/// Setters consume and return the builder. The query is read-only once handed
/// to a search call; encoding the same query twice yields the same arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub(crate) raw: String,
    pub(crate) flags: QueryFlags,
    pub(crate) paging: Paging,
    pub(crate) in_keys: Vec<String>,
    pub(crate) return_fields: Vec<String>,
    pub(crate) sort_by: Option<SortBy>,
    pub(crate) language: Option<String>,
    pub(crate) slop: Option<u32>,
    pub(crate) scorer: Option<String>,
    pub(crate) expander: Option<String>,
    pub(crate) highlight: Option<HighlightOptions>,
    pub(crate) summarize: Option<SummaryOptions>,
}

impl Query {
    /// Create a query from a search expression.
    ///
    /// The expression is passed to the server verbatim, filters such as
    /// `@bar:[50 100]` included.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// Set the result window.
    pub fn limit(mut self, offset: usize, num: usize) -> Self {
        self.paging = Paging { offset, num };
        self
    }

    /// Replace all flags.
    pub fn set_flags(mut self, flags: QueryFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Add flags to the current set.
    pub fn add_flag(mut self, flag: QueryFlags) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Restrict the fields returned for each document.
    pub fn set_return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sort by a sortable field.
    pub fn set_sort_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.sort_by = Some(SortBy {
            field: field.into(),
            ascending,
        });
        self
    }

    /// Override the query language.
    pub fn set_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Limit the search to the given document ids.
    pub fn set_in_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.in_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Allow at most `slop` unmatched terms between query terms.
    pub fn set_slop(mut self, slop: u32) -> Self {
        self.slop = Some(slop);
        self
    }

    /// Use a named scoring function.
    pub fn set_scorer(mut self, scorer: impl Into<String>) -> Self {
        self.scorer = Some(scorer.into());
        self
    }

    /// Use a named query expander.
    pub fn set_expander(mut self, expander: impl Into<String>) -> Self {
        self.expander = Some(expander.into());
        self
    }

    /// Wrap matched terms of the given fields in `open` / `close`.
    pub fn highlight<I, S>(mut self, fields: I, open: impl Into<String>, close: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = Some(HighlightOptions {
            fields: fields.into_iter().map(Into::into).collect(),
            tags: (open.into(), close.into()),
        });
        self
    }

    /// Summarize the given fields with the default options.
    pub fn summarize<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.summarize_options(SummaryOptions {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        })
    }

    /// Summarize with explicit options.
    pub fn summarize_options(mut self, options: SummaryOptions) -> Self {
        self.summarize = Some(options);
        self
    }

    /// The search expression.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Active flags.
    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    /// Result window.
    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// Requested return fields, empty meaning all.
    pub fn return_fields(&self) -> &[String] {
        &self.return_fields
    }

    /// Sort order, if any.
    pub fn sort_by(&self) -> Option<&SortBy> {
        self.sort_by.as_ref()
    }

    /// Highlight options, if any.
    pub fn highlight_options(&self) -> Option<&HighlightOptions> {
        self.highlight.as_ref()
    }

    /// Summarize options, if any.
    pub fn summary_options(&self) -> Option<&SummaryOptions> {
        self.summarize.as_ref()
    }

    /// Check if a field will be present in the results.
    pub fn returns_field(&self, name: &str) -> bool {
        !self.flags.contains(QueryFlags::NO_CONTENT)
            && (self.return_fields.is_empty() || self.return_fields.iter().any(|f| f == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let flags = QueryFlags::NO_CONTENT | QueryFlags::WITH_SCORES;
        assert!(flags.contains(QueryFlags::NO_CONTENT));
        assert!(flags.contains(QueryFlags::WITH_SCORES));
        assert!(!flags.contains(QueryFlags::VERBATIM));

        let mut flags = flags;
        flags.remove(QueryFlags::NO_CONTENT);
        assert!(!flags.contains(QueryFlags::NO_CONTENT));
        assert!(!flags.is_empty());
    }

    #[test]
    fn test_defaults() {
        let q = Query::new("hello world");
        assert_eq!(q.raw(), "hello world");
        assert_eq!(q.paging(), Paging { offset: 0, num: 10 });
        assert!(q.flags().is_empty());
        assert!(q.return_fields().is_empty());
    }

    #[test]
    fn test_summarize_defaults() {
        let q = Query::new("commands").summarize(["foo"]);
        let opts = q.summary_options().unwrap();
        assert_eq!(opts.fields, vec!["foo".to_string()]);
        assert_eq!(opts.fragment_len, 20);
        assert_eq!(opts.num_fragments, 3);
        assert_eq!(opts.separator, "... ");
    }

    #[test]
    fn test_returns_field() {
        let q = Query::new("hello").set_return_fields(["bar"]);
        assert!(q.returns_field("bar"));
        assert!(!q.returns_field("foo"));

        let q = Query::new("hello");
        assert!(q.returns_field("foo"));

        let q = Query::new("hello").set_flags(QueryFlags::NO_CONTENT);
        assert!(!q.returns_field("foo"));
    }
}
