//! # Armature RediSearch
//!
//! RediSearch client: index schemas, batch indexing, and typed search results.
//!
//! ## Features
//!
//! - **Schemas**: text, numeric, geo, and tag fields with weights, sorting, and `NOINDEX`
//! - **Batch Indexing**: one round trip per batch, one outcome per document
//! - **Queries**: filters, paging, sorting, projection, highlighting, summarization
//! - **Typed Results**: replies decoded into [`Document`]s according to the query flags
//! - **Pluggable Transport**: pooled redis connections by default, any [`Transport`] in tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use armature_redisearch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::builder()
//!         .url("redis://localhost:6379")
//!         .build();
//!     let client = SearchClient::connect(config, "myIndex").await?;
//!
//!     let schema = Schema::new(IndexOptions::default())
//!         .add_field(Field::text("body"))
//!         .add_field(Field::sortable_text("title", 5.0))
//!         .add_field(Field::numeric("date"));
//!     client.create_index(&schema).await?;
//!
//!     let doc = Document::new("doc1", 1.0)
//!         .set("title", "Hello world")
//!         .set("body", "foo bar")
//!         .set("date", 1_700_000_000i64);
//!     client.index(&[doc]).await?;
//!
//!     let result = client
//!         .search(&Query::new("hello world").limit(0, 2).set_return_fields(["title"]))
//!         .await?;
//!     println!("{} of {}", result.documents[0].id, result.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Batch Failures
//!
//! ```rust,ignore
//! match client.index(&docs).await {
//!     Ok(()) => {}
//!     Err(SearchError::Batch(merr)) => {
//!         for (position, failure) in merr.failures() {
//!             eprintln!("document {} rejected: {}", position, failure);
//!         }
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

pub mod batch;
mod client;
pub mod command;
mod config;
pub mod decode;
mod document;
mod error;
pub mod info;
mod query;
mod reply;
mod schema;
mod transport;

pub use client::SearchClient;
pub use command::Command;
pub use config::{SearchConfig, SearchConfigBuilder};
pub use decode::SearchResult;
pub use document::{Document, FieldValue, IndexingOptions, Number};
pub use error::{DocumentFailure, FailureReason, MultiError, Result, SearchError};
pub use info::IndexInfo;
pub use query::{HighlightOptions, Paging, Query, QueryFlags, SortBy, SummaryOptions};
pub use reply::Reply;
pub use schema::{
    Field, FieldKind, FieldOptions, GeoFieldOptions, IndexOptions, NumericFieldOptions, Schema,
    Stopwords, TagFieldOptions, TextFieldOptions,
};
pub use transport::{RedisConnection, RedisPool, RedisTransport, Transport};

// Re-export redis crate for convenience
pub use redis;

/// Prelude for common imports.
///
/// ```
/// use armature_redisearch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::SearchClient;
    pub use crate::config::{SearchConfig, SearchConfigBuilder};
    pub use crate::decode::SearchResult;
    pub use crate::document::{Document, FieldValue, IndexingOptions};
    pub use crate::error::{MultiError, Result, SearchError};
    pub use crate::query::{Query, QueryFlags, SummaryOptions};
    pub use crate::schema::{Field, IndexOptions, Schema, TextFieldOptions};
}
