//! RediSearch client.

use std::sync::Arc;
use tracing::info;

use crate::{
    batch::{collect_outcomes, encode_batch},
    command::{encode_create, encode_drop, encode_explain, encode_info, encode_search, Command},
    decode::{decode_search, SearchResult},
    document::{Document, IndexingOptions},
    info::{decode_info, IndexInfo},
    query::Query,
    reply::Reply,
    schema::{IndexOptions, Schema},
    transport::{RedisTransport, Transport},
    Result, SearchConfig, SearchError,
};

/// Client bound to one index.
///
/// Every call is one request/reply round trip through the transport. The
/// client keeps no state between calls and is cheap to clone.
#[derive(Clone)]
pub struct SearchClient {
    index: String,
    transport: Arc<dyn Transport>,
    index_options: IndexOptions,
    indexing_options: IndexingOptions,
}

impl SearchClient {
    /// Connect to the server described by `config`.
    pub async fn connect(config: SearchConfig, index: impl Into<String>) -> Result<Self> {
        let transport = RedisTransport::connect(&config).await?;
        Ok(Self::with_transport(Arc::new(transport), index)
            .with_index_options(config.index_options)
            .with_indexing_options(config.indexing_options))
    }

    /// Create a client over an existing transport.
    pub fn with_transport(transport: Arc<dyn Transport>, index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            transport,
            index_options: IndexOptions::default(),
            indexing_options: IndexingOptions::default(),
        }
    }

    /// Set the index options used when a schema leaves them at their defaults.
    pub fn with_index_options(mut self, options: IndexOptions) -> Self {
        self.index_options = options;
        self
    }

    /// Set the options used by [`index`](Self::index).
    pub fn with_indexing_options(mut self, options: IndexingOptions) -> Self {
        self.indexing_options = options;
        self
    }

    /// Index name.
    pub fn index_name(&self) -> &str {
        &self.index
    }

    async fn execute(&self, cmd: Command) -> Result<Reply> {
        self.transport.execute(&cmd).await
    }

    /// Create the index.
    ///
    /// A schema whose options are all left at their defaults picks up the
    /// client's index options instead. Use
    /// [`create_index_with`](Self::create_index_with) to send other options,
    /// including the server defaults.
    pub async fn create_index(&self, schema: &Schema) -> Result<()> {
        if schema.options == IndexOptions::default() {
            self.create_index_with(schema, &self.index_options).await
        } else {
            self.create_index_with(schema, &schema.options).await
        }
    }

    /// Create the index with exactly the given options, ignoring both the
    /// schema's and the client's.
    pub async fn create_index_with(&self, schema: &Schema, options: &IndexOptions) -> Result<()> {
        let mut schema = schema.clone();
        schema.options = options.clone();
        let cmd = encode_create(&self.index, &schema)?;
        info!(index = %self.index, fields = schema.fields.len(), "Creating index");
        expect_ok(self.execute(cmd).await?)
    }

    /// Drop the index and its documents.
    pub async fn drop_index(&self) -> Result<()> {
        let cmd = encode_drop(&self.index)?;
        info!(index = %self.index, "Dropping index");
        expect_ok(self.execute(cmd).await?)
    }

    /// Index documents with the client's default options.
    pub async fn index(&self, docs: &[Document]) -> Result<()> {
        self.index_options(&self.indexing_options, docs).await
    }

    /// Index documents with explicit options.
    ///
    /// All documents are sent in one round trip and every one of them is
    /// attempted. If any is rejected the error is [`SearchError::Batch`] with
    /// one outcome per document, in input order. Any other error means the
    /// batch was not applied.
    pub async fn index_options(&self, opts: &IndexingOptions, docs: &[Document]) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }
        let commands = encode_batch(&self.index, docs, opts)?;
        let replies = self.transport.execute_batch(&commands).await?;
        collect_outcomes(&self.index, docs, replies)
    }

    /// Run a query.
    pub async fn search(&self, query: &Query) -> Result<SearchResult> {
        let cmd = encode_search(&self.index, query)?;
        let reply = self.execute(cmd).await?;
        decode_search(reply, query)
    }

    /// Get the server's execution plan for a query.
    pub async fn explain(&self, query: &Query) -> Result<String> {
        let cmd = encode_explain(&self.index, query)?;
        match self.execute(cmd).await? {
            Reply::Error(msg) => Err(SearchError::Server(msg)),
            reply => reply.as_text().ok_or_else(|| {
                SearchError::Decode(format!("expected explain text, got {}", reply.kind()))
            }),
        }
    }

    /// Get index statistics and schema.
    pub async fn info(&self) -> Result<IndexInfo> {
        let cmd = encode_info(&self.index)?;
        decode_info(self.execute(cmd).await?)
    }
}

fn expect_ok(reply: Reply) -> Result<()> {
    match reply {
        Reply::Error(msg) => Err(SearchError::Server(msg)),
        Reply::Status(_) | Reply::Bulk(_) | Reply::Integer(_) => Ok(()),
        other => Err(SearchError::Decode(format!(
            "expected status reply, got {}",
            other.kind()
        ))),
    }
}
