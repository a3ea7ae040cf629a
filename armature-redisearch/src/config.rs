//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    document::IndexingOptions,
    schema::IndexOptions,
    Result, SearchError,
};

/// RediSearch client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Redis URL (redis://host:port or rediss://host:port for TLS).
    pub url: String,
    /// Connection pool size.
    pub pool_size: u32,
    /// Minimum idle connections.
    pub min_idle: Option<u32>,
    /// Connection timeout.
    #[serde(with = "duration_secs", default = "default_connection_timeout")]
    pub connection_timeout: Duration,
    /// Command timeout.
    #[serde(with = "duration_secs", default = "default_command_timeout")]
    pub command_timeout: Duration,
    /// Database number (0-15).
    pub database: Option<u8>,
    /// Username for Redis 6+ ACL.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Use TLS.
    pub tls: bool,
    /// Options used by `create_index` when the schema carries none.
    #[serde(default)]
    pub index_options: IndexOptions,
    /// Options used by `index`.
    #[serde(default)]
    pub indexing_options: IndexingOptions,
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            min_idle: Some(1),
            connection_timeout: default_connection_timeout(),
            command_timeout: default_command_timeout(),
            database: None,
            username: None,
            password: None,
            tls: false,
            index_options: IndexOptions::default(),
            indexing_options: IndexingOptions::default(),
        }
    }
}

impl SearchConfig {
    /// Create a new configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Create a builder.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> SearchConfigBuilder {
        let mut builder = SearchConfigBuilder::new();

        if let Ok(url) = std::env::var("REDISEARCH_URL") {
            builder = builder.url(url);
        }

        if let Ok(pool_size) = std::env::var("REDISEARCH_POOL_SIZE")
            && let Ok(size) = pool_size.parse()
        {
            builder = builder.pool_size(size);
        }

        if let Ok(db) = std::env::var("REDISEARCH_DATABASE")
            && let Ok(db_num) = db.parse()
        {
            builder = builder.database(db_num);
        }

        if let Ok(username) = std::env::var("REDISEARCH_USERNAME") {
            builder = builder.username(username);
        }

        if let Ok(password) = std::env::var("REDISEARCH_PASSWORD") {
            builder = builder.password(password);
        }

        if std::env::var("REDISEARCH_TLS").is_ok() {
            builder = builder.tls(true);
        }

        builder
    }

    /// Check the URL and pool settings.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.url)
            .map_err(|e| SearchError::Config(format!("invalid url `{}`: {}", self.url, e)))?;
        if !matches!(url.scheme(), "redis" | "rediss") {
            return Err(SearchError::Config(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }
        if self.pool_size == 0 {
            return Err(SearchError::Config("pool_size must be at least 1".to_string()));
        }
        if let Some(min_idle) = self.min_idle
            && min_idle > self.pool_size
        {
            return Err(SearchError::Config(format!(
                "min_idle ({}) exceeds pool_size ({})",
                min_idle, self.pool_size
            )));
        }
        Ok(())
    }

    /// Get the full Redis URL with auth and database.
    pub fn connection_url(&self) -> String {
        let mut url = self.url.clone();

        if let Some(password) = &self.password {
            let auth = match &self.username {
                Some(username) => format!("{}:{}@", username, password),
                None => format!(":{}@", password),
            };
            url = url.replacen("redis://", &format!("redis://{}", auth), 1);
            url = url.replacen("rediss://", &format!("rediss://{}", auth), 1);
        }

        if let Some(db) = self.database {
            let path_start = url.find("://").map(|i| i + 3).unwrap_or(0);
            if !url[path_start..].contains('/') {
                url = format!("{}/{}", url, db);
            }
        }

        url
    }
}

/// Builder for client configuration.
#[derive(Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Set the Redis URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Set the pool size.
    pub fn pool_size(mut self, size: u32) -> Self {
        self.config.pool_size = size;
        self
    }

    /// Set the minimum idle connections.
    pub fn min_idle(mut self, min_idle: u32) -> Self {
        self.config.min_idle = Some(min_idle);
        self
    }

    /// Set the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// Set the command timeout.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    /// Set the database number.
    pub fn database(mut self, db: u8) -> Self {
        self.config.database = Some(db);
        self
    }

    /// Set the username (Redis 6+ ACL).
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Enable TLS.
    pub fn tls(mut self, enabled: bool) -> Self {
        self.config.tls = enabled;
        if enabled && self.config.url.starts_with("redis://") {
            self.config.url = self.config.url.replacen("redis://", "rediss://", 1);
        }
        self
    }

    /// Set the default index options.
    pub fn index_options(mut self, options: IndexOptions) -> Self {
        self.config.index_options = options;
        self
    }

    /// Set the default indexing options.
    pub fn indexing_options(mut self, options: IndexingOptions) -> Self {
        self.config.indexing_options = options;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SearchConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
