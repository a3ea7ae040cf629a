//! Command transport.
//!
//! The client only needs something that runs a command and hands back the
//! reply. [`RedisTransport`] does that over a bb8 pool of multiplexed redis
//! connections.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use bb8_redis::RedisConnectionManager;
use redis::aio::MultiplexedConnection;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use tracing::{debug, info};

use crate::{command::Command, reply::Reply, SearchConfig, SearchError, Result};

/// Executes commands against the search engine.
///
/// Implementations own connection handling. Server-side command errors are
/// returned as [`Reply::Error`]; `Err` is reserved for transport failures.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run one command.
    async fn execute(&self, command: &Command) -> Result<Reply>;

    /// Run several commands in one round trip.
    ///
    /// Returns one reply per command, in order.
    async fn execute_batch(&self, commands: &[Command]) -> Result<Vec<Reply>>;
}

/// Type alias for the connection pool.
pub type RedisPool = Pool<RedisConnectionManager>;

/// A pooled Redis connection.
pub struct RedisConnection<'a> {
    conn: PooledConnection<'a, RedisConnectionManager>,
}

impl<'a> RedisConnection<'a> {
    /// Create a new connection wrapper.
    pub fn new(conn: PooledConnection<'a, RedisConnectionManager>) -> Self {
        Self { conn }
    }
}

impl<'a> Deref for RedisConnection<'a> {
    type Target = MultiplexedConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<'a> DerefMut for RedisConnection<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

/// Transport over a pooled redis connection.
#[derive(Clone)]
pub struct RedisTransport {
    pool: RedisPool,
    command_timeout: Duration,
}

impl RedisTransport {
    /// Build the pool and check the server answers.
    pub async fn connect(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let url = config.connection_url();

        let manager = RedisConnectionManager::new(url)
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| SearchError::Pool(e.to_string()))?;

        let transport = Self::from_pool(pool, config.command_timeout);

        // Scope the connection so it goes back to the pool before returning.
        {
            let mut conn = transport.get().await?;
            let _: String = redis::cmd("PING")
                .query_async(&mut *conn)
                .await
                .map_err(|e| SearchError::Connection(e.to_string()))?;
        }

        info!(
            pool_size = config.pool_size,
            url = %config.url,
            "RediSearch connection pool created"
        );

        Ok(transport)
    }

    /// Create from an existing pool.
    pub fn from_pool(pool: RedisPool, command_timeout: Duration) -> Self {
        Self {
            pool,
            command_timeout,
        }
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> Result<RedisConnection<'_>> {
        let conn = self.pool.get().await?;
        Ok(RedisConnection::new(conn))
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| SearchError::Timeout)?
    }
}

/// Server errors become replies, everything else is a transport failure.
fn into_reply(result: redis::RedisResult<redis::Value>) -> Result<Reply> {
    match result {
        Ok(value) => Ok(Reply::from(value)),
        Err(e) if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() => {
            Err(SearchError::Redis(e))
        }
        Err(e) => Ok(Reply::Error(e.to_string())),
    }
}

#[async_trait]
impl Transport for RedisTransport {
    async fn execute(&self, command: &Command) -> Result<Reply> {
        debug!(command = command.name(), args = command.args().len(), "Sending command");
        self.with_timeout(async {
            let mut conn = self.get().await?;
            into_reply(command.to_redis().query_async(&mut *conn).await)
        })
        .await
    }

    async fn execute_batch(&self, commands: &[Command]) -> Result<Vec<Reply>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        debug!(commands = commands.len(), "Sending pipeline");

        let mut pipe = redis::pipe();
        pipe.ignore_errors();
        for command in commands {
            pipe.add_command(command.to_redis());
        }

        self.with_timeout(async {
            let mut conn = self.get().await?;
            let values: Vec<redis::Value> = pipe.query_async(&mut *conn).await?;
            Ok(values.into_iter().map(Reply::from).collect())
        })
        .await
    }
}
