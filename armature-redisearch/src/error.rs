//! RediSearch error types.

use std::fmt;

use thiserror::Error;

/// Result type for RediSearch operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// RediSearch errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A schema, document, or query could not be turned into a command.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The reply did not have the shape the request implies.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The server rejected the command.
    #[error("Server error: {0}")]
    Server(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error.
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error.
    #[error("Operation timed out")]
    Timeout,

    /// One or more documents in a batch were rejected.
    #[error(transparent)]
    Batch(MultiError),

    /// Underlying Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl SearchError {
    /// Check if the call failed before the server could act on it.
    ///
    /// A batch error is not a transport error: the batch reached the server
    /// and every document has a recorded outcome.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Pool(_) | Self::Timeout | Self::Redis(_)
        )
    }

    /// Check if this is a per-document batch failure.
    pub fn is_batch_error(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// Borrow the per-document outcomes of a batch failure.
    pub fn as_multi_error(&self) -> Option<&MultiError> {
        match self {
            Self::Batch(merr) => Some(merr),
            _ => None,
        }
    }
}

impl<E> From<bb8::RunError<E>> for SearchError
where
    E: std::error::Error + 'static,
{
    fn from(err: bb8::RunError<E>) -> Self {
        match err {
            bb8::RunError::TimedOut => Self::Timeout,
            bb8::RunError::User(e) => Self::Pool(e.to_string()),
        }
    }
}

impl From<MultiError> for SearchError {
    fn from(err: MultiError) -> Self {
        Self::Batch(err)
    }
}

/// Why the server refused a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The id is already indexed and the batch did not ask to replace it.
    Duplicate,
    /// A field value was rejected (e.g. a non-numeric value for a numeric field).
    InvalidValue,
    /// Any other server-side rejection.
    Other,
}

impl FailureReason {
    /// Classify a server error message.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("already") && (lower.contains("exist") || lower.contains("in index")) {
            Self::Duplicate
        } else if lower.contains("could not parse")
            || lower.contains("invalid")
            || lower.contains("not a number")
        {
            Self::InvalidValue
        } else {
            Self::Other
        }
    }
}

/// A single rejected document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFailure {
    /// Id of the rejected document.
    pub id: String,
    /// Classified reason.
    pub reason: FailureReason,
    /// Raw server message.
    pub message: String,
}

impl DocumentFailure {
    /// Build a failure from the server message, classifying the reason.
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            id: id.into(),
            reason: FailureReason::classify(&message),
            message,
        }
    }

    /// Check if the document was rejected as a duplicate.
    pub fn is_duplicate(&self) -> bool {
        self.reason == FailureReason::Duplicate
    }
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Outcome of a batch, one slot per submitted document in submission order.
///
/// `None` marks a document the server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiError {
    outcomes: Vec<Option<DocumentFailure>>,
}

impl MultiError {
    /// Create an outcome list where every document succeeded.
    pub fn new(len: usize) -> Self {
        Self {
            outcomes: vec![None; len],
        }
    }

    /// Record a failure at the given batch position.
    pub fn set(&mut self, position: usize, failure: DocumentFailure) {
        if let Some(slot) = self.outcomes.get_mut(position) {
            *slot = Some(failure);
        }
    }

    /// Number of submitted documents.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome for the document at `position`.
    pub fn get(&self, position: usize) -> Option<&DocumentFailure> {
        self.outcomes.get(position).and_then(Option::as_ref)
    }

    /// Per-document outcomes in submission order.
    pub fn outcomes(&self) -> &[Option<DocumentFailure>] {
        &self.outcomes
    }

    /// Iterate over the failures only, with their batch positions.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &DocumentFailure)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.as_ref().map(|f| (i, f)))
    }

    /// Number of rejected documents.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Check if any document was rejected.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(Option::is_some)
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} documents failed",
            self.failed_count(),
            self.outcomes.len()
        )?;
        for (i, (position, failure)) in self.failures().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "[{}] {}", position, failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}
