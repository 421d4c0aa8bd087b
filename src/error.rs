//! Unified error types for locator resolution

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for locator resolution
#[derive(Error, Debug)]
pub enum Error {
    /// Concatenation attempted on an operand that is not path-expressible
    #[error("Unsupported concatenation: {0}")]
    UnsupportedConcatenation(String),

    /// A locator could not be derived for a node
    #[error("Locator generation failed: {0}")]
    LocatorGeneration(String),

    /// No element matched a single-result lookup
    #[error("Element not found: {query} (scope: {scope})")]
    NotFound {
        /// The query that was submitted
        query: String,
        /// The scope the query was resolved against
        scope: String,
    },

    /// A node id does not exist in the session table
    #[error("Context node not found: {0}")]
    NodeNotFound(String),

    /// Attempt to overwrite a write-once locator slot
    #[error("Locator already set: {0}")]
    LocatorAlreadySet(String),

    /// Driver failure other than a missing element
    #[error("Driver error: {0}")]
    Driver(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new unsupported concatenation error
    pub fn unsupported_concatenation<S: Into<String>>(msg: S) -> Self {
        Error::UnsupportedConcatenation(msg.into())
    }

    /// Create a new locator generation error
    pub fn locator_generation<S: Into<String>>(msg: S) -> Self {
        Error::LocatorGeneration(msg.into())
    }

    /// Create a new not found error naming the query and its scope
    pub fn not_found<Q: Into<String>, S: Into<String>>(query: Q, scope: S) -> Self {
        Error::NotFound {
            query: query.into(),
            scope: scope.into(),
        }
    }

    /// Create a new node not found error
    pub fn node_not_found<S: Into<String>>(id: S) -> Self {
        Error::NodeNotFound(id.into())
    }

    /// Create a new locator already set error
    pub fn locator_already_set<S: Into<String>>(msg: S) -> Self {
        Error::LocatorAlreadySet(msg.into())
    }

    /// Create a new driver error
    pub fn driver<S: Into<String>>(msg: S) -> Self {
        Error::Driver(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error reports a lookup that matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
