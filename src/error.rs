//! Error types for connection URL resolution.

use thiserror::Error;

/// Configuration family a connection URL belongs to.
///
/// Each family has its own scheme registry, resolver, and conventional
/// environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Relational databases (`DATABASE_URL`).
    Database,
    /// Cache backends (`CACHE_URL`).
    Cache,
    /// Mail transports (`EMAIL_URL`).
    Email,
    /// Search engines (`SEARCH_URL`).
    Search,
    /// Message queues (`QUEUE_URL`).
    Queue,
}

impl Family {
    /// Get the conventional environment variable for this family.
    pub fn default_var(&self) -> &'static str {
        match self {
            Self::Database => "DATABASE_URL",
            Self::Cache => "CACHE_URL",
            Self::Email => "EMAIL_URL",
            Self::Search => "SEARCH_URL",
            Self::Queue => "QUEUE_URL",
        }
    }

    /// Get the family name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Email => "email",
            Self::Search => "search",
            Self::Queue => "queue",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors that can occur during connection URL resolution.
#[derive(Error, Debug)]
pub enum EnvError {
    /// Required variable absent or empty, with no usable default.
    #[error("Expected {0} is not set in environment")]
    MissingVar(String),

    /// Scheme token not present in the family's registry.
    #[error("Invalid {family} scheme: {scheme}")]
    UnknownScheme {
        /// Family whose registry was consulted.
        family: Family,
        /// The offending scheme token.
        scheme: String,
    },

    /// Structurally invalid connection URL.
    #[error("Invalid connection URL: {0}")]
    MalformedUrl(String),
}

/// Result type for resolution operations.
pub type EnvResult<T> = Result<T, EnvError>;
