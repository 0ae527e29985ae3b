//! Crate-wide error type
//!
//! Each variant is one failure kind a caller can act on: a malformed
//! configuration is not retried, an unreachable backend might be, and a
//! closed store is a programming error.

use crate::config::ConfigError;
use crate::rdf::{ParseError, SerializeError, TermError, UnsupportedFormat};
use std::io;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Graph store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Missing or unrecognized configuration key or value
    #[error("Configuration error: {0}")]
    Configuration(ConfigError),

    /// The configuration document itself could not be read
    #[error("Configuration document parse failure: {0}")]
    ConfigDocument(ConfigError),

    /// Backend unreachable or misconfigured
    #[error("Connection failure: {message}")]
    Connection {
        /// What was being connected to
        message: String,
        /// Underlying driver error
        #[source]
        source: Option<BoxError>,
    },

    /// Malformed RDF input
    #[error("Parse failure: {0}")]
    Parse(#[from] ParseError),

    /// Query text that cannot be dispatched
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Stream or backing file failure
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// No reader/writer for the requested serialization
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),

    /// The query engine rejected or failed the query
    #[error("Query evaluation failed: {0}")]
    Evaluation(String),

    /// Backend storage failure after the connection was established
    #[error("Storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Operation on a store that has been closed
    #[error("Graph store '{0}' is closed")]
    Closed(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Connection failure without an underlying cause
    pub fn connection(message: impl Into<String>) -> Self {
        StoreError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Connection failure wrapping the driver's error
    pub fn connection_caused(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for malformed RDF or configuration documents
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, StoreError::Parse(_) | StoreError::ConfigDocument(_))
    }
}

impl From<ConfigError> for StoreError {
    fn from(err: ConfigError) -> Self {
        if err.is_document_error() {
            StoreError::ConfigDocument(err)
        } else {
            StoreError::Configuration(err)
        }
    }
}

impl From<TermError> for StoreError {
    fn from(err: TermError) -> Self {
        StoreError::Parse(ParseError::Term(err))
    }
}

impl From<SerializeError> for StoreError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::Io(e) => StoreError::Io(e),
            SerializeError::Serialize(msg) => StoreError::Io(io::Error::new(io::ErrorKind::InvalidData, msg)),
        }
    }
}

impl From<oxigraph::store::StorageError> for StoreError {
    fn from(err: oxigraph::store::StorageError) -> Self {
        StoreError::Evaluation(err.to_string())
    }
}

impl From<oxigraph::sparql::EvaluationError> for StoreError {
    fn from(err: oxigraph::sparql::EvaluationError) -> Self {
        StoreError::Evaluation(err.to_string())
    }
}
