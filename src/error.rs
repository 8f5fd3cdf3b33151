//! Error types for Tapedeck

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Tapedeck operations
pub type Result<T> = std::result::Result<T, TapedeckError>;

/// Error returned by a live transport
///
/// Carried through [`TapedeckError::Transport`] without modification.
pub type TransportError = anyhow::Error;

/// Errors that can occur in Tapedeck
#[derive(Debug, Error)]
pub enum TapedeckError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored cassette data is malformed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Cassette data could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cassette references a matcher that is not registered
    #[error("Unknown matcher: {0}")]
    UnknownMatcher(String),

    /// No recorded interaction matched and live fallback is forbidden
    #[error("No match found for {method} {url} (fingerprint {fingerprint})")]
    NoMatchFound {
        /// Request method
        method: String,
        /// Request URL
        url: String,
        /// Short request fingerprint
        fingerprint: String,
    },

    /// Live transport failed
    #[error(transparent)]
    Transport(TransportError),

    /// Cassette file is required but missing
    #[error("Cassette not found: {}", .0.display())]
    CassetteNotFound(PathBuf),

    /// Invalid cassette name
    #[error("Invalid cassette name: {0}")]
    InvalidCassetteName(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
