//! Error types for the inspector core

use thiserror::Error;

use docxsrc_opc::OpcError;

/// Errors raised by the tree, renderers and session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The package reader rejected the content
    #[error("Package error: {0}")]
    Package(#[from] OpcError),

    /// None of the known main parts were found
    #[error("Not a known/valid Open XML document")]
    UnsupportedDocument,

    /// An operation was called in a state that does not allow it
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Error reading the input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration file
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl SessionError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        SessionError::Precondition(message.into())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, SessionError>;
