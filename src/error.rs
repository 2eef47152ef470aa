//! Error types for readaloud operations.
//!
//! Engine operations never fail: unresolved nodes and out-of-range indices
//! degrade to empty results. Errors only come from loading content and
//! configuration.

use thiserror::Error;

/// Errors that can occur while loading content or configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Document has no <body> element")]
    MissingBody,

    #[error("Unknown content id: {0}")]
    UnknownContentId(i32),
}

pub type Result<T> = std::result::Result<T, Error>;
