//! Errors raised while resolving and reading input documents.

use crate::session::{Classified, ErrorClass};
use thiserror::Error;

/// Failure to resolve, fetch or read one input file. Reported per file; never aborts the run.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Unable to find \"{name}\"...")]
    NotFound { name: String },

    #[error("Unable to read \"{name}\": local files are disabled.")]
    LocalFilesDisabled { name: String },

    #[error("Unable to open \"{name}\" for reading: {source}")]
    Open {
        name: String,
        source: std::io::Error,
    },

    // HTTP and network
    #[error("Failed to create HTTP client: {source}")]
    Client { source: reqwest::Error },

    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unable to save download of {url}: {source}")]
    Download {
        url: String,
        source: std::io::Error,
    },
}

impl Classified for AssemblyError {
    fn class(&self) -> ErrorClass {
        match self {
            AssemblyError::NotFound { .. }
            | AssemblyError::LocalFilesDisabled { .. }
            | AssemblyError::HttpStatus { .. } => ErrorClass::NotFound,
            AssemblyError::Open { .. }
            | AssemblyError::Network { .. }
            | AssemblyError::Download { .. } => ErrorClass::Read,
            AssemblyError::Client { .. } => ErrorClass::Internal,
        }
    }
}
