//! Error types shared by the library.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or a response that is not a calendar.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("ICS parse error: {0}")]
    Parse(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
