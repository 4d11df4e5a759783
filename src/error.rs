use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetcovError {
    #[error("XML parse error at position {position}: {source}")]
    Xml {
        source: quick_xml::Error,
        position: usize,
    },

    #[error("Cannot parse coverage report {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Unknown coverage report kind: {0}")]
    UnknownKind(String),
}

impl NetcovError {
    /// Wrap any failure that happened while reading `path` into a `Parse` error.
    pub fn parse(path: &Path, reason: impl std::fmt::Display) -> Self {
        NetcovError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetcovError>;
