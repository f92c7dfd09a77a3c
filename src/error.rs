use std::{io, path::PathBuf};

use thiserror::Error;

/// Rejected cache setup. Raised before any cache is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("cache size {cache_size}B is not a multiple of {block_size}B blocks x {ways} ways")]
    Uneven {
        cache_size: u64,
        block_size: u64,
        ways: u64,
    },

    #[error("{blocks} blocks do not fit in memory")]
    TooLarge { blocks: u64 },

    #[error("unrecognized replacement policy: {0}")]
    UnknownPolicy(String),

    #[error("no value given for {0}")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{key} is missing its value")]
    MissingValue { key: &'static str },

    #[error("{key}: `{token}` is not a number")]
    BadToken { key: &'static str, token: String },

    #[error("invalid json config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
