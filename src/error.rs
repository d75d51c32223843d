use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("username `{0}` is already taken")]
    DuplicateKey(String),

    #[error("invalid username `{0}`")]
    InvalidUsername(String),

    #[error("user `{0}` cannot follow themselves")]
    SelfEdge(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("ranking heap is full (capacity {capacity})")]
    HeapFull { capacity: usize },

    #[error("ranking heap is empty")]
    HeapEmpty,

    #[error("could not reserve room for {requested} items")]
    OutOfMemory { requested: usize },

    #[error("interest `{0}` is not in the catalog")]
    UnknownInterest(String),

    #[error("user handle no longer refers to a live user")]
    StaleHandle,

    #[error("interest catalog is empty")]
    EmptyCatalog,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SocialError>;

impl SocialError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SocialError::Io {
            source,
            path: path.into(),
        }
    }
}
