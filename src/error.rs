use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("dimension mismatch: index expects {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("cannot normalize the zero vector")]
    DegenerateVector,
    #[error("entity is not attached to the store (id is None)")]
    UnattachedEntity,
    #[error("update is not supported for this entity kind")]
    UpdateNotSupported,
    #[error("no data found for the given identifier")]
    NotFound,
    #[error("failed to parse vector literal {0:?}")]
    VectorParse(String),
    #[error(transparent)]
    Store(#[from] rusqlite::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
