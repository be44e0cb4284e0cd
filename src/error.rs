use thiserror::Error;

pub type Result<T> = std::result::Result<T, CorkboardError>;

#[derive(Debug, Error)]
pub enum CorkboardError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Board not initialized: {0}")]
    BoardNotInitialized(String),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Comment must not be empty")]
    EmptyComment,

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid drag identifier: {0}")]
    InvalidDragId(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A multi-record write stopped partway. Memory was left untouched and
    /// the store holds the first `completed` writes.
    #[error("{operation} stopped after {completed} of {planned} writes: {source}")]
    PartialWrite {
        operation: &'static str,
        completed: usize,
        planned: usize,
        #[source]
        source: Box<CorkboardError>,
    },
}

impl CorkboardError {
    /// True for errors caused by an entity that vanished from under the
    /// caller. UI glue treats these as a silent no-op.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) | Self::TaskNotFound(_) | Self::BoardNotInitialized(_) => true,
            Self::PartialWrite { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// True for rejected input that never reached the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyTitle | Self::EmptyComment)
    }
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for CorkboardError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
