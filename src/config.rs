use crate::{
    domain::{BoardId, NewBoard},
    error::{CorkboardError, Result},
    storage::{MemoryStore, Store},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, sync::Arc};
use tokio::fs;

/// Which storage backend a board lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Volatile, process-local tables
    Memory,
    /// JSON document under `<root>/.corkboard/`
    File { root: PathBuf },
    /// SQLite database file
    Sqlite { path: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::File {
            root: PathBuf::from("."),
        }
    }
}

impl StorageConfig {
    /// Builds the configured backend. Does not initialize it.
    pub fn open(&self) -> Result<Arc<dyn Store>> {
        match self {
            Self::Memory => Ok(Arc::new(MemoryStore::new())),
            #[cfg(feature = "file-storage")]
            Self::File { root } => Ok(Arc::new(crate::storage::FileStorage::new(root))),
            #[cfg(not(feature = "file-storage"))]
            Self::File { .. } => Err(CorkboardError::ConfigError(
                "file storage requires the `file-storage` feature".to_string(),
            )),
            #[cfg(feature = "sqlite-storage")]
            Self::Sqlite { path } => Ok(Arc::new(crate::storage::SqliteStorage::new(path)?)),
            #[cfg(not(feature = "sqlite-storage"))]
            Self::Sqlite { .. } => Err(CorkboardError::ConfigError(
                "sqlite storage requires the `sqlite-storage` feature".to_string(),
            )),
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorkboardConfig {
    #[serde(default)]
    pub board_id: BoardId,
    #[serde(default = "default_board_title")]
    pub board_title: String,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_board_title() -> String {
    NewBoard::DEFAULT_TITLE.to_string()
}

impl Default for CorkboardConfig {
    fn default() -> Self {
        Self {
            board_id: BoardId::default(),
            board_title: default_board_title(),
            storage: StorageConfig::default(),
        }
    }
}

impl CorkboardConfig {
    /// In-memory board, handy for tests and previews
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::Memory,
            ..Self::default()
        }
    }

    /// Loads a JSON config file. Missing fields take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).await.map_err(|e| {
            CorkboardError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
            .map_err(|e| CorkboardError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.board_id.get() == 0 {
            return Err(CorkboardError::ConfigError(
                "board_id must be at least 1".to_string(),
            ));
        }
        if self.board_title.trim().is_empty() {
            return Err(CorkboardError::ConfigError(
                "board_title must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
