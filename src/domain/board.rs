use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

record_id!(
    /// Identifier of a board row
    BoardId
);

impl BoardId {
    /// The single implicit board every column belongs to
    pub const DEFAULT: BoardId = BoardId::new(1);
}

impl Default for BoardId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A board: the top-level container holding an ordered list of columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a board; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl NewBoard {
    pub const DEFAULT_TITLE: &'static str = "My Board";

    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(self, id: BoardId) -> Board {
        Board {
            id,
            title: self.title,
            created_at: self.created_at,
        }
    }
}

impl Default for NewBoard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TITLE)
    }
}
