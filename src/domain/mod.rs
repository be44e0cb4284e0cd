/// Declares a numeric record id: an auto-increment key handed out by the
/// store, printed and parsed as a bare integer.
macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::CorkboardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| crate::error::CorkboardError::InvalidId(s.to_string()))
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

pub mod board;
pub mod column;
pub mod comment;
pub mod ordering;
pub mod task;

pub use board::{Board, BoardId, NewBoard};
pub use column::{Column, ColumnId, ColumnPatch, ColumnWithTasks, NewColumn};
pub use comment::{Comment, CommentCounts, CommentId, NewComment};
pub use ordering::{append_order, is_dense, move_item, next_order, reindex, Ranked};
pub use task::{NewTask, Task, TaskId, TaskPatch};
