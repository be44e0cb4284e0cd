//! # Corkboard Core
//!
//! Ordered board engine: a board holds an ordered list of columns, each
//! column an ordered list of tasks. This crate keeps an in-memory board tree
//! and a persistent store consistent through inserts, renames, cascading
//! deletes and drag-and-drop reordering, without any dependency on a
//! specific UI.

pub mod config;
pub mod domain;
pub mod error;
pub mod manager;
pub mod reorder;
pub mod storage;

// Re-export commonly used types
pub use config::{CorkboardConfig, StorageConfig};
pub use domain::{
    Board, BoardId, Column, ColumnId, ColumnWithTasks, Comment, CommentCounts, CommentId, Task,
    TaskId,
};
pub use error::{CorkboardError, Result};
pub use manager::BoardManager;
pub use reorder::{
    ActiveDrag, DragEndEvent, DragId, DragKind, DragStartEvent, DropTarget, ReorderEngine,
    ReorderOutcome, SkipReason,
};
pub use storage::Store;
