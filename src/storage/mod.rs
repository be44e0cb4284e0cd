use crate::{
    domain::{
        Board, BoardId, Column, ColumnId, ColumnPatch, Comment, CommentId, NewBoard, NewColumn,
        NewComment, NewTask, Task, TaskId, TaskPatch,
    },
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;
mod tables;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStore;
#[cfg(feature = "sqlite-storage")]
pub use sqlite_storage::SqliteStorage;

/// Ordered collection store: four auto-increment collections (boards,
/// columns, tasks, comments) with equality queries on their parent key.
///
/// Every call either fully succeeds or fails. The store does not enforce
/// referential integrity; cascades are the caller's job.
#[async_trait]
pub trait Store: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Inserts a board and returns its generated id
    async fn insert_board(&self, board: &NewBoard) -> Result<BoardId>;

    /// Loads a board by id, `None` if absent
    async fn load_board(&self, id: BoardId) -> Result<Option<Board>>;

    /// Inserts a column and returns its generated id
    async fn insert_column(&self, column: &NewColumn) -> Result<ColumnId>;

    /// Updates the given fields of a column; fails if the column does not exist
    async fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> Result<()>;

    /// Deletes a column row (tasks are not touched)
    async fn delete_column(&self, id: ColumnId) -> Result<()>;

    /// Columns of a board, sorted ascending by order
    async fn columns_for_board(&self, board_id: BoardId) -> Result<Vec<Column>>;

    /// Inserts a task and returns its generated id
    async fn insert_task(&self, task: &NewTask) -> Result<TaskId>;

    /// Updates the given fields of a task; fails if the task does not exist
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<()>;

    /// Deletes a task row (comments are not touched)
    async fn delete_task(&self, id: TaskId) -> Result<()>;

    /// Tasks of a column, sorted ascending by order
    async fn tasks_for_column(&self, column_id: ColumnId) -> Result<Vec<Task>>;

    /// Inserts a comment and returns its generated id
    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentId>;

    /// Comments of a task, oldest first
    async fn comments_for_task(&self, task_id: TaskId) -> Result<Vec<Comment>>;

    /// Number of comments attached to a task
    async fn count_comments_for_task(&self, task_id: TaskId) -> Result<usize>;

    /// Deletes every comment of a task and returns how many were removed
    async fn delete_comments_for_task(&self, task_id: TaskId) -> Result<usize>;
}
