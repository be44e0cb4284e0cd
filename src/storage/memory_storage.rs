use crate::{
    domain::{
        Board, BoardId, Column, ColumnId, ColumnPatch, Comment, CommentId, NewBoard, NewColumn,
        NewComment, NewTask, Task, TaskId, TaskPatch,
    },
    error::{CorkboardError, Result},
    storage::{tables::Tables, Store},
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// Volatile storage backend. Counts every write (insert, update, delete)
/// and can be told to start failing after a number of writes, which is how
/// partial-write behaviour is exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    writes: usize,
    fail_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.lock().map(|inner| inner.writes).unwrap_or(0)
    }

    /// Lets `remaining` more writes succeed, then rejects every write
    pub fn fail_after_writes(&self, remaining: usize) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_after = Some(inner.writes + remaining);
        }
    }

    /// Clears any injected failure
    pub fn heal(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_after = None;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| CorkboardError::StorageError("memory store lock poisoned".to_string()))
    }

    fn read<T>(&self, op: impl FnOnce(&Tables) -> T) -> Result<T> {
        let inner = self.lock()?;
        Ok(op(&inner.tables))
    }

    fn write<T>(&self, op: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut inner = self.lock()?;
        if inner.fail_after.is_some_and(|limit| inner.writes >= limit) {
            return Err(CorkboardError::StorageError(
                "write rejected by memory store".to_string(),
            ));
        }
        let value = op(&mut inner.tables)?;
        inner.writes += 1;
        Ok(value)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_board(&self, board: &NewBoard) -> Result<BoardId> {
        self.write(|t| Ok(t.insert_board(board)))
    }

    async fn load_board(&self, id: BoardId) -> Result<Option<Board>> {
        self.read(|t| t.load_board(id))
    }

    async fn insert_column(&self, column: &NewColumn) -> Result<ColumnId> {
        self.write(|t| Ok(t.insert_column(column)))
    }

    async fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> Result<()> {
        self.write(|t| t.update_column(id, patch))
    }

    async fn delete_column(&self, id: ColumnId) -> Result<()> {
        self.write(|t| t.delete_column(id))
    }

    async fn columns_for_board(&self, board_id: BoardId) -> Result<Vec<Column>> {
        self.read(|t| t.columns_for_board(board_id))
    }

    async fn insert_task(&self, task: &NewTask) -> Result<TaskId> {
        self.write(|t| Ok(t.insert_task(task)))
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<()> {
        self.write(|t| t.update_task(id, patch))
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.write(|t| t.delete_task(id))
    }

    async fn tasks_for_column(&self, column_id: ColumnId) -> Result<Vec<Task>> {
        self.read(|t| t.tasks_for_column(column_id))
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentId> {
        self.write(|t| Ok(t.insert_comment(comment)))
    }

    async fn comments_for_task(&self, task_id: TaskId) -> Result<Vec<Comment>> {
        self.read(|t| t.comments_for_task(task_id))
    }

    async fn count_comments_for_task(&self, task_id: TaskId) -> Result<usize> {
        self.read(|t| t.count_comments_for_task(task_id))
    }

    async fn delete_comments_for_task(&self, task_id: TaskId) -> Result<usize> {
        self.write(|t| Ok(t.delete_comments_for_task(task_id)))
    }
}
