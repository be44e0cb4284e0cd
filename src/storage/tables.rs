//! In-process tables shared by the memory and file backends.

use crate::{
    domain::{
        Board, BoardId, Column, ColumnId, ColumnPatch, Comment, CommentId, NewBoard, NewColumn,
        NewComment, NewTask, Task, TaskId, TaskPatch,
    },
    error::{CorkboardError, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One auto-increment collection. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Table<T> {
    last_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> u64 {
        self.last_id += 1;
        let id = self.last_id;
        self.rows.insert(id, build(id));
        id
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn remove(&mut self, id: u64) -> Option<T> {
        self.rows.remove(&id)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

/// The four collections of a board database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    boards: Table<Board>,
    columns: Table<Column>,
    tasks: Table<Task>,
    comments: Table<Comment>,
}

impl Tables {
    pub fn insert_board(&mut self, board: &NewBoard) -> BoardId {
        let id = self
            .boards
            .insert_with(|id| board.clone().with_id(BoardId::new(id)));
        BoardId::new(id)
    }

    pub fn load_board(&self, id: BoardId) -> Option<Board> {
        self.boards.rows.get(&id.get()).cloned()
    }

    pub fn insert_column(&mut self, column: &NewColumn) -> ColumnId {
        let id = self
            .columns
            .insert_with(|id| column.clone().with_id(ColumnId::new(id)));
        ColumnId::new(id)
    }

    pub fn update_column(&mut self, id: ColumnId, patch: &ColumnPatch) -> Result<()> {
        let column = self
            .columns
            .get_mut(id.get())
            .ok_or_else(|| CorkboardError::ColumnNotFound(id.to_string()))?;
        patch.apply(column);
        Ok(())
    }

    pub fn delete_column(&mut self, id: ColumnId) -> Result<()> {
        self.columns
            .remove(id.get())
            .map(|_| ())
            .ok_or_else(|| CorkboardError::ColumnNotFound(id.to_string()))
    }

    pub fn columns_for_board(&self, board_id: BoardId) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .values()
            .filter(|c| c.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by_key(|c| (c.order, c.id));
        columns
    }

    pub fn insert_task(&mut self, task: &NewTask) -> TaskId {
        let id = self
            .tasks
            .insert_with(|id| task.clone().with_id(TaskId::new(id)));
        TaskId::new(id)
    }

    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<()> {
        let task = self
            .tasks
            .get_mut(id.get())
            .ok_or_else(|| CorkboardError::TaskNotFound(id.to_string()))?;
        patch.apply(task);
        Ok(())
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        self.tasks
            .remove(id.get())
            .map(|_| ())
            .ok_or_else(|| CorkboardError::TaskNotFound(id.to_string()))
    }

    pub fn tasks_for_column(&self, column_id: ColumnId) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.column_id == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.order, t.id));
        tasks
    }

    pub fn insert_comment(&mut self, comment: &NewComment) -> CommentId {
        let id = self
            .comments
            .insert_with(|id| comment.clone().with_id(CommentId::new(id)));
        CommentId::new(id)
    }

    pub fn comments_for_task(&self, task_id: TaskId) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        comments
    }

    pub fn count_comments_for_task(&self, task_id: TaskId) -> usize {
        self.comments
            .values()
            .filter(|c| c.task_id == task_id)
            .count()
    }

    pub fn delete_comments_for_task(&mut self, task_id: TaskId) -> usize {
        let before = self.comments.rows.len();
        self.comments.rows.retain(|_, c| c.task_id != task_id);
        before - self.comments.rows.len()
    }
}
