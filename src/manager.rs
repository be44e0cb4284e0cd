//! Board state manager: the canonical in-memory board tree plus every
//! mutation that has to reach the store.
//!
//! The manager is the only owner of the tree. Multi-record operations write
//! first and swap the new state in only after every write went through; a
//! failing write surfaces as [`CorkboardError::PartialWrite`] and leaves
//! memory as it was, so callers can `load()` to reconcile.

use crate::{
    config::CorkboardConfig,
    domain::{
        ordering::append_order, Board, BoardId, ColumnId, ColumnPatch, ColumnWithTasks, Comment,
        CommentCounts, CommentId, NewBoard, NewColumn, NewComment, NewTask, Task, TaskId,
        TaskPatch,
    },
    error::{CorkboardError, Result},
    reorder::plan::{locate_task, ReorderPlan},
    storage::Store,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tracks how far a sequence of independent writes got
struct WriteProgress {
    operation: &'static str,
    planned: usize,
    completed: usize,
}

impl WriteProgress {
    fn new(operation: &'static str, planned: usize) -> Self {
        Self {
            operation,
            planned,
            completed: 0,
        }
    }

    fn step<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.completed += 1;
                Ok(value)
            }
            Err(source) => {
                warn!(
                    operation = self.operation,
                    completed = self.completed,
                    planned = self.planned,
                    error = %source,
                    "write sequence interrupted; store and memory may disagree"
                );
                Err(CorkboardError::PartialWrite {
                    operation: self.operation,
                    completed: self.completed,
                    planned: self.planned,
                    source: Box::new(source),
                })
            }
        }
    }
}

fn require_text(text: &str, empty: CorkboardError) -> Result<()> {
    if text.trim().is_empty() {
        return Err(empty);
    }
    Ok(())
}

/// Owns the board tree (columns → tasks) and the comment count cache
pub struct BoardManager {
    store: Arc<dyn Store>,
    board_id: BoardId,
    columns: Vec<ColumnWithTasks>,
    comment_counts: CommentCounts,
}

impl BoardManager {
    /// Creates an empty manager over an already initialized store. Call
    /// [`BoardManager::load`] to read the board.
    pub fn new(store: Arc<dyn Store>, board_id: BoardId) -> Self {
        Self {
            store,
            board_id,
            columns: Vec::new(),
            comment_counts: CommentCounts::new(),
        }
    }

    /// Opens the configured backend, makes sure the board exists and loads it
    pub async fn open(config: &CorkboardConfig) -> Result<Self> {
        let store = config.storage.open()?;
        store.initialize().await?;

        let mut manager = Self::new(store, config.board_id);
        manager.ensure_board(&config.board_title).await?;
        manager.load().await?;
        Ok(manager)
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Columns in board order, each with its tasks in column order
    pub fn columns(&self) -> &[ColumnWithTasks] {
        &self.columns
    }

    pub fn column(&self, column_id: ColumnId) -> Option<&ColumnWithTasks> {
        self.columns.iter().find(|c| c.id() == column_id)
    }

    /// Position of a task as (column index, task index)
    pub fn locate_task(&self, task_id: TaskId) -> Option<(usize, usize)> {
        locate_task(&self.columns, task_id)
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.locate_task(task_id)
            .map(|(col, idx)| &self.columns[col].tasks[idx])
    }

    pub fn comment_counts(&self) -> &CommentCounts {
        &self.comment_counts
    }

    fn column_index(&self, column_id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id() == column_id)
    }

    /// Inserts the board row if the store does not have it yet
    pub async fn ensure_board(&self, title: &str) -> Result<Board> {
        if let Some(board) = self.store.load_board(self.board_id).await? {
            return Ok(board);
        }

        let new_board = NewBoard::new(title);
        let id = self.store.insert_board(&new_board).await?;
        if id != self.board_id {
            return Err(CorkboardError::BoardNotInitialized(format!(
                "expected board {} but the store created board {}",
                self.board_id, id
            )));
        }

        info!(board_id = %id, title, "board created");
        Ok(new_board.with_id(id))
    }

    /// Reads the whole board from the store and rebuilds the comment count
    /// cache. On failure the current state is kept as is.
    pub async fn load(&mut self) -> Result<()> {
        let columns = self.store.columns_for_board(self.board_id).await?;

        let mut tree = Vec::with_capacity(columns.len());
        for column in columns {
            let tasks = self.store.tasks_for_column(column.id).await?;
            tree.push(ColumnWithTasks::new(column, tasks));
        }

        let counts = self
            .comment_counts_for(tree.iter().flat_map(|c| c.tasks.iter()))
            .await?;

        debug!(
            board_id = %self.board_id,
            columns = tree.len(),
            tasks = counts.len(),
            "board loaded"
        );
        self.columns = tree;
        self.comment_counts = counts;
        Ok(())
    }

    /// Appends a new, empty column at the end of the board
    pub async fn add_column(&mut self, title: &str) -> Result<ColumnId> {
        require_text(title, CorkboardError::EmptyTitle)?;

        let order = append_order(&self.columns);
        let new_column = NewColumn {
            board_id: self.board_id,
            title: title.to_string(),
            order,
        };
        let id = self.store.insert_column(&new_column).await?;

        info!(column_id = %id, order, "column added");
        self.columns
            .push(ColumnWithTasks::empty(new_column.with_id(id)));
        Ok(id)
    }

    /// Appends a new task at the end of a column
    pub async fn add_task(&mut self, column_id: ColumnId, title: &str) -> Result<TaskId> {
        require_text(title, CorkboardError::EmptyTitle)?;

        let col_idx = self
            .column_index(column_id)
            .ok_or_else(|| CorkboardError::ColumnNotFound(column_id.to_string()))?;

        let order = append_order(&self.columns[col_idx].tasks);
        let new_task = NewTask::new(column_id, title, order);
        let id = self.store.insert_task(&new_task).await?;

        info!(task_id = %id, column_id = %column_id, order, "task added");
        self.columns[col_idx].tasks.push(new_task.with_id(id));
        self.comment_counts.set(id, 0);
        Ok(id)
    }

    /// Persists a new column title. Fails if the store has no such column.
    pub async fn rename_column(&mut self, column_id: ColumnId, title: &str) -> Result<()> {
        require_text(title, CorkboardError::EmptyTitle)?;

        self.store
            .update_column(column_id, &ColumnPatch::title(title))
            .await?;

        if let Some(idx) = self.column_index(column_id) {
            self.columns[idx].column.title = title.to_string();
        }
        debug!(column_id = %column_id, "column renamed");
        Ok(())
    }

    /// Deletes a column together with its tasks and their comments
    pub async fn delete_column(&mut self, column_id: ColumnId) -> Result<()> {
        let col_idx = self
            .column_index(column_id)
            .ok_or_else(|| CorkboardError::ColumnNotFound(column_id.to_string()))?;

        let tasks = self.store.tasks_for_column(column_id).await?;
        let mut progress = WriteProgress::new("delete column", tasks.len() * 2 + 1);

        self.delete_tasks_cascading(&tasks, &mut progress).await?;
        progress.step(self.store.delete_column(column_id).await)?;

        info!(column_id = %column_id, tasks = tasks.len(), "column deleted");
        self.columns.remove(col_idx);
        for task in &tasks {
            self.comment_counts.remove(task.id);
        }
        Ok(())
    }

    /// Deletes every task of a column (and their comments) but keeps the
    /// column. Returns the number of tasks removed.
    pub async fn delete_all_cards_in_column(&mut self, column_id: ColumnId) -> Result<usize> {
        let col_idx = self
            .column_index(column_id)
            .ok_or_else(|| CorkboardError::ColumnNotFound(column_id.to_string()))?;

        let tasks = self.store.tasks_for_column(column_id).await?;
        let mut progress = WriteProgress::new("delete all cards", tasks.len() * 2);

        self.delete_tasks_cascading(&tasks, &mut progress).await?;

        info!(column_id = %column_id, tasks = tasks.len(), "all cards deleted");
        self.columns[col_idx].tasks.clear();
        for task in &tasks {
            self.comment_counts.remove(task.id);
        }
        Ok(tasks.len())
    }

    /// Comments first, then the task: the store has no referential integrity
    /// of its own.
    async fn delete_tasks_cascading(
        &self,
        tasks: &[Task],
        progress: &mut WriteProgress,
    ) -> Result<()> {
        for task in tasks {
            let removed = progress.step(self.store.delete_comments_for_task(task.id).await)?;
            progress.step(self.store.delete_task(task.id).await)?;
            debug!(task_id = %task.id, comments = removed, "task deleted");
        }
        Ok(())
    }

    /// Counts comments for each given task
    pub async fn comment_counts_for<'a, I>(&self, tasks: I) -> Result<CommentCounts>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let ids: Vec<TaskId> = tasks.into_iter().map(|t| t.id).collect();

        let mut counts = CommentCounts::new();
        for id in ids {
            let count = self.store.count_comments_for_task(id).await?;
            counts.set(id, count);
        }
        Ok(counts)
    }

    /// Rebuilds the comment count cache for every loaded task
    pub async fn recompute_comment_counts(&mut self) -> Result<&CommentCounts> {
        let counts = self
            .comment_counts_for(self.columns.iter().flat_map(|c| c.tasks.iter()))
            .await?;
        self.comment_counts = counts;
        Ok(&self.comment_counts)
    }

    /// Adds a comment to a task. The count cache is not touched; call
    /// [`BoardManager::recompute_comment_counts`] once the caller is done
    /// editing comments.
    pub async fn add_comment(&self, task_id: TaskId, content: &str) -> Result<Comment> {
        require_text(content, CorkboardError::EmptyComment)?;
        if self.locate_task(task_id).is_none() {
            return Err(CorkboardError::TaskNotFound(task_id.to_string()));
        }

        let new_comment = NewComment::new(task_id, content);
        let id: CommentId = self.store.insert_comment(&new_comment).await?;

        debug!(task_id = %task_id, comment_id = %id, "comment added");
        Ok(new_comment.with_id(id))
    }

    /// Comments of a task, oldest first
    pub async fn comments_for(&self, task_id: TaskId) -> Result<Vec<Comment>> {
        self.store.comments_for_task(task_id).await
    }

    /// Persists a reorder plan and swaps the new slice(s) into the tree.
    ///
    /// Writes go out one at a time in ascending index order. Returns the
    /// number of records written.
    pub async fn commit(&mut self, plan: ReorderPlan) -> Result<usize> {
        match plan {
            ReorderPlan::Columns(columns) => {
                let mut progress = WriteProgress::new("reorder columns", columns.len());
                for column in &columns {
                    progress.step(
                        self.store
                            .update_column(column.id(), &ColumnPatch::order(column.column.order))
                            .await,
                    )?;
                }

                debug!(writes = progress.completed, "columns reordered");
                self.columns = columns;
                Ok(progress.completed)
            }
            ReorderPlan::WithinColumn { column_id, tasks } => {
                let col_idx = self
                    .column_index(column_id)
                    .ok_or_else(|| CorkboardError::ColumnNotFound(column_id.to_string()))?;

                let mut progress = WriteProgress::new("reorder tasks", tasks.len());
                for task in &tasks {
                    progress.step(
                        self.store
                            .update_task(task.id, &TaskPatch::order(task.order))
                            .await,
                    )?;
                }

                debug!(column_id = %column_id, writes = progress.completed, "tasks reordered");
                self.columns[col_idx].tasks = tasks;
                Ok(progress.completed)
            }
            ReorderPlan::AcrossColumns {
                task_id,
                source,
                source_tasks,
                target,
                target_tasks,
            } => {
                let source_idx = self
                    .column_index(source)
                    .ok_or_else(|| CorkboardError::ColumnNotFound(source.to_string()))?;
                let target_idx = self
                    .column_index(target)
                    .ok_or_else(|| CorkboardError::ColumnNotFound(target.to_string()))?;

                let mut progress =
                    WriteProgress::new("move task", source_tasks.len() + target_tasks.len());
                for task in &source_tasks {
                    progress.step(
                        self.store
                            .update_task(task.id, &TaskPatch::order(task.order))
                            .await,
                    )?;
                }
                for task in &target_tasks {
                    progress.step(
                        self.store
                            .update_task(task.id, &TaskPatch::relocate(target, task.order))
                            .await,
                    )?;
                }

                info!(
                    task_id = %task_id,
                    from = %source,
                    to = %target,
                    writes = progress.completed,
                    "task moved across columns"
                );
                self.columns[source_idx].tasks = source_tasks;
                self.columns[target_idx].tasks = target_tasks;
                Ok(progress.completed)
            }
        }
    }
}
