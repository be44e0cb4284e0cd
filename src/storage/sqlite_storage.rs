use crate::{
    domain::{
        Board, BoardId, Column, ColumnId, ColumnPatch, Comment, CommentId, NewBoard, NewColumn,
        NewComment, NewTask, Task, TaskId, TaskPatch,
    },
    error::{CorkboardError, Result},
    storage::Store,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

/// Busy timeout applied to every connection.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS boards (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    created_at  INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS columns (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    board_id    INTEGER NOT NULL,
    title       TEXT NOT NULL,
    sort_order  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_columns_board ON columns (board_id);
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    column_id   INTEGER NOT NULL,
    title       TEXT NOT NULL,
    sort_order  INTEGER NOT NULL,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_column ON tasks (column_id);
CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id     INTEGER NOT NULL,
    content     TEXT NOT NULL,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_task ON comments (task_id);
";

/// SQLite-based storage backend.
///
/// No foreign keys are declared: cascades are driven by the board manager,
/// the same as for every other backend.
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database file at `database_path`
    pub fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        let path = database_path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let connection = Connection::open(path)?;
        connection.pragma_update(None, "synchronous", "NORMAL")?;
        let _journal_mode: String =
            connection.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        Self::from_connection(connection)
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| CorkboardError::StorageError("sqlite connection lock poisoned".to_string()))
    }
}

fn sql_id(raw: u64) -> i64 {
    i64::try_from(raw).unwrap_or(i64::MAX)
}

fn row_id(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or_default()
}

fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: BoardId::new(row_id(row.get(0)?)),
        title: row.get(1)?,
        created_at: timestamp(row.get(2)?),
    })
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: ColumnId::new(row_id(row.get(0)?)),
        board_id: BoardId::new(row_id(row.get(1)?)),
        title: row.get(2)?,
        order: row.get(3)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::new(row_id(row.get(0)?)),
        column_id: ColumnId::new(row_id(row.get(1)?)),
        title: row.get(2)?,
        order: row.get(3)?,
        created_at: timestamp(row.get(4)?),
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId::new(row_id(row.get(0)?)),
        task_id: TaskId::new(row_id(row.get(1)?)),
        content: row.get(2)?,
        created_at: timestamp(row.get(3)?),
    })
}

#[async_trait]
impl Store for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    async fn insert_board(&self, board: &NewBoard) -> Result<BoardId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO boards (title, created_at) VALUES (?1, ?2)",
            params![board.title, board.created_at.timestamp_millis()],
        )?;
        Ok(BoardId::new(row_id(conn.last_insert_rowid())))
    }

    async fn load_board(&self, id: BoardId) -> Result<Option<Board>> {
        let board = self
            .conn()?
            .query_row(
                "SELECT id, title, created_at FROM boards WHERE id = ?1",
                params![sql_id(id.get())],
                board_from_row,
            )
            .optional()?;
        Ok(board)
    }

    async fn insert_column(&self, column: &NewColumn) -> Result<ColumnId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO columns (board_id, title, sort_order) VALUES (?1, ?2, ?3)",
            params![sql_id(column.board_id.get()), column.title, column.order],
        )?;
        Ok(ColumnId::new(row_id(conn.last_insert_rowid())))
    }

    async fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE columns
             SET title = COALESCE(?1, title), sort_order = COALESCE(?2, sort_order)
             WHERE id = ?3",
            params![patch.title, patch.order, sql_id(id.get())],
        )?;
        if changed == 0 {
            return Err(CorkboardError::ColumnNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_column(&self, id: ColumnId) -> Result<()> {
        let changed = self
            .conn()?
            .execute("DELETE FROM columns WHERE id = ?1", params![sql_id(id.get())])?;
        if changed == 0 {
            return Err(CorkboardError::ColumnNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn columns_for_board(&self, board_id: BoardId) -> Result<Vec<Column>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, board_id, title, sort_order FROM columns
             WHERE board_id = ?1 ORDER BY sort_order, id",
        )?;
        let columns = stmt
            .query_map(params![sql_id(board_id.get())], column_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    async fn insert_task(&self, task: &NewTask) -> Result<TaskId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tasks (column_id, title, sort_order, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                sql_id(task.column_id.get()),
                task.title,
                task.order,
                task.created_at.timestamp_millis()
            ],
        )?;
        Ok(TaskId::new(row_id(conn.last_insert_rowid())))
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<()> {
        let changed = self.conn()?.execute(
            "UPDATE tasks
             SET column_id = COALESCE(?1, column_id), sort_order = COALESCE(?2, sort_order)
             WHERE id = ?3",
            params![
                patch.column_id.map(|c| sql_id(c.get())),
                patch.order,
                sql_id(id.get())
            ],
        )?;
        if changed == 0 {
            return Err(CorkboardError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        let changed = self
            .conn()?
            .execute("DELETE FROM tasks WHERE id = ?1", params![sql_id(id.get())])?;
        if changed == 0 {
            return Err(CorkboardError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn tasks_for_column(&self, column_id: ColumnId) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, column_id, title, sort_order, created_at FROM tasks
             WHERE column_id = ?1 ORDER BY sort_order, id",
        )?;
        let tasks = stmt
            .query_map(params![sql_id(column_id.get())], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO comments (task_id, content, created_at) VALUES (?1, ?2, ?3)",
            params![
                sql_id(comment.task_id.get()),
                comment.content,
                comment.created_at.timestamp_millis()
            ],
        )?;
        Ok(CommentId::new(row_id(conn.last_insert_rowid())))
    }

    async fn comments_for_task(&self, task_id: TaskId) -> Result<Vec<Comment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, task_id, content, created_at FROM comments
             WHERE task_id = ?1 ORDER BY created_at, id",
        )?;
        let comments = stmt
            .query_map(params![sql_id(task_id.get())], comment_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    async fn count_comments_for_task(&self, task_id: TaskId) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM comments WHERE task_id = ?1",
            params![sql_id(task_id.get())],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn delete_comments_for_task(&self, task_id: TaskId) -> Result<usize> {
        let deleted = self.conn()?.execute(
            "DELETE FROM comments WHERE task_id = ?1",
            params![sql_id(task_id.get())],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open() -> SqliteStorage {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_board_roundtrip() {
        let storage = open().await;

        assert!(storage.load_board(BoardId::DEFAULT).await.unwrap().is_none());
        let id = storage.insert_board(&NewBoard::default()).await.unwrap();
        assert_eq!(id, BoardId::DEFAULT);

        let board = storage.load_board(id).await.unwrap().unwrap();
        assert_eq!(board.title, "My Board");
    }

    #[tokio::test]
    async fn test_columns_sorted_by_order() {
        let storage = open().await;
        for (title, order) in [("Done", 2), ("To Do", 0), ("Doing", 1)] {
            storage
                .insert_column(&NewColumn {
                    board_id: BoardId::DEFAULT,
                    title: title.to_string(),
                    order,
                })
                .await
                .unwrap();
        }

        let titles: Vec<String> = storage
            .columns_for_board(BoardId::DEFAULT)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["To Do", "Doing", "Done"]);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let storage = open().await;
        let column = storage
            .insert_column(&NewColumn {
                board_id: BoardId::DEFAULT,
                title: "To Do".to_string(),
                order: 0,
            })
            .await
            .unwrap();

        storage
            .update_column(column, &ColumnPatch::order(3))
            .await
            .unwrap();

        let stored = &storage.columns_for_board(BoardId::DEFAULT).await.unwrap()[0];
        assert_eq!(stored.title, "To Do");
        assert_eq!(stored.order, 3);
    }

    #[tokio::test]
    async fn test_missing_rows_report_not_found() {
        let storage = open().await;

        let err = storage
            .update_task(TaskId::new(1), &TaskPatch::order(0))
            .await
            .unwrap_err();
        assert!(matches!(err, CorkboardError::TaskNotFound(_)));

        let err = storage.delete_column(ColumnId::new(1)).await.unwrap_err();
        assert!(matches!(err, CorkboardError::ColumnNotFound(_)));
    }

    #[tokio::test]
    async fn test_task_and_comment_lifecycle() {
        let storage = open().await;
        let column = ColumnId::new(1);
        let task = storage
            .insert_task(&NewTask::new(column, "Card", 0))
            .await
            .unwrap();
        storage
            .insert_comment(&NewComment::new(task, "looks good"))
            .await
            .unwrap();

        assert_eq!(storage.count_comments_for_task(task).await.unwrap(), 1);
        assert_eq!(
            storage.comments_for_task(task).await.unwrap()[0].content,
            "looks good"
        );

        storage
            .update_task(task, &TaskPatch::relocate(ColumnId::new(2), 0))
            .await
            .unwrap();
        assert!(storage.tasks_for_column(column).await.unwrap().is_empty());

        assert_eq!(storage.delete_comments_for_task(task).await.unwrap(), 1);
        storage.delete_task(task).await.unwrap();
        assert!(storage
            .tasks_for_column(ColumnId::new(2))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("board.sqlite3");

        {
            let storage = SqliteStorage::new(&path).unwrap();
            storage.initialize().await.unwrap();
            storage.insert_board(&NewBoard::new("Roadmap")).await.unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        storage.initialize().await.unwrap();
        let board = storage.load_board(BoardId::DEFAULT).await.unwrap().unwrap();
        assert_eq!(board.title, "Roadmap");
    }
}
