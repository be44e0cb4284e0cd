use crate::{
    domain::{
        Board, BoardId, Column, ColumnId, ColumnPatch, Comment, CommentId, NewBoard, NewColumn,
        NewComment, NewTask, Task, TaskId, TaskPatch,
    },
    error::{CorkboardError, Result},
    storage::{tables::Tables, Store},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};

/// File-based storage implementation.
///
/// All four collections live in one JSON document. Every write loads the
/// document, applies the change and writes it back, serialized by an async
/// mutex so two writes from the same process never interleave.
pub struct FileStorage {
    root_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".corkboard";
    const DB_FILE: &'static str = "board.json";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
            write_lock: Mutex::new(()),
        }
    }

    fn db_file(&self) -> PathBuf {
        self.root_path.join(Self::DB_FILE)
    }

    /// Checks if the storage directory and database file exist
    pub async fn is_initialized(&self) -> bool {
        fs::try_exists(self.db_file()).await.unwrap_or(false)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !fs::try_exists(path).await? {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn load_tables(&self) -> Result<Tables> {
        let db_file = self.db_file();

        if !fs::try_exists(&db_file).await? {
            return Err(CorkboardError::BoardNotInitialized(
                db_file.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&db_file).await?;
        let tables: Tables = serde_json::from_str(&contents)?;

        Ok(tables)
    }

    async fn save_tables(&self, tables: &Tables) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(tables)?;
        fs::write(self.db_file(), json).await?;

        Ok(())
    }

    async fn read<T: Send>(&self, op: impl FnOnce(&Tables) -> T + Send) -> Result<T> {
        let tables = self.load_tables().await?;
        Ok(op(&tables))
    }

    async fn write<T: Send>(
        &self,
        op: impl FnOnce(&mut Tables) -> Result<T> + Send,
    ) -> Result<T> {
        let _guard = self.write_lock.lock().await;
        let mut tables = self.load_tables().await?;
        let value = op(&mut tables)?;
        self.save_tables(&tables).await?;
        Ok(value)
    }
}

#[async_trait]
impl Store for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.is_initialized().await {
            self.save_tables(&Tables::default()).await?;
        }

        Ok(())
    }

    async fn insert_board(&self, board: &NewBoard) -> Result<BoardId> {
        self.write(|t| Ok(t.insert_board(board))).await
    }

    async fn load_board(&self, id: BoardId) -> Result<Option<Board>> {
        self.read(|t| t.load_board(id)).await
    }

    async fn insert_column(&self, column: &NewColumn) -> Result<ColumnId> {
        self.write(|t| Ok(t.insert_column(column))).await
    }

    async fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> Result<()> {
        self.write(|t| t.update_column(id, patch)).await
    }

    async fn delete_column(&self, id: ColumnId) -> Result<()> {
        self.write(|t| t.delete_column(id)).await
    }

    async fn columns_for_board(&self, board_id: BoardId) -> Result<Vec<Column>> {
        self.read(|t| t.columns_for_board(board_id)).await
    }

    async fn insert_task(&self, task: &NewTask) -> Result<TaskId> {
        self.write(|t| Ok(t.insert_task(task))).await
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<()> {
        self.write(|t| t.update_task(id, patch)).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<()> {
        self.write(|t| t.delete_task(id)).await
    }

    async fn tasks_for_column(&self, column_id: ColumnId) -> Result<Vec<Task>> {
        self.read(|t| t.tasks_for_column(column_id)).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<CommentId> {
        self.write(|t| Ok(t.insert_comment(comment))).await
    }

    async fn comments_for_task(&self, task_id: TaskId) -> Result<Vec<Comment>> {
        self.read(|t| t.comments_for_task(task_id)).await
    }

    async fn count_comments_for_task(&self, task_id: TaskId) -> Result<usize> {
        self.read(|t| t.count_comments_for_task(task_id)).await
    }

    async fn delete_comments_for_task(&self, task_id: TaskId) -> Result<usize> {
        self.write(|t| Ok(t.delete_comments_for_task(task_id))).await
    }
}
