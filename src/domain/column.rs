use crate::domain::{
    board::BoardId,
    ordering::Ranked,
    task::{Task, TaskId},
};
use serde::{Deserialize, Serialize};

record_id!(
    /// Identifier of a column row
    ColumnId
);

/// A column on a board. `order` is its dense rank among the board's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub order: u32,
}

/// Insert payload for a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub board_id: BoardId,
    pub title: String,
    pub order: u32,
}

impl NewColumn {
    pub fn with_id(self, id: ColumnId) -> Column {
        Column {
            id,
            board_id: self.board_id,
            title: self.title,
            order: self.order,
        }
    }
}

/// Partial update of a column; `None` fields are left as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl ColumnPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn order(order: u32) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn apply(&self, column: &mut Column) {
        if let Some(title) = &self.title {
            column.title = title.clone();
        }
        if let Some(order) = self.order {
            column.order = order;
        }
    }
}

/// A column together with its tasks, sorted by task order. This is the
/// node of the in-memory board tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

impl ColumnWithTasks {
    pub fn new(column: Column, tasks: Vec<Task>) -> Self {
        Self { column, tasks }
    }

    pub fn empty(column: Column) -> Self {
        Self::new(column, Vec::new())
    }

    pub fn id(&self) -> ColumnId {
        self.column.id
    }

    /// Index of a task within this column
    pub fn position_of(&self, task_id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}

impl Ranked for Column {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

impl Ranked for ColumnWithTasks {
    fn order(&self) -> u32 {
        self.column.order
    }

    fn set_order(&mut self, order: u32) {
        self.column.order = order;
    }
}
