use crate::domain::{column::ColumnId, ordering::Ranked};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

record_id!(
    /// Identifier of a task row
    TaskId
);

/// A task (card) inside a column. `order` is its dense rank in the column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub title: String,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub column_id: ColumnId,
    pub title: String,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Creates an insert payload stamped with the current time
    pub fn new(column_id: ColumnId, title: impl Into<String>, order: u32) -> Self {
        Self {
            column_id,
            title: title.into(),
            order,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            column_id: self.column_id,
            title: self.title,
            order: self.order,
            created_at: self.created_at,
        }
    }
}

/// Partial update of a task. Reorders only ever touch `column_id` and `order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl TaskPatch {
    pub fn order(order: u32) -> Self {
        Self {
            column_id: None,
            order: Some(order),
        }
    }

    pub fn relocate(column_id: ColumnId, order: u32) -> Self {
        Self {
            column_id: Some(column_id),
            order: Some(order),
        }
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(column_id) = self.column_id {
            task.column_id = column_id;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
    }
}

impl Ranked for Task {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_with_id() {
        let task = NewTask::new(ColumnId::new(2), "Write docs", 3).with_id(TaskId::new(10));

        assert_eq!(task.id, TaskId::new(10));
        assert_eq!(task.column_id, ColumnId::new(2));
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.order, 3);
    }

    #[test]
    fn test_relocate_patch() {
        let mut task = NewTask::new(ColumnId::new(1), "Card", 0).with_id(TaskId::new(1));

        TaskPatch::relocate(ColumnId::new(5), 2).apply(&mut task);
        assert_eq!(task.column_id, ColumnId::new(5));
        assert_eq!(task.order, 2);

        TaskPatch::order(0).apply(&mut task);
        assert_eq!(task.column_id, ColumnId::new(5));
        assert_eq!(task.order, 0);
    }

    #[test]
    fn test_task_patch_serialization_skips_missing_fields() {
        let json = serde_json::to_string(&TaskPatch::order(1)).unwrap();
        assert_eq!(json, r#"{"order":1}"#);
    }
}
