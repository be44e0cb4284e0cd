use crate::domain::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

record_id!(
    /// Identifier of a comment row
    CommentId
);

/// A comment attached to a task. Comments play no part in ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub task_id: TaskId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(task_id: TaskId, content: impl Into<String>) -> Self {
        Self {
            task_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(self, id: CommentId) -> Comment {
        Comment {
            id,
            task_id: self.task_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// Derived, never-persisted count of comments per task.
///
/// The cache has no incremental path: it is rebuilt wholesale whenever
/// comment membership may have changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCounts(HashMap<TaskId, usize>);

impl CommentCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a task; tasks never counted report zero
    pub fn get(&self, task_id: TaskId) -> usize {
        self.0.get(&task_id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, task_id: TaskId, count: usize) {
        self.0.insert(task_id, count);
    }

    pub fn remove(&mut self, task_id: TaskId) {
        self.0.remove(&task_id);
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.0.contains_key(&task_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, usize)> + '_ {
        self.0.iter().map(|(id, count)| (*id, *count))
    }
}

impl FromIterator<(TaskId, usize)> for CommentCounts {
    fn from_iter<I: IntoIterator<Item = (TaskId, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_default_to_zero() {
        let mut counts = CommentCounts::new();
        assert_eq!(counts.get(TaskId::new(4)), 0);
        assert!(!counts.contains(TaskId::new(4)));

        counts.set(TaskId::new(4), 3);
        assert_eq!(counts.get(TaskId::new(4)), 3);
        assert_eq!(counts.len(), 1);

        counts.remove(TaskId::new(4));
        assert!(counts.is_empty());
    }

    #[test]
    fn test_counts_from_iterator() {
        let counts: CommentCounts = vec![(TaskId::new(1), 2), (TaskId::new(2), 0)]
            .into_iter()
            .collect();

        assert_eq!(counts.get(TaskId::new(1)), 2);
        assert!(counts.contains(TaskId::new(2)));
    }
}
