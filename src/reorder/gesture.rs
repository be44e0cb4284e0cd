//! Drag gesture events as reported by the rendering surface, and their typed
//! decoding.
//!
//! Draggable and droppable identifiers travel as prefixed strings
//! (`column-3`, `task-17`). They are decoded exactly once, here, into a
//! [`DragId`]; nothing past this module looks at the string form again.

use crate::{
    domain::{ColumnId, TaskId},
    error::{CorkboardError, Result},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Which level of the board a dragged entity lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Column,
    Task,
}

impl DragKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Column => "column-",
            Self::Task => "task-",
        }
    }
}

impl fmt::Display for DragKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column => write!(f, "column"),
            Self::Task => write!(f, "task"),
        }
    }
}

impl FromStr for DragKind {
    type Err = CorkboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "column" => Ok(Self::Column),
            "task" => Ok(Self::Task),
            _ => Err(CorkboardError::InvalidDragId(format!("unknown kind '{}'", s))),
        }
    }
}

/// A draggable or droppable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragId {
    Column(ColumnId),
    Task(TaskId),
}

impl DragId {
    pub fn kind(&self) -> DragKind {
        match self {
            Self::Column(_) => DragKind::Column,
            Self::Task(_) => DragKind::Task,
        }
    }

    /// Decodes an identifier and checks it against the carried kind tag
    pub fn decode(id: &str, kind: DragKind) -> Result<Self> {
        let decoded: DragId = id.parse()?;
        if decoded.kind() != kind {
            return Err(CorkboardError::InvalidDragId(format!(
                "'{}' is not a {} identifier",
                id, kind
            )));
        }
        Ok(decoded)
    }
}

impl fmt::Display for DragId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(id) => write!(f, "{}{}", DragKind::Column.prefix(), id),
            Self::Task(id) => write!(f, "{}{}", DragKind::Task.prefix(), id),
        }
    }
}

impl FromStr for DragId {
    type Err = CorkboardError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CorkboardError::InvalidDragId(s.to_string());

        if let Some(raw) = s.strip_prefix(DragKind::Column.prefix()) {
            raw.parse::<u64>()
                .map(|id| Self::Column(ColumnId::new(id)))
                .map_err(|_| invalid())
        } else if let Some(raw) = s.strip_prefix(DragKind::Task.prefix()) {
            raw.parse::<u64>()
                .map(|id| Self::Task(TaskId::new(id)))
                .map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    }
}

impl Serialize for DragId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DragId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw drag-start event from the rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragStartEvent {
    pub dragged_id: String,
    pub kind: DragKind,
}

impl DragStartEvent {
    pub fn new(dragged: DragId) -> Self {
        Self {
            dragged_id: dragged.to_string(),
            kind: dragged.kind(),
        }
    }

    pub fn decode(&self) -> Result<DragId> {
        DragId::decode(&self.dragged_id, self.kind)
    }
}

/// Raw drag-end event. `drop_target_id` is `None` when the pointer was
/// released outside any droppable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEndEvent {
    pub dragged_id: String,
    pub kind: DragKind,
    #[serde(default)]
    pub drop_target_id: Option<String>,
}

impl DragEndEvent {
    pub fn new(dragged: DragId, drop_target: Option<DragId>) -> Self {
        Self {
            dragged_id: dragged.to_string(),
            kind: dragged.kind(),
            drop_target_id: drop_target.map(|t| t.to_string()),
        }
    }

    /// Decodes the event. The dragged id must be well formed; a drop target
    /// that is not a column or task id decodes as [`DropTarget::Unresolved`].
    pub fn decode(&self) -> Result<Gesture> {
        let dragged = DragId::decode(&self.dragged_id, self.kind)?;
        let drop_target = self.drop_target_id.as_deref().map(DropTarget::resolve);
        Ok(Gesture {
            dragged,
            drop_target,
        })
    }
}

/// What a gesture was released over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Entity(DragId),
    /// A droppable that is neither a column nor a task
    Unresolved,
}

impl DropTarget {
    fn resolve(id: &str) -> Self {
        id.parse().map(Self::Entity).unwrap_or(Self::Unresolved)
    }
}

impl From<DragId> for DropTarget {
    fn from(id: DragId) -> Self {
        Self::Entity(id)
    }
}

/// A decoded drag-end: what was dragged and what it was dropped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub dragged: DragId,
    pub drop_target: Option<DropTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_id_parsing() {
        assert_eq!(
            "column-3".parse::<DragId>().unwrap(),
            DragId::Column(ColumnId::new(3))
        );
        assert_eq!(
            "task-17".parse::<DragId>().unwrap(),
            DragId::Task(TaskId::new(17))
        );
        assert_eq!(DragId::Task(TaskId::new(17)).to_string(), "task-17");
    }

    #[test]
    fn test_drag_id_rejects_malformed() {
        for bad in ["", "3", "column-", "column-x", "card-1", "task--1", "Task-1"] {
            let err = bad.parse::<DragId>().unwrap_err();
            assert!(matches!(err, CorkboardError::InvalidDragId(_)), "{}", bad);
        }
    }

    #[test]
    fn test_kind_tag_must_match_prefix() {
        assert!(DragId::decode("column-1", DragKind::Column).is_ok());
        assert!(DragId::decode("column-1", DragKind::Task).is_err());
        assert!(DragId::decode("task-1", DragKind::Column).is_err());
    }

    #[test]
    fn test_drag_end_decoding() {
        let event = DragEndEvent::new(
            DragId::Task(TaskId::new(10)),
            Some(DragId::Column(ColumnId::new(2))),
        );
        let gesture = event.decode().unwrap();

        assert_eq!(gesture.dragged, DragId::Task(TaskId::new(10)));
        assert_eq!(
            gesture.drop_target,
            Some(DropTarget::Entity(DragId::Column(ColumnId::new(2))))
        );
    }

    #[test]
    fn test_drag_end_from_json() {
        let event: DragEndEvent =
            serde_json::from_str(r#"{"dragged_id": "column-4", "kind": "column"}"#).unwrap();
        let gesture = event.decode().unwrap();

        assert_eq!(gesture.dragged, DragId::Column(ColumnId::new(4)));
        assert!(gesture.drop_target.is_none());
    }

    #[test]
    fn test_foreign_drop_target_is_unresolved() {
        let event = DragEndEvent {
            dragged_id: "task-3".to_string(),
            kind: DragKind::Task,
            drop_target_id: Some("trash-zone".to_string()),
        };
        let gesture = event.decode().unwrap();

        assert_eq!(gesture.dragged, DragId::Task(TaskId::new(3)));
        assert_eq!(gesture.drop_target, Some(DropTarget::Unresolved));

        let bad_dragged = DragEndEvent {
            dragged_id: "trash-zone".to_string(),
            kind: DragKind::Task,
            drop_target_id: Some("column-1".to_string()),
        };
        assert!(matches!(
            bad_dragged.decode(),
            Err(CorkboardError::InvalidDragId(_))
        ));
    }

    #[test]
    fn test_drag_id_serializes_as_string() {
        let json = serde_json::to_string(&DragId::Column(ColumnId::new(9))).unwrap();
        assert_eq!(json, r#""column-9""#);

        let back: DragId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DragId::Column(ColumnId::new(9)));
    }
}
