//! Reorder engine: turns drag gestures into new column/task orderings.
//!
//! A gesture is a drag-start followed by a drag-end. Drag-start records the
//! dragged entity as the active ghost for visual feedback; drag-end clears
//! the ghost unconditionally, plans the move against the current board and
//! hands the plan to the [`BoardManager`] to be persisted.

pub mod gesture;
pub mod plan;

pub use gesture::{DragEndEvent, DragId, DragKind, DragStartEvent, DropTarget, Gesture};
pub use plan::{plan_gesture, Decision, ReorderPlan, SkipReason};

use crate::{
    domain::{ColumnWithTasks, Task},
    error::Result,
    manager::BoardManager,
};
use tracing::debug;

/// Snapshot of the entity being dragged, for drawing the drag overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveDrag {
    Column(ColumnWithTasks),
    Task(Task),
}

/// What a drag-end did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Nothing was written
    Skipped(SkipReason),
    /// The new ordering was persisted with this many record writes
    Applied { writes: usize },
}

impl ReorderOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Per-gesture state machine: idle until a drag starts on a known entity,
/// back to idle on every drag-end.
#[derive(Debug, Default)]
pub struct ReorderEngine {
    active: Option<ActiveDrag>,
}

impl ReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entity currently being dragged, if any
    pub fn active(&self) -> Option<&ActiveDrag> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Resolves the dragged entity against the board. Unknown entities leave
    /// the engine idle.
    pub fn drag_start(
        &mut self,
        manager: &BoardManager,
        event: &DragStartEvent,
    ) -> Result<Option<&ActiveDrag>> {
        self.active = None;
        let dragged = event.decode()?;

        self.active = match dragged {
            DragId::Column(id) => manager.column(id).cloned().map(ActiveDrag::Column),
            DragId::Task(id) => manager.task(id).cloned().map(ActiveDrag::Task),
        };

        if self.active.is_none() {
            debug!(dragged = %dragged, "drag started on unknown entity; staying idle");
        }
        Ok(self.active.as_ref())
    }

    /// Finishes a gesture: clears the ghost, then plans and commits the move
    pub async fn drag_end(
        &mut self,
        manager: &mut BoardManager,
        event: &DragEndEvent,
    ) -> Result<ReorderOutcome> {
        self.active = None;

        let gesture = event.decode()?;
        match plan_gesture(manager.columns(), &gesture) {
            Decision::Skip(reason) => {
                debug!(dragged = %gesture.dragged, %reason, "gesture skipped");
                Ok(ReorderOutcome::Skipped(reason))
            }
            Decision::Apply(plan) => {
                let writes = manager.commit(plan).await?;
                Ok(ReorderOutcome::Applied { writes })
            }
        }
    }
}
