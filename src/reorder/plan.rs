//! Pure reorder planning.
//!
//! Every function here reads a snapshot of the board and builds brand-new
//! sequences; the snapshot is never mutated. The resulting [`ReorderPlan`]
//! already carries dense orders and is handed to the board manager to be
//! persisted and swapped in.

use crate::{
    domain::{
        ordering::{move_item, reindex},
        ColumnId, ColumnWithTasks, Task, TaskId,
    },
    reorder::gesture::{DragId, DropTarget, Gesture},
};
use std::fmt;

/// New ordering for one or two containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPlan {
    /// The whole column sequence, every column reindexed
    Columns(Vec<ColumnWithTasks>),
    /// One column's tasks, reindexed
    WithinColumn {
        column_id: ColumnId,
        tasks: Vec<Task>,
    },
    /// A task moved between columns; both task lists reindexed and every
    /// task of the target list pointing at the target column
    AcrossColumns {
        task_id: TaskId,
        source: ColumnId,
        source_tasks: Vec<Task>,
        target: ColumnId,
        target_tasks: Vec<Task>,
    },
}

impl ReorderPlan {
    /// Number of records the plan rewrites
    pub fn write_count(&self) -> usize {
        match self {
            Self::Columns(columns) => columns.len(),
            Self::WithinColumn { tasks, .. } => tasks.len(),
            Self::AcrossColumns {
                source_tasks,
                target_tasks,
                ..
            } => source_tasks.len() + target_tasks.len(),
        }
    }
}

/// Why a gesture produced no mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Released outside any droppable
    NoDropTarget,
    /// Dropped onto its own current position
    SelfDrop,
    /// The dragged entity is no longer on the board
    SourceMissing,
    /// The drop target is no longer on the board, or is not a valid target
    /// for the dragged kind
    TargetMissing,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDropTarget => write!(f, "no drop target"),
            Self::SelfDrop => write!(f, "dropped on itself"),
            Self::SourceMissing => write!(f, "dragged entity not found"),
            Self::TargetMissing => write!(f, "drop target not found"),
        }
    }
}

/// Outcome of planning a gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Apply(ReorderPlan),
    Skip(SkipReason),
}

/// Plans a decoded drag-end against the current board
pub fn plan_gesture(columns: &[ColumnWithTasks], gesture: &Gesture) -> Decision {
    let over = match gesture.drop_target {
        None => return Decision::Skip(SkipReason::NoDropTarget),
        Some(DropTarget::Unresolved) => return Decision::Skip(SkipReason::TargetMissing),
        Some(DropTarget::Entity(over)) => over,
    };

    match gesture.dragged {
        DragId::Column(active) => plan_column_move(columns, active, over),
        DragId::Task(active) => plan_task_move(columns, active, over),
    }
}

/// Position of a task as (column index, task index)
pub fn locate_task(columns: &[ColumnWithTasks], task_id: TaskId) -> Option<(usize, usize)> {
    columns.iter().enumerate().find_map(|(col_idx, column)| {
        column
            .position_of(task_id)
            .map(|task_idx| (col_idx, task_idx))
    })
}

fn column_index(columns: &[ColumnWithTasks], column_id: ColumnId) -> Option<usize> {
    columns.iter().position(|c| c.id() == column_id)
}

/// Moves `active` to the position currently held by the column it was
/// dropped on.
pub fn plan_column_move(columns: &[ColumnWithTasks], active: ColumnId, over: DragId) -> Decision {
    // Columns only reorder against other columns.
    let DragId::Column(over) = over else {
        return Decision::Skip(SkipReason::TargetMissing);
    };

    if active == over {
        return Decision::Skip(SkipReason::SelfDrop);
    }

    let Some(old_index) = column_index(columns, active) else {
        return Decision::Skip(SkipReason::SourceMissing);
    };
    let Some(new_index) = column_index(columns, over) else {
        return Decision::Skip(SkipReason::TargetMissing);
    };

    match move_item(columns, old_index, new_index) {
        Some(moved) => Decision::Apply(ReorderPlan::Columns(reindex(moved))),
        None => Decision::Skip(SkipReason::SourceMissing),
    }
}

/// Moves a task onto another task's position, or to the end of a column
/// when dropped on the column itself.
pub fn plan_task_move(columns: &[ColumnWithTasks], active: TaskId, over: DragId) -> Decision {
    let Some((source_col, source_idx)) = locate_task(columns, active) else {
        return Decision::Skip(SkipReason::SourceMissing);
    };

    let target = match over {
        DragId::Task(over_task) => locate_task(columns, over_task),
        DragId::Column(over_column) => {
            column_index(columns, over_column).map(|idx| (idx, columns[idx].tasks.len()))
        }
    };
    let Some((target_col, target_idx)) = target else {
        return Decision::Skip(SkipReason::TargetMissing);
    };

    if source_col == target_col {
        plan_within_column(&columns[source_col], source_idx, target_idx)
    } else {
        plan_across_columns(
            &columns[source_col],
            source_idx,
            &columns[target_col],
            target_idx,
        )
    }
}

fn plan_within_column(column: &ColumnWithTasks, from: usize, to: usize) -> Decision {
    // After removing the dragged task the last slot is len - 1, so dropping a
    // task on its own column's empty area while it is already last is a
    // self-drop as well.
    let to = to.min(column.tasks.len().saturating_sub(1));
    if from == to {
        return Decision::Skip(SkipReason::SelfDrop);
    }

    match move_item(&column.tasks, from, to) {
        Some(moved) => Decision::Apply(ReorderPlan::WithinColumn {
            column_id: column.id(),
            tasks: reindex(moved),
        }),
        None => Decision::Skip(SkipReason::SourceMissing),
    }
}

fn plan_across_columns(
    source: &ColumnWithTasks,
    from: usize,
    target: &ColumnWithTasks,
    to: usize,
) -> Decision {
    let Some(moved) = source.tasks.get(from).cloned() else {
        return Decision::Skip(SkipReason::SourceMissing);
    };

    let source_tasks: Vec<Task> = source
        .tasks
        .iter()
        .filter(|t| t.id != moved.id)
        .cloned()
        .collect();

    let mut target_tasks = target.tasks.clone();
    let task_id = moved.id;
    target_tasks.insert(to.min(target_tasks.len()), moved);
    for task in &mut target_tasks {
        task.column_id = target.id();
    }

    Decision::Apply(ReorderPlan::AcrossColumns {
        task_id,
        source: source.id(),
        source_tasks: reindex(source_tasks),
        target: target.id(),
        target_tasks: reindex(target_tasks),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ordering::is_dense, BoardId, Column};
    use chrono::Utc;
    use proptest::prelude::*;

    fn task(id: u64, column: u64, order: u32) -> Task {
        Task {
            id: TaskId::new(id),
            column_id: ColumnId::new(column),
            title: format!("Task {}", id),
            order,
            created_at: Utc::now(),
        }
    }

    fn column(id: u64, order: u32, task_ids: &[u64]) -> ColumnWithTasks {
        ColumnWithTasks::new(
            Column {
                id: ColumnId::new(id),
                board_id: BoardId::DEFAULT,
                title: format!("Column {}", id),
                order,
            },
            task_ids
                .iter()
                .enumerate()
                .map(|(i, t)| task(*t, id, i as u32))
                .collect(),
        )
    }

    fn gesture(dragged: DragId, over: Option<DragId>) -> Gesture {
        Gesture {
            dragged,
            drop_target: over.map(DropTarget::from),
        }
    }

    fn col(id: u64) -> DragId {
        DragId::Column(ColumnId::new(id))
    }

    fn tsk(id: u64) -> DragId {
        DragId::Task(TaskId::new(id))
    }

    fn ids(tasks: &[Task]) -> Vec<u64> {
        tasks.iter().map(|t| t.id.get()).collect()
    }

    fn orders(tasks: &[Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.order).collect()
    }

    #[test]
    fn test_unresolved_drop_target_is_skipped() {
        let board = vec![column(1, 0, &[10]), column(2, 1, &[])];
        let gesture = Gesture {
            dragged: tsk(10),
            drop_target: Some(DropTarget::Unresolved),
        };

        assert_eq!(
            plan_gesture(&board, &gesture),
            Decision::Skip(SkipReason::TargetMissing)
        );
    }

    #[test]
    fn test_no_drop_target_is_skipped() {
        let board = vec![column(1, 0, &[10])];
        assert_eq!(
            plan_gesture(&board, &gesture(tsk(10), None)),
            Decision::Skip(SkipReason::NoDropTarget)
        );
    }

    #[test]
    fn test_column_move_is_list_move() {
        // X(0), Y(1), Z(2): Z dropped on X
        let board = vec![column(1, 0, &[]), column(2, 1, &[]), column(3, 2, &[])];

        let Decision::Apply(ReorderPlan::Columns(columns)) =
            plan_gesture(&board, &gesture(col(3), Some(col(1))))
        else {
            panic!("expected a column plan");
        };

        let result: Vec<(u64, u32)> = columns
            .iter()
            .map(|c| (c.id().get(), c.column.order))
            .collect();
        assert_eq!(result, vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_column_self_drop() {
        let board = vec![column(1, 0, &[]), column(2, 1, &[])];
        assert_eq!(
            plan_gesture(&board, &gesture(col(2), Some(col(2)))),
            Decision::Skip(SkipReason::SelfDrop)
        );
    }

    #[test]
    fn test_column_move_with_vanished_columns() {
        let board = vec![column(1, 0, &[]), column(2, 1, &[])];
        assert_eq!(
            plan_gesture(&board, &gesture(col(9), Some(col(1)))),
            Decision::Skip(SkipReason::SourceMissing)
        );
        assert_eq!(
            plan_gesture(&board, &gesture(col(1), Some(col(9)))),
            Decision::Skip(SkipReason::TargetMissing)
        );
    }

    #[test]
    fn test_column_dropped_on_task_is_skipped() {
        let board = vec![column(1, 0, &[]), column(2, 1, &[20])];
        assert_eq!(
            plan_gesture(&board, &gesture(col(1), Some(tsk(20)))),
            Decision::Skip(SkipReason::TargetMissing)
        );
    }

    #[test]
    fn test_task_move_within_column() {
        let board = vec![column(1, 0, &[10, 11])];

        let Decision::Apply(ReorderPlan::WithinColumn { column_id, tasks }) =
            plan_gesture(&board, &gesture(tsk(10), Some(tsk(11))))
        else {
            panic!("expected a within-column plan");
        };

        assert_eq!(column_id, ColumnId::new(1));
        assert_eq!(ids(&tasks), vec![11, 10]);
        assert_eq!(orders(&tasks), vec![0, 1]);
    }

    #[test]
    fn test_task_self_drops() {
        let board = vec![column(1, 0, &[10, 11])];

        assert_eq!(
            plan_gesture(&board, &gesture(tsk(11), Some(tsk(11)))),
            Decision::Skip(SkipReason::SelfDrop)
        );
        // Last task dropped on its own column's empty area
        assert_eq!(
            plan_gesture(&board, &gesture(tsk(11), Some(col(1)))),
            Decision::Skip(SkipReason::SelfDrop)
        );
    }

    #[test]
    fn test_task_dropped_on_own_column_moves_to_end() {
        let board = vec![column(1, 0, &[10, 11, 12])];

        let Decision::Apply(ReorderPlan::WithinColumn { tasks, .. }) =
            plan_gesture(&board, &gesture(tsk(10), Some(col(1))))
        else {
            panic!("expected a within-column plan");
        };

        assert_eq!(ids(&tasks), vec![11, 12, 10]);
    }

    #[test]
    fn test_task_dropped_on_empty_column_appends() {
        let board = vec![column(1, 0, &[10]), column(2, 1, &[])];

        let Decision::Apply(ReorderPlan::AcrossColumns {
            task_id,
            source,
            source_tasks,
            target,
            target_tasks,
        }) = plan_gesture(&board, &gesture(tsk(10), Some(col(2))))
        else {
            panic!("expected a cross-column plan");
        };

        assert_eq!(task_id, TaskId::new(10));
        assert_eq!(source, ColumnId::new(1));
        assert!(source_tasks.is_empty());
        assert_eq!(target, ColumnId::new(2));
        assert_eq!(ids(&target_tasks), vec![10]);
        assert_eq!(target_tasks[0].order, 0);
        assert_eq!(target_tasks[0].column_id, ColumnId::new(2));
    }

    #[test]
    fn test_task_dropped_on_task_in_other_column() {
        let board = vec![column(1, 0, &[10, 11, 12]), column(2, 1, &[20, 21])];

        let Decision::Apply(plan) = plan_gesture(&board, &gesture(tsk(11), Some(tsk(21)))) else {
            panic!("expected a plan");
        };
        assert_eq!(plan.write_count(), 5);

        let ReorderPlan::AcrossColumns {
            source_tasks,
            target_tasks,
            ..
        } = plan
        else {
            panic!("expected a cross-column plan");
        };

        assert_eq!(ids(&source_tasks), vec![10, 12]);
        assert_eq!(orders(&source_tasks), vec![0, 1]);
        assert_eq!(ids(&target_tasks), vec![20, 11, 21]);
        assert_eq!(orders(&target_tasks), vec![0, 1, 2]);
        assert!(target_tasks
            .iter()
            .all(|t| t.column_id == ColumnId::new(2)));
    }

    #[test]
    fn test_task_with_vanished_endpoints() {
        let board = vec![column(1, 0, &[10])];
        assert_eq!(
            plan_gesture(&board, &gesture(tsk(99), Some(tsk(10)))),
            Decision::Skip(SkipReason::SourceMissing)
        );
        assert_eq!(
            plan_gesture(&board, &gesture(tsk(10), Some(tsk(99)))),
            Decision::Skip(SkipReason::TargetMissing)
        );
        assert_eq!(
            plan_gesture(&board, &gesture(tsk(10), Some(col(99)))),
            Decision::Skip(SkipReason::TargetMissing)
        );
    }

    #[test]
    fn test_planning_does_not_touch_snapshot() {
        let board = vec![column(1, 0, &[10, 11]), column(2, 1, &[20])];
        let before = board.clone();

        let _ = plan_gesture(&board, &gesture(tsk(10), Some(tsk(20))));
        let _ = plan_gesture(&board, &gesture(col(2), Some(col(1))));

        assert_eq!(board, before);
    }

    /// Applies a plan to a snapshot the way the board manager swaps slices in
    fn apply(board: &mut Vec<ColumnWithTasks>, plan: ReorderPlan) {
        match plan {
            ReorderPlan::Columns(columns) => *board = columns,
            ReorderPlan::WithinColumn { column_id, tasks } => {
                if let Some(c) = board.iter_mut().find(|c| c.id() == column_id) {
                    c.tasks = tasks;
                }
            }
            ReorderPlan::AcrossColumns {
                source,
                source_tasks,
                target,
                target_tasks,
                ..
            } => {
                for c in board.iter_mut() {
                    if c.id() == source {
                        c.tasks = source_tasks.clone();
                    } else if c.id() == target {
                        c.tasks = target_tasks.clone();
                    }
                }
            }
        }
    }

    fn arb_board() -> impl Strategy<Value = Vec<ColumnWithTasks>> {
        prop::collection::vec(0usize..5, 1..5).prop_map(|sizes| {
            let mut next_task = 100;
            sizes
                .iter()
                .enumerate()
                .map(|(i, size)| {
                    let task_ids: Vec<u64> = (0..*size)
                        .map(|_| {
                            next_task += 1;
                            next_task
                        })
                        .collect();
                    column(i as u64 + 1, i as u32, &task_ids)
                })
                .collect()
        })
    }

    fn arb_drag_id() -> impl Strategy<Value = DragId> {
        prop_oneof![
            (1u64..6).prop_map(|id| DragId::Column(ColumnId::new(id))),
            (100u64..122).prop_map(|id| DragId::Task(TaskId::new(id))),
        ]
    }

    proptest! {
        #[test]
        fn prop_orders_stay_dense(
            board in arb_board(),
            moves in prop::collection::vec((arb_drag_id(), arb_drag_id()), 0..20),
        ) {
            let mut board = board;
            let total_tasks: usize = board.iter().map(|c| c.tasks.len()).sum();

            for (dragged, over) in moves {
                if let Decision::Apply(plan) = plan_gesture(&board, &gesture(dragged, Some(over))) {
                    apply(&mut board, plan);
                }

                prop_assert!(is_dense(board.iter().map(|c| c.column.order)));
                for c in &board {
                    prop_assert!(is_dense(c.tasks.iter().map(|t| t.order)));
                    prop_assert!(c.tasks.iter().all(|t| t.column_id == c.id()));
                }
                let now: usize = board.iter().map(|c| c.tasks.len()).sum();
                prop_assert_eq!(now, total_tasks);
            }
        }
    }
}
