//! Dense order helpers shared by both container levels (board → columns,
//! column → tasks).
//!
//! A container is dense when the `order` values of its children are exactly
//! `0..n` with no gaps and no ties.

use std::collections::HashSet;

/// Anything that carries a rank inside its container
pub trait Ranked {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Converts a sequence index into an order value
pub fn rank(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Order for a child appended to a container: max existing + 1, or 0 when
/// the container is empty.
pub fn next_order<I>(orders: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    orders
        .into_iter()
        .max()
        .map(|max| max.saturating_add(1))
        .unwrap_or(0)
}

/// Order for a child appended after `items`
pub fn append_order<T: Ranked>(items: &[T]) -> u32 {
    next_order(items.iter().map(Ranked::order))
}

/// Single-element list move: removes the element at `from` and reinserts it
/// at `to`. Elements between the two positions shift by one. A `to` past the
/// end appends.
///
/// Returns a new vector and leaves `items` untouched; `None` when `from` is
/// out of range.
///
/// # Examples
/// ```
/// use corkboard_core::domain::ordering::move_item;
///
/// let moved = move_item(&["x", "y", "z"], 2, 0).unwrap();
/// assert_eq!(moved, vec!["z", "x", "y"]);
///
/// let appended = move_item(&["x", "y", "z"], 0, 3).unwrap();
/// assert_eq!(appended, vec!["y", "z", "x"]);
/// ```
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() {
        return None;
    }

    let mut moved = items.to_vec();
    let item = moved.remove(from);
    let to = to.min(moved.len());
    moved.insert(to, item);
    Some(moved)
}

/// Assigns every element its index as order
pub fn reindex<T: Ranked>(mut items: Vec<T>) -> Vec<T> {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(rank(index));
    }
    items
}

/// Checks that the orders are exactly `{0, 1, …, n-1}`
pub fn is_dense<I>(orders: I) -> bool
where
    I: IntoIterator<Item = u32>,
{
    let orders: Vec<u32> = orders.into_iter().collect();
    let n = orders.len();
    let distinct: HashSet<u32> = orders.iter().copied().collect();

    distinct.len() == n && orders.iter().all(|&o| (o as usize) < n)
}
