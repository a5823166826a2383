#![forbid(unsafe_code)]

//! Row classification for responsive stacking.
//!
//! CSS Grid places items of the same visual row at the same `offsetTop`, so
//! grouping cards by that offset recovers the row structure the browser
//! actually chose. When every row holds a single card and the viewport is
//! narrower than the card maximum width, the grid switches to the stacked
//! layout (`is-stack`).
//!
//! # Invariants
//!
//! 1. Cards sharing an offset land in exactly one row.
//! 2. Rows appear in first-seen order; members keep input order.
//! 3. A grid with no cards produces no decision and no mutation.
//! 4. Classification is idempotent for unchanged measurements.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::host::{GridId, LayoutHost, NodeRef, classes};

/// Cards sharing one vertical offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<T> {
    pub offset_top: i32,
    pub members: Vec<T>,
}

/// Group items by their measured vertical offset.
pub fn group_rows_by_offset_top<T>(items: impl IntoIterator<Item = (T, i32)>) -> Vec<Row<T>> {
    let mut rows: Vec<Row<T>> = Vec::new();
    let mut index: FxHashMap<i32, usize> = FxHashMap::default();
    for (item, offset_top) in items {
        match index.get(&offset_top) {
            Some(&slot) => rows[slot].members.push(item),
            None => {
                index.insert(offset_top, rows.len());
                rows.push(Row {
                    offset_top,
                    members: vec![item],
                });
            }
        }
    }
    rows
}

/// Outcome of classifying one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackDecision {
    pub row_count: usize,
    pub max_per_row: usize,
    pub should_stack: bool,
}

/// Derive the stacking decision from grouped rows.
///
/// Returns `None` when there are no rows.
#[must_use]
pub fn stack_decision<T>(
    rows: &[Row<T>],
    viewport_width: f64,
    card_max_width: f64,
) -> Option<StackDecision> {
    let max_per_row = rows.iter().map(|row| row.members.len()).max()?;
    Some(StackDecision {
        row_count: rows.len(),
        max_per_row,
        should_stack: max_per_row <= 1 && viewport_width < card_max_width,
    })
}

/// Measure `grid` through the host and toggle its `is-stack` class.
pub fn classify_grid<H: LayoutHost>(
    host: &mut H,
    grid: GridId,
    card_max_width: f64,
) -> Option<StackDecision> {
    let cards = host.cards(grid);
    if cards.is_empty() {
        return None;
    }
    let rows = group_rows_by_offset_top(
        cards
            .into_iter()
            .map(|card| (card, host.card_offset_top(card))),
    );
    let decision = stack_decision(&rows, host.viewport_width(), card_max_width)?;
    host.set_class(NodeRef::Grid(grid), classes::IS_STACK, decision.should_stack);
    trace!(
        grid = grid.0,
        rows = decision.row_count,
        max_per_row = decision.max_per_row,
        stacked = decision.should_stack,
        "grid classified"
    );
    Some(decision)
}
