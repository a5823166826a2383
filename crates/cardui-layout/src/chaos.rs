#![forbid(unsafe_code)]

//! Chaos mode: the grid becomes a free-drag canvas.
//!
//! Entering chaos mode lifts every card out of the grid flow into an
//! absolutely positioned box at the place it was last drawn, and grows the
//! grid so that all cards stay inside it. Exiting puts every inline style
//! back exactly as it was found.
//!
//! # State Machine
//!
//! ```text
//!   Idle ──enter()──▶ Active ──exit()──▶ Idle
//!                      │  ▲
//!          pointer_down│  │pointer_up / cancel / lost capture
//!                      ▼  │
//!                  (per-pointer Drag records)
//! ```
//!
//! # Invariants
//!
//! 1. Every snapshotted card belongs to exactly one grid.
//! 2. A [`Drag`] exists only while its pointer is down and only for a
//!    snapshotted card.
//! 3. `exit()` restores every snapshotted card and grid before clearing the
//!    snapshots, and releases every outstanding pointer capture.
//! 4. `enter()` while active and `exit()` while idle are no-ops.
//! 5. The z-index counter only grows.
//!
//! # Failure Modes
//!
//! None surface. A document with no cards leaves the machine idle.

use cardui_core::css::{format_number, format_px};
use cardui_core::config::MAX_JITTER_PX;
use cardui_core::{ChaosPolicy, Point, Rect, ToggleLabels};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::host::{CardId, GridId, LayoutHost, NodeRef, StyleProp, classes};

/// Inline card style captured on enter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardStyleSnapshot {
    pub position: String,
    pub left: String,
    pub top: String,
    pub width: String,
    pub height: String,
    pub z_index: String,
    pub cursor: String,
}

impl CardStyleSnapshot {
    /// Properties captured and restored, in restore order.
    pub const PROPS: [StyleProp; 7] = [
        StyleProp::Position,
        StyleProp::Left,
        StyleProp::Top,
        StyleProp::Width,
        StyleProp::Height,
        StyleProp::ZIndex,
        StyleProp::Cursor,
    ];

    /// Read the current inline style of `card`.
    pub fn capture<H: LayoutHost>(host: &H, card: CardId) -> Self {
        let node = NodeRef::Card(card);
        Self {
            position: host.style(node, StyleProp::Position),
            left: host.style(node, StyleProp::Left),
            top: host.style(node, StyleProp::Top),
            width: host.style(node, StyleProp::Width),
            height: host.style(node, StyleProp::Height),
            z_index: host.style(node, StyleProp::ZIndex),
            cursor: host.style(node, StyleProp::Cursor),
        }
    }

    /// Captured value of one property.
    #[must_use]
    pub fn get(&self, prop: StyleProp) -> &str {
        match prop {
            StyleProp::Position => &self.position,
            StyleProp::Left => &self.left,
            StyleProp::Top => &self.top,
            StyleProp::Width => &self.width,
            StyleProp::Height => &self.height,
            StyleProp::ZIndex => &self.z_index,
            StyleProp::Cursor => &self.cursor,
            StyleProp::MinHeight => "",
        }
    }

    /// Write every captured property back onto `card`.
    pub fn restore<H: LayoutHost>(&self, host: &mut H, card: CardId) {
        for prop in Self::PROPS {
            host.set_style(NodeRef::Card(card), prop, self.get(prop));
        }
    }
}

/// Inline grid sizing captured on enter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridStyleSnapshot {
    pub height: String,
    pub min_height: String,
}

impl GridStyleSnapshot {
    pub fn capture<H: LayoutHost>(host: &H, grid: GridId) -> Self {
        Self {
            height: host.style(NodeRef::Grid(grid), StyleProp::Height),
            min_height: host.style(NodeRef::Grid(grid), StyleProp::MinHeight),
        }
    }

    pub fn restore<H: LayoutHost>(&self, host: &mut H, grid: GridId) {
        host.set_style(NodeRef::Grid(grid), StyleProp::Height, &self.height);
        host.set_style(NodeRef::Grid(grid), StyleProp::MinHeight, &self.min_height);
    }
}

/// A snapshotted card and the grid that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSnapshot {
    pub grid: GridId,
    pub style: CardStyleSnapshot,
}

/// One pointer holding one card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub card: CardId,
    pub grid: GridId,
    /// Pointer position at pointer-down.
    pub start: Point,
    /// Card `left`/`top` at pointer-down.
    pub base: Point,
}

/// Mutable bookkeeping behind chaos mode.
#[derive(Debug, Clone, Default)]
pub struct ChaosState {
    pub(crate) active: bool,
    pub(crate) cards: FxHashMap<CardId, CardSnapshot>,
    pub(crate) grids: FxHashMap<GridId, GridStyleSnapshot>,
    pub(crate) drags: FxHashMap<i32, Drag>,
    pub(crate) z_index: i64,
}

impl ChaosState {
    fn new(z_index_base: i64) -> Self {
        Self {
            z_index: z_index_base,
            ..Self::default()
        }
    }

    /// Clear snapshots and drags. The z-index counter is kept.
    fn reset(&mut self) {
        self.cards.clear();
        self.grids.clear();
        self.drags.clear();
    }

    pub(crate) fn next_z_index(&mut self) -> i64 {
        self.z_index = self.z_index.saturating_add(1);
        self.z_index
    }
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosTransition {
    Entered { grids: usize, cards: usize },
    /// The caller must schedule a row classification for the next frame.
    Exited { released_pointers: usize },
    AlreadyActive,
    AlreadyIdle,
    /// No grid holds a card; the machine stays idle.
    NoCards,
}

/// Chaos-mode controller for all grids of one document.
#[derive(Debug, Clone)]
pub struct ChaosMode {
    pub(crate) state: ChaosState,
    policy: ChaosPolicy,
    labels: ToggleLabels,
    rng: SmallRng,
}

impl ChaosMode {
    /// Create an idle controller. `seed` drives the enter jitter.
    #[must_use]
    pub fn new(policy: ChaosPolicy, labels: ToggleLabels, seed: u64) -> Self {
        Self {
            state: ChaosState::new(policy.z_index_base),
            policy,
            labels,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.active
    }

    /// Current value of the z-index counter.
    #[must_use]
    pub const fn z_index(&self) -> i64 {
        self.state.z_index
    }

    /// Captured style of a card, while active.
    #[must_use]
    pub fn snapshot(&self, card: CardId) -> Option<&CardSnapshot> {
        self.state.cards.get(&card)
    }

    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.state.cards.len()
    }

    /// Captured sizing of a grid, while active.
    #[must_use]
    pub fn grid_snapshot(&self, grid: GridId) -> Option<&GridStyleSnapshot> {
        self.state.grids.get(&grid)
    }

    /// Toggle between idle and active.
    pub fn toggle<H: LayoutHost>(&mut self, host: &mut H) -> ChaosTransition {
        if self.state.active {
            self.exit(host)
        } else {
            self.enter(host)
        }
    }

    /// Free every card of every non-empty grid.
    pub fn enter<H: LayoutHost>(&mut self, host: &mut H) -> ChaosTransition {
        if self.state.active {
            return ChaosTransition::AlreadyActive;
        }

        // Measure everything before the first write so no card is read in a
        // layout already disturbed by its siblings.
        let mut plan: Vec<(GridId, Vec<(CardId, Rect)>)> = Vec::new();
        let mut claimed: Vec<CardId> = Vec::new();
        for grid in host.grids() {
            let grid_rect = host.bounding_rect(NodeRef::Grid(grid));
            let cards: Vec<(CardId, Rect)> = host
                .cards(grid)
                .into_iter()
                .filter(|card| !claimed.contains(card))
                .map(|card| {
                    let rect = host.bounding_rect(NodeRef::Card(card));
                    (card, rect.relative_to(&grid_rect))
                })
                .collect();
            if cards.is_empty() {
                continue;
            }
            claimed.extend(cards.iter().map(|(card, _)| *card));
            plan.push((grid, cards));
        }
        if plan.is_empty() {
            debug!("chaos enter skipped: no cards");
            return ChaosTransition::NoCards;
        }

        self.state.reset();
        for (grid, cards) in &plan {
            self.state
                .grids
                .insert(*grid, GridStyleSnapshot::capture(host, *grid));
            for (card, _) in cards {
                self.state.cards.insert(
                    *card,
                    CardSnapshot {
                        grid: *grid,
                        style: CardStyleSnapshot::capture(host, *card),
                    },
                );
            }
        }

        host.set_class(NodeRef::Body, classes::IS_CHAOS, true);
        let mut card_count = 0;
        for (grid, cards) in &plan {
            host.set_class(NodeRef::Grid(*grid), classes::IS_CHAOS, true);
            host.set_class(NodeRef::Grid(*grid), classes::IS_STACK, false);

            let mut max_bottom: f64 = 0.0;
            for (card, rect) in cards {
                let left = self.jittered(rect.left());
                let top = self.jittered(rect.top());
                let node = NodeRef::Card(*card);
                host.set_style(node, StyleProp::Position, "absolute");
                host.set_style(node, StyleProp::Left, &format_px(left));
                host.set_style(node, StyleProp::Top, &format_px(top));
                host.set_style(node, StyleProp::Width, &format_px(rect.width));
                host.set_style(node, StyleProp::Height, &format_px(rect.height));
                let z = self.state.next_z_index();
                host.set_style(node, StyleProp::ZIndex, &format_number(z as f64));
                host.set_style(node, StyleProp::Cursor, "grab");
                host.set_class(node, classes::IS_CHAOS_CARD, true);
                max_bottom = max_bottom.max(top + rect.height);
                card_count += 1;
            }

            let canvas = max_bottom
                .max(host.offset_height(NodeRef::Grid(*grid)))
                .ceil();
            let height = format_px(canvas);
            host.set_style(NodeRef::Grid(*grid), StyleProp::Height, &height);
            host.set_style(NodeRef::Grid(*grid), StyleProp::MinHeight, &height);
        }

        host.set_toggle_state(true, self.labels.for_state(true));
        self.state.active = true;
        debug!(grids = plan.len(), cards = card_count, "chaos mode entered");
        ChaosTransition::Entered {
            grids: plan.len(),
            cards: card_count,
        }
    }

    /// Restore every card and grid and end all drags.
    pub fn exit<H: LayoutHost>(&mut self, host: &mut H) -> ChaosTransition {
        if !self.state.active {
            return ChaosTransition::AlreadyIdle;
        }
        self.state.active = false;

        host.set_class(NodeRef::Body, classes::IS_CHAOS, false);
        for grid in self.state.grids.keys() {
            host.set_class(NodeRef::Grid(*grid), classes::IS_CHAOS, false);
        }

        let released_pointers = self.state.drags.len();
        for (pointer_id, drag) in self.state.drags.drain() {
            host.release_pointer_capture(drag.card, pointer_id);
        }

        for (grid, snapshot) in &self.state.grids {
            snapshot.restore(host, *grid);
        }
        for (card, snapshot) in &self.state.cards {
            snapshot.style.restore(host, *card);
            host.set_class(NodeRef::Card(*card), classes::IS_CHAOS_CARD, false);
            host.set_class(NodeRef::Card(*card), classes::IS_DRAGGING, false);
        }
        self.state.reset();

        host.set_toggle_state(false, self.labels.for_state(false));
        debug!(released_pointers, "chaos mode exited");
        ChaosTransition::Exited { released_pointers }
    }

    /// Apply the configured jitter to one coordinate.
    ///
    /// A range outside `0..=MAX_JITTER_PX` (only reachable by skipping
    /// [`PageConfig::validate`](cardui_core::PageConfig::validate)) leaves
    /// the value untouched.
    fn jittered(&mut self, value: f64) -> f64 {
        let range = self.policy.jitter;
        if range > 0.0 && range <= MAX_JITTER_PX {
            (value + self.rng.random_range(-range..=range)).max(0.0)
        } else {
            value
        }
    }
}
