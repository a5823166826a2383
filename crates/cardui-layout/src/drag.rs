#![forbid(unsafe_code)]

//! Pointer drag tracking for chaos mode.
//!
//! Each pointer id owns at most one [`Drag`]. Pointers are independent, so
//! two fingers can move two cards at once. A moved card may push the bottom
//! of its grid down; the grid never shrinks while a drag is in flight.
//!
//! Every handler returns a [`DragDispatch`] describing what happened, so the
//! host can call `preventDefault()` and tests can assert on ignored signals
//! without inspecting the document.

use cardui_core::css::{format_number, format_px, parse_float_or_zero};
use cardui_core::{Point, PointerInput};
use tracing::trace;

use crate::chaos::{ChaosMode, Drag};
use crate::host::{CardId, GridId, LayoutHost, NodeRef, StyleProp, classes};

/// Lifecycle phase of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    LostPointerCapture,
}

/// Why a pointer signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIgnoredReason {
    /// Chaos mode is idle.
    Inactive,
    /// Only the primary button starts a drag.
    ButtonNotAllowed,
    /// The target is not a card captured on enter.
    NotAChaosCard,
    /// No drag is registered for this pointer id.
    UnknownPointer,
    /// Capture was lost by a card the pointer no longer drags.
    StaleCapture,
}

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Started,
    Moved { grid_grew: bool },
    Ended,
    Ignored(DragIgnoredReason),
}

/// Result of one pointer dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragDispatch {
    pub phase: DragPhase,
    pub pointer_id: i32,
    pub card: Option<CardId>,
    pub outcome: DragOutcome,
}

impl DragDispatch {
    fn new(phase: DragPhase, pointer_id: i32, card: Option<CardId>, outcome: DragOutcome) -> Self {
        let dispatch = Self {
            phase,
            pointer_id,
            card,
            outcome,
        };
        trace!(
            ?phase,
            pointer_id,
            card = card.map(|c| c.0),
            ?outcome,
            "chaos pointer dispatch"
        );
        dispatch
    }

    fn ignored(phase: DragPhase, pointer_id: i32, reason: DragIgnoredReason) -> Self {
        Self::new(phase, pointer_id, None, DragOutcome::Ignored(reason))
    }

    /// Whether the host should suppress the browser default action
    /// (text selection, touch scrolling).
    #[must_use]
    pub const fn prevent_default(&self) -> bool {
        matches!(self.outcome, DragOutcome::Started)
    }

    #[must_use]
    pub const fn accepted(&self) -> bool {
        !matches!(self.outcome, DragOutcome::Ignored(_))
    }
}

impl ChaosMode {
    /// Pointer ids with a drag in flight, ascending.
    #[must_use]
    pub fn active_pointer_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.state.drags.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Drag record for a pointer id.
    #[must_use]
    pub fn drag(&self, pointer_id: i32) -> Option<&Drag> {
        self.state.drags.get(&pointer_id)
    }

    /// Pointer-down on `target` (the closest card of the event target, if
    /// any).
    pub fn pointer_down<H: LayoutHost>(
        &mut self,
        host: &mut H,
        target: Option<CardId>,
        input: PointerInput,
    ) -> DragDispatch {
        let phase = DragPhase::PointerDown;
        let pointer_id = input.pointer_id;
        if !self.state.active {
            return DragDispatch::ignored(phase, pointer_id, DragIgnoredReason::Inactive);
        }
        if !input.button.is_primary() {
            return DragDispatch::ignored(phase, pointer_id, DragIgnoredReason::ButtonNotAllowed);
        }
        let Some((card, grid)) = target.and_then(|card| {
            self.state
                .cards
                .get(&card)
                .map(|snapshot| (card, snapshot.grid))
        }) else {
            return DragDispatch::ignored(phase, pointer_id, DragIgnoredReason::NotAChaosCard);
        };

        // A pointer id reused without an intervening up: finish the old drag.
        if self.state.drags.contains_key(&pointer_id) {
            self.finish(host, pointer_id, true);
        }

        let node = NodeRef::Card(card);
        let base = Point::new(
            parse_float_or_zero(&host.style(node, StyleProp::Left)),
            parse_float_or_zero(&host.style(node, StyleProp::Top)),
        );
        host.set_pointer_capture(card, pointer_id);
        self.state.drags.insert(
            pointer_id,
            Drag {
                card,
                grid,
                start: input.position,
                base,
            },
        );

        host.set_class(node, classes::IS_DRAGGING, true);
        host.set_style(node, StyleProp::Cursor, "grabbing");
        let z = self.state.next_z_index();
        host.set_style(node, StyleProp::ZIndex, &format_number(z as f64));

        DragDispatch::new(phase, pointer_id, Some(card), DragOutcome::Started)
    }

    /// Pointer-move anywhere in the document.
    pub fn pointer_move<H: LayoutHost>(
        &mut self,
        host: &mut H,
        input: PointerInput,
    ) -> DragDispatch {
        let phase = DragPhase::PointerMove;
        let pointer_id = input.pointer_id;
        let Some(drag) = self.state.drags.get(&pointer_id).copied() else {
            return DragDispatch::ignored(phase, pointer_id, DragIgnoredReason::UnknownPointer);
        };

        let position = drag.base.offset(input.position.delta_from(drag.start));
        let node = NodeRef::Card(drag.card);
        host.set_style(node, StyleProp::Left, &format_px(position.x));
        host.set_style(node, StyleProp::Top, &format_px(position.y));
        let grid_grew = grow_grid_to_fit(host, drag.grid, drag.card);

        DragDispatch::new(
            phase,
            pointer_id,
            Some(drag.card),
            DragOutcome::Moved { grid_grew },
        )
    }

    /// Pointer-up for a tracked pointer.
    pub fn pointer_up<H: LayoutHost>(&mut self, host: &mut H, input: PointerInput) -> DragDispatch {
        self.end(host, DragPhase::PointerUp, input.pointer_id, true)
    }

    /// Pointer-cancel (touch interrupted, gesture taken over by the UA).
    pub fn pointer_cancel<H: LayoutHost>(&mut self, host: &mut H, pointer_id: i32) -> DragDispatch {
        self.end(host, DragPhase::PointerCancel, pointer_id, true)
    }

    /// `lostpointercapture` on `target`: the browser already released the
    /// capture.
    ///
    /// The drag ends only when `target` is the card the pointer currently
    /// drags. After a reused pointer id re-captured onto another card, the
    /// late event for the previous card is ignored. An unresolved target
    /// (`None`) ends the drag.
    pub fn lost_pointer_capture<H: LayoutHost>(
        &mut self,
        host: &mut H,
        pointer_id: i32,
        target: Option<CardId>,
    ) -> DragDispatch {
        let phase = DragPhase::LostPointerCapture;
        if let (Some(drag), Some(card)) = (self.state.drags.get(&pointer_id), target)
            && drag.card != card
        {
            return DragDispatch::ignored(phase, pointer_id, DragIgnoredReason::StaleCapture);
        }
        self.end(host, phase, pointer_id, false)
    }

    fn end<H: LayoutHost>(
        &mut self,
        host: &mut H,
        phase: DragPhase,
        pointer_id: i32,
        release_capture: bool,
    ) -> DragDispatch {
        match self.finish(host, pointer_id, release_capture) {
            Some(card) => DragDispatch::new(phase, pointer_id, Some(card), DragOutcome::Ended),
            None => DragDispatch::ignored(phase, pointer_id, DragIgnoredReason::UnknownPointer),
        }
    }

    fn finish<H: LayoutHost>(
        &mut self,
        host: &mut H,
        pointer_id: i32,
        release_capture: bool,
    ) -> Option<CardId> {
        let drag = self.state.drags.remove(&pointer_id)?;
        if release_capture {
            host.release_pointer_capture(drag.card, pointer_id);
        }
        // Another pointer may still hold the same card.
        let still_held = self.state.drags.values().any(|d| d.card == drag.card);
        if !still_held {
            let node = NodeRef::Card(drag.card);
            host.set_class(node, classes::IS_DRAGGING, false);
            host.set_style(node, StyleProp::Cursor, "grab");
        }
        Some(drag.card)
    }
}

/// Grow `grid` so the bottom edge of `card` fits. Never shrinks.
fn grow_grid_to_fit<H: LayoutHost>(host: &mut H, grid: GridId, card: CardId) -> bool {
    let top = parse_float_or_zero(&host.style(NodeRef::Card(card), StyleProp::Top));
    let bottom = top + host.offset_height(NodeRef::Card(card));
    let current = parse_float_or_zero(&host.style(NodeRef::Grid(grid), StyleProp::Height));
    if bottom <= current {
        return false;
    }
    let height = format_px(bottom.ceil());
    host.set_style(NodeRef::Grid(grid), StyleProp::Height, &height);
    host.set_style(NodeRef::Grid(grid), StyleProp::MinHeight, &height);
    true
}
