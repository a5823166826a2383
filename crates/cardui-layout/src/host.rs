#![forbid(unsafe_code)]

//! The seam between layout logic and the document.
//!
//! Every measurement and mutation the engine performs goes through
//! [`LayoutHost`]. The browser implementation lives in `cardui-web`; tests
//! use the in-memory page from `cardui-harness`. Element identity is an
//! opaque index assigned by the host, so the engine never holds DOM handles.
//!
//! # Failure Modes
//!
//! Hosts never fail. A handle that no longer resolves to an element reads as
//! empty (`""`, a zero rect) and writes to it are dropped.

use cardui_core::Rect;

/// Host-assigned card handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub u32);

/// Host-assigned grid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(pub u32);

/// Host-assigned handle for a decorative hand element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandId(pub u32);

/// Any element the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Body,
    Grid(GridId),
    Card(CardId),
    Hand(HandId),
}

/// Inline style properties the engine touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProp {
    Position,
    Left,
    Top,
    Width,
    Height,
    MinHeight,
    ZIndex,
    Cursor,
}

impl StyleProp {
    /// CSS property name, as accepted by `style.setProperty()`.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::MinHeight => "min-height",
            Self::ZIndex => "z-index",
            Self::Cursor => "cursor",
        }
    }
}

/// Class markers written by the engine.
pub mod classes {
    /// Grid whose rows hold one card each on a narrow viewport.
    pub const IS_STACK: &str = "is-stack";
    /// Body and grids while chaos mode is active.
    pub const IS_CHAOS: &str = "is-chaos";
    /// Card freed into the chaos canvas.
    pub const IS_CHAOS_CARD: &str = "is-chaos-card";
    /// Card currently held by at least one pointer.
    pub const IS_DRAGGING: &str = "is-dragging";
    /// Hand following the pointer (not at rest).
    pub const IS_TRACKING: &str = "is-tracking";
}

/// Side a decorative hand is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HandSide {
    #[default]
    Left,
    Right,
}

impl HandSide {
    /// Parse a `data-side` attribute value. Unknown values mean left.
    #[must_use]
    pub fn from_attr(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("right") {
            Self::Right
        } else {
            Self::Left
        }
    }
}

/// Document access used by the layout engine.
pub trait LayoutHost {
    /// All grids, in document order.
    fn grids(&self) -> Vec<GridId>;

    /// Cards of `grid`, in document order.
    fn cards(&self, grid: GridId) -> Vec<CardId>;

    /// Decorative hands, in document order.
    fn hands(&self) -> Vec<(HandId, HandSide)>;

    /// `offsetTop` of a card, in integer CSS px.
    fn card_offset_top(&self, card: CardId) -> i32;

    /// `getBoundingClientRect()`.
    fn bounding_rect(&self, node: NodeRef) -> Rect;

    /// `offsetHeight`.
    fn offset_height(&self, node: NodeRef) -> f64;

    /// `window.innerWidth`.
    fn viewport_width(&self) -> f64;

    /// Computed custom property on the root element (`--card-max`, ...).
    /// Empty when unset.
    fn root_custom_property(&self, name: &str) -> String;

    /// Inline style value; empty when unset.
    fn style(&self, node: NodeRef, prop: StyleProp) -> String;

    /// Write an inline style value. An empty value removes the declaration.
    fn set_style(&mut self, node: NodeRef, prop: StyleProp, value: &str);

    /// Write an inline custom property (`--hand-rotation`, ...).
    fn set_custom_property(&mut self, node: NodeRef, name: &str, value: &str);

    /// Add or remove a class.
    fn set_class(&mut self, node: NodeRef, class: &str, enabled: bool);

    /// `setPointerCapture()` on a card.
    fn set_pointer_capture(&mut self, card: CardId, pointer_id: i32);

    /// `releasePointerCapture()` on a card.
    fn release_pointer_capture(&mut self, card: CardId, pointer_id: i32);

    /// Update the chaos toggle's `aria-pressed` state and label.
    fn set_toggle_state(&mut self, pressed: bool, label: &str);
}

#[cfg(test)]
mod tests {
    use super::{HandSide, StyleProp};

    #[test]
    fn hand_side_attr_parsing() {
        assert_eq!(HandSide::from_attr("right"), HandSide::Right);
        assert_eq!(HandSide::from_attr(" RIGHT "), HandSide::Right);
        assert_eq!(HandSide::from_attr("left"), HandSide::Left);
        assert_eq!(HandSide::from_attr(""), HandSide::Left);
    }

    #[test]
    fn css_names_are_kebab_case() {
        assert_eq!(StyleProp::MinHeight.css_name(), "min-height");
        assert_eq!(StyleProp::ZIndex.css_name(), "z-index");
    }
}
