#![forbid(unsafe_code)]

//! Normalized pointer input.
//!
//! Browser `PointerEvent`s are reduced to [`PointerInput`] before they reach
//! any state machine, so handlers never see `web-sys` types.

use crate::geometry::Point;

/// Pointer button, decoded from the DOM `MouseEvent.button` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Button 0: left mouse button, touch contact, pen tip.
    Primary,
    /// Button 1: wheel / middle button.
    Auxiliary,
    /// Button 2: right mouse button, pen barrel.
    Secondary,
    /// Any other code (back/forward, eraser, ...).
    Other(i16),
}

impl PointerButton {
    /// Decode a DOM `button` code.
    #[must_use]
    pub const fn from_dom(code: i16) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// One pointer lifecycle signal with its viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// DOM `pointerId`; stable for the lifetime of one contact.
    pub pointer_id: i32,
    /// `clientX` / `clientY`.
    pub position: Point,
    pub button: PointerButton,
}

impl PointerInput {
    #[must_use]
    pub const fn new(pointer_id: i32, x: f64, y: f64, button: PointerButton) -> Self {
        Self {
            pointer_id,
            position: Point::new(x, y),
            button,
        }
    }

    /// Primary-button input, the common case for touch and left-click.
    #[must_use]
    pub const fn primary(pointer_id: i32, x: f64, y: f64) -> Self {
        Self::new(pointer_id, x, y, PointerButton::Primary)
    }
}

#[cfg(test)]
mod tests {
    use super::PointerButton;

    #[test]
    fn dom_button_codes_decode() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Auxiliary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(5), PointerButton::Other(5));
        assert_eq!(PointerButton::from_dom(-1), PointerButton::Other(-1));
        assert!(PointerButton::Primary.is_primary());
        assert!(!PointerButton::Secondary.is_primary());
    }
}
