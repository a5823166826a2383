#![forbid(unsafe_code)]

//! Fallback block for a missing logo image.

/// Id of the logo `<img>`.
pub const LOGO_ID: &str = "logo";
/// Selector of the fallback block.
pub const FALLBACK_SELECTOR: &str = ".logo-fallback";
/// Class present while the fallback is shown.
pub const VISIBLE_CLASS: &str = "is-visible";

/// Image lifecycle events the fallback reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoEvent {
    Load,
    Error,
}

impl LogoEvent {
    /// Fallback visibility after the event.
    #[must_use]
    pub const fn fallback_visible(self) -> bool {
        matches!(self, Self::Error)
    }
}

/// Initial decision from the image state at script start.
///
/// An image that has not finished, or finished without pixels, shows the
/// fallback. A loaded image leaves the markup as authored (`None`).
#[must_use]
pub const fn initial_fallback(complete: bool, natural_width: u32) -> Option<bool> {
    if !complete || natural_width == 0 {
        Some(true)
    } else {
        None
    }
}

/// Inline `display` value for the fallback block.
#[must_use]
pub const fn fallback_display(visible: bool) -> &'static str {
    if visible { "grid" } else { "none" }
}
