#![forbid(unsafe_code)]

//! Browser front end for the cardui page controller.
//!
//! # Role in cardui
//! `cardui-web` turns DOM events into calls on [`PageController`] and binds
//! [`cardui_layout::LayoutHost`] to `web-sys`. Everything except the
//! `wasm32`-only `dom` and `wasm` modules is plain Rust, so the controller
//! protocol is tested natively against `cardui_harness::MockPage`.
//!
//! # Modules
//! - [`controller`]: event handlers and the frame protocol.
//! - [`date_badge`]: weekday labels for `data-date` / `datetime` targets.
//! - [`logo`]: logo fallback visibility.
//! - [`error`]: setup-time [`HostError`].

pub mod controller;
pub mod date_badge;
pub mod error;
pub mod logo;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use controller::{ControllerSnapshot, FrameReport, PageController};
pub use error::HostError;

#[cfg(target_arch = "wasm32")]
pub use wasm::CardPage;
