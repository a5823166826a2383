#![forbid(unsafe_code)]

//! Core: host-independent primitives for the cardui page controller.
//!
//! # Role in cardui
//! `cardui-core` owns the small value types every other crate agrees on:
//! CSS-pixel geometry, normalized pointer input, the animation-frame
//! scheduler, CSS value parsing/formatting, the ISO-date calendar and
//! [`PageConfig`](config::PageConfig).
//!
//! # How it fits in the system
//! `cardui-layout` consumes these types to classify rows and drive chaos
//! mode against an abstract host. `cardui-web` binds that host to the DOM.
//! Nothing in this crate touches `web-sys`, so everything here is testable
//! natively.

pub mod calendar;
pub mod config;
pub mod css;
pub mod event;
pub mod frame;
pub mod geometry;

pub use config::{ChaosPolicy, ConfigError, HandPolicy, PageConfig, ToggleLabels};
pub use event::{PointerButton, PointerInput};
pub use frame::FrameScheduler;
pub use geometry::{Point, Rect};
