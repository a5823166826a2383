#![forbid(unsafe_code)]

//! Layout engine for the card page.
//!
//! # Role in cardui
//! `cardui-layout` owns the page behavior that depends on measured layout:
//!
//! - [`rows`]: row classification and the responsive stacked mode,
//! - [`chaos`] / [`drag`]: the chaos-mode canvas and multi-pointer dragging,
//! - [`hand`]: pointer-following rotation for decorative hands.
//!
//! All document access goes through [`host::LayoutHost`], so the engine runs
//! unchanged against the browser (`cardui-web`) and against the in-memory
//! page of `cardui-harness`.

pub mod chaos;
pub mod drag;
pub mod hand;
pub mod host;
pub mod rows;

pub use chaos::{
    CardSnapshot, CardStyleSnapshot, ChaosMode, ChaosState, ChaosTransition, Drag,
    GridStyleSnapshot,
};
pub use drag::{DragDispatch, DragIgnoredReason, DragOutcome, DragPhase};
pub use hand::{HandPose, HandTracker, hand_pose};
pub use host::{CardId, GridId, HandId, HandSide, LayoutHost, NodeRef, StyleProp, classes};
pub use rows::{Row, StackDecision, classify_grid, group_rows_by_offset_top, stack_decision};
