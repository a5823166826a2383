#![forbid(unsafe_code)]

//! Pointer-following rotation for decorative hands.
//!
//! Each hand rotates around a pivot so that it points at the pointer, but
//! only within an arc around its natural direction: a left-mounted hand
//! points right (0°), a right-mounted hand points left (180°). Right hands
//! are drawn mirrored, so their rotation sign is mirrored too.
//!
//! The pose is a pure function of the pointer position, the element box and
//! the [`HandPolicy`]. [`HandTracker`] only remembers the last pointer
//! position and coalesces updates to one per frame.

use cardui_core::css::{format_deg, format_px};
use cardui_core::{FrameScheduler, HandPolicy, Point, Rect};

use crate::host::{HandSide, LayoutHost, NodeRef, classes};

/// Custom property carrying the hand rotation.
pub const ROTATION_PROPERTY: &str = "--hand-rotation";
/// Custom property carrying the hand translation.
pub const OFFSET_PROPERTY: &str = "--hand-offset";

/// Resolved transform for one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPose {
    pub rotation_deg: f64,
    pub offset_px: f64,
    /// `false` when the hand is at rest.
    pub tracking: bool,
}

impl HandPose {
    /// The pose used without a pointer or under reduced motion.
    #[must_use]
    pub fn rest(policy: &HandPolicy) -> Self {
        Self {
            rotation_deg: policy.rest_rotation_deg,
            offset_px: policy.rest_offset_px,
            tracking: false,
        }
    }
}

/// Wrap an angle into `(-180, 180]`.
#[must_use]
pub fn normalize_deg(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

fn center_deg(side: HandSide) -> f64 {
    match side {
        HandSide::Left => 0.0,
        HandSide::Right => 180.0,
    }
}

/// Compute the pose of one hand.
#[must_use]
pub fn hand_pose(
    side: HandSide,
    rect: Rect,
    pointer: Option<Point>,
    reduced_motion: bool,
    policy: &HandPolicy,
) -> HandPose {
    let Some(pointer) = pointer.filter(|_| !reduced_motion) else {
        return HandPose::rest(policy);
    };
    let pivot = rect.point_at(policy.pivot_x, policy.pivot_y);
    let toward = pointer.delta_from(pivot);
    let angle = toward.y.atan2(toward.x).to_degrees();
    // NaN collapses the arc; `clamp` rejects NaN bounds.
    let arc = if policy.arc_deg.is_nan() { 0.0 } else { policy.arc_deg.abs() };
    let delta = normalize_deg(angle - center_deg(side)).clamp(-arc, arc);
    let delta = match side {
        HandSide::Left => delta,
        HandSide::Right => -delta,
    };
    HandPose {
        rotation_deg: policy.rest_rotation_deg + delta,
        offset_px: 0.0,
        tracking: true,
    }
}

/// Pointer memory and frame coalescing for hand updates.
#[derive(Debug, Clone, Default)]
pub struct HandTracker {
    pointer: Option<Point>,
    reduced_motion: bool,
    frames: FrameScheduler,
}

impl HandTracker {
    #[must_use]
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            reduced_motion,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    #[must_use]
    pub const fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Record a global pointer position. Returns `true` if a frame callback
    /// must be registered.
    pub fn pointer_moved(&mut self, position: Point) -> bool {
        self.pointer = Some(position);
        self.frames.request()
    }

    /// The pointer left the document.
    pub fn pointer_left(&mut self) -> bool {
        self.pointer = None;
        self.frames.request()
    }

    /// `prefers-reduced-motion` changed.
    pub fn set_reduced_motion(&mut self, reduced: bool) -> bool {
        self.reduced_motion = reduced;
        self.frames.request()
    }

    /// Force a recomputation (initial paint, resize).
    pub fn invalidate(&mut self) -> bool {
        self.frames.request()
    }

    /// Apply poses to every hand if an update is pending.
    ///
    /// `policy` is resolved only when there is a hand to pose. Returns the
    /// number of hands updated.
    pub fn run_frame<H, P>(&mut self, host: &mut H, policy: P) -> usize
    where
        H: LayoutHost,
        P: FnOnce(&H) -> HandPolicy,
    {
        if !self.frames.take_pending() {
            return 0;
        }
        let hands = host.hands();
        if hands.is_empty() {
            return 0;
        }
        let policy = policy(&*host);
        let policy = &policy;
        for (hand, side) in &hands {
            let node = NodeRef::Hand(*hand);
            let pose = hand_pose(
                *side,
                host.bounding_rect(node),
                self.pointer,
                self.reduced_motion,
                policy,
            );
            host.set_custom_property(node, ROTATION_PROPERTY, &format_deg(pose.rotation_deg));
            host.set_custom_property(node, OFFSET_PROPERTY, &format_px(pose.offset_px));
            host.set_class(node, classes::IS_TRACKING, pose.tracking);
        }
        hands.len()
    }
}
