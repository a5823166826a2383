#![forbid(unsafe_code)]

//! Host-generic page controller.
//!
//! [`PageController`] is everything the browser entry point does, minus
//! `web-sys`: it owns the chaos-mode machine, the hand tracker and the
//! layout frame scheduler, and exposes one method per DOM event. The wasm
//! module binds those methods to real listeners; native tests drive them
//! against `cardui_harness::MockPage`.
//!
//! # Frame protocol
//!
//! Handlers never measure layout directly. They mark work pending and, when
//! no frame callback is outstanding, raise a registration request that the
//! host collects with [`PageController::take_frame_request`]. Inside the
//! frame callback the host calls [`PageController::run_frame`] exactly once.
//!
//! # Invariants
//!
//! 1. At most one frame registration is requested between two frames.
//! 2. Row classification never runs while chaos mode is active.
//! 3. Leaving chaos mode always schedules a classification.

use cardui_core::css::{parse_angle_deg, parse_finite_or, parse_float, parse_fraction};
use cardui_core::{FrameScheduler, HandPolicy, PageConfig, PointerInput};
use cardui_layout::{
    CardId, ChaosMode, ChaosTransition, DragDispatch, HandTracker, LayoutHost, classify_grid,
};
use serde::Serialize;
use tracing::{debug, trace};

/// Root custom property holding the stacking threshold.
pub const CARD_MAX_PROPERTY: &str = "--card-max";
pub const HAND_REST_ROTATION_PROPERTY: &str = "--hand-rest-rotation";
pub const HAND_REST_OFFSET_PROPERTY: &str = "--hand-rest-offset";
pub const HAND_PIVOT_X_PROPERTY: &str = "--hand-pivot-x";
pub const HAND_PIVOT_Y_PROPERTY: &str = "--hand-pivot-y";

/// What one frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Whether a row classification pass ran.
    pub layout_ran: bool,
    /// Grids that received a stacking decision.
    pub grids_classified: usize,
    /// Hands whose pose was written.
    pub hands_updated: usize,
}

/// Serializable view of the controller, exported to JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub chaos_active: bool,
    pub z_index: i64,
    pub chaos_cards: usize,
    pub active_pointers: Vec<i32>,
    pub reduced_motion: bool,
    pub layout_pending: bool,
}

/// Event-driven controller for one card page.
#[derive(Debug, Clone)]
pub struct PageController {
    config: PageConfig,
    chaos: ChaosMode,
    hands: HandTracker,
    layout: FrameScheduler,
    frame: FrameScheduler,
    registration_requested: bool,
}

impl PageController {
    /// Create an idle controller. `seed` drives the chaos-mode jitter.
    #[must_use]
    pub fn new(config: PageConfig, seed: u64, reduced_motion: bool) -> Self {
        let chaos = ChaosMode::new(config.chaos.clone(), config.labels.clone(), seed);
        Self {
            config,
            chaos,
            hands: HandTracker::new(reduced_motion),
            layout: FrameScheduler::new(),
            frame: FrameScheduler::new(),
            registration_requested: false,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub const fn chaos(&self) -> &ChaosMode {
        &self.chaos
    }

    #[must_use]
    pub const fn hands(&self) -> &HandTracker {
        &self.hands
    }

    /// Whether a row classification waits for the next frame.
    #[must_use]
    pub const fn layout_pending(&self) -> bool {
        self.layout.is_pending()
    }

    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            chaos_active: self.chaos.is_active(),
            z_index: self.chaos.z_index(),
            chaos_cards: self.chaos.snapshot_count(),
            active_pointers: self.chaos.active_pointer_ids(),
            reduced_motion: self.hands.reduced_motion(),
            layout_pending: self.layout.is_pending(),
        }
    }

    /// Stacking threshold: `--card-max` when it parses to a finite number,
    /// the configured width otherwise.
    #[must_use]
    pub fn card_max_width<H: LayoutHost>(&self, host: &H) -> f64 {
        parse_finite_or(
            &host.root_custom_property(CARD_MAX_PROPERTY),
            self.config.card_max_width,
        )
    }

    /// Hand policy with root custom-property overrides applied.
    #[must_use]
    pub fn hand_policy<H: LayoutHost>(&self, host: &H) -> HandPolicy {
        resolve_hand_policy(&self.config, host)
    }

    /// Collect a pending frame registration. Returns `true` at most once per
    /// outstanding frame.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.registration_requested)
    }

    fn request_frame(&mut self) {
        if self.frame.request() {
            self.registration_requested = true;
        }
    }

    /// The document is ready: classify rows and place the hands.
    pub fn boot(&mut self) {
        self.schedule_layout();
        if self.hands.invalidate() {
            self.request_frame();
        }
    }

    /// Ask for a row classification on the next frame.
    ///
    /// Returns `false` when one was already pending.
    pub fn schedule_layout(&mut self) -> bool {
        let fresh = self.layout.request();
        self.request_frame();
        fresh
    }

    /// Window `resize` / `orientationchange`: both rows and hand pivots move.
    pub fn viewport_changed(&mut self) {
        self.schedule_layout();
        if self.hands.invalidate() {
            self.request_frame();
        }
    }

    /// Click on the toggle control.
    pub fn toggle<H: LayoutHost>(&mut self, host: &mut H) -> ChaosTransition {
        let transition = self.chaos.toggle(host);
        debug!(?transition, "chaos toggle");
        if matches!(transition, ChaosTransition::Exited { .. }) {
            self.schedule_layout();
        }
        transition
    }

    /// Leave chaos mode if active (used by the JS surface).
    pub fn exit_chaos<H: LayoutHost>(&mut self, host: &mut H) -> ChaosTransition {
        let transition = self.chaos.exit(host);
        if matches!(transition, ChaosTransition::Exited { .. }) {
            self.schedule_layout();
        }
        transition
    }

    pub fn pointer_down<H: LayoutHost>(
        &mut self,
        host: &mut H,
        target: Option<CardId>,
        input: PointerInput,
    ) -> DragDispatch {
        self.chaos.pointer_down(host, target, input)
    }

    /// Document-level `pointermove`: drives both the drag and the hands.
    pub fn pointer_move<H: LayoutHost>(
        &mut self,
        host: &mut H,
        input: PointerInput,
    ) -> DragDispatch {
        if self.hands.pointer_moved(input.position) {
            self.request_frame();
        }
        self.chaos.pointer_move(host, input)
    }

    pub fn pointer_up<H: LayoutHost>(&mut self, host: &mut H, input: PointerInput) -> DragDispatch {
        self.chaos.pointer_up(host, input)
    }

    pub fn pointer_cancel<H: LayoutHost>(&mut self, host: &mut H, pointer_id: i32) -> DragDispatch {
        self.chaos.pointer_cancel(host, pointer_id)
    }

    pub fn lost_pointer_capture<H: LayoutHost>(
        &mut self,
        host: &mut H,
        pointer_id: i32,
        target: Option<CardId>,
    ) -> DragDispatch {
        self.chaos.lost_pointer_capture(host, pointer_id, target)
    }

    /// The pointer left the document; hands return to rest.
    pub fn pointer_left(&mut self) {
        if self.hands.pointer_left() {
            self.request_frame();
        }
    }

    /// `prefers-reduced-motion` changed.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if self.hands.set_reduced_motion(reduced) {
            self.request_frame();
        }
    }

    /// Frame callback body.
    pub fn run_frame<H: LayoutHost>(&mut self, host: &mut H) -> FrameReport {
        let mut report = FrameReport::default();
        if !self.frame.take_pending() {
            return report;
        }
        if self.layout.take_pending() && !self.chaos.is_active() {
            let card_max = self.card_max_width(host);
            report.layout_ran = true;
            for grid in host.grids() {
                if classify_grid(host, grid, card_max).is_some() {
                    report.grids_classified += 1;
                }
            }
        }
        let config = &self.config;
        report.hands_updated = self
            .hands
            .run_frame(host, |host| resolve_hand_policy(config, host));
        trace!(
            layout_ran = report.layout_ran,
            grids = report.grids_classified,
            hands = report.hands_updated,
            "frame"
        );
        report
    }
}

fn resolve_hand_policy<H: LayoutHost>(config: &PageConfig, host: &H) -> HandPolicy {
    let mut policy = config.hand.clone();
    let rest_rotation = host.root_custom_property(HAND_REST_ROTATION_PROPERTY);
    if let Some(deg) = parse_angle_deg(&rest_rotation) {
        policy.rest_rotation_deg = deg;
    }
    if let Some(px) = parse_float(&host.root_custom_property(HAND_REST_OFFSET_PROPERTY))
        .filter(|v| v.is_finite())
    {
        policy.rest_offset_px = px;
    }
    if let Some(x) = parse_fraction(&host.root_custom_property(HAND_PIVOT_X_PROPERTY)) {
        policy.pivot_x = x;
    }
    if let Some(y) = parse_fraction(&host.root_custom_property(HAND_PIVOT_Y_PROPERTY)) {
        policy.pivot_y = y;
    }
    policy
}
