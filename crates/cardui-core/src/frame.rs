#![forbid(unsafe_code)]

//! Animation-frame coalescing.
//!
//! Layout measurements are expensive to interleave with style writes, so all
//! recomputation is deferred to the next `requestAnimationFrame` callback.
//! [`FrameScheduler`] is the scheduled-flag half of that pattern: the host
//! owns the actual frame callback, the scheduler decides whether one has to
//! be registered.
//!
//! # Invariants
//!
//! 1. At most one frame callback is outstanding per scheduler.
//! 2. Any number of [`request`](FrameScheduler::request) calls between two
//!    frames collapse into a single unit of work.
//! 3. [`take_pending`](FrameScheduler::take_pending) clears the flag before
//!    the caller runs its work, so a request issued *during* the work
//!    schedules a fresh frame instead of being lost.
//!
//! ```
//! use cardui_core::FrameScheduler;
//!
//! let mut frames = FrameScheduler::new();
//! assert!(frames.request());   // register requestAnimationFrame
//! assert!(!frames.request());  // coalesced
//! assert!(frames.take_pending());
//! assert!(!frames.take_pending());
//! ```

/// Scheduled-flag frame coalescer.
///
/// Not thread-safe; it lives on the single browser event loop.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    pending: bool,
    coalesced: u64,
    frames_run: u64,
}

impl FrameScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: false,
            coalesced: 0,
            frames_run: 0,
        }
    }

    /// Ask for work on the next frame.
    ///
    /// Returns `true` when the caller must register a frame callback, and
    /// `false` when one is already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            self.coalesced = self.coalesced.saturating_add(1);
            return false;
        }
        self.pending = true;
        true
    }

    /// Whether a frame callback is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending flag from inside the frame callback.
    ///
    /// Returns `false` if nothing was requested (a stale callback).
    pub fn take_pending(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.frames_run = self.frames_run.saturating_add(1);
        true
    }

    /// Number of requests absorbed by an already-pending frame.
    #[must_use]
    pub const fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Number of frames that actually ran work.
    #[must_use]
    pub const fn frames_run(&self) -> u64 {
        self.frames_run
    }
}
