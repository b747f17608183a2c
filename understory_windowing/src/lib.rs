// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_windowing --heading-base-level=0

//! Understory Windowing: a velocity-aware windowing engine for virtualized lists.
//!
//! Long lists only mount the items near the viewport. This crate decides
//! *which* items: given the scroll offset, the viewport size, and how big
//! each item is, it produces an inclusive [`VisibleRange`] of indices, padded
//! with an overscan buffer that grows while the user scrolls fast and shrinks
//! back once scrolling stops.
//!
//! The pieces, bottom-up:
//!
//! - [`PositionIndex`]: index → offset/size mapping built from an
//!   [`ItemSize`]. Fixed sizes are closed-form; variable sizes use a prefix-sum
//!   table. Both implement [`ExtentModel`].
//! - [`find_index_at_offset`], [`visible_span`], and [`compute_visible_range`]:
//!   the range locator.
//! - [`dynamic_overscan`] and [`sample_velocity`]: the overscan controller.
//! - [`WindowEngine`]: the state machine tying them together. It consumes
//!   scroll samples ([`WindowEngine::on_scroll`]), index jumps
//!   ([`WindowEngine::scroll_to_index`]), and option changes
//!   ([`WindowEngine::update_options`]), and reports each new
//!   [`EngineState`] to a single registered callback.
//!
//! This crate does **not** know about widgets, DOM nodes, or any particular UI
//! framework. Hosts are responsible for:
//!
//! - Forwarding scroll offsets from their scrollable surface.
//! - Calling [`WindowEngine::tick`] from their event loop so the engine can
//!   notice that scrolling has stopped ([`WindowEngine::next_deadline`] says
//!   when that is due).
//! - Mounting the items in [`EngineState::visible_range`] at the offsets from
//!   [`WindowEngine::visible_items`], and applying the offset returned by
//!   [`WindowEngine::scroll_to_index`] to their surface.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::time::Duration;
//! use understory_windowing::{EngineOptions, ManualClock, WindowEngine};
//!
//! // 10,000 rows, each 24 logical pixels tall, in a 480px viewport.
//! let clock = ManualClock::new();
//! let mut engine = WindowEngine::with_clock(EngineOptions::new(10_000, 24.0, 480.0), clock.clone());
//!
//! engine.on_update(|state, _engine| {
//!     // Diff `state.visible_range` against the mounted rows here.
//!     assert!(!state.visible_range.is_empty());
//! });
//!
//! clock.advance(Duration::from_millis(16));
//! engine.on_scroll(2_400.0);
//! let state = engine.get_state();
//! assert!(state.is_scrolling);
//! assert!(state.visible_range.contains(100));
//!
//! // Once the scroll-end delay passes, overscan falls back to its idle size.
//! clock.advance(Duration::from_millis(150));
//! assert!(engine.tick());
//! assert_eq!(engine.get_state().overscan, 3);
//! ```
//!
//! With the `std` feature (on by default), [`WindowEngine::new`] uses a
//! wall-clock [`MonotonicClock`] instead of a [`ManualClock`].
//!
//! ## Features
//!
//! - `std` (default): [`MonotonicClock`] and [`WindowEngine::new`].
//! - `serde`: `Serialize`/`Deserialize` for [`EngineState`], [`VisibleRange`],
//!   [`OverscanConfig`], and the other plain-data types.
//! - `tracing`: debug and trace events for engine state transitions.
//!
//! All extents and offsets live in a caller-chosen 1D coordinate space
//! (typically logical pixels). This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

macro_rules! vtrace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
    };
}

macro_rules! vdebug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
    };
}

macro_rules! vwarn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
    };
}

mod clock;
mod engine;
mod locate;
mod model;
mod notify;
mod options;
mod overscan;
mod position;
mod scalar;
mod timer;

#[cfg(feature = "std")]
pub use clock::MonotonicClock;
pub use clock::{Clock, ManualClock};
pub use engine::{EngineState, MAX_NOTIFY_ROUNDS, ScrollAlign, SpacerExtents, WindowEngine};
pub use locate::{VisibleRange, compute_visible_range, find_index_at_offset, visible_span};
pub use model::{ExtentModel, ItemPosition};
pub use notify::UpdateFn;
pub use options::{DEFAULT_IDLE_DELAY, EngineOptions, OptionsError, OptionsUpdate, RefinementMode};
pub use overscan::{
    MAX_VELOCITY_FACTOR, OverscanConfig, VelocityTracker, dynamic_overscan, sample_velocity,
};
pub use position::{ItemSize, PositionIndex, SizeFn};
pub use scalar::Scalar;
pub use timer::IdleTimer;
