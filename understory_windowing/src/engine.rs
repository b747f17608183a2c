// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window engine: scroll samples in, a padded visible range out.
//!
//! [`WindowEngine`] is a two-state machine:
//!
//! - **Idle**: `is_scrolling == false`, zero velocity, overscan at
//!   [`OverscanConfig::base`](crate::OverscanConfig::base).
//! - **Scrolling**: entered by [`WindowEngine::on_scroll`] and
//!   [`WindowEngine::scroll_to_index`]; overscan follows scroll velocity.
//!
//! Every scroll sample re-arms a single scroll-end deadline. The host drives
//! time by calling [`WindowEngine::tick`] from its event loop (use
//! [`WindowEngine::next_deadline`] to know when); once the deadline passes
//! with no newer sample the engine returns to idle and shrinks the buffer.

use alloc::boxed::Box;
use core::time::Duration;

use crate::notify::{UpdateFn, UpdateSlot};
use crate::{
    Clock, EngineOptions, ExtentModel, IdleTimer, ItemPosition, OptionsUpdate, PositionIndex,
    RefinementMode, Scalar, VelocityTracker, VisibleRange, compute_visible_range,
};

/// Maximum callback rounds per engine operation.
///
/// Re-entrant calls made from inside the update callback are applied
/// immediately and coalesced into one more round each; past this many rounds
/// further notifications for the operation are dropped.
pub const MAX_NOTIFY_ROUNDS: usize = 8;

/// Where an item should land in the viewport after
/// [`WindowEngine::scroll_to_index`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollAlign {
    /// Item's leading edge at the viewport's leading edge.
    #[default]
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item's trailing edge at the viewport's trailing edge.
    End,
}

/// Snapshot of the engine's observable state.
///
/// Always a copy; mutating it has no effect on the engine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineState<S = f64> {
    /// Current scroll offset.
    pub scroll_offset: S,
    /// Magnitude of the latest velocity estimate, in units per millisecond.
    pub scroll_velocity: f64,
    /// Items of padding applied on each side of the visible items.
    pub overscan: usize,
    /// `true` between a scroll sample and the scroll-end deadline.
    pub is_scrolling: bool,
    /// Indices that must be mounted, already padded and clamped.
    pub visible_range: VisibleRange,
    /// Total scrollable extent of the content.
    pub total_extent: S,
}

/// Content extents outside the mounted range.
///
/// Hosts typically render these as spacers (or translate the mounted items by
/// `before`) so the scrollable surface keeps its full size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpacerExtents<S = f64> {
    /// Extent of the items before the visible range.
    pub before: S,
    /// Extent of the items after the visible range.
    pub after: S,
}

/// Velocity-aware windowing engine for a 1D list.
///
/// ```rust
/// use core::time::Duration;
/// use understory_windowing::{EngineOptions, ManualClock, ScrollAlign, WindowEngine};
///
/// let clock = ManualClock::new();
/// let mut engine = WindowEngine::with_clock(EngineOptions::new(1000, 50.0, 500.0), clock.clone());
///
/// // 10 rows fit; 3 more are mounted as idle overscan.
/// assert_eq!(engine.get_state().visible_range.as_range(), 0..13);
///
/// clock.advance(Duration::from_millis(16));
/// engine.on_scroll(800.0);
/// assert!(engine.get_state().is_scrolling);
///
/// let target = engine.scroll_to_index(20, ScrollAlign::Center);
/// assert_eq!(target, 775.0);
///
/// clock.advance(Duration::from_millis(200));
/// assert!(engine.tick());
/// assert!(!engine.get_state().is_scrolling);
/// ```
#[derive(Debug)]
pub struct WindowEngine<S: Scalar = f64> {
    /// Options as configured, with partial updates merged in.
    options: EngineOptions<S>,
    /// Sanitized copy of `options` that the engine runs with.
    effective: EngineOptions<S>,
    index: PositionIndex<S>,
    state: EngineState<S>,
    velocity: VelocityTracker,
    idle_timer: IdleTimer,
    clock: Box<dyn Clock>,
    listener: UpdateSlot<S>,
    hint: Option<VisibleRange>,
    notifying: bool,
    pending_notify: bool,
    destroyed: bool,
}

#[cfg(feature = "std")]
impl<S: Scalar> WindowEngine<S> {
    /// Creates an engine timed by a [`MonotonicClock`](crate::MonotonicClock).
    #[must_use]
    pub fn new(options: EngineOptions<S>) -> Self {
        Self::with_clock(options, crate::MonotonicClock::new())
    }
}

impl<S: Scalar> WindowEngine<S> {
    /// Creates an engine timed by `clock`.
    ///
    /// The engine starts idle at offset zero with its visible range computed.
    #[must_use]
    pub fn with_clock(options: EngineOptions<S>, clock: impl Clock + 'static) -> Self {
        let effective = options.clone().sanitized();
        let index = PositionIndex::build(effective.item_count, &effective.item_size);
        let now = clock.now();
        let base = effective.overscan.base;
        let mut engine = Self {
            state: EngineState {
                scroll_offset: S::zero(),
                scroll_velocity: 0.0,
                overscan: base,
                is_scrolling: false,
                visible_range: VisibleRange::EMPTY,
                total_extent: index.total_extent(),
            },
            options,
            effective,
            index,
            velocity: VelocityTracker::new(0.0, now),
            idle_timer: IdleTimer::new(),
            clock: Box::new(clock),
            listener: UpdateSlot::new(),
            hint: None,
            notifying: false,
            pending_notify: false,
            destroyed: false,
        };
        engine.recompute_range();
        vdebug!(
            item_count = engine.effective.item_count,
            fixed = engine.index.is_fixed(),
            "WindowEngine::with_clock"
        );
        engine
    }

    /// Feeds a scroll sample from the host's scrollable surface.
    ///
    /// Samples velocity against the previous sample, enters the scrolling
    /// state, resizes overscan, recomputes the visible range, re-arms the
    /// scroll-end deadline, and notifies.
    ///
    /// Offsets are clamped into `[0, max_scroll_offset()]`; NaN counts as zero.
    pub fn on_scroll(&mut self, offset: S) {
        if self.destroyed {
            return;
        }
        let offset = self.clamp_offset(offset);
        let now = self.clock.now();
        let velocity = self.velocity.record(offset.to_f64(), now);

        self.state.scroll_offset = offset;
        self.state.scroll_velocity = velocity;
        self.state.is_scrolling = true;
        self.state.overscan = self.effective.overscan.overscan_for(velocity);
        self.hint = None;
        self.recompute_range();
        self.idle_timer.arm(now, self.effective.idle_delay);

        vtrace!(
            offset = offset.to_f64(),
            velocity,
            overscan = self.state.overscan,
            start = self.state.visible_range.start,
            end = self.state.visible_range.end,
            "WindowEngine::on_scroll"
        );
        self.notify();
    }

    /// Fires the scroll-end transition if its deadline has passed.
    ///
    /// Returns `true` if the engine went idle during this call.
    pub fn tick(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        if !self.idle_timer.poll(self.clock.now()) {
            return false;
        }
        self.enter_idle();
        true
    }

    /// When the pending scroll-end deadline falls due, on the engine's clock.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.idle_timer.deadline()
    }

    /// Computes the offset that places `index` according to `align`, clamped
    /// into `[0, max_scroll_offset()]`, without changing any state.
    ///
    /// Out-of-range indices are clamped to the last item; an empty list
    /// yields zero.
    #[must_use]
    pub fn offset_for_index(&self, index: usize, align: ScrollAlign) -> S {
        let len = self.index.len();
        if len == 0 {
            return S::zero();
        }
        let index = index.min(len - 1);
        let offset = self.index.offset_of(index);
        let size = self.index.size_of(index);
        let viewport = self.effective.viewport_extent;
        let raw = match align {
            ScrollAlign::Start => offset,
            ScrollAlign::Center => offset - (viewport - size) / S::from_usize(2),
            ScrollAlign::End => offset - viewport + size,
        };
        raw.clamp_non_negative().min(self.max_scroll_offset())
    }

    /// Jumps to `index`, returning the clamped offset the host should apply
    /// to its scrollable surface.
    ///
    /// Before the jump lands, the visible range is pre-expanded to
    /// `[index - max_overscan, index + max_overscan]` (clamped), joined with
    /// the range visible at the destination, so the target is already mounted
    /// when the surface scrolls. The engine enters the scrolling state and
    /// re-arms the scroll-end deadline; the next [`WindowEngine::on_scroll`]
    /// from the surface measures velocity from the target, not from the jump.
    ///
    /// After [`WindowEngine::destroy`] this returns the last scroll offset and
    /// changes nothing.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> S {
        if self.destroyed {
            return self.state.scroll_offset;
        }
        let len = self.index.len();
        if len == 0 {
            return S::zero();
        }
        let index = index.min(len - 1);
        let target = self.offset_for_index(index, align);
        let radius = self.effective.overscan.max;
        let now = self.clock.now();

        let around_target = VisibleRange::new(index, index).padded(radius, len);
        let at_destination =
            compute_visible_range(&self.index, target, self.effective.viewport_extent, radius);

        self.state.scroll_offset = target;
        self.state.is_scrolling = true;
        self.state.overscan = radius;
        self.state.visible_range = around_target.union(at_destination);
        self.hint = None;
        self.velocity.rebase(target.to_f64(), now);
        self.idle_timer.arm(now, self.effective.idle_delay);

        vdebug!(
            index,
            target = target.to_f64(),
            start = self.state.visible_range.start,
            end = self.state.visible_range.end,
            "WindowEngine::scroll_to_index"
        );
        self.notify();
        target
    }

    /// Replaces any subset of the options.
    ///
    /// The position index is rebuilt only if the item count or sizing changed.
    /// The visible range is always recomputed against the current scroll
    /// offset, and the update is always notified.
    pub fn update_options(&mut self, update: OptionsUpdate<S>) {
        if self.destroyed {
            return;
        }
        let rebuild = self.options.apply(update);
        self.effective = self.options.clone().sanitized();
        if rebuild {
            self.index =
                PositionIndex::build(self.effective.item_count, &self.effective.item_size);
            self.hint = None;
        }
        if self.effective.refinement_mode == RefinementMode::ScrollOnly {
            self.hint = None;
        }
        self.state.overscan = if self.state.is_scrolling {
            self.effective.overscan.overscan_for(self.state.scroll_velocity)
        } else {
            self.effective.overscan.base
        };
        self.recompute_range();

        vdebug!(
            rebuild,
            item_count = self.effective.item_count,
            "WindowEngine::update_options"
        );
        self.notify();
    }

    /// Reports which items the host's visibility observer saw on screen.
    ///
    /// Only used in [`RefinementMode::ScrollPlusVisibilityHints`]: the visible
    /// range becomes the union of the scroll-derived range and `observed`
    /// padded by the current overscan. The hint holds until the next scroll
    /// sample, jump, or position index rebuild. Notifies if the range changed.
    ///
    /// Returns `false` (and ignores the report) in
    /// [`RefinementMode::ScrollOnly`], after [`WindowEngine::destroy`], or when
    /// the report is empty or the list has no items.
    pub fn report_visible(&mut self, observed: VisibleRange) -> bool {
        if self.destroyed
            || self.effective.refinement_mode != RefinementMode::ScrollPlusVisibilityHints
        {
            return false;
        }
        let len = self.index.len();
        if observed.is_empty() || len == 0 {
            return false;
        }
        let previous = self.state.visible_range;
        self.hint = Some(VisibleRange::clamped(observed.start, observed.end, len));
        self.recompute_range();
        if self.state.visible_range != previous {
            vtrace!(
                start = self.state.visible_range.start,
                end = self.state.visible_range.end,
                "WindowEngine::report_visible widened range"
            );
            self.notify();
        }
        true
    }

    /// Registers the update callback, replacing any previous one.
    ///
    /// The callback receives a copy of the new state and the engine itself;
    /// operations called on that engine reference apply immediately and are
    /// delivered to the callback in a follow-up round (see
    /// [`MAX_NOTIFY_ROUNDS`]). Ignored after [`WindowEngine::destroy`].
    pub fn on_update<F>(&mut self, callback: F)
    where
        F: FnMut(&EngineState<S>, &mut Self) + 'static,
    {
        if self.destroyed {
            return;
        }
        let callback: Box<UpdateFn<S>> = Box::new(callback);
        self.listener.set(callback);
    }

    /// Detaches the update callback without tearing the engine down.
    pub fn clear_update(&mut self) {
        self.listener.clear();
    }

    /// Tears the engine down.
    ///
    /// Cancels the scroll-end deadline and detaches the callback. Every later
    /// mutating call is a no-op. Calling this more than once is harmless.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.idle_timer.cancel();
        self.listener.clear();
        self.hint = None;
        self.pending_notify = false;
        vdebug!("WindowEngine::destroy");
    }

    /// Returns `true` once [`WindowEngine::destroy`] has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// A copy of the current state.
    #[must_use]
    pub fn get_state(&self) -> EngineState<S> {
        self.state
    }

    /// The options as configured, with every partial update merged in.
    ///
    /// These may be inconsistent (for example `min > max`); the engine runs
    /// with [`WindowEngine::effective_options`] instead.
    #[must_use]
    pub fn options(&self) -> &EngineOptions<S> {
        &self.options
    }

    /// The sanitized options the engine actually runs with.
    #[must_use]
    pub fn effective_options(&self) -> &EngineOptions<S> {
        &self.effective
    }

    /// The position index for the current item count and sizing.
    #[must_use]
    pub fn position_index(&self) -> &PositionIndex<S> {
        &self.index
    }

    /// Total scrollable extent.
    #[must_use]
    pub fn total_extent(&self) -> S {
        self.index.total_extent()
    }

    /// Leading offset of `index`, or zero when out of range.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> S {
        self.index.offset_of(index)
    }

    /// Size of `index`, or zero when out of range.
    #[must_use]
    pub fn size_of(&self, index: usize) -> S {
        self.index.size_of(index)
    }

    /// Largest meaningful scroll offset: `max(total_extent - viewport, 0)`.
    #[must_use]
    pub fn max_scroll_offset(&self) -> S {
        (self.index.total_extent() - self.effective.viewport_extent).clamp_non_negative()
    }

    /// Positions of every item in the visible range, for placing mounted items.
    pub fn visible_items(&self) -> impl Iterator<Item = ItemPosition<S>> + '_ {
        self.index.positions(self.state.visible_range.as_range())
    }

    /// Extents before and after the visible range.
    #[must_use]
    pub fn spacer_extents(&self) -> SpacerExtents<S> {
        let range = self.state.visible_range;
        let total = self.index.total_extent();
        if range.is_empty() {
            return SpacerExtents {
                before: S::zero(),
                after: total,
            };
        }
        let before = self.index.offset_of(range.start);
        let mounted_end = self.index.offset_of(range.end) + self.index.size_of(range.end);
        SpacerExtents {
            before,
            after: (total - mounted_end).clamp_non_negative(),
        }
    }

    fn clamp_offset(&self, offset: S) -> S {
        let max = self.max_scroll_offset();
        if !offset.is_finite() {
            // +inf pins to the end; -inf and NaN pin to the start.
            return if offset > S::zero() { max } else { S::zero() };
        }
        offset.clamp_non_negative().min(max)
    }

    fn enter_idle(&mut self) {
        self.velocity.reset();
        self.state.is_scrolling = false;
        self.state.scroll_velocity = 0.0;
        self.state.overscan = self.effective.overscan.base;
        self.recompute_range();
        vtrace!(
            overscan = self.state.overscan,
            start = self.state.visible_range.start,
            end = self.state.visible_range.end,
            "WindowEngine entered idle"
        );
        self.notify();
    }

    fn recompute_range(&mut self) {
        let len = self.index.len();
        let mut range = compute_visible_range(
            &self.index,
            self.state.scroll_offset,
            self.effective.viewport_extent,
            self.state.overscan,
        );
        if let Some(hint) = self.hint {
            range = range.union(hint.padded(self.state.overscan, len));
        }
        self.state.visible_range = range;
        self.state.total_extent = self.index.total_extent();
    }

    fn notify(&mut self) {
        if self.destroyed {
            return;
        }
        if self.notifying {
            // Re-entrant change from inside the callback; deliver it in the
            // next round of the outer loop.
            self.pending_notify = true;
            return;
        }
        let Some((mut callback, mut generation)) = self.listener.take() else {
            return;
        };
        self.notifying = true;
        let mut rounds = 0;
        loop {
            let snapshot = self.state;
            self.pending_notify = false;
            callback(&snapshot, self);
            rounds += 1;
            if !self.pending_notify || self.destroyed {
                break;
            }
            if rounds >= MAX_NOTIFY_ROUNDS {
                vwarn!(rounds, "WindowEngine dropped re-entrant notifications");
                break;
            }
            if !self.listener.is_current(generation) {
                // The callback registered a replacement and then changed the
                // state; the replacement gets the next round.
                let Some((next, next_generation)) = self.listener.take() else {
                    break;
                };
                callback = next;
                generation = next_generation;
            }
        }
        self.pending_notify = false;
        self.notifying = false;
        if !self.destroyed {
            self.listener.restore(callback, generation);
        }
    }
}
