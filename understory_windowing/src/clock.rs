// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources for velocity sampling and the scroll-end deadline.
//!
//! The engine never sleeps or spawns anything; it only asks a [`Clock`] what
//! time it is. Timestamps are [`Duration`]s since an arbitrary, fixed origin
//! chosen by the clock.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt::Debug;
use core::time::Duration;

/// A monotonic time source.
pub trait Clock: Debug {
    /// Current time, measured from the clock's origin.
    ///
    /// Successive calls must not go backwards.
    fn now(&self) -> Duration;
}

/// A clock advanced by hand.
///
/// Clones share the same underlying time, so a host (or a test) can keep one
/// handle and give another to the engine. Useful for frame-timestamp driven
/// hosts and for deterministic tests.
///
/// ```rust
/// use core::time::Duration;
/// use understory_windowing::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let engine_side = clock.clone();
/// clock.advance(Duration::from_millis(16));
/// assert_eq!(engine_side.now(), Duration::from_millis(16));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time. Values earlier than the current reading are
    /// ignored to keep the clock monotonic.
    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Wall-clock time from [`std::time::Instant`], measured from construction.
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Creates a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
