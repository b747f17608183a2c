// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

/// A single-slot, host-polled deadline.
///
/// Arming replaces any pending deadline, so at most one is ever outstanding.
/// Nothing fires on its own: the owner calls [`IdleTimer::poll`] with the
/// current time, and a cancelled timer can never fire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IdleTimer {
    deadline: Option<Duration>,
}

impl IdleTimer {
    /// Creates a disarmed timer.
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms (or re-arms) the timer to fire `delay` after `now`.
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.deadline = Some(now.saturating_add(delay));
    }

    /// Disarms the timer. Returns `true` if a deadline was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Returns `true` while a deadline is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Fires the timer if its deadline is at or before `now`.
    ///
    /// Returns `true` exactly once per armed deadline; the timer is disarmed
    /// when it fires.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
