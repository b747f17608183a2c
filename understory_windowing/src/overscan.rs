// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overscan controller: scroll velocity in, buffer size out.
//!
//! Fast scrolling outruns rendering, so the window is padded with more items
//! the faster the user scrolls. The response is linear in velocity up to a
//! fixed ceiling ([`MAX_VELOCITY_FACTOR`]) and always clamped into
//! `[min, max]`, so a fling can never request an unbounded buffer.
//!
//! Velocities are magnitudes in scroll units per millisecond.

use core::time::Duration;

/// Upper bound on `velocity / velocity_threshold` when sizing overscan.
///
/// At this factor the buffer is `base * (1 + MAX_VELOCITY_FACTOR)` items before
/// clamping.
pub const MAX_VELOCITY_FACTOR: f64 = 3.0;

/// Overscan sizing parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverscanConfig {
    /// Overscan used while idle and as the base of the velocity response.
    pub base: usize,
    /// Lower bound on dynamic overscan.
    pub min: usize,
    /// Upper bound on dynamic overscan; also the pre-expansion radius for
    /// index jumps.
    pub max: usize,
    /// Velocity (units per millisecond) at which overscan doubles from `base`.
    pub velocity_threshold: f64,
}

impl Default for OverscanConfig {
    fn default() -> Self {
        Self {
            base: 3,
            min: 1,
            max: 10,
            velocity_threshold: 1.0,
        }
    }
}

impl OverscanConfig {
    /// Returns a copy with `min <= base <= max` enforced.
    ///
    /// Reversed bounds are swapped and `base` is clamped into them. The
    /// velocity threshold is left untouched; [`dynamic_overscan`] already
    /// handles non-positive thresholds.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let (min, max) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        Self {
            base: self.base.clamp(min, max),
            min,
            max,
            velocity_threshold: self.velocity_threshold,
        }
    }

    /// Overscan for the given velocity under this configuration.
    #[must_use]
    pub fn overscan_for(&self, velocity: f64) -> usize {
        dynamic_overscan(
            velocity,
            self.base,
            self.min,
            self.max,
            self.velocity_threshold,
        )
    }
}

/// Estimates scroll velocity between two samples.
///
/// Returns `|curr_offset - prev_offset| / elapsed` in units per millisecond.
/// When no time has elapsed (or the clock stepped backwards) the previous
/// estimate is returned unchanged instead of an infinite spike.
#[must_use]
pub fn sample_velocity(
    prev_offset: f64,
    prev_time: Duration,
    curr_offset: f64,
    curr_time: Duration,
    prev_velocity: f64,
) -> f64 {
    let elapsed_ms = match curr_time.checked_sub(prev_time) {
        Some(elapsed) if !elapsed.is_zero() => elapsed.as_secs_f64() * 1000.0,
        _ => return prev_velocity,
    };
    let distance = libm::fabs(curr_offset - prev_offset);
    if distance.is_finite() {
        distance / elapsed_ms
    } else {
        prev_velocity
    }
}

/// Sizes the overscan buffer for a scroll velocity.
///
/// `factor = min(velocity / velocity_threshold, MAX_VELOCITY_FACTOR)`, then
/// `round(base * (1 + factor))` clamped into `[min, max]`. Zero, negative, or
/// NaN velocity counts as standing still. A non-positive threshold saturates
/// the factor for any motion at all.
#[must_use]
pub fn dynamic_overscan(
    velocity: f64,
    base: usize,
    min: usize,
    max: usize,
    velocity_threshold: f64,
) -> usize {
    let factor = if velocity.is_nan() || velocity <= 0.0 {
        0.0
    } else if velocity_threshold > 0.0 {
        (velocity / velocity_threshold).min(MAX_VELOCITY_FACTOR)
    } else {
        MAX_VELOCITY_FACTOR
    };
    let raw = libm::round(base as f64 * (1.0 + factor));
    #[expect(
        clippy::cast_possible_truncation,
        reason = "raw is finite and non-negative; saturating float-to-int cast is intended"
    )]
    let raw = raw as usize;
    // Applied as max-then-min so reversed bounds cannot panic.
    raw.max(min).min(max)
}

/// Tracks the last scroll sample and the running velocity estimate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VelocityTracker {
    last_offset: f64,
    last_time: Duration,
    velocity: f64,
}

impl VelocityTracker {
    /// Starts tracking from a known offset and time with zero velocity.
    #[must_use]
    pub fn new(offset: f64, now: Duration) -> Self {
        Self {
            last_offset: offset,
            last_time: now,
            velocity: 0.0,
        }
    }

    /// Records a new sample and returns the updated velocity.
    pub fn record(&mut self, offset: f64, now: Duration) -> f64 {
        self.velocity = sample_velocity(
            self.last_offset,
            self.last_time,
            offset,
            now,
            self.velocity,
        );
        self.last_offset = offset;
        self.last_time = now;
        self.velocity
    }

    /// Moves the reference sample without touching the velocity estimate.
    ///
    /// Used for programmatic jumps, so the next real scroll sample is measured
    /// from the jump target instead of reading the jump itself as a fling.
    pub fn rebase(&mut self, offset: f64, now: Duration) {
        self.last_offset = offset;
        self.last_time = now;
    }

    /// Drops the velocity estimate to zero, keeping the last sample.
    pub fn reset(&mut self) {
        self.velocity = 0.0;
    }

    /// Current velocity estimate in units per millisecond.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::{OverscanConfig, VelocityTracker, dynamic_overscan, sample_velocity};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn velocity_is_distance_over_elapsed_millis() {
        assert_eq!(sample_velocity(0.0, ms(0), 500.0, ms(100), 0.0), 5.0);
        assert_eq!(sample_velocity(500.0, ms(100), 300.0, ms(200), 0.0), 2.0);
    }

    #[test]
    fn zero_elapsed_holds_previous_velocity() {
        assert_eq!(sample_velocity(0.0, ms(10), 9000.0, ms(10), 1.5), 1.5);
        assert_eq!(sample_velocity(0.0, ms(20), 100.0, ms(10), 0.25), 0.25);
    }

    #[test]
    fn overscan_scales_with_velocity_and_caps() {
        // base 3: idle → 3, threshold → 6, 3x threshold and beyond → 12 before clamping.
        assert_eq!(dynamic_overscan(0.0, 3, 1, 20, 1.0), 3);
        assert_eq!(dynamic_overscan(1.0, 3, 1, 20, 1.0), 6);
        assert_eq!(dynamic_overscan(0.5, 3, 1, 20, 1.0), 5);
        assert_eq!(dynamic_overscan(3.0, 3, 1, 20, 1.0), 12);
        assert_eq!(dynamic_overscan(1000.0, 3, 1, 20, 1.0), 12);
        assert_eq!(dynamic_overscan(1000.0, 3, 1, 10, 1.0), 10);
        assert_eq!(dynamic_overscan(0.0, 0, 2, 10, 1.0), 2);
    }

    #[test]
    fn overscan_tolerates_degenerate_inputs() {
        assert_eq!(dynamic_overscan(f64::NAN, 3, 1, 10, 1.0), 3);
        assert_eq!(dynamic_overscan(-4.0, 3, 1, 10, 1.0), 3);
        assert_eq!(dynamic_overscan(f64::INFINITY, 3, 1, 20, 1.0), 12);
        assert_eq!(dynamic_overscan(0.1, 3, 1, 20, 0.0), 12);
        assert_eq!(dynamic_overscan(0.0, 3, 1, 20, 0.0), 3);
        // Reversed bounds resolve without panicking.
        assert_eq!(dynamic_overscan(0.0, 3, 10, 1, 1.0), 1);
    }

    #[test]
    fn sanitized_config_orders_bounds() {
        let config = OverscanConfig {
            base: 50,
            min: 8,
            max: 2,
            velocity_threshold: 1.0,
        }
        .sanitized();
        assert_eq!((config.min, config.base, config.max), (2, 8, 8));
    }

    #[test]
    fn tracker_records_rebases_and_resets() {
        let mut tracker = VelocityTracker::new(0.0, ms(0));
        assert_eq!(tracker.record(200.0, ms(100)), 2.0);
        tracker.rebase(10_000.0, ms(100));
        assert_eq!(tracker.record(10_100.0, ms(200)), 1.0);
        tracker.reset();
        assert_eq!(tracker.velocity(), 0.0);
        assert_eq!(tracker.record(10_100.0, ms(200)), 0.0);
    }
}
