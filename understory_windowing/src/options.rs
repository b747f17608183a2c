// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration and partial updates.
//!
//! [`EngineOptions`] is the full configuration handed to
//! [`WindowEngine`](crate::WindowEngine) at construction. [`OptionsUpdate`]
//! carries any subset of it for
//! [`WindowEngine::update_options`](crate::WindowEngine::update_options).
//!
//! The engine is lenient: it runs every configuration through
//! [`EngineOptions::sanitized`] and never rejects input. Hosts that load
//! options from a settings file and want to surface mistakes can call
//! [`EngineOptions::validate`] first.

use core::fmt;
use core::time::Duration;

use crate::{ItemSize, OverscanConfig, Scalar};

/// Default delay after the last scroll sample before the engine goes idle.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(150);

/// Which signals refine the visible range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefinementMode {
    /// The range comes from the scroll offset alone.
    #[default]
    ScrollOnly,
    /// The scroll-derived range is widened by visibility reports from the
    /// host, see [`WindowEngine::report_visible`](crate::WindowEngine::report_visible).
    ScrollPlusVisibilityHints,
}

/// Full engine configuration.
#[derive(Clone, Debug)]
pub struct EngineOptions<S: Scalar = f64> {
    /// Number of items in the list.
    pub item_count: usize,
    /// Size of each item along the scroll axis.
    pub item_size: ItemSize<S>,
    /// Size of the scrolling container along the scroll axis.
    pub viewport_extent: S,
    /// Overscan bounds and velocity response.
    pub overscan: OverscanConfig,
    /// Quiet period after the last scroll sample before going idle.
    pub idle_delay: Duration,
    /// Secondary signal used to refine the visible range.
    pub refinement_mode: RefinementMode,
}

impl<S: Scalar> EngineOptions<S> {
    /// Options for `item_count` items of the given sizing in a viewport of
    /// `viewport_extent`, with default overscan and idle delay.
    pub fn new(item_count: usize, item_size: impl Into<ItemSize<S>>, viewport_extent: S) -> Self {
        Self {
            item_count,
            item_size: item_size.into(),
            viewport_extent,
            overscan: OverscanConfig::default(),
            idle_delay: DEFAULT_IDLE_DELAY,
            refinement_mode: RefinementMode::default(),
        }
    }

    /// Sets the idle overscan.
    #[must_use]
    pub fn with_base_overscan(mut self, base: usize) -> Self {
        self.overscan.base = base;
        self
    }

    /// Sets the bounds for dynamic overscan.
    #[must_use]
    pub fn with_overscan_bounds(mut self, min: usize, max: usize) -> Self {
        self.overscan.min = min;
        self.overscan.max = max;
        self
    }

    /// Sets the velocity (units per millisecond) at which overscan doubles.
    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.overscan.velocity_threshold = threshold;
        self
    }

    /// Replaces the whole overscan configuration.
    #[must_use]
    pub fn with_overscan(mut self, overscan: OverscanConfig) -> Self {
        self.overscan = overscan;
        self
    }

    /// Sets the scroll-end delay.
    #[must_use]
    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }

    /// Sets the refinement mode.
    #[must_use]
    pub fn with_refinement_mode(mut self, mode: RefinementMode) -> Self {
        self.refinement_mode = mode;
        self
    }

    /// Returns a copy the engine can run with unconditionally.
    ///
    /// Negative or non-finite viewport extents become zero, and overscan bounds
    /// are ordered with `base` clamped into them. Item sizes are sanitized per
    /// item when the position index is built.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.viewport_extent = self.viewport_extent.sanitize_extent();
        self.overscan = self.overscan.sanitized();
        self
    }

    /// Checks the options strictly, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns an [`OptionsError`] describing the first inconsistency.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let viewport = self.viewport_extent.to_f64();
        if !viewport.is_finite() {
            return Err(OptionsError::NonFiniteExtent {
                field: "viewport_extent",
            });
        }
        if viewport < 0.0 {
            return Err(OptionsError::NegativeExtent {
                field: "viewport_extent",
                value: viewport,
            });
        }
        if let ItemSize::Fixed(size) = self.item_size {
            let size = size.to_f64();
            if !size.is_finite() {
                return Err(OptionsError::NonFiniteExtent { field: "item_size" });
            }
            if size < 0.0 {
                return Err(OptionsError::NegativeExtent {
                    field: "item_size",
                    value: size,
                });
            }
        }
        let overscan = &self.overscan;
        if overscan.min > overscan.max {
            return Err(OptionsError::MinExceedsMax {
                min: overscan.min,
                max: overscan.max,
            });
        }
        if overscan.base < overscan.min || overscan.base > overscan.max {
            return Err(OptionsError::BaseOutOfBounds {
                base: overscan.base,
                min: overscan.min,
                max: overscan.max,
            });
        }
        if overscan.velocity_threshold.is_nan() || overscan.velocity_threshold <= 0.0 {
            return Err(OptionsError::NonPositiveThreshold {
                value: overscan.velocity_threshold,
            });
        }
        Ok(())
    }

    /// Merges `update` into these options.
    ///
    /// Returns `true` if the position index must be rebuilt, i.e. the item
    /// count changed or the item sizing is no longer the
    /// [same](ItemSize::same_as).
    pub fn apply(&mut self, update: OptionsUpdate<S>) -> bool {
        let mut rebuild = false;
        if let Some(count) = update.item_count {
            rebuild |= count != self.item_count;
            self.item_count = count;
        }
        if let Some(size) = update.item_size {
            rebuild |= !size.same_as(&self.item_size);
            self.item_size = size;
        }
        if let Some(viewport) = update.viewport_extent {
            self.viewport_extent = viewport;
        }
        if let Some(base) = update.base_overscan {
            self.overscan.base = base;
        }
        if let Some(min) = update.min_overscan {
            self.overscan.min = min;
        }
        if let Some(max) = update.max_overscan {
            self.overscan.max = max;
        }
        if let Some(threshold) = update.velocity_threshold {
            self.overscan.velocity_threshold = threshold;
        }
        if let Some(delay) = update.idle_delay {
            self.idle_delay = delay;
        }
        if let Some(mode) = update.refinement_mode {
            self.refinement_mode = mode;
        }
        rebuild
    }
}

/// A partial set of options; `None` fields keep their current value.
///
/// ```rust
/// use understory_windowing::OptionsUpdate;
///
/// let update = OptionsUpdate::<f64>::default()
///     .item_count(5_000)
///     .viewport_extent(720.0);
/// assert_eq!(update.item_count, Some(5_000));
/// assert!(update.item_size.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct OptionsUpdate<S: Scalar = f64> {
    /// New item count.
    pub item_count: Option<usize>,
    /// New item sizing.
    pub item_size: Option<ItemSize<S>>,
    /// New viewport extent.
    pub viewport_extent: Option<S>,
    /// New idle overscan.
    pub base_overscan: Option<usize>,
    /// New lower bound on dynamic overscan.
    pub min_overscan: Option<usize>,
    /// New upper bound on dynamic overscan.
    pub max_overscan: Option<usize>,
    /// New velocity threshold.
    pub velocity_threshold: Option<f64>,
    /// New scroll-end delay.
    pub idle_delay: Option<Duration>,
    /// New refinement mode.
    pub refinement_mode: Option<RefinementMode>,
}

impl<S: Scalar> Default for OptionsUpdate<S> {
    fn default() -> Self {
        Self {
            item_count: None,
            item_size: None,
            viewport_extent: None,
            base_overscan: None,
            min_overscan: None,
            max_overscan: None,
            velocity_threshold: None,
            idle_delay: None,
            refinement_mode: None,
        }
    }
}

impl<S: Scalar> OptionsUpdate<S> {
    /// Sets the item count.
    #[must_use]
    pub fn item_count(mut self, count: usize) -> Self {
        self.item_count = Some(count);
        self
    }

    /// Sets the item sizing.
    #[must_use]
    pub fn item_size(mut self, size: impl Into<ItemSize<S>>) -> Self {
        self.item_size = Some(size.into());
        self
    }

    /// Sets the viewport extent.
    #[must_use]
    pub fn viewport_extent(mut self, extent: S) -> Self {
        self.viewport_extent = Some(extent);
        self
    }

    /// Sets the idle overscan.
    #[must_use]
    pub fn base_overscan(mut self, base: usize) -> Self {
        self.base_overscan = Some(base);
        self
    }

    /// Sets the lower bound on dynamic overscan.
    #[must_use]
    pub fn min_overscan(mut self, min: usize) -> Self {
        self.min_overscan = Some(min);
        self
    }

    /// Sets the upper bound on dynamic overscan.
    #[must_use]
    pub fn max_overscan(mut self, max: usize) -> Self {
        self.max_overscan = Some(max);
        self
    }

    /// Sets both dynamic overscan bounds.
    #[must_use]
    pub fn overscan_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_overscan = Some(min);
        self.max_overscan = Some(max);
        self
    }

    /// Sets the velocity threshold.
    #[must_use]
    pub fn velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = Some(threshold);
        self
    }

    /// Sets the scroll-end delay.
    #[must_use]
    pub fn idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = Some(delay);
        self
    }

    /// Sets the refinement mode.
    #[must_use]
    pub fn refinement_mode(mut self, mode: RefinementMode) -> Self {
        self.refinement_mode = Some(mode);
        self
    }
}

/// A problem reported by [`EngineOptions::validate`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OptionsError {
    /// An extent is NaN or infinite.
    NonFiniteExtent {
        /// Name of the offending option.
        field: &'static str,
    },
    /// An extent is negative.
    NegativeExtent {
        /// Name of the offending option.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// `min_overscan` is greater than `max_overscan`.
    MinExceedsMax {
        /// Configured lower bound.
        min: usize,
        /// Configured upper bound.
        max: usize,
    },
    /// `base_overscan` lies outside `[min_overscan, max_overscan]`.
    BaseOutOfBounds {
        /// Configured idle overscan.
        base: usize,
        /// Configured lower bound.
        min: usize,
        /// Configured upper bound.
        max: usize,
    },
    /// The velocity threshold is zero, negative, or NaN.
    NonPositiveThreshold {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteExtent { field } => write!(f, "{field} must be finite"),
            Self::NegativeExtent { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            Self::MinExceedsMax { min, max } => {
                write!(f, "min_overscan {min} exceeds max_overscan {max}")
            }
            Self::BaseOutOfBounds { base, min, max } => {
                write!(f, "base_overscan {base} is outside [{min}, {max}]")
            }
            Self::NonPositiveThreshold { value } => {
                write!(f, "velocity_threshold must be positive (got {value})")
            }
        }
    }
}

impl core::error::Error for OptionsError {}
