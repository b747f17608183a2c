// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Range locator: from a scroll offset to the indices that must be mounted.

use core::cmp::Ordering;
use core::ops::Range;

use crate::{ExtentModel, Scalar};

/// An inclusive range of item indices `[start, end]`.
///
/// A non-empty range always satisfies `start <= end < item_count`. The empty
/// range (used when there are no items) is represented with `start > end`,
/// the same convention [`core::ops::RangeInclusive::is_empty`] uses; prefer
/// [`VisibleRange::EMPTY`] and [`VisibleRange::is_empty`] over inspecting the
/// fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    /// First index to mount (inclusive).
    pub start: usize,
    /// Last index to mount (inclusive).
    pub end: usize,
}

impl VisibleRange {
    /// The range that contains no indices.
    pub const EMPTY: Self = Self { start: 1, end: 0 };

    /// Creates an inclusive range, swapping the bounds if they are reversed.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates `[start, end]` clamped to `0..len`, or [`VisibleRange::EMPTY`]
    /// when `len == 0`.
    #[must_use]
    pub fn clamped(start: usize, end: usize, len: usize) -> Self {
        if len == 0 {
            return Self::EMPTY;
        }
        let last = len - 1;
        Self::new(start.min(last), end.min(last))
    }

    /// Returns `true` if the range contains no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Number of indices in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Returns `true` if `index` lies inside the range.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        !self.is_empty() && self.start <= index && index <= self.end
    }

    /// The equivalent half-open range `start..end + 1` (or `0..0` when empty).
    #[must_use]
    pub fn as_range(&self) -> Range<usize> {
        if self.is_empty() {
            0..0
        } else {
            self.start..self.end + 1
        }
    }

    /// Smallest range covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => other,
            (_, true) => self,
            _ => Self {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            },
        }
    }

    /// Widens the range by `amount` on each side and clamps it to `0..len`.
    #[must_use]
    pub fn padded(self, amount: usize, len: usize) -> Self {
        if self.is_empty() {
            return self;
        }
        Self::clamped(
            self.start.saturating_sub(amount),
            self.end.saturating_add(amount),
            len,
        )
    }
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl IntoIterator for VisibleRange {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_range()
    }
}

impl From<VisibleRange> for Range<usize> {
    fn from(range: VisibleRange) -> Self {
        range.as_range()
    }
}

/// Returns `true` for negative offsets and NaN.
pub(crate) fn is_before_origin<S: Scalar>(offset: S) -> bool {
    matches!(offset.partial_cmp(&S::zero()), None | Some(Ordering::Less))
}

/// Binary search for the greatest index whose offset is `<= target`.
pub(crate) fn binary_search_offset<M: ExtentModel + ?Sized>(model: &M, target: M::Scalar) -> usize {
    let len = model.len();
    if len == 0 || is_before_origin(target) {
        return 0;
    }
    // Offsets are non-decreasing, so this is a partition point.
    let mut lo = 0;
    let mut hi = len;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if model.offset_of(mid) <= target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo.saturating_sub(1).min(len - 1)
}

/// Finds the item whose extent contains `target`.
///
/// Returns the greatest `i` with `offset_of(i) <= target`, so a target that
/// falls exactly on a boundary resolves to the item that *starts* there.
/// The result is clamped to `0..len`: negative or NaN targets map to `0`,
/// targets past the end map to the last item, and an empty model yields `0`.
///
/// Runs in O(log n) (O(1) for fixed-size [`PositionIndex`](crate::PositionIndex)
/// layouts).
#[must_use]
pub fn find_index_at_offset<M: ExtentModel + ?Sized>(model: &M, target: M::Scalar) -> usize {
    model.index_at_offset(target)
}

/// Counts the items from `start_index` needed to cover `viewport_extent`.
///
/// Walks forward accumulating sizes until they reach `viewport_extent`, and
/// returns how many items were fully or partially visible. The walk is bounded
/// by the number of items on screen, not by `len`. A non-empty walk always
/// counts at least one item; an out-of-range `start_index` yields `0`.
#[must_use]
pub fn visible_span<M: ExtentModel + ?Sized>(
    model: &M,
    start_index: usize,
    viewport_extent: M::Scalar,
) -> usize {
    let len = model.len();
    if start_index >= len {
        return 0;
    }
    let mut covered = M::Scalar::zero();
    let mut count = 0;
    for index in start_index..len {
        covered = covered + model.size_of(index);
        count += 1;
        if covered >= viewport_extent {
            break;
        }
    }
    count
}

/// Computes the padded, clamped range to mount for a scroll position.
///
/// The first item is located with [`find_index_at_offset`]. The span walk then
/// covers the viewport *plus* the part of that first item already scrolled
/// past, so the trailing edge of the viewport is always covered. Finally the
/// range is widened by `overscan` items on each side.
#[must_use]
pub fn compute_visible_range<M: ExtentModel + ?Sized>(
    model: &M,
    scroll_offset: M::Scalar,
    viewport_extent: M::Scalar,
    overscan: usize,
) -> VisibleRange {
    let len = model.len();
    if len == 0 {
        return VisibleRange::EMPTY;
    }
    let first = find_index_at_offset(model, scroll_offset);
    let hidden_lead = if scroll_offset.is_finite() {
        (scroll_offset - model.offset_of(first)).clamp_non_negative()
    } else {
        M::Scalar::zero()
    };
    let span = visible_span(model, first, viewport_extent.sanitize_extent() + hidden_lead).max(1);
    let last = first.saturating_add(span - 1);
    VisibleRange::clamped(first, last, len).padded(overscan, len)
}
