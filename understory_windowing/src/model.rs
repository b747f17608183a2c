// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::Scalar;

/// Position of a single item along the scroll axis.
///
/// Offsets are the prefix sum of sizes: item `0` starts at `0`, and every
/// following item starts where the previous one ends.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemPosition<S = f64> {
    /// Index of the item in `0..len`.
    pub index: usize,
    /// Distance from the start of the content to the item's leading edge.
    pub offset: S,
    /// Size of the item along the scroll axis.
    pub size: S,
}

impl<S: Scalar> ItemPosition<S> {
    /// Offset of the item's trailing edge (`offset + size`).
    #[must_use]
    pub fn end(&self) -> S {
        self.offset + self.size
    }

    /// Returns `true` if `offset` falls inside `[self.offset, self.end())`.
    #[must_use]
    pub fn contains_offset(&self, offset: S) -> bool {
        offset >= self.offset && offset < self.end()
    }
}

/// A dense 1D strip of items indexed `0..len` with per-item sizes.
///
/// Implementations must keep offsets monotonically non-decreasing with
/// `offset_of(0) == 0` and `offset_of(i) == offset_of(i - 1) + size_of(i - 1)`.
/// Queries outside `0..len` return zero rather than panicking; the engine
/// issues such queries transiently while options change.
pub trait ExtentModel {
    /// Coordinate type used for offsets and sizes.
    type Scalar: Scalar;

    /// Number of items in the strip.
    fn len(&self) -> usize;

    /// Returns `true` if the strip has no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of item `index`, or zero when out of range.
    fn size_of(&self, index: usize) -> Self::Scalar;

    /// Leading offset of item `index`, or zero when out of range.
    fn offset_of(&self, index: usize) -> Self::Scalar;

    /// Total extent of the strip: trailing edge of the last item, or zero.
    fn total_extent(&self) -> Self::Scalar {
        match self.len() {
            0 => Self::Scalar::zero(),
            len => self.offset_of(len - 1) + self.size_of(len - 1),
        }
    }

    /// Returns the item whose extent contains `offset`.
    ///
    /// The default implementation binary-searches [`ExtentModel::offset_of`];
    /// see [`find_index_at_offset`](crate::find_index_at_offset) for the exact
    /// contract. Models with a closed-form layout may override it.
    fn index_at_offset(&self, offset: Self::Scalar) -> usize {
        crate::locate::binary_search_offset(self, offset)
    }

    /// Full position record for `index`, or `None` when out of range.
    fn position(&self, index: usize) -> Option<ItemPosition<Self::Scalar>> {
        (index < self.len()).then(|| ItemPosition {
            index,
            offset: self.offset_of(index),
            size: self.size_of(index),
        })
    }
}
