// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position index: maps item indices to offsets and sizes.
//!
//! [`ItemSize`] says how big items are; [`PositionIndex`] turns that into
//! offsets. The choice between the two layouts is made once, when the index is
//! built:
//!
//! - [`ItemSize::Fixed`] stores nothing per item. Offsets are `index * size`,
//!   and locating the item at an offset is a division, so lists with hundreds
//!   of thousands of uniform rows cost O(1) memory.
//! - [`ItemSize::Variable`] calls the size function once per item and stores a
//!   prefix-sum table. Lookups are table reads; locating is a binary search.
//!
//! ```rust
//! use understory_windowing::{ExtentModel, ItemSize, PositionIndex};
//!
//! let index = PositionIndex::build(4, &ItemSize::variable(|i| 50.0 + (i % 3) as f64 * 20.0));
//! assert_eq!(index.offset_of(0), 0.0);
//! assert_eq!(index.offset_of(1), 50.0);
//! assert_eq!(index.offset_of(2), 120.0);
//! assert_eq!(index.offset_of(3), 210.0);
//! assert_eq!(index.total_extent(), 260.0);
//! ```

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use crate::{ExtentModel, ItemPosition, Scalar};

/// Shared per-index size function used by [`ItemSize::Variable`].
pub type SizeFn<S> = dyn Fn(usize) -> S + Send + Sync;

/// How large each item is along the scroll axis.
pub enum ItemSize<S: Scalar = f64> {
    /// Every item has the same size.
    Fixed(S),
    /// Item sizes come from a function of the index.
    ///
    /// The function is shared, and two `Variable` values are considered the
    /// same sizing only when they point at the same function.
    Variable(Arc<SizeFn<S>>),
}

impl<S: Scalar> ItemSize<S> {
    /// Wraps a per-index size function.
    pub fn variable(size_fn: impl Fn(usize) -> S + Send + Sync + 'static) -> Self {
        Self::Variable(Arc::new(size_fn))
    }

    /// Returns `true` if both values describe the same sizing.
    ///
    /// Fixed sizes compare by value; variable sizes compare by function
    /// identity, since closures cannot be compared structurally.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            (Self::Variable(a), Self::Variable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Evaluates the size of `index`, sanitized to a finite non-negative value.
    #[must_use]
    pub fn size_at(&self, index: usize) -> S {
        match self {
            Self::Fixed(size) => size.sanitize_extent(),
            Self::Variable(size_fn) => size_fn(index).sanitize_extent(),
        }
    }
}

impl<S: Scalar> Clone for ItemSize<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(size) => Self::Fixed(*size),
            Self::Variable(size_fn) => Self::Variable(Arc::clone(size_fn)),
        }
    }
}

impl<S: Scalar> fmt::Debug for ItemSize<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Variable(size_fn) => f
                .debug_tuple("Variable")
                .field(&Arc::as_ptr(size_fn).cast::<()>())
                .finish(),
        }
    }
}

impl<S: Scalar> From<S> for ItemSize<S> {
    fn from(size: S) -> Self {
        Self::Fixed(size)
    }
}

#[derive(Clone, Debug)]
enum Layout<S> {
    Fixed(S),
    Table { offsets: Vec<S>, sizes: Vec<S> },
}

/// Immutable index → (offset, size) mapping for `len` items.
///
/// Built once per `(item_count, item_size)` pair; rebuild it when either
/// changes.
#[derive(Clone, Debug)]
pub struct PositionIndex<S: Scalar = f64> {
    len: usize,
    layout: Layout<S>,
}

impl<S: Scalar> PositionIndex<S> {
    /// Builds the index for `item_count` items.
    ///
    /// This is O(1) for [`ItemSize::Fixed`] and O(n) time and space for
    /// [`ItemSize::Variable`].
    #[must_use]
    pub fn build(item_count: usize, item_size: &ItemSize<S>) -> Self {
        let layout = match item_size {
            ItemSize::Fixed(size) => Layout::Fixed(size.sanitize_extent()),
            ItemSize::Variable(_) => {
                let mut offsets = Vec::with_capacity(item_count);
                let mut sizes = Vec::with_capacity(item_count);
                let mut cursor = S::zero();
                for index in 0..item_count {
                    let size = item_size.size_at(index);
                    offsets.push(cursor);
                    sizes.push(size);
                    cursor = cursor + size;
                }
                Layout::Table { offsets, sizes }
            }
        };
        Self {
            len: item_count,
            layout,
        }
    }

    /// An index with no items.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            len: 0,
            layout: Layout::Fixed(S::zero()),
        }
    }

    /// Returns `true` if this index uses the closed-form fixed-size layout.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self.layout, Layout::Fixed(_))
    }

    /// Iterates positions for the indices in `range`, skipping any that are
    /// out of bounds.
    pub fn positions(&self, range: Range<usize>) -> impl Iterator<Item = ItemPosition<S>> + '_ {
        let end = range.end.min(self.len);
        let start = range.start.min(end);
        (start..end).map(|index| ItemPosition {
            index,
            offset: self.offset_of(index),
            size: self.size_of(index),
        })
    }
}

impl<S: Scalar> Default for PositionIndex<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Scalar> ExtentModel for PositionIndex<S> {
    type Scalar = S;

    fn len(&self) -> usize {
        self.len
    }

    fn size_of(&self, index: usize) -> S {
        if index >= self.len {
            return S::zero();
        }
        match &self.layout {
            Layout::Fixed(size) => *size,
            Layout::Table { sizes, .. } => sizes[index],
        }
    }

    fn offset_of(&self, index: usize) -> S {
        if index >= self.len {
            return S::zero();
        }
        match &self.layout {
            Layout::Fixed(size) => S::from_usize(index) * *size,
            Layout::Table { offsets, .. } => offsets[index],
        }
    }

    fn index_at_offset(&self, offset: S) -> usize {
        match self.layout {
            Layout::Fixed(size) => fixed_index_at_offset(self, size, offset),
            Layout::Table { .. } => crate::locate::binary_search_offset(self, offset),
        }
    }
}

/// Closed-form locate for uniform sizes, nudged by one step to agree exactly
/// with [`ExtentModel::offset_of`] under floating-point rounding.
fn fixed_index_at_offset<S: Scalar>(index: &PositionIndex<S>, size: S, offset: S) -> usize {
    let len = index.len;
    if len == 0 || crate::locate::is_before_origin(offset) {
        return 0;
    }
    if size <= S::zero() {
        // Every item sits at offset zero; the last one wins.
        return len - 1;
    }
    let approx = libm::floor(offset.to_f64() / size.to_f64());
    let mut candidate = if approx >= len as f64 {
        len - 1
    } else {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "approx is finite, non-negative, and below len"
        )]
        {
            approx as usize
        }
    };
    while candidate > 0 && index.offset_of(candidate) > offset {
        candidate -= 1;
    }
    while candidate + 1 < len && index.offset_of(candidate + 1) <= offset {
        candidate += 1;
    }
    candidate
}
