// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use core::fmt;

use crate::{EngineState, Scalar, WindowEngine};

/// Callback invoked with each new engine state.
///
/// The second argument is the engine itself, so a consumer can react to an
/// update by calling back in (for example to jump to an index).
pub type UpdateFn<S> = dyn FnMut(&EngineState<S>, &mut WindowEngine<S>);

/// Single-slot holder for the update callback.
///
/// While a callback runs it is taken out of the slot. The generation counter
/// tells the engine whether the callback registered a replacement (or cleared
/// the slot) in the meantime, in which case the running callback must not be
/// put back.
pub(crate) struct UpdateSlot<S: Scalar> {
    callback: Option<Box<UpdateFn<S>>>,
    generation: u64,
}

impl<S: Scalar> UpdateSlot<S> {
    pub(crate) fn new() -> Self {
        Self {
            callback: None,
            generation: 0,
        }
    }

    pub(crate) fn set(&mut self, callback: Box<UpdateFn<S>>) {
        self.callback = Some(callback);
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn clear(&mut self) {
        self.callback = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Takes the callback out for invocation, with the generation to hand
    /// back to [`UpdateSlot::restore`].
    pub(crate) fn take(&mut self) -> Option<(Box<UpdateFn<S>>, u64)> {
        self.callback.take().map(|cb| (cb, self.generation))
    }

    /// Returns `true` if nothing replaced or cleared the slot since `take`.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Puts a taken callback back unless the slot changed meanwhile.
    pub(crate) fn restore(&mut self, callback: Box<UpdateFn<S>>, generation: u64) {
        if self.is_current(generation) {
            self.callback = Some(callback);
        }
    }
}

impl<S: Scalar> fmt::Debug for UpdateSlot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSlot")
            .field("registered", &self.callback.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}
