//! Single slot "latest value" cell.
//!
//! Used to pass data between modules running at different rates where only the
//! most recent value matters. Writers overwrite the slot, readers copy out
//! whatever is currently in it. There is no queue and no backpressure.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use arc_swap::ArcSwap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A shared, most-recent-wins value.
///
/// Reads never block, so the controller loop can poll the slot every cycle
/// while the sampler thread writes to it. Cloning a `Latest` gives another
/// handle onto the same slot.
#[derive(Debug)]
pub struct Latest<T> {
    slot: Arc<ArcSwap<T>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> Latest<T>
where
    T: Copy,
{
    /// Create a new slot holding `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    /// Overwrite the value in the slot.
    pub fn set(&self, value: T) {
        self.slot.store(Arc::new(value));
    }

    /// Get a copy of the current value.
    pub fn get(&self) -> T {
        **self.slot.load()
    }
}

impl<T> Default for Latest<T>
where
    T: Copy + Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
