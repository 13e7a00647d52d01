use core::sync::atomic::{AtomicBool, Ordering};

use self::ReadyState::{Ready, Uninit};

////////////////////////////////////////////////////////////////////////////////////////////////////
// AtomicReadyState
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The concurrently readable "instance exists" indicator of an
/// [`AccessGate`](crate::gate::AccessGate).
///
/// The indicator is only ever written by the thread holding the gate's lock,
/// but it is read by arbitrary threads without any further synchronization.
#[derive(Debug)]
pub(crate) struct AtomicReadyState(AtomicBool);

/********** impl inherent *************************************************************************/

impl AtomicReadyState {
    /// Creates a new `UNINIT` state.
    #[inline]
    pub(crate) const fn uninit() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Creates a new `READY` state.
    #[inline]
    pub(crate) const fn ready() -> Self {
        Self(AtomicBool::new(true))
    }

    /// Loads the current state using `order`.
    #[inline]
    pub(crate) fn load(&self, order: Ordering) -> ReadyState {
        self.0.load(order).into()
    }

    /// Marks the state as `READY` using `order`.
    #[inline]
    pub(crate) fn store_ready(&self, order: Ordering) {
        self.0.store(true, order);
    }

    /// Resets the state to `UNINIT` through an exclusive reference and
    /// returns the previous state.
    #[inline]
    pub(crate) fn reset_mut(&mut self) -> ReadyState {
        let prev = *self.0.get_mut();
        *self.0.get_mut() = false;
        prev.into()
    }

    /// Returns the current state through an exclusive reference.
    #[inline]
    pub(crate) fn get_mut(&mut self) -> ReadyState {
        (*self.0.get_mut()).into()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ReadyState
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) enum ReadyState {
    /// Initial (not yet constructed) state.
    Uninit,
    /// Ready (constructed and published) state.
    Ready,
}

/********** impl From (bool) **********************************************************************/

impl From<bool> for ReadyState {
    #[inline]
    fn from(ready: bool) -> Self {
        if ready {
            Ready
        } else {
            Uninit
        }
    }
}
