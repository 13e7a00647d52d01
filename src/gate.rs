//! The [`AccessGate`] guarding the one-time construction of a shared instance
//! and the [`RawLock`] trait abstracting over its exclusion primitive.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::holder::TimeoutError;
use crate::internal::Sealed;
use crate::state::{AtomicReadyState, ReadyState};

////////////////////////////////////////////////////////////////////////////////////////////////////
// RawLock (trait)
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A sealed trait for abstracting over different exclusion primitives.
///
/// # Safety
///
/// Implementations must guarantee mutual exclusion: between a successful
/// acquisition and the matching call to [`unlock`][RawLock::unlock] no other
/// acquisition may succeed.
/// Every acquisition must synchronize-with (acquire) the preceding
/// [`unlock`][RawLock::unlock] (release).
pub unsafe trait RawLock: Sealed {
    /// The initial, unlocked state.
    const INIT: Self;

    /// Acquires the lock, blocking the current thread until it is available.
    fn lock(&self);

    /// Attempts to acquire the lock, giving up once `timeout` has elapsed.
    ///
    /// Returns `true` if the lock was acquired.
    fn try_lock_for(&self, timeout: Duration) -> bool;

    /// Releases the lock.
    ///
    /// # Safety
    ///
    /// Must only be called by the current owner of the lock.
    unsafe fn unlock(&self);
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// AccessGate
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The ready indicator of a shared instance together with the lock that has
/// to be held for constructing and publishing it.
#[derive(Debug)]
pub(crate) struct AccessGate<L> {
    state: AtomicReadyState,
    lock: L,
    acquisitions: AtomicUsize,
}

/********** impl inherent *************************************************************************/

impl<L> AccessGate<L> {
    /// Returns `true` if the instance has been published, through an
    /// exclusive reference.
    #[inline]
    pub(crate) fn is_ready_mut(&mut self) -> bool {
        self.state.get_mut() == ReadyState::Ready
    }

    /// Closes the gate again and returns `true` if it had been open.
    #[inline]
    pub(crate) fn reset_mut(&mut self) -> bool {
        self.state.reset_mut() == ReadyState::Ready
    }
}

impl<L: RawLock> AccessGate<L> {
    /// Creates a new closed gate.
    #[inline]
    pub(crate) const fn uninit() -> Self {
        Self { state: AtomicReadyState::uninit(), lock: L::INIT, acquisitions: AtomicUsize::new(0) }
    }

    /// Creates a new gate, for which the instance is already published.
    #[inline]
    pub(crate) const fn ready() -> Self {
        Self { state: AtomicReadyState::ready(), lock: L::INIT, acquisitions: AtomicUsize::new(0) }
    }

    /// Returns `true` if the instance has been published.
    ///
    /// This never blocks and never touches the lock.
    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        // (gate:1) this acquire load syncs-with the release store (gate:2)
        self.state.load(Ordering::Acquire) == ReadyState::Ready
    }

    /// Returns the number of times the lock has been acquired.
    #[inline]
    pub(crate) fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }

    /// Acquires the lock, blocking until it becomes available.
    #[inline]
    pub(crate) fn lock(&self) -> GateGuard<'_, L> {
        self.lock.lock();
        self.acquired()
    }

    /// Acquires the lock or fails once `timeout` has elapsed.
    #[inline]
    pub(crate) fn try_lock_for(&self, timeout: Duration) -> Result<GateGuard<'_, L>, TimeoutError> {
        if self.lock.try_lock_for(timeout) {
            Ok(self.acquired())
        } else {
            log::trace!("gave up on the construction lock after {:?}", timeout);
            Err(TimeoutError::new(timeout))
        }
    }

    #[inline]
    fn acquired(&self) -> GateGuard<'_, L> {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        GateGuard { gate: self }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// GateGuard
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Proof of holding the lock of an [`AccessGate`].
///
/// Dropping the guard without calling [`publish`][GateGuard::publish] (e.g.
/// when the construction fails or panics) releases the lock and leaves the
/// gate closed, so that a later caller can retry.
#[derive(Debug)]
pub(crate) struct GateGuard<'a, L: RawLock> {
    gate: &'a AccessGate<L>,
}

impl<L: RawLock> GateGuard<'_, L> {
    /// Returns `true` if another thread published the instance while the
    /// current thread was waiting for the lock.
    #[inline]
    pub(crate) fn is_ready(&self) -> bool {
        // the lock acquisition already syncs-with the release of the thread
        // that published, so a relaxed load suffices
        self.gate.state.load(Ordering::Relaxed) == ReadyState::Ready
    }

    /// Publishes the instance and releases the lock.
    #[inline]
    pub(crate) fn publish(self) {
        // (gate:2) this release store syncs-with the acquire load (gate:1)
        self.gate.state.store_ready(Ordering::Release);
    }
}

/********** impl Drop *****************************************************************************/

impl<L: RawLock> Drop for GateGuard<'_, L> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: a guard only exists while the lock is held by this thread
        unsafe { self.gate.lock.unlock() };
    }
}
