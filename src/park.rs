//! Shared instance primitives that block (park) threads waiting for a
//! concurrent construction to complete.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use conquer_util::BackOff;

use crate::gate::RawLock;
use crate::internal::Sealed;

/// A slot for a lazily constructed shared instance.
///
/// This type uses the blocking synchronization mechanism provided by the
/// underlying operating system for threads waiting on a concurrent
/// construction.
///
/// For the API of this type alias, see the generic
/// [`Holder`](crate::doc::Holder) type.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use sole::Holder;
///
/// let holder = Arc::new(Holder::uninit());
///
/// let handles: Vec<_> = (0..4)
///     .map(|id| {
///         let holder = Arc::clone(&holder);
///         thread::spawn(move || *holder.get_or_construct(|| id))
///     })
///     .collect();
///
/// let winners: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
/// assert!(winners.windows(2).all(|pair| pair[0] == pair[1]));
/// assert_eq!(holder.construction_count(), 1);
/// ```
pub type Holder<T> = crate::holder::Holder<T, ParkLock>;

/// The single entry point to a lazily constructed shared instance.
///
/// This type uses the blocking synchronization mechanism provided by the
/// underlying operating system for threads waiting on a concurrent
/// construction.
///
/// For the API of this type alias, see the generic
/// [`Coordinator`](crate::doc::Coordinator) type.
pub type Coordinator<T, F = fn() -> T> = crate::coordinator::Coordinator<T, ParkLock, F>;

/// A [`Coordinator`] with a fallible constructor.
pub type TryCoordinator<T, E> = Coordinator<T, fn() -> Result<T, E>>;

////////////////////////////////////////////////////////////////////////////////////////////////////
// ParkLock
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Exclusion primitive using OS reliant blocking, after spinning briefly.
#[derive(Debug, Default)]
pub struct ParkLock {
    locked: Mutex<bool>,
    unlocked: Condvar,
}

/********** impl inherent *************************************************************************/

impl ParkLock {
    #[inline]
    fn state(&self) -> MutexGuard<'_, bool> {
        // no user code ever runs while the inner mutex is held
        self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn try_lock(&self) -> bool {
        let mut locked = self.state();
        if *locked {
            return false;
        }

        *locked = true;
        true
    }
}

/********** impl Sealed ***************************************************************************/

impl Sealed for ParkLock {}

/********** impl RawLock **************************************************************************/

// SAFETY: the flag is only ever flipped while the inner mutex is held, which
// provides the required mutual exclusion and acquire/release ordering
unsafe impl RawLock for ParkLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self { locked: Mutex::new(false), unlocked: Condvar::new() };

    /// Blocks (parks) the current thread until the lock is released by the
    /// thread currently constructing the instance.
    #[inline]
    fn lock(&self) {
        // spin a little before parking the thread in case the lock is quickly
        // released again
        let backoff = BackOff::new();
        while !backoff.advise_yield() {
            if self.try_lock() {
                return;
            }

            backoff.spin();
        }

        let mut locked = self.state();
        // the loop guards against spurious wake ups
        while *locked {
            locked = self.unlocked.wait(locked).unwrap_or_else(PoisonError::into_inner);
        }

        *locked = true;
    }

    #[inline]
    fn try_lock_for(&self, timeout: Duration) -> bool {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => {
                self.lock();
                return true;
            }
        };

        let mut locked = self.state();
        while *locked {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            let (guard, _) = self
                .unlocked
                .wait_timeout(locked, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            locked = guard;
        }

        *locked = true;
        true
    }

    #[inline]
    unsafe fn unlock(&self) {
        *self.state() = false;
        self.unlocked.notify_one();
    }
}
