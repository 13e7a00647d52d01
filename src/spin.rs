//! Shared instance primitives that use spin-locks in case of concurrent
//! construction attempts.

use core::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use conquer_util::BackOff;

use crate::gate::RawLock;
use crate::internal::Sealed;

/// A slot for a lazily constructed shared instance, which spins while
/// waiting on a concurrent construction.
///
/// For the API of this type alias, see the generic
/// [`Holder`](crate::doc::Holder) type.
pub type Holder<T> = crate::holder::Holder<T, SpinLock>;

/// The single entry point to a lazily constructed shared instance, which spins
/// while waiting on a concurrent construction.
///
/// For the API of this type alias, see the generic
/// [`Coordinator`](crate::doc::Coordinator) type.
///
/// # Examples
///
/// ```
/// use sole::spin::Coordinator;
///
/// static GREETING: Coordinator<String> = Coordinator::new(|| "hello".repeat(2));
///
/// assert_eq!(GREETING.as_str(), "hellohello");
/// assert_eq!(Coordinator::lock_acquisitions(&GREETING), 1);
/// ```
pub type Coordinator<T, F = fn() -> T> = crate::coordinator::Coordinator<T, SpinLock, F>;

/// A [`Coordinator`] with a fallible constructor.
pub type TryCoordinator<T, E> = Coordinator<T, fn() -> Result<T, E>>;

////////////////////////////////////////////////////////////////////////////////////////////////////
// SpinLock
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Exclusion primitive spinning with exponential back-off.
#[derive(Debug, Default)]
pub struct SpinLock {
    locked: AtomicBool,
}

/********** impl inherent *************************************************************************/

impl SpinLock {
    #[inline]
    fn try_lock(&self) -> bool {
        // (spin:1) this acquire CAS syncs-with the release store (spin:2)
        !self.locked.load(Ordering::Relaxed)
            && self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
    }

    #[inline]
    fn pause(backoff: &BackOff) {
        if backoff.advise_yield() {
            thread::yield_now();
        } else {
            backoff.spin();
        }
    }
}

/********** impl Sealed ***************************************************************************/

impl Sealed for SpinLock {}

/********** impl RawLock **************************************************************************/

// SAFETY: the flag can only be set by a successful acquire CAS from the
// unlocked state and is only cleared by the owner's release store
unsafe impl RawLock for SpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self { locked: AtomicBool::new(false) };

    #[inline]
    fn lock(&self) {
        let backoff = BackOff::new();
        while !self.try_lock() {
            Self::pause(&backoff);
        }
    }

    #[inline]
    fn try_lock_for(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let backoff = BackOff::new();
        while !self.try_lock() {
            if start.elapsed() >= timeout {
                return false;
            }

            Self::pause(&backoff);
        }

        true
    }

    #[inline]
    unsafe fn unlock(&self) {
        // (spin:2) this release store syncs-with the acquire CAS (spin:1)
        self.locked.store(false, Ordering::Release);
    }
}
