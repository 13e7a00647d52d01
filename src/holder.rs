//! Generic definition and implementation of the [`Holder`] type.

use core::any::type_name;
use core::cell::UnsafeCell;
use core::convert::Infallible;
use core::fmt;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::gate::{AccessGate, GateGuard, RawLock};

////////////////////////////////////////////////////////////////////////////////////////////////////
// Holder
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A slot for a single shared instance, which is constructed lazily by the
/// first caller and handed out as a shared reference to all callers.
///
/// Construction follows a double-checked locking protocol: the ready flag is
/// checked without any lock first and only if the instance does not exist yet
/// is the lock acquired and the flag checked a second time, before the
/// instance is constructed and published.
/// Once published, accessing the instance never touches the lock again.
///
/// # Failed construction
///
/// A constructor that returns an error or panics leaves the [`Holder`]
/// unconstructed, the construction counter unchanged and the lock released.
/// The error is reported only to the thread that ran the constructor and any
/// later caller may retry, i.e., a [`Holder`] can never be poisoned.
pub struct Holder<T, L> {
    gate: AccessGate<L>,
    constructions: AtomicUsize,
    inner: UnsafeCell<MaybeUninit<T>>,
}

/********** impl Send + Sync **********************************************************************/

// SAFETY: the instance is written exactly once under the gate's lock before
// being published, after which it is only ever accessed through shared
// references, so sharing requires `T: Sync` and constructing it on one thread
// and dropping it on another requires `T: Send`
unsafe impl<T: Send + Sync, L: Sync> Sync for Holder<T, L> {}

/********** impl inherent *************************************************************************/

impl<T, L> Holder<T, L> {
    /// Returns a reference to the instance without checking whether it has
    /// actually been constructed.
    ///
    /// # Safety
    ///
    /// The caller has to ensure that the instance has been constructed and
    /// published, otherwise uninitialized memory will be read.
    #[inline]
    pub unsafe fn get_unchecked(&self) -> &T {
        (*self.inner.get()).assume_init_ref()
    }

    /// Returns a mutable reference to the instance if it has been constructed.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.gate.is_ready_mut() {
            // SAFETY: the state is ready, so the instance is initialized
            Some(unsafe { self.inner.get_mut().assume_init_mut() })
        } else {
            None
        }
    }

    /// Takes the instance out and resets the [`Holder`] to its unconstructed
    /// state.
    ///
    /// The construction counter is not reset.
    #[inline]
    pub fn take(&mut self) -> Option<T> {
        if self.gate.reset_mut() {
            // SAFETY: the state was ready, so the instance is initialized and
            // since the state has been reset, it can not be read again
            Some(unsafe { self.inner.get_mut().assume_init_read() })
        } else {
            None
        }
    }

    /// Consumes `self` and returns the instance, if it had been constructed.
    #[inline]
    pub fn into_inner(mut self) -> Option<T> {
        self.take()
    }
}

impl<T, L: RawLock> Holder<T, L> {
    /// Creates a new unconstructed [`Holder`].
    #[inline]
    pub const fn uninit() -> Self {
        Self {
            gate: AccessGate::uninit(),
            constructions: AtomicUsize::new(0),
            inner: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Creates a new [`Holder`] around an eagerly constructed `value`, e.g. one
    /// that was built at process start before being injected into callers.
    ///
    /// The construction counter of the returned [`Holder`] is `1`.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            gate: AccessGate::ready(),
            constructions: AtomicUsize::new(1),
            inner: UnsafeCell::new(MaybeUninit::new(value)),
        }
    }

    /// Returns `true` if the instance has been constructed and published.
    ///
    /// This method never blocks.
    #[inline]
    pub fn is_constructed(&self) -> bool {
        self.gate.is_ready()
    }

    /// Returns the number of times an instance has actually been constructed.
    #[inline]
    pub fn construction_count(&self) -> usize {
        self.constructions.load(Ordering::Relaxed)
    }

    /// Returns the number of times the construction lock has been acquired.
    ///
    /// Once the instance has been published this number no longer changes,
    /// regardless of how often it is accessed.
    #[inline]
    pub fn lock_acquisitions(&self) -> usize {
        self.gate.acquisitions()
    }

    /// Returns a reference to the constructed instance.
    ///
    /// This method never blocks.
    ///
    /// # Errors
    ///
    /// Fails with [`UninitError`] if no instance has been constructed yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole::{Holder, UninitError};
    ///
    /// let holder = Holder::uninit();
    /// assert_eq!(holder.payload(), Err(UninitError));
    ///
    /// holder.get_or_construct(|| 1);
    /// assert_eq!(holder.payload(), Ok(&1));
    /// ```
    #[inline]
    pub fn payload(&self) -> Result<&T, UninitError> {
        if self.gate.is_ready() {
            // SAFETY: the acquire load in `is_ready` syncs-with the publishing
            // release store, so the instance is fully initialized
            Ok(unsafe { self.get_unchecked() })
        } else {
            Err(UninitError)
        }
    }

    /// Returns a reference to the instance or constructs it with `func` first.
    ///
    /// This method **blocks** if the instance does not exist yet and another
    /// thread is currently constructing it.
    ///
    /// # Examples
    ///
    /// ```
    /// use sole::Holder;
    ///
    /// let holder = Holder::uninit();
    /// assert_eq!(*holder.get_or_construct(|| 1), 1);
    /// // the instance exists, so this closure is never called
    /// assert_eq!(*holder.get_or_construct(|| 2), 1);
    /// assert_eq!(holder.construction_count(), 1);
    /// ```
    #[inline]
    pub fn get_or_construct(&self, func: impl FnOnce() -> T) -> &T {
        if let Ok(res) = self.payload() {
            return res;
        }

        match self.construct(self.gate.lock(), || Ok::<_, Infallible>(func())) {
            Ok(res) => res,
            Err(never) => match never {},
        }
    }

    /// Returns a reference to the instance or attempts to construct it with
    /// the fallible `func` first.
    ///
    /// This method **blocks** if the instance does not exist yet and another
    /// thread is currently constructing it.
    ///
    /// # Errors
    ///
    /// Returns the error of `func`, if it was called and failed, in which case
    /// the [`Holder`] remains unconstructed.
    #[inline]
    pub fn try_get_or_construct<E>(&self, func: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        match self.payload() {
            Ok(res) => Ok(res),
            Err(_) => self.construct(self.gate.lock(), func),
        }
    }

    /// Returns a reference to the instance or constructs it with `func` first,
    /// waiting at most `timeout` for the construction lock.
    ///
    /// # Errors
    ///
    /// Fails with a [`TimeoutError`] if the lock could not be acquired in
    /// time, which leaves the [`Holder`] untouched.
    #[inline]
    pub fn get_or_construct_timeout(
        &self,
        timeout: Duration,
        func: impl FnOnce() -> T,
    ) -> Result<&T, TimeoutError> {
        if let Ok(res) = self.payload() {
            return Ok(res);
        }

        match self.construct(self.gate.try_lock_for(timeout)?, || Ok::<_, Infallible>(func())) {
            Ok(res) => Ok(res),
            Err(never) => match never {},
        }
    }

    /// Returns a reference to the instance or attempts to construct it with
    /// the fallible `func` first, waiting at most `timeout` for the
    /// construction lock.
    ///
    /// # Errors
    ///
    /// Fails with [`ConstructError::LockTimeout`] if the lock could not be
    /// acquired in time and with [`ConstructError::Failed`] if `func` failed.
    /// In both cases the [`Holder`] remains unconstructed.
    #[inline]
    pub fn try_get_or_construct_timeout<E>(
        &self,
        timeout: Duration,
        func: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, ConstructError<E>> {
        if let Ok(res) = self.payload() {
            return Ok(res);
        }

        let guard = self.gate.try_lock_for(timeout)?;
        self.construct(guard, func).map_err(ConstructError::Failed)
    }

    /// Completes the slow path of the protocol while holding the lock.
    ///
    /// This method is annotated with `#[cold]` in order to keep it out of the
    /// fast path.
    #[inline(never)]
    #[cold]
    fn construct<E>(
        &self,
        guard: GateGuard<'_, L>,
        func: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        // another thread may have published the instance while this thread was
        // waiting for the lock
        if guard.is_ready() {
            // SAFETY: the instance is published and the lock acquisition
            // syncs-with the release of the publishing thread
            return Ok(unsafe { self.get_unchecked() });
        }

        // on error or panic the guard is dropped, which releases the lock but
        // leaves the state unconstructed
        let value = match func() {
            Ok(value) => value,
            Err(err) => {
                log::trace!("construction of the shared `{}` failed", type_name::<T>());
                return Err(err);
            }
        };

        // SAFETY: the lock is held and the state is not ready, so no other
        // thread can read or write the slot concurrently
        unsafe { (*self.inner.get()).write(value) };
        let count = self.constructions.fetch_add(1, Ordering::Relaxed) + 1;
        guard.publish();

        log::debug!("shared `{}` constructed (construction #{})", type_name::<T>(), count);
        // SAFETY: the instance has just been published by this thread
        Ok(unsafe { self.get_unchecked() })
    }
}

/********** impl Debug ****************************************************************************/

impl<T: fmt::Debug, L: RawLock> fmt::Debug for Holder<T, L> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holder")
            .field("payload", &self.payload().ok())
            .field("constructions", &self.construction_count())
            .finish()
    }
}

/********** impl Drop *****************************************************************************/

impl<T, L> Drop for Holder<T, L> {
    #[inline]
    fn drop(&mut self) {
        drop(self.take());
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// UninitError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An error indicating that the shared instance was accessed before it had
/// been constructed.
#[derive(Copy, Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd, Error)]
#[error("the shared instance has not been constructed yet")]
pub struct UninitError;

////////////////////////////////////////////////////////////////////////////////////////////////////
// TimeoutError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An error indicating that the construction lock could not be acquired
/// within the given bound.
#[derive(Copy, Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd, Error)]
#[error("timed out after {timeout:?} waiting for the construction lock")]
pub struct TimeoutError {
    timeout: Duration,
}

impl TimeoutError {
    #[inline]
    pub(crate) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Returns the bound that was exceeded.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
// ConstructError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Possible error variants of fallible and bounded construction calls.
#[derive(Debug, Error)]
pub enum ConstructError<E> {
    /// The constructor failed; the shared instance remains unconstructed and
    /// construction may be retried.
    #[error("construction of the shared instance failed")]
    Failed(#[source] E),
    /// The construction lock could not be acquired in time.
    #[error(transparent)]
    LockTimeout(#[from] TimeoutError),
}
