//! Generic definition and implementation of the [`Coordinator`] type.

use core::fmt;
use core::ops::Deref;
use std::time::Duration;

use crate::gate::RawLock;
use crate::holder::{ConstructError, Holder, TimeoutError, UninitError};

////////////////////////////////////////////////////////////////////////////////////////////////////
// Coordinator
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The single entry point through which a shared instance is obtained.
///
/// A [`Coordinator`] pairs a [`Holder`] with the function constructing its
/// instance, so that no caller ever constructs the instance directly.
/// It can either be placed in a `static` or be created once at start-up and
/// handed to its users, e.g. through an [`Arc`](std::sync::Arc).
///
/// Like [`Deref`] based types in the standard library, all methods except
/// [`new`][Coordinator::new] are associated functions, so they do not shadow
/// any methods of the instance itself.
pub struct Coordinator<T, L, F = fn() -> T> {
    holder: Holder<T, L>,
    init: F,
}

/********** impl inherent *************************************************************************/

impl<T, L: RawLock, F> Coordinator<T, L, F> {
    /// Creates a new [`Coordinator`], which constructs its instance with
    /// `init` on first access.
    #[inline]
    pub const fn new(init: F) -> Self {
        Self { holder: Holder::uninit(), init }
    }

    /// Returns `true` if the instance has been constructed.
    #[inline]
    pub fn is_constructed(coordinator: &Self) -> bool {
        coordinator.holder.is_constructed()
    }

    /// Returns the number of times the instance has actually been
    /// constructed, which never exceeds `1`.
    #[inline]
    pub fn construction_count(coordinator: &Self) -> usize {
        coordinator.holder.construction_count()
    }

    /// Returns the number of times the construction lock has been acquired.
    #[inline]
    pub fn lock_acquisitions(coordinator: &Self) -> usize {
        coordinator.holder.lock_acquisitions()
    }

    /// Returns a reference to the shared instance if it has already been
    /// constructed, without ever constructing it.
    ///
    /// # Errors
    ///
    /// Fails with [`UninitError`] if the instance does not exist yet.
    #[inline]
    pub fn payload(coordinator: &Self) -> Result<&T, UninitError> {
        coordinator.holder.payload()
    }
}

impl<T, L, F> Coordinator<T, L, F>
where
    L: RawLock,
    F: Fn() -> T,
{
    /// Returns a reference to the shared instance, constructing it first if
    /// this is the first access.
    ///
    /// Once the instance exists, this neither blocks nor acquires any lock.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Mutex;
    ///
    /// use sole::Coordinator;
    ///
    /// static NAMES: Coordinator<Mutex<Vec<&str>>> = Coordinator::new(Mutex::default);
    ///
    /// Coordinator::get_shared(&NAMES).lock().unwrap().push("first");
    /// Coordinator::get_shared(&NAMES).lock().unwrap().push("second");
    ///
    /// assert_eq!(NAMES.lock().unwrap().as_slice(), &["first", "second"]);
    /// assert_eq!(Coordinator::construction_count(&NAMES), 1);
    /// ```
    #[inline]
    pub fn get_shared(coordinator: &Self) -> &T {
        coordinator.holder.get_or_construct(&coordinator.init)
    }

    /// Returns a reference to the shared instance like
    /// [`get_shared`][Coordinator::get_shared], but waits at most `timeout`
    /// for the construction lock.
    ///
    /// # Errors
    ///
    /// Fails with a [`TimeoutError`] if the instance does not exist yet and
    /// the lock could not be acquired in time.
    #[inline]
    pub fn get_shared_timeout(coordinator: &Self, timeout: Duration) -> Result<&T, TimeoutError> {
        coordinator.holder.get_or_construct_timeout(timeout, &coordinator.init)
    }
}

impl<T, E, L, F> Coordinator<T, L, F>
where
    L: RawLock,
    F: Fn() -> Result<T, E>,
{
    /// Returns a reference to the shared instance, attempting to construct it
    /// first if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns the constructor's error if construction was attempted by this
    /// call and failed.
    /// The instance remains unconstructed and the next call retries.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// use sole::TryCoordinator;
    ///
    /// static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
    /// static PORT: TryCoordinator<u16, &str> = TryCoordinator::new(|| {
    ///     match ATTEMPTS.fetch_add(1, Ordering::Relaxed) {
    ///         0 => Err("not yet"),
    ///         _ => Ok(8080),
    ///     }
    /// });
    ///
    /// assert_eq!(TryCoordinator::try_get_shared(&PORT), Err("not yet"));
    /// assert_eq!(TryCoordinator::try_get_shared(&PORT), Ok(&8080));
    /// ```
    #[inline]
    pub fn try_get_shared(coordinator: &Self) -> Result<&T, E> {
        coordinator.holder.try_get_or_construct(&coordinator.init)
    }

    /// Returns a reference to the shared instance like
    /// [`try_get_shared`][Coordinator::try_get_shared], but waits at most
    /// `timeout` for the construction lock.
    ///
    /// # Errors
    ///
    /// Fails with [`ConstructError::LockTimeout`] if the lock could not be
    /// acquired in time or [`ConstructError::Failed`] if construction failed.
    #[inline]
    pub fn try_get_shared_timeout(
        coordinator: &Self,
        timeout: Duration,
    ) -> Result<&T, ConstructError<E>> {
        coordinator.holder.try_get_or_construct_timeout(timeout, &coordinator.init)
    }
}

/********** impl Debug ****************************************************************************/

impl<T: fmt::Debug, L: RawLock, F> fmt::Debug for Coordinator<T, L, F> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator").field("holder", &self.holder).finish()
    }
}

/********** impl Deref ****************************************************************************/

impl<T, L, F> Deref for Coordinator<T, L, F>
where
    L: RawLock,
    F: Fn() -> T,
{
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        Coordinator::get_shared(self)
    }
}
