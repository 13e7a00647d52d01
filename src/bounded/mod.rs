//! Fixed-capacity containers, which report full and empty conditions as
//! errors instead of growing or reading past their contents.
//!
//! - [`BoundedStack`] pops elements in LIFO order.
//! - [`CircularQueue`] pops elements in FIFO order from a ring buffer.
//!
//! # Examples
//!
//! ```
//! use sole::bounded::{BoundedStack, CircularQueue, EmptyError};
//!
//! let mut stack = BoundedStack::new(2);
//! let mut queue = CircularQueue::new(2);
//! for value in [1, 2] {
//!     stack.push(value).unwrap();
//!     queue.push(value).unwrap();
//! }
//!
//! assert_eq!(stack.push(3).unwrap_err().into_inner(), 3);
//! assert_eq!(stack.pop(), Ok(2));
//! assert_eq!(queue.pop(), Ok(1));
//! assert_eq!(CircularQueue::<i32>::new(1).pop(), Err(EmptyError));
//! ```

use core::fmt;

use thiserror::Error;

mod queue;
mod stack;

pub use self::queue::CircularQueue;
pub use self::stack::BoundedStack;

/// The capacity of containers created through [`Default`].
pub const DEFAULT_CAPACITY: usize = 10;

////////////////////////////////////////////////////////////////////////////////////////////////////
// FullError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An error indicating that a container is at capacity.
///
/// The rejected value is handed back to the caller, the container is left
/// unchanged.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct FullError<T>(pub T);

/********** impl inherent *************************************************************************/

impl<T> FullError<T> {
    /// Returns the value that could not be pushed.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

/********** impl Debug ****************************************************************************/

impl<T> fmt::Debug for FullError<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FullError(..)")
    }
}

/*********** impl Display *************************************************************************/

impl<T> fmt::Display for FullError<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the container is full")
    }
}

/*********** impl Error ***************************************************************************/

impl<T> std::error::Error for FullError<T> {}

////////////////////////////////////////////////////////////////////////////////////////////////////
// EmptyError
////////////////////////////////////////////////////////////////////////////////////////////////////

/// An error indicating that a container holds no elements.
#[derive(Copy, Clone, Debug, Hash, Eq, Ord, PartialEq, PartialOrd, Error)]
#[error("the container is empty")]
pub struct EmptyError;
