use super::{EmptyError, FullError, DEFAULT_CAPACITY};

////////////////////////////////////////////////////////////////////////////////////////////////////
// BoundedStack
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A LIFO stack holding at most a fixed number of elements.
#[derive(Clone, Debug)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
}

/********** impl inherent *************************************************************************/

impl<T> BoundedStack<T> {
    /// Creates a new empty stack for at most `capacity` elements.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity), capacity }
    }

    /// Returns the maximum number of elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the stack holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if the stack holds `capacity` elements.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Pushes `value` on top of the stack.
    ///
    /// # Errors
    ///
    /// Fails if the stack is full, handing `value` back.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), FullError<T>> {
        if self.is_full() {
            return Err(FullError(value));
        }

        self.items.push(value);
        Ok(())
    }

    /// Removes and returns the top element.
    ///
    /// # Errors
    ///
    /// Fails if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<T, EmptyError> {
        self.items.pop().ok_or(EmptyError)
    }

    /// Returns a reference to the top element.
    ///
    /// # Errors
    ///
    /// Fails if the stack is empty.
    #[inline]
    pub fn peek(&self) -> Result<&T, EmptyError> {
        self.items.last().ok_or(EmptyError)
    }
}

/********** impl Default **************************************************************************/

impl<T> Default for BoundedStack<T> {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
