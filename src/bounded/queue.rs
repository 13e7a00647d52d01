use super::{EmptyError, FullError, DEFAULT_CAPACITY};

////////////////////////////////////////////////////////////////////////////////////////////////////
// CircularQueue
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A FIFO queue holding at most a fixed number of elements in a ring buffer.
///
/// Elements are appended at the slot following the current rear and removed
/// from the front, both wrapping around at the end of the buffer.
#[derive(Clone, Debug)]
pub struct CircularQueue<T> {
    slots: Box<[Option<T>]>,
    front: usize,
    len: usize,
}

/********** impl inherent *************************************************************************/

impl<T> CircularQueue<T> {
    /// Creates a new empty queue for at most `capacity` elements.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self { slots: (0..capacity).map(|_| None).collect(), front: 0, len: 0 }
    }

    /// Returns the maximum number of elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the queue holds `capacity` elements.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Appends `value` at the rear of the queue.
    ///
    /// # Errors
    ///
    /// Fails if the queue is full, handing `value` back.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), FullError<T>> {
        // also covers a capacity of zero, so the modulo below is never by zero
        if self.is_full() {
            return Err(FullError(value));
        }

        let rear = (self.front + self.len) % self.capacity();
        self.slots[rear] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the front element.
    ///
    /// # Errors
    ///
    /// Fails if the queue is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<T, EmptyError> {
        if self.is_empty() {
            return Err(EmptyError);
        }

        let value = self.slots[self.front].take().ok_or(EmptyError)?;
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        Ok(value)
    }

    /// Returns a reference to the front element.
    ///
    /// # Errors
    ///
    /// Fails if the queue is empty.
    #[inline]
    pub fn peek(&self) -> Result<&T, EmptyError> {
        if self.is_empty() {
            return Err(EmptyError);
        }

        self.slots[self.front].as_ref().ok_or(EmptyError)
    }
}

/********** impl Default **************************************************************************/

impl<T> Default for CircularQueue<T> {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
