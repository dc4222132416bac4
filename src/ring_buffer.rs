//! Bounded FIFO backed by a circular buffer.
//!
//! The backing storage holds one slot more than the usable capacity so that
//! `head == tail` always means empty and `head + 1 == tail` always means full.

/// Fixed-capacity FIFO queue with O(1) offer, peek and poll
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    // Next slot to write
    head: usize,
    // Oldest occupied slot
    tail: usize,
}

impl<T> RingBuffer<T> {
    /// Create a queue holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.resize_with(capacity + 1, || None);
        Self {
            slots,
            head: 0,
            tail: 0,
        }
    }

    /// Insert an item at the back, handing it back if the queue is full
    pub fn offer(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.slots[self.head] = Some(item);
        self.head = (self.head + 1) % self.slots.len();
        Ok(())
    }

    /// Return, but do not remove, the head of the queue
    pub fn peek(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.tail].as_ref()
    }

    /// Remove and return the head of the queue
    pub fn poll(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.tail].take();
        self.tail = (self.tail + 1) % self.slots.len();
        item
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        (self.head + 1) % self.slots.len() == self.tail
    }

    pub fn len(&self) -> usize {
        (self.head + self.slots.len() - self.tail) % self.slots.len()
    }

    /// Usable slots
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }
}
