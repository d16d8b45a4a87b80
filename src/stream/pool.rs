//! Two-level object pool.
//!
//! Objects are first handed over through a fixed-size lock-free slot queue
//! (one slot per available CPU), and spill into an unbounded queue when the
//! slots are taken. `get` never blocks and falls back to a fresh allocation
//! when both levels are empty.

use crossbeam::queue::{ArrayQueue, SegQueue};

/// Clears an object before it goes back into a pool. Buffers keep their
/// capacity; references and errors are dropped.
pub trait Reset {
    fn reset(&mut self);
}

impl<T: Reset + ?Sized> Reset for Box<T> {
    #[inline]
    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Releases the allocation of `buf` once it has grown past `limit` bytes.
pub fn shrink_oversized(buf: &mut Vec<u8>, limit: usize) {
    if buf.capacity() > limit {
        buf.clear();
        buf.shrink_to(limit);
    }
}

pub struct Pool<T> {
    slots: ArrayQueue<T>,
    spare: SegQueue<T>,
}

impl<T: Reset> Pool<T> {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: ArrayQueue::new(slots.max(1)),
            spare: SegQueue::new(),
        }
    }

    #[inline]
    pub fn get_or_else<F: FnOnce() -> T>(&self, f: F) -> T {
        self.slots
            .pop()
            .or_else(|| self.spare.pop())
            .unwrap_or_else(f)
    }

    #[inline]
    pub fn put(&self, mut item: T) {
        item.reset();
        if let Err(item) = self.slots.push(item) {
            self.spare.push(item);
        }
    }

    /// Number of pooled objects, split into (slots, spare).
    pub fn pooled(&self) -> (usize, usize) {
        (self.slots.len(), self.spare.len())
    }
}

impl<T: Reset + Default> Pool<T> {
    #[inline]
    pub fn get(&self) -> T {
        self.get_or_else(T::default)
    }
}
