use std::iter::FusedIterator;
use std::slice;

use crate::{Global, RawBuf, SlotAllocator};

/// An iterator that moves the elements out of a [`PlacementVec`][crate::PlacementVec].
///
/// Elements not yet yielded when the iterator is dropped are destroyed through the allocator and
/// the block is released.
pub struct IntoIter<T, A: SlotAllocator<T> = Global> {
    buf: RawBuf<T, A>,

    // Slots `front..back` are constructed and not yet yielded; everything else is vacant.
    front: usize,
    back: usize,
}

impl<T, A: SlotAllocator<T>> IntoIter<T, A> {
    pub(crate) fn new(buf: RawBuf<T, A>, len: usize) -> Self {
        Self {
            buf,
            front: 0,
            back: len,
        }
    }

    /// The elements not yet yielded.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        let len = self
            .back
            .checked_sub(self.front)
            .expect("front never passes back");

        // SAFETY: `front..back` are constructed slots of the block and we hold a shared borrow
        // of the iterator, so nothing moves them out meanwhile.
        unsafe { slice::from_raw_parts(self.buf.slot(self.front).as_ptr(), len) }
    }

    /// The allocator that owns the block.
    #[must_use]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }
}

impl<T, A: SlotAllocator<T>> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        let index = self.front;
        self.front = index.checked_add(1).expect("bounded by back");

        // SAFETY: The slot was constructed and is now outside `front..back`, so it is never
        // touched again.
        Some(unsafe { self.buf.take_at(index) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .back
            .checked_sub(self.front)
            .expect("front never passes back");

        (remaining, Some(remaining))
    }
}

impl<T, A: SlotAllocator<T>> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }

        self.back = self.back.checked_sub(1).expect("bounded by front");

        // SAFETY: The slot was constructed and is now outside `front..back`, so it is never
        // touched again.
        Some(unsafe { self.buf.take_at(self.back) })
    }
}

impl<T, A: SlotAllocator<T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: SlotAllocator<T>> FusedIterator for IntoIter<T, A> {}

impl<T, A: SlotAllocator<T>> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining = self.front..self.back;
        self.front = self.back;

        // SAFETY: The range holds exactly the constructed slots that were never yielded.
        unsafe {
            self.buf.destroy_range(remaining);
        }
    }
}

impl<T: std::fmt::Debug, A: SlotAllocator<T>> std::fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

// SAFETY: The iterator exclusively owns the remaining elements and the allocator, same as the
// container it came from.
unsafe impl<T: Send, A: SlotAllocator<T> + Send> Send for IntoIter<T, A> {}

// SAFETY: Shared access only hands out shared references to the remaining elements.
unsafe impl<T: Sync, A: SlotAllocator<T> + Sync> Sync for IntoIter<T, A> {}
