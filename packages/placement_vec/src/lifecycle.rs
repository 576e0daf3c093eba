//! Element lifecycle primitives over the slots of a [`RawBuf`].
//!
//! Every value that enters or leaves a slot goes through the allocator's `construct()` and
//! `destroy()`. A relocation reads the value out of its old slot and constructs it in the new
//! one; the old slot is left unconstructed and is not destroyed because a Rust move leaves
//! nothing behind that needs teardown.
//!
//! None of these methods track which slots are constructed. That is the job of the owner, which
//! keeps the constructed slots a prefix of the block outside of the gap-shifting windows.

use std::ops::Range;
use std::ptr::NonNull;

use crate::{RawBuf, SlotAllocator};

impl<T, A: SlotAllocator<T>> RawBuf<T, A> {
    /// # Safety
    ///
    /// `index` must be below the capacity and the slot must be unconstructed.
    pub(crate) unsafe fn construct_at(&mut self, index: usize, value: T) {
        debug_assert!(index < self.capacity());

        let slot = self.slot(index);

        // SAFETY: Forwarding the caller's guarantee that the slot is allocated and vacant.
        unsafe {
            self.allocator().construct(slot, value);
        }
    }

    /// # Safety
    ///
    /// `index` must be below the capacity and the slot must be constructed and unaliased.
    pub(crate) unsafe fn destroy_at(&mut self, index: usize) {
        debug_assert!(index < self.capacity());

        let slot = self.slot(index);

        // SAFETY: Forwarding the caller's guarantee that the slot holds an unaliased value.
        unsafe {
            self.allocator().destroy(slot);
        }
    }

    /// Moves the value out of the slot, leaving the slot unconstructed.
    ///
    /// # Safety
    ///
    /// `index` must be below the capacity and the slot must be constructed and unaliased.
    #[must_use]
    pub(crate) unsafe fn take_at(&mut self, index: usize) -> T {
        debug_assert!(index < self.capacity());

        // SAFETY: Forwarding the caller's guarantee that the slot holds a value. The caller
        // treats the slot as unconstructed from now on, so the value is not duplicated.
        unsafe { self.slot(index).read() }
    }

    /// Relocates the value at `from` to `to` within this block.
    ///
    /// # Safety
    ///
    /// Both indexes must be below the capacity and distinct, `from` must be constructed and `to`
    /// must be unconstructed.
    pub(crate) unsafe fn relocate(&mut self, from: usize, to: usize) {
        debug_assert!(to < self.capacity());
        debug_assert_ne!(from, to);

        let to = self.slot(to);

        // SAFETY: Forwarding the caller's guarantee.
        unsafe {
            self.relocate_to(from, to);
        }
    }

    /// Relocates the value at `from` to an arbitrary vacant slot, possibly in another block
    /// obtained from the same allocator.
    ///
    /// # Safety
    ///
    /// `from` must be below the capacity and constructed. `to` must be a vacant slot in an
    /// allocated block that does not overlap `from`.
    pub(crate) unsafe fn relocate_to(&mut self, from: usize, to: NonNull<T>) {
        // SAFETY: Forwarding the caller's guarantee that `from` is constructed.
        let value = unsafe { self.take_at(from) };

        // SAFETY: Forwarding the caller's guarantee that `to` is allocated and vacant.
        unsafe {
            self.allocator().construct(to, value);
        }
    }

    /// Opens a gap of `count` unconstructed slots at `start` by relocating `[start, len)` to
    /// `[start + count, len + count)`, highest index first so no live value is overwritten.
    ///
    /// # Safety
    ///
    /// `[0, len)` must be constructed, `[len, capacity)` unconstructed and
    /// `len + count <= capacity`, `start <= len`.
    pub(crate) unsafe fn open_gap(&mut self, start: usize, len: usize, count: usize) {
        debug_assert!(start <= len);
        debug_assert!(len.checked_add(count).is_some_and(|end| end <= self.capacity()));

        if count == 0 {
            return;
        }

        for from in (start..len).rev() {
            let to = from
                .checked_add(count)
                .expect("guarded by len + count <= capacity");

            // SAFETY: `to` is either at or beyond `len` (never constructed) or was vacated by an
            // earlier iteration, because we walk downwards and `to > from`.
            unsafe {
                self.relocate(from, to);
            }
        }
    }

    /// Closes a gap of `count` unconstructed slots at `start` by relocating
    /// `[start + count, len)` down to `[start, len - count)`, lowest index first.
    ///
    /// # Safety
    ///
    /// `[start, start + count)` must be unconstructed, the rest of `[0, len)` must be constructed
    /// and `start + count <= len <= capacity`.
    pub(crate) unsafe fn close_gap(&mut self, start: usize, len: usize, count: usize) {
        let tail_start = start
            .checked_add(count)
            .expect("guarded by start + count <= len");
        debug_assert!(tail_start <= len);
        debug_assert!(len <= self.capacity());

        if count == 0 {
            return;
        }

        for from in tail_start..len {
            let to = from
                .checked_sub(count)
                .expect("guarded by from >= start + count");

            // SAFETY: `to` is either inside the gap or was vacated by an earlier iteration,
            // because we walk upwards and `to < from`.
            unsafe {
                self.relocate(from, to);
            }
        }
    }

    /// Destroys every slot in `range`, in ascending order.
    ///
    /// # Safety
    ///
    /// Every slot in the range must be constructed, unaliased and below the capacity.
    pub(crate) unsafe fn destroy_range(&mut self, range: Range<usize>) {
        for index in range {
            // SAFETY: Forwarding the caller's guarantee.
            unsafe {
                self.destroy_at(index);
            }
        }
    }
}
