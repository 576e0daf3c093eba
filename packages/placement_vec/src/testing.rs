//! Test helpers shared between the unit tests of different modules.

use std::cell::{Cell, RefCell};
use std::num::NonZero;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::{Error, Global, Result, SlotAllocator};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AllocatorStats {
    pub(crate) allocations: usize,
    pub(crate) deallocations: usize,
    pub(crate) constructs: usize,
    pub(crate) destroys: usize,
    pub(crate) last_allocation_count: usize,
}

/// A [`SlotAllocator`] that forwards to [`Global`] and counts every call. Clones share counters.
#[derive(Clone, Debug, Default)]
pub(crate) struct CountingAllocator {
    stats: Rc<RefCell<AllocatorStats>>,
    fail_next: Rc<Cell<bool>>,
    constructs_before_panic: Rc<Cell<Option<usize>>>,
}

impl CountingAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stats(&self) -> AllocatorStats {
        *self.stats.borrow()
    }

    pub(crate) fn fail_next_allocation(&self) {
        self.fail_next.set(true);
    }

    /// Lets `successes` more constructs through, then panics in the next one.
    pub(crate) fn panic_on_construct_after(&self, successes: usize) {
        self.constructs_before_panic.set(Some(successes));
    }

    /// Blocks allocated and not yet deallocated.
    pub(crate) fn live_blocks(&self) -> usize {
        let stats = self.stats();
        stats.allocations - stats.deallocations
    }
}

// SAFETY: All memory management is forwarded to `Global`.
unsafe impl<T> SlotAllocator<T> for CountingAllocator {
    fn allocate(&self, count: NonZero<usize>) -> Result<NonNull<T>> {
        if self.fail_next.replace(false) {
            return Err(Error::OutOfMemory {
                bytes: count.get().saturating_mul(size_of::<T>()),
            });
        }

        let block = SlotAllocator::<T>::allocate(&Global, count)?;

        let mut stats = self.stats.borrow_mut();
        stats.allocations += 1;
        stats.last_allocation_count = count.get();

        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<T>, count: NonZero<usize>) {
        self.stats.borrow_mut().deallocations += 1;

        // SAFETY: Forwarding the caller's guarantee; the block came from `Global`.
        unsafe {
            Global.deallocate(block, count);
        }
    }

    unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        match self.constructs_before_panic.get() {
            Some(0) => {
                self.constructs_before_panic.set(None);
                panic!("construct refused");
            }
            Some(remaining) => self.constructs_before_panic.set(Some(remaining - 1)),
            None => {}
        }

        self.stats.borrow_mut().constructs += 1;

        // SAFETY: Forwarding the caller's guarantee.
        unsafe {
            Global.construct(slot, value);
        }
    }

    unsafe fn destroy(&self, slot: NonNull<T>) {
        self.stats.borrow_mut().destroys += 1;

        // SAFETY: Forwarding the caller's guarantee.
        unsafe {
            Global.destroy(slot);
        }
    }
}

/// Increments a shared counter when dropped.
#[derive(Debug)]
pub(crate) struct DropCounter {
    pub(crate) drops: Rc<Cell<usize>>,
    pub(crate) value: u32,
}

impl DropCounter {
    pub(crate) fn new(drops: &Rc<Cell<usize>>, value: u32) -> Self {
        Self {
            drops: Rc::clone(drops),
            value,
        }
    }
}

impl Clone for DropCounter {
    fn clone(&self) -> Self {
        Self::new(&self.drops, self.value)
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}
