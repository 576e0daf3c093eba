use std::any::type_name;
use std::marker::PhantomData;
use std::num::NonZero;
use std::ptr::NonNull;

use scopeguard::ScopeGuard;
use tracing::trace;

use crate::{Error, Result, SlotAllocator};

/// The backing storage of a `PlacementVec`: one contiguous block of `capacity` slots obtained
/// from the allocator, or no block at all when the capacity is zero.
///
/// The storage knows nothing about which slots are constructed. The owner tells it how many
/// leading slots are live whenever that matters (relocation into a new block) and is responsible
/// for destroying live elements before the storage is dropped. Dropping the storage only
/// releases the block.
pub(crate) struct RawBuf<T, A: SlotAllocator<T>> {
    /// `None` if and only if `capacity` is zero.
    block: Option<NonNull<T>>,

    capacity: usize,

    allocator: A,

    // We own `T` values in the block, even though dropping them is up to the owner.
    _owns: PhantomData<T>,
}

impl<T, A: SlotAllocator<T>> RawBuf<T, A> {
    #[must_use]
    pub(crate) fn new(allocator: A) -> Self {
        Self {
            block: None,
            capacity: 0,
            allocator,
            _owns: PhantomData,
        }
    }

    pub(crate) fn with_capacity(capacity: usize, allocator: A) -> Result<Self> {
        let mut buf = Self::new(allocator);
        buf.reallocate(0, capacity)?;
        Ok(buf)
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub(crate) fn allocator(&self) -> &A {
        &self.allocator
    }

    #[must_use]
    pub(crate) fn max_len(&self) -> usize {
        self.allocator.max_len()
    }

    /// Pointer to the first slot. Dangling (but aligned) if there is no block, which is what a
    /// zero-length slice over the storage expects.
    #[must_use]
    pub(crate) fn as_ptr(&self) -> NonNull<T> {
        self.block.unwrap_or(NonNull::dangling())
    }

    /// Pointer to the slot at `index`, which may be the one-past-the-end position.
    #[must_use]
    pub(crate) fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(
            index <= self.capacity,
            "slot {index} out of bounds in storage of {} with capacity {}",
            type_name::<T>(),
            self.capacity
        );

        // SAFETY: The index is within the block or one past its end (asserted in debug builds
        // and guaranteed by every caller), so the offset stays inside the allocation. Without a
        // block the only valid index is 0, which is a no-op offset.
        unsafe { self.as_ptr().add(index) }
    }

    /// Ensures the storage has room for at least `required` slots, growing by `grow_to` if not.
    ///
    /// `len` is the number of leading slots that are live and must be carried over.
    pub(crate) fn ensure_capacity(
        &mut self,
        len: usize,
        required: usize,
        grow_to: impl FnOnce(usize, usize, usize) -> usize,
    ) -> Result<()> {
        if required <= self.capacity {
            return Ok(());
        }

        let max = self.max_len();

        if required > max {
            return Err(Error::CapacityOverflow {
                requested: required,
                max,
            });
        }

        let new_capacity = grow_to(self.capacity, required, max);
        self.reallocate(len, new_capacity)
    }

    /// Replaces the block with one of exactly `new_capacity` slots, relocating the first `len`
    /// live elements into it in order.
    ///
    /// On failure the storage is unchanged. A new capacity of zero releases the block.
    ///
    /// If the allocator's `construct()` unwinds during relocation, the new block is returned to
    /// the allocator and the storage keeps its old block. The owner must then treat all of the
    /// first `len` slots as vacant: some were moved out, the rest are leaked.
    pub(crate) fn reallocate(&mut self, len: usize, new_capacity: usize) -> Result<()> {
        assert!(
            len <= new_capacity,
            "cannot relocate {len} elements of {} into {new_capacity} slots",
            type_name::<T>()
        );
        debug_assert!(len <= self.capacity);

        if new_capacity == self.capacity {
            return Ok(());
        }

        let max = self.max_len();

        if new_capacity > max {
            return Err(Error::CapacityOverflow {
                requested: new_capacity,
                max,
            });
        }

        let new_block = match NonZero::new(new_capacity) {
            Some(count) => Some((self.allocator.allocate(count)?, count)),
            None => None,
        };

        trace!(
            element = type_name::<T>(),
            len,
            old_capacity = self.capacity,
            new_capacity,
            "relocating elements into new block"
        );

        let new_block = new_block.map(|(new_block, count)| {
            let old_block = self.as_ptr();

            // Values already moved into the new block are leaked if a relocation unwinds.
            let new_block_guard = scopeguard::guard(new_block, |block| {
                // SAFETY: The block came from this allocator with this count a moment ago and
                // nothing refers to it once the relocation loop is abandoned.
                unsafe {
                    self.allocator.deallocate(block, count);
                }
            });

            for index in 0..len {
                // SAFETY: `index < len <= capacity`, so the offset is inside the old block.
                let from = unsafe { old_block.add(index) };

                // SAFETY: `index < len <= new_capacity`, so the offset is inside the new block.
                let to = unsafe { new_block.add(index) };

                // SAFETY: Slots below `len` are constructed in the old block (caller guarantee).
                // The old slot is treated as vacant from now on, so the value is not duplicated.
                let value = unsafe { from.read() };

                // SAFETY: The new block was just allocated, so every target slot is vacant.
                unsafe {
                    self.allocator.construct(to, value);
                }
            }

            ScopeGuard::into_inner(new_block_guard)
        });

        self.release();

        self.block = new_block;
        self.capacity = new_capacity;

        Ok(())
    }

    /// Returns the current block to the allocator, forgetting (not dropping) any values still in
    /// it. Leaves the storage without a block.
    fn release(&mut self) {
        if let Some(block) = self.block.take() {
            let count = NonZero::new(self.capacity)
                .expect("a block is only present when the capacity is non-zero");

            // SAFETY: The block came from this allocator with exactly this count and we no longer
            // hold any pointer into it after `take()` above.
            unsafe {
                self.allocator.deallocate(block, count);
            }
        }

        self.capacity = 0;
    }
}

impl<T, A: SlotAllocator<T>> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T, A: SlotAllocator<T>> std::fmt::Debug for RawBuf<T, A> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuf")
            .field("element", &format_args!("{}", type_name::<T>()))
            .field("capacity", &self.capacity)
            .field("has_block", &self.block.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::testing::CountingAllocator;
    use crate::{GrowthFactor, Global};

    #[test]
    fn empty_owns_no_block() {
        let allocator = CountingAllocator::new();
        let buf = RawBuf::<u32, _>::new(allocator.clone());

        assert_eq!(buf.capacity(), 0);
        assert!(buf.block.is_none());

        drop(buf);
        assert_eq!(allocator.stats().allocations, 0);
        assert_eq!(allocator.stats().deallocations, 0);
    }

    #[test]
    fn with_capacity_allocates_exactly() {
        let allocator = CountingAllocator::new();
        let buf = RawBuf::<u32, _>::with_capacity(7, allocator.clone()).unwrap();

        assert_eq!(buf.capacity(), 7);
        assert_eq!(allocator.stats().allocations, 1);
        assert_eq!(allocator.stats().last_allocation_count, 7);

        drop(buf);
        assert_eq!(allocator.stats().deallocations, 1);
    }

    #[test]
    fn with_zero_capacity_does_not_allocate() {
        let allocator = CountingAllocator::new();
        let buf = RawBuf::<u32, _>::with_capacity(0, allocator.clone()).unwrap();

        assert!(buf.block.is_none());
        assert_eq!(allocator.stats().allocations, 0);
    }

    #[test]
    fn reallocate_carries_live_prefix() {
        let allocator = CountingAllocator::new();
        let mut buf = RawBuf::<String, _>::with_capacity(2, allocator.clone()).unwrap();

        // SAFETY: Both slots are allocated and vacant.
        unsafe {
            buf.construct_at(0, "a".to_string());
        }
        // SAFETY: Same as above.
        unsafe {
            buf.construct_at(1, "b".to_string());
        }

        buf.reallocate(2, 10).unwrap();
        assert_eq!(buf.capacity(), 10);

        // SAFETY: Slot 0 was relocated into the new block.
        assert_eq!(unsafe { buf.slot(0).as_ref() }, "a");
        // SAFETY: Slot 1 was relocated into the new block.
        assert_eq!(unsafe { buf.slot(1).as_ref() }, "b");

        // Two constructs for the initial values plus two relocations.
        assert_eq!(allocator.stats().constructs, 4);

        // SAFETY: Both slots are constructed.
        unsafe {
            buf.destroy_range(0..2);
        }

        drop(buf);
        assert_eq!(allocator.stats().allocations, 2);
        assert_eq!(allocator.stats().deallocations, 2);
        assert_eq!(allocator.stats().destroys, 2);
    }

    #[test]
    fn reallocate_to_zero_releases_block() {
        let allocator = CountingAllocator::new();
        let mut buf = RawBuf::<u32, _>::with_capacity(4, allocator.clone()).unwrap();

        buf.reallocate(0, 0).unwrap();

        assert_eq!(buf.capacity(), 0);
        assert!(buf.block.is_none());
        assert_eq!(allocator.stats().deallocations, 1);
    }

    #[test]
    fn ensure_capacity_uses_growth_rule() {
        let mut buf = RawBuf::<u32, Global>::new(Global);
        let factor = GrowthFactor::DEFAULT;

        buf.ensure_capacity(0, 1, |c, r, m| factor.grown_capacity(c, r, m))
            .unwrap();
        assert_eq!(buf.capacity(), 2);

        // Already enough room, no change.
        buf.ensure_capacity(0, 2, |c, r, m| factor.grown_capacity(c, r, m))
            .unwrap();
        assert_eq!(buf.capacity(), 2);

        buf.ensure_capacity(0, 3, |c, r, m| factor.grown_capacity(c, r, m))
            .unwrap();
        assert_eq!(buf.capacity(), 5);
    }

    #[test]
    fn ensure_capacity_beyond_max_is_overflow() {
        let mut buf = RawBuf::<u64, Global>::new(Global);
        let max = buf.max_len();

        let result = buf.ensure_capacity(0, max + 1, |_, required, _| required);

        assert_eq!(
            result,
            Err(Error::CapacityOverflow {
                requested: max + 1,
                max,
            })
        );
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn failed_allocation_leaves_storage_unchanged() {
        let allocator = CountingAllocator::new();
        let mut buf = RawBuf::<u32, _>::with_capacity(3, allocator.clone()).unwrap();
        let old_ptr = buf.as_ptr();

        allocator.fail_next_allocation();
        let result = buf.reallocate(0, 30);

        assert!(matches!(result, Err(Error::OutOfMemory { .. })));
        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.as_ptr(), old_ptr);
    }
}
