use std::alloc::{Layout, alloc, dealloc};
use std::num::NonZero;
use std::ptr::NonNull;

use tracing::debug;

use crate::{Error, Result};

/// The memory capability a [`PlacementVec`][crate::PlacementVec] draws its storage from.
///
/// Allocation and construction are separate steps: [`allocate()`][Self::allocate] hands out raw
/// uninitialized slots, [`construct()`][Self::construct] and [`destroy()`][Self::destroy] run the
/// element lifecycle inside slots that are already allocated, and
/// [`deallocate()`][Self::deallocate] returns the raw block.
///
/// The container clones the allocator when the container itself is cloned and otherwise keeps
/// using the same instance for every call, so stateful allocators see a consistent history.
///
/// Every value entering a slot goes through `construct()`, relocations and gap shifts included.
/// Only values torn down in place go through `destroy()`. A value moved out of a slot (the source
/// of a relocation, a popped element, an element yielded by the owning iterator) leaves without a
/// `destroy()` call, because a Rust move leaves nothing behind to tear down.
///
/// `construct()` and `destroy()` may unwind. The container stays sound when they do, but the
/// elements it can no longer account for are leaked rather than dropped.
///
/// # Safety
///
/// Implementations must return blocks that are valid for reads and writes of `count` values of
/// `T`, suitably aligned for `T`, and not aliased by any other live block. A block must stay
/// valid until it is passed back to [`deallocate()`][Self::deallocate] with the same count.
///
/// If the provided lifecycle methods are overridden, `construct()` must leave a valid `T` in the
/// slot and `destroy()` must run the teardown of exactly the value in the slot.
pub unsafe trait SlotAllocator<T>: Clone {
    /// Allocates an uninitialized block of `count` slots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if no layout of `count` elements exists and
    /// [`Error::OutOfMemory`] if the memory could not be provided.
    fn allocate(&self, count: NonZero<usize>) -> Result<NonNull<T>>;

    /// Releases a block previously returned by [`allocate()`][Self::allocate].
    ///
    /// # Safety
    ///
    /// `block` must have been returned by `allocate()` on this allocator (or a clone of it) with
    /// the same `count`, and must not be used afterwards. Any values still constructed in the
    /// block are forgotten, not dropped.
    unsafe fn deallocate(&self, block: NonNull<T>, count: NonZero<usize>);

    /// Constructs `value` in place at `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must point into an allocated block and must not currently hold a constructed value.
    unsafe fn construct(&self, slot: NonNull<T>, value: T) {
        // SAFETY: Forwarding the caller's guarantee that the slot is allocated and vacant.
        unsafe {
            slot.write(value);
        }
    }

    /// Runs the teardown of the value at `slot`, leaving the slot allocated but unconstructed.
    ///
    /// # Safety
    ///
    /// `slot` must hold a constructed value that is not referenced by anything else.
    unsafe fn destroy(&self, slot: NonNull<T>) {
        // SAFETY: Forwarding the caller's guarantee that the slot holds an unaliased value.
        unsafe {
            slot.drop_in_place();
        }
    }

    /// The largest number of slots a single block from this allocator can hold.
    #[must_use]
    fn max_len(&self) -> usize {
        max_len::<T>()
    }
}

/// The default [`SlotAllocator`], backed by the global Rust heap.
///
/// This is a stateless capability: every instance is interchangeable with every other instance.
///
/// # Examples
///
/// ```
/// use placement_vec::{Global, PlacementVec};
///
/// let mut items = PlacementVec::new_in(Global);
/// items.push(1_u8);
///
/// assert_eq!(*items.allocator(), Global);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Global;

// SAFETY: Blocks come straight from the global allocator with the layout of a `T` array, which
// satisfies size and alignment. Zero-sized layouts receive an aligned dangling pointer, which is
// valid for zero-sized accesses.
unsafe impl<T> SlotAllocator<T> for Global {
    fn allocate(&self, count: NonZero<usize>) -> Result<NonNull<T>> {
        let layout = checked_layout::<T>(count.get())?;

        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        // SAFETY: The layout is valid for `T` (calculated by `Layout::array`) and not zero-sized
        // (checked above).
        let ptr = unsafe { alloc(layout) };

        NonNull::new(ptr.cast::<T>()).ok_or_else(|| {
            let error = Error::OutOfMemory {
                bytes: layout.size(),
            };
            debug!(%error, element = std::any::type_name::<T>(), "global allocation refused");
            error
        })
    }

    unsafe fn deallocate(&self, block: NonNull<T>, count: NonZero<usize>) {
        let layout = Layout::array::<T>(count.get())
            .expect("the same count produced a valid layout when the block was allocated");

        if layout.size() == 0 {
            return;
        }

        // SAFETY: The caller guarantees the block came from `allocate()` with the same count,
        // which means it came from `alloc()` with this same layout.
        unsafe {
            dealloc(block.as_ptr().cast(), layout);
        }
    }
}

/// The largest element count of `T` that fits into a single `Layout`.
#[must_use]
pub(crate) fn max_len<T>() -> usize {
    isize::MAX
        .unsigned_abs()
        .checked_div(size_of::<T>())
        .unwrap_or(usize::MAX)
}

fn checked_layout<T>(count: usize) -> Result<Layout> {
    let max = max_len::<T>();

    if count > max {
        return Err(Error::CapacityOverflow {
            requested: count,
            max,
        });
    }

    Ok(Layout::array::<T>(count).expect("guarded by the maximum length check above"))
}
