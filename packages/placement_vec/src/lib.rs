#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A contiguous growable sequence whose element storage and element lifecycle are both routed
//! through a pluggable allocator.
//!
//! This crate provides [`PlacementVec`], a dynamic array in the spirit of [`Vec`] that separates
//! allocating raw slots from constructing values inside them. Every value enters its slot through
//! [`SlotAllocator::construct()`], including when the container relocates elements into a bigger
//! block or shifts them to open and close gaps. Elements torn down in place leave through
//! [`SlotAllocator::destroy()`]. Values moved out of a slot (relocation sources, popped elements,
//! elements taken by the owning iterator) leave without a `destroy()` call.
//!
//! # Key Features
//!
//! - **Geometric growth**: Capacity grows by a configurable [`GrowthFactor`] (3/2 by default),
//!   keeping the cost of sequential insertion amortized constant
//! - **Exact reservation**: [`reserve()`](PlacementVec::reserve) and
//!   [`shrink_to_fit()`](PlacementVec::shrink_to_fit) allocate exactly what is asked for
//! - **Positional editing**: Insert, emplace, erase and range-erase at arbitrary positions
//! - **Cursors**: Forward and reverse cursors with random-access arithmetic and ordering, in
//!   shared and exclusive flavors
//! - **Fallible variants**: `try_*` methods report [`Error`] values instead of panicking when
//!   capacity cannot be provided
//! - **Slice interop**: Derefs to `[T]`, so the whole slice API is available
//!
//! # Example
//!
//! ```rust
//! use placement_vec::PlacementVec;
//!
//! let mut items = PlacementVec::new();
//!
//! for value in 0..6 {
//!     items.push(value);
//! }
//!
//! assert_eq!(items.capacity(), 9);
//!
//! items.insert(2, 100);
//! items.erase_range(4..);
//! assert_eq!(items.as_slice(), [0, 1, 100, 2]);
//!
//! let reversed: Vec<i32> = items.iter().rev().copied().collect();
//! assert_eq!(reversed, [2, 100, 1, 0]);
//! ```
//!
//! # Custom allocators
//!
//! Implement [`SlotAllocator`] to supply storage from somewhere else or to hook into the element
//! lifecycle. The provided [`Global`] allocator uses the global Rust allocator and plain moves.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::num::NonZero;
//! use std::ptr::NonNull;
//! use std::rc::Rc;
//!
//! use placement_vec::{Error, Global, PlacementVec, SlotAllocator};
//!
//! #[derive(Clone, Default)]
//! struct CountingConstructs {
//!     constructs: Rc<Cell<usize>>,
//! }
//!
//! // SAFETY: Memory management is forwarded to `Global`.
//! unsafe impl<T> SlotAllocator<T> for CountingConstructs {
//!     fn allocate(&self, count: NonZero<usize>) -> Result<NonNull<T>, Error> {
//!         SlotAllocator::<T>::allocate(&Global, count)
//!     }
//!
//!     unsafe fn deallocate(&self, block: NonNull<T>, count: NonZero<usize>) {
//!         // SAFETY: Forwarding the caller's guarantee.
//!         unsafe { Global.deallocate(block, count) }
//!     }
//!
//!     unsafe fn construct(&self, slot: NonNull<T>, value: T) {
//!         self.constructs.set(self.constructs.get() + 1);
//!
//!         // SAFETY: Forwarding the caller's guarantee.
//!         unsafe { Global.construct(slot, value) }
//!     }
//! }
//!
//! let allocator = CountingConstructs::default();
//! let mut items = PlacementVec::new_in(allocator.clone());
//!
//! items.push(1);
//! items.push(2);
//! items.push(3);
//!
//! // Three pushes plus two relocations when the capacity grew from 2 to 5.
//! assert_eq!(allocator.constructs.get(), 5);
//! ```

mod allocator;
mod builder;
mod cursor;
mod error;
mod growth;
mod into_iter;
mod lifecycle;
mod rev_cursor;
mod storage;
#[cfg(test)]
mod testing;
mod vec;

pub use allocator::*;
pub use builder::*;
pub use cursor::{Cursor, CursorMut};
pub use error::Error;
pub(crate) use error::Result;
pub use growth::*;
pub use into_iter::*;
pub use rev_cursor::*;
pub(crate) use storage::*;
pub use vec::*;
