use std::any::type_name;
use std::marker::PhantomData;

use crate::{Global, GrowthFactor, PlacementVec, RawBuf, Result, SlotAllocator};

/// Builder for creating an instance of [`PlacementVec`].
///
/// All settings are optional. Without any of them, the builder produces the same container as
/// [`PlacementVec::new()`].
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use placement_vec::{GrowthFactor, PlacementVec};
///
/// let mut items = PlacementVec::<u64>::builder()
///     .growth_factor(GrowthFactor::new(nz!(2), nz!(1)))
///     .capacity(4)
///     .build();
///
/// items.extend([1, 2, 3, 4, 5]);
/// assert_eq!(items.capacity(), 10);
/// ```
#[must_use]
pub struct PlacementVecBuilder<T, A: SlotAllocator<T> = Global> {
    allocator: A,
    growth: GrowthFactor,
    capacity: usize,

    _item: PhantomData<T>,
}

impl<T> PlacementVecBuilder<T, Global> {
    pub(crate) fn new() -> Self {
        Self {
            allocator: Global,
            growth: GrowthFactor::DEFAULT,
            capacity: 0,
            _item: PhantomData,
        }
    }
}

impl<T, A: SlotAllocator<T>> PlacementVecBuilder<T, A> {
    /// Sets the allocator the container draws its storage from.
    ///
    /// Any previously configured allocator is discarded.
    pub fn allocator<B: SlotAllocator<T>>(self, allocator: B) -> PlacementVecBuilder<T, B> {
        PlacementVecBuilder {
            allocator,
            growth: self.growth,
            capacity: self.capacity,
            _item: PhantomData,
        }
    }

    /// Sets the factor by which the capacity grows when the container runs out of room.
    pub fn growth_factor(mut self, growth: GrowthFactor) -> Self {
        self.growth = growth;
        self
    }

    /// Sets the number of slots to allocate up front.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds the container with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if the initial capacity cannot be allocated.
    #[must_use]
    pub fn build(self) -> PlacementVec<T, A> {
        self.try_build().unwrap_or_else(|error| panic!("{error}"))
    }

    /// Builds the container with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`][crate::Error::CapacityOverflow] if the initial
    /// capacity exceeds the allocator's maximum and
    /// [`Error::OutOfMemory`][crate::Error::OutOfMemory] if the allocator cannot provide it.
    pub fn try_build(self) -> Result<PlacementVec<T, A>> {
        let buf = RawBuf::with_capacity(self.capacity, self.allocator)?;

        Ok(PlacementVec::from_parts(buf, self.growth))
    }
}

impl<T, A: SlotAllocator<T> + std::fmt::Debug> std::fmt::Debug for PlacementVecBuilder<T, A> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("allocator", &self.allocator)
            .field("growth", &self.growth)
            .field("capacity", &self.capacity)
            .finish()
    }
}
