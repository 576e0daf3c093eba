use std::any::type_name;
use std::mem;
use std::ops::{Bound, Deref, DerefMut, Range, RangeBounds};
use std::slice;

use tracing::trace;

use crate::{
    Cursor, CursorMut, Error, Global, GrowthFactor, IntoIter, PlacementVecBuilder, RawBuf, Result,
    RevCursor, RevCursorMut, SlotAllocator,
};

/// A contiguous growable sequence of `T` whose storage comes from a [`SlotAllocator`].
///
/// The container owns one block of `capacity()` slots. The first `len()` slots hold constructed
/// elements, the rest is allocated but uninitialized. Every element enters a slot through the
/// allocator's `construct()`, including when it is relocated into a new block or shifted to open
/// or close a gap. Elements torn down in place (erase, truncate, clear, drop) leave through
/// `destroy()`. Values moved out of a slot (a relocation's source, `pop()`, the owning iterator)
/// leave without a `destroy()` call, as a Rust move leaves nothing behind to tear down.
///
/// When an operation needs more room than is available, the capacity grows geometrically by the
/// container's [`GrowthFactor`] (3/2 by default), which keeps the total relocation cost of many
/// insertions linear. An empty container with zero capacity owns no block at all.
///
/// Positions are expressed as logical indexes and handed back as cursors: [`Cursor`],
/// [`CursorMut`], [`RevCursor`] and [`RevCursorMut`].
///
/// # Examples
///
/// ```
/// use placement_vec::PlacementVec;
///
/// let mut items = PlacementVec::new();
/// items.push(10);
/// items.push(20);
/// items.push(30);
///
/// items.insert(1, 100);
/// assert_eq!(items.as_slice(), [10, 100, 20, 30]);
///
/// items.erase(0);
/// assert_eq!(items.as_slice(), [100, 20, 30]);
///
/// assert!(items.at(5).is_err());
/// ```
pub struct PlacementVec<T, A: SlotAllocator<T> = Global> {
    buf: RawBuf<T, A>,

    /// Number of constructed slots at the start of the block.
    ///
    /// While a gap is open inside the sequence this is temporarily lowered to the gap start, so
    /// a panic from user code (a clone, a constructor closure, an iterator) leaks the tail
    /// instead of exposing vacant slots as elements.
    len: usize,

    growth: GrowthFactor,
}

impl<T> PlacementVec<T, Global> {
    /// Creates an empty container. Does not allocate.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Starts building a new [`PlacementVec`].
    ///
    /// Use this when you want to customize the allocator, the growth factor or the initial
    /// capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use placement_vec::PlacementVec;
    ///
    /// let items = PlacementVec::<u32>::builder().capacity(16).build();
    ///
    /// assert!(items.is_empty());
    /// assert_eq!(items.capacity(), 16);
    /// ```
    pub fn builder() -> PlacementVecBuilder<T, Global> {
        PlacementVecBuilder::new()
    }

    /// Creates an empty container with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if the capacity exceeds [`max_size()`][Self::max_size] or cannot be allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity_in(capacity, Global).unwrap_or_else(capacity_failure)
    }

    /// Creates a container of `len` default-constructed elements, with capacity equal to `len`.
    ///
    /// # Panics
    ///
    /// Panics if the elements cannot be allocated.
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut items = Self::with_capacity(len);
        items.resize_with(len, T::default);
        items
    }

    /// Creates a container of `count` clones of `value`, with capacity equal to `count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use placement_vec::PlacementVec;
    ///
    /// let items = PlacementVec::from_elem(5, &9);
    ///
    /// assert_eq!(items.len(), 5);
    /// assert_eq!(items.capacity(), 5);
    /// assert!(items.iter().all(|item| *item == 9));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the elements cannot be allocated.
    #[must_use]
    pub fn from_elem(count: usize, value: &T) -> Self
    where
        T: Clone,
    {
        let mut items = Self::with_capacity(count);
        items.resize_value(count, value);
        items
    }
}

impl<T, A: SlotAllocator<T>> PlacementVec<T, A> {
    /// Creates an empty container that will draw its storage from `allocator`. Does not allocate.
    #[must_use]
    pub fn new_in(allocator: A) -> Self {
        Self::from_parts(RawBuf::new(allocator), GrowthFactor::DEFAULT)
    }

    /// Creates an empty container with exactly `capacity` slots from `allocator`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if the capacity exceeds the allocator's maximum and
    /// [`Error::OutOfMemory`] if the allocator cannot provide the block.
    pub fn try_with_capacity_in(capacity: usize, allocator: A) -> Result<Self> {
        Ok(Self::from_parts(
            RawBuf::with_capacity(capacity, allocator)?,
            GrowthFactor::DEFAULT,
        ))
    }

    /// Creates a container holding the items of `iter`, drawing storage from `allocator`.
    ///
    /// If the length of the source is known up front (its size hint is exact), exactly that many
    /// slots are reserved before any element is constructed. Otherwise the container grows as
    /// the items arrive.
    ///
    /// # Panics
    ///
    /// Panics if the elements cannot be allocated.
    #[must_use]
    pub fn from_iter_in<I: IntoIterator<Item = T>>(iter: I, allocator: A) -> Self {
        let iter = iter.into_iter();

        let mut items = Self::new_in(allocator);

        if let Some(count) = exact_len(&iter) {
            items.reserve(count);
        }

        items.extend_from_iter(iter);
        items
    }

    pub(crate) fn from_parts(buf: RawBuf<T, A>, growth: GrowthFactor) -> Self {
        Self {
            buf,
            len: 0,
            growth,
        }
    }

    /// The number of elements in the container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the container has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of slots the container can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The largest number of elements the container can ever hold.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.buf.max_len()
    }

    /// The allocator the container draws its storage from.
    #[must_use]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// The factor by which the capacity grows when the container runs out of room.
    #[must_use]
    pub fn growth_factor(&self) -> GrowthFactor {
        self.growth
    }

    /// The elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` slots are constructed and the pointer is non-null and aligned
        // (dangling only when `len` is zero, which is valid for an empty slice). We hold a
        // shared borrow of the container, so nothing mutates the slots meanwhile.
        unsafe { slice::from_raw_parts(self.buf.as_ptr().as_ptr(), self.len) }
    }

    /// The elements as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As in `as_slice()`, and we hold the exclusive borrow of the container.
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr().as_ptr(), self.len) }
    }

    /// Pointer to the first slot of the block.
    ///
    /// The pointer is dangling (but non-null and aligned) if the container owns no block. It is
    /// invalidated by any operation that reallocates.
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr().as_ptr()
    }

    /// Mutable pointer to the first slot of the block. See [`as_ptr()`][Self::as_ptr].
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_ptr().as_ptr()
    }

    /// Bounds-checked access to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;

        self.as_slice()
            .get(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Bounds-checked exclusive access to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;

        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Access to the element at `index` without a bounds check in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(
            index < self.len,
            "get_unchecked({index}) out of range for {} elements of {}",
            self.len,
            type_name::<T>()
        );

        // SAFETY: The caller guarantees the index refers to a constructed slot.
        unsafe { self.buf.slot(index).as_ref() }
    }

    /// Exclusive access to the element at `index` without a bounds check in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(
            index < self.len,
            "get_unchecked_mut({index}) out of range for {} elements of {}",
            self.len,
            type_name::<T>()
        );

        // SAFETY: The caller guarantees the index refers to a constructed slot and we hold the
        // exclusive borrow of the container.
        unsafe { self.buf.slot(index).as_mut() }
    }

    /// The first element, if any.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// The first element, if any.
    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// The last element, if any.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// The last element, if any.
    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// A cursor at the first element (equal to [`end()`][Self::end] if the container is empty).
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), 0)
    }

    /// A cursor one past the last element. Not dereferenceable.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.len)
    }

    /// Same as [`begin()`][Self::begin].
    #[must_use]
    pub fn cbegin(&self) -> Cursor<'_, T> {
        self.begin()
    }

    /// Same as [`end()`][Self::end].
    #[must_use]
    pub fn cend(&self) -> Cursor<'_, T> {
        self.end()
    }

    /// A reverse cursor at the last element (equal to [`rend()`][Self::rend] if the container is
    /// empty).
    #[must_use]
    pub fn rbegin(&self) -> RevCursor<'_, T> {
        RevCursor::new(self.as_slice(), self.len)
    }

    /// A reverse cursor one before the first element. Not dereferenceable.
    #[must_use]
    pub fn rend(&self) -> RevCursor<'_, T> {
        RevCursor::new(self.as_slice(), 0)
    }

    /// Same as [`rbegin()`][Self::rbegin].
    #[must_use]
    pub fn crbegin(&self) -> RevCursor<'_, T> {
        self.rbegin()
    }

    /// Same as [`rend()`][Self::rend].
    #[must_use]
    pub fn crend(&self) -> RevCursor<'_, T> {
        self.rend()
    }

    /// A mutable cursor at the first element.
    #[must_use]
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        self.cursor_mut_at(0)
    }

    /// A mutable cursor one past the last element.
    #[must_use]
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        self.cursor_mut_at(self.len)
    }

    /// A mutable reverse cursor at the last element.
    #[must_use]
    pub fn rbegin_mut(&mut self) -> RevCursorMut<'_, T> {
        let len = self.len;
        RevCursorMut::new(self.as_mut_slice(), len)
    }

    /// A mutable reverse cursor one before the first element.
    #[must_use]
    pub fn rend_mut(&mut self) -> RevCursorMut<'_, T> {
        RevCursorMut::new(self.as_mut_slice(), 0)
    }

    fn cursor_mut_at(&mut self, index: usize) -> CursorMut<'_, T> {
        CursorMut::new(self.as_mut_slice(), index)
    }

    /// Ensures the container has at least `capacity` slots in total.
    ///
    /// Unlike implicit growth, this allocates exactly the requested number of slots. Does nothing
    /// if the capacity is already sufficient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] if `capacity` exceeds [`max_size()`][Self::max_size]
    /// and [`Error::OutOfMemory`] if the allocator cannot provide the block. The container is
    /// unchanged on failure.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity() {
            return Ok(());
        }

        self.with_elements_detached(|buf, len| buf.reallocate(len, capacity))
    }

    /// Ensures the container has at least `capacity` slots in total.
    ///
    /// # Examples
    ///
    /// ```
    /// use placement_vec::PlacementVec;
    ///
    /// let mut items = PlacementVec::from([1, 2]);
    ///
    /// items.reserve(10);
    /// assert_eq!(items.capacity(), 10);
    ///
    /// // Reserving less than the current capacity is a no-op.
    /// items.reserve(3);
    /// assert_eq!(items.capacity(), 10);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the capacity exceeds [`max_size()`][Self::max_size] or cannot be allocated.
    pub fn reserve(&mut self, capacity: usize) {
        self.try_reserve(capacity).unwrap_or_else(capacity_failure);
    }

    /// Replaces the block with one that holds exactly `len()` slots, moving the elements into it.
    /// An empty container releases its block entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the allocator cannot provide the new block. The
    /// container is unchanged on failure.
    pub fn try_shrink_to_fit(&mut self) -> Result<()> {
        if self.len == self.capacity() {
            return Ok(());
        }

        if self.len == 0 {
            trace!(
                element = type_name::<T>(),
                capacity = self.capacity(),
                "releasing block of empty container"
            );
        }

        self.with_elements_detached(|buf, len| buf.reallocate(len, len))
    }

    /// Replaces the block with one that holds exactly `len()` slots, moving the elements into it.
    ///
    /// # Panics
    ///
    /// Panics if the allocator cannot provide the new block.
    pub fn shrink_to_fit(&mut self) {
        self.try_shrink_to_fit().unwrap_or_else(capacity_failure);
    }

    /// Destroys all elements. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Destroys the trailing elements so that exactly `len` remain. Does nothing if the container
    /// is not longer than `len`.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len;

        if len >= old_len {
            return;
        }

        // Lowered first so a panicking destructor cannot lead to a second teardown.
        self.len = len;

        // SAFETY: Slots `len..old_len` were constructed and are no longer part of the sequence.
        unsafe {
            self.buf.destroy_range(len..old_len);
        }
    }

    /// Appends an element, growing the capacity if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::OutOfMemory`] if growing fails, in which
    /// case the container is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<()> {
        self.grow_for(1)?;

        // SAFETY: `grow_for()` guarantees `len < capacity` and slots past `len` are vacant.
        unsafe {
            self.buf.construct_at(self.len, value);
        }

        self.len = self
            .len
            .checked_add(1)
            .expect("guarded by capacity check in grow_for()");

        Ok(())
    }

    /// Appends an element, growing the capacity if needed.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot grow.
    pub fn push(&mut self, value: T) {
        self.try_push(value).unwrap_or_else(capacity_failure);
    }

    /// Removes the last element and returns it, or `None` if the container is empty.
    pub fn pop(&mut self) -> Option<T> {
        self.len = self.len.checked_sub(1)?;

        // SAFETY: The slot at the old `len - 1` was constructed and is no longer part of the
        // sequence, so moving the value out leaves no duplicate behind.
        Some(unsafe { self.buf.take_at(self.len) })
    }

    /// Inserts the element produced by `produce` at `index`, shifting all elements after it
    /// towards the back.
    ///
    /// Capacity is secured before `produce` is called, so nothing is produced if growing fails.
    /// Returns a cursor at the inserted element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::OutOfMemory`] if growing fails. The
    /// container is unchanged on failure.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_emplace<F>(&mut self, index: usize, produce: F) -> Result<CursorMut<'_, T>>
    where
        F: FnOnce() -> T,
    {
        self.assert_insert_position(index);
        self.grow_for(1)?;

        let value = produce();

        let len = self.len;
        self.len = index;

        // SAFETY: `grow_for()` secured room for one more element and `index <= len`.
        unsafe {
            self.buf.open_gap(index, len, 1);
        }

        // SAFETY: `open_gap()` left the slot at `index` vacant.
        unsafe {
            self.buf.construct_at(index, value);
        }

        self.len = len.checked_add(1).expect("guarded by grow_for()");

        Ok(self.cursor_mut_at(index))
    }

    /// Inserts the element produced by `produce` at `index`. See
    /// [`try_emplace()`][Self::try_emplace].
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the capacity cannot grow.
    pub fn emplace<F>(&mut self, index: usize, produce: F) -> CursorMut<'_, T>
    where
        F: FnOnce() -> T,
    {
        self.try_emplace(index, produce)
            .unwrap_or_else(capacity_failure)
    }

    /// Inserts `value` at `index`, shifting all elements after it towards the back. Returns a
    /// cursor at the inserted element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityOverflow`] or [`Error::OutOfMemory`] if growing fails.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<CursorMut<'_, T>> {
        self.try_emplace(index, || value)
    }

    /// Inserts `value` at `index`, shifting all elements after it towards the back. Returns a
    /// cursor at the inserted element.
    ///
    /// # Examples
    ///
    /// ```
    /// use placement_vec::PlacementVec;
    ///
    /// let mut items = PlacementVec::from([10, 20, 30]);
    ///
    /// let inserted = items.insert(1, 100);
    /// assert_eq!(*inserted, 100);
    /// assert_eq!(inserted[1], 20);
    ///
    /// assert_eq!(items.as_slice(), [10, 100, 20, 30]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the capacity cannot grow.
    pub fn insert(&mut self, index: usize, value: T) -> CursorMut<'_, T> {
        self.try_insert(index, value)
            .unwrap_or_else(capacity_failure)
    }

    /// Inserts `count` clones of `value` at `index`. Returns a cursor at the first inserted
    /// element (or at `index` if `count` is zero).
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the capacity cannot grow.
    pub fn insert_n(&mut self, index: usize, count: usize, value: &T) -> CursorMut<'_, T>
    where
        T: Clone,
    {
        self.assert_insert_position(index);
        self.grow_for(count).unwrap_or_else(capacity_failure);

        let len = self.len;
        self.len = index;

        // SAFETY: `grow_for()` secured room for `count` more elements and `index <= len`.
        unsafe {
            self.buf.open_gap(index, len, count);
        }

        for offset in 0..count {
            let slot = index.checked_add(offset).expect("guarded by grow_for()");

            // SAFETY: The gap `index..index + count` is vacant and we fill it front to back.
            unsafe {
                self.buf.construct_at(slot, value.clone());
            }
        }

        self.len = len.checked_add(count).expect("guarded by grow_for()");

        self.cursor_mut_at(index)
    }

    /// Inserts the items of `iter` at `index`, in order. Returns a cursor at the first inserted
    /// element (or at `index` if the source was empty).
    ///
    /// Sources whose length is known up front are inserted with a single reservation and a
    /// single shift of the existing tail. Other sources are first gathered into a temporary
    /// container from the same allocator.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()` or if the capacity cannot grow.
    pub fn insert_from<I>(&mut self, index: usize, iter: I) -> CursorMut<'_, T>
    where
        I: IntoIterator<Item = T>,
    {
        self.assert_insert_position(index);

        let iter = iter.into_iter();

        match exact_len(&iter) {
            Some(count) => self.insert_exact(index, count, iter),
            None => {
                let mut staged =
                    Self::from_parts(RawBuf::new(self.allocator().clone()), self.growth);
                staged.extend_from_iter(iter);
                self.insert_staged(index, staged);
            }
        }

        self.cursor_mut_at(index)
    }

    fn insert_exact(&mut self, index: usize, count: usize, mut iter: impl Iterator<Item = T>) {
        self.grow_for(count).unwrap_or_else(capacity_failure);

        let len = self.len;
        self.len = index;

        // SAFETY: `grow_for()` secured room for `count` more elements and `index <= len`.
        unsafe {
            self.buf.open_gap(index, len, count);
        }

        let mut produced: usize = 0;

        while produced < count {
            let Some(value) = iter.next() else {
                break;
            };

            let slot = index.checked_add(produced).expect("guarded by grow_for()");

            // SAFETY: The gap `index..index + count` is vacant and we fill it front to back.
            unsafe {
                self.buf.construct_at(slot, value);
            }

            produced = produced.checked_add(1).expect("bounded by count");
        }

        let missing = count.checked_sub(produced).expect("bounded by count");

        if missing > 0 {
            // The iterator reported an exact length but ended early. Close what is left of the
            // gap so the sequence stays contiguous.
            let gap_start = index.checked_add(produced).expect("guarded by grow_for()");
            let total = len.checked_add(count).expect("guarded by grow_for()");

            // SAFETY: `gap_start..gap_start + missing` is vacant and everything else below
            // `total` is constructed.
            unsafe {
                self.buf.close_gap(gap_start, total, missing);
            }
        }

        self.len = len.checked_add(produced).expect("guarded by grow_for()");
    }

    fn insert_staged(&mut self, index: usize, mut staged: Self) {
        let count = staged.len;
        self.grow_for(count).unwrap_or_else(capacity_failure);

        // The staged elements are moved out below, so the staged container must not see them.
        staged.len = 0;

        let len = self.len;
        self.len = index;

        // SAFETY: `grow_for()` secured room for `count` more elements and `index <= len`.
        unsafe {
            self.buf.open_gap(index, len, count);
        }

        for offset in 0..count {
            let to = self
                .buf
                .slot(index.checked_add(offset).expect("guarded by grow_for()"));

            // SAFETY: The staged slot was constructed and is no longer tracked by `staged`; the
            // target is inside the gap we just opened.
            unsafe {
                staged.buf.relocate_to(offset, to);
            }
        }

        self.len = len.checked_add(count).expect("guarded by grow_for()");
    }

    /// Removes the element at `index`, shifting all elements after it towards the front.
    /// Returns a cursor at the element that followed the removed one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> CursorMut<'_, T> {
        assert!(
            index < self.len,
            "erase({index}) out of range for {} elements of {}",
            self.len,
            type_name::<T>()
        );

        self.erase_range(index..=index)
    }

    /// Removes the elements in `range`, shifting all elements after it towards the front.
    /// Returns a cursor at the element that followed the removed ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use placement_vec::PlacementVec;
    ///
    /// let mut items = PlacementVec::from([1, 2, 3, 4, 5]);
    ///
    /// let next = items.erase_range(1..3);
    /// assert_eq!(*next, 4);
    ///
    /// assert_eq!(items.as_slice(), [1, 4, 5]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `0..=len()` or its start is after its end.
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> CursorMut<'_, T> {
        let Range { start, end } = resolve_range(&range, self.len);

        let len = self.len;
        let count = end.checked_sub(start).expect("guarded by resolve_range()");

        self.len = start;

        // SAFETY: `start..end` is inside the constructed prefix and no longer part of the
        // sequence.
        unsafe {
            self.buf.destroy_range(start..end);
        }

        // SAFETY: The range we just destroyed is the gap; everything else below `len` is
        // constructed.
        unsafe {
            self.buf.close_gap(start, len, count);
        }

        self.len = len.checked_sub(count).expect("guarded by resolve_range()");

        self.cursor_mut_at(start)
    }

    /// Resizes the container to `len` elements, filling new slots with values returned by
    /// `produce`, or truncating if the container is longer.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot grow.
    pub fn resize_with<F>(&mut self, len: usize, mut produce: F)
    where
        F: FnMut() -> T,
    {
        let Some(additional) = len.checked_sub(self.len) else {
            self.truncate(len);
            return;
        };

        self.grow_for(additional).unwrap_or_else(capacity_failure);

        while self.len < len {
            // SAFETY: `grow_for()` secured room up to `len` and slots past `self.len` are vacant.
            unsafe {
                self.buf.construct_at(self.len, produce());
            }

            self.len = self.len.checked_add(1).expect("bounded by len");
        }
    }

    /// Resizes the container to `len` elements, filling new slots with `T::default()`, or
    /// truncating if the container is longer.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot grow.
    pub fn resize(&mut self, len: usize)
    where
        T: Default,
    {
        self.resize_with(len, T::default);
    }

    /// Resizes the container to `len` elements, filling every new slot with a clone of `value`,
    /// or truncating if the container is longer.
    ///
    /// # Examples
    ///
    /// ```
    /// use placement_vec::PlacementVec;
    ///
    /// let mut items = PlacementVec::from([5, 10]);
    ///
    /// items.resize_value(6, &228);
    /// assert_eq!(items.as_slice(), [5, 10, 228, 228, 228, 228]);
    ///
    /// items.resize_value(1, &0);
    /// assert_eq!(items.as_slice(), [5]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot grow.
    pub fn resize_value(&mut self, len: usize, value: &T)
    where
        T: Clone,
    {
        self.resize_with(len, || value.clone());
    }

    /// Replaces the contents with the items of `iter`.
    ///
    /// If the length of the source is known up front and exceeds the current capacity, exactly
    /// that many slots are reserved.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot grow.
    pub fn assign_from<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();

        self.clear();

        if let Some(count) = exact_len(&iter) {
            self.reserve(count);
        }

        self.extend_from_iter(iter);
    }

    /// Replaces the contents with `count` clones of `value`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity cannot grow.
    pub fn assign_n(&mut self, count: usize, value: &T)
    where
        T: Clone,
    {
        self.clear();
        self.reserve(count);
        self.resize_value(count, value);
    }

    /// Exchanges the contents, storage, allocator and growth factor of two containers without
    /// touching any element.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Transfers ownership of the storage to the caller, leaving `self` never to be used again.
    pub(crate) fn into_raw_parts(self) -> (RawBuf<T, A>, usize) {
        let this = mem::ManuallyDrop::new(self);

        // SAFETY: `this` is never touched again and its destructor does not run, so the storage
        // ends up with exactly one owner.
        let buf = unsafe { std::ptr::read(&this.buf) };

        (buf, this.len)
    }

    fn extend_from_iter(&mut self, iter: impl Iterator<Item = T>) {
        if let Some(count) = exact_len(&iter) {
            self.grow_for(count).unwrap_or_else(capacity_failure);
        }

        for value in iter {
            self.push(value);
        }
    }

    /// Ensures room for `additional` more elements, growing by the growth factor if needed.
    fn grow_for(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| Error::CapacityOverflow {
                requested: usize::MAX,
                max: self.max_size(),
            })?;

        let growth = self.growth;

        self.with_elements_detached(|buf, len| {
            buf.ensure_capacity(len, required, |current, required, max| {
                growth.grown_capacity(current, required, max)
            })
        })
    }

    /// Runs a block replacement with `len` lowered to zero for its duration.
    ///
    /// Relocation calls the allocator's `construct()`, which may unwind. The elements are then
    /// split between two blocks and are leaked instead of being dropped a second time.
    fn with_elements_detached<R>(
        &mut self,
        replace: impl FnOnce(&mut RawBuf<T, A>, usize) -> R,
    ) -> R {
        let len = mem::replace(&mut self.len, 0);

        let result = replace(&mut self.buf, len);

        self.len = len;
        result
    }

    fn assert_insert_position(&self, index: usize) {
        assert!(
            index <= self.len,
            "insert position {index} out of range for {} elements of {}",
            self.len,
            type_name::<T>()
        );
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(test)]
    fn integrity_check(&self) {
        assert!(
            self.len <= self.capacity(),
            "len {} exceeds capacity {} in container of {}",
            self.len,
            self.capacity(),
            type_name::<T>()
        );
        assert!(self.capacity() <= self.max_size());
    }
}

impl<T, A: SlotAllocator<T>> Drop for PlacementVec<T, A> {
    fn drop(&mut self) {
        // The block itself is released when `buf` drops after us.
        self.clear();
    }
}

impl<T, A: SlotAllocator<T> + Default> Default for PlacementVec<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: SlotAllocator<T>> Clone for PlacementVec<T, A> {
    /// Creates a deep copy with capacity equal to the length, drawing storage from a clone of
    /// the allocator.
    fn clone(&self) -> Self {
        let mut copy = Self::try_with_capacity_in(self.len, self.allocator().clone())
            .unwrap_or_else(capacity_failure);
        copy.growth = self.growth;

        for value in self.as_slice() {
            copy.push(value.clone());
        }

        copy
    }
}

impl<T: std::fmt::Debug, A: SlotAllocator<T>> std::fmt::Debug for PlacementVec<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T, A: SlotAllocator<T>> Deref for PlacementVec<T, A> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, A: SlotAllocator<T>> DerefMut for PlacementVec<T, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T, U, A, B> PartialEq<PlacementVec<U, B>> for PlacementVec<T, A>
where
    T: PartialEq<U>,
    A: SlotAllocator<T>,
    B: SlotAllocator<U>,
{
    fn eq(&self, other: &PlacementVec<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: SlotAllocator<T>> Eq for PlacementVec<T, A> {}

impl<T, U, A: SlotAllocator<T>> PartialEq<[U]> for PlacementVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: SlotAllocator<T>> PartialEq<&[U]> for PlacementVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A: SlotAllocator<T>, const N: usize> PartialEq<[U; N]> for PlacementVec<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, A: SlotAllocator<T>> Extend<T> for PlacementVec<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_from_iter(iter.into_iter());
    }
}

impl<T, A: SlotAllocator<T> + Default> FromIterator<T> for PlacementVec<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_in(iter, A::default())
    }
}

impl<T: Clone> From<&[T]> for PlacementVec<T, Global> {
    fn from(values: &[T]) -> Self {
        Self::from_iter_in(values.iter().cloned(), Global)
    }
}

impl<T, const N: usize> From<[T; N]> for PlacementVec<T, Global> {
    fn from(values: [T; N]) -> Self {
        Self::from_iter_in(values, Global)
    }
}

impl<T, A: SlotAllocator<T>> IntoIterator for PlacementVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let (buf, len) = self.into_raw_parts();
        IntoIter::new(buf, len)
    }
}

impl<'a, T, A: SlotAllocator<T>> IntoIterator for &'a PlacementVec<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, A: SlotAllocator<T>> IntoIterator for &'a mut PlacementVec<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

// SAFETY: The container owns its elements and its allocator exclusively; the raw block pointer
// does not alias anything else. Moving the container moves ownership of both.
unsafe impl<T: Send, A: SlotAllocator<T> + Send> Send for PlacementVec<T, A> {}

// SAFETY: Shared access only ever hands out shared references to elements and to the allocator.
unsafe impl<T: Sync, A: SlotAllocator<T> + Sync> Sync for PlacementVec<T, A> {}

/// The number of items an iterator will yield, if its size hint pins it down exactly.
fn exact_len(iter: &impl Iterator) -> Option<usize> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(lower),
        _ => None,
    }
}

fn resolve_range(range: &impl RangeBounds<usize>, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start
            .checked_add(1)
            .expect("range start cannot be excluded at usize::MAX"),
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&end) => end
            .checked_add(1)
            .expect("range end cannot be included at usize::MAX"),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    assert!(
        start <= end,
        "range start {start} is after range end {end}"
    );
    assert!(
        end <= len,
        "range end {end} out of range for sequence of length {len}"
    );

    start..end
}

#[cold]
#[track_caller]
fn capacity_failure<R>(error: Error) -> R {
    panic!("{error}")
}
