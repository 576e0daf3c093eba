use std::any::type_name;
use std::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign};

/// A read-only position in a [`PlacementVec`][crate::PlacementVec], moving front to back.
///
/// A cursor is a lightweight, copyable handle made of a borrowed view of the elements and a
/// logical index. It supports random-access arithmetic in O(1), dereferencing to the element it
/// points at, relative subscripting (`cursor[n]` is the element at `cursor + n`) and ordering by
/// index.
///
/// The position one past the last element (see [`PlacementVec::end()`][1]) is a valid cursor
/// for comparisons and arithmetic but dereferencing it panics.
///
/// The cursor borrows the container, so the container cannot be modified while the cursor
/// exists and a cursor can never observe a reallocated or shifted element.
///
/// # Examples
///
/// ```
/// use placement_vec::PlacementVec;
///
/// let items = PlacementVec::from([10, 20, 30]);
///
/// let mut cursor = items.begin();
/// assert_eq!(*cursor, 10);
///
/// cursor += 2;
/// assert_eq!(*cursor, 30);
/// assert_eq!(cursor - items.begin(), 2);
/// assert_eq!(items.begin()[1], 20);
///
/// cursor += 1;
/// assert!(cursor == items.end());
/// assert!(cursor.get().is_none());
/// ```
///
/// [1]: crate::PlacementVec::end
pub struct Cursor<'a, T> {
    elements: &'a [T],
    index: usize,
}

impl<'a, T> Cursor<'a, T> {
    #[must_use]
    pub(crate) fn new(elements: &'a [T], index: usize) -> Self {
        Self { elements, index }
    }

    /// The logical index of the element this cursor points at.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The element this cursor points at, or `None` if the cursor is not at an element
    /// (e.g. at the end position).
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.elements.get(self.index)
    }

    /// Converts the cursor into a reference to its element, with the lifetime of the borrow of
    /// the container.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is not at an element.
    #[must_use]
    pub fn into_ref(self) -> &'a T {
        self.get()
            .unwrap_or_else(|| not_dereferenceable::<T>(self.index, self.elements.len()))
    }

    fn order_key(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> Deref for Cursor<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.into_ref()
    }
}

impl<T> Index<usize> for Cursor<'_, T> {
    type Output = T;

    fn index(&self, offset: usize) -> &Self::Output {
        (*self + offset).into_ref()
    }
}

impl<T> Add<usize> for Cursor<'_, T> {
    type Output = Self;

    fn add(mut self, offset: usize) -> Self::Output {
        self += offset;
        self
    }
}

impl<T> Sub<usize> for Cursor<'_, T> {
    type Output = Self;

    fn sub(mut self, offset: usize) -> Self::Output {
        self -= offset;
        self
    }
}

impl<T> AddAssign<usize> for Cursor<'_, T> {
    fn add_assign(&mut self, offset: usize) {
        self.index = forward(self.index, offset);
    }
}

impl<T> SubAssign<usize> for Cursor<'_, T> {
    fn sub_assign(&mut self, offset: usize) {
        self.index = backward(self.index, offset);
    }
}

/// The signed distance from `other` to `self`.
impl<T> Sub for Cursor<'_, T> {
    type Output = isize;

    fn sub(self, other: Self) -> Self::Output {
        distance(other.index, self.index)
    }
}

impl<T> std::fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.elements.len())
            .finish()
    }
}

/// A position in a [`PlacementVec`][crate::PlacementVec] that grants exclusive access to its
/// element, moving front to back.
///
/// This is the mutable counterpart of [`Cursor`]. It holds the container's elements
/// exclusively, so it cannot be copied; use [`as_cursor()`][Self::as_cursor] to obtain a
/// read-only cursor at the same position.
///
/// The insertion and erasure methods of the container return this cursor so the caller can keep
/// working at the affected position.
///
/// # Examples
///
/// ```
/// use placement_vec::PlacementVec;
///
/// let mut items = PlacementVec::from([1, 2, 3]);
///
/// let mut cursor = items.begin_mut() + 1;
/// *cursor *= 10;
/// cursor[1] = 300;
///
/// assert_eq!(items.as_slice(), [1, 20, 300]);
/// ```
pub struct CursorMut<'a, T> {
    elements: &'a mut [T],
    index: usize,
}

impl<'a, T> CursorMut<'a, T> {
    #[must_use]
    pub(crate) fn new(elements: &'a mut [T], index: usize) -> Self {
        Self { elements, index }
    }

    /// The logical index of the element this cursor points at.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The element this cursor points at, or `None` if the cursor is not at an element.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.elements.get(self.index)
    }

    /// The element this cursor points at, or `None` if the cursor is not at an element.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.elements.get_mut(self.index)
    }

    /// A read-only cursor at the same position, borrowing from this one.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(self.elements, self.index)
    }

    /// Converts the cursor into an exclusive reference to its element, with the lifetime of the
    /// borrow of the container.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is not at an element.
    #[must_use]
    pub fn into_mut(self) -> &'a mut T {
        let len = self.elements.len();
        let index = self.index;
        let elements = self.elements;

        elements
            .get_mut(index)
            .unwrap_or_else(|| not_dereferenceable::<T>(index, len))
    }

    fn order_key(&self) -> usize {
        self.index
    }
}

impl<T> Deref for CursorMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
            .unwrap_or_else(|| not_dereferenceable::<T>(self.index, self.elements.len()))
    }
}

impl<T> DerefMut for CursorMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let len = self.elements.len();
        let index = self.index;

        self.get_mut()
            .unwrap_or_else(|| not_dereferenceable::<T>(index, len))
    }
}

impl<T> Index<usize> for CursorMut<'_, T> {
    type Output = T;

    fn index(&self, offset: usize) -> &Self::Output {
        let index = forward(self.index, offset);

        self.elements
            .get(index)
            .unwrap_or_else(|| not_dereferenceable::<T>(index, self.elements.len()))
    }
}

impl<T> IndexMut<usize> for CursorMut<'_, T> {
    fn index_mut(&mut self, offset: usize) -> &mut Self::Output {
        let index = forward(self.index, offset);
        let len = self.elements.len();

        self.elements
            .get_mut(index)
            .unwrap_or_else(|| not_dereferenceable::<T>(index, len))
    }
}

impl<T> Add<usize> for CursorMut<'_, T> {
    type Output = Self;

    fn add(mut self, offset: usize) -> Self::Output {
        self += offset;
        self
    }
}

impl<T> Sub<usize> for CursorMut<'_, T> {
    type Output = Self;

    fn sub(mut self, offset: usize) -> Self::Output {
        self -= offset;
        self
    }
}

impl<T> AddAssign<usize> for CursorMut<'_, T> {
    fn add_assign(&mut self, offset: usize) {
        self.index = forward(self.index, offset);
    }
}

impl<T> SubAssign<usize> for CursorMut<'_, T> {
    fn sub_assign(&mut self, offset: usize) {
        self.index = backward(self.index, offset);
    }
}

impl<T> std::fmt::Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index)
            .field("len", &self.elements.len())
            .finish()
    }
}

/// Implements equality and ordering for a cursor type in terms of its `order_key()`.
macro_rules! impl_position_ordering {
    ($cursor:ident) => {
        impl<T> PartialEq for $cursor<'_, T> {
            fn eq(&self, other: &Self) -> bool {
                self.order_key() == other.order_key()
            }
        }

        impl<T> Eq for $cursor<'_, T> {}

        impl<T> PartialOrd for $cursor<'_, T> {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<T> Ord for $cursor<'_, T> {
            fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
                self.order_key().cmp(&other.order_key())
            }
        }
    };
}

pub(crate) use impl_position_ordering;

impl_position_ordering!(Cursor);
impl_position_ordering!(CursorMut);

pub(crate) fn forward(index: usize, offset: usize) -> usize {
    index
        .checked_add(offset)
        .expect("cursor moved beyond the largest representable index")
}

pub(crate) fn backward(index: usize, offset: usize) -> usize {
    index.checked_sub(offset).unwrap_or_else(|| {
        panic!("cursor at {index} moved {offset} positions before the start of the sequence")
    })
}

/// The signed distance from position `from` to position `to`.
pub(crate) fn distance(from: usize, to: usize) -> isize {
    let from = isize::try_from(from).expect("cursor distance is only defined up to isize::MAX");
    let to = isize::try_from(to).expect("cursor distance is only defined up to isize::MAX");

    to.checked_sub(from)
        .expect("difference of two non-negative isize values cannot overflow")
}

#[cold]
pub(crate) fn not_dereferenceable<T>(index: usize, len: usize) -> ! {
    panic!(
        "cursor at {index} does not point at an element in a sequence of {len} {}",
        type_name::<T>()
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(Cursor<'static, u32>: Copy, Debug, Ord, Send, Sync);
    assert_impl_all!(CursorMut<'static, u32>: Debug, Ord, Send, Sync);
    assert_not_impl_any!(CursorMut<'static, u32>: Clone);

    // A cursor over a type that implements nothing still has its full surface.
    struct Opaque;
    assert_impl_all!(Cursor<'static, Opaque>: Copy, Debug, Ord);

    #[test]
    fn arithmetic_and_deref() {
        let elements = [1, 2, 3, 4];
        let begin = Cursor::new(&elements, 0);

        assert_eq!(*begin, 1);
        assert_eq!(*(begin + 3), 4);
        assert_eq!(*(begin + 3 - 2), 2);
        assert_eq!(begin[2], 3);

        let mut cursor = begin;
        cursor += 1;
        assert_eq!(cursor.index(), 1);
        cursor -= 1;
        assert_eq!(cursor, begin);
    }

    #[test]
    fn distance_is_signed() {
        let elements = [1, 2, 3, 4];
        let a = Cursor::new(&elements, 1);
        let b = Cursor::new(&elements, 4);

        assert_eq!(b - a, 3);
        assert_eq!(a - b, -3);
        assert_eq!(a - a, 0);
    }

    #[test]
    fn ordering_follows_index() {
        let elements = [1, 2, 3];
        let a = Cursor::new(&elements, 0);
        let b = Cursor::new(&elements, 2);

        assert!(a < b);
        assert!(b > a);
        assert!(a <= Cursor::new(&elements, 0));
        assert!(b >= Cursor::new(&elements, 2));
        assert_ne!(a, b);
    }

    #[test]
    fn end_is_not_dereferenceable() {
        let elements = [1, 2];
        let end = Cursor::new(&elements, 2);

        assert!(end.get().is_none());
        assert_eq!((end - 1).get(), Some(&2));
    }

    #[test]
    #[should_panic]
    fn deref_end_panics() {
        let elements = [1, 2];
        let end = Cursor::new(&elements, 2);

        let _value: i32 = *end;
    }

    #[test]
    #[should_panic]
    fn before_start_panics() {
        let elements = [1, 2];
        let begin = Cursor::new(&elements, 0);

        _ = begin - 1;
    }

    #[test]
    fn into_ref_outlives_cursor() {
        let elements = [7, 8];

        let reference = {
            let cursor = Cursor::new(&elements, 1);
            cursor.into_ref()
        };

        assert_eq!(*reference, 8);
    }

    #[test]
    fn mutable_cursor_writes_through() {
        let mut elements = [1, 2, 3];

        {
            let mut cursor = CursorMut::new(&mut elements, 0);
            *cursor = 10;

            cursor += 1;
            cursor[1] = 30;
            assert_eq!(cursor[0], 2);

            let cursor = cursor + 1;
            assert_eq!(*cursor, 30);
            assert_eq!(*cursor.as_cursor(), 30);

            *cursor.into_mut() = 31;
        }

        assert_eq!(elements, [10, 2, 31]);
    }

    #[test]
    fn mutable_cursor_get_at_end() {
        let mut elements = [1];
        let mut cursor = CursorMut::new(&mut elements, 1);

        assert!(cursor.get().is_none());
        assert!(cursor.get_mut().is_none());

        cursor -= 1;
        assert_eq!(cursor.get_mut(), Some(&mut 1));
    }

    #[test]
    #[should_panic]
    fn mutable_deref_end_panics() {
        let mut elements = [1];
        let mut cursor = CursorMut::new(&mut elements, 1);

        *cursor = 5;
    }

    #[test]
    fn debug_shows_position() {
        let elements = [Opaque, Opaque];
        let cursor = Cursor::new(&elements, 1);

        assert_eq!(format!("{cursor:?}"), "Cursor { index: 1, len: 2 }");
    }
}
