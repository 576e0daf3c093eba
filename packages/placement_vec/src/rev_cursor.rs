use std::cmp::Reverse;
use std::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign};

use crate::cursor::{backward, distance, forward, impl_position_ordering, not_dereferenceable};
use crate::{Cursor, CursorMut};

/// A read-only position in a [`PlacementVec`][crate::PlacementVec], moving back to front.
///
/// Advancing a reverse cursor (`+= 1`) moves it towards the first element. Ordering follows the
/// traversal direction, so a reverse cursor closer to the back of the container compares less
/// than one closer to the front.
///
/// A reverse cursor wraps a forward position called its [base][Self::base] and points at the
/// element just before it. [`rbegin()`][1] has the container's length as its base and points at
/// the last element. [`rend()`][2] has base 0 and points "before the first element", which is
/// not dereferenceable.
///
/// # Examples
///
/// ```
/// use placement_vec::PlacementVec;
///
/// let items = PlacementVec::from([1, 2, 3]);
///
/// let mut visited = Vec::new();
/// let mut cursor = items.rbegin();
/// while cursor != items.rend() {
///     visited.push(*cursor);
///     cursor += 1;
/// }
///
/// assert_eq!(visited, [3, 2, 1]);
/// assert!(items.rbegin() < items.rend());
/// ```
///
/// [1]: crate::PlacementVec::rbegin
/// [2]: crate::PlacementVec::rend
pub struct RevCursor<'a, T> {
    elements: &'a [T],
    base: usize,
}

impl<'a, T> RevCursor<'a, T> {
    #[must_use]
    pub(crate) fn new(elements: &'a [T], base: usize) -> Self {
        Self { elements, base }
    }

    /// The forward position one past the element this cursor points at.
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// The forward cursor at [`base()`][Self::base].
    #[must_use]
    pub fn to_forward(&self) -> Cursor<'a, T> {
        Cursor::new(self.elements, self.base)
    }

    /// The element this cursor points at, or `None` if the cursor is at the reverse end.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.base
            .checked_sub(1)
            .and_then(|index| self.elements.get(index))
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
            .unwrap_or_else(|| not_reverse_dereferenceable::<T>(self.base, self.elements.len()))
    }

    fn order_key(&self) -> Reverse<usize> {
        Reverse(self.base)
    }
}

impl<T> Clone for RevCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RevCursor<'_, T> {}

impl<T> Deref for RevCursor<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.into_ref()
    }
}

impl<T> Index<usize> for RevCursor<'_, T> {
    type Output = T;

    fn index(&self, offset: usize) -> &Self::Output {
        (*self + offset).into_ref()
    }
}

impl<T> Add<usize> for RevCursor<'_, T> {
    type Output = Self;

    fn add(mut self, offset: usize) -> Self::Output {
        self += offset;
        self
    }
}

impl<T> Sub<usize> for RevCursor<'_, T> {
    type Output = Self;

    fn sub(mut self, offset: usize) -> Self::Output {
        self -= offset;
        self
    }
}

impl<T> AddAssign<usize> for RevCursor<'_, T> {
    fn add_assign(&mut self, offset: usize) {
        self.base = backward(self.base, offset);
    }
}

impl<T> SubAssign<usize> for RevCursor<'_, T> {
    fn sub_assign(&mut self, offset: usize) {
        self.base = forward(self.base, offset);
    }
}

/// The signed distance from `other` to `self` in traversal order.
impl<T> Sub for RevCursor<'_, T> {
    type Output = isize;

    fn sub(self, other: Self) -> Self::Output {
        distance(self.base, other.base)
    }
}

impl<T> std::fmt::Debug for RevCursor<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevCursor")
            .field("base", &self.base)
            .field("len", &self.elements.len())
            .finish()
    }
}

/// A position in a [`PlacementVec`][crate::PlacementVec] that grants exclusive access to its
/// element, moving back to front.
///
/// This is the mutable counterpart of [`RevCursor`].
///
/// # Examples
///
/// ```
/// use placement_vec::PlacementVec;
///
/// let mut items = PlacementVec::from([1, 2, 3]);
///
/// let mut cursor = items.rbegin_mut();
/// *cursor = 30;
/// cursor += 2;
/// *cursor = 10;
///
/// assert_eq!(items.as_slice(), [10, 2, 30]);
/// ```
pub struct RevCursorMut<'a, T> {
    elements: &'a mut [T],
    base: usize,
}

impl<'a, T> RevCursorMut<'a, T> {
    #[must_use]
    pub(crate) fn new(elements: &'a mut [T], base: usize) -> Self {
        Self { elements, base }
    }

    /// The forward position one past the element this cursor points at.
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// The element this cursor points at, or `None` if the cursor is at the reverse end.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.base
            .checked_sub(1)
            .and_then(|index| self.elements.get(index))
    }

    /// The element this cursor points at, or `None` if the cursor is at the reverse end.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        let index = self.base.checked_sub(1)?;
        self.elements.get_mut(index)
    }

    /// A read-only reverse cursor at the same position, borrowing from this one.
    #[must_use]
    pub fn as_cursor(&self) -> RevCursor<'_, T> {
        RevCursor::new(self.elements, self.base)
    }

    /// The mutable forward cursor at [`base()`][Self::base].
    #[must_use]
    pub fn into_forward(self) -> CursorMut<'a, T> {
        CursorMut::new(self.elements, self.base)
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
        let base = self.base;
        let elements = self.elements;

        let Some(index) = base.checked_sub(1) else {
            not_reverse_dereferenceable::<T>(base, len)
        };

        elements
            .get_mut(index)
            .unwrap_or_else(|| not_reverse_dereferenceable::<T>(base, len))
    }

    fn order_key(&self) -> Reverse<usize> {
        Reverse(self.base)
    }
}

impl<T> Deref for RevCursorMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
            .unwrap_or_else(|| not_reverse_dereferenceable::<T>(self.base, self.elements.len()))
    }
}

impl<T> DerefMut for RevCursorMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        let len = self.elements.len();
        let base = self.base;

        self.get_mut()
            .unwrap_or_else(|| not_reverse_dereferenceable::<T>(base, len))
    }
}

impl<T> Index<usize> for RevCursorMut<'_, T> {
    type Output = T;

    fn index(&self, offset: usize) -> &Self::Output {
        let len = self.elements.len();
        let base = backward(self.base, offset);

        base.checked_sub(1)
            .and_then(|index| self.elements.get(index))
            .unwrap_or_else(|| not_reverse_dereferenceable::<T>(base, len))
    }
}

impl<T> IndexMut<usize> for RevCursorMut<'_, T> {
    fn index_mut(&mut self, offset: usize) -> &mut Self::Output {
        let len = self.elements.len();
        let base = backward(self.base, offset);

        let Some(index) = base.checked_sub(1) else {
            not_reverse_dereferenceable::<T>(base, len)
        };

        self.elements
            .get_mut(index)
            .unwrap_or_else(|| not_reverse_dereferenceable::<T>(base, len))
    }
}

impl<T> Add<usize> for RevCursorMut<'_, T> {
    type Output = Self;

    fn add(mut self, offset: usize) -> Self::Output {
        self += offset;
        self
    }
}

impl<T> Sub<usize> for RevCursorMut<'_, T> {
    type Output = Self;

    fn sub(mut self, offset: usize) -> Self::Output {
        self -= offset;
        self
    }
}

impl<T> AddAssign<usize> for RevCursorMut<'_, T> {
    fn add_assign(&mut self, offset: usize) {
        self.base = backward(self.base, offset);
    }
}

impl<T> SubAssign<usize> for RevCursorMut<'_, T> {
    fn sub_assign(&mut self, offset: usize) {
        self.base = forward(self.base, offset);
    }
}

impl<T> std::fmt::Debug for RevCursorMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevCursorMut")
            .field("base", &self.base)
            .field("len", &self.elements.len())
            .finish()
    }
}

impl_position_ordering!(RevCursor);
impl_position_ordering!(RevCursorMut);

#[cold]
fn not_reverse_dereferenceable<T>(base: usize, len: usize) -> ! {
    match base.checked_sub(1) {
        Some(index) => not_dereferenceable::<T>(index, len),
        None => panic!(
            "reverse cursor at the reverse end does not point at an element in a sequence of {len} {}",
            std::any::type_name::<T>()
        ),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(RevCursor<'static, u32>: Copy, Debug, Ord, Send, Sync);
    assert_impl_all!(RevCursorMut<'static, u32>: Debug, Ord, Send, Sync);

    #[test]
    fn traverses_back_to_front() {
        let elements = [1, 2, 3, 4];
        let rbegin = RevCursor::new(&elements, 4);
        let rend = RevCursor::new(&elements, 0);

        let mut visited = Vec::new();
        let mut cursor = rbegin;
        while cursor != rend {
            visited.push(*cursor);
            cursor += 1;
        }

        assert_eq!(visited, [4, 3, 2, 1]);
    }

    #[test]
    fn ordering_follows_traversal() {
        let elements = [1, 2, 3];
        let rbegin = RevCursor::new(&elements, 3);
        let rend = RevCursor::new(&elements, 0);

        assert!(rbegin < rend);
        assert!(rend > rbegin);
        assert!(rbegin + 1 < rbegin + 2);
        assert_eq!(rend - rbegin, 3);
        assert_eq!(rbegin - rend, -3);
    }

    #[test]
    fn subscript_is_relative_in_traversal_order() {
        let elements = [1, 2, 3];
        let rbegin = RevCursor::new(&elements, 3);

        assert_eq!(rbegin[0], 3);
        assert_eq!(rbegin[2], 1);
        assert_eq!(*(rbegin + 2 - 1), 2);
    }

    #[test]
    fn base_maps_to_forward_position() {
        let elements = [1, 2, 3];
        let cursor = RevCursor::new(&elements, 2);

        assert_eq!(*cursor, 2);
        assert_eq!(cursor.base(), 2);
        assert_eq!(*cursor.to_forward(), 3);
    }

    #[test]
    fn rend_is_not_dereferenceable() {
        let elements = [1];
        let rend = RevCursor::new(&elements, 0);

        assert!(rend.get().is_none());
    }

    #[test]
    #[should_panic]
    fn deref_rend_panics() {
        let elements = [1];
        let rend = RevCursor::new(&elements, 0);

        let _value: i32 = *rend;
    }

    #[test]
    #[should_panic]
    fn advance_past_rend_panics() {
        let elements = [1];
        let rend = RevCursor::new(&elements, 0);

        _ = rend + 1;
    }

    #[test]
    fn mutable_reverse_cursor_writes_through() {
        let mut elements = [1, 2, 3];

        {
            let mut cursor = RevCursorMut::new(&mut elements, 3);
            *cursor += 10;
            cursor[1] = 20;
            assert_eq!(*cursor.as_cursor(), 13);

            cursor += 2;
            assert_eq!(cursor.get(), Some(&1));
            *cursor.get_mut().unwrap() = 100;

            let forward = cursor.into_forward();
            assert_eq!(forward.index(), 1);
            assert_eq!(*forward, 20);
        }

        assert_eq!(elements, [100, 20, 13]);
    }

    #[test]
    fn mutable_reverse_cursor_into_mut() {
        let mut elements = [1, 2];

        let cursor = RevCursorMut::new(&mut elements, 2) + 1;
        *cursor.into_mut() = 5;

        assert_eq!(elements, [5, 2]);
    }

    #[test]
    #[should_panic]
    fn mutable_deref_rend_panics() {
        let mut elements = [1];
        let mut cursor = RevCursorMut::new(&mut elements, 0);

        *cursor = 7;
    }
}
