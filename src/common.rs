//! Common traits and types that are re-used throughout the crate.

/// A collection with a number of slots.
pub trait Len {
    /// The number of slots; for containers of sets, the number of outer indices.
    fn len(&self) -> usize;
    /// Whether there are no slots at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl<L: Len + ?Sized> Len for &L {
    #[inline(always)] fn len(&self) -> usize { L::len(*self) }
}

/// Positional access whose result keeps the lifetime of the underlying data.
///
/// [`PagesRef`](crate::PagesRef) is `Copy`, and the [`Sets`](crate::Sets) it hands out
/// borrow the backing store rather than the handle, so they may outlive the handle.
/// Out of range positions panic, as slice indexing does.
pub trait Index {
    /// What one slot reads as.
    type Ref;
    fn get(&self, index: usize) -> Self::Ref;
    /// The final slot, unless there are none.
    #[inline(always)] fn last(&self) -> Option<Self::Ref> where Self: Len {
        self.len().checked_sub(1).map(|index| self.get(index))
    }
    /// Visits every slot in order, borrowing `self`.
    #[inline(always)]
    fn index_iter(&self) -> IterOwn<&Self> {
        IterOwn { index: 0, slice: self }
    }
    /// Visits every slot in order, consuming `self`.
    #[inline(always)]
    fn into_index_iter(self) -> IterOwn<Self> where Self: Sized {
        IterOwn { index: 0, slice: self }
    }
}
impl<T: Index + ?Sized> Index for &T {
    type Ref = T::Ref;
    #[inline(always)] fn get(&self, index: usize) -> Self::Ref { T::get(*self, index) }
}

/// Walks the slots `0 .. len` of an [`Index`] implementor.
#[derive(Copy, Clone, Debug)]
pub struct IterOwn<S> {
    index: usize,
    slice: S,
}

impl<S: Index + Len> Iterator for IterOwn<S> {
    type Item = S::Ref;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.slice.len() {
            let result = self.slice.get(self.index);
            self.index += 1;
            Some(result)
        } else {
            None
        }
    }
    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.slice.len() - self.index;
        (remaining, Some(remaining))
    }
}
impl<S: Index + Len> ExactSizeIterator for IterOwn<S> { }

/// Heap memory held, in bytes.
pub trait HeapSize {
    /// Bytes in use and bytes allocated, not counting `self` itself.
    fn heap_size(&self) -> (usize, usize) { (0, 0) }
}

// The words we store own no heap memory of their own.
impl HeapSize for Vec<u32> {
    fn heap_size(&self) -> (usize, usize) {
        let size = std::mem::size_of::<u32>();
        (size * self.len(), size * self.capacity())
    }
}
impl HeapSize for [u32] {
    fn heap_size(&self) -> (usize, usize) {
        let l = std::mem::size_of_val(self);
        (l, l)
    }
}
