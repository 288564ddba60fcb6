//! Read-only views over the records of a [`Pages`](crate::Pages) backing store.
//!
//! A record at address `p` is laid out as
//!
//! ```text
//! [size][extra_0 .. extra_{k-1}][element_0 .. element_{size-1}]
//! ```
//!
//! and occupies `1 + k + size` words. The leading size makes records self-describing,
//! so [`Sets`] can walk from one record to the next with nothing but the backing store.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::errors::{PagesError, Result};
use crate::Len;

/// A view of one stored set: its elements and its extra values.
///
/// The view borrows the backing store and copies nothing.
#[derive(Copy, Clone, Debug)]
pub struct SetRef<'a> {
    address: usize,
    data: &'a [u32],
    extras: usize,
}

impl<'a> SetRef<'a> {
    /// A view of the record starting at `address`.
    ///
    /// Panics on access if `address` is not the start of a record in `data`.
    #[inline(always)]
    pub fn new(address: usize, data: &'a [u32], extras: usize) -> Self {
        Self { address, data, extras }
    }
    /// The position of the record's size word in the backing store.
    #[inline(always)] pub fn address(&self) -> usize { self.address }
    /// The number of elements in the set.
    #[inline(always)] pub fn size(&self) -> usize { self.data[self.address] as usize }
    /// The number of backing store words the record occupies.
    #[inline(always)] pub fn words(&self) -> usize { 1 + self.extras + self.size() }
    /// The elements, in the order they were written.
    #[inline(always)]
    pub fn elements(&self) -> &'a [u32] {
        let lower = self.address + 1 + self.extras;
        &self.data[lower .. lower + self.size()]
    }
    /// All extra values attached to the set.
    #[inline(always)]
    pub fn extras(&self) -> &'a [u32] {
        let lower = self.address + 1;
        &self.data[lower .. lower + self.extras]
    }
    /// The `index`-th extra value, for `index` less than the container's `k`.
    pub fn extra(&self, index: usize) -> Result<u32> {
        self.extras()
            .get(index)
            .copied()
            .ok_or(PagesError::ExtraOutOfRange { index, extras: self.extras })
    }
    /// An iterator over the elements.
    #[inline(always)]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'a, u32>> {
        self.elements().iter().copied()
    }
    /// Copies the set out of the backing store.
    pub fn into_owned(self) -> OwnedSet {
        OwnedSet {
            elements: SmallVec::from_slice(self.elements()),
            extras: SmallVec::from_slice(self.extras()),
        }
    }
}

impl<'a> Len for SetRef<'a> {
    #[inline(always)] fn len(&self) -> usize { self.size() }
}

impl<'a> IntoIterator for SetRef<'a> {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u32>>;
    #[inline(always)] fn into_iter(self) -> Self::IntoIter { self.iter() }
}

// Comparisons look at elements only; extras are compared through `extras()`.
impl<'a> PartialEq<[u32]> for SetRef<'a> {
    fn eq(&self, other: &[u32]) -> bool { self.elements() == other }
}
impl<'a, const N: usize> PartialEq<[u32; N]> for SetRef<'a> {
    fn eq(&self, other: &[u32; N]) -> bool { self.elements() == &other[..] }
}
impl<'a> PartialEq<Vec<u32>> for SetRef<'a> {
    fn eq(&self, other: &Vec<u32>) -> bool { self.elements() == &other[..] }
}

/// A set copied out of a container, along with its extras.
///
/// Small sets stay inline, which matches the typical cut and support sets.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct OwnedSet {
    pub elements: SmallVec<[u32; 8]>,
    pub extras: SmallVec<[u32; 2]>,
}

impl<'a> PartialEq<SetRef<'a>> for OwnedSet {
    fn eq(&self, other: &SetRef<'a>) -> bool {
        &self.elements[..] == other.elements() && &self.extras[..] == other.extras()
    }
}

/// An iterator over the sets stored for one outer index.
///
/// The iterator is identified by the outer index, its position among that index's sets,
/// and the backing store address of the record at that position. A clone captures the
/// current position, so a clone taken up front walks the same sets again.
#[derive(Clone, Debug)]
pub struct Sets<'a> {
    index: usize,
    position: usize,
    count: usize,
    address: usize,
    data: &'a [u32],
    extras: usize,
}

impl<'a> Sets<'a> {
    /// An iterator over `count` records beginning at `address`.
    #[inline(always)]
    pub fn new(index: usize, count: usize, address: usize, data: &'a [u32], extras: usize) -> Self {
        Self { index, position: 0, count, address, data, extras }
    }
    /// The outer index whose sets are being walked.
    #[inline(always)] pub fn index(&self) -> usize { self.index }
    /// The number of sets already produced.
    #[inline(always)] pub fn position(&self) -> usize { self.position }
    /// The backing store address of the next record.
    #[inline(always)] pub fn address(&self) -> usize { self.address }
    /// The next set, without advancing.
    #[inline(always)]
    pub fn peek(&self) -> Option<SetRef<'a>> {
        if self.position < self.count {
            Some(SetRef::new(self.address, self.data, self.extras))
        } else {
            None
        }
    }
}

impl<'a> Iterator for Sets<'a> {
    type Item = SetRef<'a>;
    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let set = self.peek()?;
        self.address += set.words();
        self.position += 1;
        Some(set)
    }
    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.position;
        (remaining, Some(remaining))
    }
}
impl<'a> ExactSizeIterator for Sets<'a> { }
impl<'a> FusedIterator for Sets<'a> { }

/// Iterators over the same outer index are equal when they are at the same position.
impl<'a> PartialEq for Sets<'a> {
    fn eq(&self, other: &Self) -> bool {
        debug_assert_eq!(self.index, other.index, "comparing iterators over different indices");
        self.position == other.position
    }
}
impl<'a> Eq for Sets<'a> { }

#[cfg(test)]
mod test {

    use super::{OwnedSet, SetRef, Sets};
    use crate::PagesError;

    // Two records with k = 1: `A => {0, 2, 3}` and `B => {1, 3}`.
    const A: u32 = 10;
    const B: u32 = 11;
    const DATA: [u32; 9] = [3, A, 0, 2, 3, 2, B, 1, 3];

    #[test]
    fn decode_record() {
        let set = SetRef::new(0, &DATA, 1);
        assert_eq!(set.size(), 3);
        assert_eq!(set.words(), 5);
        assert_eq!(set.elements(), &[0, 2, 3]);
        assert_eq!(set.extras(), &[A]);
        assert_eq!(set.extra(0).unwrap(), A);
        assert!(set == [0, 2, 3]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn extra_out_of_range() {
        let set = SetRef::new(5, &DATA, 1);
        assert!(matches!(set.extra(5), Err(PagesError::ExtraOutOfRange { index: 5, extras: 1 })));
        let set = SetRef::new(0, &DATA[5..], 0);
        assert!(set.extras().is_empty());
        assert!(set.extra(0).is_err());
    }

    #[test]
    fn walk_records() {
        let mut sets = Sets::new(0, 2, 0, &DATA, 1);
        assert_eq!(sets.len(), 2);

        let first = sets.next().unwrap();
        assert_eq!(first.address(), 0);
        assert_eq!(sets.address(), 5);
        assert_eq!(sets.position(), 1);

        let second = sets.next().unwrap();
        assert!(second == vec![1, 3]);
        assert_eq!(second.extra(0).unwrap(), B);

        assert!(sets.next().is_none());
        assert!(sets.next().is_none());
        assert_eq!(sets.address(), DATA.len());
    }

    #[test]
    fn peek_is_side_effect_free() {
        let sets = Sets::new(0, 2, 0, &DATA, 1);
        let a = sets.peek().unwrap();
        let b = sets.peek().unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(sets.position(), 0);
    }

    #[test]
    fn equality_by_position() {
        let start = Sets::new(3, 2, 0, &DATA, 1);
        let mut moved = start.clone();
        assert!(start == moved);
        moved.next();
        assert!(start != moved);
        let mut end = start.clone();
        for _ in end.by_ref() { }
        moved.next();
        assert!(moved == end);
    }

    #[test]
    fn owned_copy() {
        let set = SetRef::new(5, &DATA, 1);
        let owned = set.into_owned();
        assert_eq!(&owned.elements[..], &[1, 3]);
        assert_eq!(&owned.extras[..], &[B]);
        assert!(owned == set);
        assert!(OwnedSet::default() != set);
    }
}
