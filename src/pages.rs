//! A stand-in for `Vec<Vec<(Vec<u32>, [u32; k])>>` with all sets in one buffer.
//!
//! For each outer index we store some number of sets of `u32`, each carrying exactly
//! `k` extra values. Sets are encoded as records in a single backing store, and two
//! index arrays record where each outer index's records begin and how many there are.
//!
//! Storing `[ {A => {0, 2, 3}, B => {1, 3}, C => {2}}, {D => {0, 2}, E => {3, 0, 1}} ]`
//! with `k = 1` produces
//!
//! ```text
//! data:   3 A 0 2 3 2 B 1 3 1 C 2 2 D 0 2 3 E 3 0 1
//! offset: 0 12
//! count:  3 2
//! ```
//!
//! Each outer index is written exactly once, either with one of the `assign_*` methods,
//! or by opening it with [`Pages::append_begin`] and then appending any number of sets.
//! Indices are written in strictly increasing order; gaps are allowed and read as empty.

use tracing::{debug, trace};

use crate::common::{HeapSize, Index, IterOwn, Len};
use crate::errors::{PagesError, Result};
use crate::set::Sets;

/// Offset of an index that has not yet been written.
pub(crate) const UNSET: u32 = u32::MAX;

/// Sets of `u32` grouped by outer index, in one flat backing store.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPages"))]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pages {
    /// Address of the first record of each outer index, or `UNSET`.
    offset: Vec<u32>,
    /// Number of records of each outer index.
    count: Vec<u32>,
    /// Records for all outer indices, back to back.
    data: Vec<u32>,
    /// Extra values per record.
    extras: usize,
    /// The most recently written outer index.
    last: Option<usize>,
    /// Whether `last` still accepts appends.
    appending: bool,
}

impl Pages {
    /// A container for `n` outer indices whose sets each carry `extras` extra values.
    pub fn new(n: usize, extras: usize) -> Self {
        Self::with_capacity(n, extras, 0)
    }

    /// As [`Pages::new`], with room for `words` backing store entries.
    pub fn with_capacity(n: usize, extras: usize, words: usize) -> Self {
        debug!(slots = n, extras, words, "creating paged sets");
        Self {
            offset: vec![UNSET; n],
            count: vec![0; n],
            data: Vec::with_capacity(words),
            extras,
            last: None,
            appending: false,
        }
    }

    /// A read-only handle over the container's contents.
    #[inline(always)]
    pub fn borrow(&self) -> PagesRef<'_> {
        PagesRef {
            offset: &self.offset,
            count: &self.count,
            data: &self.data,
            extras: self.extras,
        }
    }

    /// The number of sets stored for `index`, zero if it is not yet written.
    pub fn count(&self, index: usize) -> Result<usize> { self.borrow().count(index) }
    /// The sets stored for `index`, in the order they were written.
    pub fn sets(&self, index: usize) -> Result<Sets<'_>> { self.borrow().sets(index) }
    /// The number of outer indices, `n`.
    ///
    /// This is not the total number of sets; sum `count` over the indices for that.
    #[inline(always)] pub fn sets_count(&self) -> usize { self.offset.len() }
    /// The number of extra values attached to each set, `k`.
    #[inline(always)] pub fn extras(&self) -> usize { self.extras }
    /// Words held across the offsets, the counts, and the backing store.
    #[inline(always)] pub fn memory(&self) -> usize { self.borrow().memory() }
    /// Whether `index` has been assigned or opened for appends.
    pub fn is_initialized(&self, index: usize) -> bool {
        self.offset.get(index).is_some_and(|o| *o != UNSET)
    }

    /// Writes no sets for `index`.
    ///
    /// The `extra` values are not stored, but must still number exactly `k`.
    pub fn assign_empty(&mut self, index: usize, extra: &[u32]) -> Result<()> {
        self.check_extra(extra)?;
        let offset = self.check_open(index)?;
        self.open(index, offset, false);
        Ok(())
    }

    /// Writes the single set `{value}` for `index`.
    pub fn assign_singleton(&mut self, index: usize, value: u32, extra: &[u32]) -> Result<()> {
        self.check_extra(extra)?;
        let offset = self.check_open(index)?;
        self.push_record(std::slice::from_ref(&value), extra)?;
        self.open(index, offset, false);
        self.count[index] = 1;
        Ok(())
    }

    /// Opens `index` for a sequence of `append_*` calls.
    ///
    /// The index stays open until another index is written.
    pub fn append_begin(&mut self, index: usize) -> Result<()> {
        let offset = self.check_open(index)?;
        self.open(index, offset, true);
        Ok(())
    }

    /// Appends the set `{value}` to the open `index`.
    pub fn append_singleton(&mut self, index: usize, value: u32, extra: &[u32]) -> Result<()> {
        self.append_set(index, std::slice::from_ref(&value), extra)
    }

    /// Appends the set `values` to the open `index`.
    ///
    /// Elements are stored in the order given; duplicates are not removed.
    pub fn append_set(&mut self, index: usize, values: &[u32], extra: &[u32]) -> Result<()> {
        self.check_index(index)?;
        self.check_extra(extra)?;
        if !self.appending || self.last != Some(index) {
            debug!(index, last = ?self.last, "append to an index that is not open");
            return Err(PagesError::NotOpen { index });
        }
        self.push_record(values, extra)?;
        self.count[index] += 1;
        Ok(())
    }

    /// The backing store, for callers that walk records directly.
    #[inline(always)] pub fn data(&self) -> &[u32] { &self.data }
    /// Record addresses per outer index; unwritten indices hold `u32::MAX`.
    #[inline(always)] pub fn offsets(&self) -> &[u32] { &self.offset }
    /// Set counts per outer index.
    #[inline(always)] pub fn counts(&self) -> &[u32] { &self.count }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.offset.len() {
            Ok(())
        } else {
            debug!(index, slots = self.offset.len(), "index out of range");
            Err(PagesError::IndexOutOfRange { index, len: self.offset.len() })
        }
    }

    fn check_extra(&self, extra: &[u32]) -> Result<()> {
        if extra.len() == self.extras {
            Ok(())
        } else {
            debug!(expected = self.extras, found = extra.len(), "wrong number of extra values");
            Err(PagesError::ExtraLength { expected: self.extras, found: extra.len() })
        }
    }

    /// Validates that `index` may be written next, and returns its offset.
    fn check_open(&self, index: usize) -> Result<u32> {
        self.check_index(index)?;
        if self.offset[index] != UNSET {
            debug!(index, "index written twice");
            return Err(PagesError::AlreadyFinalized { index });
        }
        if let Some(last) = self.last {
            if index <= last {
                debug!(index, last, "index written out of order");
                return Err(PagesError::OutOfOrder { index, last });
            }
        }
        next_offset(self.data.len())
    }

    /// Records `index` as written at `offset`; call only after `check_open` succeeds.
    fn open(&mut self, index: usize, offset: u32, appending: bool) {
        trace!(index, offset, appending, "opening index");
        self.offset[index] = offset;
        self.count[index] = 0;
        self.last = Some(index);
        self.appending = appending;
    }

    /// Encodes one record at the end of the backing store.
    ///
    /// Either the whole record is written or, on error, nothing is. `Alloc` errors
    /// only arise when the allocator refuses to grow the store.
    fn push_record(&mut self, values: &[u32], extra: &[u32]) -> Result<()> {
        let (size, words) = record_words(self.data.len(), self.extras, values.len())?;
        self.data.try_reserve(words)?;
        self.data.push(size);
        self.data.extend_from_slice(extra);
        self.data.extend_from_slice(values);
        Ok(())
    }
}

/// The offset at which a store of `len` words would open its next index.
///
/// `UNSET` itself is reserved to mark unwritten indices.
fn next_offset(len: usize) -> Result<u32> {
    match u32::try_from(len) {
        Ok(offset) if offset != UNSET => Ok(offset),
        _ => Err(PagesError::Overflow),
    }
}

/// The size word and total word count of a record with `size` elements, appended to a
/// store of `len` words.
fn record_words(len: usize, extras: usize, size: usize) -> Result<(u32, usize)> {
    let encoded = u32::try_from(size).map_err(|_| PagesError::Overflow)?;
    let words = extras
        .checked_add(size)
        .and_then(|w| w.checked_add(1))
        .ok_or(PagesError::Overflow)?;
    match len.checked_add(words) {
        Some(total) if total <= UNSET as usize => Ok((encoded, words)),
        _ => Err(PagesError::Overflow),
    }
}

/// Walks every record of `view`, so that later reads cannot run off the end of the store.
///
/// Offsets and counts must have one entry per index, written indices must start no
/// earlier than the records of the index before them, and every record must end within
/// the store. Returns the highest written index and the address just past its records.
pub(crate) fn validate(view: &PagesRef<'_>) -> Result<Option<(usize, usize)>> {
    if view.offset.len() != view.count.len() {
        return Err(PagesError::decode(format!(
            "{} offsets but {} counts",
            view.offset.len(),
            view.count.len()
        )));
    }
    let mut tail = None;
    let mut floor = 0;
    for (index, (&offset, &count)) in view.offset.iter().zip(view.count.iter()).enumerate() {
        if offset == UNSET {
            if count != 0 {
                return Err(PagesError::decode(format!("index {index} has sets but no offset")));
            }
            continue;
        }
        let mut address = offset as usize;
        if address < floor || address > view.data.len() {
            return Err(PagesError::decode(format!("index {index}: offset {address} out of place")));
        }
        for _ in 0 .. count {
            let size = *view.data.get(address).ok_or_else(|| {
                PagesError::decode(format!("index {index}: record at {address} out of bounds"))
            })?;
            address = view.extras
                .checked_add(size as usize + 1)
                .and_then(|words| address.checked_add(words))
                .filter(|end| *end <= view.data.len())
                .ok_or_else(|| PagesError::decode(format!("index {index}: record at {address} overruns data")))?;
        }
        floor = address;
        tail = Some((index, address));
    }
    Ok(tail)
}

/// The serialized form of [`Pages`], checked before it is accepted.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPages {
    offset: Vec<u32>,
    count: Vec<u32>,
    data: Vec<u32>,
    extras: usize,
    last: Option<usize>,
    appending: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPages> for Pages {
    type Error = PagesError;
    fn try_from(raw: RawPages) -> Result<Self> {
        let pages = Pages {
            offset: raw.offset,
            count: raw.count,
            data: raw.data,
            extras: raw.extras,
            last: raw.last,
            appending: raw.appending,
        };
        let tail = validate(&pages.borrow())?;
        if pages.last != tail.map(|(index, _)| index) {
            return Err(PagesError::decode(format!(
                "last written index {:?} disagrees with offsets",
                pages.last
            )));
        }
        // Appends land at the end of the store, right after the open index's records.
        if pages.appending && tail.map(|(_, end)| end) != Some(pages.data.len()) {
            return Err(PagesError::decode("open index does not end the store"));
        }
        Ok(pages)
    }
}

impl Len for Pages {
    #[inline(always)] fn len(&self) -> usize { self.sets_count() }
}

impl HeapSize for Pages {
    fn heap_size(&self) -> (usize, usize) {
        let (l0, c0) = self.offset.heap_size();
        let (l1, c1) = self.count.heap_size();
        let (l2, c2) = self.data.heap_size();
        (l0 + l1 + l2, c0 + c1 + c2)
    }
}

/// A read-only handle over the contents of a [`Pages`].
///
/// Nothing can be written while a handle exists, so the sets it yields stay valid.
/// Handles are also produced by [`FromBytes`](crate::bytes::FromBytes) from borrowed bytes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PagesRef<'a> {
    pub(crate) offset: &'a [u32],
    pub(crate) count: &'a [u32],
    pub(crate) data: &'a [u32],
    pub(crate) extras: usize,
}

impl<'a> PagesRef<'a> {
    /// The number of sets stored for `index`, zero if it is not yet written.
    pub fn count(&self, index: usize) -> Result<usize> {
        self.count
            .get(index)
            .map(|c| *c as usize)
            .ok_or(PagesError::IndexOutOfRange { index, len: self.count.len() })
    }
    /// The sets stored for `index`, in the order they were written.
    pub fn sets(&self, index: usize) -> Result<Sets<'a>> {
        if index < self.offset.len() {
            Ok(self.get(index))
        } else {
            Err(PagesError::IndexOutOfRange { index, len: self.offset.len() })
        }
    }
    /// The number of outer indices, `n`.
    #[inline(always)] pub fn sets_count(&self) -> usize { self.offset.len() }
    /// The number of extra values attached to each set, `k`.
    #[inline(always)] pub fn extras(&self) -> usize { self.extras }
    /// Words held across the offsets, the counts, and the backing store.
    #[inline(always)]
    pub fn memory(&self) -> usize {
        self.offset.len() + self.count.len() + self.data.len()
    }
    /// The backing store.
    #[inline(always)] pub fn data(&self) -> &'a [u32] { self.data }
    /// Record addresses per outer index; unwritten indices hold `u32::MAX`.
    #[inline(always)] pub fn offsets(&self) -> &'a [u32] { self.offset }
    /// Set counts per outer index.
    #[inline(always)] pub fn counts(&self) -> &'a [u32] { self.count }
}

impl<'a> Len for PagesRef<'a> {
    #[inline(always)] fn len(&self) -> usize { self.offset.len() }
}

impl<'a> Index for PagesRef<'a> {
    type Ref = Sets<'a>;
    #[inline(always)]
    fn get(&self, index: usize) -> Self::Ref {
        let count = self.count[index] as usize;
        // Unwritten indices have no records; point them at the end of the store.
        let address = if count == 0 { self.data.len() } else { self.offset[index] as usize };
        Sets::new(index, count, address, self.data, self.extras)
    }
}

impl<'a> IntoIterator for PagesRef<'a> {
    type Item = Sets<'a>;
    type IntoIter = IterOwn<PagesRef<'a>>;
    #[inline(always)] fn into_iter(self) -> Self::IntoIter { self.into_index_iter() }
}

impl<'a> HeapSize for PagesRef<'a> {
    fn heap_size(&self) -> (usize, usize) {
        let (l0, c0) = self.offset.heap_size();
        let (l1, c1) = self.count.heap_size();
        let (l2, c2) = self.data.heap_size();
        (l0 + l1 + l2, c0 + c1 + c2)
    }
}
