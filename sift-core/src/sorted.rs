//! Ordered Collections
//!
//! Posting lists and gram word-sets are both "sorted sequences with optional
//! uniqueness". They live in a contiguous `Vec` kept in ascending order, so
//! lookups are binary searches and set operations are linear two-pointer
//! walks.
//!
//! ## Layout
//!
//! ```text
//! SortedVec:        [a][c][f][k][q]      always ascending
//! UnorderedBuffer:  [q][a][q][f][c]...   append-only, sorted once on drain
//! ```
//!
//! The buffer is the bulk-loading path: append in any order, pay a single
//! `O(m log m)` sort when converting into a `SortedVec`. The sorted invariant
//! of `SortedVec` itself is never relaxed.

use core::cmp::Ordering;

/// What `insert_ordered` does when an equal element is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDuplicate {
    /// Leave the existing element untouched.
    #[default]
    Skip,
    /// Overwrite the existing element in place.
    Replace,
    /// Store the new element after the run of equal elements.
    Keep,
}

/// Result of an early-exit linear scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// The element sits at this index.
    Found(usize),
    /// Scanning stopped at this index, the first strictly greater element.
    Stopped(usize),
    /// Every element was smaller.
    Exhausted,
}

/// Ascending sequence backed by a `Vec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedVec<T> {
    items: Vec<T>,
}

impl<T> Default for SortedVec<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> SortedVec<T> {
    /// Creates an empty sequence.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates an empty sequence with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Lazily yields the first `n` elements, or all of them for `None`.
    ///
    /// Nothing is copied; a huge collection costs only what is consumed.
    #[inline]
    pub fn bounded(&self, n: Option<usize>) -> core::iter::Take<core::slice::Iter<'_, T>> {
        self.items.iter().take(n.unwrap_or(usize::MAX))
    }

    /// Binary search with a caller-provided comparator, as in
    /// [`slice::binary_search_by`].
    #[inline]
    pub fn search_by<F>(&self, f: F) -> Result<usize, usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.items.binary_search_by(f)
    }

    /// Mutable access for updating non-key fields.
    ///
    /// Callers must not change anything that participates in `Ord`.
    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Ord> SortedVec<T> {
    /// Wraps a vector that is already strictly ascending.
    ///
    /// Debug builds assert the invariant; release builds trust the caller.
    pub(crate) fn from_sorted(items: Vec<T>) -> Self {
        debug_assert!(
            items.windows(2).all(|w| w[0] < w[1]),
            "from_sorted: input not strictly ascending"
        );
        Self { items }
    }

    /// Builds a unique sequence from arbitrary input by sorting and deduplicating.
    pub fn from_vec(mut items: Vec<T>) -> Self {
        items.sort_unstable();
        items.dedup();
        Self { items }
    }

    /// Inserts while preserving order.
    ///
    /// Returns `true` if the sequence changed.
    pub fn insert_ordered(&mut self, elem: T, on_duplicate: OnDuplicate) -> bool {
        // Appending in ascending order is the common case during builds.
        match self.items.last() {
            None => {
                self.items.push(elem);
                return true;
            }
            Some(last) if *last < elem => {
                self.items.push(elem);
                return true;
            }
            _ => {}
        }

        match self.items.binary_search(&elem) {
            Ok(i) => match on_duplicate {
                OnDuplicate::Skip => false,
                OnDuplicate::Replace => {
                    self.items[i] = elem;
                    true
                }
                OnDuplicate::Keep => {
                    let mut end = i + 1;
                    while end < self.items.len() && self.items[end] == elem {
                        end += 1;
                    }
                    self.items.insert(end, elem);
                    true
                }
            },
            Err(i) => {
                self.items.insert(i, elem);
                true
            }
        }
    }

    /// Inserts unless an equal element exists.
    #[inline]
    pub fn insert(&mut self, elem: T) -> bool {
        self.insert_ordered(elem, OnDuplicate::Skip)
    }

    /// Inserts at a position obtained from [`SortedVec::search_by`].
    pub(crate) fn insert_at(&mut self, index: usize, elem: T) {
        debug_assert!(index == 0 || self.items[index - 1] < elem);
        debug_assert!(index == self.items.len() || elem < self.items[index]);
        self.items.insert(index, elem);
    }

    #[inline]
    pub fn contains(&self, elem: &T) -> bool {
        self.items.binary_search(elem).is_ok()
    }

    #[inline]
    pub fn position(&self, elem: &T) -> Option<usize> {
        self.items.binary_search(elem).ok()
    }

    /// Front-to-back scan that gives up at the first element greater than `elem`.
    pub fn scan(&self, elem: &T) -> Scan {
        for (i, item) in self.items.iter().enumerate() {
            match item.cmp(elem) {
                Ordering::Equal => return Scan::Found(i),
                Ordering::Greater => return Scan::Stopped(i),
                Ordering::Less => {}
            }
        }
        Scan::Exhausted
    }

    /// Elements present in both sequences.
    pub fn intersect(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        Self {
            items: intersect_sorted(&self.items, &other.items),
        }
    }

    /// Elements present in either sequence, equal elements collapsed.
    pub fn union(&self, other: &Self) -> Self
    where
        T: Clone,
    {
        let mut items = Vec::with_capacity(self.items.len() + other.items.len());
        merge_sorted_dedup(&self.items, &other.items, &mut items);
        Self { items }
    }

    /// Merges an ascending, duplicate-free run into this sequence.
    pub(crate) fn merge_from(&mut self, run: Vec<T>)
    where
        T: Clone,
    {
        if run.is_empty() {
            return;
        }
        if self.items.is_empty() {
            *self = Self::from_sorted(run);
            return;
        }
        let mut merged = Vec::with_capacity(self.items.len() + run.len());
        merge_sorted_dedup(&self.items, &run, &mut merged);
        self.items = merged;
    }
}

impl<T: Ord> FromIterator<T> for SortedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a SortedVec<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Append-only staging area for elements that will be sorted later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnorderedBuffer<T> {
    items: Vec<T>,
}

impl<T> Default for UnorderedBuffer<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Ord> UnorderedBuffer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn push(&mut self, elem: T) {
        self.items.push(elem);
    }

    /// Bulk append without any order or uniqueness check.
    pub fn extend_unordered<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sorts and deduplicates the pending elements, leaving the buffer empty.
    pub fn drain_sorted(&mut self) -> Vec<T> {
        let mut items = core::mem::take(&mut self.items);
        items.sort_unstable();
        items.dedup();
        items
    }

    pub fn into_sorted(mut self) -> SortedVec<T> {
        SortedVec::from_sorted(self.drain_sorted())
    }
}

/// Two-pointer intersection of ascending slices, `O(n + m)`.
pub fn intersect_sorted<T: Ord + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let mut ai = 0usize;
    let mut bi = 0usize;

    while ai < a.len() && bi < b.len() {
        match a[ai].cmp(&b[bi]) {
            Ordering::Less => ai += 1,
            Ordering::Greater => bi += 1,
            Ordering::Equal => {
                out.push(a[ai].clone());
                ai += 1;
                bi += 1;
            }
        }
    }

    out
}

/// Two-pointer union of ascending slices into `out`; equal heads are emitted once.
pub fn merge_sorted_dedup<T: Ord + Clone>(a: &[T], b: &[T], out: &mut Vec<T>) {
    let mut ai = 0usize;
    let mut bi = 0usize;

    while ai < a.len() && bi < b.len() {
        match a[ai].cmp(&b[bi]) {
            Ordering::Less => {
                out.push(a[ai].clone());
                ai += 1;
            }
            Ordering::Greater => {
                out.push(b[bi].clone());
                bi += 1;
            }
            Ordering::Equal => {
                out.push(a[ai].clone());
                ai += 1;
                bi += 1;
            }
        }
    }

    out.extend_from_slice(&a[ai..]);
    out.extend_from_slice(&b[bi..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(items: &[u32]) -> SortedVec<u32> {
        SortedVec::from_vec(items.to_vec())
    }

    #[test]
    fn insert_keeps_order() {
        let mut s = SortedVec::new();
        for x in [5u32, 1, 9, 3, 7] {
            assert!(s.insert(x));
        }
        assert_eq!(s.as_slice(), &[1, 3, 5, 7, 9]);
    }

    #[test]
    fn duplicate_policies() {
        let mut s = set(&[1, 2, 3]);
        assert!(!s.insert_ordered(2, OnDuplicate::Skip));
        assert_eq!(s.len(), 3);

        assert!(s.insert_ordered(2, OnDuplicate::Replace));
        assert_eq!(s.len(), 3);

        assert!(s.insert_ordered(2, OnDuplicate::Keep));
        assert!(s.insert_ordered(2, OnDuplicate::Keep));
        assert_eq!(s.as_slice(), &[1, 2, 2, 2, 3]);
    }

    #[test]
    fn replace_overwrites_equal_element() {
        #[derive(Debug, Clone, PartialEq, Eq)]
        struct Keyed(u32, &'static str);
        impl PartialOrd for Keyed {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for Keyed {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }

        let mut s = SortedVec::new();
        s.insert(Keyed(1, "old"));
        s.insert_ordered(Keyed(1, "new"), OnDuplicate::Replace);
        assert_eq!(s.get(0).map(|k| k.1), Some("new"));
    }

    #[test]
    fn scan_hits() {
        let s = set(&[1, 2, 128]);
        assert_eq!(s.scan(&1), Scan::Found(0));
        assert_eq!(s.scan(&2), Scan::Found(1));
        assert_eq!(s.scan(&128), Scan::Found(2));
    }

    #[test]
    fn scan_stops_early() {
        let s = set(&[2, 10, 128]);
        assert_eq!(s.scan(&1), Scan::Stopped(0));
        assert_eq!(s.scan(&11), Scan::Stopped(2));
        assert_eq!(s.scan(&129), Scan::Exhausted);
    }

    #[test]
    fn empty_collection_never_fails() {
        let s: SortedVec<u32> = SortedVec::new();
        assert_eq!(s.scan(&1), Scan::Exhausted);
        assert!(!s.contains(&1));
        assert!(s.intersect(&set(&[1])).is_empty());
        assert_eq!(s.bounded(Some(3)).count(), 0);
    }

    #[test]
    fn bounded_slice() {
        let s = set(&[1, 2, 3, 4, 5]);
        assert_eq!(s.bounded(Some(2)).copied().collect::<Vec<_>>(), [1, 2]);
        assert_eq!(s.bounded(Some(50)).count(), 5);
        assert_eq!(s.bounded(None).count(), 5);
        assert_eq!(s.bounded(Some(0)).count(), 0);
    }

    #[test]
    fn union_collapses_duplicates() {
        let u = set(&[1, 3, 5]).union(&set(&[2, 3, 6]));
        assert_eq!(u.as_slice(), &[1, 2, 3, 5, 6]);
    }

    #[test]
    fn merge_from_into_populated_set() {
        let mut s = set(&[2, 4]);
        s.merge_from(vec![1, 4, 9]);
        assert_eq!(s.as_slice(), &[1, 2, 4, 9]);

        let mut empty = SortedVec::new();
        empty.merge_from(vec![3, 7]);
        assert_eq!(empty.as_slice(), &[3, 7]);
    }

    #[test]
    fn buffer_sorts_once() {
        let mut buf = UnorderedBuffer::new();
        buf.extend_unordered(["the", "rather", "the", "this"]);
        buf.push("and");
        assert_eq!(buf.len(), 5);
        let sorted = buf.into_sorted();
        assert_eq!(sorted.as_slice(), &["and", "rather", "the", "this"]);
    }

    #[test]
    fn search_by_key() {
        let s = set(&[10, 20, 30]);
        assert_eq!(s.search_by(|x| x.cmp(&20)), Ok(1));
        assert_eq!(s.search_by(|x| x.cmp(&25)), Err(2));
    }

    proptest! {
        #[test]
        fn intersect_matches_brute_force(
            a in prop::collection::vec(0u32..200, 0..80),
            b in prop::collection::vec(0u32..200, 0..80),
        ) {
            let mut expected: Vec<u32> = a.iter().copied().filter(|x| b.contains(x)).collect();
            expected.sort_unstable();
            expected.dedup();

            let got = SortedVec::from_vec(a).intersect(&SortedVec::from_vec(b));
            prop_assert_eq!(got.into_vec(), expected);
        }

        #[test]
        fn inserts_stay_strictly_ascending(xs in prop::collection::vec(0u32..500, 0..200)) {
            let mut s = SortedVec::new();
            for x in &xs {
                s.insert(*x);
            }
            prop_assert!(s.as_slice().windows(2).all(|w| w[0] < w[1]));
            for x in &xs {
                prop_assert!(s.contains(x));
            }
        }
    }
}
