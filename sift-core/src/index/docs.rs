//! Document store.

use std::collections::BTreeMap;

use sift_types::{DocId, Document};

/// Documents keyed by id, iterated in ascending id order.
#[derive(Debug, Default, Clone)]
pub struct DocStore {
    docs: BTreeMap<DocId, Document>,
}

impl DocStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document unless its id is already present.
    ///
    /// Returns `false` and drops `doc` on a duplicate id.
    pub fn insert(&mut self, doc: Document) -> bool {
        match self.docs.entry(doc.id().clone()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(doc);
                true
            }
        }
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> + '_ {
        self.docs.values()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &DocId> + '_ {
        self.docs.keys()
    }

    pub fn clear(&mut self) {
        self.docs.clear();
    }
}
