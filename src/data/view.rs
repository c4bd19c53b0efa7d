use std::borrow::Cow;

use super::model::{Record, RecordStore};

// ---------------------------------------------------------------------------
// View – an ordered selection of store rows
// ---------------------------------------------------------------------------

/// Ordered subsequence of a [`RecordStore`], addressed by row index.
///
/// Both the full store and a filtered view are represented as a `View`, so
/// every aggregation accepts either.
#[derive(Debug, Clone)]
pub struct View<'a> {
    store: &'a RecordStore,
    indices: Cow<'a, [usize]>,
}

impl<'a> View<'a> {
    /// Every record of the store, in load order.
    pub fn full(store: &'a RecordStore) -> Self {
        View {
            store,
            indices: Cow::Owned((0..store.len()).collect()),
        }
    }

    /// A view over the given row indices. Indices must be ascending and in
    /// range.
    pub fn from_indices(store: &'a RecordStore, indices: Vec<usize>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.iter().all(|&i| i < store.len()));
        View {
            store,
            indices: Cow::Owned(indices),
        }
    }

    /// Like [`View::from_indices`], borrowing a cached index list.
    pub fn borrowed(store: &'a RecordStore, indices: &'a [usize]) -> Self {
        View {
            store,
            indices: Cow::Borrowed(indices),
        }
    }

    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Records in view order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let all = self.store.all();
        self.indices.iter().map(move |&i| &all[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.store, other.store) && self.indices == other.indices
    }
}

impl Eq for View<'_> {}

#[cfg(test)]
mod tests {
    use crate::data::model::fixtures::sample_store;

    use super::*;

    #[test]
    fn full_view_covers_store_in_order() {
        let store = sample_store();
        let view = store.view();
        assert_eq!(view.len(), store.len());
        let ages: Vec<u32> = view.records().map(|r| r.age).collect();
        let expected: Vec<u32> = store.all().iter().map(|r| r.age).collect();
        assert_eq!(ages, expected);
    }

    #[test]
    fn borrowed_and_owned_views_compare_equal() {
        let store = sample_store();
        let cached = vec![1, 4, 7];
        let a = View::borrowed(&store, &cached);
        let b = View::from_indices(&store, vec![1, 4, 7]);
        assert_eq!(a, b);
        assert_eq!(a.records().next().map(|r| r.age), Some(45));
    }

    #[test]
    fn views_over_different_stores_differ() {
        let a = sample_store();
        let b = sample_store();
        assert_ne!(a.view(), b.view());
    }
}
