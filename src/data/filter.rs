use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{CategoryField, Record, RecordStore};
use super::view::View;

/// How many occupations are pre-selected when a store is first loaded.
pub const DEFAULT_OCCUPATION_PRESELECTION: usize = 3;

// ---------------------------------------------------------------------------
// Filter predicate: which category values are accepted per field
// ---------------------------------------------------------------------------

/// Per-field selection state for the three filterable categories.
///
/// An empty set rejects every record; it is never read as "no filter".
/// Values that do not occur in the store are kept but simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub occupation: BTreeSet<String>,
    pub nationality: BTreeSet<String>,
    pub loyalty_classification: BTreeSet<String>,
}

impl FilterSelection {
    /// Every observed value selected for every field.
    pub fn all(store: &RecordStore) -> Self {
        let mut selection = FilterSelection::default();
        for field in CategoryField::ALL {
            selection.select_all(store, field);
        }
        selection
    }

    /// Start-up selection: the first `occupation_count` occupations in
    /// first-seen order, every nationality and every loyalty tier.
    pub fn defaults(store: &RecordStore, occupation_count: usize) -> Self {
        let mut selection = FilterSelection::all(store);
        selection.occupation = store
            .distinct_values(CategoryField::Occupation)
            .iter()
            .take(occupation_count)
            .cloned()
            .collect();
        selection
    }

    pub fn selected(&self, field: CategoryField) -> &BTreeSet<String> {
        match field {
            CategoryField::Occupation => &self.occupation,
            CategoryField::Nationality => &self.nationality,
            CategoryField::LoyaltyClassification => &self.loyalty_classification,
        }
    }

    pub fn selected_mut(&mut self, field: CategoryField) -> &mut BTreeSet<String> {
        match field {
            CategoryField::Occupation => &mut self.occupation,
            CategoryField::Nationality => &mut self.nationality,
            CategoryField::LoyaltyClassification => &mut self.loyalty_classification,
        }
    }

    /// Whether `record` passes all three field tests.
    pub fn accepts(&self, record: &Record) -> bool {
        CategoryField::ALL
            .iter()
            .all(|&field| self.selected(field).contains(field.value(record)))
    }

    /// Toggle a single value in a field's selection.
    pub fn toggle(&mut self, field: CategoryField, value: &str) {
        let selected = self.selected_mut(field);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select every value the store has for `field`.
    pub fn select_all(&mut self, store: &RecordStore, field: CategoryField) {
        *self.selected_mut(field) = store.distinct_values(field).iter().cloned().collect();
    }

    /// Deselect every value of `field`, which hides all records.
    pub fn select_none(&mut self, field: CategoryField) {
        self.selected_mut(field).clear();
    }
}

/// Return indices of records that pass the selection, in store order.
pub fn filtered_indices(store: &RecordStore, selection: &FilterSelection) -> Vec<usize> {
    store
        .all()
        .iter()
        .enumerate()
        .filter(|(_, record)| selection.accepts(record))
        .map(|(i, _)| i)
        .collect()
}

/// Narrow `view` to the records accepted by `selection`.
pub fn apply<'a>(view: &View<'a>, selection: &FilterSelection) -> View<'a> {
    let store = view.store();
    let all = store.all();
    let indices = view
        .indices()
        .iter()
        .copied()
        .filter(|&i| selection.accepts(&all[i]))
        .collect();
    View::from_indices(store, indices)
}

#[cfg(test)]
mod tests {
    use crate::data::model::fixtures::sample_store;

    use super::*;

    #[test]
    fn full_selection_keeps_everything() {
        let store = sample_store();
        let view = apply(&store.view(), &FilterSelection::all(&store));
        assert_eq!(view, store.view());
    }

    #[test]
    fn empty_field_rejects_all() {
        let store = sample_store();
        let mut selection = FilterSelection::all(&store);
        selection.select_none(CategoryField::Occupation);
        assert!(apply(&store.view(), &selection).is_empty());
        assert!(filtered_indices(&store, &selection).is_empty());
    }

    #[test]
    fn defaults_take_first_three_occupations() {
        let store = sample_store();
        let selection = FilterSelection::defaults(&store, DEFAULT_OCCUPATION_PRESELECTION);
        let expected: BTreeSet<String> = ["Engineer", "Teacher", "Nurse"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(selection.occupation, expected);
        assert_eq!(selection.nationality.len(), 4);
        assert_eq!(selection.loyalty_classification.len(), 3);
        assert_eq!(selection, FilterSelection::defaults(&store, 3));

        let view = apply(&store.view(), &selection);
        assert_eq!(view.indices(), [0, 1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn fields_combine_with_and() {
        let store = sample_store();
        let mut selection = FilterSelection::all(&store);
        selection.occupation = ["Engineer".to_string()].into();
        selection.nationality = ["European".to_string()].into();
        let view = apply(&store.view(), &selection);
        assert_eq!(view.indices(), [0, 2]);
    }

    #[test]
    fn unknown_values_are_ignored() {
        let store = sample_store();
        let mut selection = FilterSelection::all(&store);
        selection.occupation.insert("Astronaut".to_string());
        assert_eq!(apply(&store.view(), &selection).len(), store.len());

        selection.occupation = ["Astronaut".to_string()].into();
        assert!(apply(&store.view(), &selection).is_empty());
    }

    #[test]
    fn apply_narrows_an_existing_view() {
        let store = sample_store();
        let mut first = FilterSelection::all(&store);
        first.loyalty_classification = ["Jade".to_string()].into();
        let jade = apply(&store.view(), &first);
        assert_eq!(jade.indices(), [0, 3, 5, 7]);

        let mut second = FilterSelection::all(&store);
        second.nationality = ["European".to_string()].into();
        assert_eq!(apply(&jade, &second).indices(), [0, 7]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let store = sample_store();
        let mut selection = FilterSelection::defaults(&store, 1);
        selection.toggle(CategoryField::Occupation, "Lawyer");
        assert!(selection.occupation.contains("Lawyer"));
        selection.toggle(CategoryField::Occupation, "Lawyer");
        assert!(!selection.occupation.contains("Lawyer"));
        selection.select_all(&store, CategoryField::Occupation);
        assert_eq!(selection, FilterSelection::all(&store));
    }
}
