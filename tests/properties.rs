//! Property tests for the analytics engine.
//!
//! Strategies generate small customer tables with a narrow category space so
//! filters and group counts actually collide; the properties must hold for
//! every generated table, not just the fixtures in the unit tests.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use banking_dashboard::analytics::aggregate::{
    frequency, histogram_bins, summary_metrics, time_series_counts,
};
use banking_dashboard::data::filter::{apply, FilterSelection};
use banking_dashboard::data::model::{CategoryField, Column, NumericField, Record, RecordStore};

const OCCUPATIONS: &[&str] = &["Engineer", "Teacher", "Nurse", "Analyst", "Lawyer"];
const NATIONALITIES: &[&str] = &["European", "Asian", "American", "Australian"];
const LOYALTY: &[&str] = &["Jade", "Silver", "Gold", "Platinum"];

// ---------------------------------------------------------------------------
// Strategy generators
// ---------------------------------------------------------------------------

fn arb_category(pool: &'static [&'static str]) -> impl Strategy<Value = String> {
    proptest::sample::select(pool).prop_map(str::to_string)
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..=2023, 1u32..=365).prop_filter_map("valid ordinal date", |(year, day)| {
        NaiveDate::from_yo_opt(year, day)
    })
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        (
            arb_category(OCCUPATIONS),
            arb_category(NATIONALITIES),
            arb_category(LOYALTY),
            0u32..100,
            arb_date(),
        ),
        (
            0.0f64..500_000.0,
            0.0f64..20_000.0,
            0.0f64..1_000_000.0,
            0.0f64..2_000_000.0,
            1.0f64..5.0,
        ),
        proptest::collection::vec(0u32..5, 6),
    )
        .prop_map(
            |((occupation, nationality, loyalty, age, joined_bank), amounts, counts)| {
                let (income, balance, loans, deposits, risk) = amounts;
                Record {
                    age,
                    joined_bank,
                    nationality,
                    occupation,
                    loyalty_classification: loyalty,
                    estimated_income: income,
                    amount_of_credit_cards: counts[0],
                    credit_card_balance: balance,
                    bank_loans: loans,
                    bank_deposits: deposits,
                    checking_accounts: counts[1],
                    saving_accounts: counts[2],
                    foreign_currency_account: counts[3],
                    business_lending: counts[4],
                    properties_owned: counts[5],
                    risk_weighting: risk,
                    // Overwritten by the store.
                    join_year: 0,
                }
            },
        )
}

fn arb_store(max_len: usize) -> impl Strategy<Value = RecordStore> {
    proptest::collection::vec(arb_record(), 0..=max_len)
        .prop_map(|records| RecordStore::from_records(records, Column::ALL.to_vec()))
}

fn arb_subset(pool: &'static [&'static str]) -> impl Strategy<Value = BTreeSet<String>> {
    proptest::sample::subsequence(pool, 0..=pool.len())
        .prop_map(|values| values.into_iter().map(str::to_string).collect())
}

fn arb_selection() -> impl Strategy<Value = FilterSelection> {
    (
        arb_subset(OCCUPATIONS),
        arb_subset(NATIONALITIES),
        arb_subset(LOYALTY),
    )
        .prop_map(|(occupation, nationality, loyalty_classification)| FilterSelection {
            occupation,
            nationality,
            loyalty_classification,
        })
}

fn arb_numeric_field() -> impl Strategy<Value = NumericField> {
    proptest::sample::select(vec![
        NumericField::Age,
        NumericField::EstimatedIncome,
        NumericField::CreditCardBalance,
        NumericField::BankLoans,
        NumericField::BankDeposits,
        NumericField::RiskWeighting,
        NumericField::PropertiesOwned,
        NumericField::JoinYear,
    ])
}

fn arb_category_field() -> impl Strategy<Value = CategoryField> {
    proptest::sample::select(CategoryField::ALL.to_vec())
}

// ---------------------------------------------------------------------------
// Property: store and filter invariants
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every record's join year is the year of its join date.
    #[test]
    fn prop_join_year_matches_date(store in arb_store(40)) {
        for record in store.all() {
            prop_assert_eq!(record.join_year, record.joined_bank.year());
        }
    }

    /// A filtered view never grows the store.
    #[test]
    fn prop_filter_never_grows((store, selection) in (arb_store(40), arb_selection())) {
        let filtered = apply(&store.view(), &selection);
        prop_assert!(filtered.len() <= store.len());
    }

    /// Selecting every observed value keeps every record.
    #[test]
    fn prop_full_selection_keeps_everything(store in arb_store(40)) {
        let filtered = apply(&store.view(), &FilterSelection::all(&store));
        prop_assert_eq!(filtered.len(), store.len());
    }

    /// Dropping any observed value of any field loses at least one record.
    #[test]
    fn prop_partial_selection_drops_records(
        (store, field, pick) in (arb_store(40), arb_category_field(), any::<prop::sample::Index>())
    ) {
        let observed = store.distinct_values(field);
        prop_assume!(!observed.is_empty());
        let dropped = &observed[pick.index(observed.len())];

        let mut selection = FilterSelection::all(&store);
        selection.toggle(field, dropped);
        let filtered = apply(&store.view(), &selection);
        prop_assert!(filtered.len() < store.len());
        prop_assert!(filtered.records().all(|r| field.value(r) != dropped.as_str()));
    }

    /// Filtered records satisfy the selection and keep store order.
    #[test]
    fn prop_filter_is_ordered_and_sound((store, selection) in (arb_store(40), arb_selection())) {
        let filtered = apply(&store.view(), &selection);
        prop_assert!(filtered.indices().windows(2).all(|w| w[0] < w[1]));
        for record in filtered.records() {
            prop_assert!(selection.accepts(record));
        }
    }

    /// Applying the same selection twice yields the same view.
    #[test]
    fn prop_filter_is_idempotent((store, selection) in (arb_store(40), arb_selection())) {
        let once = apply(&store.view(), &selection);
        let twice = apply(&once, &selection);
        prop_assert_eq!(once.indices(), twice.indices());
        prop_assert_eq!(apply(&store.view(), &selection), once);
    }
}

// ---------------------------------------------------------------------------
// Property: aggregation invariants
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Frequencies partition the view and never report an empty category.
    #[test]
    fn prop_frequency_partitions_view(
        (store, selection, field) in (arb_store(40), arb_selection(), arb_category_field())
    ) {
        let view = apply(&store.view(), &selection);
        let counts = frequency(&view, field, None);
        prop_assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), view.len());
        prop_assert!(counts.iter().all(|(_, n)| *n >= 1));
        prop_assert!(counts.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    /// Histogram counts partition the view; each value lands in exactly one bin.
    #[test]
    fn prop_histogram_partitions_view(
        (store, field, bins) in (arb_store(40), arb_numeric_field(), 0usize..40)
    ) {
        let view = store.view();
        let Some(histogram) = histogram_bins(&view, field, bins) else {
            prop_assert!(view.is_empty());
            return Ok(());
        };

        prop_assert_eq!(histogram.iter().map(|b| b.count).sum::<usize>(), view.len());

        let last = histogram.len() - 1;
        for record in view.records() {
            let v = field.value(record);
            let containing = histogram
                .iter()
                .enumerate()
                .filter(|(i, b)| v >= b.start && (v < b.end || (*i == last && v <= b.end)))
                .count();
            prop_assert_eq!(containing, 1, "value {} of {:?}", v, field);
        }
    }

    /// Years ascend strictly and their counts partition the view.
    #[test]
    fn prop_time_series_ascending((store, selection) in (arb_store(40), arb_selection())) {
        let view = apply(&store.view(), &selection);
        let series = time_series_counts(&view);
        prop_assert!(series.windows(2).all(|w| w[0].0 < w[1].0));
        prop_assert_eq!(series.iter().map(|(_, n)| n).sum::<usize>(), view.len());
    }

    /// Means are absent exactly when the view is empty.
    #[test]
    fn prop_metrics_sentinel_iff_empty((store, selection) in (arb_store(40), arb_selection())) {
        let view = apply(&store.view(), &selection);
        let metrics = summary_metrics(&view);
        prop_assert_eq!(metrics.count, view.len());
        prop_assert_eq!(metrics.mean_age.is_none(), view.is_empty());
        prop_assert_eq!(metrics.mean_income.is_none(), view.is_empty());
        prop_assert_eq!(metrics.mean_credit_card_balance.is_none(), view.is_empty());
    }
}
