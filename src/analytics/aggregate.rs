//! Read-only aggregations over a [`View`].
//!
//! Every function is a pure function of its inputs. Aggregations that are
//! undefined over zero records (means, histograms, box summaries) report
//! [`AggregationError::EmptyView`] from their `try_` form; the plain form
//! turns that into the "no data" sentinel `None`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::data::model::{CategoryField, NumericField};
use crate::data::view::View;
use crate::error::AggregationError;

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Headline numbers for a view. `None` means "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub count: usize,
    pub mean_age: Option<f64>,
    pub mean_income: Option<f64>,
    pub mean_credit_card_balance: Option<f64>,
}

/// Arithmetic mean of `field` over the view.
pub fn mean(view: &View<'_>, field: NumericField) -> Result<f64, AggregationError> {
    if view.is_empty() {
        return Err(AggregationError::EmptyView);
    }
    let sum: f64 = view.records().map(|r| field.value(r)).sum();
    Ok(sum / view.len() as f64)
}

pub fn summary_metrics(view: &View<'_>) -> SummaryMetrics {
    SummaryMetrics {
        count: view.len(),
        mean_age: no_data(mean(view, NumericField::Age), "mean age"),
        mean_income: no_data(mean(view, NumericField::EstimatedIncome), "mean income"),
        mean_credit_card_balance: no_data(
            mean(view, NumericField::CreditCardBalance),
            "mean credit card balance",
        ),
    }
}

/// Recover an empty-view error into the "no data" sentinel.
fn no_data<T>(result: Result<T, AggregationError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(AggregationError::EmptyView) => {
            log::debug!("{what}: no records in view");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical counts
// ---------------------------------------------------------------------------

/// Category counts in descending order. Ties keep the order in which the
/// categories first appear in the view. `top_n` keeps only the first N.
pub fn frequency(
    view: &View<'_>,
    field: CategoryField,
    top_n: Option<usize>,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for record in view.records() {
        let value = field.value(record);
        match slots.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    // Stable sort, so first-seen order survives on equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(n) = top_n {
        counts.truncate(n);
    }
    counts
}

/// Category counts ordered by category label, the way a group-by reports
/// them.
pub fn grouped_counts(view: &View<'_>, field: CategoryField) -> Vec<(String, usize)> {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for record in view.records() {
        *groups.entry(field.value(record)).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}

/// Count of each distinct value of a numeric field, ascending by value.
pub fn value_counts(view: &View<'_>, field: NumericField) -> Vec<(f64, usize)> {
    let mut values: Vec<f64> = view.records().map(|r| field.value(r)).collect();
    values.sort_by(f64::total_cmp);

    let mut counts: Vec<(f64, usize)> = Vec::new();
    for v in values {
        match counts.last_mut() {
            Some((last, n)) if *last == v => *n += 1,
            _ => counts.push((v, 1)),
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One equal-width bin. Covers `[start, end)`, except the last bin of a
/// histogram which also includes `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Width used for the single bin of a view whose values are all equal.
const COLLAPSED_BIN_WIDTH: f64 = 1.0;

/// `bin_count` equal-width bins spanning `[min, max]` of the field over the
/// view. A bin count of zero is treated as one. When all values are equal
/// the result is one bin centred on that value.
pub fn try_histogram_bins(
    view: &View<'_>,
    field: NumericField,
    bin_count: usize,
) -> Result<Vec<HistogramBin>, AggregationError> {
    if view.is_empty() {
        return Err(AggregationError::EmptyView);
    }

    let values: Vec<f64> = view.records().map(|r| field.value(r)).collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        let half = COLLAPSED_BIN_WIDTH / 2.0;
        return Ok(vec![HistogramBin {
            start: min - half,
            end: min + half,
            count: values.len(),
        }]);
    }

    let bins = bin_count.max(1);
    let width = (max - min) / bins as f64;
    let start_of = |i: usize| min + i as f64 * width;

    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: start_of(i),
            end: if i + 1 == bins { max } else { start_of(i + 1) },
            count: 0,
        })
        .collect();

    for v in values {
        let mut i = (((v - min) / width).floor() as usize).min(bins - 1);
        // Division and multiplication can round differently at an edge;
        // settle on the bin whose reported bounds contain the value.
        while i > 0 && v < histogram[i].start {
            i -= 1;
        }
        while i + 1 < bins && v >= histogram[i + 1].start {
            i += 1;
        }
        histogram[i].count += 1;
    }

    Ok(histogram)
}

/// [`try_histogram_bins`] with an empty view reported as `None`.
pub fn histogram_bins(
    view: &View<'_>,
    field: NumericField,
    bin_count: usize,
) -> Option<Vec<HistogramBin>> {
    no_data(try_histogram_bins(view, field, bin_count), field.label())
}

// ---------------------------------------------------------------------------
// Projections and time series
// ---------------------------------------------------------------------------

/// One `(x, y)` pair per record, in view order.
pub fn grouped_numeric_pairs(
    view: &View<'_>,
    x_field: NumericField,
    y_field: NumericField,
) -> Vec<(f64, f64)> {
    view.records()
        .map(|r| (x_field.value(r), y_field.value(r)))
        .collect()
}

/// Customers per join year, ascending. Years without customers are absent.
pub fn time_series_counts(view: &View<'_>) -> Vec<(i32, usize)> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for record in view.records() {
        *years.entry(record.join_year).or_default() += 1;
    }
    years.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Box summaries
// ---------------------------------------------------------------------------

/// Five-number summary of one category's values, plus Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub category: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
}

/// Box summary of `value` for each category of `group`, in first-seen order.
pub fn try_grouped_box_stats(
    view: &View<'_>,
    group: CategoryField,
    value: NumericField,
) -> Result<Vec<BoxStats>, AggregationError> {
    if view.is_empty() {
        return Err(AggregationError::EmptyView);
    }

    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for record in view.records() {
        let key = group.value(record);
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(value.value(record));
    }

    Ok(groups
        .into_iter()
        .map(|(category, mut values)| {
            values.sort_by(f64::total_cmp);
            box_stats(category, &values)
        })
        .collect())
}

/// [`try_grouped_box_stats`] with an empty view reported as `None`.
pub fn grouped_box_stats(
    view: &View<'_>,
    group: CategoryField,
    value: NumericField,
) -> Option<Vec<BoxStats>> {
    no_data(try_grouped_box_stats(view, group, value), value.label())
}

/// `sorted` is non-empty and ascending.
fn box_stats(category: &str, sorted: &[f64]) -> BoxStats {
    let q1 = quantile(sorted, 0.25);
    let q3 = quantile(sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    BoxStats {
        category: category.to_string(),
        count: sorted.len(),
        min,
        q1,
        median: quantile(sorted, 0.5),
        q3,
        max,
        lower_whisker: sorted.iter().copied().find(|&v| v >= low_fence).unwrap_or(min),
        upper_whisker: sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(max),
    }
}

/// Linear-interpolated quantile of ascending, non-empty data.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::fixtures::{record, sample_store};
    use crate::data::model::{Column, RecordStore};

    fn uniform_age_store(ages: &[u32]) -> RecordStore {
        let rows = ages
            .iter()
            .map(|&age| record("Engineer", "European", "Jade", age, "2020-01-01"))
            .collect();
        RecordStore::from_records(rows, Column::ALL.to_vec())
    }

    fn empty_view_of(store: &RecordStore) -> View<'_> {
        let mut selection = FilterSelection::all(store);
        selection.select_none(CategoryField::Nationality);
        apply(&store.view(), &selection)
    }

    #[test]
    fn frequency_counts_engineers() {
        let store = sample_store();
        let counts = frequency(&store.view(), CategoryField::Occupation, None);
        let engineers = counts.iter().find(|(c, _)| c == "Engineer").map(|(_, n)| *n);
        assert_eq!(engineers, Some(3));
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), store.len());
    }

    #[test]
    fn frequency_breaks_ties_by_first_seen() {
        let store = sample_store();
        let counts = frequency(&store.view(), CategoryField::Occupation, None);
        let labels: Vec<&str> = counts.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(labels, ["Engineer", "Teacher", "Nurse", "Analyst", "Lawyer"]);

        let top = frequency(&store.view(), CategoryField::Occupation, Some(2));
        assert_eq!(top, [("Engineer".to_string(), 3), ("Teacher".to_string(), 2)]);
    }

    #[test]
    fn grouped_counts_sort_by_label() {
        let store = sample_store();
        let counts = grouped_counts(&store.view(), CategoryField::Nationality);
        let labels: Vec<&str> = counts.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(labels, ["American", "Asian", "Australian", "European"]);
        assert_eq!(counts[3].1, 4);
    }

    #[test]
    fn uniform_ages_collapse_to_one_bin() {
        let store = uniform_age_store(&[20, 20, 20, 20, 20]);
        let view = store.view();
        assert_eq!(summary_metrics(&view).mean_age, Some(20.0));

        let bins = histogram_bins(&view, NumericField::Age, 5).expect("bins");
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 5);
        assert!(bins[0].start < 20.0 && 20.0 < bins[0].end);
    }

    #[test]
    fn histogram_covers_min_to_max() {
        let store = uniform_age_store(&[20, 25, 30, 35, 40]);
        let bins = histogram_bins(&store.view(), NumericField::Age, 4).expect("bins");
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 20.0);
        assert_eq!(bins[3].end, 40.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, [1, 1, 1, 2]);
    }

    #[test]
    fn zero_bin_count_means_one_bin() {
        let store = uniform_age_store(&[20, 30]);
        let bins = histogram_bins(&store.view(), NumericField::Age, 0).expect("bins");
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
    }

    #[test]
    fn empty_view_reports_no_data() {
        let store = sample_store();
        let view = empty_view_of(&store);
        let metrics = summary_metrics(&view);
        assert_eq!(metrics.count, 0);
        assert_eq!(metrics.mean_age, None);
        assert_eq!(metrics.mean_income, None);
        assert_eq!(metrics.mean_credit_card_balance, None);

        assert_eq!(mean(&view, NumericField::Age), Err(AggregationError::EmptyView));
        assert_eq!(histogram_bins(&view, NumericField::Age, 30), None);
        assert_eq!(
            try_histogram_bins(&view, NumericField::Age, 30),
            Err(AggregationError::EmptyView)
        );
        assert!(frequency(&view, CategoryField::Occupation, None).is_empty());
        assert!(time_series_counts(&view).is_empty());
        assert_eq!(
            grouped_box_stats(&view, CategoryField::LoyaltyClassification, NumericField::RiskWeighting),
            None
        );
    }

    #[test]
    fn time_series_is_sparse_and_ascending() {
        let store = sample_store();
        let series = time_series_counts(&store.view());
        assert_eq!(
            series,
            [(2001, 1), (2007, 2), (2010, 1), (2015, 3), (2019, 2), (2022, 1)]
        );
    }

    #[test]
    fn pairs_follow_view_order() {
        let mut rows = vec![
            record("A", "X", "Jade", 30, "2020-01-01"),
            record("B", "X", "Jade", 40, "2020-01-01"),
        ];
        rows[0].estimated_income = 1.0;
        rows[0].bank_deposits = 10.0;
        rows[1].estimated_income = 2.0;
        rows[1].bank_deposits = 20.0;
        let store = RecordStore::from_records(rows, Column::ALL.to_vec());
        let pairs = grouped_numeric_pairs(
            &store.view(),
            NumericField::EstimatedIncome,
            NumericField::BankDeposits,
        );
        assert_eq!(pairs, [(1.0, 10.0), (2.0, 20.0)]);
    }

    #[test]
    fn value_counts_ascend_by_value() {
        let store = uniform_age_store(&[3, 1, 3, 2, 3]);
        let counts = value_counts(&store.view(), NumericField::Age);
        assert_eq!(counts, [(1.0, 1), (2.0, 1), (3.0, 3)]);
    }

    #[test]
    fn box_stats_interpolate_quartiles() {
        let rows = [1.0, 2.0, 3.0, 4.0, 100.0]
            .iter()
            .map(|&risk| {
                let mut r = record("A", "X", "Gold", 30, "2020-01-01");
                r.risk_weighting = risk;
                r
            })
            .collect();
        let store = RecordStore::from_records(rows, Column::ALL.to_vec());
        let stats = grouped_box_stats(
            &store.view(),
            CategoryField::LoyaltyClassification,
            NumericField::RiskWeighting,
        )
        .expect("stats");
        assert_eq!(stats.len(), 1);
        let gold = &stats[0];
        assert_eq!(gold.category, "Gold");
        assert_eq!((gold.q1, gold.median, gold.q3), (2.0, 3.0, 4.0));
        assert_eq!(gold.max, 100.0);
        assert_eq!(gold.upper_whisker, 4.0);
        assert_eq!(gold.lower_whisker, 1.0);
    }

    #[test]
    fn box_groups_keep_first_seen_order() {
        let store = sample_store();
        let stats = grouped_box_stats(
            &store.view(),
            CategoryField::LoyaltyClassification,
            NumericField::Age,
        )
        .expect("stats");
        let labels: Vec<&str> = stats.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(labels, ["Jade", "Silver", "Gold"]);
        assert_eq!(stats.iter().map(|s| s.count).sum::<usize>(), store.len());
    }
}
