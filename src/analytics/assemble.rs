//! Render-agnostic panels built from aggregation results.
//!
//! Nothing here computes: each panel is a renamed, reshaped copy of one
//! aggregation, keyed by a stable [`PanelKey`] so a rendering layer can bind
//! to it by name.

use serde::Serialize;

use super::aggregate::{
    frequency, grouped_box_stats, grouped_counts, grouped_numeric_pairs, histogram_bins,
    summary_metrics, time_series_counts, value_counts, BoxStats, HistogramBin, SummaryMetrics,
};
use crate::config::DashboardConfig;
use crate::data::model::{CategoryField, NumericField};
use crate::data::view::View;

// ---------------------------------------------------------------------------
// Panel identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKey {
    AgeDistribution,
    NationalityDistribution,
    TopOccupations,
    IncomeDistribution,
    CreditCardBalanceDistribution,
    DepositsVsIncome,
    LoanDistribution,
    LoyaltyDistribution,
    RiskByLoyalty,
    CreditCards,
    CheckingAccounts,
    SavingAccounts,
    ForeignCurrencyAccounts,
    BusinessLending,
    PropertiesOwned,
    CustomersByYear,
}

impl PanelKey {
    pub fn title(self) -> &'static str {
        match self {
            PanelKey::AgeDistribution => "Age Distribution of Customers",
            PanelKey::NationalityDistribution => "Customer Nationality Distribution",
            PanelKey::TopOccupations => "Top 10 Occupations",
            PanelKey::IncomeDistribution => "Income Distribution",
            PanelKey::CreditCardBalanceDistribution => "Credit Card Balance Distribution",
            PanelKey::DepositsVsIncome => "Bank Deposits vs Income",
            PanelKey::LoanDistribution => "Loan Distribution",
            PanelKey::LoyaltyDistribution => "Loyalty Classification Distribution",
            PanelKey::RiskByLoyalty => "Risk Weighting by Loyalty Classification",
            PanelKey::CreditCards => "Credit Cards",
            PanelKey::CheckingAccounts => "Checking Accounts",
            PanelKey::SavingAccounts => "Saving Accounts",
            PanelKey::ForeignCurrencyAccounts => "Foreign Currency Accounts",
            PanelKey::BusinessLending => "Business Lending",
            PanelKey::PropertiesOwned => "Properties Owned",
            PanelKey::CustomersByYear => "Customer Acquisition Over Time",
        }
    }
}

// ---------------------------------------------------------------------------
// Panel payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinValue {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointValue {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PanelData {
    Categories(Vec<CategoryValue>),
    Bins(Vec<BinValue>),
    Points(Vec<PointValue>),
    Boxes(Vec<BoxStats>),
    Years(Vec<YearCount>),
    NoData,
}

impl PanelData {
    pub fn is_empty(&self) -> bool {
        match self {
            PanelData::Categories(v) => v.is_empty(),
            PanelData::Bins(v) => v.is_empty(),
            PanelData::Points(v) => v.is_empty(),
            PanelData::Boxes(v) => v.is_empty(),
            PanelData::Years(v) => v.is_empty(),
            PanelData::NoData => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub key: PanelKey,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub data: PanelData,
}

/// Everything one page of the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub metrics: SummaryMetrics,
    pub panels: Vec<Panel>,
}

impl Dashboard {
    pub fn panel(&self, key: PanelKey) -> Option<&Panel> {
        self.panels.iter().find(|p| p.key == key)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

const CUSTOMERS: &str = "Number of Customers";

fn panel(key: PanelKey, x_label: &'static str, y_label: &'static str, data: PanelData) -> Panel {
    Panel {
        key,
        title: key.title(),
        x_label,
        y_label,
        data,
    }
}

pub fn categories(counts: Vec<(String, usize)>) -> PanelData {
    PanelData::Categories(
        counts
            .into_iter()
            .map(|(label, count)| CategoryValue {
                label,
                value: count as f64,
            })
            .collect(),
    )
}

pub fn bins(histogram: Option<Vec<HistogramBin>>) -> PanelData {
    match histogram {
        Some(bins) => PanelData::Bins(
            bins.into_iter()
                .map(|b| BinValue {
                    start: b.start,
                    end: b.end,
                    count: b.count,
                })
                .collect(),
        ),
        None => PanelData::NoData,
    }
}

/// Unit-wide bars centred on each distinct value.
pub fn discrete_bins(counts: Vec<(f64, usize)>) -> PanelData {
    if counts.is_empty() {
        return PanelData::NoData;
    }
    PanelData::Bins(
        counts
            .into_iter()
            .map(|(value, count)| BinValue {
                start: value - 0.5,
                end: value + 0.5,
                count,
            })
            .collect(),
    )
}

pub fn points(pairs: Vec<(f64, f64)>) -> PanelData {
    PanelData::Points(pairs.into_iter().map(|(x, y)| PointValue { x, y }).collect())
}

pub fn years(series: Vec<(i32, usize)>) -> PanelData {
    PanelData::Years(
        series
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect(),
    )
}

fn histogram_panel(key: PanelKey, view: &View<'_>, field: NumericField, bin_count: usize) -> Panel {
    panel(key, field.label(), CUSTOMERS, bins(histogram_bins(view, field, bin_count)))
}

fn product_panel(key: PanelKey, view: &View<'_>, field: NumericField) -> Panel {
    panel(key, field.label(), CUSTOMERS, discrete_bins(value_counts(view, field)))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The overview page: every panel over the given view.
pub fn home_dashboard(view: &View<'_>, config: &DashboardConfig) -> Dashboard {
    let panels = vec![
        histogram_panel(PanelKey::AgeDistribution, view, NumericField::Age, config.age_bins),
        panel(
            PanelKey::NationalityDistribution,
            CategoryField::Nationality.label(),
            CUSTOMERS,
            categories(frequency(view, CategoryField::Nationality, None)),
        ),
        panel(
            PanelKey::TopOccupations,
            CategoryField::Occupation.label(),
            CUSTOMERS,
            categories(frequency(view, CategoryField::Occupation, Some(config.top_occupations))),
        ),
        histogram_panel(
            PanelKey::IncomeDistribution,
            view,
            NumericField::EstimatedIncome,
            config.value_bins,
        ),
        histogram_panel(
            PanelKey::CreditCardBalanceDistribution,
            view,
            NumericField::CreditCardBalance,
            config.value_bins,
        ),
        panel(
            PanelKey::DepositsVsIncome,
            NumericField::EstimatedIncome.label(),
            NumericField::BankDeposits.label(),
            points(grouped_numeric_pairs(
                view,
                NumericField::EstimatedIncome,
                NumericField::BankDeposits,
            )),
        ),
        histogram_panel(PanelKey::LoanDistribution, view, NumericField::BankLoans, config.value_bins),
        panel(
            PanelKey::LoyaltyDistribution,
            "Loyalty Level",
            CUSTOMERS,
            categories(frequency(view, CategoryField::LoyaltyClassification, None)),
        ),
        panel(
            PanelKey::RiskByLoyalty,
            CategoryField::LoyaltyClassification.label(),
            NumericField::RiskWeighting.label(),
            grouped_box_stats(view, CategoryField::LoyaltyClassification, NumericField::RiskWeighting)
                .map_or(PanelData::NoData, PanelData::Boxes),
        ),
        product_panel(PanelKey::CreditCards, view, NumericField::AmountOfCreditCards),
        product_panel(PanelKey::CheckingAccounts, view, NumericField::CheckingAccounts),
        product_panel(PanelKey::SavingAccounts, view, NumericField::SavingAccounts),
        product_panel(PanelKey::ForeignCurrencyAccounts, view, NumericField::ForeignCurrencyAccount),
        product_panel(PanelKey::BusinessLending, view, NumericField::BusinessLending),
        product_panel(PanelKey::PropertiesOwned, view, NumericField::PropertiesOwned),
        panel(
            PanelKey::CustomersByYear,
            "Year",
            CUSTOMERS,
            years(time_series_counts(view)),
        ),
    ];

    Dashboard {
        metrics: summary_metrics(view),
        panels,
    }
}

/// The data explorer page, normally over a filtered view. Its nationality
/// panel lists nationalities alphabetically rather than by count.
pub fn explorer_dashboard(view: &View<'_>, config: &DashboardConfig) -> Dashboard {
    let panels = vec![
        histogram_panel(PanelKey::AgeDistribution, view, NumericField::Age, config.age_bins),
        panel(
            PanelKey::NationalityDistribution,
            CategoryField::Nationality.label(),
            CUSTOMERS,
            categories(grouped_counts(view, CategoryField::Nationality)),
        ),
    ];

    Dashboard {
        metrics: summary_metrics(view),
        panels,
    }
}
