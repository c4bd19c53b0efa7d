use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::view::View;

// ---------------------------------------------------------------------------
// Column – the source schema
// ---------------------------------------------------------------------------

/// A required column of the source table, addressed by its exact header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Age,
    JoinedBank,
    Nationality,
    Occupation,
    LoyaltyClassification,
    EstimatedIncome,
    AmountOfCreditCards,
    CreditCardBalance,
    BankLoans,
    BankDeposits,
    CheckingAccounts,
    SavingAccounts,
    ForeignCurrencyAccount,
    BusinessLending,
    PropertiesOwned,
    RiskWeighting,
}

/// Header of the column derived from `Joined Bank` at load time.
pub const JOIN_YEAR_HEADER: &str = "Join_Year";

impl Column {
    pub const COUNT: usize = 16;

    pub const ALL: [Column; Column::COUNT] = [
        Column::Age,
        Column::JoinedBank,
        Column::Nationality,
        Column::Occupation,
        Column::LoyaltyClassification,
        Column::EstimatedIncome,
        Column::AmountOfCreditCards,
        Column::CreditCardBalance,
        Column::BankLoans,
        Column::BankDeposits,
        Column::CheckingAccounts,
        Column::SavingAccounts,
        Column::ForeignCurrencyAccount,
        Column::BusinessLending,
        Column::PropertiesOwned,
        Column::RiskWeighting,
    ];

    /// Header text as it appears in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Age => "Age",
            Column::JoinedBank => "Joined Bank",
            Column::Nationality => "Nationality",
            Column::Occupation => "Occupation",
            Column::LoyaltyClassification => "Loyalty Classification",
            Column::EstimatedIncome => "Estimated Income",
            Column::AmountOfCreditCards => "Amount of Credit Cards",
            Column::CreditCardBalance => "Credit Card Balance",
            Column::BankLoans => "Bank Loans",
            Column::BankDeposits => "Bank Deposits",
            Column::CheckingAccounts => "Checking Accounts",
            Column::SavingAccounts => "Saving Accounts",
            Column::ForeignCurrencyAccount => "Foreign Currency Account",
            Column::BusinessLending => "Business Lending",
            Column::PropertiesOwned => "Properties Owned",
            Column::RiskWeighting => "Risk Weighting",
        }
    }

    /// Match a source header, ignoring surrounding whitespace.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.into_iter().find(|c| c.header() == header)
    }

    /// Position of this column inside [`Column::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Typed field selectors
// ---------------------------------------------------------------------------

/// Categorical fields that can be filtered and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryField {
    Occupation,
    Nationality,
    LoyaltyClassification,
}

impl CategoryField {
    pub const ALL: [CategoryField; 3] = [
        CategoryField::Occupation,
        CategoryField::Nationality,
        CategoryField::LoyaltyClassification,
    ];

    pub fn column(self) -> Column {
        match self {
            CategoryField::Occupation => Column::Occupation,
            CategoryField::Nationality => Column::Nationality,
            CategoryField::LoyaltyClassification => Column::LoyaltyClassification,
        }
    }

    pub fn label(self) -> &'static str {
        self.column().header()
    }

    pub fn value(self, record: &Record) -> &str {
        match self {
            CategoryField::Occupation => &record.occupation,
            CategoryField::Nationality => &record.nationality,
            CategoryField::LoyaltyClassification => &record.loyalty_classification,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Numeric fields usable for means, histograms and scatter projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    Age,
    EstimatedIncome,
    CreditCardBalance,
    BankDeposits,
    BankLoans,
    RiskWeighting,
    AmountOfCreditCards,
    CheckingAccounts,
    SavingAccounts,
    ForeignCurrencyAccount,
    BusinessLending,
    PropertiesOwned,
    JoinYear,
}

impl NumericField {
    pub fn label(self) -> &'static str {
        match self {
            NumericField::Age => Column::Age.header(),
            NumericField::EstimatedIncome => Column::EstimatedIncome.header(),
            NumericField::CreditCardBalance => Column::CreditCardBalance.header(),
            NumericField::BankDeposits => Column::BankDeposits.header(),
            NumericField::BankLoans => Column::BankLoans.header(),
            NumericField::RiskWeighting => Column::RiskWeighting.header(),
            NumericField::AmountOfCreditCards => Column::AmountOfCreditCards.header(),
            NumericField::CheckingAccounts => Column::CheckingAccounts.header(),
            NumericField::SavingAccounts => Column::SavingAccounts.header(),
            NumericField::ForeignCurrencyAccount => Column::ForeignCurrencyAccount.header(),
            NumericField::BusinessLending => Column::BusinessLending.header(),
            NumericField::PropertiesOwned => Column::PropertiesOwned.header(),
            NumericField::JoinYear => JOIN_YEAR_HEADER,
        }
    }

    pub fn value(self, record: &Record) -> f64 {
        match self {
            NumericField::Age => f64::from(record.age),
            NumericField::EstimatedIncome => record.estimated_income,
            NumericField::CreditCardBalance => record.credit_card_balance,
            NumericField::BankDeposits => record.bank_deposits,
            NumericField::BankLoans => record.bank_loans,
            NumericField::RiskWeighting => record.risk_weighting,
            NumericField::AmountOfCreditCards => f64::from(record.amount_of_credit_cards),
            NumericField::CheckingAccounts => f64::from(record.checking_accounts),
            NumericField::SavingAccounts => f64::from(record.saving_accounts),
            NumericField::ForeignCurrencyAccount => f64::from(record.foreign_currency_account),
            NumericField::BusinessLending => f64::from(record.business_lending),
            NumericField::PropertiesOwned => f64::from(record.properties_owned),
            NumericField::JoinYear => f64::from(record.join_year),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the customer table
// ---------------------------------------------------------------------------

/// A single bank customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub age: u32,
    pub joined_bank: NaiveDate,
    pub nationality: String,
    pub occupation: String,
    pub loyalty_classification: String,
    pub estimated_income: f64,
    pub amount_of_credit_cards: u32,
    pub credit_card_balance: f64,
    pub bank_loans: f64,
    pub bank_deposits: f64,
    pub checking_accounts: u32,
    pub saving_accounts: u32,
    pub foreign_currency_account: u32,
    pub business_lending: u32,
    pub properties_owned: u32,
    pub risk_weighting: f64,
    /// Year of `joined_bank`. Filled in by [`RecordStore::from_records`].
    pub join_year: i32,
}

impl Record {
    /// Render one source column as text, the way the export writes it.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Age => self.age.to_string(),
            Column::JoinedBank => self.joined_bank.format("%Y-%m-%d").to_string(),
            Column::Nationality => self.nationality.clone(),
            Column::Occupation => self.occupation.clone(),
            Column::LoyaltyClassification => self.loyalty_classification.clone(),
            Column::EstimatedIncome => self.estimated_income.to_string(),
            Column::AmountOfCreditCards => self.amount_of_credit_cards.to_string(),
            Column::CreditCardBalance => self.credit_card_balance.to_string(),
            Column::BankLoans => self.bank_loans.to_string(),
            Column::BankDeposits => self.bank_deposits.to_string(),
            Column::CheckingAccounts => self.checking_accounts.to_string(),
            Column::SavingAccounts => self.saving_accounts.to_string(),
            Column::ForeignCurrencyAccount => self.foreign_currency_account.to_string(),
            Column::BusinessLending => self.business_lending.to_string(),
            Column::PropertiesOwned => self.properties_owned.to_string(),
            Column::RiskWeighting => self.risk_weighting.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordStore – the complete loaded table
// ---------------------------------------------------------------------------

/// The immutable customer table for one session, with pre-computed
/// category indices.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    /// Required columns in the order the source file lists them.
    schema: Vec<Column>,
    /// Distinct values per [`CategoryField`], in first-observation order.
    distinct: [Vec<String>; 3],
}

impl RecordStore {
    /// Build the store: derive `join_year` and index category values.
    ///
    /// `schema` is the source column order; missing columns are appended in
    /// canonical order so every column is always exported.
    pub fn from_records(mut records: Vec<Record>, mut schema: Vec<Column>) -> Self {
        derive_join_year(&mut records);

        for column in Column::ALL {
            if !schema.contains(&column) {
                schema.push(column);
            }
        }

        let mut distinct: [Vec<String>; 3] = Default::default();
        for field in CategoryField::ALL {
            let seen = &mut distinct[field.slot()];
            for record in &records {
                let value = field.value(record);
                if !seen.iter().any(|v| v == value) {
                    seen.push(value.to_string());
                }
            }
        }

        RecordStore {
            records,
            schema,
            distinct,
        }
    }

    /// All records in load order.
    pub fn all(&self) -> &[Record] {
        &self.records
    }

    /// Distinct values of `field` in the order they were first observed.
    pub fn distinct_values(&self, field: CategoryField) -> &[String] {
        &self.distinct[field.slot()]
    }

    /// Source column order.
    pub fn schema(&self) -> &[Column] {
        &self.schema
    }

    /// A view over every record.
    pub fn view(&self) -> View<'_> {
        View::full(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Single load-time transformation: `Join_Year` from `Joined Bank`.
fn derive_join_year(records: &mut [Record]) {
    for record in records {
        record.join_year = record.joined_bank.year();
    }
}
