use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use banking_dashboard::analytics::export::export_view;
use banking_dashboard::data::model::{Column, Record, RecordStore};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_f64() * f64::from(hi - lo + 1)) as u32
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }

    /// Skewed positive amount: mostly near `scale`, with a long right tail.
    fn amount(&mut self, scale: f64) -> f64 {
        let u = self.next_f64().max(1e-9);
        ((-u.ln()) * scale * 100.0).round() / 100.0
    }
}

const NATIONALITIES: &[&str] = &["European", "Asian", "American", "Australian", "African"];
const LOYALTY: &[&str] = &["Jade", "Silver", "Gold", "Platinum"];
const OCCUPATIONS: &[&str] = &[
    "Safety Technician IV",
    "Software Consultant",
    "Help Desk Operator",
    "Geologist II",
    "Assistant Professor",
    "Registered Nurse",
    "Accountant I",
    "Structural Engineer",
    "Account Executive",
    "Teacher",
    "Web Developer III",
    "Financial Analyst",
    "Paralegal",
    "Pharmacist",
    "Librarian",
];

fn generate_customer(rng: &mut SimpleRng) -> Record {
    let year = rng.range(1990, 2023) as i32;
    let day = rng.range(1, 365);
    let joined_bank = NaiveDate::from_yo_opt(year, day).expect("valid ordinal date");
    let income = 15_000.0 + rng.amount(120_000.0);

    Record {
        age: rng.range(17, 85),
        joined_bank,
        nationality: rng.pick(NATIONALITIES).to_string(),
        occupation: rng.pick(OCCUPATIONS).to_string(),
        loyalty_classification: rng.pick(LOYALTY).to_string(),
        estimated_income: income,
        amount_of_credit_cards: rng.range(1, 3),
        credit_card_balance: rng.amount(3_000.0),
        bank_loans: rng.amount(500_000.0),
        bank_deposits: (income * (1.0 + rng.next_f64() * 6.0) * 100.0).round() / 100.0,
        checking_accounts: rng.range(0, 4),
        saving_accounts: rng.range(0, 3),
        foreign_currency_account: rng.range(0, 2),
        business_lending: rng.range(0, 2),
        properties_owned: rng.range(0, 3),
        risk_weighting: f64::from(rng.range(1, 5)),
        join_year: 0,
    }
}

fn write_parquet(store: &RecordStore, path: &Path) {
    let records = store.all();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");

    let text = |f: fn(&Record) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&Record) -> u32| -> ArrayRef {
        Arc::new(Int64Array::from(
            records.iter().map(|r| i64::from(f(r))).collect::<Vec<_>>(),
        ))
    };
    let float = |f: fn(&Record) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(records.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = Vec::new();
    let mut columns = Vec::new();
    for column in Column::ALL {
        let (data_type, array): (DataType, ArrayRef) = match column {
            Column::Age => (DataType::Int64, int(|r| r.age)),
            Column::JoinedBank => (
                DataType::Date32,
                Arc::new(Date32Array::from(
                    records
                        .iter()
                        .map(|r| r.joined_bank.signed_duration_since(epoch).num_days() as i32)
                        .collect::<Vec<_>>(),
                )),
            ),
            Column::Nationality => (DataType::Utf8, text(|r| &r.nationality)),
            Column::Occupation => (DataType::Utf8, text(|r| &r.occupation)),
            Column::LoyaltyClassification => (DataType::Utf8, text(|r| &r.loyalty_classification)),
            Column::EstimatedIncome => (DataType::Float64, float(|r| r.estimated_income)),
            Column::AmountOfCreditCards => (DataType::Int64, int(|r| r.amount_of_credit_cards)),
            Column::CreditCardBalance => (DataType::Float64, float(|r| r.credit_card_balance)),
            Column::BankLoans => (DataType::Float64, float(|r| r.bank_loans)),
            Column::BankDeposits => (DataType::Float64, float(|r| r.bank_deposits)),
            Column::CheckingAccounts => (DataType::Int64, int(|r| r.checking_accounts)),
            Column::SavingAccounts => (DataType::Int64, int(|r| r.saving_accounts)),
            Column::ForeignCurrencyAccount => {
                (DataType::Int64, int(|r| r.foreign_currency_account))
            }
            Column::BusinessLending => (DataType::Int64, int(|r| r.business_lending)),
            Column::PropertiesOwned => (DataType::Int64, int(|r| r.properties_owned)),
            Column::RiskWeighting => (DataType::Float64, float(|r| r.risk_weighting)),
        };
        fields.push(Field::new(column.header(), data_type, false));
        columns.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    env_logger::init();

    let count: usize = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(3_000);

    let mut rng = SimpleRng::new(42);
    let records: Vec<Record> = (0..count).map(|_| generate_customer(&mut rng)).collect();
    let store = RecordStore::from_records(records, Column::ALL.to_vec());

    let csv_path = Path::new("sample_banking.csv");
    export_view(&store.view(), csv_path).expect("Failed to write CSV");

    let parquet_path = Path::new("sample_banking.parquet");
    write_parquet(&store, parquet_path);

    println!(
        "Wrote {} customers to {} and {}",
        store.len(),
        csv_path.display(),
        parquet_path.display()
    );
}
