use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type,
    Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use calamine::{Data, Reader, Xlsx};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Record, RecordStore};
use crate::error::{LoadError, LoadResult};

/// Raw text of every required column for one row, indexed by [`Column::index`].
type RawRow = [Option<String>; Column::COUNT];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the customer table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names of [`Column`]
/// * `.json`    – `[{ "Age": 31, "Joined Bank": "2015-05-21", ... }, ...]`
/// * `.parquet` – one column per field; `Joined Bank` may be a string,
///   `Date32`/`Date64` or a timestamp
/// * `.xlsx`    – first worksheet, header in the first row
///
/// Columns not listed in [`Column`] are ignored.  Any missing column or
/// malformed cell fails the whole load.
pub fn load_file(path: &Path) -> LoadResult<RecordStore> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let store = match ext.as_str() {
        "csv" => load_csv(open(path)?),
        "json" => load_json(open(path)?),
        "parquet" | "pq" => load_parquet(open(path)?),
        "xlsx" => load_xlsx(BufReader::new(open(path)?)),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} customers from {}",
        store.len(),
        path.display()
    );
    Ok(store)
}

fn open(path: &Path) -> LoadResult<File> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read a comma-separated table with a header row.
pub fn load_csv<R: Read>(reader: R) -> LoadResult<RecordStore> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let (positions, schema) = resolve_columns(headers.iter().map(String::as_str))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cells: RawRow =
            std::array::from_fn(|i| record.get(positions[i]).map(str::to_string));
        records.push(parse_row(row, &cells)?);
    }

    Ok(RecordStore::from_records(records, schema))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Read records-oriented JSON, the layout of `df.to_json(orient='records')`.
///
/// Numeric `Joined Bank` values are read as epoch milliseconds.
pub fn load_json<R: Read>(reader: R) -> LoadResult<RecordStore> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let rows = root.as_array().ok_or(LoadError::NotRecordArray)?;

    let schema = match rows.first() {
        Some(first) => {
            let obj = first.as_object().ok_or(LoadError::NotAnObject { row: 0 })?;
            resolve_columns(obj.keys().map(String::as_str))?.1
        }
        None => Column::ALL.to_vec(),
    };

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or(LoadError::NotAnObject { row })?;
        let cells: RawRow = std::array::from_fn(|i| {
            let column = Column::ALL[i];
            json_cell(column, obj.get(column.header()))
        });
        records.push(parse_row(row, &cells)?);
    }

    Ok(RecordStore::from_records(records, schema))
}

fn json_cell(column: Column, value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) if column == Column::JoinedBank => Some(
            n.as_i64()
                .and_then(millis_to_date_text)
                .unwrap_or_else(|| n.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Read a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
pub fn load_parquet(file: File) -> LoadResult<RecordStore> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let (positions, schema) = resolve_columns(headers.iter().map(String::as_str))?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            let mut cells: RawRow = Default::default();
            for column in Column::ALL {
                let array = batch.column(positions[column.index()]);
                cells[column.index()] = arrow_cell(column, array, row)?;
            }
            records.push(parse_row(records.len(), &cells)?);
        }
    }

    Ok(RecordStore::from_records(records, schema))
}

/// Render a single Arrow value as text; dates become `YYYY-MM-DD`.
fn arrow_cell(column: Column, array: &ArrayRef, row: usize) -> LoadResult<Option<String>> {
    if array.is_null(row) {
        return Ok(None);
    }

    let text = match array.data_type() {
        DataType::Utf8 => array.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => array.as_string::<i64>().value(row).to_string(),
        DataType::Int8 => array.as_primitive::<Int8Type>().value(row).to_string(),
        DataType::Int16 => array.as_primitive::<Int16Type>().value(row).to_string(),
        DataType::Int32 => array.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => array.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::UInt8 => array.as_primitive::<UInt8Type>().value(row).to_string(),
        DataType::UInt16 => array.as_primitive::<UInt16Type>().value(row).to_string(),
        DataType::UInt32 => array.as_primitive::<UInt32Type>().value(row).to_string(),
        DataType::UInt64 => array.as_primitive::<UInt64Type>().value(row).to_string(),
        DataType::Float32 => array.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => array.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Date32 => {
            let days = i64::from(array.as_primitive::<Date32Type>().value(row));
            date_or_raw(days * 86_400_000)
        }
        DataType::Date64 => date_or_raw(array.as_primitive::<Date64Type>().value(row)),
        DataType::Timestamp(unit, _) => {
            let millis = match unit {
                TimeUnit::Second => array.as_primitive::<TimestampSecondType>().value(row) * 1_000,
                TimeUnit::Millisecond => {
                    array.as_primitive::<TimestampMillisecondType>().value(row)
                }
                TimeUnit::Microsecond => array
                    .as_primitive::<TimestampMicrosecondType>()
                    .value(row)
                    .div_euclid(1_000),
                TimeUnit::Nanosecond => array
                    .as_primitive::<TimestampNanosecondType>()
                    .value(row)
                    .div_euclid(1_000_000),
            };
            date_or_raw(millis)
        }
        other => {
            return Err(LoadError::UnsupportedType {
                column: column.header(),
                data_type: other.to_string(),
            })
        }
    };

    Ok(Some(text))
}

fn date_or_raw(millis: i64) -> String {
    millis_to_date_text(millis).unwrap_or_else(|| millis.to_string())
}

fn millis_to_date_text(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` workbook. The first row is the
/// header; every following row is one customer.
pub fn load_xlsx<R: Read + Seek>(reader: R) -> LoadResult<RecordStore> {
    let mut workbook = Xlsx::new(reader)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let (positions, schema) = resolve_columns(headers.iter().map(String::as_str))?;

    let mut records = Vec::new();
    for (row, cells_in_sheet) in rows.enumerate() {
        let mut cells: RawRow = Default::default();
        for column in Column::ALL {
            cells[column.index()] = match cells_in_sheet.get(positions[column.index()]) {
                Some(cell) => xlsx_cell(row, column, cell)?,
                None => None,
            };
        }
        records.push(parse_row(row, &cells)?);
    }

    log::debug!("Read {} rows from worksheet '{sheet}'", records.len());
    Ok(RecordStore::from_records(records, schema))
}

/// Render one worksheet cell as text; date cells become `YYYY-MM-DD`.
fn xlsx_cell(row: usize, column: Column, cell: &Data) -> LoadResult<Option<String>> {
    let text = match cell {
        Data::Empty => return Ok(None),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(when) if column == Column::JoinedBank => {
                when.date().format("%Y-%m-%d").to_string()
            }
            _ => dt.as_f64().to_string(),
        },
        Data::Error(e) => return Err(invalid(row, column, &e.to_string(), "cell value")),
    };
    Ok(Some(text))
}

// ---------------------------------------------------------------------------
// Shared row parsing
// ---------------------------------------------------------------------------

/// Map every required column to its position in the source header and
/// return the required columns in source order.
fn resolve_columns<'h>(
    headers: impl Iterator<Item = &'h str>,
) -> LoadResult<([usize; Column::COUNT], Vec<Column>)> {
    let mut positions: [Option<usize>; Column::COUNT] = [None; Column::COUNT];
    let mut schema = Vec::with_capacity(Column::COUNT);

    for (pos, header) in headers.enumerate() {
        match Column::from_header(header) {
            Some(column) if positions[column.index()].is_none() => {
                positions[column.index()] = Some(pos);
                schema.push(column);
            }
            Some(column) => log::warn!("Duplicate column '{column}', keeping the first"),
            None => log::debug!("Ignoring column '{header}'"),
        }
    }

    let missing: Vec<&'static str> = Column::ALL
        .iter()
        .filter(|c| positions[c.index()].is_none())
        .map(|c| c.header())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    Ok((positions.map(|p| p.unwrap_or_default()), schema))
}

fn parse_row(row: usize, cells: &RawRow) -> LoadResult<Record> {
    Ok(Record {
        age: parse_count(row, cells, Column::Age)?,
        joined_bank: parse_date(row, required(row, cells, Column::JoinedBank)?)?,
        nationality: required(row, cells, Column::Nationality)?.to_string(),
        occupation: required(row, cells, Column::Occupation)?.to_string(),
        loyalty_classification: required(row, cells, Column::LoyaltyClassification)?
            .to_string(),
        estimated_income: parse_amount(row, cells, Column::EstimatedIncome)?,
        amount_of_credit_cards: parse_count(row, cells, Column::AmountOfCreditCards)?,
        credit_card_balance: parse_amount(row, cells, Column::CreditCardBalance)?,
        bank_loans: parse_amount(row, cells, Column::BankLoans)?,
        bank_deposits: parse_amount(row, cells, Column::BankDeposits)?,
        checking_accounts: parse_count(row, cells, Column::CheckingAccounts)?,
        saving_accounts: parse_count(row, cells, Column::SavingAccounts)?,
        foreign_currency_account: parse_count(row, cells, Column::ForeignCurrencyAccount)?,
        business_lending: parse_count(row, cells, Column::BusinessLending)?,
        properties_owned: parse_count(row, cells, Column::PropertiesOwned)?,
        risk_weighting: parse_amount(row, cells, Column::RiskWeighting)?,
        // Filled in once by RecordStore::from_records.
        join_year: 0,
    })
}

/// Non-empty, trimmed text of a cell. Empty and null cells fail the load.
fn required(row: usize, cells: &RawRow, column: Column) -> LoadResult<&str> {
    match cells[column.index()].as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(LoadError::MissingValue {
            row,
            column: column.header(),
        }),
    }
}

fn invalid(row: usize, column: Column, value: &str, expected: &'static str) -> LoadError {
    LoadError::InvalidValue {
        row,
        column: column.header(),
        value: value.to_string(),
        expected,
    }
}

/// Integers, also accepted in float notation with no fractional part
/// (`"3.0"`), as pandas writes integer columns that once held nulls.
fn parse_count(row: usize, cells: &RawRow, column: Column) -> LoadResult<u32> {
    let raw = required(row, cells, column)?;
    raw.parse::<u32>()
        .ok()
        .or_else(|| {
            let v = raw.parse::<f64>().ok()?;
            (v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
        })
        .ok_or_else(|| invalid(row, column, raw, "non-negative integer"))
}

fn parse_amount(row: usize, cells: &RawRow, column: Column) -> LoadResult<f64> {
    let raw = required(row, cells, column)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(row, column, raw, "number"))
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

fn parse_date(row: usize, raw: &str) -> LoadResult<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .ok_or_else(|| invalid(row, Column::JoinedBank, raw, "date"))
}
