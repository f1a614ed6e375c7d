//! Loader for the historical rate table, from CSV or a spreadsheet workbook.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does **not** matter and extra
//! columns are ignored. Header names are case-sensitive and must match
//! exactly. Whitespace around headers and values is trimmed.
//!
//! | Column                    | Required cell | Type    |
//! |---------------------------|---------------|---------|
//! | `Customer Class`          | yes           | string  |
//! | `Customer Subclass`       | no            | string  |
//! | `Supply Period`           | yes           | date    |
//! | `Supply Period Start`     | no            | date    |
//! | `Supply Period End`       | no            | date    |
//! | `Lower Limit Consumption` | no            | decimal |
//! | `Upper Limit Consumption` | no            | decimal |
//! | `Lower Limit Demand`      | no            | decimal |
//! | `Upper Limit Demand`      | no            | decimal |
//! | `Generation Charge kWh`   | no            | decimal |
//! | `Transmission Charge kWh` | no            | decimal |
//! | `Distribution Charge kWh` | no            | decimal |
//! | `Transmission Charge kW`  | no            | decimal |
//! | `Distribution Charge kW`  | no            | decimal |
//! | `Total per kW`            | no            | decimal |
//!
//! Every column must be present in the header even when its cells are blank.
//! Dates may be written as `2023-01-31`, `2023-01-31 00:00:00` (spreadsheet
//! timestamp export) or `01/31/2023`. Decimals may use a comma thousands
//! separator (`1,000.50`).
//!
//! Fully blank rows are skipped silently. Rows with a blank class or supply
//! period are skipped with a warning, since no lookup can ever match them.
//!
//! ## Workbooks
//!
//! `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods` files are read with
//! [`calamine`]. Only the first sheet is used and its first row is the header.
//! Date cells become `YYYY-MM-DD HH:MM:SS` text and numbers their shortest
//! decimal form, after which rows go through the same conversion as CSV.
//!
//! ### Example
//!
//! ```csv
//! Customer Class,Customer Subclass,Supply Period,Supply Period Start,Supply Period End,Lower Limit Consumption,Upper Limit Consumption,Lower Limit Demand,Upper Limit Demand,Generation Charge kWh,Transmission Charge kWh,Distribution Charge kWh,Transmission Charge kW,Distribution Charge kW,Total per kW
//! Residential,101 to 200 kWh,2023-01-01,2022-12-26,2023-01-25,101,200,,,6.5344,0.8221,1.0012,,,
//! ```

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use calamine::{Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use rate_core::{Column, RateRow, RateTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading the rate table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read rate table '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read workbook '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// The workbook has no sheet, or its first sheet has no header row.
    #[error("workbook '{0}' has no rate sheet")]
    EmptyWorkbook(PathBuf),

    /// Required header columns are absent.
    #[error("rate table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The underlying CSV deserialisation failed (bad structure, bad date or
    /// number, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Customer Class")]
    customer_class: String,
    #[serde(rename = "Customer Subclass", default)]
    customer_subclass: String,
    #[serde(rename = "Supply Period", deserialize_with = "deserialize_optional_date")]
    supply_period: Option<NaiveDate>,
    #[serde(
        rename = "Supply Period Start",
        deserialize_with = "deserialize_optional_date"
    )]
    supply_period_start: Option<NaiveDate>,
    #[serde(
        rename = "Supply Period End",
        deserialize_with = "deserialize_optional_date"
    )]
    supply_period_end: Option<NaiveDate>,
    #[serde(
        rename = "Lower Limit Consumption",
        deserialize_with = "deserialize_optional_decimal"
    )]
    lower_limit_consumption: Option<Decimal>,
    #[serde(
        rename = "Upper Limit Consumption",
        deserialize_with = "deserialize_optional_decimal"
    )]
    upper_limit_consumption: Option<Decimal>,
    #[serde(
        rename = "Lower Limit Demand",
        deserialize_with = "deserialize_optional_decimal"
    )]
    lower_limit_demand: Option<Decimal>,
    #[serde(
        rename = "Upper Limit Demand",
        deserialize_with = "deserialize_optional_decimal"
    )]
    upper_limit_demand: Option<Decimal>,
    #[serde(
        rename = "Generation Charge kWh",
        deserialize_with = "deserialize_optional_decimal"
    )]
    generation_charge_kwh: Option<Decimal>,
    #[serde(
        rename = "Transmission Charge kWh",
        deserialize_with = "deserialize_optional_decimal"
    )]
    transmission_charge_kwh: Option<Decimal>,
    #[serde(
        rename = "Distribution Charge kWh",
        deserialize_with = "deserialize_optional_decimal"
    )]
    distribution_charge_kwh: Option<Decimal>,
    #[serde(
        rename = "Transmission Charge kW",
        deserialize_with = "deserialize_optional_decimal"
    )]
    transmission_charge_kw: Option<Decimal>,
    #[serde(
        rename = "Distribution Charge kW",
        deserialize_with = "deserialize_optional_decimal"
    )]
    distribution_charge_kw: Option<Decimal>,
    #[serde(rename = "Total per kW", deserialize_with = "deserialize_optional_decimal")]
    total_per_kw: Option<Decimal>,
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a date cell in any of the accepted layouts.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a decimal cell, tolerating a comma thousands separator.
fn parse_decimal(s: &str) -> Result<Decimal, rust_decimal::Error> {
    s.trim().replace(',', "").parse()
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
        None => Ok(None),
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_decimal(&s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid decimal '{s}': {e}"))),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Convert a single CSV row into a [`RateRow`], or `None` when the row has no
/// class or no supply period.
///
/// `row_number` is 1-based (for log messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Option<RateRow> {
    if row.customer_class.is_empty() {
        warn!(row = row_number, "skipping row with blank customer class");
        return None;
    }
    let Some(supply_period) = row.supply_period else {
        warn!(
            row = row_number,
            class = %row.customer_class,
            "skipping row with blank supply period"
        );
        return None;
    };

    Some(RateRow {
        customer_class: row.customer_class,
        customer_subclass: row.customer_subclass,
        supply_period,
        supply_period_start: row.supply_period_start,
        supply_period_end: row.supply_period_end,
        lower_limit_consumption: row.lower_limit_consumption,
        upper_limit_consumption: row.upper_limit_consumption,
        lower_limit_demand: row.lower_limit_demand,
        upper_limit_demand: row.upper_limit_demand,
        generation_charge_kwh: row.generation_charge_kwh,
        transmission_charge_kwh: row.transmission_charge_kwh,
        distribution_charge_kwh: row.distribution_charge_kwh,
        transmission_charge_kw: row.transmission_charge_kw,
        distribution_charge_kw: row.distribution_charge_kw,
        total_per_kw: row.total_per_kw,
    })
}

/// Headers from [`Column::ALL`] that `headers` lacks, in canonical order.
fn missing_columns(headers: &StringRecord) -> Vec<String> {
    Column::ALL
        .iter()
        .map(Column::header)
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(str::to_string)
        .collect()
}

/// Build the table from a header and its data records, whatever the source.
fn collect_rows<I>(
    headers: &StringRecord,
    records: I,
) -> Result<RateTable, LoadError>
where
    I: IntoIterator<Item = Result<StringRecord, LoadError>>,
{
    let missing = missing_columns(headers);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for (idx, record) in records.into_iter().enumerate() {
        let row_number = idx + 1; // 1-based for user-facing messages
        let mut record = record?;
        record.trim();
        if record.iter().all(str::is_empty) {
            debug!(row = row_number, "skipping blank row");
            continue;
        }

        let row: CsvRow = record.deserialize(Some(headers))?;
        rows.extend(convert_row(row, row_number));
    }

    debug!(rows = rows.len(), "parsed rate rows");
    Ok(RateTable::new(rows))
}

/// Parse a rate table from any CSV reader. Rows keep file order.
///
/// # Errors
///
/// * [`LoadError::MissingColumns`] – if the header lacks a required column
///   (an input with no header at all lacks every column).
/// * [`LoadError::Parse`] – if the CSV is structurally invalid or a cell
///   cannot be deserialised.
pub fn load_from_reader<R: Read>(reader: R) -> Result<RateTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    collect_rows(&headers, reader.into_records().map(|r| r.map_err(LoadError::from)))
}

/// Parse a rate table from CSV text.
pub fn load_from_str(input: &str) -> Result<RateTable, LoadError> {
    load_from_reader(input.as_bytes())
}

/// Returns `true` if `path` has a spreadsheet workbook extension.
fn is_workbook(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref(),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods")
    )
}

/// Text form of a workbook cell, as it would appear in a CSV export.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Data::Error(e) => {
            warn!(error = %e, "treating workbook error cell as blank");
            String::new()
        }
    }
}

/// Parse a rate table from the first sheet of a workbook.
fn load_workbook(path: &Path) -> Result<RateTable, LoadError> {
    let workbook_error = |source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = calamine::open_workbook_auto(path).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::EmptyWorkbook(path.to_path_buf()))?
        .map_err(workbook_error)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(LoadError::EmptyWorkbook(path.to_path_buf()));
    };
    let mut headers: StringRecord = header.iter().map(cell_text).collect();
    headers.trim();

    collect_rows(
        &headers,
        rows.map(|cells| Ok(cells.iter().map(cell_text).collect::<StringRecord>())),
    )
}

/// Read the rate table from disk, as a workbook when the extension says so
/// and as CSV otherwise.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when a CSV file cannot be opened,
/// [`LoadError::Workbook`] or [`LoadError::EmptyWorkbook`] for unreadable
/// workbooks, or any error of [`load_from_reader`].
pub fn load_from_file(path: &Path) -> Result<RateTable, LoadError> {
    let table = if is_workbook(path) {
        load_workbook(path)?
    } else {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        load_from_reader(file)?
    };

    info!(
        path = %path.display(),
        rows = table.len(),
        classes = table.classes().len(),
        "rate table loaded"
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
