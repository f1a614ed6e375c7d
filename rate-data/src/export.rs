//! CSV export of a lookup result.
//!
//! The export mirrors the on-screen table: a header row followed by one line
//! per row, columns in display order, UTF-8 encoded. Blank cells stay empty.

use std::io::Write;

use rate_core::{Column, DISPLAY_COLUMNS, Download, RateRow};
use thiserror::Error;
use tracing::debug;

pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";
pub const EXPORT_MIME: &str = "text/csv";
pub const EXPORT_LABEL: &str = "Download Filtered Data";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error while exporting: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `rows` as CSV with the given `columns`.
pub fn write_csv<W: Write>(
    writer: W,
    rows: &[RateRow],
    columns: &[Column],
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(columns.iter().map(Column::header))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| c.value(row).to_export_string()))?;
    }
    writer.flush()?;

    Ok(())
}

/// Packages `rows` as the downloadable CSV offered below the result table.
pub fn export_download(rows: &[RateRow]) -> Result<Download, ExportError> {
    let mut bytes = Vec::new();
    write_csv(&mut bytes, rows, &DISPLAY_COLUMNS)?;
    debug!(rows = rows.len(), bytes = bytes.len(), "export prepared");

    Ok(Download {
        label: EXPORT_LABEL.to_string(),
        bytes,
        file_name: EXPORT_FILE_NAME.to_string(),
        mime: EXPORT_MIME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_rows() -> Vec<RateRow> {
        vec![
            RateRow {
                customer_class: "Residential".to_string(),
                customer_subclass: "101 to 200 kWh".to_string(),
                supply_period: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                supply_period_start: NaiveDate::from_ymd_opt(2022, 12, 26),
                supply_period_end: NaiveDate::from_ymd_opt(2023, 1, 25),
                lower_limit_consumption: Some(dec!(101)),
                upper_limit_consumption: Some(dec!(200)),
                lower_limit_demand: None,
                upper_limit_demand: None,
                generation_charge_kwh: Some(dec!(6.5344)),
                transmission_charge_kwh: Some(dec!(0.8221)),
                distribution_charge_kwh: Some(dec!(1.0012)),
                transmission_charge_kw: None,
                distribution_charge_kw: None,
                total_per_kw: None,
            },
            RateRow {
                customer_class: "Residential".to_string(),
                customer_subclass: "Lifeline, subsidised".to_string(),
                supply_period: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
                supply_period_start: None,
                supply_period_end: None,
                lower_limit_consumption: Some(dec!(0)),
                upper_limit_consumption: Some(dec!(100)),
                lower_limit_demand: None,
                upper_limit_demand: None,
                generation_charge_kwh: Some(dec!(6.10)),
                transmission_charge_kwh: None,
                distribution_charge_kwh: None,
                transmission_charge_kw: None,
                distribution_charge_kw: None,
                total_per_kw: None,
            },
        ]
    }

    #[test]
    fn export_writes_header_and_rows_in_display_order() {
        let download = export_download(&sample_rows()).expect("export should succeed");
        let text = String::from_utf8(download.bytes).expect("export is UTF-8");

        assert_eq!(
            text,
            "\
Customer Class,Customer Subclass,Supply Period,Supply Period Start,Supply Period End,Generation Charge kWh,Transmission Charge kWh,Distribution Charge kWh,Transmission Charge kW,Distribution Charge kW,Total per kW
Residential,101 to 200 kWh,2023-01-01,2022-12-26,2023-01-25,6.5344,0.8221,1.0012,,,
Residential,\"Lifeline, subsidised\",2023-02-01,,,6.10,,,,,
"
        );
    }

    #[test]
    fn export_of_no_rows_is_header_only() {
        let download = export_download(&[]).expect("export should succeed");
        let text = String::from_utf8(download.bytes).expect("export is UTF-8");

        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Customer Class,"));
    }

    #[test]
    fn export_download_metadata() {
        let download = export_download(&sample_rows()).expect("export should succeed");

        assert_eq!(download.file_name, "filtered_data.csv");
        assert_eq!(download.mime, "text/csv");
        assert_eq!(download.label, "Download Filtered Data");
    }

    #[test]
    fn write_csv_honours_column_selection() {
        let mut bytes = Vec::new();
        write_csv(
            &mut bytes,
            &sample_rows()[..1],
            &[Column::SupplyPeriod, Column::UpperLimitConsumption],
        )
        .expect("write should succeed");

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Supply Period,Upper Limit Consumption\n2023-01-01,200\n"
        );
    }

    #[test]
    fn exported_rows_load_back() {
        let mut bytes = Vec::new();
        write_csv(&mut bytes, &sample_rows(), &Column::ALL).expect("write should succeed");

        let table = crate::load_from_reader(bytes.as_slice()).expect("export should load");

        assert_eq!(table.rows(), sample_rows().as_slice());
    }
}
