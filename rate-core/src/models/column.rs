use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RateRow;

/// A named column of the rate table.
///
/// The header strings are the exact source headers and are reused for the
/// displayed table, the chart legend and the exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    CustomerClass,
    CustomerSubclass,
    SupplyPeriod,
    SupplyPeriodStart,
    SupplyPeriodEnd,
    LowerLimitConsumption,
    UpperLimitConsumption,
    LowerLimitDemand,
    UpperLimitDemand,
    GenerationChargeKwh,
    TransmissionChargeKwh,
    DistributionChargeKwh,
    TransmissionChargeKw,
    DistributionChargeKw,
    TotalPerKw,
}

/// Columns shown in the result table and written to the export, in order.
pub const DISPLAY_COLUMNS: [Column; 11] = [
    Column::CustomerClass,
    Column::CustomerSubclass,
    Column::SupplyPeriod,
    Column::SupplyPeriodStart,
    Column::SupplyPeriodEnd,
    Column::GenerationChargeKwh,
    Column::TransmissionChargeKwh,
    Column::DistributionChargeKwh,
    Column::TransmissionChargeKw,
    Column::DistributionChargeKw,
    Column::TotalPerKw,
];

/// X axis of the charge history chart.
pub const CHART_X: Column = Column::SupplyPeriod;

/// Series plotted on the charge history chart.
pub const CHART_SERIES: [Column; 5] = [
    Column::DistributionChargeKw,
    Column::TotalPerKw,
    Column::GenerationChargeKwh,
    Column::TransmissionChargeKwh,
    Column::DistributionChargeKwh,
];

impl Column {
    pub const ALL: [Column; 15] = [
        Column::CustomerClass,
        Column::CustomerSubclass,
        Column::SupplyPeriod,
        Column::SupplyPeriodStart,
        Column::SupplyPeriodEnd,
        Column::LowerLimitConsumption,
        Column::UpperLimitConsumption,
        Column::LowerLimitDemand,
        Column::UpperLimitDemand,
        Column::GenerationChargeKwh,
        Column::TransmissionChargeKwh,
        Column::DistributionChargeKwh,
        Column::TransmissionChargeKw,
        Column::DistributionChargeKw,
        Column::TotalPerKw,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::CustomerClass => "Customer Class",
            Self::CustomerSubclass => "Customer Subclass",
            Self::SupplyPeriod => "Supply Period",
            Self::SupplyPeriodStart => "Supply Period Start",
            Self::SupplyPeriodEnd => "Supply Period End",
            Self::LowerLimitConsumption => "Lower Limit Consumption",
            Self::UpperLimitConsumption => "Upper Limit Consumption",
            Self::LowerLimitDemand => "Lower Limit Demand",
            Self::UpperLimitDemand => "Upper Limit Demand",
            Self::GenerationChargeKwh => "Generation Charge kWh",
            Self::TransmissionChargeKwh => "Transmission Charge kWh",
            Self::DistributionChargeKwh => "Distribution Charge kWh",
            Self::TransmissionChargeKw => "Transmission Charge kW",
            Self::DistributionChargeKw => "Distribution Charge kW",
            Self::TotalPerKw => "Total per kW",
        }
    }

    /// Reads this column from `row`.
    pub fn value<'a>(
        &self,
        row: &'a RateRow,
    ) -> CellValue<'a> {
        match self {
            Self::CustomerClass => CellValue::Text(&row.customer_class),
            Self::CustomerSubclass => CellValue::Text(&row.customer_subclass),
            Self::SupplyPeriod => CellValue::Date(Some(row.supply_period)),
            Self::SupplyPeriodStart => CellValue::Date(row.supply_period_start),
            Self::SupplyPeriodEnd => CellValue::Date(row.supply_period_end),
            Self::LowerLimitConsumption => CellValue::Number(row.lower_limit_consumption),
            Self::UpperLimitConsumption => CellValue::Number(row.upper_limit_consumption),
            Self::LowerLimitDemand => CellValue::Number(row.lower_limit_demand),
            Self::UpperLimitDemand => CellValue::Number(row.upper_limit_demand),
            Self::GenerationChargeKwh => CellValue::Number(row.generation_charge_kwh),
            Self::TransmissionChargeKwh => CellValue::Number(row.transmission_charge_kwh),
            Self::DistributionChargeKwh => CellValue::Number(row.distribution_charge_kwh),
            Self::TransmissionChargeKw => CellValue::Number(row.transmission_charge_kw),
            Self::DistributionChargeKw => CellValue::Number(row.distribution_charge_kw),
            Self::TotalPerKw => CellValue::Number(row.total_per_kw),
        }
    }

    /// Numeric value of this column, `None` for text/date columns or blank cells.
    pub fn number(
        &self,
        row: &RateRow,
    ) -> Option<Decimal> {
        match self.value(row) {
            CellValue::Number(n) => n,
            CellValue::Text(_) | CellValue::Date(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            Self::CustomerClass
                | Self::CustomerSubclass
                | Self::SupplyPeriod
                | Self::SupplyPeriodStart
                | Self::SupplyPeriodEnd
        )
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.header() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A single cell read out of a [`RateRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Date(Option<NaiveDate>),
    Number(Option<Decimal>),
}

impl CellValue<'_> {
    /// Cell text for file exports: blank cells stay empty.
    pub fn to_export_string(&self) -> String {
        match self {
            Self::Text(s) => (*s).to_string(),
            Self::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            Self::Number(Some(n)) => n.to_string(),
            Self::Date(None) | Self::Number(None) => String::new(),
        }
    }
}

/// Display form for on-screen tables, using "—" for blank cells.
impl fmt::Display for CellValue<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Number(Some(n)) => write!(f, "{n}"),
            Self::Date(None) | Self::Number(None) => f.write_str("—"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn sample_row() -> RateRow {
        RateRow {
            customer_class: "Residential".to_string(),
            customer_subclass: "0 to 200 kWh".to_string(),
            supply_period: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            supply_period_start: NaiveDate::from_ymd_opt(2022, 12, 26),
            supply_period_end: None,
            lower_limit_consumption: Some(dec!(0)),
            upper_limit_consumption: Some(dec!(200)),
            lower_limit_demand: None,
            upper_limit_demand: None,
            generation_charge_kwh: Some(dec!(6.5344)),
            transmission_charge_kwh: Some(dec!(0.8221)),
            distribution_charge_kwh: Some(dec!(1.0012)),
            transmission_charge_kw: None,
            distribution_charge_kw: None,
            total_per_kw: None,
        }
    }

    #[test]
    fn headers_round_trip_through_from_header() {
        for column in Column::ALL {
            assert_eq!(Column::from_header(column.header()), Some(column));
        }
        assert_eq!(Column::from_header("customer class"), None);
    }

    #[test]
    fn display_columns_keep_source_order() {
        let headers: Vec<_> = DISPLAY_COLUMNS.iter().map(Column::header).collect();

        assert_eq!(
            headers,
            vec![
                "Customer Class",
                "Customer Subclass",
                "Supply Period",
                "Supply Period Start",
                "Supply Period End",
                "Generation Charge kWh",
                "Transmission Charge kWh",
                "Distribution Charge kWh",
                "Transmission Charge kW",
                "Distribution Charge kW",
                "Total per kW",
            ]
        );
    }

    #[test]
    fn chart_series_are_numeric() {
        assert!(CHART_SERIES.iter().all(Column::is_numeric));
        assert!(!CHART_X.is_numeric());
    }

    #[test]
    fn value_reads_matching_field() {
        let row = sample_row();

        assert_eq!(
            Column::CustomerSubclass.value(&row),
            CellValue::Text("0 to 200 kWh")
        );
        assert_eq!(
            Column::SupplyPeriodStart.value(&row),
            CellValue::Date(NaiveDate::from_ymd_opt(2022, 12, 26))
        );
        assert_eq!(Column::GenerationChargeKwh.number(&row), Some(dec!(6.5344)));
        assert_eq!(Column::TotalPerKw.number(&row), None);
        assert_eq!(Column::CustomerClass.number(&row), None);
    }

    #[test]
    fn blank_cells_render_as_dash_but_export_empty() {
        let row = sample_row();
        let blank = Column::SupplyPeriodEnd.value(&row);

        assert_eq!(blank.to_string(), "—");
        assert_eq!(blank.to_export_string(), "");
        assert_eq!(Column::SupplyPeriod.value(&row).to_export_string(), "2023-01-01");
    }
}
