//! Rate lookup over a [`RateTable`].
//!
//! A lookup keeps the rows that satisfy all three predicates:
//!
//! | Predicate    | Test                                                  |
//! |--------------|-------------------------------------------------------|
//! | Class        | `row.customer_class == class`                         |
//! | Band         | `lower[metric] <= value <= upper[metric]` (inclusive) |
//! | Supply period| `start <= row.supply_period < end + 1 day`            |
//!
//! The band is closed on both ends while the supply window is half-open: the
//! requested end date counts as a whole calendar day. Rows keep table order;
//! an empty result is a normal outcome, and overlapping bands simply produce
//! several matches.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use rate_core::{MetricType, RateRow, RateTable, filter};
//!
//! let row = RateRow {
//!     customer_class: "Residential".to_string(),
//!     customer_subclass: "101 to 200 kWh".to_string(),
//!     supply_period: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
//!     supply_period_start: None,
//!     supply_period_end: None,
//!     lower_limit_consumption: Some(dec!(101)),
//!     upper_limit_consumption: Some(dec!(200)),
//!     lower_limit_demand: None,
//!     upper_limit_demand: None,
//!     generation_charge_kwh: Some(dec!(6.5344)),
//!     transmission_charge_kwh: None,
//!     distribution_charge_kwh: None,
//!     transmission_charge_kw: None,
//!     distribution_charge_kw: None,
//!     total_per_kw: None,
//! };
//! let table = RateTable::new(vec![row]);
//!
//! let rows = filter(
//!     &table,
//!     "Residential",
//!     dec!(200),
//!     MetricType::Consumption,
//!     NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
//! );
//!
//! assert_eq!(rows.len(), 1);
//! ```

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MetricType, RateRow, metric_for_class};
use crate::table::RateTable;

/// An inclusive `[lower, upper]` range of metric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub lower: Decimal,
    pub upper: Decimal,
}

impl Band {
    /// The band of `row` for `metric`, if both limits are present.
    pub fn of(
        row: &RateRow,
        metric: MetricType,
    ) -> Option<Self> {
        Some(Self {
            lower: row.lower_limit(metric)?,
            upper: row.upper_limit(metric)?,
        })
    }

    pub fn contains(
        &self,
        value: Decimal,
    ) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// A half-open `[start, end)` window of supply periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyWindow {
    pub start: NaiveDate,
    /// `None` only when the inclusive end is the last representable date.
    pub end_exclusive: Option<NaiveDate>,
}

impl SupplyWindow {
    /// Window covering `start` through the whole of `end_inclusive`.
    pub fn from_inclusive(
        start: NaiveDate,
        end_inclusive: NaiveDate,
    ) -> Self {
        Self {
            start,
            end_exclusive: end_inclusive.checked_add_days(Days::new(1)),
        }
    }

    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        self.start <= date && self.end_exclusive.is_none_or(|end| date < end)
    }
}

/// Arguments of one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuery {
    pub customer_class: String,
    pub metric_value: Decimal,
    pub metric_type: MetricType,
    pub window: SupplyWindow,
}

impl RateQuery {
    /// Builds a query whose metric type comes from the class mapping.
    pub fn for_class(
        customer_class: impl Into<String>,
        metric_value: Decimal,
        date_start: NaiveDate,
        date_end: NaiveDate,
    ) -> Self {
        let customer_class = customer_class.into();
        let metric_type = metric_for_class(&customer_class);

        Self {
            customer_class,
            metric_value,
            metric_type,
            window: SupplyWindow::from_inclusive(date_start, date_end),
        }
    }

    pub fn matches(
        &self,
        row: &RateRow,
    ) -> bool {
        row.customer_class == self.customer_class
            && Band::of(row, self.metric_type).is_some_and(|band| band.contains(self.metric_value))
            && self.window.contains(row.supply_period)
    }
}

/// Rows of `table` matching `class`, the band for `metric_type`, and the
/// supply period range `date_start..=date_end`.
pub fn filter(
    table: &RateTable,
    customer_class: &str,
    metric_value: Decimal,
    metric_type: MetricType,
    date_start: NaiveDate,
    date_end: NaiveDate,
) -> Vec<RateRow> {
    let query = RateQuery {
        customer_class: customer_class.to_string(),
        metric_value,
        metric_type,
        window: SupplyWindow::from_inclusive(date_start, date_end),
    };
    filter_query(table, &query)
}

/// Runs a prepared [`RateQuery`].
pub fn filter_query(
    table: &RateTable,
    query: &RateQuery,
) -> Vec<RateRow> {
    let rows: Vec<RateRow> = table
        .rows_for(&query.customer_class)
        .filter(|row| query.matches(row))
        .cloned()
        .collect();

    debug!(
        class = %query.customer_class,
        metric = %query.metric_type,
        value = %query.metric_value,
        start = %query.window.start,
        matched = rows.len(),
        "rate lookup"
    );

    rows
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn consumption_row(
        subclass: &str,
        period: NaiveDate,
        lower: Decimal,
        upper: Decimal,
    ) -> RateRow {
        RateRow {
            customer_class: "Residential".to_string(),
            customer_subclass: subclass.to_string(),
            supply_period: period,
            supply_period_start: None,
            supply_period_end: None,
            lower_limit_consumption: Some(lower),
            upper_limit_consumption: Some(upper),
            lower_limit_demand: None,
            upper_limit_demand: None,
            generation_charge_kwh: Some(dec!(6.50)),
            transmission_charge_kwh: Some(dec!(0.80)),
            distribution_charge_kwh: Some(dec!(1.00)),
            transmission_charge_kw: None,
            distribution_charge_kw: None,
            total_per_kw: None,
        }
    }

    fn demand_row(
        subclass: &str,
        period: NaiveDate,
        lower: Decimal,
        upper: Decimal,
    ) -> RateRow {
        RateRow {
            customer_class: "General Service B".to_string(),
            customer_subclass: subclass.to_string(),
            supply_period: period,
            lower_limit_consumption: None,
            upper_limit_consumption: None,
            lower_limit_demand: Some(lower),
            upper_limit_demand: Some(upper),
            transmission_charge_kw: Some(dec!(300.10)),
            distribution_charge_kw: Some(dec!(450.25)),
            total_per_kw: Some(dec!(750.35)),
            ..consumption_row(subclass, period, dec!(0), dec!(0))
        }
    }

    fn sample_table() -> RateTable {
        RateTable::new(vec![
            consumption_row("0-100", date(2023, 1, 1), dec!(0), dec!(100)),
            consumption_row("101-200", date(2023, 1, 1), dec!(101), dec!(200)),
            consumption_row("101-200", date(2023, 2, 1), dec!(101), dec!(200)),
            consumption_row("101-200", date(2022, 12, 1), dec!(101), dec!(200)),
            demand_row("0-1000", date(2023, 1, 1), dec!(0), dec!(1000)),
            consumption_row("201-300", date(2023, 1, 15), dec!(201), dec!(300)),
            consumption_row("101-200", date(2023, 1, 31), dec!(101), dec!(200)),
        ])
    }

    fn subclasses_and_periods(rows: &[RateRow]) -> Vec<(String, NaiveDate)> {
        rows.iter()
            .map(|r| (r.customer_subclass.clone(), r.supply_period))
            .collect()
    }

    // =========================================================================
    // Band tests
    // =========================================================================

    #[test]
    fn band_includes_lower_and_upper_limits() {
        let band = Band {
            lower: dec!(101),
            upper: dec!(200),
        };

        assert!(band.contains(dec!(101)));
        assert!(band.contains(dec!(200)));
        assert!(band.contains(dec!(150.5)));
    }

    #[test]
    fn band_excludes_values_outside_limits() {
        let band = Band {
            lower: dec!(101),
            upper: dec!(200),
        };

        assert!(!band.contains(dec!(100.99)));
        assert!(!band.contains(dec!(200.01)));
    }

    #[test]
    fn band_requires_both_limits() {
        let mut row = consumption_row("x", date(2023, 1, 1), dec!(0), dec!(100));
        row.upper_limit_consumption = None;

        assert_eq!(Band::of(&row, MetricType::Consumption), None);
        assert_eq!(Band::of(&row, MetricType::Demand), None);
    }

    // =========================================================================
    // SupplyWindow tests
    // =========================================================================

    #[test]
    fn window_includes_requested_end_date() {
        let window = SupplyWindow::from_inclusive(date(2023, 1, 1), date(2023, 1, 31));

        assert!(window.contains(date(2023, 1, 1)));
        assert!(window.contains(date(2023, 1, 31)));
        assert!(!window.contains(date(2023, 2, 1)));
        assert!(!window.contains(date(2022, 12, 31)));
    }

    #[test]
    fn window_end_is_one_day_after_inclusive_end() {
        let window = SupplyWindow::from_inclusive(date(2023, 1, 1), date(2023, 1, 31));

        assert_eq!(window.end_exclusive, Some(date(2023, 2, 1)));
    }

    #[test]
    fn window_ending_on_max_date_is_open() {
        let window = SupplyWindow::from_inclusive(date(2023, 1, 1), NaiveDate::MAX);

        assert_eq!(window.end_exclusive, None);
        assert!(window.contains(NaiveDate::MAX));
    }

    // =========================================================================
    // filter tests
    // =========================================================================

    #[test]
    fn filter_residential_150_in_january() {
        let table = sample_table();

        let rows = filter(
            &table,
            "Residential",
            dec!(150),
            MetricType::Consumption,
            date(2023, 1, 1),
            date(2023, 1, 31),
        );

        assert_eq!(
            subclasses_and_periods(&rows),
            vec![
                ("101-200".to_string(), date(2023, 1, 1)),
                ("101-200".to_string(), date(2023, 1, 31)),
            ]
        );
    }

    #[test]
    fn filter_includes_rows_at_band_boundaries() {
        let table = sample_table();

        for value in [dec!(101), dec!(200)] {
            let rows = filter(
                &table,
                "Residential",
                value,
                MetricType::Consumption,
                date(2023, 1, 1),
                date(2023, 1, 1),
            );
            assert_eq!(
                subclasses_and_periods(&rows),
                vec![("101-200".to_string(), date(2023, 1, 1))],
                "value {value} should hit the 101-200 band"
            );
        }
    }

    #[test]
    fn filter_returns_every_row_whose_band_holds_its_own_limits() {
        let table = sample_table();

        for row in table.rows() {
            let metric = metric_for_class(&row.customer_class);
            for value in [row.lower_limit(metric), row.upper_limit(metric)]
                .into_iter()
                .flatten()
            {
                let rows = filter(
                    &table,
                    &row.customer_class,
                    value,
                    metric,
                    row.supply_period,
                    row.supply_period,
                );
                assert!(rows.contains(row), "{row:?} should match its own limit {value}");
            }
        }
    }

    #[test]
    fn filter_excludes_value_between_bands() {
        let table = sample_table();

        let rows = filter(
            &table,
            "Residential",
            dec!(100.5),
            MetricType::Consumption,
            date(2023, 1, 1),
            date(2023, 1, 31),
        );

        assert!(rows.is_empty());
    }

    #[test]
    fn filter_end_date_plus_one_day_is_excluded() {
        let table = sample_table();

        let rows = filter(
            &table,
            "Residential",
            dec!(150),
            MetricType::Consumption,
            date(2023, 1, 2),
            date(2023, 1, 31),
        );

        // 2023-02-01 is one day past the requested end
        assert_eq!(
            subclasses_and_periods(&rows),
            vec![("101-200".to_string(), date(2023, 1, 31))]
        );
    }

    #[test]
    fn filter_uses_demand_limits_for_demand_metric() {
        let table = sample_table();

        let rows = filter(
            &table,
            "General Service B",
            dec!(500),
            MetricType::Demand,
            date(2023, 1, 1),
            date(2023, 1, 31),
        );
        assert_eq!(rows.len(), 1);

        // Demand rows have no consumption band and never match on consumption
        let rows = filter(
            &table,
            "General Service B",
            dec!(500),
            MetricType::Consumption,
            date(2023, 1, 1),
            date(2023, 1, 31),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn filter_unknown_class_returns_empty() {
        let table = sample_table();

        let rows = filter(
            &table,
            "Streetlights",
            dec!(150),
            MetricType::Consumption,
            date(2020, 1, 1),
            date(2030, 1, 1),
        );

        assert!(rows.is_empty());
    }

    #[test]
    fn filter_returns_overlapping_matches_in_table_order() {
        let table = RateTable::new(vec![
            consumption_row("wide", date(2023, 1, 1), dec!(0), dec!(500)),
            consumption_row("narrow", date(2023, 1, 1), dec!(100), dec!(200)),
        ]);

        let rows = filter(
            &table,
            "Residential",
            dec!(150),
            MetricType::Consumption,
            date(2023, 1, 1),
            date(2023, 1, 1),
        );

        let names: Vec<_> = rows.iter().map(|r| r.customer_subclass.as_str()).collect();
        assert_eq!(names, vec!["wide", "narrow"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let table = sample_table();
        let run = || {
            filter(
                &table,
                "Residential",
                dec!(150),
                MetricType::Consumption,
                date(2022, 1, 1),
                date(2023, 12, 31),
            )
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn query_for_class_derives_metric_type() {
        let query = RateQuery::for_class(
            "General Service B",
            dec!(500),
            date(2023, 1, 1),
            date(2023, 1, 31),
        );

        assert_eq!(query.metric_type, MetricType::Demand);
        assert_eq!(filter_query(&sample_table(), &query).len(), 1);
    }
}
