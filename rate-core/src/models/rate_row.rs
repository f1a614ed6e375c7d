use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MetricType;

/// One historical rate schedule entry.
///
/// A row applies to one customer class (and subclass) for one supply period,
/// within a consumption band and a demand band. Limits and charges that were
/// blank in the source are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRow {
    pub customer_class: String,
    pub customer_subclass: String,

    // Billing month the schedule applies to
    pub supply_period: NaiveDate,
    pub supply_period_start: Option<NaiveDate>,
    pub supply_period_end: Option<NaiveDate>,

    // Bands
    pub lower_limit_consumption: Option<Decimal>,
    pub upper_limit_consumption: Option<Decimal>,
    pub lower_limit_demand: Option<Decimal>,
    pub upper_limit_demand: Option<Decimal>,

    // Per-kWh charges
    pub generation_charge_kwh: Option<Decimal>,
    pub transmission_charge_kwh: Option<Decimal>,
    pub distribution_charge_kwh: Option<Decimal>,

    // Per-kW charges
    pub transmission_charge_kw: Option<Decimal>,
    pub distribution_charge_kw: Option<Decimal>,
    pub total_per_kw: Option<Decimal>,
}

impl RateRow {
    /// Lower limit of the band for `metric`.
    pub fn lower_limit(
        &self,
        metric: MetricType,
    ) -> Option<Decimal> {
        match metric {
            MetricType::Consumption => self.lower_limit_consumption,
            MetricType::Demand => self.lower_limit_demand,
        }
    }

    /// Upper limit of the band for `metric`.
    pub fn upper_limit(
        &self,
        metric: MetricType,
    ) -> Option<Decimal> {
        match metric {
            MetricType::Consumption => self.upper_limit_consumption,
            MetricType::Demand => self.upper_limit_demand,
        }
    }
}
