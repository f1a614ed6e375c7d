use std::fmt;

use serde::{Deserialize, Serialize};

/// Which metric gates the band lookup for a customer class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    /// Energy consumed over the billing month, in kWh.
    #[default]
    Consumption,
    /// Peak demand over the billing month, in kW.
    Demand,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumption => "Consumption",
            Self::Demand => "Demand",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Consumption => "kWh",
            Self::Demand => "kW",
        }
    }

    /// Label shown next to the value input for this metric.
    pub fn input_label(&self) -> String {
        format!("Enter {} Value ({})", self.as_str(), self.unit())
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Consumption" => Some(Self::Consumption),
            "Demand" => Some(Self::Demand),
            _ => None,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer classes with a fixed metric assignment.
///
/// - Residential and General Service A → billed on consumption
/// - General Service B and the General Power classes → billed on demand
pub const KNOWN_CLASSES: [(&str, MetricType); 6] = [
    ("Residential", MetricType::Consumption),
    ("General Service A", MetricType::Consumption),
    ("General Service B", MetricType::Demand),
    ("General Power (GP) Secondary", MetricType::Demand),
    ("GP 13.8 KV and below", MetricType::Demand),
    ("GP 34.5 KV", MetricType::Demand),
];

/// Maps a customer class to the metric its bands are expressed in.
///
/// Classes outside [`KNOWN_CLASSES`] fall back to [`MetricType::Consumption`].
pub fn metric_for_class(customer_class: &str) -> MetricType {
    KNOWN_CLASSES
        .iter()
        .find(|(name, _)| *name == customer_class)
        .map(|(_, metric)| *metric)
        .unwrap_or_default()
}
