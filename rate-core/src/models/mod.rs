mod column;
mod customer_class;
mod rate_row;

pub use column::{CHART_SERIES, CHART_X, CellValue, Column, DISPLAY_COLUMNS};
pub use customer_class::{KNOWN_CLASSES, MetricType, metric_for_class};
pub use rate_row::RateRow;
