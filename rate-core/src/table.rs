//! The historical rate table.
//!
//! A [`RateTable`] is built once from loaded rows and is read-only afterwards,
//! so a single instance can be shared (e.g. behind an `Arc`) by any number of
//! sessions without synchronisation.

use chrono::NaiveDate;

use crate::models::RateRow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rows: Vec<RateRow>,
    /// Distinct customer classes in first-seen order.
    classes: Vec<String>,
}

impl RateTable {
    /// Builds a table from rows in source order.
    pub fn new(rows: Vec<RateRow>) -> Self {
        let mut classes: Vec<String> = Vec::new();
        for row in &rows {
            if !classes.contains(&row.customer_class) {
                classes.push(row.customer_class.clone());
            }
        }

        Self { rows, classes }
    }

    /// Distinct customer classes, in the order they first appear.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(
        &self,
        customer_class: &str,
    ) -> bool {
        self.classes.iter().any(|c| c == customer_class)
    }

    /// Rows for one customer class, in table order.
    pub fn rows_for<'a>(
        &'a self,
        customer_class: &'a str,
    ) -> impl Iterator<Item = &'a RateRow> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.customer_class == customer_class)
    }

    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest supply period in the table.
    pub fn supply_period_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.iter().map(|r| r.supply_period).min()?;
        let last = self.rows.iter().map(|r| r.supply_period).max()?;
        Some((first, last))
    }
}

impl FromIterator<RateRow> for RateTable {
    fn from_iter<I: IntoIterator<Item = RateRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
