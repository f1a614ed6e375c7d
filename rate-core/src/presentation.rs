//! Rendering capabilities the lookup form needs from a front end.
//!
//! A [`Presenter`] only draws. Choices the user makes in the rendered widgets
//! come back to the session as [`Event`](crate::session::Event)s, so the same
//! state can be projected any number of times without side effects.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{Column, RateRow};
use crate::session::DateSelection;

/// A file offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub label: String,
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

pub trait Presenter {
    /// A single choice among `options`, with `current` highlighted.
    fn render_select(
        &mut self,
        label: &str,
        options: &[String],
        current: Option<&str>,
    );

    /// A numeric input bounded below by `min`.
    fn render_number_input(
        &mut self,
        label: &str,
        min: Decimal,
        current: Decimal,
    );

    /// A date range input bounded by `min..=max`.
    fn render_date_range_input(
        &mut self,
        label: &str,
        min: NaiveDate,
        max: NaiveDate,
        current: &DateSelection,
    );

    /// A table of `rows` showing `columns` in order. `rows` may be empty.
    fn render_table(
        &mut self,
        rows: &[RateRow],
        columns: &[Column],
    );

    /// A line chart with one series per entry of `y`.
    fn render_line_chart(
        &mut self,
        rows: &[RateRow],
        x: Column,
        y: &[Column],
    );

    /// Offers `download`. Returns `true` when the user took it.
    fn render_download_button(
        &mut self,
        download: &Download,
    ) -> bool;

    /// A user-visible error notice.
    fn render_error(
        &mut self,
        message: &str,
    );
}
