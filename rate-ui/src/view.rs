//! Projection of a [`SelectionState`] onto a [`Presenter`].
//!
//! [`render`] never mutates the state. Anything the user did with the
//! rendered widgets is returned as follow-up events for the caller to apply.

use chrono::NaiveDate;
use rate_core::{
    CHART_SERIES, CHART_X, DISPLAY_COLUMNS, Event, Presenter, RateTable, SelectionState,
};
use rate_data::export_download;
use rust_decimal::Decimal;
use tracing::{error, warn};

pub const CLASS_LABEL: &str = "Select Customer Class";
pub const DATE_RANGE_LABEL: &str = "Select Supply Period Range";
pub const INVALID_RANGE_MESSAGE: &str = "Please select a valid date range.";

/// Limits of the date range input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// Draws the lookup form and, when present, the cached result.
pub fn render<P: Presenter + ?Sized>(
    state: &SelectionState,
    table: &RateTable,
    presenter: &mut P,
    bounds: DateBounds,
) -> Vec<Event> {
    let mut events = Vec::new();

    if table.classes().is_empty() {
        warn!("rate table has no customer classes, nothing to render");
        return events;
    }

    presenter.render_select(CLASS_LABEL, table.classes(), state.selected_class());
    presenter.render_number_input(&state.metric_type().input_label(), Decimal::ZERO, state.value());
    presenter.render_date_range_input(
        DATE_RANGE_LABEL,
        bounds.min,
        bounds.max,
        &state.requested_dates(),
    );

    if state.requested_dates().complete().is_none() {
        presenter.render_error(INVALID_RANGE_MESSAGE);
        return events;
    }

    let Some(rows) = state.result() else {
        return events;
    };

    presenter.render_table(rows, &DISPLAY_COLUMNS);
    if rows.is_empty() {
        return events;
    }

    presenter.render_line_chart(rows, CHART_X, &CHART_SERIES);

    match export_download(rows) {
        Ok(download) => {
            if presenter.render_download_button(&download) {
                events.push(Event::DownloadCompleted);
            }
        }
        Err(e) => {
            error!("failed to prepare export: {e}");
            presenter.render_error(&format!("Could not prepare the download: {e}"));
        }
    }

    events
}
