//! Per-session selection state for the rate lookup form.
//!
//! The state is owned by exactly one interactive session and changes only
//! through [`SelectionState::handle_event`], one event per user action.
//! Rendering reads the state but never mutates it; the only deferred change is
//! the pending reset, applied by [`SelectionState::end_cycle`] once the cycle
//! that scheduled it has been rendered.
//!
//! ```text
//!          edit                submit (valid range)          reset pending
//!   Idle ────────▶ Editing ─────────────────────▶ Submitted ──────────────▶ Idle
//!                    ▲  │ submit (incomplete range)   │  download_completed
//!                    │  └─────── stays Editing        └──▶ Submitted, reset pending
//!                    └──────────── edit ◀─────────────────┘
//! ```

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::filter::filter;
use crate::models::{MetricType, RateRow, metric_for_class};
use crate::table::RateTable;

/// Length of the default look-back window.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 365;

/// A date range as chosen so far: either endpoint may still be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateSelection {
    pub fn range(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn start_only(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// `[today - 365 days, today]`.
    pub fn default_for(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
            .unwrap_or(NaiveDate::MIN);
        Self::range(start, today)
    }

    /// Both endpoints, if the range is well formed.
    pub fn complete(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}

/// Where the session currently is in the lookup workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Editing,
    Submitted,
}

/// A user action, as reported by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectClass(String),
    SetValue(Decimal),
    SetDateRange(DateSelection),
    Submit,
    /// The exported result was handed to the user.
    DownloadCompleted,
    /// The user asked to clear the form.
    Reset,
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// A form field changed.
    Updated,
    /// The lookup ran and its result is cached.
    Submitted { matched: usize },
    /// Submit was refused because the date range is incomplete.
    InvalidDateRange,
    /// Submit was refused because no class is selected.
    NoClassSelected,
    /// A reset will be applied at the end of this cycle.
    ResetScheduled,
    /// The event does not apply in the current phase.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected_class: Option<String>,
    /// Consumption (kWh) or demand (kW), depending on the class.
    value: Decimal,
    requested_dates: DateSelection,
    /// Rows from the last submit, `None` until one has run.
    result: Option<Vec<RateRow>>,
    reset_pending: bool,
    phase: SessionPhase,
}

impl SelectionState {
    /// Fresh state for a session starting on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected_class: None,
            value: Decimal::ZERO,
            requested_dates: DateSelection::default_for(today),
            result: None,
            reset_pending: false,
            phase: SessionPhase::Idle,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected_class(&self) -> Option<&str> {
        self.selected_class.as_deref()
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn requested_dates(&self) -> DateSelection {
        self.requested_dates
    }

    /// Rows from the last submit, `None` until one has run.
    pub fn result(&self) -> Option<&[RateRow]> {
        self.result.as_deref()
    }

    /// A reset will be applied by the next [`end_cycle`](Self::end_cycle).
    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Metric gating the band lookup for the selected class.
    pub fn metric_type(&self) -> MetricType {
        self.selected_class
            .as_deref()
            .map(metric_for_class)
            .unwrap_or_default()
    }

    /// Applies one user action.
    pub fn handle_event(
        &mut self,
        table: &RateTable,
        event: Event,
    ) -> EventOutcome {
        debug!(?event, phase = ?self.phase, "handling event");

        match event {
            Event::SelectClass(customer_class) => {
                self.selected_class = Some(customer_class);
                self.edited()
            }
            Event::SetValue(value) => {
                self.value = value;
                self.edited()
            }
            Event::SetDateRange(dates) => {
                self.requested_dates = dates;
                self.edited()
            }
            Event::Submit => self.submit(table),
            Event::DownloadCompleted => {
                if self.phase != SessionPhase::Submitted {
                    debug!("download completed outside a submitted lookup, ignoring");
                    return EventOutcome::Ignored;
                }
                self.reset_pending = true;
                EventOutcome::ResetScheduled
            }
            Event::Reset => {
                self.reset_pending = true;
                EventOutcome::ResetScheduled
            }
        }
    }

    /// Finishes a render cycle, applying a pending reset.
    ///
    /// Returns `true` when the state was reset.
    pub fn end_cycle(
        &mut self,
        today: NaiveDate,
    ) -> bool {
        if !self.reset_pending {
            return false;
        }

        *self = Self::new(today);
        info!("selection reset");
        true
    }

    fn edited(&mut self) -> EventOutcome {
        self.phase = SessionPhase::Editing;
        EventOutcome::Updated
    }

    fn submit(
        &mut self,
        table: &RateTable,
    ) -> EventOutcome {
        let Some((start, end)) = self.requested_dates.complete() else {
            warn!(dates = ?self.requested_dates, "submit with incomplete date range");
            self.phase = SessionPhase::Editing;
            return EventOutcome::InvalidDateRange;
        };
        let Some(customer_class) = self.selected_class.as_deref() else {
            warn!("submit without a customer class");
            return EventOutcome::NoClassSelected;
        };

        let metric = metric_for_class(customer_class);
        let rows = filter(table, customer_class, self.value, metric, start, end);
        let matched = rows.len();

        info!(
            class = customer_class,
            %metric,
            value = %self.value,
            %start,
            %end,
            matched,
            "lookup submitted"
        );

        self.result = Some(rows);
        self.reset_pending = false;
        self.phase = SessionPhase::Submitted;
        EventOutcome::Submitted { matched }
    }
}
