//! Charge history charts.
//!
//! Each y column becomes one line over the supply periods of the lookup
//! result. Blank cells are skipped, and a column with no values at all is
//! left out of the chart and its legend.

use std::ops::Range;

use chrono::{Days, NaiveDate};
use plotters::{coord::types::RangedDate, drawing::DrawingAreaErrorKind, prelude::*};
use rate_core::{CellValue, Column, RateRow};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use thiserror::Error;
use tracing::debug;

const CHART_SIZE: (u32, u32) = (1024, 600);

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("column '{0}' is not a date column and cannot be used as the x axis")]
    UnsupportedAxis(Column),

    #[error("no values to plot")]
    NoData,

    #[error("chart drawing failed: {0}")]
    Draw(String),
}

/// The points of one y column, ordered by x.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub column: Column,
    pub points: Vec<(NaiveDate, Decimal)>,
}

impl Series {
    pub fn first(&self) -> Option<(NaiveDate, Decimal)> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.points.last().copied()
    }

    pub fn min(&self) -> Option<Decimal> {
        self.points.iter().map(|(_, v)| *v).min()
    }

    pub fn max(&self) -> Option<Decimal> {
        self.points.iter().map(|(_, v)| *v).max()
    }
}

fn x_value(
    x: Column,
    row: &RateRow,
) -> Result<Option<NaiveDate>, ChartError> {
    match x.value(row) {
        CellValue::Date(date) => Ok(date),
        CellValue::Text(_) | CellValue::Number(_) => Err(ChartError::UnsupportedAxis(x)),
    }
}

/// Collects the non-empty series for `y`, in `y` order.
pub fn collect_series(
    rows: &[RateRow],
    x: Column,
    y: &[Column],
) -> Result<Vec<Series>, ChartError> {
    let mut xs = Vec::with_capacity(rows.len());
    for row in rows {
        xs.push(x_value(x, row)?);
    }

    let series = y
        .iter()
        .map(|&column| {
            let mut points: Vec<_> = rows
                .iter()
                .zip(&xs)
                .filter_map(|(row, date)| Some(((*date)?, column.number(row)?)))
                .collect();
            points.sort_by_key(|(date, _)| *date);
            Series { column, points }
        })
        .filter(|series| !series.points.is_empty())
        .collect();

    Ok(series)
}

fn x_range(series: &[Series]) -> Option<Range<NaiveDate>> {
    let dates = series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d));
    let first = dates.clone().min()?;
    let last = dates.max()?;
    let end = last.checked_add_days(Days::new(1)).unwrap_or(last);
    Some(first..end)
}

fn y_range(series: &[Series]) -> Range<f64> {
    let values = series
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|(_, v)| v.to_f64()));
    let (lo, hi) = values.fold((0f64, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let hi = if hi <= lo { lo + 1.0 } else { hi + (hi - lo) * 0.05 };
    lo..hi
}

fn draw(
    svg: &mut String,
    x: Column,
    x_range: Range<NaiveDate>,
    y_range: Range<f64>,
    series: &[Series],
) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    let root = SVGBackend::with_string(svg, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let ranged_date: RangedDate<NaiveDate> = x_range.into();
    let mut chart = ChartBuilder::on(&root)
        .margin(20i32)
        .x_label_area_size(30u32)
        .y_label_area_size(60u32)
        .build_cartesian_2d(ranged_date, y_range)?;
    chart
        .configure_mesh()
        .x_labels(10_usize)
        .x_desc(x.header())
        .x_label_formatter(&|date| date.format("%Y-%m").to_string())
        .draw()?;

    for (index, line) in series.iter().enumerate() {
        let colour = PALETTE[index % PALETTE.len()];
        let points: Vec<(NaiveDate, f64)> = line
            .points
            .iter()
            .filter_map(|(date, value)| Some((*date, value.to_f64()?)))
            .collect();
        chart
            .draw_series(LineSeries::new(points, colour))?
            .label(line.column.header())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Renders a line chart of `y` over `x` as an SVG document.
pub fn render_svg(
    rows: &[RateRow],
    x: Column,
    y: &[Column],
) -> Result<String, ChartError> {
    let series = collect_series(rows, x, y)?;
    let x_range = x_range(&series).ok_or(ChartError::NoData)?;
    let y_range = y_range(&series);

    let mut svg = String::new();
    draw(&mut svg, x, x_range, y_range, &series).map_err(|e| ChartError::Draw(e.to_string()))?;
    debug!(series = series.len(), bytes = svg.len(), "chart rendered");

    Ok(svg)
}
