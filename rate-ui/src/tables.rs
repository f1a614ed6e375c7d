use comfy_table::{Attribute, Cell, CellAlignment, Table, modifiers, presets};
use rate_core::{CellValue, Column, RateRow, RateTable, metric_for_class};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

fn cell(value: CellValue<'_>) -> Cell {
    match value {
        CellValue::Number(Some(_)) => Cell::new(value).set_alignment(CellAlignment::Right),
        CellValue::Number(None) | CellValue::Date(None) => {
            Cell::new(value).set_alignment(CellAlignment::Center).add_attribute(Attribute::Dim)
        }
        CellValue::Text(_) | CellValue::Date(Some(_)) => Cell::new(value),
    }
}

/// Lookup result as a table, one row per [`RateRow`], `columns` in order.
pub fn build_rate_table(
    rows: &[RateRow],
    columns: &[Column],
) -> Table {
    let mut table = new_table();
    table.set_header(columns.iter().map(|column| Cell::new(column.header())));
    for row in rows {
        table.add_row(columns.iter().map(|column| cell(column.value(row))));
    }
    table
}

/// Customer classes with their metric and row count.
pub fn build_classes_table(rate_table: &RateTable) -> Table {
    let mut table = new_table();
    table.set_header(vec!["#", "Customer Class", "Metric", "Rows"]);
    for (index, class) in rate_table.classes().iter().enumerate() {
        let metric = metric_for_class(class);
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(class),
            Cell::new(format!("{metric} ({})", metric.unit())),
            Cell::new(rate_table.rows_for(class).count()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
