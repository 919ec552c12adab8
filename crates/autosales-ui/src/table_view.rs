//! Tabular views: one aggregate per table, plus the raw record listing.
//!
//! The cell builders are plain functions returning strings so the same
//! rows back both the TUI tables and the plain-text report.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use autosales_core::formatting::{format_number, format_percent};
use autosales_core::models::{Dataset, Field, Record};
use autosales_data::aggregator::{Aggregate, Reducer};

use crate::themes::Theme;

// ── Cell builders ─────────────────────────────────────────────────────────────

/// Column headings: one per key field, then the reduced measure, the record
/// count and the share of the total.
pub fn aggregate_header(aggregate: &Aggregate) -> Vec<String> {
    let mut header: Vec<String> = aggregate
        .keys
        .iter()
        .map(|f| f.column_name().to_string())
        .collect();
    let reducer = match aggregate.reducer {
        Reducer::Mean => "Mean",
        Reducer::Sum => "Sum",
    };
    header.push(format!("{reducer} {}", aggregate.measure));
    header.push("Records".to_string());
    header.push("Share".to_string());
    header
}

/// Formatted cells for every aggregate row, aligned with
/// [`aggregate_header`].  Shares are blank when the total is zero.
pub fn aggregate_rows(aggregate: &Aggregate) -> Vec<Vec<String>> {
    let shares = aggregate.shares();
    aggregate
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells: Vec<String> = row.keys.iter().map(ToString::to_string).collect();
            cells.push(format_number(row.value, 2));
            cells.push(format_number(row.count as f64, 0));
            cells.push(shares.get(i).map(|s| format_percent(*s)).unwrap_or_default());
            cells
        })
        .collect()
}

/// Totals row.  A sum of means is meaningless, so the value column is only
/// filled for sum reductions.
pub fn aggregate_totals(aggregate: &Aggregate) -> Vec<String> {
    let mut cells = vec![String::new(); aggregate.keys.len()];
    if let Some(first) = cells.first_mut() {
        *first = "TOTAL".to_string();
    }
    cells.push(match aggregate.reducer {
        Reducer::Sum => format_number(aggregate.total(), 2),
        Reducer::Mean => "-".to_string(),
    });
    let records: usize = aggregate.rows.iter().map(|r| r.count).sum();
    cells.push(format_number(records as f64, 0));
    cells.push(format_percent(100.0));
    cells
}

/// Fields of `dataset` in canonical column order.
pub fn raw_columns(dataset: &Dataset) -> Vec<Field> {
    dataset.schema().fields().collect()
}

/// Cells of one record for the given columns.
pub fn raw_cells(record: &Record, columns: &[Field]) -> Vec<String> {
    columns
        .iter()
        .map(|f| f.key_value(record).to_string())
        .collect()
}

// ── Render ────────────────────────────────────────────────────────────────────

fn column_widths(header: &[String], rows: &[Vec<String>]) -> Vec<Constraint> {
    (0..header.len())
        .map(|i| {
            let widest = rows
                .iter()
                .filter_map(|r| r.get(i))
                .chain(std::iter::once(&header[i]))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0);
            Constraint::Length(widest.min(24) as u16 + 1)
        })
        .collect()
}

/// Render `aggregate` as a bordered table titled `title`, with a
/// highlighted totals row at the bottom.
pub fn render_aggregate_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    aggregate: &Aggregate,
    theme: &Theme,
) {
    if aggregate.is_empty() {
        render_no_data(frame, area, title, theme);
        return;
    }

    let header_cells = aggregate_header(aggregate);
    let rows = aggregate_rows(aggregate);
    let totals = aggregate_totals(aggregate);
    let widths = column_widths(&header_cells, &rows);

    let header = Row::new(
        header_cells
            .iter()
            .map(|h| Cell::from(h.clone()).style(theme.table_header)),
    )
    .height(1);

    let mut all_rows: Vec<Row> = rows
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(cells.into_iter().map(Cell::from)).style(style)
        })
        .collect();
    all_rows.push(Row::new(totals.into_iter().map(Cell::from)).style(theme.table_total));

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {title} ")),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the loaded records starting at `offset`, as many as fit.
pub fn render_raw_data(
    frame: &mut Frame,
    area: Rect,
    dataset: &Dataset,
    offset: usize,
    theme: &Theme,
) {
    if dataset.is_empty() {
        render_no_data(frame, area, "Raw Data", theme);
        return;
    }

    let columns = raw_columns(dataset);
    let header_cells: Vec<String> = columns
        .iter()
        .map(|f| f.column_name().to_string())
        .collect();

    // Borders plus header take three lines.
    let visible = area.height.saturating_sub(3) as usize;
    let start = offset.min(dataset.len().saturating_sub(1));
    let rows: Vec<Vec<String>> = dataset
        .records()
        .iter()
        .skip(start)
        .take(visible)
        .map(|r| raw_cells(r, &columns))
        .collect();
    let widths = column_widths(&header_cells, &rows);

    let header = Row::new(
        header_cells
            .into_iter()
            .map(|h| Cell::from(h).style(theme.table_header)),
    );
    let body: Vec<Row> = rows
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            let style = if (start + i) % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(cells.into_iter().map(Cell::from)).style(style)
        })
        .collect();

    let title = format!(
        " Raw Data ({}-{} of {}) ",
        start + 1,
        (start + visible).min(dataset.len()),
        format_number(dataset.len() as f64, 0)
    );
    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder in a panel titled `title`.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data for this selection", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} ")),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use autosales_core::models::{GroupKey, Month};
    use autosales_data::aggregator::AggregateRow;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn make_aggregate(reducer: Reducer) -> Aggregate {
        Aggregate {
            keys: vec![Field::VehicleType],
            measure: Field::AdvertisingExpenditure,
            reducer,
            rows: vec![
                AggregateRow {
                    keys: vec![GroupKey::Text("Sports".into())],
                    value: 1500.0,
                    count: 3,
                },
                AggregateRow {
                    keys: vec![GroupKey::Text("Mediumfamilycar".into())],
                    value: 500.0,
                    count: 2,
                },
            ],
        }
    }

    fn make_dataset(n: usize) -> Dataset {
        Dataset::from_records(
            (0..n)
                .map(|i| Record {
                    year: 1980 + i as i32,
                    month: Month::Mar,
                    vehicle_type: "Sports".into(),
                    automobile_sales: i as f64,
                    ..Default::default()
                })
                .collect(),
        )
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Cell builders ─────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_header() {
        assert_eq!(
            aggregate_header(&make_aggregate(Reducer::Sum)),
            vec![
                "Vehicle_Type",
                "Sum Advertising_Expenditure",
                "Records",
                "Share"
            ]
        );
        assert_eq!(
            aggregate_header(&make_aggregate(Reducer::Mean))[1],
            "Mean Advertising_Expenditure"
        );
    }

    #[test]
    fn test_aggregate_rows_formatting() {
        let rows = aggregate_rows(&make_aggregate(Reducer::Sum));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Sports", "1,500.00", "3", "75.0%"]);
        assert_eq!(rows[1], vec!["Mediumfamilycar", "500.00", "2", "25.0%"]);
    }

    #[test]
    fn test_aggregate_totals_sum() {
        let totals = aggregate_totals(&make_aggregate(Reducer::Sum));
        assert_eq!(totals, vec!["TOTAL", "2,000.00", "5", "100.0%"]);
    }

    #[test]
    fn test_aggregate_totals_mean_has_no_value() {
        let totals = aggregate_totals(&make_aggregate(Reducer::Mean));
        assert_eq!(totals[1], "-");
    }

    #[test]
    fn test_aggregate_rows_zero_total_leaves_share_blank() {
        let mut agg = make_aggregate(Reducer::Sum);
        for row in &mut agg.rows {
            row.value = 0.0;
        }
        let rows = aggregate_rows(&agg);
        assert_eq!(rows[0], vec!["Sports", "0.00", "3", ""]);
    }

    #[test]
    fn test_raw_columns_follow_schema() {
        let dataset = Dataset::new(
            autosales_core::models::Schema::from_fields([Field::City, Field::Year]),
            vec![Record {
                year: 1999,
                city: "Georgia".into(),
                ..Default::default()
            }],
        );
        let columns = raw_columns(&dataset);
        assert_eq!(columns, vec![Field::Year, Field::City]);
        assert_eq!(
            raw_cells(&dataset.records()[0], &columns),
            vec!["1999", "Georgia"]
        );
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_aggregate_table_shows_rows() {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        let theme = Theme::dark();
        let agg = make_aggregate(Reducer::Sum);
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_aggregate_table(frame, area, "Ad Spending Share", &agg, &theme);
            })
            .unwrap();
        let text = screen(&terminal);
        assert!(text.contains("Ad Spending Share"));
        assert!(text.contains("Sports"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn test_render_aggregate_table_empty_shows_placeholder() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::dark();
        let mut agg = make_aggregate(Reducer::Mean);
        agg.rows.clear();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_aggregate_table(frame, area, "Empty", &agg, &theme);
            })
            .unwrap();
        assert!(screen(&terminal).contains("No data for this selection"));
    }

    #[test]
    fn test_render_raw_data_window() {
        let mut terminal = Terminal::new(TestBackend::new(200, 8)).unwrap();
        let theme = Theme::dark();
        let dataset = make_dataset(20);
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_raw_data(frame, area, &dataset, 10, &theme);
            })
            .unwrap();
        let text = screen(&terminal);
        assert!(text.contains("Raw Data (11-15 of 20)"), "got: {text}");
        assert!(text.contains("1990"));
        assert!(!text.contains("1989"));
    }

    #[test]
    fn test_render_raw_data_offset_past_end_is_clamped() {
        let mut terminal = Terminal::new(TestBackend::new(200, 8)).unwrap();
        let theme = Theme::dark();
        let dataset = make_dataset(3);
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_raw_data(frame, area, &dataset, 99, &theme);
            })
            .unwrap();
        assert!(screen(&terminal).contains("Raw Data (3-3 of 3)"));
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, "Raw Data", &theme);
            })
            .unwrap();
    }
}
