//! Plain-text rendering for `--output text`.

use autosales_core::models::Dataset;
use autosales_data::report::Report;
use autosales_ui::table_view::{
    aggregate_header, aggregate_rows, aggregate_totals, raw_cells, raw_columns,
};

/// Lay out `header` and `rows` as aligned columns under a dashed rule.
/// The first column is left-aligned, the rest right-aligned.
pub fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .chain(std::iter::once(&header[i]))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(header));
    out.push('\n');
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// Every chart of `report` as a titled table with a totals row.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');
    out.push_str(&"=".repeat(report.title.chars().count()));
    out.push_str("\n\n");

    for chart in &report.charts {
        out.push_str(&chart.title);
        out.push('\n');
        if chart.aggregate.is_empty() {
            out.push_str("  (no data)\n\n");
            continue;
        }
        let mut rows = aggregate_rows(&chart.aggregate);
        rows.push(aggregate_totals(&chart.aggregate));
        out.push_str(&format_table(&aggregate_header(&chart.aggregate), &rows));
        out.push('\n');
    }
    out
}

/// All loaded records, one line each.
pub fn render_raw(dataset: &Dataset) -> String {
    let columns = raw_columns(dataset);
    let header: Vec<String> = columns
        .iter()
        .map(|f| f.column_name().to_string())
        .collect();
    let rows: Vec<Vec<String>> = dataset
        .records()
        .iter()
        .map(|r| raw_cells(r, &columns))
        .collect();
    format!("Raw Data\n{}", format_table(&header, &rows))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use autosales_core::models::{Field, Month, Record, Schema};
    use autosales_data::report::{ReportMode, ReportSelector};

    fn make_dataset() -> Dataset {
        let record = |year, vehicle_type: &str, sales, recession| Record {
            year,
            month: Month::Jan,
            vehicle_type: vehicle_type.to_string(),
            automobile_sales: sales,
            advertising_expenditure: sales,
            recession,
            unemployment_rate: 6.0,
            ..Default::default()
        };
        Dataset::from_records(vec![
            record(1980, "Sports", 100.0, true),
            record(1980, "Executivecar", 300.0, true),
            record(1981, "Sports", 200.0, false),
        ])
    }

    #[test]
    fn test_format_table_alignment() {
        let header = vec!["Type".to_string(), "Sales".to_string()];
        let rows = vec![
            vec!["Sports".to_string(), "1.00".to_string()],
            vec!["Suv".to_string(), "100.00".to_string()],
        ];
        let text = format_table(&header, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Type     Sales");
        assert_eq!(lines[1], "--------------");
        assert_eq!(lines[2], "Sports    1.00");
        assert_eq!(lines[3], "Suv     100.00");
    }

    #[test]
    fn test_render_report_yearly() {
        let dataset = make_dataset();
        let report =
            ReportSelector::build(&dataset, ReportMode::YearlyStatistics { year: 1980 }).unwrap();
        let text = render_report(&report);
        assert!(text.starts_with("Yearly Statistics for 1980\n"));
        assert!(text.contains("Annual Automobile Sales"));
        assert!(text.contains("Ad Spending Share in 1980"));
        assert!(text.contains("Mean Automobile_Sales"));
        assert!(text.contains("75.0%"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn test_render_report_marks_empty_charts() {
        let dataset = make_dataset();
        let report =
            ReportSelector::build(&dataset, ReportMode::YearlyStatistics { year: 1999 }).unwrap();
        let text = render_report(&report);
        assert!(text.contains("Vehicles Sold by Type in 1999\n  (no data)"));
    }

    #[test]
    fn test_render_raw_lists_schema_columns() {
        let dataset = Dataset::new(
            Schema::from_fields([Field::Year, Field::VehicleType]),
            make_dataset().records().to_vec(),
        );
        let text = render_raw(&dataset);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Raw Data");
        assert!(lines[1].starts_with("Year"));
        assert!(lines[1].contains("Vehicle_Type"));
        assert_eq!(lines.len(), 2 + 1 + 3);
    }
}
