//! Chart panels for the dashboard grid.
//!
//! Each [`ReportChart`] is drawn according to its [`ChartKind`]: series over
//! an ordinal key become a braille line chart, categorical breakdowns a bar
//! chart, and part-of-whole charts a list of share bars.

use ratatui::{
    layout::{Direction, Rect},
    symbols,
    text::{Line, Span, Text},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset as Series, GraphType,
        Paragraph,
    },
    Frame,
};

use autosales_core::formatting::{format_compact, format_number};
use autosales_data::aggregator::Aggregate;
use autosales_data::report::{ChartKind, ReportChart};

use crate::components::share_bar::{truncate_to_width, ShareBar, ShareBarConfig};
use crate::themes::Theme;

/// Draw `chart` into `area`, falling back to a placeholder when the
/// aggregate has no rows.
pub fn render_chart(frame: &mut Frame, area: Rect, chart: &ReportChart, theme: &Theme) {
    if chart.aggregate.is_empty() {
        render_empty_chart(frame, area, &chart.title, theme);
        return;
    }
    match chart.kind {
        ChartKind::Line => {
            let points = line_points(&chart.aggregate);
            if points.is_empty() {
                render_empty_chart(frame, area, &chart.title, theme);
            } else {
                render_line(frame, area, chart, &points, theme);
            }
        }
        ChartKind::Bar => render_bars(frame, area, chart, theme),
        ChartKind::Pie => render_shares(frame, area, chart, theme),
    }
}

fn chart_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(Span::styled(format!(" {title} "), theme.chart_title))
}

// ── Line ──────────────────────────────────────────────────────────────────────

/// Plottable `(x, y)` points of a single-key aggregate.  Rows with a
/// categorical key or a non-finite value are skipped.
pub fn line_points(aggregate: &Aggregate) -> Vec<(f64, f64)> {
    aggregate
        .rows
        .iter()
        .filter_map(|row| {
            let x = row.key().as_f64()?;
            row.value.is_finite().then_some((x, row.value))
        })
        .collect()
}

/// Axis bounds enclosing `points`.  The y axis starts at zero unless values
/// go negative and leaves 10% headroom.  Degenerate ranges are widened by
/// one unit so the chart never divides by zero.
pub fn axis_bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (0.0f64, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if points.is_empty() {
        return ([0.0, 1.0], [0.0, 1.0]);
    }
    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let y_top = if y_max > y_min {
        y_max + (y_max - y_min) * 0.1
    } else {
        y_min + 1.0
    };
    ([x_min, x_max], [y_min, y_top])
}

fn render_line(
    frame: &mut Frame,
    area: Rect,
    chart: &ReportChart,
    points: &[(f64, f64)],
    theme: &Theme,
) {
    let aggregate = &chart.aggregate;
    let ([x_min, x_max], [y_min, y_max]) = axis_bounds(points);

    // Label the first, middle and last keys by their display form.
    let rows = &aggregate.rows;
    let mut x_labels = vec![rows[0].label()];
    if rows.len() > 2 {
        x_labels.push(rows[rows.len() / 2].label());
    }
    if rows.len() > 1 {
        x_labels.push(rows[rows.len() - 1].label());
    }
    let y_labels = vec![
        format_compact(y_min),
        format_compact((y_min + y_max) / 2.0),
        format_compact(y_max),
    ];

    let x_title = aggregate
        .keys
        .first()
        .map(|f| f.column_name().to_string())
        .unwrap_or_default();

    let series = Series::default()
        .name(aggregate.measure.column_name())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.series_style(0))
        .data(points);

    let widget = Chart::new(vec![series])
        .block(chart_block(&chart.title, theme))
        .x_axis(
            Axis::default()
                .title(Span::styled(x_title, theme.axis))
                .style(theme.axis)
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(widget, area);
}

// ── Bar ───────────────────────────────────────────────────────────────────────

/// Bar magnitude for a reduced value.  Bars cannot go negative or carry
/// fractions; the exact value is shown as the bar text.
fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Column width per bar so `count` bars with one-column gaps fit `width`.
pub fn bar_width_for(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let count = count.min(u16::MAX as usize) as u16;
    let gaps = count.saturating_sub(1);
    (width.saturating_sub(gaps) / count).clamp(1, 12)
}

fn render_bars(frame: &mut Frame, area: Rect, chart: &ReportChart, theme: &Theme) {
    let aggregate = &chart.aggregate;
    // Pair groupings produce many short bars; lay them out horizontally so
    // every label stays readable.
    let horizontal = aggregate.keys.len() > 1;
    let inner_width = area.width.saturating_sub(2);
    let width = if horizontal {
        1
    } else {
        bar_width_for(inner_width, aggregate.len())
    };

    let bars: Vec<Bar> = aggregate
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let label = if horizontal {
                row.label()
            } else {
                truncate_to_width(&row.label(), width as usize)
            };
            Bar::default()
                .value(bar_height(row.value))
                .label(Line::from(label))
                .text_value(format_compact(row.value))
                .style(theme.series_style(i))
                .value_style(theme.value)
        })
        .collect();

    let mut widget = BarChart::default()
        .block(chart_block(&chart.title, theme))
        .bar_width(width)
        .bar_gap(if horizontal { 0 } else { 1 })
        .data(BarGroup::default().bars(&bars));
    if horizontal {
        widget = widget.direction(Direction::Horizontal);
    }

    frame.render_widget(widget, area);
}

// ── Shares ────────────────────────────────────────────────────────────────────

/// One share bar per row, from [`Aggregate::shares`].
pub fn share_lines<'a>(aggregate: &Aggregate, theme: &'a Theme, width: u16) -> Vec<Line<'a>> {
    let shares = aggregate.shares();
    if shares.is_empty() || !aggregate.total().is_finite() {
        return vec![Line::from(Span::styled(
            format!("Total {} is zero", aggregate.measure),
            theme.warning,
        ))];
    }
    // Reserve label and suffix columns; the rest goes to the bar.
    let bar_width = width.saturating_sub(14 + 16).max(4);
    aggregate
        .rows
        .iter()
        .zip(shares)
        .enumerate()
        .map(|(i, (row, share))| {
            ShareBar::new(row.label(), share, row.value, theme.series_style(i), theme)
                .with_config(ShareBarConfig {
                    width: bar_width,
                    ..ShareBarConfig::default()
                })
                .to_line()
        })
        .collect()
}

fn render_shares(frame: &mut Frame, area: Rect, chart: &ReportChart, theme: &Theme) {
    let mut lines = share_lines(&chart.aggregate, theme, area.width.saturating_sub(2));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Total ", theme.label),
        Span::styled(format_number(chart.aggregate.total(), 2), theme.value),
    ]));
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(chart_block(&chart.title, theme)),
        area,
    );
}

// ── Placeholder ───────────────────────────────────────────────────────────────

/// Titled panel explaining that the selection produced no rows.
pub fn render_empty_chart(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data for this selection", theme.warning)),
        Line::from(Span::styled("Try another year or mode.", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(chart_block(title, theme)),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
