use autosales_core::formatting::format_number;
use autosales_data::report::ReportMode;
use ratatui::text::{Line, Span};

use crate::themes::Theme;

/// Dashboard title.
pub const TITLE: &str = "AUTOMOBILE SALES STATISTICS DASHBOARD";

/// Dashboard header rendering four lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Mode, selected year and record count in `[ mode | year | n records ]`
///    format.  Recession mode shows `all years`.
/// 4. An empty line.
pub struct Header<'a> {
    pub mode: ReportMode,
    /// Number of records in the loaded dataset.
    pub records: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(mode: ReportMode, records: usize, theme: &'a Theme) -> Self {
        Self {
            mode,
            records,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let year = match self.mode.year() {
            Some(year) => year.to_string(),
            None => "all years".to_string(),
        };
        let records = format!("{} records", format_number(self.records as f64, 0));

        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.mode.label().to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(year, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(records, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
