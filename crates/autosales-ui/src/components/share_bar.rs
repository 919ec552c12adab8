use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use autosales_core::formatting::{format_compact, format_percent};

use crate::themes::Theme;

/// Visual configuration of a share bar.
pub struct ShareBarConfig {
    /// Columns reserved for the category label.
    pub label_width: usize,
    /// Columns of the bar itself.
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ShareBarConfig {
    fn default() -> Self {
        Self {
            label_width: 14,
            width: 20,
            filled_char: '\u{2588}', // █
            empty_char: '\u{2591}',  // ░
        }
    }
}

/// One slice of a part-of-whole chart, drawn as a horizontal bar:
///
/// `Sports         ██████░░░░░░░░░░░░░░ 31.2% (4.5K)`
pub struct ShareBar<'a> {
    pub label: String,
    /// Share of the whole in percent, clamped to `[0, 100]` when drawn.
    pub percentage: f64,
    /// Absolute value behind the share.
    pub value: f64,
    pub style: Style,
    pub theme: &'a Theme,
    pub config: ShareBarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(
        label: impl Into<String>,
        percentage: f64,
        value: f64,
        style: Style,
        theme: &'a Theme,
    ) -> Self {
        Self {
            label: label.into(),
            percentage,
            value,
            style,
            theme,
            config: ShareBarConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ShareBarConfig) -> Self {
        self.config = config;
        self
    }

    pub fn to_line(&self) -> Line<'a> {
        let pct = if self.percentage.is_finite() {
            self.percentage.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let filled = ((pct / 100.0) * self.config.width as f64).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        Line::from(vec![
            Span::styled(
                pad_to_width(&self.label, self.config.label_width),
                self.theme.label,
            ),
            Span::styled(filled_str, self.style),
            Span::styled(empty_str, self.theme.dim),
            Span::styled(
                format!(
                    " {} ({})",
                    format_percent(self.percentage),
                    format_compact(self.value)
                ),
                self.theme.value,
            ),
        ])
    }
}

/// Truncate `text` to at most `width` display columns, marking a cut with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Truncate or right-pad `text` to exactly `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = truncate_to_width(text, width);
    let used = UnicodeWidthStr::width(out.as_str());
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_share_bar_fill_proportional() {
        let theme = Theme::dark();
        let bar = ShareBar::new("Sports", 25.0, 100.0, theme.series_style(0), &theme);
        let line = bar.to_line();
        assert_eq!(line.spans.len(), 4);
        assert_eq!(line.spans[1].content.chars().count(), 5);
        assert_eq!(line.spans[2].content.chars().count(), 15);
    }

    #[test]
    fn test_share_bar_label_and_suffix() {
        let theme = Theme::dark();
        let bar = ShareBar::new("Sports", 50.0, 4500.0, theme.series_style(1), &theme);
        let text = line_text(&bar.to_line());
        assert!(text.starts_with("Sports        "), "got: {text}");
        assert!(text.ends_with(" 50.0% (4.5K)"), "got: {text}");
    }

    #[test]
    fn test_share_bar_clamps_out_of_range() {
        let theme = Theme::dark();
        let over = ShareBar::new("a", 150.0, 1.0, theme.series_style(0), &theme).to_line();
        assert_eq!(over.spans[1].content.chars().count(), 20);
        assert!(over.spans[2].content.is_empty());

        let nan = ShareBar::new("b", f64::NAN, 1.0, theme.series_style(0), &theme).to_line();
        assert!(nan.spans[1].content.is_empty());
        assert_eq!(nan.spans[2].content.chars().count(), 20);
    }

    #[test]
    fn test_share_bar_custom_config() {
        let theme = Theme::dark();
        let bar = ShareBar::new("x", 100.0, 1.0, theme.series_style(0), &theme).with_config(
            ShareBarConfig {
                label_width: 4,
                width: 8,
                filled_char: '#',
                empty_char: '.',
            },
        );
        let line = bar.to_line();
        assert_eq!(line.spans[0].content, "x   ");
        assert_eq!(line.spans[1].content, "########");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Sports", 10), "Sports");
        assert_eq!(truncate_to_width("Executivecar", 6), "Execu…");
        assert_eq!(truncate_to_width("abc", 0), "");
        // Wide glyphs count as two columns.
        assert_eq!(truncate_to_width("車車車", 4), "車…");
    }

    #[test]
    fn test_pad_to_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc…");
    }
}
