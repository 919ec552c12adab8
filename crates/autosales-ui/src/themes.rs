use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 light.  Anything else is treated as dark.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|val| val.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
        .map(|bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
        .unwrap_or(BackgroundType::Dark)
}

/// The sequential "Agsunset" palette, dark purple to pale yellow.
pub const AGSUNSET: [Color; 7] = [
    Color::Rgb(75, 41, 145),
    Color::Rgb(135, 44, 162),
    Color::Rgb(192, 54, 157),
    Color::Rgb(234, 79, 136),
    Color::Rgb(250, 120, 118),
    Color::Rgb(246, 169, 122),
    Color::Rgb(237, 217, 163),
];

/// ANSI-only stand-in for [`AGSUNSET`].
const CLASSIC_PALETTE: [Color; 7] = [
    Color::Blue,
    Color::Magenta,
    Color::LightMagenta,
    Color::Red,
    Color::LightRed,
    Color::Yellow,
    Color::LightYellow,
];

/// All styles used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub axis: Style,
    pub chart_title: Style,
    /// Series colours, cycled by index.
    pub palette: [Color; 7],

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).  The palette runs from the
    /// pale end so the first series stays readable on black.
    pub fn dark() -> Self {
        let mut palette = AGSUNSET;
        palette.reverse();
        Self {
            header: Style::default()
                .fg(Color::Rgb(250, 120, 118))
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            axis: Style::default().fg(Color::Gray),
            chart_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            palette,

            table_header: Style::default()
                .fg(Color::Rgb(246, 169, 122))
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Rgb(135, 44, 162))
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            axis: Style::default().fg(Color::DarkGray),
            chart_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            palette: AGSUNSET,

            table_header: Style::default()
                .fg(Color::Rgb(75, 41, 145))
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Basic 8-colour ANSI theme without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            axis: Style::default().fg(Color::Gray),
            chart_title: Style::default().fg(Color::White),
            palette: CLASSIC_PALETTE,

            table_header: Style::default().fg(Color::Magenta),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default().fg(Color::Yellow),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name.  Unknown names fall back to `auto_detect`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour of the `index`-th series, cycling through the palette.
    pub fn series_color(&self, index: usize) -> Color {
        self.palette[index % self.palette.len()]
    }

    pub fn series_style(&self, index: usize) -> Style {
        Style::default().fg(self.series_color(index))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
