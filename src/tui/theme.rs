use ratatui::style::Color;

use crate::io::state::ThemeMode;
use crate::model::config::UiConfig;
use crate::model::task::TaskStatus;

/// Parsed color theme for the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub selection_bg: Color,
    /// Filled share of a progress or timeline bar
    pub bar_fill: Color,
    /// Remaining share of a bar
    pub bar_empty: Color,
    /// Bar cells past the hard deadline
    pub overdue: Color,
    pub today_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            bar_fill: Color::Rgb(0x44, 0xDD, 0xFF),
            bar_empty: Color::Rgb(0x44, 0x3C, 0x7A),
            overdue: Color::Rgb(0xFF, 0x44, 0x44),
            today_bg: Color::Rgb(0x24, 0x10, 0x40),
        }
    }

    pub fn light() -> Self {
        Theme {
            background: Color::Rgb(0xFA, 0xF8, 0xF5),
            text: Color::Rgb(0x3A, 0x36, 0x4F),
            text_bright: Color::Rgb(0x10, 0x0C, 0x20),
            highlight: Color::Rgb(0xC2, 0x18, 0x5B),
            dim: Color::Rgb(0x8A, 0x86, 0x99),
            red: Color::Rgb(0xD3, 0x2F, 0x2F),
            yellow: Color::Rgb(0xB2, 0x86, 0x00),
            green: Color::Rgb(0x2E, 0x7D, 0x32),
            cyan: Color::Rgb(0x00, 0x83, 0x8F),
            purple: Color::Rgb(0x7B, 0x1F, 0xA2),
            selection_bg: Color::Rgb(0xE8, 0xDD, 0xF5),
            bar_fill: Color::Rgb(0x19, 0x76, 0xD2),
            bar_empty: Color::Rgb(0xC5, 0xCA, 0xE9),
            overdue: Color::Rgb(0xD3, 0x2F, 0x2F),
            today_bg: Color::Rgb(0xFF, 0xF3, 0xC4),
        }
    }

    /// The palette for `mode` with `[ui.colors]` overrides applied on top
    pub fn from_config(mode: ThemeMode, ui: &UiConfig) -> Self {
        let mut theme = match mode {
            ThemeMode::Light => Theme::light(),
            ThemeMode::Dark => Theme::dark(),
        };

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::debug!(key = %key, value = %value, "ignoring unparseable color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "cyan" => theme.cyan = color,
                "purple" => theme.purple = color,
                "selection_bg" => theme.selection_bg = color,
                "bar_fill" => theme.bar_fill = color,
                "bar_empty" => theme.bar_empty = color,
                "overdue" => theme.overdue = color,
                "today_bg" => theme.today_bg = color,
                _ => {}
            }
        }

        theme
    }

    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Inbox => self.purple,
            TaskStatus::Ongoing => self.highlight,
            TaskStatus::Completed => self.green,
            TaskStatus::Archived => self.dim,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::light()
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
