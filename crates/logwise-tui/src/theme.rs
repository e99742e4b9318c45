//! Colour theme for the logwise TUI.
//!
//! Themes are TOML files embedded in the binary via [`include_str!`], so the
//! application works without any files on disk. [`Theme::builtin`] resolves a
//! theme by name (`default`, `gruvbox`).

use anyhow::{bail, Context};
use config::{Config, File, FileFormat};
use logwise_core::Severity;
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

/// Names accepted by [`Theme::builtin`].
pub const THEME_NAMES: &[&str] = &["default", "gruvbox"];

// ---------------------------------------------------------------------------
// Raw (serde) types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underlined: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.underlined {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawLevels {
    debug: RawStyle,
    info: RawStyle,
    notice: RawStyle,
    warning: RawStyle,
    error: RawStyle,
    critical: RawStyle,
    alert: RawStyle,
    emergency: RawStyle,
    /// Records whose severity is outside the known scale.
    #[serde(default)]
    unknown: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    command_bar: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawSearch {
    highlight: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    error: RawStyle,
    loading: RawStyle,
    header: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawChart {
    /// Bar colour for empty buckets.
    empty: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    levels: RawLevels,
    borders: RawBorders,
    search: RawSearch,
    status: RawStatus,
    chart: RawChart,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Application colour theme with every style pre-resolved.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed by [`Severity::index`].
    levels: [Style; Severity::ALL.len()],
    pub level_unknown: Style,

    pub border_focused: Style,
    pub border_command_bar: Style,
    pub border_unfocused: Style,

    /// Inline highlight applied to search matches in the log list.
    pub search_highlight: Style,

    pub status_error: Style,
    pub status_loading: Style,
    pub header: Style,

    pub chart_empty: Style,
}

impl Theme {
    /// Resolve an embedded theme by name.
    pub fn builtin(name: &str) -> anyhow::Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Self::from_toml_str(DEFAULT_THEME_SRC).context("embedded default theme"),
            "gruvbox" | "gruvbox_dark" | "gruvbox-dark" => {
                Self::from_toml_str(GRUVBOX_DARK_THEME_SRC).context("embedded gruvbox theme")
            }
            other => bail!("unknown theme {other:?} (expected one of: {})", THEME_NAMES.join(", ")),
        }
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        let l = raw.levels;
        Ok(Self {
            levels: [
                l.debug.into_style(),
                l.info.into_style(),
                l.notice.into_style(),
                l.warning.into_style(),
                l.error.into_style(),
                l.critical.into_style(),
                l.alert.into_style(),
                l.emergency.into_style(),
            ],
            level_unknown: l.unknown.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_command_bar: raw.borders.command_bar.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            search_highlight: raw.search.highlight.into_style(),
            status_error: raw.status.error.into_style(),
            status_loading: raw.status.loading.into_style(),
            header: raw.status.header.into_style(),
            chart_empty: raw.chart.empty.into_style(),
        })
    }

    pub fn level_style(&self, severity: Option<Severity>) -> Style {
        match severity {
            Some(s) => self.levels[s.index()],
            None => self.level_unknown,
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts named terminal colours (case-insensitive), `#rrggbb`, and
/// `indexed:N`.
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
