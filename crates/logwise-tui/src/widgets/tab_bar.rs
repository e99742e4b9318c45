//! Tab bar widget: the strip of open pages at the top of the screen.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Tabs, Widget},
};

/// One entry in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLabel {
    pub title: String,
    /// A request for this tab is in flight.
    pub busy: bool,
}

/// Renders `n:title` labels; the active tab is highlighted and busy tabs get
/// a `…` suffix. Keybinding hints are right-aligned in the same row.
pub struct TabBar<'a> {
    tabs: &'a [TabLabel],
    active: usize,
    theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [TabLabel], active: usize, theme: &'a Theme) -> Self {
        Self { tabs, active, theme }
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<Line> = self
            .tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let busy = if tab.busy { " …" } else { "" };
                Line::from(format!(" {}:{}{} ", i + 1, tab.title, busy))
            })
            .collect();

        Tabs::new(labels)
            .select(self.active)
            .highlight_style(self.theme.border_focused.add_modifier(Modifier::REVERSED))
            .divider("")
            .render(area, buf);

        let hint = " q:close  ?:help ";
        let hint_x = area.right().saturating_sub(hint.len() as u16);
        buf.set_string(hint_x, area.y, hint, Style::default().add_modifier(Modifier::DIM));
    }
}
