//! Help popup: centred floating overlay listing all keybindings.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const BINDINGS: &[(&str, &str)] = &[
    ("q", "Close investigation / quit from dashboard"),
    ("Ctrl+c  /  :q!", "Quit"),
    ("1-9", "Switch tab"),
    ("Tab", "Cycle focus between panes"),
    ("↑ k  /  ↓ j", "Move selection"),
    ("PageUp / PageDown", "Move selection by a page"),
    ("g  /  G", "First / last entry"),
    ("Enter", "Start or resume session / expand log"),
    ("Space", "Toggle severity"),
    ("t", "Cycle time range"),
    ("r", "Refresh (retry after an error)"),
    ("/", "Search messages"),
    ("Escape", "Leave search / clear it"),
    ("e", "Explain selected log"),
    ("p", "Show / hide explanation panel"),
    (":", "Command line"),
    ("?", "Toggle this help popup"),
];

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = centered_rect(72, BINDINGS.len() as u16 + 2, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" logwise keybindings (? to close) ")
            .border_style(self.theme.border_focused);

        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<22}", key),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ])
            })
            .collect();

        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
