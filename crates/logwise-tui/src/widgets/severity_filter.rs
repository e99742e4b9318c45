//! Severity filter widget: a checkbox list of the eight severities.
//!
//! # Navigation
//! - `↑`/`k` and `↓`/`j` move the cursor.
//! - `Space` or `Enter` toggles the severity under the cursor.
//!
//! No ticked severity means "every severity" (one unfiltered request).

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use logwise_core::Severity;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityFilterState {
    selected: [bool; Severity::ALL.len()],
    /// Index into [`Severity::ALL`].
    pub cursor: usize,
}

impl SeverityFilterState {
    pub fn with_selected(severities: &[Severity]) -> Self {
        let mut state = Self::default();
        for s in severities {
            state.selected[s.index()] = true;
        }
        state
    }

    pub fn is_selected(&self, severity: Severity) -> bool {
        self.selected[severity.index()]
    }

    /// Ticked severities in scale order.
    pub fn selected(&self) -> Vec<Severity> {
        Severity::ALL
            .into_iter()
            .filter(|s| self.is_selected(*s))
            .collect()
    }

    pub fn toggle(&mut self, severity: Severity) {
        let slot = &mut self.selected[severity.index()];
        *slot = !*slot;
        tracing::debug!(%severity, selected = *slot, "severity filter toggled");
    }

    /// Handle an [`AppEvent`]. Returns `true` when the selection changed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            AppEvent::Nav(Direction::Down) => {
                self.cursor = (self.cursor + 1).min(Severity::ALL.len() - 1);
                false
            }
            AppEvent::Toggle | AppEvent::Enter => {
                self.toggle(Severity::ALL[self.cursor]);
                true
            }
            _ => false,
        }
    }

    /// Short summary for headers, e.g. `ERROR, WARNING` or `all`.
    pub fn summary(&self) -> String {
        let selected = self.selected();
        if selected.is_empty() {
            "all".to_string()
        } else {
            selected.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct SeverityFilter<'a> {
    state: &'a SeverityFilterState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> SeverityFilter<'a> {
    pub fn new(state: &'a SeverityFilterState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }
}

impl Widget for SeverityFilter<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Severity")
            .border_style(self.theme.border(self.focused));

        let lines: Vec<Line> = Severity::ALL
            .iter()
            .enumerate()
            .map(|(i, severity)| {
                let mark = if self.state.is_selected(*severity) { "[x] " } else { "[ ] " };
                let mut line = Line::from(vec![
                    Span::raw(mark),
                    Span::styled(severity.as_str(), self.theme.level_style(Some(*severity))),
                ]);
                if self.focused && i == self.state.cursor {
                    line = line.patch_style(Style::default().add_modifier(Modifier::REVERSED));
                }
                line
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
