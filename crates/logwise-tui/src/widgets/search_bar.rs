//! Search bar: free-text filter over the investigation's log list.
//!
//! The query is matched case-insensitively against short and full messages;
//! the volume chart is recomputed from the filtered list.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::widgets::command_bar::{next_boundary, prev_boundary};
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

#[derive(Debug, Default)]
pub struct SearchBarState {
    pub query: String,
    /// Byte offset of the cursor within `query`.
    pub cursor: usize,
}

impl SearchBarState {
    /// Apply an editing event. Returns `true` when the query text changed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Char(c) => {
                self.query.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                tracing::debug!(query = %self.query, "search: char inserted");
                true
            }
            AppEvent::Backspace => match prev_boundary(&self.query, self.cursor) {
                Some(prev) => {
                    self.query.remove(prev);
                    self.cursor = prev;
                    tracing::debug!(query = %self.query, "search: backspace");
                    true
                }
                None => false,
            },
            AppEvent::Nav(Direction::Left) => {
                if let Some(prev) = prev_boundary(&self.query, self.cursor) {
                    self.cursor = prev;
                }
                false
            }
            AppEvent::Nav(Direction::Right) => {
                self.cursor = next_boundary(&self.query, self.cursor);
                false
            }
            _ => false,
        }
    }

    /// Empty the query. Returns `true` if there was anything to clear.
    pub fn clear(&mut self) -> bool {
        let had_query = !self.query.is_empty();
        self.query.clear();
        self.cursor = 0;
        had_query
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct SearchBar<'a> {
    state: &'a SearchBarState,
    focused: bool,
    /// `(shown, total)` record counts for the right-hand hint.
    counts: (usize, usize),
    theme: &'a Theme,
}

impl<'a> SearchBar<'a> {
    pub fn new(state: &'a SearchBarState, focused: bool, counts: (usize, usize), theme: &'a Theme) -> Self {
        Self { state, focused, counts, theme }
    }

    /// Absolute terminal position of the text cursor within `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // Block borders put the text at (x+1, y+1).
        let col = self.state.query[..self.state.cursor].chars().count() as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(1));
        (x, area.y + 1)
    }
}

impl Widget for SearchBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (shown, total) = self.counts;
        let block = Block::bordered()
            .title("Search")
            .title_bottom(Line::from(format!(" {shown}/{total} ")).right_aligned())
            .border_style(self.theme.border(self.focused));

        let line = if self.state.query.is_empty() && !self.focused {
            Line::from(Span::styled(
                "press / to search messages",
                Style::default().add_modifier(Modifier::DIM),
            ))
        } else {
            Line::from(self.state.query.as_str())
        };
        Paragraph::new(line).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_report_changes() {
        let mut s = SearchBarState::default();
        assert!(s.handle(&AppEvent::Char('e')));
        assert!(s.handle(&AppEvent::Char('r')));
        assert!(!s.handle(&AppEvent::Nav(Direction::Left)));
        assert!(s.handle(&AppEvent::Backspace));
        assert_eq!(s.query, "r");
        assert!(!s.handle(&AppEvent::Backspace));
        assert_eq!(s.query, "r");
    }

    #[test]
    fn clear_reports_whether_anything_changed() {
        let mut s = SearchBarState::default();
        assert!(!s.clear());
        s.handle(&AppEvent::Char('x'));
        assert!(s.clear());
        assert_eq!(s.cursor, 0);
    }
}
