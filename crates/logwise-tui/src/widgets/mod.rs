//! Ratatui widgets for the logwise TUI.

pub mod command_bar;
pub mod dashboard;
pub mod explain_panel;
pub mod help;
pub mod log_list;
pub mod search_bar;
pub mod severity_filter;
pub mod tab_bar;
pub mod volume_chart;

use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Lifecycle of one backend-backed piece of UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Human-readable failure; the page offers `r` to retry.
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    /// One-line banner for non-ready states, `None` once data is shown.
    pub fn banner(&self, theme: &Theme) -> Option<Line<'static>> {
        match self {
            FetchStatus::Idle | FetchStatus::Ready => None,
            FetchStatus::Loading => Some(Line::from(Span::styled("loading…", theme.status_loading))),
            FetchStatus::Failed(msg) => Some(Line::from(vec![
                Span::styled(format!("error: {msg}"), theme.status_error),
                Span::raw("  (r to retry)"),
            ])),
        }
    }
}

/// Cursor over a list whose length is owned elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub index: usize,
}

impl ListCursor {
    pub fn up(&mut self, step: usize) {
        self.index = self.index.saturating_sub(step);
    }

    pub fn down(&mut self, step: usize, len: usize) {
        self.index = (self.index + step).min(len.saturating_sub(1));
    }

    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }

    pub fn selected(&self, len: usize) -> Option<usize> {
        (self.index < len).then_some(self.index)
    }
}
