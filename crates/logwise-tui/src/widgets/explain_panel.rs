//! Explanation panel: the backend's natural-language reading of one log.

use logwise_client::RequestSequencer;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::theme::Theme;
use crate::widgets::FetchStatus;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ExplainState {
    pub visible: bool,
    pub status: FetchStatus,
    /// Short message of the log being explained.
    pub subject: Option<String>,
    pub explanation: Option<String>,
    seq: RequestSequencer,
}

impl ExplainState {
    /// Start explaining `subject`; returns the request's sequence tag.
    pub fn begin(&mut self, subject: String) -> u64 {
        self.visible = true;
        self.status = FetchStatus::Loading;
        self.subject = Some(subject);
        self.explanation = None;
        self.seq.issue()
    }

    /// Apply a finished request. Returns `false` (and changes nothing) when a
    /// newer request was started since `seq` was issued.
    pub fn finish(&mut self, seq: u64, result: Result<String, String>) -> bool {
        if !self.seq.is_current(seq) {
            tracing::warn!(seq, latest = self.seq.latest(), "stale explanation discarded");
            return false;
        }
        match result {
            Ok(text) => {
                self.explanation = Some(text);
                self.status = FetchStatus::Ready;
            }
            Err(msg) => self.status = FetchStatus::Failed(msg),
        }
        true
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct ExplainPanel<'a> {
    state: &'a ExplainState,
    theme: &'a Theme,
}

impl<'a> ExplainPanel<'a> {
    pub fn new(state: &'a ExplainState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let dim = Style::default().add_modifier(Modifier::DIM);
        let mut lines = Vec::new();
        match &self.state.subject {
            Some(subject) => lines.push(Line::from(Span::styled(subject.clone(), dim))),
            None => lines.push(Line::from(Span::styled("select a log and press e", dim))),
        }
        match &self.state.status {
            FetchStatus::Loading => {
                lines.push(Line::from(Span::styled("asking the backend…", self.theme.status_loading)));
            }
            FetchStatus::Failed(msg) => lines.push(Line::from(vec![
                Span::styled(format!("error: {msg}"), self.theme.status_error),
                Span::raw("  (e to retry)"),
            ])),
            FetchStatus::Idle | FetchStatus::Ready => {}
        }
        if let Some(text) = &self.state.explanation {
            lines.push(Line::default());
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
        }
        lines
    }
}

impl Widget for ExplainPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Explanation")
            .border_style(self.theme.border_unfocused);
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
