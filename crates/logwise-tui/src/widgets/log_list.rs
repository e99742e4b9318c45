//! Log list widget: the investigation's newest-first record list, plus the
//! detail view shown when a record is expanded.
//!
//! # Navigation (when pane is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k`, `↓` / `j` | Move the selection |
//! | `PageUp` / `PageDown` | Move by one screen |
//! | `g` / `G` | Newest / oldest record |
//! | `Enter` | Expand / collapse the selected record |
//! | `Escape` | Collapse |

use std::cell::Cell;
use std::fmt::Write as _;

use chrono::Local;
use logwise_core::DisplayLogRecord;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget, Wrap},
};

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::widgets::{FetchStatus, ListCursor};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LogListState {
    pub cursor: ListCursor,
    pub show_timestamps: bool,
    /// chrono format string for the timestamp column.
    pub timestamp_format: String,
    /// The selected record is shown in the detail view.
    pub expanded: bool,
    /// First visible row, adjusted at render time to keep the cursor visible.
    offset: Cell<usize>,
    /// Cached from the last render so paging moves by one screen.
    last_height: Cell<usize>,
}

impl LogListState {
    pub fn new(show_timestamps: bool, timestamp_format: impl Into<String>) -> Self {
        Self {
            cursor: ListCursor::default(),
            show_timestamps,
            timestamp_format: timestamp_format.into(),
            expanded: false,
            offset: Cell::new(0),
            last_height: Cell::new(20),
        }
    }

    fn page(&self) -> usize {
        self.last_height.get().max(1)
    }

    /// Jump back to the newest record, e.g. after the list was replaced.
    pub fn reset(&mut self) {
        self.cursor = ListCursor::default();
        self.offset.set(0);
        self.expanded = false;
    }

    /// Handle a navigation event over a list of `len` visible records.
    pub fn handle(&mut self, event: &AppEvent, len: usize) {
        match event {
            AppEvent::Nav(Direction::Up) => self.cursor.up(1),
            AppEvent::Nav(Direction::Down) => self.cursor.down(1, len),
            AppEvent::ScrollUp => self.cursor.up(self.page()),
            AppEvent::ScrollDown => self.cursor.down(self.page(), len),
            AppEvent::ScrollToTop => self.cursor.index = 0,
            AppEvent::ScrollToBottom => self.cursor.index = len.saturating_sub(1),
            AppEvent::Enter if len > 0 => {
                self.expanded = !self.expanded;
                tracing::debug!(expanded = self.expanded, cursor = self.cursor.index, "log list: toggle detail");
            }
            AppEvent::Escape => self.expanded = false,
            _ => return,
        }
        tracing::debug!(cursor = self.cursor.index, len, "log list: cursor moved");
    }

    /// Clamp the cursor after the visible list shrank (search, refetch).
    pub fn clamp(&mut self, len: usize) {
        self.cursor.clamp(len);
        if len == 0 {
            self.expanded = false;
        }
    }

    fn visible_window(&self, len: usize, height: usize) -> (usize, usize) {
        let mut offset = self.offset.get().min(len.saturating_sub(1));
        let cursor = self.cursor.index;
        if cursor < offset {
            offset = cursor;
        } else if height > 0 && cursor >= offset + height {
            offset = cursor + 1 - height;
        }
        self.offset.set(offset);
        (offset, (offset + height).min(len))
    }

    fn format_timestamp(&self, record: &DisplayLogRecord) -> String {
        let Some(instant) = record.instant else {
            return record.timestamp.clone();
        };
        let mut out = String::new();
        // An invalid user format string surfaces as fmt::Error, not a panic.
        match write!(out, "{}", instant.with_timezone(&Local).format(&self.timestamp_format)) {
            Ok(()) => out,
            Err(_) => record.timestamp.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// List widget
// ---------------------------------------------------------------------------

pub struct LogList<'a> {
    records: &'a [&'a DisplayLogRecord],
    state: &'a LogListState,
    status: &'a FetchStatus,
    query: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> LogList<'a> {
    pub fn new(
        records: &'a [&'a DisplayLogRecord],
        state: &'a LogListState,
        status: &'a FetchStatus,
        query: &'a str,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { records, state, status, query, focused, theme }
    }
}

impl Widget for LogList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!("Logs ({})", self.records.len()))
            .border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut rows: Vec<Line> = Vec::new();
        if let Some(banner) = self.status.banner(self.theme) {
            rows.push(banner);
        }
        if self.records.is_empty() && rows.is_empty() {
            let msg = if self.query.is_empty() {
                "no logs in this range"
            } else {
                "no logs match the search"
            };
            rows.push(Line::from(Span::styled(msg, Style::default().add_modifier(Modifier::DIM))));
        }

        let height = (inner.height as usize).saturating_sub(rows.len());
        self.state.last_height.set(height);

        let (start, end) = self.state.visible_window(self.records.len(), height);
        for (i, record) in self.records[start..end].iter().enumerate() {
            let mut line = render_row(record, self.state, self.query, self.theme);
            if start + i == self.state.cursor.index {
                let modifier = if self.focused { Modifier::REVERSED } else { Modifier::BOLD };
                line = line.patch_style(Style::default().add_modifier(modifier));
            }
            rows.push(line);
        }

        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect { x: inner.right().saturating_sub(1), width: 1, ..inner };
        Paragraph::new(rows).render(text_area, buf);

        if self.records.len() > height {
            let mut sb_state = ScrollbarState::new(self.records.len())
                .position(start)
                .viewport_content_length(height);
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                sb_area,
                buf,
                &mut sb_state,
            );
        }
    }
}

fn render_row(record: &DisplayLogRecord, state: &LogListState, query: &str, theme: &Theme) -> Line<'static> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut spans: Vec<Span<'static>> = Vec::new();

    if state.show_timestamps {
        spans.push(Span::styled(format!("{} ", state.format_timestamp(record)), dim));
    }
    spans.push(Span::styled(
        format!("{:<9} ", record.severity_label()),
        theme.level_style(record.severity),
    ));
    spans.push(Span::styled("│ ", dim));
    spans.extend(highlight(&record.short_message, query, theme));

    Line::from(spans)
}

/// Split `text` around the first case-insensitive occurrence of `query`.
fn highlight(text: &str, query: &str, theme: &Theme) -> Vec<Span<'static>> {
    let lower = text.to_lowercase();
    // Only highlight when lowercasing kept byte offsets aligned.
    let hit = (!query.is_empty() && lower.len() == text.len())
        .then(|| lower.find(&query.to_lowercase()))
        .flatten()
        .filter(|&at| text.is_char_boundary(at) && text.is_char_boundary(at + query.len()));

    match hit {
        Some(at) => {
            let end = at + query.len();
            vec![
                Span::raw(text[..at].to_string()),
                Span::styled(text[at..end].to_string(), theme.search_highlight),
                Span::raw(text[end..].to_string()),
            ]
        }
        None => vec![Span::raw(text.to_string())],
    }
}

// ---------------------------------------------------------------------------
// Detail widget
// ---------------------------------------------------------------------------

/// Full message, resource type and labels of one record.
pub struct LogDetail<'a> {
    record: &'a DisplayLogRecord,
    theme: &'a Theme,
}

impl<'a> LogDetail<'a> {
    pub fn new(record: &'a DisplayLogRecord, theme: &'a Theme) -> Self {
        Self { record, theme }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let key = Style::default().add_modifier(Modifier::BOLD);
        let r = self.record;
        let resource = if r.resource_type.is_empty() { "-" } else { r.resource_type.as_str() };

        let mut lines = vec![
            Line::from(vec![Span::styled("timestamp  ", key), Span::raw(r.timestamp.clone())]),
            Line::from(vec![
                Span::styled("severity   ", key),
                Span::styled(r.severity_label(), self.theme.level_style(r.severity)),
            ]),
            Line::from(vec![Span::styled("resource   ", key), Span::raw(resource.to_string())]),
        ];
        if r.labels.is_empty() {
            lines.push(Line::from(vec![Span::styled("labels     ", key), Span::raw("-")]));
        } else {
            for (i, (k, v)) in r.labels.iter().enumerate() {
                let title = if i == 0 { "labels     " } else { "           " };
                lines.push(Line::from(vec![Span::styled(title, key), Span::raw(format!("{k}={v}"))]));
            }
        }
        lines.push(Line::default());
        lines.extend(r.full_message.lines().map(|l| Line::from(l.to_string())));
        lines
    }
}

impl Widget for LogDetail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!("Log {}", self.record.id))
            .border_style(self.theme.border_unfocused);
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
