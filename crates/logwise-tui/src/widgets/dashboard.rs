//! Dashboard tables: connected projects and recent investigation sessions.

use logwise_core::{Project, Session};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::theme::Theme;
use crate::widgets::{FetchStatus, ListCursor};

/// One table on the dashboard. Rows come from the caller; the cursor and
/// load status belong to the dashboard page.
pub struct RecordTable<'a> {
    title: &'a str,
    header: [&'static str; 4],
    widths: [Constraint; 4],
    rows: Vec<[String; 4]>,
    cursor: ListCursor,
    status: &'a FetchStatus,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> RecordTable<'a> {
    pub fn projects(
        projects: &[Project],
        cursor: ListCursor,
        status: &'a FetchStatus,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title: "Projects (Enter: start session)",
            header: ["NAME", "PROJECT ID", "STATUS", "LAST ANALYZED"],
            widths: [
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Fill(1),
            ],
            rows: projects.iter().map(project_row).collect(),
            cursor,
            status,
            focused,
            theme,
        }
    }

    pub fn sessions(
        sessions: &[Session],
        cursor: ListCursor,
        status: &'a FetchStatus,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title: "Sessions (Enter: resume)",
            header: ["NAME", "PROJECT", "TIME RANGE", "STATUS"],
            widths: [
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Fill(1),
                Constraint::Length(10),
            ],
            rows: sessions.iter().map(session_row).collect(),
            cursor,
            status,
            focused,
            theme,
        }
    }
}

pub fn project_row(p: &Project) -> [String; 4] {
    [
        p.name.clone(),
        p.project_id.clone(),
        p.status.clone(),
        p.last_analyzed.clone(),
    ]
}

pub fn session_row(s: &Session) -> [String; 4] {
    [
        s.name.clone(),
        s.project.clone(),
        s.time_range.clone(),
        s.status.clone(),
    ]
}

impl Widget for RecordTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title)
            .border_style(self.theme.border(self.focused));

        if let Some(banner) = self.status.banner(self.theme) {
            Paragraph::new(banner).block(block).render(area, buf);
            return;
        }
        if self.rows.is_empty() {
            let empty = Line::styled("nothing here yet", Style::default().add_modifier(Modifier::DIM));
            Paragraph::new(empty).block(block).render(area, buf);
            return;
        }

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let header = Row::new(self.header.iter().map(|h| Cell::from(*h))).style(bold);
        let rows = self.rows.into_iter().map(|r| Row::new(r.map(Cell::from)));
        let highlight = if self.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            bold
        };

        let table = Table::new(rows, self.widths)
            .header(header)
            .block(block)
            .column_spacing(2)
            .row_highlight_style(highlight);

        let mut state = TableState::default().with_selected(Some(self.cursor.index));
        StatefulWidget::render(table, area, buf, &mut state);
    }
}
