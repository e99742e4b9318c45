//! Dashboard page: connected projects and recent sessions.

use logwise_client::RequestSequencer;
use logwise_core::{Project, Session};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::Focus;
use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::widgets::{dashboard::RecordTable, FetchStatus, ListCursor};

const PAGE_STEP: usize = 10;

/// Sequence tags for one dashboard reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reload {
    pub projects_seq: u64,
    pub sessions_seq: u64,
}

#[derive(Debug, Default)]
pub struct DashboardState {
    pub projects: Vec<Project>,
    pub projects_status: FetchStatus,
    pub project_cursor: ListCursor,
    pub sessions: Vec<Session>,
    pub sessions_status: FetchStatus,
    pub session_cursor: ListCursor,
    /// One-line status under the tables (session start progress or failure).
    pub notice: Option<Notice>,
    projects_seq: RequestSequencer,
    sessions_seq: RequestSequencer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl DashboardState {
    pub fn begin_reload(&mut self) -> Reload {
        self.projects_status = FetchStatus::Loading;
        self.sessions_status = FetchStatus::Loading;
        Reload {
            projects_seq: self.projects_seq.issue(),
            sessions_seq: self.sessions_seq.issue(),
        }
    }

    /// Reload just the sessions list (after a session was started).
    pub fn begin_sessions_reload(&mut self) -> u64 {
        self.sessions_status = FetchStatus::Loading;
        self.sessions_seq.issue()
    }

    pub fn finish_projects(&mut self, seq: u64, result: Result<Vec<Project>, String>) -> bool {
        if !self.projects_seq.is_current(seq) {
            tracing::warn!(seq, "stale project list discarded");
            return false;
        }
        match result {
            Ok(projects) => {
                self.projects = projects;
                self.projects_status = FetchStatus::Ready;
            }
            Err(msg) => self.projects_status = FetchStatus::Failed(msg),
        }
        self.project_cursor.clamp(self.projects.len());
        true
    }

    pub fn finish_sessions(&mut self, seq: u64, result: Result<Vec<Session>, String>) -> bool {
        if !self.sessions_seq.is_current(seq) {
            tracing::warn!(seq, "stale session list discarded");
            return false;
        }
        match result {
            Ok(sessions) => {
                self.sessions = sessions;
                self.sessions_status = FetchStatus::Ready;
            }
            Err(msg) => self.sessions_status = FetchStatus::Failed(msg),
        }
        self.session_cursor.clamp(self.sessions.len());
        true
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.project_cursor
            .selected(self.projects.len())
            .map(|i| &self.projects[i])
    }

    pub fn selected_session(&self) -> Option<&Session> {
        self.session_cursor
            .selected(self.sessions.len())
            .map(|i| &self.sessions[i])
    }

    pub fn is_busy(&self) -> bool {
        self.projects_status.is_loading() || self.sessions_status.is_loading()
    }

    /// Move the cursor of the focused table.
    pub fn navigate(&mut self, focus: Focus, event: &AppEvent) {
        let (cursor, len) = match focus {
            Focus::Sessions => (&mut self.session_cursor, self.sessions.len()),
            _ => (&mut self.project_cursor, self.projects.len()),
        };
        match event {
            AppEvent::Nav(Direction::Up) => cursor.up(1),
            AppEvent::Nav(Direction::Down) => cursor.down(1, len),
            AppEvent::ScrollUp => cursor.up(PAGE_STEP),
            AppEvent::ScrollDown => cursor.down(PAGE_STEP, len),
            AppEvent::ScrollToTop => cursor.index = 0,
            AppEvent::ScrollToBottom => cursor.index = len.saturating_sub(1),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focus: Focus, theme: &Theme) {
        let [projects_area, sessions_area, notice_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            RecordTable::projects(
                &self.projects,
                self.project_cursor,
                &self.projects_status,
                focus == Focus::Projects,
                theme,
            ),
            projects_area,
        );
        frame.render_widget(
            RecordTable::sessions(
                &self.sessions,
                self.session_cursor,
                &self.sessions_status,
                focus == Focus::Sessions,
                theme,
            ),
            sessions_area,
        );

        let notice = match &self.notice {
            Some(Notice::Info(msg)) => Line::from(Span::styled(msg.clone(), theme.status_loading)),
            Some(Notice::Error(msg)) => Line::from(Span::styled(msg.clone(), theme.status_error)),
            None => Line::from(" Tab: switch table   Enter: open   r: reload"),
        };
        frame.render_widget(Paragraph::new(notice), notice_area);
    }
}
