//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Backend calls run on the
//! tokio runtime through [`Tasks`]; their results are applied between frames.

use crate::{
    commands::Command,
    event::{self, AppEvent},
    pages::{
        dashboard::{DashboardState, Notice},
        investigation::InvestigationState,
    },
    tasks::{TaskOutcome, Tasks},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        help::HelpPopup,
        tab_bar::{TabBar, TabLabel},
    },
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use logwise_core::{config::Config, Normalizer, Project, RangeKey, RangeTable, Session};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Frame, Terminal,
};
use std::{io, time::Duration};

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Projects,
    Sessions,
    Severities,
    Logs,
    Search,
    /// Vim-style `:` command line is active.
    Command,
}

impl Focus {
    /// Next pane in Tab order on the dashboard / an investigation.
    fn next(self, on_dashboard: bool) -> Focus {
        match (on_dashboard, self) {
            (true, Focus::Projects) => Focus::Sessions,
            (true, _) => Focus::Projects,
            (false, Focus::Severities) => Focus::Logs,
            (false, Focus::Logs) => Focus::Search,
            (false, _) => Focus::Severities,
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub dashboard: DashboardState,
    /// Tabs after the dashboard, in opening order.
    pub investigations: Vec<InvestigationState>,
    /// 0 is the dashboard; `n` is `investigations[n - 1]`.
    pub active_tab: usize,
    pub focus: Focus,
    /// Focus before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub ranges: RangeTable,
    pub normalizer: Normalizer,
    pub show_help: bool,
    pub command_bar: CommandBarState,
    pub quit: bool,
    next_tab_id: u64,
}

impl AppState {
    pub fn new(config: Config, theme: Theme) -> Self {
        let normalizer = config.investigation.normalizer();
        Self {
            dashboard: DashboardState::default(),
            investigations: Vec::new(),
            active_tab: 0,
            focus: Focus::Projects,
            prev_focus: Focus::Projects,
            theme,
            config,
            ranges: RangeTable::standard(),
            normalizer,
            show_help: false,
            command_bar: CommandBarState::default(),
            quit: false,
            next_tab_id: 1,
        }
    }

    pub fn on_dashboard(&self) -> bool {
        self.active_tab == 0
    }

    pub fn active_investigation(&mut self) -> Option<&mut InvestigationState> {
        match self.active_tab {
            0 => None,
            n => self.investigations.get_mut(n - 1),
        }
    }

    fn investigation_by_id(&mut self, id: u64) -> Option<&mut InvestigationState> {
        self.investigations.iter_mut().find(|inv| inv.id == id)
    }

    /// Open a new investigation tab and make it active. Returns its id.
    pub fn open_investigation(&mut self, session_id: String, title: String, range: RangeKey) -> u64 {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        tracing::debug!(tab = id, %session_id, %title, "investigation opened");
        let inv = InvestigationState::new(id, session_id, title, range, &self.config, &self.ranges);
        self.investigations.push(inv);
        self.select_tab(self.investigations.len());
        id
    }

    pub fn select_tab(&mut self, tab: usize) {
        if tab > self.investigations.len() {
            return;
        }
        self.active_tab = tab;
        self.focus = if tab == 0 { Focus::Projects } else { Focus::Logs };
        tracing::debug!(tab, "tab selected");
    }

    /// `q` semantics: close the active investigation, or quit from the dashboard.
    fn close_or_quit(&mut self) {
        if self.on_dashboard() {
            tracing::debug!("quit");
            self.quit = true;
        } else {
            let closed = self.investigations.remove(self.active_tab - 1);
            tracing::debug!(tab = closed.id, "investigation closed");
            self.select_tab(self.active_tab - 1);
        }
    }

    fn tab_labels(&self) -> Vec<TabLabel> {
        std::iter::once(TabLabel {
            title: "dashboard".to_string(),
            busy: self.dashboard.is_busy(),
        })
        .chain(self.investigations.iter().map(|inv| TabLabel {
            title: inv.title.clone(),
            busy: inv.is_busy(),
        }))
        .collect()
    }

    /// Apply a finished backend request. Returns follow-up work.
    pub fn apply(&mut self, outcome: TaskOutcome) -> Vec<FollowUp> {
        match outcome {
            TaskOutcome::Projects { seq, result } => {
                self.dashboard.finish_projects(seq, result);
                vec![]
            }
            TaskOutcome::Sessions { seq, result } => {
                self.dashboard.finish_sessions(seq, result);
                vec![]
            }
            TaskOutcome::SessionStarted { project, result } => match result {
                Ok(session_id) => {
                    self.dashboard.notice = None;
                    let range = self.config.investigation.default_range;
                    let tab = self.open_investigation(session_id, project.name, range);
                    vec![FollowUp::FetchLogs(tab), FollowUp::ReloadSessions]
                }
                Err(msg) => {
                    self.dashboard.notice =
                        Some(Notice::Error(format!("could not start session for {}: {msg}", project.name)));
                    vec![]
                }
            },
            TaskOutcome::Logs { tab, seq, result } => {
                let (normalizer, ranges) = (self.normalizer, self.ranges.clone());
                match self.investigation_by_id(tab) {
                    Some(inv) => {
                        inv.finish_fetch(seq, result, &normalizer, &ranges);
                    }
                    None => tracing::debug!(tab, "logs for closed tab dropped"),
                }
                vec![]
            }
            TaskOutcome::Explanation { tab, seq, result } => {
                match self.investigation_by_id(tab) {
                    Some(inv) => {
                        inv.explain.finish(seq, result);
                    }
                    None => tracing::debug!(tab, "explanation for closed tab dropped"),
                }
                vec![]
            }
        }
    }
}

/// Work the event handler asks the shell to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    ReloadDashboard,
    ReloadSessions,
    StartSession(Project),
    ResumeSession(Session),
    /// Refetch logs for the investigation with this tab id.
    FetchLogs(u64),
    Explain(u64),
}

// ---------------------------------------------------------------------------
// Event handling
// ---------------------------------------------------------------------------

impl AppState {
    /// Handle one semantic event. Backend work is returned, not started.
    pub fn handle(&mut self, event: AppEvent) -> Vec<FollowUp> {
        // Help popup intercepts all events; only close keys pass through.
        if self.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                tracing::debug!("help popup closed");
                self.show_help = false;
            } else if event == AppEvent::ForceQuit {
                self.quit = true;
            }
            return vec![];
        }

        if self.focus == Focus::Command {
            return self.handle_command_bar(event);
        }
        if self.focus == Focus::Search {
            return self.handle_search(event);
        }

        match event {
            AppEvent::Char('?') => {
                tracing::debug!("help popup opened");
                self.show_help = true;
                vec![]
            }
            AppEvent::Char(':') => {
                tracing::debug!(prev_focus = ?self.focus, "entering command mode");
                self.prev_focus = self.focus;
                self.command_bar.clear();
                self.focus = Focus::Command;
                vec![]
            }
            AppEvent::Quit => {
                self.close_or_quit();
                vec![]
            }
            AppEvent::ForceQuit => {
                self.quit = true;
                vec![]
            }
            AppEvent::SelectTab(n) => {
                self.select_tab(n);
                vec![]
            }
            AppEvent::FocusNext => {
                let next = self.focus.next(self.on_dashboard());
                tracing::debug!(from = ?self.focus, to = ?next, "focus cycle");
                self.focus = next;
                vec![]
            }
            AppEvent::Resize(_, _) => vec![],
            other if self.on_dashboard() => self.handle_dashboard(other),
            other => self.handle_investigation(other),
        }
    }

    fn handle_command_bar(&mut self, event: AppEvent) -> Vec<FollowUp> {
        match event {
            AppEvent::Escape => {
                tracing::debug!("command bar cancelled");
                self.command_bar.clear();
                self.focus = self.prev_focus;
                vec![]
            }
            AppEvent::ForceQuit => {
                self.quit = true;
                vec![]
            }
            AppEvent::Enter => match Command::parse(&self.command_bar.input) {
                Ok(cmd) => {
                    tracing::debug!(command = ?cmd, "executing command");
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                    let follow_ups = self.execute(cmd);
                    // A command that failed reopens the bar with its error.
                    if self.command_bar.error.is_some() {
                        self.focus = Focus::Command;
                    }
                    follow_ups
                }
                Err(msg) if msg.is_empty() => {
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                    vec![]
                }
                Err(msg) => {
                    // Bar stays open showing the error.
                    self.command_bar.error = Some(msg);
                    vec![]
                }
            },
            other => {
                self.command_bar.handle(&other);
                vec![]
            }
        }
    }

    fn handle_search(&mut self, event: AppEvent) -> Vec<FollowUp> {
        let ranges = self.ranges.clone();
        match event {
            AppEvent::Escape | AppEvent::Enter => {
                tracing::debug!("focus: Search -> Logs");
                self.focus = Focus::Logs;
            }
            AppEvent::FocusNext => self.focus = Focus::Severities,
            AppEvent::ForceQuit => self.quit = true,
            other => {
                if let Some(inv) = self.active_investigation() {
                    if inv.search.handle(&other) {
                        inv.search_changed(&ranges);
                    }
                }
            }
        }
        vec![]
    }

    fn handle_dashboard(&mut self, event: AppEvent) -> Vec<FollowUp> {
        match event {
            AppEvent::Refresh => vec![FollowUp::ReloadDashboard],
            AppEvent::Enter => match self.focus {
                Focus::Sessions => self
                    .dashboard
                    .selected_session()
                    .cloned()
                    .map(FollowUp::ResumeSession)
                    .into_iter()
                    .collect(),
                _ => match self.dashboard.selected_project().cloned() {
                    Some(project) => {
                        self.dashboard.notice =
                            Some(Notice::Info(format!("starting session for {}…", project.name)));
                        vec![FollowUp::StartSession(project)]
                    }
                    None => vec![],
                },
            },
            other => {
                self.dashboard.navigate(self.focus, &other);
                vec![]
            }
        }
    }

    fn handle_investigation(&mut self, event: AppEvent) -> Vec<FollowUp> {
        if event == AppEvent::SearchFocus {
            tracing::debug!("focus -> Search");
            self.focus = Focus::Search;
            return vec![];
        }
        let focus = self.focus;
        let ranges = self.ranges.clone();
        let Some(inv) = self.active_investigation() else {
            return vec![];
        };
        let tab = inv.id;

        match event {
            AppEvent::Refresh => vec![FollowUp::FetchLogs(tab)],
            AppEvent::CycleRange => {
                inv.set_range(inv.range.next());
                vec![FollowUp::FetchLogs(tab)]
            }
            AppEvent::Explain => vec![FollowUp::Explain(tab)],
            AppEvent::TogglePanel => {
                inv.explain.toggle();
                vec![]
            }
            AppEvent::Escape if focus == Focus::Logs && !inv.list.expanded => {
                if inv.search.clear() {
                    inv.search_changed(&ranges);
                }
                vec![]
            }
            other => match focus {
                Focus::Severities => {
                    if inv.filter.handle(&other) {
                        vec![FollowUp::FetchLogs(tab)]
                    } else {
                        vec![]
                    }
                }
                _ => {
                    let len = inv.visible().len();
                    inv.list.handle(&other, len);
                    vec![]
                }
            },
        }
    }

    /// Execute a parsed [`Command`] against the application state.
    pub fn execute(&mut self, cmd: Command) -> Vec<FollowUp> {
        match cmd {
            Command::Quit => self.close_or_quit(),
            Command::Exit => self.quit = true,
            Command::Help => self.show_help = !self.show_help,
            Command::Theme(name) => match Theme::builtin(&name) {
                Ok(theme) => self.theme = theme,
                Err(err) => self.command_bar.error = Some(err.to_string()),
            },
            Command::Timestamps => {
                let show = !self.config.ui.show_timestamps;
                self.config.ui.show_timestamps = show;
                for inv in &mut self.investigations {
                    inv.list.show_timestamps = show;
                }
            }
            Command::Refresh if self.on_dashboard() => return vec![FollowUp::ReloadDashboard],
            Command::Refresh => {
                return self.active_investigation().map(|inv| FollowUp::FetchLogs(inv.id)).into_iter().collect();
            }
            Command::Explain => {
                return self.active_investigation().map(|inv| FollowUp::Explain(inv.id)).into_iter().collect();
            }
            Command::Range(range) => match self.active_investigation() {
                Some(inv) => {
                    if inv.set_range(range) {
                        return vec![FollowUp::FetchLogs(inv.id)];
                    }
                }
                None => self.command_bar.error = Some("range applies to an investigation tab".into()),
            },
            Command::Severity(severity) => match self.active_investigation() {
                Some(inv) => {
                    inv.filter.toggle(severity);
                    return vec![FollowUp::FetchLogs(inv.id)];
                }
                None => self.command_bar.error = Some("severity applies to an investigation tab".into()),
            },
        }
        vec![]
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    tasks: Tasks,
}

impl App {
    pub fn new(config: Config, theme: Theme, tasks: Tasks) -> Self {
        App { state: AppState::new(config, theme), tasks }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        self.start(vec![FollowUp::ReloadDashboard]);
        let result = self.event_loop(&mut terminal);

        // Always restore the terminal, even if the loop returned an error.
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
        loop {
            while let Some(outcome) = self.tasks.try_next() {
                let follow_ups = self.state.apply(outcome);
                self.start(follow_ups);
            }

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                if let Event::Key(key) = &raw {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                }
                // Use insert-mode mapping when a text widget is focused.
                let app_event = if is_insert_mode(self.state.focus) {
                    event::to_app_event_insert(raw)
                } else {
                    event::to_app_event(raw)
                };
                if let Some(ev) = app_event {
                    tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                    let follow_ups = self.state.handle(ev);
                    self.start(follow_ups);
                }
            }
        }
        Ok(())
    }

    /// Issue the backend requests behind each follow-up.
    fn start(&mut self, follow_ups: Vec<FollowUp>) {
        for follow_up in follow_ups {
            match follow_up {
                FollowUp::ReloadDashboard => {
                    let reload = self.state.dashboard.begin_reload();
                    self.tasks.load_projects(reload.projects_seq);
                    self.tasks.load_sessions(reload.sessions_seq);
                }
                FollowUp::ReloadSessions => {
                    let seq = self.state.dashboard.begin_sessions_reload();
                    self.tasks.load_sessions(seq);
                }
                FollowUp::StartSession(project) => self.tasks.start_session(project),
                FollowUp::ResumeSession(session) => {
                    let range = session
                        .time_range
                        .parse()
                        .unwrap_or(self.state.config.investigation.default_range);
                    let tab = self.state.open_investigation(session.id, session.name, range);
                    self.start(vec![FollowUp::FetchLogs(tab)]);
                }
                FollowUp::FetchLogs(tab) => {
                    let ranges = self.state.ranges.clone();
                    if let Some(inv) = self.state.investigation_by_id(tab) {
                        let fetch = inv.begin_fetch(&ranges);
                        self.tasks.fetch_logs(tab, fetch);
                    }
                }
                FollowUp::Explain(tab) => {
                    let description = self.state.config.backend.project_description.clone();
                    if let Some(inv) = self.state.investigation_by_id(tab) {
                        match inv.begin_explain() {
                            Some(request) => self.tasks.explain(tab, request, description),
                            None => inv.explain.visible = true,
                        }
                    }
                }
            }
        }
    }
}

/// Text-input widgets turn shortcut letters into characters.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::Search | Focus::Command)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let [tab_area, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

    let labels = state.tab_labels();
    frame.render_widget(TabBar::new(&labels, state.active_tab, &state.theme), tab_area);

    // Command mode keeps the page's own focus highlight.
    let page_focus = if state.focus == Focus::Command { state.prev_focus } else { state.focus };
    match state.active_tab {
        0 => state.dashboard.render(frame, body, page_focus, &state.theme),
        n => {
            if let Some(inv) = state.investigations.get(n - 1) {
                inv.render(frame, body, page_focus, &state.theme);
            }
        }
    }

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    // Command bar overlays the bottom row of the screen.
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        frame.set_cursor_position((state.command_bar.cursor_col(cmd_area), cmd_area.y));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
