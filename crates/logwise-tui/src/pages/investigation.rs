//! Investigation page: one session's logs, filtered by range, severity and
//! search text, with the volume chart and the explanation panel.

use logwise_client::RequestSequencer;
use logwise_core::config::Config;
use logwise_core::{
    bucketize, prepare, search, BucketSeries, DisplayLogRecord, LogRecord, Normalizer, RangeConfig, RangeKey,
    RangeTable, Severity,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::Focus;
use crate::theme::Theme;
use crate::widgets::{
    explain_panel::{ExplainPanel, ExplainState},
    log_list::{LogDetail, LogList, LogListState},
    search_bar::{SearchBar, SearchBarState},
    severity_filter::{SeverityFilter, SeverityFilterState},
    volume_chart::VolumeChart,
    FetchStatus,
};

/// Everything a log fetch needs, captured when it is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFetch {
    pub seq: u64,
    pub range: RangeConfig,
    pub severities: Vec<Severity>,
}

/// The log to explain, captured when the request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainRequest {
    pub seq: u64,
    pub log_message: String,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct InvestigationState {
    /// Stable tab identity; task results are routed by it.
    pub id: u64,
    pub session_id: String,
    pub title: String,
    pub range: RangeKey,
    pub filter: SeverityFilterState,
    /// Newest first, as fetched.
    pub records: Vec<DisplayLogRecord>,
    pub status: FetchStatus,
    pub search: SearchBarState,
    pub list: LogListState,
    pub explain: ExplainState,
    /// Chart over the search-filtered records.
    pub series: BucketSeries,
    logs_seq: RequestSequencer,
}

impl InvestigationState {
    pub fn new(
        id: u64,
        session_id: impl Into<String>,
        title: impl Into<String>,
        range: RangeKey,
        config: &Config,
        table: &RangeTable,
    ) -> Self {
        Self {
            id,
            session_id: session_id.into(),
            title: title.into(),
            range,
            filter: SeverityFilterState::with_selected(&config.investigation.default_severities),
            records: Vec::new(),
            status: FetchStatus::Idle,
            search: SearchBarState::default(),
            list: LogListState::new(config.ui.show_timestamps, config.ui.timestamp_format.clone()),
            explain: ExplainState::default(),
            series: bucketize(table, std::iter::empty::<&DisplayLogRecord>(), range),
            logs_seq: RequestSequencer::new(),
        }
    }

    /// Mark a new fetch as in flight and describe it. Any fetch still in
    /// flight becomes stale.
    pub fn begin_fetch(&mut self, table: &RangeTable) -> LogFetch {
        self.status = FetchStatus::Loading;
        let fetch = LogFetch {
            seq: self.logs_seq.issue(),
            range: *table.get(self.range),
            severities: self.filter.selected(),
        };
        tracing::debug!(tab = self.id, seq = fetch.seq, range = %self.range, "log fetch issued");
        fetch
    }

    /// Apply a finished fetch. Returns `false` when `seq` is stale.
    pub fn finish_fetch(
        &mut self,
        seq: u64,
        result: Result<Vec<LogRecord>, String>,
        normalizer: &Normalizer,
        table: &RangeTable,
    ) -> bool {
        if !self.logs_seq.is_current(seq) {
            tracing::warn!(tab = self.id, seq, latest = self.logs_seq.latest(), "stale log fetch discarded");
            return false;
        }
        match result {
            Ok(raw) => {
                self.records = prepare(&raw, normalizer);
                self.status = FetchStatus::Ready;
                tracing::info!(tab = self.id, count = self.records.len(), "investigation logs loaded");
            }
            Err(msg) => {
                self.records.clear();
                self.status = FetchStatus::Failed(msg);
            }
        }
        self.list.reset();
        self.refresh_chart(table);
        true
    }

    /// Records passing the search filter, newest first.
    pub fn visible(&self) -> Vec<&DisplayLogRecord> {
        search::filter(&self.records, &self.search.query)
    }

    pub fn selected(&self) -> Option<&DisplayLogRecord> {
        let visible = self.visible();
        self.list.cursor.selected(visible.len()).map(|i| visible[i])
    }

    pub fn refresh_chart(&mut self, table: &RangeTable) {
        self.series = bucketize(table, self.visible(), self.range);
    }

    /// Re-derive everything that depends on the search query.
    pub fn search_changed(&mut self, table: &RangeTable) {
        let len = self.visible().len();
        self.list.clamp(len);
        self.refresh_chart(table);
    }

    /// Switch range. Returns `false` when `range` is already active.
    pub fn set_range(&mut self, range: RangeKey) -> bool {
        if self.range == range {
            return false;
        }
        tracing::debug!(tab = self.id, from = %self.range, to = %range, "range changed");
        self.range = range;
        true
    }

    /// Start explaining the selected record, if any.
    pub fn begin_explain(&mut self) -> Option<ExplainRequest> {
        let (subject, log_message) = {
            let record = self.selected()?;
            (record.short_message.clone(), record.full_message.clone())
        };
        let seq = self.explain.begin(subject);
        Some(ExplainRequest { seq, log_message })
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_loading() || self.explain.status.is_loading()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self, frame: &mut Frame, area: Rect, focus: Focus, theme: &Theme) {
        let visible = self.visible();

        let [header_area, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
        frame.render_widget(Paragraph::new(self.header(visible.len(), theme)), header_area);

        let [filter_area, main_area] =
            Layout::horizontal([Constraint::Length(16), Constraint::Fill(1)]).areas(body);
        frame.render_widget(
            SeverityFilter::new(&self.filter, focus == Focus::Severities, theme),
            filter_area,
        );

        let (main_area, explain_area) = if self.explain.visible {
            let [m, e] = Layout::horizontal([Constraint::Fill(2), Constraint::Fill(1)]).areas(main_area);
            (m, Some(e))
        } else {
            (main_area, None)
        };

        let selected = self.selected().filter(|_| self.list.expanded);
        let detail_height = if selected.is_some() { Constraint::Percentage(40) } else { Constraint::Length(0) };
        let [chart_area, logs_area, detail_area, search_area] = Layout::vertical([
            Constraint::Length(10),
            Constraint::Fill(1),
            detail_height,
            Constraint::Length(3),
        ])
        .areas(main_area);

        frame.render_widget(VolumeChart::new(&self.series, theme), chart_area);
        frame.render_widget(
            LogList::new(
                &visible,
                &self.list,
                &self.status,
                &self.search.query,
                focus == Focus::Logs,
                theme,
            ),
            logs_area,
        );
        if let Some(record) = selected {
            frame.render_widget(LogDetail::new(record, theme), detail_area);
        }

        let search = SearchBar::new(
            &self.search,
            focus == Focus::Search,
            (visible.len(), self.records.len()),
            theme,
        );
        let cursor = search.cursor_position(search_area);
        frame.render_widget(search, search_area);
        if focus == Focus::Search {
            frame.set_cursor_position(cursor);
        }

        if let Some(explain_area) = explain_area {
            frame.render_widget(ExplainPanel::new(&self.explain, theme), explain_area);
        }
    }

    fn header(&self, shown: usize, theme: &Theme) -> Line<'static> {
        let details = format!(
            "session {}  │  {}  │  severities: {}  │  {shown}/{} logs",
            self.session_id,
            self.range.title(),
            self.filter.summary(),
            self.records.len(),
        );
        Line::from(vec![
            Span::styled(format!(" {} ", self.title), theme.header),
            Span::raw(details),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use logwise_core::LogMessage;
    use pretty_assertions::assert_eq;

    fn state() -> InvestigationState {
        InvestigationState::new(7, "sess-1", "Checkout", RangeKey::Last1h, &Config::defaults(), &RangeTable::standard())
    }

    fn raw(minutes_ago: i64, severity: Severity, message: &str) -> LogRecord {
        LogRecord {
            timestamp: (Utc::now() - TimeDelta::minutes(minutes_ago)).to_rfc3339(),
            severity: Some(severity),
            message: LogMessage::from(message),
            resource_type: String::new(),
            labels: Default::default(),
        }
    }

    #[test]
    fn new_tab_uses_configured_severities() {
        let s = state();
        assert_eq!(s.filter.selected(), vec![Severity::Warning, Severity::Error]);
        assert_eq!(s.series.buckets.len(), 12);
        assert_eq!(s.status, FetchStatus::Idle);
    }

    #[test]
    fn fetch_describes_range_window_and_severities() {
        let table = RangeTable::standard();
        let mut s = state();
        let fetch = s.begin_fetch(&table);
        assert_eq!(fetch.range.fetch_window(), (60, 0));
        assert_eq!(fetch.severities, vec![Severity::Warning, Severity::Error]);
        assert!(s.status.is_loading());
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let table = RangeTable::standard();
        let normalizer = Normalizer::default();
        let mut s = state();
        let old = s.begin_fetch(&table);
        let new = s.begin_fetch(&table);

        let applied = s.finish_fetch(old.seq, Ok(vec![raw(5, Severity::Error, "old")]), &normalizer, &table);
        assert!(!applied);
        assert!(s.records.is_empty());
        assert!(s.status.is_loading());

        let applied = s.finish_fetch(new.seq, Ok(vec![raw(5, Severity::Error, "new")]), &normalizer, &table);
        assert!(applied);
        assert_eq!(s.records[0].short_message, "new");
        assert_eq!(s.status, FetchStatus::Ready);
        assert_eq!(s.series.total(), 1);
    }

    #[test]
    fn failed_fetch_clears_records_and_reports() {
        let table = RangeTable::standard();
        let normalizer = Normalizer::default();
        let mut s = state();
        let first = s.begin_fetch(&table);
        s.finish_fetch(first.seq, Ok(vec![raw(1, Severity::Info, "x")]), &normalizer, &table);
        let second = s.begin_fetch(&table);
        s.finish_fetch(second.seq, Err("connection refused".into()), &normalizer, &table);
        assert!(s.records.is_empty());
        assert_eq!(s.status, FetchStatus::Failed("connection refused".into()));
    }

    #[test]
    fn search_filters_list_and_chart() {
        let table = RangeTable::standard();
        let normalizer = Normalizer::default();
        let mut s = state();
        let fetch = s.begin_fetch(&table);
        s.finish_fetch(
            fetch.seq,
            Ok(vec![
                raw(2, Severity::Error, "disk full on /var"),
                raw(3, Severity::Warning, "slow query"),
                raw(4, Severity::Error, "Disk quota exceeded"),
            ]),
            &normalizer,
            &table,
        );
        s.list.cursor.index = 2;

        s.search.query = "disk".into();
        s.search_changed(&table);
        let shown: Vec<&str> = s.visible().iter().map(|r| r.short_message.as_str()).collect();
        assert_eq!(shown, vec!["disk full on /var", "Disk quota exceeded"]);
        assert_eq!(s.series.total(), 2);
        assert_eq!(s.list.cursor.index, 1);
        assert_eq!(s.selected().map(|r| r.short_message.as_str()), Some("Disk quota exceeded"));
    }

    #[test]
    fn explain_targets_selected_full_message() {
        let table = RangeTable::standard();
        let normalizer = Normalizer::default();
        let mut s = state();
        assert!(s.begin_explain().is_none());

        let fetch = s.begin_fetch(&table);
        s.finish_fetch(fetch.seq, Ok(vec![raw(2, Severity::Error, "line one\nline two")]), &normalizer, &table);
        let req = s.begin_explain().unwrap();
        assert_eq!(req.log_message, "line one\nline two");
        assert_eq!(s.explain.subject.as_deref(), Some("line one"));
        assert!(s.is_busy());
    }

    #[test]
    fn set_range_reports_changes_only() {
        let mut s = state();
        assert!(!s.set_range(RangeKey::Last1h));
        assert!(s.set_range(RangeKey::Last6h));
        assert_eq!(s.range, RangeKey::Last6h);
    }
}
