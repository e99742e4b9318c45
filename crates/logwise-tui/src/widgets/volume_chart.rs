//! Volume chart: one bar per bucket, coloured by the worst severity present.

use logwise_core::{Bucket, BucketSeries};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Widget},
};

use crate::theme::Theme;

const BAR_GAP: u16 = 1;

pub struct VolumeChart<'a> {
    series: &'a BucketSeries,
    theme: &'a Theme,
}

impl<'a> VolumeChart<'a> {
    pub fn new(series: &'a BucketSeries, theme: &'a Theme) -> Self {
        Self { series, theme }
    }

    /// e.g. `Last 24 hours: 182 logs, 3 outside window`.
    pub fn title(&self) -> String {
        let mut title = format!("{}: {} logs", self.series.range.title(), self.series.total());
        if self.series.dropped > 0 {
            title.push_str(&format!(", {} outside window", self.series.dropped));
        }
        title
    }

    fn bar(&self, bucket: &Bucket) -> Bar<'static> {
        let style = match bucket.worst_severity() {
            Some(worst) => self.theme.level_style(Some(worst)),
            None => self.theme.chart_empty,
        };
        Bar::default()
            .value(bucket.total)
            .label(Line::from(bucket.label.clone()))
            .style(style)
            .value_style(style.add_modifier(Modifier::REVERSED))
    }
}

/// Widest bar that fits `count` bars and their gaps into `width` columns.
pub fn bar_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let count = count as u16;
    let gaps = BAR_GAP * count.saturating_sub(1);
    (width.saturating_sub(gaps) / count).max(1)
}

impl Widget for VolumeChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title())
            .border_style(self.theme.border_unfocused);
        let inner_width = block.inner(area).width;

        let bars: Vec<Bar> = self.series.buckets.iter().map(|b| self.bar(b)).collect();

        BarChart::default()
            .block(block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width(inner_width, bars.len()))
            .bar_gap(BAR_GAP)
            .max(self.series.peak().max(1))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use logwise_core::{bucketize_at, LogMessage, LogRecord, RangeKey, RangeTable, Severity};

    fn series(offsets_secs: &[(i64, Severity)]) -> BucketSeries {
        let now = Utc.with_ymd_and_hms(2024, 6, 19, 14, 0, 0).unwrap();
        let records: Vec<LogRecord> = offsets_secs
            .iter()
            .map(|(secs, severity)| LogRecord {
                timestamp: (now - chrono::TimeDelta::seconds(*secs)).to_rfc3339(),
                severity: Some(*severity),
                message: LogMessage::default(),
                resource_type: String::new(),
                labels: Default::default(),
            })
            .collect();
        bucketize_at(&RangeTable::standard(), &records, RangeKey::Last5m, now)
    }

    #[test]
    fn title_mentions_dropped_records() {
        let theme = Theme::builtin("default").unwrap();
        let s = series(&[(90, Severity::Error), (200, Severity::Warning), (700, Severity::Info)]);
        assert_eq!(
            VolumeChart::new(&s, &theme).title(),
            "Last 5 minutes: 2 logs, 1 outside window"
        );
        let clean = series(&[(30, Severity::Info)]);
        assert_eq!(VolumeChart::new(&clean, &theme).title(), "Last 5 minutes: 1 logs");
    }

    #[test]
    fn bars_fill_the_available_width() {
        assert_eq!(bar_width(100, 24), 3);
        assert_eq!(bar_width(10, 24), 1);
        assert_eq!(bar_width(59, 5), 11);
        assert_eq!(bar_width(40, 0), 1);
    }

    #[test]
    fn renders_without_panicking_in_tiny_areas() {
        let theme = Theme::builtin("default").unwrap();
        let s = series(&[(90, Severity::Critical)]);
        for (w, h) in [(0, 0), (3, 3), (20, 6), (120, 12)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            VolumeChart::new(&s, &theme).render(area, &mut buf);
        }
    }
}
