use chrono::{Duration, NaiveDate};

use crate::model::config::TimelineConfig;
use crate::model::task::Task;

/// A fixed-width-per-day horizontal axis anchored a few days before today.
///
/// Positions are in abstract units (`day_width` per day): terminal columns in
/// the TUI, anything else in tests. Dates before the axis start map to
/// negative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineAxis {
    pub start: NaiveDate,
    /// Last visible day, inclusive
    pub end: NaiveDate,
    pub day_width: i64,
}

impl TimelineAxis {
    pub fn new(today: NaiveDate, days_before: u32, days_after: u32, day_width: u16) -> Self {
        TimelineAxis {
            start: today - Duration::days(days_before as i64),
            end: today + Duration::days(days_after as i64),
            day_width: day_width.max(1) as i64,
        }
    }

    pub fn from_config(today: NaiveDate, config: &TimelineConfig) -> Self {
        Self::new(today, config.days_before, config.days_after, config.day_width)
    }

    pub fn pixel_offset(&self, date: NaiveDate) -> i64 {
        (date - self.start).num_days() * self.day_width
    }

    /// The day under position `px`
    pub fn date_at(&self, px: i64) -> NaiveDate {
        self.start + Duration::days(px.div_euclid(self.day_width))
    }

    pub fn day_count(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    /// Every visible day, oldest first
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.day_count() as i64).map(move |i| self.start + Duration::days(i))
    }

    /// Total width of the visible window
    pub fn width(&self) -> i64 {
        self.day_count() as i64 * self.day_width
    }

    /// Whole days for a drag distance, rounding halves up.
    pub fn delta_days(&self, delta_px: i64) -> i64 {
        (2 * delta_px + self.day_width).div_euclid(2 * self.day_width)
    }

    /// Bar geometry for `task`. `end_override` replaces the planned end while
    /// a resize is being previewed. The end is clamped to the start day, so a
    /// bar is always at least one day wide.
    pub fn bar(&self, task: &Task, end_override: Option<NaiveDate>) -> BarGeometry {
        let end_date = end_override
            .unwrap_or(task.planned_end_date)
            .max(task.start_date);
        let start_px = self.pixel_offset(task.start_date);
        let end_px = self.pixel_offset(end_date) + self.day_width;
        let deadline_px = task
            .hard_deadline
            .map(|d| self.pixel_offset(d) + self.day_width);
        let overdue = match deadline_px {
            Some(deadline) if end_px > deadline => Some((deadline.max(start_px), end_px)),
            _ => None,
        };
        let progress_px = (end_px - start_px) * task.progress.min(100) as i64 / 100;
        BarGeometry {
            start_px,
            end_px,
            deadline_px,
            overdue,
            progress_px,
        }
    }
}

/// Where a task's bar sits on a `TimelineAxis`. `end_px` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarGeometry {
    pub start_px: i64,
    pub end_px: i64,
    /// End of the hard-deadline day, where the marker is drawn
    pub deadline_px: Option<i64>,
    /// `[from, to)` beyond the deadline
    pub overdue: Option<(i64, i64)>,
    /// Filled width measured from `start_px`, across the whole bar
    pub progress_px: i64,
}

impl BarGeometry {
    pub fn width(&self) -> i64 {
        self.end_px - self.start_px
    }

    pub fn contains(&self, px: i64) -> bool {
        px >= self.start_px && px < self.end_px
    }

    pub fn is_overdue_at(&self, px: i64) -> bool {
        self.overdue.is_some_and(|(from, to)| px >= from && px < to)
    }

    pub fn is_filled_at(&self, px: i64) -> bool {
        px >= self.start_px && px < self.start_px + self.progress_px
    }

    /// The resize handle: the last `handle` units of the bar.
    pub fn is_trailing_edge(&self, px: i64, handle: i64) -> bool {
        let from = (self.end_px - handle.max(1)).max(self.start_px);
        px >= from && px < self.end_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::task_ops::new_task;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const TODAY: &str = "2025-05-10";

    fn axis() -> TimelineAxis {
        TimelineAxis::new(date(TODAY), 2, 14, 50)
    }

    fn task(start: &str, end: &str) -> Task {
        let mut t = new_task("T-001".into(), "bar", Some(date(end)), date(TODAY));
        t.start_date = date(start);
        t
    }

    #[test]
    fn window_is_seventeen_days() {
        let axis = axis();
        assert_eq!(axis.start, date("2025-05-08"));
        assert_eq!(axis.end, date("2025-05-24"));
        assert_eq!(axis.day_count(), 17);
        assert_eq!(axis.width(), 850);
        let days: Vec<NaiveDate> = axis.days().collect();
        assert_eq!(days.first(), Some(&date("2025-05-08")));
        assert_eq!(days.last(), Some(&date("2025-05-24")));
    }

    #[test]
    fn bar_from_today_for_four_days() {
        let axis = axis();
        let bar = axis.bar(&task("2025-05-10", "2025-05-13"), None);
        assert_eq!(axis.pixel_offset(date(TODAY)), 100);
        assert_eq!(bar.start_px, 100);
        assert_eq!(bar.end_px, 300);
        assert_eq!(bar.width(), 200);
        assert_eq!(bar.deadline_px, None);
        assert_eq!(bar.overdue, None);
    }

    #[test]
    fn dates_before_axis_are_negative() {
        assert_eq!(axis().pixel_offset(date("2025-05-01")), -350);
    }

    #[test]
    fn date_at_inverts_offset() {
        let axis = axis();
        assert_eq!(axis.date_at(0), date("2025-05-08"));
        assert_eq!(axis.date_at(49), date("2025-05-08"));
        assert_eq!(axis.date_at(100), date(TODAY));
        assert_eq!(axis.date_at(-1), date("2025-05-07"));
    }

    #[test]
    fn overdue_segment_past_deadline() {
        let axis = axis();
        let mut t = task("2025-05-10", "2025-05-15");
        t.hard_deadline = Some(date("2025-05-12"));
        let bar = axis.bar(&t, None);
        // deadline day ends at offset(12th) + 50 = 200 + 50
        assert_eq!(bar.deadline_px, Some(250));
        assert_eq!(bar.overdue, Some((250, 400)));
        assert!(bar.is_overdue_at(300));
        assert!(!bar.is_overdue_at(200));
    }

    #[test]
    fn end_on_deadline_day_is_not_overdue() {
        let axis = axis();
        let mut t = task("2025-05-10", "2025-05-12");
        t.hard_deadline = Some(date("2025-05-12"));
        let bar = axis.bar(&t, None);
        assert_eq!(bar.deadline_px, Some(bar.end_px));
        assert_eq!(bar.overdue, None);
    }

    #[test]
    fn progress_spans_whole_bar_including_overdue() {
        let axis = axis();
        let mut t = task("2025-05-10", "2025-05-13");
        t.progress = 50;
        t.hard_deadline = Some(date("2025-05-10"));
        let bar = axis.bar(&t, None);
        assert_eq!(bar.progress_px, 100);
        assert!(bar.is_filled_at(199));
        assert!(!bar.is_filled_at(200));
    }

    #[test]
    fn end_before_start_is_clamped_to_one_day() {
        let axis = axis();
        let bar = axis.bar(&task("2025-05-12", "2025-05-09"), None);
        assert_eq!(bar.start_px, 200);
        assert_eq!(bar.end_px, 250);
    }

    #[test]
    fn end_override_replaces_planned_end() {
        let axis = axis();
        let bar = axis.bar(&task("2025-05-10", "2025-05-10"), Some(date("2025-05-12")));
        assert_eq!(bar.end_px, 250);
    }

    #[test]
    fn delta_days_rounds_to_nearest() {
        let axis = axis();
        assert_eq!(axis.delta_days(0), 0);
        assert_eq!(axis.delta_days(24), 0);
        assert_eq!(axis.delta_days(25), 1);
        assert_eq!(axis.delta_days(100), 2);
        assert_eq!(axis.delta_days(-24), 0);
        assert_eq!(axis.delta_days(-26), -1);
        assert_eq!(axis.delta_days(-100), -2);
    }

    #[test]
    fn trailing_edge_hit_test() {
        let axis = TimelineAxis::new(date(TODAY), 2, 14, 4);
        let bar = axis.bar(&task("2025-05-10", "2025-05-11"), None);
        assert_eq!((bar.start_px, bar.end_px), (8, 16));
        assert!(bar.is_trailing_edge(15, 1));
        assert!(!bar.is_trailing_edge(14, 1));
        assert!(!bar.is_trailing_edge(16, 1));
        assert!(bar.is_trailing_edge(14, 2));
        assert!(bar.contains(8));
        assert!(!bar.contains(16));
    }

    #[test]
    fn from_config_uses_window_settings() {
        let config = TimelineConfig {
            day_width: 3,
            days_before: 1,
            days_after: 5,
        };
        let axis = TimelineAxis::from_config(date(TODAY), &config);
        assert_eq!(axis.start, date("2025-05-09"));
        assert_eq!(axis.day_count(), 7);
        assert_eq!(axis.day_width, 3);
    }
}
