//! Pointer drags that edit a task: resizing a timeline bar and scrubbing a
//! progress bar.
//!
//! Both are `idle -> dragging -> idle` machines holding at most one drag.
//! Moves only change the preview; the store is touched once, through the
//! commit returned when the drag ends.

use chrono::{Duration, NaiveDate};

use crate::model::task::{Task, TaskPatch};
use crate::ops::timeline::TimelineAxis;

/// How a drag ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEnd {
    /// Button released
    Release,
    /// The terminal lost focus mid-drag; treated like a release
    FocusLost,
    /// Escape: drop the preview
    Cancel,
}

impl GestureEnd {
    fn commits(self) -> bool {
        !matches!(self, GestureEnd::Cancel)
    }
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResizeDrag {
    task_id: String,
    start_x: i64,
    initial_end: NaiveDate,
    min_end: NaiveDate,
    candidate: NaiveDate,
}

/// The one mutation a finished resize asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeCommit {
    pub task_id: String,
    pub planned_end: NaiveDate,
}

impl ResizeCommit {
    pub fn patch(&self) -> TaskPatch {
        TaskPatch::new().planned_end_date(self.planned_end)
    }
}

#[derive(Debug, Default)]
pub struct ResizeGesture {
    drag: Option<ResizeDrag>,
}

impl ResizeGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_task(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.task_id.as_str())
    }

    /// Press on a bar's trailing edge at `x`.
    ///
    /// A press while a drag is already running ends that drag as a release
    /// and starts nothing; its commit, if any, is returned.
    pub fn begin(&mut self, task: &Task, x: i64) -> Option<ResizeCommit> {
        if self.drag.is_some() {
            return self.finish(GestureEnd::Release);
        }
        self.drag = Some(ResizeDrag {
            task_id: task.id.clone(),
            start_x: x,
            initial_end: task.planned_end_date,
            min_end: task.start_date,
            candidate: task.planned_end_date,
        });
        None
    }

    /// Pointer moved to `x`. Returns the new candidate end date.
    ///
    /// The candidate never goes before the task's start date.
    pub fn update(&mut self, x: i64, axis: &TimelineAxis) -> Option<NaiveDate> {
        let drag = self.drag.as_mut()?;
        let delta = axis.delta_days(x - drag.start_x);
        let proposed = drag.initial_end + Duration::days(delta);
        drag.candidate = proposed.max(drag.min_end.min(drag.initial_end));
        Some(drag.candidate)
    }

    /// Preview end date for `task_id` while it is being resized
    pub fn preview(&self, task_id: &str) -> Option<NaiveDate> {
        self.drag
            .as_ref()
            .filter(|d| d.task_id == task_id)
            .map(|d| d.candidate)
    }

    /// End the drag. State is cleared whatever the outcome; a commit comes
    /// back only for a release-like end that moved the end date.
    pub fn finish(&mut self, end: GestureEnd) -> Option<ResizeCommit> {
        let drag = self.drag.take()?;
        (end.commits() && drag.candidate != drag.initial_end).then(|| ResizeCommit {
            task_id: drag.task_id,
            planned_end: drag.candidate,
        })
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProgressDrag {
    task_id: String,
    width: i64,
    initial: u8,
    candidate: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressCommit {
    pub task_id: String,
    pub progress: u8,
}

impl ProgressCommit {
    pub fn patch(&self) -> TaskPatch {
        TaskPatch::new().progress(self.progress as i64)
    }
}

/// Progress for a pointer `x` units into a bar `width` wide, rounded and
/// clamped to 0..=100.
pub fn progress_at(x: i64, width: i64) -> u8 {
    let width = width.max(1);
    (x * 200 + width).div_euclid(2 * width).clamp(0, 100) as u8
}

#[derive(Debug, Default)]
pub struct ProgressGesture {
    drag: Option<ProgressDrag>,
}

impl ProgressGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_task(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.task_id.as_str())
    }

    /// Press on a progress bar `width` wide, `x` units from its left edge.
    ///
    /// Tasks with auto-progress refuse the drag. As with resizing, a press
    /// during a drag ends it as a release.
    pub fn begin(&mut self, task: &Task, x: i64, width: i64) -> Option<ProgressCommit> {
        if self.drag.is_some() {
            return self.finish(GestureEnd::Release);
        }
        if task.auto_progress {
            return None;
        }
        let width = width.max(1);
        self.drag = Some(ProgressDrag {
            task_id: task.id.clone(),
            width,
            initial: task.progress,
            candidate: progress_at(x, width),
        });
        None
    }

    pub fn update(&mut self, x: i64) -> Option<u8> {
        let drag = self.drag.as_mut()?;
        drag.candidate = progress_at(x, drag.width);
        Some(drag.candidate)
    }

    pub fn preview(&self, task_id: &str) -> Option<u8> {
        self.drag
            .as_ref()
            .filter(|d| d.task_id == task_id)
            .map(|d| d.candidate)
    }

    pub fn finish(&mut self, end: GestureEnd) -> Option<ProgressCommit> {
        let drag = self.drag.take()?;
        (end.commits() && drag.candidate != drag.initial).then(|| ProgressCommit {
            task_id: drag.task_id,
            progress: drag.candidate,
        })
    }
}
