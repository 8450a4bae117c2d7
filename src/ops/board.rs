use serde::Serialize;

use crate::model::task::{Task, TaskStatus};

/// The dashboard partitions of one collection snapshot.
///
/// Each list keeps collection order. Nothing here is stored: rebuild it from
/// the store after every change.
#[derive(Debug, Clone, Default)]
pub struct Board<'a> {
    pub inbox: Vec<&'a Task>,
    pub ongoing: Vec<&'a Task>,
    /// Completed tasks
    pub history: Vec<&'a Task>,
    pub archived: Vec<&'a Task>,
}

impl<'a> Board<'a> {
    pub fn from_tasks(tasks: &'a [Task]) -> Self {
        let mut board = Board::default();
        for task in tasks {
            match task.status {
                TaskStatus::Inbox => board.inbox.push(task),
                TaskStatus::Ongoing => board.ongoing.push(task),
                TaskStatus::Completed => board.history.push(task),
                TaskStatus::Archived => board.archived.push(task),
            }
        }
        board
    }

    pub fn section(&self, status: TaskStatus) -> &[&'a Task] {
        match status {
            TaskStatus::Inbox => &self.inbox,
            TaskStatus::Ongoing => &self.ongoing,
            TaskStatus::Completed => &self.history,
            TaskStatus::Archived => &self.archived,
        }
    }
}

/// Tasks drawn on the timeline: everything not completed or archived.
pub fn timeline_rows(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| !t.status.is_closed()).collect()
}

pub fn by_status(tasks: &[Task], status: TaskStatus) -> Vec<&Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub inbox: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub archived: usize,
    /// Open tasks whose planned end is past their hard deadline
    pub overdue: usize,
}

pub fn board_stats(tasks: &[Task]) -> BoardStats {
    let mut stats = BoardStats::default();
    for task in tasks {
        match task.status {
            TaskStatus::Inbox => stats.inbox += 1,
            TaskStatus::Ongoing => stats.ongoing += 1,
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Archived => stats.archived += 1,
        }
        if !task.status.is_closed() && task.is_overdue() {
            stats.overdue += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;
    use crate::ops::store::TaskStore;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// inbox T-001, ongoing T-002 (overdue), completed T-003, archived T-004
    fn populated() -> TaskStore {
        let mut store =
            TaskStore::new(Box::new(MemoryStorage::new())).with_today(date("2025-05-10"));
        store.add_task("inbox", None);
        let ongoing = store.add_task("ongoing", Some(date("2025-05-20")));
        store.promote(&ongoing).unwrap();
        store
            .update_task(
                &ongoing,
                crate::model::task::TaskPatch::new().hard_deadline(Some(date("2025-05-15"))),
            )
            .unwrap();
        let done = store.add_task("done", None);
        store.complete(&done).unwrap();
        let old = store.add_task("old", None);
        store.archive(&old).unwrap();
        store
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn partitions_by_status() {
        let store = populated();
        let board = Board::from_tasks(store.tasks());
        assert_eq!(ids(&board.inbox), vec!["T-001"]);
        assert_eq!(ids(&board.ongoing), vec!["T-002"]);
        assert_eq!(ids(&board.history), vec!["T-003"]);
        assert_eq!(ids(&board.archived), vec!["T-004"]);
        assert_eq!(ids(board.section(TaskStatus::Completed)), vec!["T-003"]);
    }

    #[test]
    fn timeline_rows_exclude_closed() {
        let store = populated();
        assert_eq!(ids(&timeline_rows(store.tasks())), vec!["T-001", "T-002"]);
    }

    #[test]
    fn delete_removes_from_every_partition() {
        let mut store = populated();
        store.delete_task("T-002").unwrap();
        store.delete_task("T-003").unwrap();
        let board = Board::from_tasks(store.tasks());
        let all: Vec<String> = [
            &board.inbox,
            &board.ongoing,
            &board.history,
            &board.archived,
        ]
        .iter()
        .flat_map(|section| ids(section))
        .chain(ids(&timeline_rows(store.tasks())))
        .collect();
        assert!(!all.iter().any(|id| id == "T-002" || id == "T-003"));
    }

    #[test]
    fn stats_count_sections_and_overdue() {
        let store = populated();
        assert_eq!(
            board_stats(store.tasks()),
            BoardStats {
                inbox: 1,
                ongoing: 1,
                completed: 1,
                archived: 1,
                overdue: 1,
            }
        );
    }

    #[test]
    fn by_status_filters() {
        let store = populated();
        assert_eq!(ids(&by_status(store.tasks(), TaskStatus::Archived)), vec!["T-004"]);
    }
}
