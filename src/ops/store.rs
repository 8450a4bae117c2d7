use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::io::storage::TaskStorage;
use crate::model::task::{Subtask, Task, TaskPatch, TaskStatus};
use crate::ops::task_ops::{
    TaskError, apply_auto_progress, apply_patch, derive, new_task, next_subtask_id, next_task_id,
    toggled_subtasks,
};

/// What changed in a store mutation, handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Loaded,
    Added(String),
    Updated(String),
    Deleted(String),
}

pub type SubscriberId = usize;

type Observer = Box<dyn FnMut(&StoreEvent, &[Task])>;

/// The task collection and its mutation API.
///
/// Every mutation builds a new collection, swaps it in, saves it and then
/// notifies observers. Holders of a `snapshot()` keep seeing the collection
/// as it was when they took it.
pub struct TaskStore {
    tasks: Rc<Vec<Task>>,
    storage: Box<dyn TaskStorage>,
    observers: Vec<(SubscriberId, Observer)>,
    next_subscriber: SubscriberId,
    today: Option<NaiveDate>,
    id_prefix: String,
}

impl TaskStore {
    pub fn new(storage: Box<dyn TaskStorage>) -> Self {
        TaskStore {
            tasks: Rc::new(Vec::new()),
            storage,
            observers: Vec::new(),
            next_subscriber: 0,
            today: None,
            id_prefix: "T".to_string(),
        }
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_id_prefix(mut self, prefix: &str) -> Self {
        self.id_prefix = prefix.to_string();
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(crate::ops::task_ops::today)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> Rc<Vec<Task>> {
        Rc::clone(&self.tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn require(&self, id: &str) -> Result<&Task, TaskError> {
        self.get(id).ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent, &[Task]) + 'static) -> SubscriberId {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event, self.tasks.as_slice());
        }
    }

    /// Swap in a new collection, save it, then tell observers.
    fn commit(&mut self, tasks: Vec<Task>, event: StoreEvent) {
        self.tasks = Rc::new(tasks);
        self.storage.save_tasks(self.tasks.as_slice());
        self.notify(event);
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Replace the collection with what storage holds. Read failures give an
    /// empty collection.
    pub fn load_from_storage(&mut self) {
        let tasks = self.storage.load_tasks();
        info!(count = tasks.len(), "tasks loaded");
        self.tasks = Rc::new(tasks);
        self.notify(StoreEvent::Loaded);
    }

    /// Create an inbox task and return its id.
    pub fn add_task(&mut self, title: &str, planned_end: Option<NaiveDate>) -> String {
        let id = next_task_id(&self.tasks, &self.id_prefix);
        let task = new_task(id.clone(), title, planned_end, self.today());
        let mut tasks = self.tasks.as_ref().clone();
        tasks.push(task);
        debug!(id = %id, "task added");
        self.commit(tasks, StoreEvent::Added(id.clone()));
        id
    }

    /// Merge `patch` into the task, then recompute progress and completion.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<(), TaskError> {
        let current = self.require(id)?;
        let updated = derive(apply_patch(current, patch));
        self.replace(updated);
        Ok(())
    }

    fn replace(&mut self, updated: Task) {
        let id = updated.id.clone();
        debug!(id = %id, status = %updated.status, progress = updated.progress, "task updated");
        let tasks = self
            .tasks
            .iter()
            .map(|t| if t.id == id { updated.clone() } else { t.clone() })
            .collect();
        self.commit(tasks, StoreEvent::Updated(id));
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, TaskError> {
        let removed = self.require(id)?.clone();
        let tasks = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        debug!(id = %id, "task deleted");
        self.commit(tasks, StoreEvent::Deleted(id.to_string()));
        Ok(removed)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<(), TaskError> {
        let subtasks = toggled_subtasks(self.require(task_id)?, subtask_id)?;
        self.update_task(task_id, TaskPatch::new().subtasks(subtasks))
    }

    /// Start work: ongoing, starting today.
    pub fn promote(&mut self, id: &str) -> Result<(), TaskError> {
        let today = self.today();
        self.update_task(
            id,
            TaskPatch::new().status(TaskStatus::Ongoing).start_date(today),
        )
    }

    pub fn complete(&mut self, id: &str) -> Result<(), TaskError> {
        self.update_task(
            id,
            TaskPatch::new().status(TaskStatus::Completed).progress(100),
        )
    }

    /// Move a completed task back to ongoing. Skips the completion rule,
    /// otherwise a task at 100% would bounce straight back to completed.
    /// The next edit that runs the rules will complete it again.
    pub fn restore(&mut self, id: &str) -> Result<(), TaskError> {
        let current = self.require(id)?;
        if current.status != TaskStatus::Completed {
            warn!(id = %id, status = %current.status, "restore of a task that is not completed");
            return Err(TaskError::NotCompleted(id.to_string()));
        }
        let updated = apply_auto_progress(apply_patch(
            current,
            TaskPatch::new().status(TaskStatus::Ongoing),
        ));
        self.replace(updated);
        Ok(())
    }

    pub fn archive(&mut self, id: &str) -> Result<(), TaskError> {
        self.update_task(id, TaskPatch::new().status(TaskStatus::Archived))
    }

    pub fn set_progress(&mut self, id: &str, value: i64) -> Result<(), TaskError> {
        self.update_task(id, TaskPatch::new().progress(value))
    }

    pub fn add_subtask(&mut self, id: &str, text: &str) -> Result<String, TaskError> {
        let task = self.require(id)?;
        let sub_id = next_subtask_id(task);
        let mut subtasks = task.subtasks.clone();
        subtasks.push(Subtask {
            id: sub_id.clone(),
            text: text.to_string(),
            done: false,
        });
        self.update_task(id, TaskPatch::new().subtasks(subtasks))?;
        Ok(sub_id)
    }

    pub fn remove_subtask(&mut self, id: &str, subtask_id: &str) -> Result<(), TaskError> {
        let task = self.require(id)?;
        if task.find_subtask(subtask_id).is_none() {
            return Err(TaskError::SubtaskNotFound {
                task_id: id.to_string(),
                subtask_id: subtask_id.to_string(),
            });
        }
        let subtasks = task
            .subtasks
            .iter()
            .filter(|s| s.id != subtask_id)
            .cloned()
            .collect();
        self.update_task(id, TaskPatch::new().subtasks(subtasks))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
