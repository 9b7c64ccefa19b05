//! Ordered task list with a cursor.

use crate::task::{Task, TaskStatus};

/// Runs tasks strictly in order. The cursor starts before the first task;
/// each [`TaskSequencer::next_task`] advances it by one and never past the
/// end, so a drained sequencer keeps answering `None`.
#[derive(Debug, Clone, Default)]
pub struct TaskSequencer {
    tasks: Vec<(Task, TaskStatus)>,
    cursor: Option<usize>,
}

impl TaskSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut sequencer = Self::new();
        for task in tasks {
            sequencer.append(task);
        }
        sequencer
    }

    /// Queue `task` as pending. Refused once the sequencer has run past its
    /// last task.
    pub fn append(&mut self, task: Task) -> bool {
        if self.is_finished() {
            log::debug!("sequencer: refusing {task}, already finished");
            return false;
        }
        self.tasks.push((task, TaskStatus::Pending));
        true
    }

    /// Advance to the next task and mark it in progress.
    pub fn next_task(&mut self) -> Option<&Task> {
        let next = self.cursor.map_or(0, |index| index + 1);
        self.cursor = Some(next.min(self.tasks.len()));
        let (task, status) = self.tasks.get_mut(next)?;
        *status = TaskStatus::InProgress;
        Some(task)
    }

    /// Record the outcome of the current task. Without a current task this
    /// does nothing.
    pub fn update(&mut self, status: TaskStatus) {
        match self.cursor.and_then(|index| self.tasks.get_mut(index)) {
            Some((task, slot)) => {
                log::trace!("sequencer: {task} -> {status:?}");
                *slot = status;
            }
            None => log::debug!("sequencer: no current task for {status:?}"),
        }
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.cursor.and_then(|index| self.tasks.get(index)).map(|(task, _)| task)
    }

    pub fn current_status(&self) -> Option<&TaskStatus> {
        self.cursor.and_then(|index| self.tasks.get(index)).map(|(_, status)| status)
    }

    /// Index of the current task, `None` before the first `next_task` or
    /// once every task was handed out.
    pub fn position(&self) -> Option<usize> {
        self.cursor.filter(|index| *index < self.tasks.len())
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_some_and(|index| index >= self.tasks.len())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &TaskStatus> {
        self.tasks.iter().map(|(_, status)| status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Task, &TaskStatus)> {
        self.tasks.iter().map(|(task, status)| (task, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    fn two_tasks() -> TaskSequencer {
        TaskSequencer::with_tasks([Task::composition_data_get(0), Task::default_ttl_get()])
    }

    #[test]
    fn cursor_never_passes_the_end() {
        let mut sequencer = two_tasks();
        assert_eq!(sequencer.position(), None);
        assert!(sequencer.next_task().is_some());
        assert!(sequencer.next_task().is_some());
        assert!(sequencer.next_task().is_none());
        assert!(sequencer.next_task().is_none());
        assert!(sequencer.is_finished());
        assert_eq!(sequencer.position(), None);
    }

    #[test]
    fn composition_then_ttl_scenario() {
        let mut sequencer = two_tasks();
        assert_eq!(sequencer.next_task(), Some(&Task::composition_data_get(0)));
        sequencer.update(TaskStatus::Success);
        assert_eq!(sequencer.next_task(), Some(&Task::default_ttl_get()));
        let timeout = TaskError::Transport(crate::error::TransportError::Timeout);
        sequencer.update(TaskStatus::Failed(timeout.clone()));
        assert_eq!(sequencer.next_task(), None);
        let statuses: Vec<_> = sequencer.statuses().cloned().collect();
        assert_eq!(statuses, vec![TaskStatus::Success, TaskStatus::Failed(timeout)]);
    }

    #[test]
    fn handed_out_task_is_in_progress() {
        let mut sequencer = two_tasks();
        sequencer.next_task();
        assert_eq!(sequencer.current_status(), Some(&TaskStatus::InProgress));
        assert_eq!(sequencer.statuses().nth(1), Some(&TaskStatus::Pending));
    }

    #[test]
    fn update_out_of_range_is_ignored() {
        let mut sequencer = two_tasks();
        sequencer.update(TaskStatus::Success);
        assert!(sequencer.statuses().all(|status| *status == TaskStatus::Pending));

        while sequencer.next_task().is_some() {
            sequencer.update(TaskStatus::Success);
        }
        sequencer.update(TaskStatus::Failed(TaskError::Status(1)));
        assert!(sequencer.statuses().all(TaskStatus::is_success));
    }

    #[test]
    fn append_refused_after_finish() {
        let mut sequencer = TaskSequencer::new();
        assert!(sequencer.next_task().is_none());
        assert!(sequencer.is_finished());
        assert!(!sequencer.append(Task::default_ttl_get()));
        assert!(sequencer.is_empty());
    }

    #[test]
    fn append_while_running_extends_the_run() {
        let mut sequencer = two_tasks();
        sequencer.next_task();
        sequencer.next_task();
        assert!(sequencer.append(Task::scene_register_get(0)));
        assert_eq!(sequencer.next_task().map(Task::name), Some("scene-register-get"));
        assert_eq!(sequencer.position(), Some(2));
    }
}
