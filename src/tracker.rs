//! The tracker ties the task store and the Pomodoro timer together.
//!
//! It is the single owner of all mutable state: surfaces call its methods and
//! read its accessors, and timer completions are applied to the store here.

use std::time::Instant;

use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::fields::{Priority, StatusFilter};
use crate::filter::filter_tasks;
use crate::stats::Statistics;
use crate::storage::KeyValueStore;
use crate::task::{Task, TaskDraft, TaskId};
use crate::timer::{PomodoroTimer, SessionDurations, TimerEvent};

pub struct Tracker<S: KeyValueStore> {
    db: Database<S>,
    timer: PomodoroTimer,
}

impl<S: KeyValueStore> Tracker<S> {
    pub fn new(store: S, durations: SessionDurations) -> Self {
        Self {
            db: Database::load(store),
            timer: PomodoroTimer::new(durations),
        }
    }

    pub fn db(&self) -> &Database<S> {
        &self.db
    }

    pub fn timer(&self) -> &PomodoroTimer {
        &self.timer
    }

    pub fn tasks(&self) -> &[Task] {
        self.db.tasks()
    }

    pub fn filtered(&self, priority: Option<Priority>, status: Option<StatusFilter>) -> Vec<&Task> {
        filter_tasks(self.db.tasks(), priority, status)
    }

    pub fn stats(&self) -> Statistics {
        Statistics::from_db(&self.db)
    }

    /// Task the timer is currently bound to.
    pub fn current_task(&self) -> Option<&Task> {
        self.timer.task().and_then(|id| self.db.get(id))
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<TaskId> {
        self.db.add(draft)
    }

    /// Delete a task; a timer bound to it is stopped and unbound.
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task> {
        let task = self.db.delete(id)?;
        self.release_timer(id);
        Ok(task)
    }

    pub fn delete_task_at(&mut self, index: usize) -> Result<Task> {
        let task = self.db.delete_at(index)?;
        self.release_timer(task.id);
        Ok(task)
    }

    fn release_timer(&mut self, id: TaskId) {
        if self.timer.task() == Some(id) {
            tracing::info!(id, "bound task deleted, stopping timer");
            self.timer.unbind();
        }
    }

    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool> {
        self.db.toggle_completed(id)
    }

    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<()> {
        self.db.set_completed(id, completed)
    }

    /// Start (or restart) the countdown for `id`.
    pub fn start_timer(&mut self, id: TaskId, now: Instant) -> Result<()> {
        if self.db.get(id).is_none() {
            return Err(TrackerError::NotFound(id));
        }
        self.timer.start(id, now);
        tracing::info!(id, remaining = self.timer.remaining(), phase = self.timer.phase().label(), "timer started");
        Ok(())
    }

    /// Start the countdown for the task at list position `index`.
    pub fn start_timer_at(&mut self, index: usize, now: Instant) -> Result<()> {
        let id = self.db.id_at(index)?;
        self.start_timer(id, now)
    }

    /// Restart the bound task's countdown. Returns `false` when nothing is bound.
    pub fn resume_timer(&mut self, now: Instant) -> Result<bool> {
        match self.timer.task() {
            Some(id) => self.start_timer(id, now).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        tracing::info!(remaining = self.timer.remaining(), "timer reset");
    }

    /// Apply one tick at `at`, recording a finished work session if one ends.
    pub fn tick(&mut self, at: Instant) -> Result<Option<TimerEvent>> {
        let Some(event) = self.timer.tick(at) else {
            return Ok(None);
        };
        match event {
            TimerEvent::WorkCompleted { task } => {
                self.db.increment_pomodoros(task)?;
                tracing::info!(task, "work session completed");
            }
            TimerEvent::BreakCompleted { task } => {
                tracing::info!(task, "break completed");
            }
        }
        Ok(Some(event))
    }

    /// Fire every tick due by `now` and return the phase changes they caused.
    pub fn advance(&mut self, now: Instant) -> Result<Vec<TimerEvent>> {
        let mut events = Vec::new();
        while let Some(at) = self.timer.poll(now) {
            if let Some(event) = self.tick(at)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}
