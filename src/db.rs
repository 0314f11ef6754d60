//! Task store and date parsing utilities.
//!
//! `Database` holds the ordered task list and the global session counter in
//! memory, and writes them back through a [`KeyValueStore`] after every
//! mutation. Tasks are addressed by stable id; positional helpers exist for
//! callers that work with list indices and are bounds-checked.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::{Result, TrackerError};
use crate::storage::{load_json, save_json, KeyValueStore, TASKS_KEY, TOTAL_POMODOROS_KEY};
use crate::task::{Task, TaskDraft, TaskId};

/// In-memory task list backed by a persistent key/value store.
#[derive(Debug)]
pub struct Database<S: KeyValueStore> {
    tasks: Vec<Task>,
    total_pomodoros: u64,
    next_id: TaskId,
    store: S,
}

impl<S: KeyValueStore> Database<S> {
    /// Load tasks and the session counter from `store`.
    ///
    /// Missing or corrupt entries load as an empty list and a zero counter.
    /// Records without an id (or with a duplicate one) are given fresh ids.
    pub fn load(store: S) -> Self {
        let mut tasks: Vec<Task> = load_json(&store, TASKS_KEY);
        let total_pomodoros: u64 = load_json(&store, TOTAL_POMODOROS_KEY);

        let mut next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let mut seen = std::collections::HashSet::new();
        let mut reassigned = 0usize;
        for task in tasks.iter_mut() {
            if task.id == 0 || !seen.insert(task.id) {
                task.id = next_id;
                seen.insert(next_id);
                next_id += 1;
                reassigned += 1;
            }
        }
        if reassigned > 0 {
            tracing::info!(reassigned, "assigned ids to stored tasks");
        }
        tracing::debug!(tasks = tasks.len(), total_pomodoros, "task store loaded");

        Database { tasks, total_pomodoros, next_id, store }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn total_pomodoros(&self) -> u64 {
        self.total_pomodoros
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Current list position of a task.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Id of the task at `index`.
    pub fn id_at(&self, index: usize) -> Result<TaskId> {
        self.tasks
            .get(index)
            .map(|t| t.id)
            .ok_or(TrackerError::IndexOutOfRange { index, len: self.tasks.len() })
    }

    /// Number of tasks whose completion flag is set.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Validate `draft` and append it as a new task, then persist the list.
    pub fn add(&mut self, draft: TaskDraft) -> Result<TaskId> {
        let task = draft.into_task(self.next_id)?;
        let id = task.id;
        let title = task.title.clone();
        let mut tasks = self.tasks.clone();
        tasks.push(task);
        self.commit_tasks(tasks)?;
        self.next_id += 1;
        tracing::info!(id, %title, "task added");
        Ok(id)
    }

    /// Remove the task with `id` and persist the list.
    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id).ok_or(TrackerError::NotFound(id))?;
        self.remove_index(index)
    }

    /// Remove the task at list position `index` and persist the list.
    pub fn delete_at(&mut self, index: usize) -> Result<Task> {
        if index >= self.tasks.len() {
            return Err(TrackerError::IndexOutOfRange { index, len: self.tasks.len() });
        }
        self.remove_index(index)
    }

    fn remove_index(&mut self, index: usize) -> Result<Task> {
        let mut tasks = self.tasks.clone();
        let task = tasks.remove(index);
        self.commit_tasks(tasks)?;
        tracing::info!(id = task.id, title = %task.title, "task deleted");
        Ok(task)
    }

    /// Count one finished work session against `id` and the global counter.
    ///
    /// Returns the task's new session count.
    pub fn increment_pomodoros(&mut self, id: TaskId) -> Result<u64> {
        let index = self.position(id).ok_or(TrackerError::NotFound(id))?;
        let mut tasks = self.tasks.clone();
        tasks[index].pomodoros += 1;
        let count = tasks[index].pomodoros;
        let total = self.total_pomodoros + 1;

        save_json(&mut self.store, TASKS_KEY, &tasks)?;
        if let Err(e) = save_json(&mut self.store, TOTAL_POMODOROS_KEY, &total) {
            // Put the stored list back so both keys still agree.
            if let Err(restore) = save_json(&mut self.store, TASKS_KEY, &self.tasks) {
                tracing::error!(error = %restore, "could not restore task list");
            }
            return Err(e.into());
        }
        self.tasks = tasks;
        self.total_pomodoros = total;
        tracing::info!(id, count, total, "pomodoro recorded");
        Ok(count)
    }

    /// Positional form of [`Database::increment_pomodoros`].
    pub fn increment_pomodoros_at(&mut self, index: usize) -> Result<u64> {
        let id = self.id_at(index)?;
        self.increment_pomodoros(id)
    }

    /// Set the completion flag on a task.
    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<()> {
        let index = self.position(id).ok_or(TrackerError::NotFound(id))?;
        if self.tasks[index].completed == completed {
            return Ok(());
        }
        let mut tasks = self.tasks.clone();
        tasks[index].completed = completed;
        self.commit_tasks(tasks)?;
        tracing::info!(id, completed, "task completion changed");
        Ok(())
    }

    /// Flip the completion flag on a task, returning the new value.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool> {
        let completed = !self.get(id).ok_or(TrackerError::NotFound(id))?.completed;
        self.set_completed(id, completed)?;
        Ok(completed)
    }

    /// Persist `tasks` and only then make it the in-memory list.
    fn commit_tasks(&mut self, tasks: Vec<Task>) -> Result<()> {
        save_json(&mut self.store, TASKS_KEY, &tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}

/// Parse human-readable due date input with smart natural language support.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "next monday", "next tuesday", etc.
/// - "this friday", "this weekend"
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" format
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    parse_due_input_from(s, Local::now().date_naive())
}

/// [`parse_due_input`] relative to an explicit `today`.
pub fn parse_due_input_from(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_this_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = (today.year(), today.month());
            let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
            let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some((split, _)) = rest.char_indices().last() {
            let (amount, unit) = rest.split_at(split);
            if let Ok(n) = amount.trim().parse::<i64>() {
                let offset = match unit {
                    "d" => Duration::try_days(n),
                    "w" => Duration::try_weeks(n),
                    // Approximate: 30 days per month
                    "m" => n.checked_mul(30).and_then(Duration::try_days),
                    _ => None,
                };
                return offset.and_then(|d| today.checked_add_signed(d));
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current_day = today.weekday().num_days_from_monday() as i64;
    for (day_name, target_day) in weekdays {
        let days_ahead = (target_day + 7 - current_day) % 7;
        if s == day_name || s == format!("this {day_name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {day_name}") {
            let days_to_add = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days_to_add));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Calculate the start and end dates of the current ISO week (Monday to Sunday).
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::fields::Priority;
    use crate::storage::MemoryStore;
    use rstest::{fixture, rstest};

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::new(title, Priority::Medium, "2026-10-20")
    }

    #[fixture]
    fn db() -> Database<MemoryStore> {
        let mut db = Database::load(MemoryStore::new());
        for title in ["a", "b", "c"] {
            db.add(draft(title)).unwrap();
        }
        db
    }

    fn titles<S: KeyValueStore>(db: &Database<S>) -> Vec<&str> {
        db.tasks().iter().map(|t| t.title.as_str()).collect()
    }

    #[rstest]
    fn add_appends_in_insertion_order(db: Database<MemoryStore>) {
        assert_eq!(titles(&db), ["a", "b", "c"]);
        assert!(db.tasks().iter().all(|t| !t.completed && t.pomodoros == 0));
        let ids: Vec<_> = db.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[rstest]
    #[case("", "2026-10-20")]
    #[case("title", "")]
    fn add_rejects_missing_fields(mut db: Database<MemoryStore>, #[case] title: &str, #[case] deadline: &str) {
        let result = db.add(TaskDraft::new(title, Priority::Low, deadline));
        assert!(matches!(result, Err(TrackerError::Validation(_))));
        assert_eq!(titles(&db), ["a", "b", "c"]);
    }

    #[rstest]
    #[case(0, ["b", "c"])]
    #[case(1, ["a", "c"])]
    #[case(2, ["a", "b"])]
    fn delete_at_preserves_order(mut db: Database<MemoryStore>, #[case] index: usize, #[case] expected: [&str; 2]) {
        db.delete_at(index).unwrap();
        assert_eq!(titles(&db), expected);
    }

    #[rstest]
    fn delete_at_out_of_range_is_rejected(mut db: Database<MemoryStore>) {
        let result = db.delete_at(3);
        assert!(matches!(result, Err(TrackerError::IndexOutOfRange { index: 3, len: 3 })));
        assert_eq!(db.tasks().len(), 3);
    }

    #[rstest]
    fn delete_by_id_and_ids_are_not_reused(mut db: Database<MemoryStore>) {
        db.delete(2).unwrap();
        assert!(matches!(db.delete(2), Err(TrackerError::NotFound(2))));
        let id = db.add(draft("d")).unwrap();
        assert_eq!(id, 4);
    }

    #[rstest]
    fn increment_updates_task_and_global_counter(mut db: Database<MemoryStore>) {
        assert_eq!(db.increment_pomodoros(2).unwrap(), 1);
        assert_eq!(db.increment_pomodoros_at(1).unwrap(), 2);
        assert_eq!(db.total_pomodoros(), 2);
        assert!(matches!(db.increment_pomodoros(99), Err(TrackerError::NotFound(99))));
        assert!(matches!(db.increment_pomodoros_at(9), Err(TrackerError::IndexOutOfRange { .. })));
        assert_eq!(db.total_pomodoros(), 2);
    }

    #[rstest]
    fn toggle_completed_flips_flag(mut db: Database<MemoryStore>) {
        assert!(db.toggle_completed(1).unwrap());
        assert_eq!(db.completed_count(), 1);
        assert!(!db.toggle_completed(1).unwrap());
        assert_eq!(db.completed_count(), 0);
    }

    #[rstest]
    fn mutations_persist_to_store(mut db: Database<MemoryStore>) {
        db.increment_pomodoros(3).unwrap();
        db.set_completed(1, true).unwrap();
        db.delete(2).unwrap();

        let reloaded = Database::load(db.store().clone());
        assert_eq!(titles(&reloaded), ["a", "c"]);
        assert_eq!(reloaded.total_pomodoros(), 1);
        assert!(reloaded.get(1).unwrap().completed);
        assert_eq!(reloaded.get(3).unwrap().pomodoros, 1);
    }

    #[test]
    fn load_assigns_ids_to_legacy_records() {
        let mut store = MemoryStore::new();
        store
            .set(
                TASKS_KEY,
                r#"[{"title":"x","description":"","priority":"High","deadline":"2025-01-01","completed":false,"pomodoros":0},
                    {"id":5,"title":"y","priority":"low","deadline":"2025-01-02"},
                    {"id":5,"title":"z","priority":"Medium","deadline":"2025-01-03"}]"#,
            )
            .unwrap();
        let mut db = Database::load(store);
        let ids: Vec<_> = db.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, [6, 5, 7]);
        assert_eq!(db.add(draft("w")).unwrap(), 8);
    }

    #[rstest]
    #[case("today", "2026-10-16")]
    #[case("tomorrow", "2026-10-17")]
    #[case("in 3d", "2026-10-19")]
    #[case("in 2w", "2026-10-30")]
    #[case("friday", "2026-10-16")]
    #[case("next friday", "2026-10-23")]
    #[case("monday", "2026-10-19")]
    #[case("end of month", "2026-10-31")]
    #[case("eow", "2026-10-18")]
    #[case("weekend", "2026-10-17")]
    #[case("2027-02-03", "2027-02-03")]
    fn parses_due_inputs(#[case] input: &str, #[case] expected: &str) {
        // 2026-10-16 is a Friday.
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let expected = NaiveDate::parse_from_str(expected, "%Y-%m-%d").unwrap();
        assert_eq!(parse_due_input_from(input, today), Some(expected));
    }

    #[test]
    fn rejects_unparseable_due_input() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(parse_due_input_from("someday", today), None);
        assert_eq!(parse_due_input_from("in xd", today), None);
    }

    #[rstest]
    #[case("in 999999999d")]
    #[case("in 9999999999999999w")]
    #[case("in 9999999999999999m")]
    #[case("in 9223372036854775807d")]
    #[case("in -999999999d")]
    fn out_of_range_offsets_are_rejected(#[case] input: &str) {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(parse_due_input_from(input, today), None);
        let result = TaskDraft::new("x", Priority::Low, input).into_task(1);
        assert!(matches!(result, Err(TrackerError::Validation(_))));
    }

    /// Store whose writes fail for the keys listed in `failing`.
    #[derive(Debug, Default, Clone)]
    struct FailingStore {
        inner: MemoryStore,
        failing: Vec<&'static str>,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if self.failing.contains(&key) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn failing_db(failing: Vec<&'static str>) -> Database<FailingStore> {
        let mut db = Database::load(FailingStore::default());
        db.add(draft("a")).unwrap();
        db.add(draft("b")).unwrap();
        db.store.failing = failing;
        db
    }

    #[test]
    fn failed_save_leaves_tasks_unchanged() {
        let mut db = failing_db(vec![TASKS_KEY]);
        let before = db.tasks().to_vec();

        assert!(matches!(db.add(draft("c")), Err(TrackerError::Storage(_))));
        assert!(matches!(db.delete(1), Err(TrackerError::Storage(_))));
        assert!(matches!(db.toggle_completed(2), Err(TrackerError::Storage(_))));
        assert!(matches!(db.increment_pomodoros(2), Err(TrackerError::Storage(_))));
        assert_eq!(db.tasks(), before.as_slice());
        assert_eq!(db.total_pomodoros(), 0);

        // A retry after the store recovers adds the task exactly once.
        db.store.failing.clear();
        assert_eq!(db.add(draft("c")).unwrap(), 3);
        assert_eq!(titles(&db), ["a", "b", "c"]);
    }

    #[test]
    fn failed_counter_save_restores_stored_tasks() {
        let mut db = failing_db(vec![TOTAL_POMODOROS_KEY]);
        assert!(db.increment_pomodoros(1).is_err());
        assert_eq!(db.get(1).unwrap().pomodoros, 0);
        assert_eq!(db.total_pomodoros(), 0);

        let reloaded = Database::load(db.store().inner.clone());
        assert_eq!(reloaded.get(1).unwrap().pomodoros, 0);
        assert_eq!(reloaded.total_pomodoros(), 0);
    }
}
