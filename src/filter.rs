//! Task filtering by priority and completion status.

use crate::fields::{Priority, StatusFilter};
use crate::task::Task;

/// Return the tasks matching both filters, in their original order.
///
/// A `None` filter matches everything.
pub fn filter_tasks(
    tasks: &[Task],
    priority: Option<Priority>,
    status: Option<StatusFilter>,
) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| priority.map_or(true, |p| t.priority == p))
        .filter(|t| status.map_or(true, |s| s.matches(t.completed)))
        .collect()
}
