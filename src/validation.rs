use crate::task::ProjectTask;
use chrono::NaiveDateTime;
use std::fmt;

/// Raised when a task carries both Gantt dates and the end precedes the
/// start. The write that triggered the check must be rejected wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidDateRange {
    pub task_id: i32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl fmt::Display for InvalidDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {}: Gantt end {} must be on or after Gantt start {}",
            self.task_id, self.end, self.start
        )
    }
}

impl std::error::Error for InvalidDateRange {}

/// Checks the date-range constraint on a single task. A task with either
/// date unset always passes; equal start and end is valid.
pub fn validate_gantt_dates(task: &ProjectTask) -> Result<(), InvalidDateRange> {
    if let (Some(start), Some(end)) = (task.gantt.start, task.gantt.end) {
        if end < start {
            return Err(InvalidDateRange {
                task_id: task.id,
                start,
                end,
            });
        }
    }
    Ok(())
}

/// Checks every task independently; the first violation aborts the batch.
pub fn validate_task_collection(tasks: &[ProjectTask]) -> Result<(), InvalidDateRange> {
    for task in tasks {
        validate_gantt_dates(task)?;
    }
    Ok(())
}
