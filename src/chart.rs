use crate::task::ProjectTask;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One bar of the rendered chart, in the shape the charting widget expects.
/// Derived data only; recomputed from the visible task set on every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTask {
    pub id: i32,
    pub name: String,
    #[serde(with = "crate::task::wire_datetime_required")]
    pub start: NaiveDateTime,
    #[serde(with = "crate::task::wire_datetime_required")]
    pub end: NaiveDateTime,
    /// 0..=100, defaulted to 0 when the host progress field is absent or
    /// malformed.
    pub progress: f64,
    pub dependencies: Vec<i32>,
    pub custom_class: String,
}

/// What to do with a task that has only one of its Gantt dates set.
///
/// `Skip` reproduces the original module's behavior: the view query
/// required both dates, so partially dated tasks never reached the chart.
/// `Marker` instead renders them as a zero-width bar anchored at the one
/// date that is present. Tasks with neither date are always excluded;
/// there is nothing to anchor them to on a timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedPolicy {
    #[default]
    Skip,
    Marker,
}

impl UndatedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UndatedPolicy::Skip => "skip",
            UndatedPolicy::Marker => "marker",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "skip" => Some(UndatedPolicy::Skip),
            "marker" => Some(UndatedPolicy::Marker),
            _ => None,
        }
    }
}

/// The span a task would occupy on the timeline under `policy`, or `None`
/// when the task cannot be positioned.
pub(crate) fn bar_span(
    task: &ProjectTask,
    policy: UndatedPolicy,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    match (task.gantt.start, task.gantt.end) {
        (Some(start), Some(end)) => Some((start, end)),
        (Some(anchor), None) | (None, Some(anchor)) if policy == UndatedPolicy::Marker => {
            Some((anchor, anchor))
        }
        _ => None,
    }
}

fn clamp_progress(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

fn css_class(task: &ProjectTask) -> String {
    match task.project_id {
        Some(project) => format!("pgc-task-{project}"),
        None => "pgc-task-none".to_string(),
    }
}

/// Maps task records to chart entries. Pure and idempotent: entries are
/// ordered by (start, id), so rerunning on an unchanged list yields an
/// identical result. Dependency references to tasks that do not end up on
/// the chart are dropped rather than passed through as dangling ids.
pub fn build_chart(tasks: &[ProjectTask], policy: UndatedPolicy) -> Vec<ChartTask> {
    let rendered_ids: HashSet<i32> = tasks
        .iter()
        .filter(|task| bar_span(task, policy).is_some())
        .map(|task| task.id)
        .collect();

    let mut entries: Vec<ChartTask> = tasks
        .iter()
        .filter_map(|task| {
            let (start, end) = bar_span(task, policy)?;
            let dependencies = task
                .depends_on
                .iter()
                .copied()
                .filter(|dep| *dep != task.id && rendered_ids.contains(dep))
                .collect();
            Some(ChartTask {
                id: task.id,
                name: task.name.clone(),
                start,
                end,
                progress: clamp_progress(task.progress),
                dependencies,
                custom_class: css_class(task),
            })
        })
        .collect();

    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    entries
}
