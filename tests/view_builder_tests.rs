use chrono::{NaiveDate, NaiveDateTime};
use project_gantt::{GanttView, ProjectTask, UndatedPolicy, ViewConfig};

fn d(y: i32, m: u32, d0: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d0).unwrap()
}

fn dt(y: i32, m: u32, d0: u32) -> NaiveDateTime {
    d(y, m, d0).and_hms_opt(0, 0, 0).unwrap()
}

fn view_for_january() -> GanttView {
    let mut config = ViewConfig::default();
    config.date_from = d(2024, 1, 1);
    config.date_to = d(2024, 1, 31);
    GanttView::new_with_config(config)
}

#[test]
fn window_admits_overlapping_tasks_only() {
    let mut view = view_for_january();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        1,
        "Inside",
        dt(2024, 1, 10),
        dt(2024, 1, 20),
    ))
    .unwrap();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        2,
        "StraddlesStart",
        dt(2023, 12, 20),
        dt(2024, 1, 5),
    ))
    .unwrap();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        3,
        "Before",
        dt(2023, 11, 1),
        dt(2023, 11, 30),
    ))
    .unwrap();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        4,
        "After",
        dt(2024, 2, 10),
        dt(2024, 2, 20),
    ))
    .unwrap();

    let visible: Vec<i32> = view.visible_tasks().unwrap().iter().map(|t| t.id).collect();
    assert_eq!(visible, vec![1, 2]);
}

#[test]
fn window_boundaries_are_inclusive() {
    let mut view = view_for_january();
    // Ends exactly at window start and starts exactly at window end.
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        1,
        "EndsAtFrom",
        dt(2023, 12, 25),
        dt(2024, 1, 1),
    ))
    .unwrap();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        2,
        "StartsAtTo",
        dt(2024, 1, 31),
        dt(2024, 2, 10),
    ))
    .unwrap();

    assert_eq!(view.visible_tasks().unwrap().len(), 2);
}

#[test]
fn project_filter_restricts_chart() {
    let mut view = view_for_january();
    let mut alpha = ProjectTask::with_gantt_dates(1, "Alpha", dt(2024, 1, 2), dt(2024, 1, 6));
    alpha.project_id = Some(10);
    let mut beta = ProjectTask::with_gantt_dates(2, "Beta", dt(2024, 1, 2), dt(2024, 1, 6));
    beta.project_id = Some(20);
    view.upsert_task_record(alpha).unwrap();
    view.upsert_task_record(beta).unwrap();

    view.set_project_filter(Some(10));
    let entries = view.chart().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 1);
    assert_eq!(entries[0].custom_class, "pgc-task-10");

    view.set_project_filter(None);
    assert_eq!(view.chart().unwrap().len(), 2);
}

#[test]
fn undated_tasks_are_hidden_unless_marker_policy() {
    let mut view = view_for_january();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        1,
        "Dated",
        dt(2024, 1, 2),
        dt(2024, 1, 6),
    ))
    .unwrap();
    let mut partial = ProjectTask::new(2, "Partial");
    partial.gantt.start = Some(dt(2024, 1, 15));
    view.upsert_task_record(partial).unwrap();
    view.upsert_task_record(ProjectTask::new(3, "Bare")).unwrap();

    assert_eq!(view.chart().unwrap().len(), 1);

    view.set_undated_policy(UndatedPolicy::Marker);
    let entries = view.chart().unwrap();
    assert_eq!(entries.len(), 2);
    let marker = entries.iter().find(|e| e.id == 2).unwrap();
    assert_eq!(marker.start, marker.end);
}

#[test]
fn refresh_summary_counts_match_chart() {
    let mut view = view_for_january();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        1,
        "Visible",
        dt(2024, 1, 2),
        dt(2024, 1, 6),
    ))
    .unwrap();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        2,
        "OutOfWindow",
        dt(2024, 5, 2),
        dt(2024, 5, 6),
    ))
    .unwrap();
    view.upsert_task_record(ProjectTask::new(3, "Undated"))
        .unwrap();

    let summary = view.refresh().unwrap();
    assert_eq!(summary.stored_count, 3);
    assert_eq!(summary.visible_count, 1);
    assert_eq!(summary.rendered_count, 1);
    assert_eq!(summary.undated_skipped, 1);
    assert_eq!(summary.date_from, d(2024, 1, 1));

    let text = summary.to_cli_summary();
    assert!(text.contains("stored=3"));
    assert!(text.contains("undated=1"));
}

#[test]
fn reversed_window_is_rejected() {
    let mut view = GanttView::new();
    let err = view.set_window(d(2024, 2, 1), d(2024, 1, 1)).unwrap_err();
    assert!(err.to_string().contains("on or before"));
}

#[test]
fn delete_task_drops_dependency_references() {
    let mut view = view_for_january();
    view.upsert_task_record(ProjectTask::with_gantt_dates(
        1,
        "A",
        dt(2024, 1, 2),
        dt(2024, 1, 6),
    ))
    .unwrap();
    let mut b = ProjectTask::with_gantt_dates(2, "B", dt(2024, 1, 8), dt(2024, 1, 12));
    b.depends_on = vec![1];
    view.upsert_task_record(b).unwrap();

    assert!(view.delete_task(1).unwrap());
    let remaining = view.find_task(2).unwrap().unwrap();
    assert!(remaining.depends_on.is_empty());
    assert!(!view.delete_task(1).unwrap());
}
