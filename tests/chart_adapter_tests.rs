use chrono::{NaiveDate, NaiveDateTime};
use project_gantt::{ProjectTask, UndatedPolicy, build_chart};

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn dated(id: i32, name: &str, start: NaiveDateTime, end: NaiveDateTime) -> ProjectTask {
    ProjectTask::with_gantt_dates(id, name, start, end)
}

#[test]
fn maps_dated_task_with_default_progress() {
    let task = dated(1, "A", dt(2024, 1, 1), dt(2024, 1, 5));
    let entries = build_chart(&[task], UndatedPolicy::Skip);

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.id, 1);
    assert_eq!(entry.name, "A");
    assert_eq!(entry.start, dt(2024, 1, 1));
    assert_eq!(entry.end, dt(2024, 1, 5));
    assert_eq!(entry.progress, 0.0);
    assert!(entry.dependencies.is_empty());
    assert_eq!(entry.custom_class, "pgc-task-none");
}

#[test]
fn output_never_exceeds_input_length() {
    let mut tasks = vec![
        dated(1, "A", dt(2024, 1, 1), dt(2024, 1, 5)),
        dated(2, "B", dt(2024, 1, 3), dt(2024, 1, 8)),
    ];
    tasks.push(ProjectTask::new(3, "Undated"));

    let entries = build_chart(&tasks, UndatedPolicy::Skip);
    assert_eq!(entries.len(), 2);
    assert!(entries.len() <= tasks.len());

    let marker_entries = build_chart(&tasks, UndatedPolicy::Marker);
    assert_eq!(marker_entries.len(), 2, "no anchor date, still excluded");
}

#[test]
fn adapter_is_idempotent() {
    let mut a = dated(1, "A", dt(2024, 1, 1), dt(2024, 1, 5));
    a.progress = Some(60.0);
    let mut b = dated(2, "B", dt(2024, 1, 1), dt(2024, 1, 9));
    b.depends_on = vec![1];
    let tasks = vec![b, a];

    let first = build_chart(&tasks, UndatedPolicy::Skip);
    let second = build_chart(&tasks, UndatedPolicy::Skip);
    assert_eq!(first, second);

    // Ties on start break by id, so ordering is stable too.
    assert_eq!(first[0].id, 1);
    assert_eq!(first[1].id, 2);
}

#[test]
fn dangling_dependencies_are_dropped_without_error() {
    let mut b = dated(2, "B", dt(2024, 1, 3), dt(2024, 1, 8));
    b.depends_on = vec![1, 77, 2];
    let mut undated_dep = ProjectTask::new(9, "NotRendered");
    undated_dep.depends_on = vec![2];

    let tasks = vec![
        dated(1, "A", dt(2024, 1, 1), dt(2024, 1, 5)),
        b,
        undated_dep,
    ];
    let entries = build_chart(&tasks, UndatedPolicy::Skip);

    assert_eq!(entries.len(), 2);
    // 77 never existed, 2 is a self-reference, and task 9 is not rendered,
    // so only the reference to task 1 survives.
    let b_entry = entries.iter().find(|e| e.id == 2).unwrap();
    assert_eq!(b_entry.dependencies, vec![1]);
}

#[test]
fn dependencies_on_skipped_tasks_are_dropped() {
    let mut undated = ProjectTask::new(1, "Undated");
    undated.gantt.start = Some(dt(2024, 1, 1));
    let mut b = dated(2, "B", dt(2024, 1, 3), dt(2024, 1, 8));
    b.depends_on = vec![1];

    let skip = build_chart(&[undated.clone(), b.clone()], UndatedPolicy::Skip);
    assert_eq!(skip.len(), 1);
    assert!(skip[0].dependencies.is_empty());

    // Under the marker policy task 1 is rendered, so the link survives.
    let marker = build_chart(&[undated, b], UndatedPolicy::Marker);
    assert_eq!(marker.len(), 2);
    let b_entry = marker.iter().find(|e| e.id == 2).unwrap();
    assert_eq!(b_entry.dependencies, vec![1]);
}

#[test]
fn progress_is_read_clamped_and_defaulted() {
    let mut half = dated(1, "Half", dt(2024, 1, 1), dt(2024, 1, 5));
    half.progress = Some(50.0);
    let mut over = dated(2, "Over", dt(2024, 1, 1), dt(2024, 1, 5));
    over.progress = Some(140.0);
    let missing = dated(3, "Missing", dt(2024, 1, 1), dt(2024, 1, 5));

    let entries = build_chart(&[half, over, missing], UndatedPolicy::Skip);
    let progress_of = |id: i32| entries.iter().find(|e| e.id == id).unwrap().progress;
    assert_eq!(progress_of(1), 50.0);
    assert_eq!(progress_of(2), 100.0);
    assert_eq!(progress_of(3), 0.0);
}

#[test]
fn custom_class_follows_project() {
    let mut task = dated(1, "A", dt(2024, 1, 1), dt(2024, 1, 5));
    task.project_id = Some(12);
    let entries = build_chart(&[task], UndatedPolicy::Skip);
    assert_eq!(entries[0].custom_class, "pgc-task-12");
}
