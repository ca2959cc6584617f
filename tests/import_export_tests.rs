use chrono::{NaiveDate, NaiveDateTime};
use project_gantt::{
    GanttView, ProjectTask, UndatedPolicy, ViewConfig, load_view_from_csv, load_view_from_json,
    save_view_to_csv, save_view_to_json,
};
use tempfile::NamedTempFile;

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn sample_view() -> GanttView {
    let mut config = ViewConfig::default();
    config.title = "Sprint Board".to_string();
    config.date_from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    config.date_to = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    config.project_id = Some(4);
    let mut view = GanttView::new_with_config(config);
    view.set_undated_policy(UndatedPolicy::Marker);

    let mut design = ProjectTask::with_gantt_dates(1, "Design", dt(2024, 1, 8), dt(2024, 1, 19));
    design.project_id = Some(4);
    design.progress = Some(75.0);
    design.stage = Some("Doing".to_string());
    view.upsert_task_record(design).unwrap();

    let mut build = ProjectTask::with_gantt_dates(2, "Build", dt(2024, 1, 22), dt(2024, 2, 16));
    build.project_id = Some(4);
    build.depends_on = vec![1];
    build.assignee = Some("ben".to_string());
    view.upsert_task_record(build).unwrap();

    view.upsert_task_record(ProjectTask::new(3, "Backlog item"))
        .unwrap();
    view
}

fn assert_views_equal(a: &GanttView, b: &GanttView) {
    assert_eq!(a.config(), b.config());
    assert_eq!(a.undated_policy(), b.undated_policy());
    assert_eq!(a.tasks().unwrap(), b.tasks().unwrap());
}

#[test]
fn json_round_trip_preserves_view() {
    let view = sample_view();
    let tmp = NamedTempFile::new().expect("create temp file");
    save_view_to_json(&view, tmp.path()).unwrap();
    let loaded = load_view_from_json(tmp.path()).unwrap();
    assert_views_equal(&view, &loaded);
}

#[test]
fn csv_round_trip_preserves_view() {
    let view = sample_view();
    let tmp = NamedTempFile::new().expect("create temp file");
    save_view_to_csv(&view, tmp.path()).unwrap();
    let loaded = load_view_from_csv(tmp.path()).unwrap();
    assert_views_equal(&view, &loaded);
}

#[test]
fn loaded_chart_matches_saved_chart() {
    let view = sample_view();
    let tmp = NamedTempFile::new().expect("create temp file");
    save_view_to_json(&view, tmp.path()).unwrap();
    let loaded = load_view_from_json(tmp.path()).unwrap();
    assert_eq!(view.chart().unwrap(), loaded.chart().unwrap());
}

#[test]
fn load_rejects_invalid_date_range() {
    let json = r#"{
        "config": {
            "title": "Bad",
            "date_from": "2024-01-01",
            "date_to": "2024-12-31",
            "view_mode": "Month"
        },
        "tasks": [
            {
                "id": 1,
                "name": "Reversed",
                "gantt_start_date": "2024-01-05 00:00:00",
                "gantt_end_date": "2024-01-01 00:00:00"
            }
        ]
    }"#;
    let tmp = NamedTempFile::new().expect("create temp file");
    std::fs::write(tmp.path(), json).unwrap();

    let err = load_view_from_json(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("must be on or after"));
}

#[test]
fn load_rejects_duplicate_task_ids() {
    let json = r#"{
        "config": {
            "title": "Dup",
            "date_from": "2024-01-01",
            "date_to": "2024-12-31",
            "view_mode": "Month"
        },
        "tasks": [
            { "id": 1, "name": "First" },
            { "id": 1, "name": "Second" }
        ]
    }"#;
    let tmp = NamedTempFile::new().expect("create temp file");
    std::fs::write(tmp.path(), json).unwrap();

    let err = load_view_from_json(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate task id"));
}

#[test]
fn empty_csv_is_rejected() {
    let tmp = NamedTempFile::new().expect("create temp file");
    std::fs::write(tmp.path(), "id,name\n").unwrap();
    assert!(load_view_from_csv(tmp.path()).is_err());
}
