use super::{PersistenceError, PersistenceResult};
use crate::chart::UndatedPolicy;
use crate::config::ViewConfig;
use crate::task::{GanttDates, ProjectTask, wire_datetime};
use crate::view::GanttView;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct ViewSnapshot {
    config: ViewConfig,
    #[serde(default)]
    undated_policy: UndatedPolicy,
    tasks: Vec<ProjectTask>,
}

impl ViewSnapshot {
    fn from_view(view: &GanttView) -> PersistenceResult<Self> {
        let tasks = view.tasks()?;
        super::validate_tasks(&tasks)?;
        Ok(Self {
            config: view.config().clone(),
            undated_policy: view.undated_policy(),
            tasks,
        })
    }

    fn into_view(self) -> PersistenceResult<GanttView> {
        super::validate_tasks(&self.tasks)?;
        let mut view = GanttView::from_parts(self.config, self.undated_policy);
        for task in self.tasks {
            view.upsert_task_record(task)?;
        }
        Ok(view)
    }
}

pub fn save_view_to_json<P: AsRef<Path>>(view: &GanttView, path: P) -> PersistenceResult<()> {
    let snapshot = ViewSnapshot::from_view(view)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_view_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<GanttView> {
    let file = File::open(path)?;
    let snapshot: ViewSnapshot = serde_json::from_reader(file)?;
    snapshot.into_view()
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: i32,
    name: String,
    project_id: String,
    stage: String,
    assignee: String,
    parent_id: String,
    progress: String,
    depends_on: String,
    gantt_start_date: String,
    gantt_end_date: String,
    #[serde(default)]
    config_json: String,
    #[serde(default)]
    undated_policy: String,
}

impl From<&ProjectTask> for TaskCsvRecord {
    fn from(task: &ProjectTask) -> Self {
        let mut record = TaskCsvRecord::default();
        record.id = task.id;
        record.name = task.name.clone();
        record.project_id = format_option_i32(task.project_id);
        record.stage = task.stage.clone().unwrap_or_default();
        record.assignee = task.assignee.clone().unwrap_or_default();
        record.parent_id = format_option_i32(task.parent_id);
        record.progress = format_option_f64(task.progress);
        record.depends_on = join_i32(&task.depends_on);
        record.gantt_start_date = format_datetime(task.gantt.start);
        record.gantt_end_date = format_datetime(task.gantt.end);
        record
    }
}

impl TaskCsvRecord {
    fn config_row(view: &GanttView) -> PersistenceResult<Self> {
        let config_json = serde_json::to_string(view.config())?;
        let mut record = TaskCsvRecord::default();
        record.name = "__config__".to_string();
        record.config_json = config_json;
        record.undated_policy = view.undated_policy().as_str().to_string();
        Ok(record)
    }

    fn is_config_row(&self) -> bool {
        !self.config_json.trim().is_empty()
    }

    fn into_task(self) -> PersistenceResult<ProjectTask> {
        if self.is_config_row() {
            return Err(PersistenceError::InvalidData(
                "config row cannot be converted to task".into(),
            ));
        }
        let mut task = ProjectTask::new(self.id, self.name);
        task.project_id = parse_i32(&self.project_id)?;
        task.stage = parse_string_option(self.stage);
        task.assignee = parse_string_option(self.assignee);
        task.parent_id = parse_i32(&self.parent_id)?;
        task.progress = parse_f64(&self.progress)?;
        task.depends_on = split_i32(&self.depends_on)?;
        task.gantt = GanttDates::new(
            parse_datetime(&self.gantt_start_date)?,
            parse_datetime(&self.gantt_end_date)?,
        );
        Ok(task)
    }
}

pub fn save_view_to_csv<P: AsRef<Path>>(view: &GanttView, path: P) -> PersistenceResult<()> {
    super::validate_view(view)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(TaskCsvRecord::config_row(view)?)?;
    for task in view.tasks()? {
        writer.serialize(TaskCsvRecord::from(&task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_view_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<GanttView> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    let mut config: Option<ViewConfig> = None;
    let mut undated_policy = UndatedPolicy::default();
    for record in reader.deserialize::<TaskCsvRecord>() {
        let record = record?;
        if record.is_config_row() {
            if config.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple config rows".into(),
                ));
            }
            config = Some(serde_json::from_str(&record.config_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid config json: {err}"))
            })?);
            if !record.undated_policy.trim().is_empty() {
                undated_policy = UndatedPolicy::from_str(record.undated_policy.trim())
                    .ok_or_else(|| {
                        PersistenceError::InvalidData(format!(
                            "invalid undated policy '{}'",
                            record.undated_policy
                        ))
                    })?;
            }
            continue;
        }
        tasks.push(record.into_task()?);
    }

    if tasks.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no tasks".into(),
        ));
    }

    super::validate_tasks(&tasks)?;

    let mut view = GanttView::from_parts(config.unwrap_or_default(), undated_policy);
    for task in tasks {
        view.upsert_task_record(task)?;
    }
    Ok(view)
}

fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(wire_datetime::FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_datetime(input: &str) -> PersistenceResult<Option<NaiveDateTime>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(input.trim(), wire_datetime::FORMAT)
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid datetime '{input}': {e}")))
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid float '{input}': {e}")))
}

fn format_option_i32(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_i32(input: &str) -> PersistenceResult<Option<i32>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<i32>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid integer '{input}': {e}")))
}

fn join_i32(values: &[i32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_i32(input: &str) -> PersistenceResult<Vec<i32>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(|part| {
            part.trim().parse::<i32>().map_err(|e| {
                PersistenceError::InvalidData(format!("invalid integer '{part}': {e}"))
            })
        })
        .collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
