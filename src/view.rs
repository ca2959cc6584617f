use crate::chart::{self, ChartTask, UndatedPolicy};
use crate::config::ViewConfig;
use crate::task::ProjectTask;
use crate::validation::{self, InvalidDateRange};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters produced by a chart refresh, mainly for CLI and API feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSummary {
    pub stored_count: usize,
    pub visible_count: usize,
    pub rendered_count: usize,
    pub undated_skipped: usize,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl ChartSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("stored={}", self.stored_count));
        parts.push(format!("visible={}", self.visible_count));
        parts.push(format!("rendered={}", self.rendered_count));
        if self.undated_skipped > 0 {
            parts.push(format!("undated={}", self.undated_skipped));
        }
        parts.push(format!("window={}..{}", self.date_from, self.date_to));
        parts.join(", ")
    }
}

#[derive(Debug, Clone)]
pub enum ViewConfigError {
    FromAfterTo { from: NaiveDate, to: NaiveDate },
}

impl fmt::Display for ViewConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewConfigError::FromAfterTo { from, to } => write!(
                f,
                "window start {from} must be on or before window end {to}"
            ),
        }
    }
}

impl std::error::Error for ViewConfigError {}

/// The set of tasks currently loaded into the Gantt view, backed by a
/// DataFrame, plus the active window configuration. Chart entries are
/// never stored; [`GanttView::chart`] derives them on demand.
#[derive(Debug)]
pub struct GanttView {
    df: DataFrame,
    config: ViewConfig,
    undated_policy: UndatedPolicy,
}

impl GanttView {
    pub(crate) fn from_parts(config: ViewConfig, undated_policy: UndatedPolicy) -> Self {
        let schema = Self::default_schema();
        Self {
            df: DataFrame::empty_with_schema(&schema),
            config,
            undated_policy,
        }
    }

    pub fn new() -> Self {
        Self::from_parts(ViewConfig::default(), UndatedPolicy::default())
    }

    pub fn new_with_config(config: ViewConfig) -> Self {
        Self::from_parts(config, UndatedPolicy::default())
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn undated_policy(&self) -> UndatedPolicy {
        self.undated_policy
    }

    pub fn set_undated_policy(&mut self, policy: UndatedPolicy) {
        self.undated_policy = policy;
    }

    fn validate_config(config: &ViewConfig) -> Result<(), ViewConfigError> {
        if config.date_from > config.date_to {
            return Err(ViewConfigError::FromAfterTo {
                from: config.date_from,
                to: config.date_to,
            });
        }
        Ok(())
    }

    pub fn set_config(&mut self, config: ViewConfig) -> Result<(), ViewConfigError> {
        Self::validate_config(&config)?;
        self.config = config;
        Ok(())
    }

    pub fn set_window(&mut self, from: NaiveDate, to: NaiveDate) -> Result<(), ViewConfigError> {
        let mut config = self.config.clone();
        config.date_from = from;
        config.date_to = to;
        self.set_config(config)
    }

    pub fn set_project_filter(&mut self, project_id: Option<i32>) {
        self.config.project_id = project_id;
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("id".into(), DataType::Int32),
            Field::new("name".into(), DataType::String),
            Field::new("project_id".into(), DataType::Int32),
            Field::new("stage".into(), DataType::String),
            Field::new("assignee".into(), DataType::String),
            Field::new("parent_id".into(), DataType::Int32),
            Field::new("progress".into(), DataType::Float64),
            Field::new("depends_on".into(), DataType::List(Box::new(DataType::Int32))),
            Field::new(
                "gantt_start".into(),
                DataType::Datetime(TimeUnit::Milliseconds, None),
            ),
            Field::new(
                "gantt_end".into(),
                DataType::Datetime(TimeUnit::Milliseconds, None),
            ),
        ])
    }

    pub fn tasks(&self) -> Result<Vec<ProjectTask>, PolarsError> {
        let df = self.dataframe();
        let mut tasks = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            tasks.push(ProjectTask::from_dataframe_row(df, idx)?);
        }
        Ok(tasks)
    }

    pub fn find_task(&self, task_id: i32) -> Result<Option<ProjectTask>, PolarsError> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let ids = self.df.column("id")?.i32()?;
        for (idx, id_opt) in ids.into_iter().enumerate() {
            if id_opt == Some(task_id) {
                let task = ProjectTask::from_dataframe_row(self.dataframe(), idx)?;
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    pub fn delete_task(&mut self, task_id: i32) -> Result<bool, PolarsError> {
        if self.df.height() == 0 {
            return Ok(false);
        }
        let snapshot = self.df.clone();
        let mut tasks: Vec<ProjectTask> = Vec::with_capacity(snapshot.height());
        let mut found = false;
        for idx in 0..snapshot.height() {
            let mut task = ProjectTask::from_dataframe_row(&snapshot, idx)?;
            if task.id == task_id {
                found = true;
                continue;
            }
            task.depends_on.retain(|&dep| dep != task_id);
            tasks.push(task);
        }
        if !found {
            return Ok(false);
        }

        self.df = DataFrame::empty_with_schema(&Self::default_schema());
        for task in tasks {
            self.upsert_task_record(task)?;
        }
        Ok(true)
    }

    fn validation_error(err: InvalidDateRange) -> PolarsError {
        PolarsError::ComputeError(err.to_string().into())
    }

    /// Inserts the task or rewrites every column of the existing row.
    /// Rejected tasks (inconsistent date range) leave the stored row
    /// untouched.
    pub fn upsert_task_record(&mut self, task: ProjectTask) -> Result<(), PolarsError> {
        validation::validate_gantt_dates(&task).map_err(Self::validation_error)?;
        let id_exists = if self.df.height() == 0 {
            false
        } else {
            self.df
                .column("id")?
                .i32()?
                .into_iter()
                .any(|v| v == Some(task.id))
        };

        if id_exists {
            self.update_string_column("name", task.id, Some(&task.name))?;
            self.update_i32_column("project_id", task.id, task.project_id)?;
            self.update_string_column("stage", task.id, task.stage.as_deref())?;
            self.update_string_column("assignee", task.id, task.assignee.as_deref())?;
            self.update_i32_column("parent_id", task.id, task.parent_id)?;
            self.update_float_column("progress", task.id, task.progress)?;
            self.update_list_i32_column("depends_on", task.id, task.depends_on.clone())?;
            self.update_datetime_column("gantt_start", task.id, task.gantt.start)?;
            self.update_datetime_column("gantt_end", task.id, task.gantt.end)?;
            return Ok(());
        }

        let new_row = task.to_dataframe_row()?;
        self.df = self.df.vstack(&new_row)?;
        Ok(())
    }

    /// Write path for the widget's drag/resize callback: re-runs the range
    /// check before anything is stored.
    pub fn set_gantt_dates(
        &mut self,
        task_id: i32,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<(), PolarsError> {
        let mut task = self.find_task(task_id)?.ok_or_else(|| {
            PolarsError::ComputeError(format!("task {task_id} not found").into())
        })?;
        task.gantt.start = start;
        task.gantt.end = end;
        validation::validate_gantt_dates(&task).map_err(Self::validation_error)?;
        self.update_datetime_column("gantt_start", task_id, start)?;
        self.update_datetime_column("gantt_end", task_id, end)?;
        Ok(())
    }

    pub fn set_progress(&mut self, task_id: i32, progress: f64) -> Result<(), PolarsError> {
        if self.find_task(task_id)?.is_none() {
            return Err(PolarsError::ComputeError(
                format!("task {task_id} not found").into(),
            ));
        }
        self.update_float_column("progress", task_id, Some(progress))
    }

    pub fn set_depends_on(&mut self, task_id: i32, depends_on: Vec<i32>) -> Result<(), PolarsError> {
        if self.find_task(task_id)?.is_none() {
            return Err(PolarsError::ComputeError(
                format!("task {task_id} not found").into(),
            ));
        }
        self.update_list_i32_column("depends_on", task_id, depends_on)
    }

    /// Tasks admitted to the chart: project filter, positionable under the
    /// current undated policy, and overlapping the configured window.
    pub fn visible_tasks(&self) -> Result<Vec<ProjectTask>, PolarsError> {
        let from_dt = self
            .config
            .date_from
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid");
        let to_dt = self
            .config
            .date_to
            .and_hms_opt(23, 59, 59)
            .expect("end of day is always valid");

        let mut visible = Vec::new();
        for task in self.tasks()? {
            if let Some(filter) = self.config.project_id {
                if task.project_id != Some(filter) {
                    continue;
                }
            }
            let Some((start, end)) = chart::bar_span(&task, self.undated_policy) else {
                continue;
            };
            if end >= from_dt && start <= to_dt {
                visible.push(task);
            }
        }
        Ok(visible)
    }

    /// Derives the chart entries for the current window. Stateless with
    /// respect to the view: calling this twice without intervening writes
    /// returns identical output.
    pub fn chart(&self) -> Result<Vec<ChartTask>, PolarsError> {
        let visible = self.visible_tasks()?;
        Ok(chart::build_chart(&visible, self.undated_policy))
    }

    pub fn refresh(&self) -> Result<ChartSummary, PolarsError> {
        let stored_count = self.df.height();
        let mut undated_skipped = 0usize;
        for task in self.tasks()? {
            if let Some(filter) = self.config.project_id {
                if task.project_id != Some(filter) {
                    continue;
                }
            }
            if chart::bar_span(&task, self.undated_policy).is_none() {
                undated_skipped += 1;
            }
        }
        let visible = self.visible_tasks()?;
        let rendered = chart::build_chart(&visible, self.undated_policy);

        Ok(ChartSummary {
            stored_count,
            visible_count: visible.len(),
            rendered_count: rendered.len(),
            undated_skipped,
            date_from: self.config.date_from,
            date_to: self.config.date_to,
        })
    }

    fn update_string_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: Option<&str>,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .str()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(task_id) { new_value } else { val })
            .collect::<StringChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_i32_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: Option<i32>,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .i32()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(task_id) { new_value } else { val })
            .collect::<Int32Chunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_float_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: Option<f64>,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .f64()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| if id == Some(task_id) { new_value } else { val })
            .collect::<Float64Chunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_list_i32_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_values: Vec<i32>,
    ) -> Result<(), PolarsError> {
        let id_col = self.df.column("id")?;
        let target_col = self.df.column(column_name)?;

        let new_series = target_col
            .list()?
            .into_iter()
            .zip(id_col.i32()?.into_iter())
            .map(|(val, id)| {
                if id == Some(task_id) {
                    Some(Series::new(PlSmallStr::from_static(""), new_values.clone()))
                } else {
                    val
                }
            })
            .collect::<ListChunked>()
            .into_series()
            .with_name(column_name.into());

        self.df.replace(column_name, new_series)?;
        Ok(())
    }

    fn update_datetime_column(
        &mut self,
        column_name: &str,
        task_id: i32,
        new_value: Option<NaiveDateTime>,
    ) -> Result<(), PolarsError> {
        let dtype = DataType::Datetime(TimeUnit::Milliseconds, None);
        let value_expr = match new_value {
            Some(dt) => lit(dt).cast(dtype.clone()),
            None => lit(NULL).cast(dtype.clone()),
        };
        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(
                when(col("id").eq(lit(task_id)))
                    .then(value_expr)
                    .otherwise(col(column_name).cast(dtype))
                    .alias(column_name),
            )
            .collect()?;
        Ok(())
    }
}

impl Default for GanttView {
    fn default() -> Self {
        Self::new()
    }
}
