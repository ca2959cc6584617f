use chrono::NaiveDateTime;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Serde adapter for the host platform's datetime wire format
/// (`YYYY-MM-DD HH:MM:SS`, naive UTC, no `T` separator).
pub mod wire_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => NaiveDateTime::parse_from_str(s.trim(), FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Same wire format as [`wire_datetime`], for fields that are always set.
pub mod wire_datetime_required {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(super::wire_datetime::FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), super::wire_datetime::FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

/// The two datetime columns this module adds to the host task table.
/// Kept as a separate record composed into [`ProjectTask`] rather than
/// folded into it: the rest of the task schema belongs to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GanttDates {
    #[serde(
        rename = "gantt_start_date",
        default,
        with = "wire_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<NaiveDateTime>,
    #[serde(
        rename = "gantt_end_date",
        default,
        with = "wire_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<NaiveDateTime>,
}

impl GanttDates {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }
}

/// A project task as exposed by the host system, plus the Gantt extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTask {
    pub id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    /// Host completion percentage in 0..=100. Missing or malformed values
    /// default to 0 when building the chart; they never fail a save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default)]
    pub depends_on: Vec<i32>,
    #[serde(flatten)]
    pub gantt: GanttDates,
}

impl ProjectTask {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            project_id: None,
            stage: None,
            assignee: None,
            parent_id: None,
            progress: None,
            depends_on: Vec::new(),
            gantt: GanttDates::default(),
        }
    }

    pub fn with_gantt_dates(
        id: i32,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        let mut task = Self::new(id, name);
        task.gantt = GanttDates::new(Some(start), Some(end));
        task
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(10);

        let id_data: [i32; 1] = [self.id];
        columns.push(Series::new(PlSmallStr::from_static("id"), id_data).into_column());

        let name_data: [&str; 1] = [self.name.as_str()];
        columns.push(Series::new(PlSmallStr::from_static("name"), name_data).into_column());

        let project: [Option<i32>; 1] = [self.project_id];
        columns.push(Series::new(PlSmallStr::from_static("project_id"), project).into_column());

        let stage: [Option<&str>; 1] = [self.stage.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("stage"), stage).into_column());

        let assignee: [Option<&str>; 1] = [self.assignee.as_deref()];
        columns.push(Series::new(PlSmallStr::from_static("assignee"), assignee).into_column());

        let parent: [Option<i32>; 1] = [self.parent_id];
        columns.push(Series::new(PlSmallStr::from_static("parent_id"), parent).into_column());

        let progress: [Option<f64>; 1] = [self.progress];
        columns.push(Series::new(PlSmallStr::from_static("progress"), progress).into_column());

        columns.push(Self::series_from_i32_list("depends_on", &self.depends_on).into_column());
        columns.push(Self::series_from_datetime("gantt_start", self.gantt.start)?.into_column());
        columns.push(Self::series_from_datetime("gantt_end", self.gantt.end)?.into_column());

        DataFrame::new(columns)
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let id = df
            .column("id")?
            .i32()?
            .get(row_idx)
            .ok_or_else(|| PolarsError::ComputeError("task row missing id".into()))?;

        let name = df
            .column("name")?
            .str()?
            .get(row_idx)
            .unwrap_or("")
            .to_string();

        let depends_on = Self::vec_from_i32_list(df.column("depends_on")?.list()?, row_idx)?;

        Ok(Self {
            id,
            name,
            project_id: df.column("project_id")?.i32()?.get(row_idx),
            stage: df
                .column("stage")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            assignee: df
                .column("assignee")?
                .str()?
                .get(row_idx)
                .map(ToOwned::to_owned),
            parent_id: df.column("parent_id")?.i32()?.get(row_idx),
            progress: df.column("progress")?.f64()?.get(row_idx),
            depends_on,
            gantt: GanttDates::new(
                Self::datetime_from_series(df.column("gantt_start")?.datetime()?, row_idx),
                Self::datetime_from_series(df.column("gantt_end")?.datetime()?, row_idx),
            ),
        })
    }

    fn series_from_i32_list(name: &str, values: &[i32]) -> Series {
        let inner = Series::new(PlSmallStr::from_static(""), values.to_vec());
        Series::new(name.into(), &[inner])
    }

    fn series_from_datetime(name: &str, value: Option<NaiveDateTime>) -> PolarsResult<Series> {
        let data: [Option<i64>; 1] = [value.map(Self::datetime_to_millis)];
        Series::new(name.into(), data).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
    }

    fn datetime_from_series(chunked: &DatetimeChunked, row_idx: usize) -> Option<NaiveDateTime> {
        chunked.get(row_idx).and_then(Self::datetime_from_millis)
    }

    fn vec_from_i32_list(list: &ListChunked, row_idx: usize) -> PolarsResult<Vec<i32>> {
        if let Some(series) = list.get_as_series(row_idx) {
            Ok(series.i32()?.into_iter().flatten().collect::<Vec<_>>())
        } else {
            Ok(Vec::new())
        }
    }

    fn datetime_to_millis(value: NaiveDateTime) -> i64 {
        value.and_utc().timestamp_millis()
    }

    fn datetime_from_millis(millis: i64) -> Option<NaiveDateTime> {
        chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
    }
}
