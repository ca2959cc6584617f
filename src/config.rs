use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Zoom levels understood by the charting widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    Day,
    Week,
    #[default]
    Month,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "Day" | "day" => Some(ViewMode::Day),
            "Week" | "week" => Some(ViewMode::Week),
            "Month" | "month" => Some(ViewMode::Month),
            _ => None,
        }
    }
}

/// The active chart window: which slice of the timeline is shown and an
/// optional project filter, mirroring the filter bar of the original view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub title: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// `None` shows tasks from every project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Project Tasks".to_string(),
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            view_mode: ViewMode::default(),
            project_id: None,
        }
    }
}

impl ViewConfig {
    /// Window covering the calendar month containing `date`, the original
    /// view's starting state.
    pub fn month_of(date: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .expect("first of month is always valid");
        let next_month = if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        }
        .expect("first of next month is always valid");
        Self {
            date_from: first,
            date_to: next_month.pred_opt().expect("last of month is always valid"),
            ..Self::default()
        }
    }
}
