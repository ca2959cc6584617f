pub mod chart;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod manifest;
pub mod persistence;
pub mod task;
pub mod validation;
pub mod view;

pub use chart::{ChartTask, UndatedPolicy, build_chart};
pub use config::{ViewConfig, ViewMode};
pub use manifest::ModuleManifest;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTaskStore;
pub use persistence::{
    GanttViewStore, PersistenceError, load_view_from_csv, load_view_from_json, save_view_to_csv,
    save_view_to_json, validate_tasks, validate_view,
};
pub use task::{GanttDates, ProjectTask};
pub use validation::{InvalidDateRange, validate_gantt_dates, validate_task_collection};
pub use view::{ChartSummary, GanttView, ViewConfigError};
