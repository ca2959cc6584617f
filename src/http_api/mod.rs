use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;

use crate::{ChartSummary, ChartTask, GanttDates, GanttView, ProjectTask, ViewConfig};

#[derive(Clone)]
pub struct AppState {
    view: Arc<RwLock<GanttView>>,
}

impl AppState {
    pub fn new(view: GanttView) -> Self {
        Self {
            view: Arc::new(RwLock::new(view)),
        }
    }

    pub fn with_shared(view: Arc<RwLock<GanttView>>) -> Self {
        Self { view }
    }

    fn view(&self) -> Arc<RwLock<GanttView>> {
        self.view.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<polars::prelude::PolarsError> for ApiError {
    fn from(value: polars::prelude::PolarsError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal(message) => {
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config).put(update_config))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/:id/dates", put(update_dates))
        .route("/chart", get(get_chart))
        .route("/summary", get(get_summary))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, view: GanttView) -> std::io::Result<()> {
    let state = AppState::new(view);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_config(State(state): State<AppState>) -> Json<ViewConfig> {
    let view = state.view();
    let config = {
        let guard = view.read();
        guard.config().clone()
    };
    Json(config)
}

async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<ViewConfig>,
) -> Result<Json<ViewConfig>, ApiError> {
    let view = state.view();
    {
        let mut guard = view.write();
        guard
            .set_config(config)
            .map_err(|err| ApiError::invalid(err.to_string()))?;
    }
    let current = {
        let guard = view.read();
        guard.config().clone()
    };
    Ok(Json(current))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<ProjectTask>>, ApiError> {
    let view = state.view();
    let tasks = {
        let guard = view.read();
        guard.tasks()?
    };
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<Json<ProjectTask>, ApiError> {
    let view = state.view();
    let result = {
        let guard = view.read();
        guard.find_task(task_id)?
    };
    match result {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::not_found(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<ProjectTask>,
) -> Result<(StatusCode, Json<ProjectTask>), ApiError> {
    let view = state.view();
    {
        let mut guard = view.write();
        if guard.find_task(task.id)?.is_some() {
            return Err(ApiError::Conflict(format!(
                "task {} already exists",
                task.id
            )));
        }
        guard.upsert_task_record(task.clone()).map_err(ApiError::from)?;
    }
    let created = {
        let guard = view.read();
        guard
            .find_task(task.id)?
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
    Json(task): Json<ProjectTask>,
) -> Result<Json<ProjectTask>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let view = state.view();
    {
        let mut guard = view.write();
        if guard.find_task(task_id)?.is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        guard.upsert_task_record(task).map_err(ApiError::from)?;
    }
    let updated = {
        let guard = view.read();
        guard
            .find_task(task_id)?
            .ok_or_else(|| ApiError::internal("task not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let view = state.view();
    let removed = {
        let mut guard = view.write();
        guard.delete_task(task_id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Backing endpoint for the widget's drag/resize callback. An invalid
/// range is a 400 and the stored record stays as it was.
async fn update_dates(
    State(state): State<AppState>,
    Path(task_id): Path<i32>,
    Json(dates): Json<GanttDates>,
) -> Result<Json<ProjectTask>, ApiError> {
    let view = state.view();
    {
        let mut guard = view.write();
        if guard.find_task(task_id)?.is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        guard
            .set_gantt_dates(task_id, dates.start, dates.end)
            .map_err(ApiError::from)?;
    }
    let updated = {
        let guard = view.read();
        guard
            .find_task(task_id)?
            .ok_or_else(|| ApiError::internal("task not found after date update"))?
    };
    Ok(Json(updated))
}

async fn get_chart(State(state): State<AppState>) -> Result<Json<Vec<ChartTask>>, ApiError> {
    let view = state.view();
    let entries = {
        let guard = view.read();
        guard.chart()?
    };
    Ok(Json(entries))
}

async fn get_summary(State(state): State<AppState>) -> Result<Json<ChartSummary>, ApiError> {
    let view = state.view();
    let summary = {
        let guard = view.read();
        guard.refresh()?
    };
    Ok(Json(summary))
}
