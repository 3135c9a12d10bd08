use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stride_core::types::{Day, WeekNotes};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/weeks?q=<query>: weeks grouped by phase, filtered by number,
/// month or focus.
pub async fn list_weeks(
    State(app): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let groups = app.tracker.search(&params.q);
    Ok(Json(serde_json::json!({
        "total_weeks": app.tracker.total_weeks(),
        "phases": groups,
    })))
}

/// GET /api/weeks/:n: resolved week with its grid and progress.
pub async fn get_week(
    State(app): State<AppState>,
    Path(week): Path<u32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let result = tokio::task::spawn_blocking(move || {
        let resolved = tracker.resolved_week(week)?;
        let daily = tracker.daily(week)?;
        let progress = tracker.week_progress(week)?;
        Ok::<_, stride_core::StrideError>(serde_json::json!({
            "week": resolved,
            "daily": daily,
            "progress": progress,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBody {
    pub task_id: String,
    pub day: String,
}

/// POST /api/weeks/:n/toggle: flip one day cell of a task.
pub async fn toggle(
    State(app): State<AppState>,
    Path(week): Path<u32>,
    Json(body): Json<ToggleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let day: Day = body.day.parse()?;
    let tracker = app.tracker.clone();
    let outcome = tokio::task::spawn_blocking(move || tracker.toggle(week, &body.task_id, day))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::to_value(outcome)?))
}

/// GET /api/weeks/:n/notes
pub async fn get_notes(
    State(app): State<AppState>,
    Path(week): Path<u32>,
) -> Result<Json<WeekNotes>, AppError> {
    let tracker = app.tracker.clone();
    let notes = tokio::task::spawn_blocking(move || tracker.notes(week))
        .await
        .map_err(AppError::join)??;
    Ok(Json(notes))
}

/// PUT /api/weeks/:n/notes: replace all three fields.
pub async fn put_notes(
    State(app): State<AppState>,
    Path(week): Path<u32>,
    Json(notes): Json<WeekNotes>,
) -> Result<Json<WeekNotes>, AppError> {
    let tracker = app.tracker.clone();
    let saved = notes.clone();
    tokio::task::spawn_blocking(move || tracker.save_notes(week, notes))
        .await
        .map_err(AppError::join)??;
    Ok(Json(saved))
}

#[derive(Deserialize)]
pub struct AddTaskBody {
    pub category: String,
    pub text: String,
    #[serde(default)]
    pub schedule: Option<String>,
}

/// POST /api/weeks/:n/tasks: add a custom task.
pub async fn add_task(
    State(app): State<AppState>,
    Path(week): Path<u32>,
    Json(body): Json<AddTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.text.trim().is_empty() {
        return Err(AppError::bad_request("task text is empty"));
    }
    let tracker = app.tracker.clone();
    let category = body.category.to_lowercase();
    let task = tokio::task::spawn_blocking(move || {
        tracker.add_task(
            week,
            &body.category,
            body.text.trim(),
            body.schedule.as_deref().filter(|s| !s.is_empty()),
        )
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({
        "week": week,
        "category": category,
        "task": task,
    })))
}

#[derive(Deserialize)]
pub struct RemoveTaskBody {
    pub fragment: String,
}

/// POST /api/weeks/:n/tasks/remove: remove the first task matching a
/// fragment of its id or text. `removed` is null when nothing matched.
pub async fn remove_task(
    State(app): State<AppState>,
    Path(week): Path<u32>,
    Json(body): Json<RemoveTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let removed = tokio::task::spawn_blocking(move || tracker.remove_task(week, &body.fragment))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({
        "week": week,
        "removed": removed,
    })))
}

/// GET /api/weeks/:n/report: Markdown export.
pub async fn get_report(
    State(app): State<AppState>,
    Path(week): Path<u32>,
) -> Result<impl IntoResponse, AppError> {
    let tracker = app.tracker.clone();
    let doc = tokio::task::spawn_blocking(move || {
        let resolved = tracker.resolved_week(week)?;
        let daily = tracker.daily(week)?;
        let notes = tracker.notes(week)?;
        Ok::<_, stride_core::StrideError>(stride_core::report::render_week(
            &resolved,
            Some(&daily),
            &notes,
        ))
    })
    .await
    .map_err(AppError::join)??;

    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], doc))
}
