use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use stride_core::types::Theme;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/progress: summary, streak and journey milestones.
pub async fn get_progress(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let result = tokio::task::spawn_blocking(move || {
        let summary = tracker.summary()?;
        let milestones = tracker.milestones()?;
        Ok::<_, stride_core::StrideError>(serde_json::json!({
            "summary": summary,
            "milestones": milestones,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct CurrentWeekBody {
    pub week: u32,
}

/// GET /api/current-week
pub async fn get_current_week(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let week = tokio::task::spawn_blocking(move || tracker.current_week())
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "week": week })))
}

/// PUT /api/current-week: select a week; out-of-range values are clamped.
pub async fn put_current_week(
    State(app): State<AppState>,
    Json(body): Json<CurrentWeekBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let week = tokio::task::spawn_blocking(move || tracker.set_current_week(body.week))
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({ "week": week })))
}

fn theme_json(theme: Theme) -> serde_json::Value {
    serde_json::json!({
        "theme": theme,
        "name": theme.display_name(),
        "available": Theme::all()
            .iter()
            .map(|t| serde_json::json!({ "theme": t, "name": t.display_name() }))
            .collect::<Vec<_>>(),
    })
}

#[derive(Deserialize)]
pub struct ThemeBody {
    pub theme: String,
}

/// GET /api/theme
pub async fn get_theme(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let tracker = app.tracker.clone();
    let theme = tokio::task::spawn_blocking(move || tracker.theme())
        .await
        .map_err(AppError::join)??;
    Ok(Json(theme_json(theme)))
}

/// PUT /api/theme
pub async fn put_theme(
    State(app): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let theme: Theme = body.theme.parse()?;
    let tracker = app.tracker.clone();
    tokio::task::spawn_blocking(move || tracker.set_theme(theme))
        .await
        .map_err(AppError::join)??;
    Ok(Json(theme_json(theme)))
}
