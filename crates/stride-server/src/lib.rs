pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Weeks
        .route("/api/weeks", get(routes::weeks::list_weeks))
        .route("/api/weeks/{n}", get(routes::weeks::get_week))
        .route("/api/weeks/{n}/toggle", post(routes::weeks::toggle))
        .route(
            "/api/weeks/{n}/notes",
            get(routes::weeks::get_notes).put(routes::weeks::put_notes),
        )
        .route("/api/weeks/{n}/tasks", post(routes::weeks::add_task))
        .route(
            "/api/weeks/{n}/tasks/remove",
            post(routes::weeks::remove_task),
        )
        .route("/api/weeks/{n}/report", get(routes::weeks::get_report))
        // Progress
        .route("/api/progress", get(routes::progress::get_progress))
        .route(
            "/api/current-week",
            get(routes::progress::get_current_week).put(routes::progress::put_current_week),
        )
        .route(
            "/api/theme",
            get(routes::progress::get_theme).put(routes::progress::put_theme),
        )
        // Assistant relay
        .route("/api/assistant", post(routes::assistant::relay))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the HTTP server for the data directory at `data_dir`.
pub async fn serve(data_dir: &Path, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app = build_router(state::AppState::open(data_dir)?);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("stride server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/progress");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
