use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use stride_assistant::prompt::gateway_request;
use stride_assistant::ChatRequest;

use crate::state::AppState;

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// POST /api/assistant: forward the conversation to the configured gateway
/// with the system prompt and current week context prepended, and stream the
/// gateway's event stream back unchanged.
pub async fn relay(State(app): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    let Some(ref key) = app.gateway_key else {
        tracing::error!(var = %app.config.gateway.api_key_env, "gateway key not configured");
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("{} is not configured", app.config.gateway.api_key_env),
        );
    };

    let body = gateway_request(
        &app.config.gateway.model,
        req.messages,
        req.current_week_data.as_ref(),
    );

    let upstream = match app
        .http
        .post(&app.config.gateway.url)
        .bearer_auth(key)
        .json(&body)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "gateway unreachable");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let status = upstream.status();
    if !status.is_success() {
        return match status.as_u16() {
            429 => json_error(
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again later.",
            ),
            402 => json_error(
                StatusCode::PAYMENT_REQUIRED,
                "Payment required. Please add credits to continue.",
            ),
            code => {
                let text = upstream.text().await.unwrap_or_default();
                tracing::error!(status = code, body = %text, "gateway error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "AI service error")
            }
        };
    }

    let stream = upstream
        .bytes_stream()
        .map(|chunk| chunk.map_err(std::io::Error::other));
    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
    {
        Ok(r) => r,
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}
