use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use stockpulse_infra::RetrievalError;

pub fn retrieval_error_to_response(err: RetrievalError) -> axum::response::Response {
    match err {
        RetrievalError::InvalidDate(_) => json_error(StatusCode::BAD_REQUEST, "invalid_date", err.to_string()),
        RetrievalError::Store(e) => {
            error!(error = %e, "snapshot store read failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", format!("cannot load snapshots: {e}"))
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
