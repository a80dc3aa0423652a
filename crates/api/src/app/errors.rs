use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use eshop_infra::jobs::QueueError;
use eshop_infra::repository::RepositoryError;
use eshop_products::messages;

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    tracing::error!(error = %err, "repository operation failed");
    match err {
        RepositoryError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        RepositoryError::CommitFailed(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "commit_failed",
            messages::INTERNAL_ERROR,
        ),
        RepositoryError::Storage(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn queue_error_to_response(err: QueueError) -> axum::response::Response {
    match err {
        QueueError::Closed => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "queue_closed",
            "the update queue is not accepting jobs",
        ),
        QueueError::WorkerAlreadyRunning => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "queue_error", err.to_string())
        }
    }
}

pub fn validation_error(violations: &[String]) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        eshop_products::validation::join_errors(violations),
    )
}

pub fn product_not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", messages::NOT_FOUND)
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

pub fn parse_product_id(s: &str) -> Result<eshop_core::ProductId, axum::response::Response> {
    s.parse::<eshop_core::ProductId>().map_err(|_| {
        json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
    })
}
