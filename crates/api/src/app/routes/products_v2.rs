//! API v2: paged listing and queued updates.
//!
//! Writes are accepted with `202 Accepted` and applied later by the update
//! worker; clients follow the `Location` header to poll the job status.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, patch, put},
};

use eshop_core::JobId;
use eshop_products::ProductUpdate;
use eshop_products::validation::{validate_page, validate_update};

use crate::app::routes::pagination;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

const COLLECTION_PATH: &str = "/api/v2/products";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", patch(update_product))
        .route("/:id/quantity", put(update_quantity))
        .route("/status/:job_id", get(job_status))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let query = match dto::ListQuery::from_params(&params) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    let violations = validate_page(query.page.page, query.page.page_size);
    if !violations.is_empty() {
        return errors::validation_error(&violations);
    }

    let session = match services.store.session().await {
        Ok(s) => s,
        Err(e) => return errors::repository_error_to_response(e),
    };
    let page = match session.page(query.in_stock.unwrap_or(false), query.page).await {
        Ok(p) => p,
        Err(e) => return errors::repository_error_to_response(e),
    };

    let headers = pagination::headers(&page, COLLECTION_PATH, query.in_stock);
    (StatusCode::OK, headers, Json(dto::page_to_json(page))).into_response()
}

fn accepted(job_id: JobId) -> axum::response::Response {
    let location = format!("{COLLECTION_PATH}/status/{job_id}");
    (
        StatusCode::ACCEPTED,
        [(header::LOCATION, location)],
        Json(dto::job_accepted_to_json(job_id)),
    )
        .into_response()
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fields = ProductUpdate::from(body);
    let violations = validate_update(&fields);
    if !violations.is_empty() {
        return errors::validation_error(&violations);
    }

    match services.updates.submit_full_update(id, fields).await {
        Ok(job_id) => accepted(job_id),
        Err(e) => errors::queue_error_to_response(e),
    }
}

pub async fn update_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let delta = match dto::quantity_delta(&params) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.updates.submit_quantity_delta(id, delta).await {
        Ok(job_id) => accepted(job_id),
        Err(e) => errors::queue_error_to_response(e),
    }
}

pub async fn job_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(job_id): Path<String>,
) -> axum::response::Response {
    let job_id: JobId = match job_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id"),
    };

    match services.updates.poll_status(job_id) {
        Some(status) => (StatusCode::OK, Json(dto::status_to_json(status))).into_response(),
        None => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "no pending status for this job; it is unknown or its result was already delivered",
        ),
    }
}
