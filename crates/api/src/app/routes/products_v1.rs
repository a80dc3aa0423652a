//! API v1: synchronous product endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};

use eshop_products::validation::{validate_new, validate_quantity_delta, validate_update};
use eshop_products::{NewProduct, ProductUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/in-stock", get(list_in_stock))
        .route("/:id", get(get_product).patch(update_product))
        .route("/:id/quantity", put(update_quantity))
}

async fn list(services: &AppServices, in_stock_only: bool) -> axum::response::Response {
    let session = match services.store.session().await {
        Ok(s) => s,
        Err(e) => return errors::repository_error_to_response(e),
    };
    match session.list(in_stock_only).await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_json(products))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    list(&services, false).await
}

pub async fn list_in_stock(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    list(&services, true).await
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let session = match services.store.session().await {
        Ok(s) => s,
        Err(e) => return errors::repository_error_to_response(e),
    };
    match session.find_by_id(id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Ok(None) => errors::product_not_found(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let new = NewProduct::from(body);
    let violations = validate_new(&new);
    if !violations.is_empty() {
        return errors::validation_error(&violations);
    }

    let session = match services.store.session().await {
        Ok(s) => s,
        Err(e) => return errors::repository_error_to_response(e),
    };
    let created = match session.create(new).await {
        Ok(p) => p,
        Err(e) => return errors::repository_error_to_response(e),
    };
    if let Err(e) = session.commit().await {
        return errors::repository_error_to_response(e);
    }

    tracing::info!(product_id = %created.id, "product created");
    let location = format!("/api/v1/products/{}", created.id);
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(dto::product_to_json(created)),
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

    let session = match services.store.session().await {
        Ok(s) => s,
        Err(e) => return errors::repository_error_to_response(e),
    };
    let mut product = match session.find_by_id(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::product_not_found(),
        Err(e) => return errors::repository_error_to_response(e),
    };
    product.merge(&fields);

    let updated = match session.apply_full_update(product).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::product_not_found(),
        Err(e) => return errors::repository_error_to_response(e),
    };
    if let Err(e) = session.commit().await {
        return errors::repository_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::product_to_json(updated))).into_response()
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

    let session = match services.store.session().await {
        Ok(s) => s,
        Err(e) => return errors::repository_error_to_response(e),
    };
    let current = match session.find_by_id(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::product_not_found(),
        Err(e) => return errors::repository_error_to_response(e),
    };
    let violations = validate_quantity_delta(current.quantity, delta);
    if !violations.is_empty() {
        return errors::validation_error(&violations);
    }

    let updated = match session.apply_quantity_delta(id, delta).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::product_not_found(),
        Err(e) => return errors::repository_error_to_response(e),
    };
    if let Err(e) = session.commit().await {
        return errors::repository_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::product_to_json(updated))).into_response()
}
