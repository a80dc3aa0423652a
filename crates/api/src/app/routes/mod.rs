use axum::Router;

pub mod pagination;
pub mod products_v1;
pub mod products_v2;
pub mod system;

/// Router for all versioned product endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/api/v1/products", products_v1::router())
        .nest("/api/v2/products", products_v2::router())
}
