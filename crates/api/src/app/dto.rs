use std::collections::HashMap;

use axum::http::StatusCode;
use serde::Deserialize;

use eshop_core::JobId;
use eshop_infra::jobs::{JobState, StatusRecord};
use eshop_products::{NewProduct, Page, PageRequest, Product, ProductUpdate};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Creation body. Missing required fields surface as validation errors, not as
/// deserialization failures.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub main_image_url: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(body: CreateProductRequest) -> Self {
        NewProduct {
            name: body.name.unwrap_or_default(),
            main_image_url: body.main_image_url.unwrap_or_default(),
            price: body.price.unwrap_or_default(),
            description: body.description.unwrap_or_default(),
            quantity: body.quantity.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub main_image_url: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(body: UpdateProductRequest) -> Self {
        ProductUpdate {
            name: body.name,
            main_image_url: body.main_image_url,
            price: body.price,
            description: body.description,
            quantity: body.quantity,
        }
    }
}

// -------------------------
// Query parameters
// -------------------------

fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, axum::response::Response> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_query",
                format!("invalid value for query parameter `{key}`"),
            )
        }),
    }
}

/// `?quantity_delta=N`, required.
pub fn quantity_delta(params: &HashMap<String, String>) -> Result<i64, axum::response::Response> {
    parse_param::<i64>(params, "quantity_delta")?.ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_query",
            "query parameter `quantity_delta` is required",
        )
    })
}

/// Listing parameters for the paged endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub in_stock: Option<bool>,
    pub page: PageRequest,
}

impl ListQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, axum::response::Response> {
        let defaults = PageRequest::default();
        Ok(Self {
            in_stock: parse_param::<bool>(params, "in_stock")?,
            page: PageRequest::new(
                parse_param::<i64>(params, "page")?.unwrap_or(defaults.page),
                parse_param::<i64>(params, "page_size")?.unwrap_or(defaults.page_size),
            ),
        })
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.get(),
        "name": p.name,
        "mainImageUrl": p.main_image_url,
        "price": p.price,
        "description": p.description,
        "quantity": p.quantity,
    })
}

pub fn products_to_json(products: Vec<Product>) -> serde_json::Value {
    serde_json::Value::Array(products.into_iter().map(product_to_json).collect())
}

pub fn page_to_json(page: Page<Product>) -> serde_json::Value {
    let page = page.map(product_to_json);
    serde_json::json!({
        "pageNumber": page.page_number,
        "pageSize": page.page_size,
        "totalItems": page.total_items,
        "totalPages": page.total_pages,
        "items": page.items,
    })
}

pub fn job_accepted_to_json(job_id: JobId) -> serde_json::Value {
    serde_json::json!({
        "jobId": job_id.to_string(),
        "status": JobState::Queued,
    })
}

pub fn status_to_json(status: StatusRecord) -> serde_json::Value {
    serde_json::json!({
        "status": status.state,
        "message": status.message,
    })
}
