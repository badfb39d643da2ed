use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use utoipa::ToSchema;

use crate::db::Repository;
use crate::errors::ApiError;
use crate::models::{Product, ProductInput};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub repository: Repository,
    pub write_token: Option<String>,
}

/// Generic success envelope.
///
/// The `success`/`message`/`data` field names are a compatibility surface;
/// `message` serializes as `null` when there is nothing to say and the
/// `errors` key never appears on success responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always true for success responses
    pub success: bool,
    /// Optional human-readable message
    pub message: Option<String>,
    /// Response payload
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Success envelope without a payload, used for 204 responses
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Always true for success responses
    pub success: bool,
    /// Optional human-readable message
    pub message: Option<String>,
}

/// 204 envelope. The transport strips the body on the wire for 204, but the
/// envelope shape stays uniform at the application layer.
pub fn no_content(message: Option<String>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        Json(MessageResponse {
            success: true,
            message,
        }),
    )
}

/// List query parameters
#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct PageParams {
    /// Page number (starts at 1)
    pub page: Option<u64>,
    /// Number of results per page (default: 10, max: 100)
    pub page_size: Option<u64>,
}

/// Paginated response payload
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedData<T> {
    /// Array of results for the current page
    pub data: Vec<T>,
    /// Total number of results across all pages
    pub total: u64,
    /// Current page number
    pub page: u64,
    /// Number of results per page
    pub page_size: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Whether there are more pages available
    pub has_more: bool,
}

// Concrete response types for OpenAPI generation
/// Product response
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    /// Always true for success responses
    pub success: bool,
    /// Optional human-readable message
    pub message: Option<String>,
    /// The product
    pub data: Product,
}

/// Paginated product list response
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    /// Always true for success responses
    pub success: bool,
    /// Optional human-readable message
    pub message: Option<String>,
    /// Paginated product data
    pub data: PaginatedProductData,
}

/// Paginated product data
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedProductData {
    /// Array of results for the current page
    pub data: Vec<Product>,
    /// Total number of results across all pages
    pub total: u64,
    /// Current page number
    pub page: u64,
    /// Number of results per page
    pub page_size: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Whether there are more pages available
    pub has_more: bool,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "product-api",
        "version": env!("CARGO_PKG_VERSION"),
        "build": {
            "version": env!("CARGO_PKG_VERSION"),
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
        },
        "database": if cfg!(feature = "postgres") { "postgresql" } else { "sqlite" },
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// List products with pagination
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated product list", body = ProductListResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(10).clamp(1, 100);

    info!("List products: page={}, page_size={}", page, page_size);

    let (products, total) = state.repository.paginate(page, page_size).await?;

    let total_pages = (total + page_size - 1) / page_size;
    let has_more = page < total_pages;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(PaginatedData {
            data: products,
            total,
            page,
            page_size,
            total_pages,
            has_more,
        })),
    ))
}

/// Get a specific product by id
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Get product request: id={}", id);

    let product = state
        .repository
        .find(id)
        .await?
        .ok_or(ApiError::not_found("Product"))?;

    Ok((StatusCode::OK, Json(ApiResponse::success(product))))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    let new_product = input.into_new_product().map_err(ApiError::validation)?;

    info!("Create product: name='{}'", new_product.name);

    let product = state.repository.create(new_product).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            product,
            "Product created successfully",
        )),
    ))
}

/// Update a product (partial update; PUT and PATCH behave identically)
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::errors::ErrorResponse)
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = input.into_patch().map_err(ApiError::validation)?;

    info!("Update product: id={}", id);

    let product = state.repository.update(id, patch).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            product,
            "Product updated successfully",
        )),
    ))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Delete product: id={}", id);

    state.repository.delete(id).await?;

    Ok(no_content(Some("Product deleted successfully".to_string())))
}
