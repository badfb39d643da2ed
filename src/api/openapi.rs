use utoipa::OpenApi;

use crate::api::handlers::{
    MessageResponse, PageParams, PaginatedProductData, ProductListResponse, ProductResponse,
};
use crate::errors::ErrorResponse;
use crate::models::{Product, ProductInput};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product API",
        version = "0.1.0",
        description = "A product-catalog CRUD API with a standardized response envelope. Every response carries the same success/message/data shape, and every error is classified into a uniform error envelope with a registry-backed message.",
        contact(
            name = "Product API",
        )
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::list_products,
        crate::api::handlers::get_product,
        crate::api::handlers::create_product,
        crate::api::handlers::update_product,
        crate::api::handlers::delete_product,
    ),
    components(
        schemas(
            Product,
            ProductInput,
            ProductResponse,
            ProductListResponse,
            PaginatedProductData,
            MessageResponse,
            ErrorResponse,
            PageParams,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "products", description = "Product CRUD endpoints"),
    )
)]
pub struct ApiDoc;
