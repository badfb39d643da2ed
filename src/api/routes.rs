use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::auth::require_write_token;
use super::handlers::{
    create_product, delete_product, get_product, health, list_products, update_product, AppState,
};
use super::middleware::{handle_panic, logging_middleware, negotiate_errors};
use super::openapi::ApiDoc;
use crate::errors::ApiError;
use crate::metrics;

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Product resource; the write guard covers the mutating verbs only
    let products = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_write_token,
        ));

    Router::new()
        .merge(products)
        // Health check
        .route("/health", get(health))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // OpenAPI documentation
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Unmatched routes funnel into the classifier
        .fallback(route_not_found)
        // Add middleware (order matters: panic recovery sits innermost so
        // recovered panics still pass through negotiation, then negotiation
        // sees every raw boundary error, then compression, logging, metrics,
        // cors, trace)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(negotiate_errors))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}

/// Fallback for paths no route matches
async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
