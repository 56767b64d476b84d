//! Resin Admin library
//!
//! Catalog administration backend: products and categories over a JSON API
//! under `/api`, plus the admin panel and SPA bundle served from disk.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::db::DatabaseAccess;
use crate::services::catalog::{CategoryService, ProductService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseAccess,
    pub config: AppConfig,
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
}

impl AppState {
    /// Wires the catalog services onto a shared database handle.
    pub fn new(db: DatabaseAccess, config: AppConfig) -> Self {
        Self {
            products: Arc::new(ProductService::new(db.clone())),
            categories: Arc::new(CategoryService::new(db.clone())),
            db,
            config,
        }
    }
}

/// JSON API routes, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::products_routes())
        .nest("/categories", handlers::categories::categories_routes())
        .nest("/health", handlers::health::health_routes())
}

/// CORS policy from config: an explicit origin list wins, otherwise any
/// origin is allowed when permitted.
pub fn build_cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                ::tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// Full application router: API, Swagger UI, admin panel and SPA fallback.
pub fn app_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config);

    Router::new()
        .nest("/api", api_routes())
        .route("/admin", get(handlers::assets::admin_page))
        .fallback(handlers::assets::spa_fallback)
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors_layer)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
