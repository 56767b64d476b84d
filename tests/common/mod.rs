#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use resin_admin::{app_router, config::AppConfig, db, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_HTML: &str = "<!doctype html><title>Loja</title>";
pub const ADMIN_HTML: &str = "<!doctype html><title>Admin</title>";
pub const APP_JS: &str = "console.log('app');";

/// Layout of the static directory handed to the app under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticLayout {
    /// index.html, admin.html and assets/app.js
    Full,
    /// admin.html and assets/app.js, no SPA index
    WithoutIndex,
    /// static serving disabled in config
    Disabled,
}

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    static_dir: Option<TempDir>,
}

impl TestApp {
    /// Fresh database seeded with the default categories and a full static directory.
    pub async fn new() -> Self {
        Self::with_static(StaticLayout::Full).await
    }

    /// Root of the static directory, when static serving is enabled.
    pub fn static_root(&self) -> Option<&Path> {
        self.static_dir.as_ref().map(TempDir::path)
    }

    pub async fn with_static(layout: StaticLayout) -> Self {
        let static_dir = match layout {
            StaticLayout::Disabled => None,
            StaticLayout::Full | StaticLayout::WithoutIndex => {
                let dir = TempDir::new().expect("create static dir");
                fs::create_dir_all(dir.path().join("assets")).expect("create assets dir");
                fs::write(dir.path().join("admin.html"), ADMIN_HTML).expect("write admin.html");
                fs::write(dir.path().join("assets/app.js"), APP_JS).expect("write app.js");
                if layout == StaticLayout::Full {
                    fs::write(dir.path().join("index.html"), INDEX_HTML)
                        .expect("write index.html");
                }
                Some(dir)
            }
        };

        // A single connection keeps every query on the same in-memory database.
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            5000,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.static_dir = static_dir.as_ref().map(|d| d.path().to_path_buf());

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::bootstrap_schema(&pool)
            .await
            .expect("failed to create tables");

        let db = db::DatabaseAccess::new(Arc::new(pool));
        db::seed_default_categories(&db)
            .await
            .expect("failed to seed categories");

        let state = AppState::new(db, cfg);
        let router = app_router(state.clone());

        Self {
            router,
            state,
            static_dir,
        }
    }

    /// Sends a request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        match body {
            Some(json) => {
                let raw = serde_json::to_string(&json).expect("failed to serialize json body");
                self.request_raw(method, uri, &raw, &[("content-type", "application/json")])
                    .await
            }
            None => self.request_raw(method, uri, "", &[]).await,
        }
    }

    /// Sends a request with a body sent verbatim.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes")
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    serde_json::from_slice(&response_bytes(response).await).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    String::from_utf8(response_bytes(response).await).expect("utf-8 response")
}
