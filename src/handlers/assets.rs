//! Serves the admin panel and the SPA bundle from the configured static
//! directory. Unmatched `GET`/`HEAD` paths resolve to a file when one exists
//! and to the SPA index otherwise.

use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

const STATIC_NOT_CONFIGURED: &str = "Static folder not configured";

/// `GET /admin`: the admin panel entry file
pub async fn admin_page(State(state): State<AppState>, request: Request) -> Response {
    match state.config.admin_entry_path() {
        Some(path) => serve_file(path, request).await,
        None => not_found(STATIC_NOT_CONFIGURED.to_string()),
    }
}

/// Fallback for every route the router does not know.
pub async fn spa_fallback(State(state): State<AppState>, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return not_found("Not Found".to_string());
    }

    let Some(static_dir) = state.config.static_dir.as_deref() else {
        return not_found(STATIC_NOT_CONFIGURED.to_string());
    };

    serve_static(static_dir, &state.config.index_file, request).await
}

/// Serves the file the request path names under `static_dir`, or the index.
///
/// The path is percent-decoded before lookup. Paths that would leave
/// `static_dir` and directories both count as misses.
async fn serve_static(static_dir: &Path, index_file: &str, request: Request) -> Response {
    let assets = ServeDir::new(static_dir).append_index_html_on_directories(false);

    let index = static_dir.join(index_file);
    if index.is_file() {
        return match assets.fallback(ServeFile::new(index)).oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        };
    }

    let path = request.uri().path().to_string();
    let response = match assets.oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };
    if response.status() == StatusCode::NOT_FOUND {
        debug!(path = %path, "no static file and no index to fall back to");
        return not_found(format!("{} not found", index_file));
    }
    response
}

async fn serve_file(path: PathBuf, request: Request) -> Response {
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

fn not_found(message: String) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::fs;
    use tempfile::TempDir;

    const INDEX: &str = "<html>index</html>";

    fn static_root(with_index: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("assets/anel azul.png"), "png").unwrap();
        fs::write(dir.path().join("assets/decoração.js"), "decoracao").unwrap();
        if with_index {
            fs::write(dir.path().join("index.html"), INDEX).unwrap();
        }
        dir
    }

    async fn get(root: &Path, uri: &str) -> (StatusCode, String) {
        let request = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = serve_static(root, "index.html", request).await;
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn serves_existing_files_and_falls_back_to_index() {
        let dir = static_root(true);

        assert_eq!(
            get(dir.path(), "/assets/app.js").await,
            (StatusCode::OK, "console.log(1)".to_string())
        );
        for uri in ["/", "/assets", "/assets/missing.js", "/produtos/42"] {
            assert_eq!(
                get(dir.path(), uri).await,
                (StatusCode::OK, INDEX.to_string()),
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn percent_encoded_names_are_decoded() {
        let dir = static_root(true);

        assert_eq!(
            get(dir.path(), "/assets/anel%20azul.png").await,
            (StatusCode::OK, "png".to_string())
        );
        assert_eq!(
            get(dir.path(), "/assets/decora%C3%A7%C3%A3o.js").await,
            (StatusCode::OK, "decoracao".to_string())
        );
    }

    #[tokio::test]
    async fn traversal_never_leaves_the_root() {
        let dir = static_root(true);
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        let inner = dir.path().join("assets");
        fs::write(inner.join("index.html"), "inner index").unwrap();

        for uri in [
            "/../secret.txt",
            "/%2e%2e/secret.txt",
            "/./../secret.txt",
            "/../index.html",
        ] {
            assert_eq!(
                get(&inner, uri).await,
                (StatusCode::OK, "inner index".to_string()),
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn missing_index_is_reported() {
        let dir = static_root(false);

        assert_eq!(get(dir.path(), "/assets/app.js").await.0, StatusCode::OK);
        assert_eq!(
            get(dir.path(), "/produtos").await,
            (StatusCode::NOT_FOUND, "index.html not found".to_string())
        );
    }
}
