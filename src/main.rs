use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use resin_admin as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config().context("failed to load configuration")?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);
    api::handlers::health::init_start_time();

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;
    api::db::bootstrap_schema(&db_pool).await.map_err(|e| {
        error!("Failed creating tables: {}", e);
        e
    })?;

    let db = api::db::DatabaseAccess::new(Arc::new(db_pool));
    if cfg.seed_default_categories {
        api::db::seed_default_categories(&db)
            .await
            .context("failed to seed default categories")?;
    }

    match cfg.static_dir.as_deref() {
        Some(dir) if dir.is_dir() => info!("Serving static files from {}", dir.display()),
        Some(dir) => warn!(
            "Static directory {} does not exist; the admin panel will answer 404",
            dir.display()
        ),
        None => info!("Static serving disabled"),
    }

    let app = api::app_router(api::AppState::new(db.clone(), cfg.clone()));

    // Bind and serve
    let listener = tokio::net::TcpListener::bind((cfg.host.as_str(), cfg.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cfg.host, cfg.port))?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("resin-admin listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped; closing database pool");
    api::db::close_pool(db.get_pool().clone()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
