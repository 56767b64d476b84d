use crate::config::AppConfig;
use crate::entities::{category, Category, Product};
use crate::errors::ServiceError;
use futures::future::BoxFuture;
use metrics::{counter, histogram};
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, Schema, TransactionTrait,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Categories inserted into an empty catalog: name, description, color.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 3] = [
    (
        "Joias",
        "Colares, brincos e pulseiras",
        "bg-gradient-to-br from-pink-400 to-purple-500",
    ),
    (
        "Decoração",
        "Peças decorativas para casa",
        "bg-gradient-to-br from-teal-400 to-blue-500",
    ),
    (
        "Chaveiros",
        "Chaveiros únicos e personalizados",
        "bg-gradient-to-br from-yellow-400 to-orange-500",
    ),
];

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
    /// Log SQL statements
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 8,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
            sqlx_logging: false,
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
            sqlx_logging: cfg.sqlx_logging,
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// File-backed SQLite databases get their parent directory created first.
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    if let Some(parent) = sqlite_file_path(&config.url).and_then(|p| p.parent().map(PathBuf::from))
    {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(&parent).map_err(|e| {
                ServiceError::InternalError(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(config.sqlx_logging);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Extracts the on-disk file of a SQLite URL; `None` for in-memory databases
/// and non-SQLite URLs.
pub fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Creates the catalog tables if they do not exist yet.
pub async fn bootstrap_schema(pool: &DbPool) -> Result<(), ServiceError> {
    let backend = pool.get_database_backend();
    let schema = Schema::new(backend);

    let mut categories = schema.create_table_from_entity(Category);
    categories.if_not_exists();
    pool.execute(backend.build(&categories)).await?;

    let mut products = schema.create_table_from_entity(Product);
    products.if_not_exists();
    pool.execute(backend.build(&products)).await?;

    info!("Database schema ready");
    Ok(())
}

/// Inserts [`DEFAULT_CATEGORIES`] when the categories table is empty.
///
/// Returns the number of rows inserted.
pub async fn seed_default_categories(db: &DatabaseAccess) -> Result<usize, ServiceError> {
    db.transaction::<_, _, ServiceError>(|txn| {
        Box::pin(async move {
            if Category::find().count(txn).await? > 0 {
                debug!("Categories already present; skipping seed");
                return Ok(0);
            }

            let rows = DEFAULT_CATEGORIES
                .iter()
                .map(|(name, description, color)| category::ActiveModel {
                    name: Set(name.to_string()),
                    description: Set(description.to_string()),
                    color: Set(color.to_string()),
                    ..Default::default()
                });
            Category::insert_many(rows).exec(txn).await?;

            info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());
            Ok(DEFAULT_CATEGORIES.len())
        })
    })
    .await
}

/// Database access wrapper shared by the services.
///
/// Cloning is cheap; every clone points at the same pool.
#[derive(Debug, Clone)]
pub struct DatabaseAccess {
    pool: Arc<DbPool>,
}

impl DatabaseAccess {
    /// Create a new database access instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &DbPool {
        &self.pool
    }

    /// Runs `f` inside a transaction: committed when `f` returns `Ok`,
    /// rolled back on `Err`.
    pub async fn transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<T, E>> + Send,
        T: Send,
        E: From<DbErr> + Send + std::error::Error,
    {
        let transaction_id = Uuid::new_v4();
        let start = std::time::Instant::now();

        debug!(transaction_id = %transaction_id, "Starting database transaction");

        let result = self.pool.transaction(f).await;

        let elapsed = start.elapsed();
        histogram!("resin_admin_db.transaction.duration", elapsed);

        match &result {
            Ok(_) => {
                counter!("resin_admin_db.transaction.committed", 1);
                debug!(transaction_id = %transaction_id, "Transaction committed in {:?}", elapsed);
            }
            Err(_) => {
                counter!("resin_admin_db.transaction.rolled_back", 1);
                warn!(transaction_id = %transaction_id, "Transaction rolled back after {:?}", elapsed);
            }
        }

        result.map_err(|e| match e {
            sea_orm::TransactionError::Connection(e) => E::from(e),
            sea_orm::TransactionError::Transaction(e) => e,
        })
    }
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(|e| {
        warn!("Database connection check failed: {}", e);
        ServiceError::DatabaseError(e)
    })
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database connection pool");
    pool.close().await.map_err(ServiceError::DatabaseError)
}
