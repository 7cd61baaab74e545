#[cfg(not(feature = "db-sqlite"))]
compile_error!("The `db-sqlite` feature must be enabled.");

use std::str::FromStr;

#[cfg(feature = "db-sqlite")]
pub use sqlx::sqlite::{
    SqliteConnectOptions as DbConnectOptions, SqliteConnection as DbConn, SqlitePool as DbPool,
    SqlitePoolOptions as DbPoolOptions,
};

use crate::config::DatabaseConfig;

/// Opens the pool with foreign keys enforced and brings the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = DbConnectOptions::from_str(&config.url)?.foreign_keys(true);

    let pool = DbPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations complete.");
    Ok(())
}
