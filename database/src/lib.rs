pub mod database_error;
mod database_path;
pub mod models;
pub mod repository;
pub mod repository_manager;

use std::{str::FromStr, sync::Arc};

use sqlx::{
    Pool, Sqlite, SqlitePool, migrate,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Opens the application database and applies pending migrations.
///
/// The location is taken from `DATABASE_URL` (a `.env` file is honoured) and falls back to
/// `db.sqlite` in the application data directory.
pub async fn get_db_pool() -> Result<Arc<Pool<Sqlite>>, sqlx::Error> {
    dotenvy::dotenv().ok();
    let db_url = database_path::get_database_url();
    tracing::info!("Connecting to database {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    migrate!("./migrations").run(&pool).await?;

    Ok(Arc::new(pool))
}

pub async fn setup_test_db() -> SqlitePool {
    // Create an in-memory database connection
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to the in-memory SQLite database");

    // Run migrations
    migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
