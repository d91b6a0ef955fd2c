use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects to `DATABASE_URL` and applies migrations. Returns `None` when unset.
pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

/// Returns an email unique to one test run.
pub(crate) fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@baladiya.test", uuid::Uuid::new_v4().simple())
}
