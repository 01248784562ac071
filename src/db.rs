use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::errors::AppError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Map a stored text column onto one of the domain enums.
pub(crate) fn decode_text<T>(column: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(|e: String| {
        AppError::Db(sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: e.into(),
        })
    })
}
