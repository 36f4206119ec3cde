use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings::Database;

/// Open the connection pool. Returns `Ok(None)` when no URL is configured.
pub async fn connect(settings: &Database) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = settings.url.as_deref().filter(|url| !url.trim().is_empty()) else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await?;
    Ok(Some(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_url_means_no_pool() {
        let settings = Database {
            url: Some("  ".into()),
            ..Database::default()
        };
        assert!(connect(&settings).await.unwrap().is_none());
        assert!(connect(&Database::default()).await.unwrap().is_none());
    }
}
