use std::time::Duration;

use migration::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::{config::Config, error::AppResult};

pub async fn connect_and_migrate(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections())
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;

    // WAL is recorded in the database file, so one connection is enough to
    // switch every pooled connection over. In-memory databases stay "memory".
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA journal_mode=WAL".to_string(),
    ))
    .await?;

    Migrator::up(&db, None).await?;
    tracing::debug!(url = %config.database_url, "database ready");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn journal_mode(db: &DatabaseConnection) -> String {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "PRAGMA journal_mode".to_string(),
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get::<String>("", "journal_mode").unwrap()
    }

    #[tokio::test]
    async fn file_database_is_switched_to_wal_for_every_connection() {
        let path = std::env::temp_dir().join(format!("late-show-wal-{}.db", std::process::id()));
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let db = connect_and_migrate(&Config::for_database(url.clone())).await.unwrap();
        assert_eq!(journal_mode(&db).await, "wal");
        db.close().await.unwrap();

        let fresh = Database::connect(url).await.unwrap();
        assert_eq!(journal_mode(&fresh).await, "wal");
        fresh.close().await.unwrap();

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
