use late_show::{config::Config, db, repository::Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    late_show::init_tracing();

    let config = Config::from_env()?;
    let conn = db::connect_and_migrate(&config).await?;
    let repo = Repository::new(conn);

    tracing::info!(url = %config.database_url, "replacing data with starter set");
    repo.seed().await?;
    tracing::info!("seeding done");

    repo.db().clone().close().await?;
    Ok(())
}
