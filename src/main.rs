use std::sync::Arc;

use late_show::{AppState, config::Config, db, repository::Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    late_show::init_tracing();

    let config = Config::from_env()?;

    let conn = db::connect_and_migrate(&config).await?;
    let repo = Repository::new(conn);

    let state = Arc::new(AppState { repo: repo.clone() });
    let app = late_show::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    repo.db().clone().close().await?;
    tracing::info!("database closed, bye");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down");
}
