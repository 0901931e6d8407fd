use storage::repository::Storage;
use study_server::AppState;
use tokio::net::TcpListener;

use crate::args::{Database, ServeArgs};
use crate::db::{normalize_sqlite_url, prepare_sqlite_file};
use crate::error::AppError;

pub async fn run(args: ServeArgs) -> Result<(), AppError> {
    let storage = match args.db {
        Database::Memory => {
            tracing::warn!("using in-memory storage; data is lost on exit");
            Storage::in_memory()
        }
        Database::Sqlite(raw) => {
            let url = normalize_sqlite_url(&raw);
            prepare_sqlite_file(&url)?;
            Storage::sqlite(&url).await?
        }
    };

    let listener = TcpListener::bind(args.addr).await?;
    study_server::serve(listener, AppState::new(storage), shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; shutting down");
        return;
    }
    tracing::info!("ctrl-c received; shutting down");
}
