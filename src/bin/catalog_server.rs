use std::process::ExitCode;
use std::sync::Arc;

use catalog_sync::auth::{Authorizer, DenyAll, StaticTokenAuthorizer};
use catalog_sync::catalog::CatalogService;
use catalog_sync::config::Config;
use catalog_sync::http::{self, AppState};
use catalog_sync::model::{Connection, InMemoryModelStore};
use catalog_sync::sequence::SequenceAllocator;
use catalog_sync::storage::InMemoryObjectStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };

    let conn = Arc::new(Connection::lazy(|| Ok(InMemoryModelStore::new())));
    let objects = InMemoryObjectStore::new(config.public_base.clone())
        .with_endpoint(config.upload_endpoint.clone())
        .with_expiry(config.upload_expiry);
    let catalog = CatalogService::new(
        Arc::clone(&conn),
        SequenceAllocator::new(Arc::clone(&conn)),
        objects,
    );

    let auth: Box<dyn Authorizer> = match &config.admin_token {
        Some(token) => Box::new(StaticTokenAuthorizer::new(token.clone())),
        None => Box::new(DenyAll),
    };
    let state = Arc::new(AppState { catalog, auth });

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
    };

    match http::serve(state, &config.bind_addr, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, addr = %config.bind_addr, "server failed");
            ExitCode::FAILURE
        }
    }
}
