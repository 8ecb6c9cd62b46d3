use std::sync::Arc;

use catalog_sync::auth::StaticTokenAuthorizer;
use catalog_sync::catalog::CatalogService;
use catalog_sync::http::{self, AppState};
use catalog_sync::model::{Connection, InMemoryModelStore};
use catalog_sync::sequence::SequenceAllocator;
use catalog_sync::storage::InMemoryObjectStore;

pub const TOKEN: &str = "admin-secret";
pub const PUBLIC_BASE: &str = "https://cdn.example.com";

pub struct Server {
    pub base: String,
    pub objects: InMemoryObjectStore,
}

/// Bind to port 0 and return the actual address.
pub async fn start_server() -> Server {
    let conn = Arc::new(Connection::ready(InMemoryModelStore::new()));
    let objects = InMemoryObjectStore::new(PUBLIC_BASE);
    let catalog = CatalogService::new(
        Arc::clone(&conn),
        SequenceAllocator::new(conn),
        objects.clone(),
    );
    let state = Arc::new(AppState::new(catalog, StaticTokenAuthorizer::new(TOKEN)));

    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server {
        base: format!("http://{addr}"),
        objects,
    }
}
