//! HTTP transport for the catalog service.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /api/products`, `GET /api/projects`: JSON array, newest first.
//!   `?q=` filters by substring, `?status=` filters projects by status.
//! - `POST /api/products`, `POST /api/projects`: create, `201 { success, product|project }`.
//! - `GET|PUT|DELETE /api/products/:id` and `/api/projects/:id`, by numeric id.
//! - `POST /api/upload`: `{ filename, contentType, folder? }` to `{ uploadUrl, publicUrl, key }`.
//! - `GET /health`: `{ "ok": true }`.
//!
//! Mutations and uploads go through the configured `Authorizer`; request
//! headers form its `Session`. Failures answer `{ success: false, error }`
//! with the error's status code.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::auth::{Authorizer, Session};
use crate::catalog::{
    filter_projects, parse_id, CatalogEntity, CatalogError, CatalogService, Product, Project,
    ProjectStatus,
};
use crate::model::ModelStore;
use crate::sequence::IdAllocator;
use crate::storage::ObjectStore;

/// Shared state of the HTTP handlers.
pub struct AppState<S, A, O> {
    pub catalog: CatalogService<S, A, O>,
    pub auth: Box<dyn Authorizer>,
}

impl<S, A, O> AppState<S, A, O> {
    pub fn new(catalog: CatalogService<S, A, O>, auth: impl Authorizer + 'static) -> Self {
        Self {
            catalog,
            auth: Box::new(auth),
        }
    }
}

/// Build an axum `Router` serving the catalog API.
pub fn router<S, A, O>(state: Arc<AppState<S, A, O>>) -> Router
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/products",
            get(list_products::<S, A, O>).post(create_handler::<S, A, O, Product>),
        )
        .route(
            "/api/products/:id",
            get(get_handler::<S, A, O, Product>)
                .put(update_handler::<S, A, O, Product>)
                .delete(delete_handler::<S, A, O, Product>),
        )
        .route(
            "/api/projects",
            get(list_projects::<S, A, O>).post(create_handler::<S, A, O, Project>),
        )
        .route(
            "/api/projects/:id",
            get(get_handler::<S, A, O, Project>)
                .put(update_handler::<S, A, O, Project>)
                .delete(delete_handler::<S, A, O, Project>),
        )
        .route("/api/upload", post(upload_handler::<S, A, O>))
        .with_state(state)
}

/// Serve the API at `addr` (e.g. `"0.0.0.0:8080"`) until `shutdown` resolves.
pub async fn serve<S, A, O, F>(
    state: Arc<AppState<S, A, O>>,
    addr: &str,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "catalog api listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}

type Shared<S, A, O> = State<Arc<AppState<S, A, O>>>;

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    q: Option<String>,
    status: Option<String>,
}

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /api/products`
async fn list_products<S, A, O>(
    State(state): Shared<S, A, O>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
{
    let items = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => state.catalog.search::<Product>(q)?,
        _ => state.catalog.list::<Product>()?,
    };
    Ok(Json(items))
}

/// `GET /api/projects`
async fn list_projects<S, A, O>(
    State(state): Shared<S, A, O>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Project>>, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
{
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<ProjectStatus>)
        .transpose()?;
    let items = state.catalog.list::<Project>()?;
    let filtered = filter_projects(&items, query.q.as_deref().unwrap_or(""), status)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(filtered))
}

/// `GET /api/<collection>/:id`
async fn get_handler<S, A, O, E>(
    State(state): Shared<S, A, O>,
    Path(id): Path<String>,
) -> Result<Json<E>, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
    E: CatalogEntity,
{
    Ok(Json(state.catalog.get::<E>(parse_id(&id)?)?))
}

/// `POST /api/<collection>`
async fn create_handler<S, A, O, E>(
    State(state): Shared<S, A, O>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
    E: CatalogEntity,
{
    state.auth.authorize(&session_from_headers(&headers))?;
    let input: E::New = serde_json::from_slice(&body)?;
    let created = state.catalog.create::<E>(input)?;
    Ok((StatusCode::CREATED, Json(envelope::<E>(&created)?)).into_response())
}

/// `PUT /api/<collection>/:id`
async fn update_handler<S, A, O, E>(
    State(state): Shared<S, A, O>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
    E: CatalogEntity,
{
    state.auth.authorize(&session_from_headers(&headers))?;
    let id = parse_id(&id)?;
    let patch: E::Patch = serde_json::from_slice(&body)?;
    let updated = state.catalog.update::<E>(id, patch)?;
    Ok(Json(envelope::<E>(&updated)?))
}

/// `DELETE /api/<collection>/:id`
async fn delete_handler<S, A, O, E>(
    State(state): Shared<S, A, O>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
    E: CatalogEntity,
{
    state.auth.authorize(&session_from_headers(&headers))?;
    let report = state.catalog.delete::<E>(parse_id(&id)?)?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} and its images deleted", E::KIND),
        "removedImages": report.removed_images,
        "failedImages": report.failed_images,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    content_type: String,
    folder: Option<String>,
}

/// `POST /api/upload`
async fn upload_handler<S, A, O>(
    State(state): Shared<S, A, O>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, CatalogError>
where
    S: ModelStore + 'static,
    A: IdAllocator + 'static,
    O: ObjectStore + 'static,
{
    state.auth.authorize(&session_from_headers(&headers))?;
    let request: UploadRequest = serde_json::from_slice(&body)?;
    let upload = state.catalog.presign_upload(
        request.folder.as_deref(),
        &request.filename,
        &request.content_type,
    )?;
    Ok(Json(serde_json::to_value(upload)?))
}

/// `{ "success": true, "<kind>": entity }`
fn envelope<E: CatalogEntity>(entity: &E) -> Result<Value, CatalogError> {
    let mut body = serde_json::Map::new();
    body.insert("success".into(), Value::Bool(true));
    body.insert(E::KIND.into(), serde_json::to_value(entity)?);
    Ok(Value::Object(body))
}

/// Extract session variables from HTTP headers.
///
/// All headers are lowercased and included as session variables.
fn session_from_headers(headers: &HeaderMap) -> Session {
    let mut vars = HashMap::new();
    for (name, value) in headers.iter() {
        if let Ok(v) = value.to_str() {
            vars.insert(name.as_str().to_string(), v.to_string());
        }
    }
    Session::from_map(vars)
}
