//! HTTP client for the catalog endpoints.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::source::{CatalogApi, CatalogSource, SourceError};
use crate::catalog::{CatalogEntity, Product, Project};
use crate::model::Model;

/// Talks to a `catalog-server` (or any backend exposing the same routes).
#[derive(Clone)]
pub struct HttpCatalogApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogApi {
    /// `base_url` is the site origin, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every mutation.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, collection: &str, id: Option<u64>) -> String {
        match id {
            Some(id) => format!("{}/api/{}/{}", self.base_url, collection, id),
            None => format!("{}/api/{}", self.base_url, collection),
        }
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn list<E: DeserializeOwned>(&self, collection: &str) -> Result<Vec<E>, SourceError> {
        let response = self
            .client
            .get(self.url(collection, None))
            .send()
            .await
            .map_err(transport)?;
        let body = read_body(response).await?;
        serde_json::from_value(body).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

impl CatalogSource for HttpCatalogApi {
    async fn list_products(&self) -> Result<Vec<Product>, SourceError> {
        self.list(Product::COLLECTION).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, SourceError> {
        self.list(Project::COLLECTION).await
    }
}

impl CatalogApi for HttpCatalogApi {
    async fn create_entity<E: CatalogEntity>(&self, input: &E::New) -> Result<E, SourceError> {
        let request = self.client.post(self.url(E::COLLECTION, None)).json(input);
        let response = self.authed(request).send().await.map_err(transport)?;
        entity_from(read_body(response).await?, E::KIND)
    }

    async fn update_entity<E: CatalogEntity>(&self, id: u64, patch: &E::Patch) -> Result<E, SourceError> {
        let request = self.client.put(self.url(E::COLLECTION, Some(id))).json(patch);
        let response = self.authed(request).send().await.map_err(transport)?;
        entity_from(read_body(response).await?, E::KIND)
    }

    async fn delete_entity<E: CatalogEntity>(&self, id: u64) -> Result<(), SourceError> {
        let request = self.client.delete(self.url(E::COLLECTION, Some(id)));
        let response = self.authed(request).send().await.map_err(transport)?;
        read_body(response).await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> SourceError {
    SourceError::Transport(err.to_string())
}

/// Decode a JSON body, turning non-2xx answers and `{ success: false }`
/// envelopes into `SourceError::Status`.
async fn read_body(response: Response) -> Result<Value, SourceError> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    let rejected = body
        .as_ref()
        .and_then(|b| b.get("success"))
        .and_then(Value::as_bool)
        == Some(false);
    if !status.is_success() || rejected {
        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| match text.trim() {
                "" => "request failed".to_string(),
                raw => raw.to_string(),
            });
        return Err(SourceError::Status {
            status: status.as_u16(),
            message,
        });
    }
    body.ok_or_else(|| SourceError::Decode("body is not JSON".into()))
}

fn entity_from<E: CatalogEntity>(mut body: Value, kind: &str) -> Result<E, SourceError> {
    let entity = body
        .get_mut(kind)
        .map(Value::take)
        .ok_or_else(|| SourceError::Decode(format!("response has no `{}` field", kind)))?;
    serde_json::from_value(entity).map_err(|e| SourceError::Decode(e.to_string()))
}
