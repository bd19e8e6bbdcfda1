//! HTTP implementation of [`RemoteCollection`].
//!
//! Talks to the `/api/{collection}` endpoints served by `servicedesk-server`.
//! Requests carry no timeout.

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{RemoteCollection, RemoteError, Resource};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Remote store reached over HTTP. One instance serves every collection.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(collection: &str) -> String {
        format!("/api/{}", collection)
    }

    fn url(&self, collection: &str) -> String {
        format!("{}{}", self.base_url, Self::path(collection))
    }

    /// Turn a response into `Ok` or the store's error message.
    ///
    /// Falls back to "METHOD /path failed" when the body carries no message.
    async fn check(response: Response, method: &Method, path: &str) -> Result<Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("{} {} failed", method, path));

        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl<T: Resource> RemoteCollection<T> for HttpRemote {
    async fn list(&self) -> Result<Vec<T>, RemoteError> {
        let path = Self::path(T::COLLECTION);
        debug!(collection = T::COLLECTION, "GET {}", path);

        let response = self.client.get(self.url(T::COLLECTION)).send().await?;
        let response = Self::check(response, &Method::GET, &path).await?;
        response.json::<Vec<T>>().await.map_err(|e| {
            RemoteError::Transport(format!("Failed to parse {} list: {}", T::COLLECTION, e))
        })
    }

    async fn create(&self, item: &T) -> Result<(), RemoteError> {
        let path = Self::path(T::COLLECTION);
        debug!(collection = T::COLLECTION, id = item.id(), "POST {}", path);

        let response = self
            .client
            .post(self.url(T::COLLECTION))
            .json(item)
            .send()
            .await?;
        Self::check(response, &Method::POST, &path).await?;
        Ok(())
    }

    async fn update_field(&self, id: &str, update: &T::Update) -> Result<(), RemoteError> {
        let path = Self::path(T::COLLECTION);
        debug!(collection = T::COLLECTION, id, ?update, "PATCH {}", path);

        let mut body = serde_json::to_value(update)
            .map_err(|e| RemoteError::Transport(format!("Failed to encode update: {}", e)))?;
        if let Value::Object(fields) = &mut body {
            fields.insert("id".to_string(), Value::String(id.to_string()));
        }

        let response = self
            .client
            .patch(self.url(T::COLLECTION))
            .json(&body)
            .send()
            .await?;
        Self::check(response, &Method::PATCH, &path).await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RemoteError> {
        let path = Self::path(T::COLLECTION);
        debug!(collection = T::COLLECTION, id, "DELETE {}", path);

        let url = format!("{}?id={}", self.url(T::COLLECTION), urlencoding::encode(id));
        let response = self.client.delete(url).send().await?;
        Self::check(response, &Method::DELETE, &path).await?;
        Ok(())
    }
}
