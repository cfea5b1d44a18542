use crate::common::error::{DeployError, Result};
use reqwest::StatusCode;
use serde::Serialize;

/// Status and body of a store response, whatever the status.
#[derive(Debug, Clone)]
pub struct StoreResponse {
    pub status: StatusCode,
    pub body: String,
}

pub struct CouchDbClient {
    base_url: String,
    user: String,
    password: String,
    client: reqwest::Client,
}

impl CouchDbClient {
    pub fn new(base_url: &str, user: &str, password: &str) -> Self {
        log::info!("Creating CouchDB client for {}", base_url);
        CouchDbClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            password: password.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn put(&self, path: &str) -> Result<StoreResponse> {
        let request = self
            .client
            .put(self.url(path))
            .basic_auth(&self.user, Some(&self.password));
        self.send(request).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<StoreResponse> {
        let request = self
            .client
            .post(self.url(path))
            .basic_auth(&self.user, Some(&self.password))
            .json(body);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<StoreResponse> {
        let response = request.send().await.map_err(|e| {
            log::error!("CouchDB request to {} failed: {:?}", self.base_url, e);
            DeployError::Connectivity(format!("{}: {}", self.base_url, e))
        })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeployError::Connectivity(format!("reading response body: {}", e)))?;
        log::debug!("CouchDB responded {} ({} bytes)", status, body.len());
        Ok(StoreResponse { status, body })
    }
}
