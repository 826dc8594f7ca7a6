//! HTTP client helpers for tests.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Status code, `x-vecgate-status` header and decoded JSON body.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub status_header: String,
    pub body: Value,
}

impl TestResponse {
    pub fn payload(&self) -> &Value {
        &self.body["payload"]
    }

    pub fn error_kind(&self) -> Option<&str> {
        self.body["error_kind"].as_str()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    async fn finish(resp: reqwest::Response) -> Result<TestResponse, TestClientError> {
        let status = resp.status().as_u16();
        let status_header = resp
            .headers()
            .get("x-vecgate-status")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let text = resp.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(TestResponse {
            status,
            status_header,
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse, TestClientError> {
        let resp = self.client.get(self.url(path)).send().await?;
        Self::finish(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<TestResponse, TestClientError> {
        let resp = self.client.delete(self.url(path)).send().await?;
        Self::finish(resp).await
    }

    pub async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<TestResponse, TestClientError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        Self::finish(resp).await
    }

    pub async fn patch<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<TestResponse, TestClientError> {
        let resp = self.client.patch(self.url(path)).json(body).send().await?;
        Self::finish(resp).await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> Result<TestResponse, TestClientError> {
        let resp = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        Self::finish(resp).await
    }

    pub async fn create_collection(
        &self,
        name: &str,
        dimensions: u64,
        distance: &str,
    ) -> Result<TestResponse, TestClientError> {
        self.post(
            "/collections",
            &serde_json::json!({"name": name, "dimensions": dimensions, "distance": distance}),
        )
        .await
    }

    pub async fn health(&self) -> Result<TestResponse, TestClientError> {
        self.get("/healthz").await
    }

    pub async fn ready(&self) -> Result<TestResponse, TestClientError> {
        self.get("/ready").await
    }
}
