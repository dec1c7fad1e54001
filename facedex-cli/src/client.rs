//! Thin HTTP client for the facedex server API.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::debug;

/// Client bound to one server and one conversation id.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    chat_id: i64,
}

impl ApiClient {
    pub fn new(base_url: String, chat_id: i64) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chat_id,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request failed: GET {url}"))?;
        Self::parse(response).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request failed: POST {url}"))?;
        Self::parse(response).await
    }

    /// Send a message through the conversational webhook and return the reply.
    pub async fn bot(&self, text: &str) -> Result<Value> {
        self.post_json(
            "/bot/webhook",
            json!({ "message": { "chat": { "id": self.chat_id }, "text": text } }),
        )
        .await
    }

    async fn parse(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let detail = body["error"].as_str().unwrap_or("no detail");
            bail!("server returned {status}: {detail}");
        }
        Ok(body)
    }
}
