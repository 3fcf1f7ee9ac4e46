use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::{ChatMessage, SourceRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Fetcher backed by reqwest: GETs pages, POSTs extraction prompts
pub struct HttpFetcher {
    client: Client,
    llm_endpoint: String,
}

impl HttpFetcher {
    pub fn new(llm_endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            llm_endpoint: llm_endpoint.into(),
        })
    }

    async fn get_page(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    async fn complete(&self, page_url: &str, messages: &[ChatMessage]) -> Result<String> {
        debug!(page_url, endpoint = %self.llm_endpoint, "Requesting extraction");

        let response = self
            .client
            .post(&self.llm_endpoint)
            .json(&CompletionRequest { messages })
            .send()
            .await
            .context("Failed to send extraction request")?;

        if !response.status().is_success() {
            warn!("Extraction endpoint returned status: {}", response.status());
            anyhow::bail!("Extraction request failed: {}", response.status());
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to decode extraction response")?;

        let completion = completion_text(&body);
        debug!(page_url, completion_length = completion.len(), "Extraction response received");
        Ok(completion)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &SourceRequest) -> Result<String> {
        match request {
            SourceRequest::Page { url } => self.get_page(url).await,
            SourceRequest::Extraction { page_url, messages } => {
                self.complete(page_url, messages).await
            }
        }
    }
}

/// The `completion` string of an extraction response, empty when absent
fn completion_text(body: &Value) -> String {
    body.get("completion")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
