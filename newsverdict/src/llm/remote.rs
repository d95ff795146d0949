use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use common::ModelConfig;

use super::{Classification, Classifier, Summarizer, SummaryParams};

pub const DEFAULT_SUMMARIZER_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "mrm8488/bert-tiny-finetuned-fake-news-detection";

/// Hosted inference endpoint for a single model.
///
/// Speaks the JSON protocol of hosted transformer pipelines: `{"inputs": ..., "parameters": ...}`
/// in, `[{"summary_text": ...}]` or `[{"label": ..., "score": ...}]` out.
pub struct RemoteModel {
    base_url: String,
    api_key: Option<String>,
    model: String,
    default_timeout: Duration,
    client: reqwest::Client,
}

impl RemoteModel {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: model.into(),
            default_timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from its config section.
    ///
    /// Without an `api_url` the hosted inference API for the model is used. A configured
    /// `api_key_env` must name a variable that is set.
    pub fn from_config(config: Option<&ModelConfig>, default_model: &str) -> Result<Self> {
        let model = config
            .and_then(|c| c.model.clone())
            .unwrap_or_else(|| default_model.to_string());
        let api_url = config
            .and_then(|c| c.api_url.clone())
            .unwrap_or_else(|| format!("https://api-inference.huggingface.co/models/{}", model));
        let timeout_secs = config.and_then(|c| c.timeout_seconds).unwrap_or(60);

        let mut remote = Self::new(api_url, model).with_timeout(timeout_secs);

        if let Some(api_key_env) = config.and_then(|c| c.api_key_env.as_deref()) {
            let api_key = std::env::var(api_key_env)
                .with_context(|| format!("model API key env var '{}' not set", api_key_env))?;
            remote = remote.with_api_key(api_key);
        }

        Ok(remote)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    async fn infer<B: Serialize + Sync>(&self, body: &B) -> Result<String> {
        let mut request = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = tokio::time::timeout(self.default_timeout, request.send())
            .await
            .context("inference request timed out")?
            .context("inference HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("inference API error {} ({}): {}", status, self.model, body);
        }

        tokio::time::timeout(self.default_timeout, response.text())
            .await
            .context("inference response timed out")?
            .context("failed to read inference response body")
    }
}

#[async_trait::async_trait]
impl Summarizer for RemoteModel {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String> {
        let req_body = InferenceRequest {
            inputs: text,
            parameters: Some(params),
            options: InferenceOptions { wait_for_model: true },
        };

        let body = self.infer(&req_body).await?;
        let items: Vec<SummaryItem> = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse summarization response: {}", body))?;

        let first = items
            .into_iter()
            .next()
            .context("summarization response has no items")?;
        Ok(first.summary_text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl Classifier for RemoteModel {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let req_body = InferenceRequest::<()> {
            inputs: text,
            parameters: None,
            options: InferenceOptions { wait_for_model: true },
        };

        let body = self.infer(&req_body).await?;
        let parsed: ClassifierResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse classification response: {}", body))?;

        let labels = match parsed {
            ClassifierResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            ClassifierResponse::Flat(labels) => labels,
        };

        labels
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .context("classification response has no labels")
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<&'a P>,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

// Pipelines return either one label list per input or a flat list for a single input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    Nested(Vec<Vec<Classification>>),
    Flat(Vec<Classification>),
}
