use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod remote;
pub mod summarizer;

/// Abstractive summarization model
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` within the given output bounds
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String>;
}

/// Text classification model (fake-news detector)
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Top label for `text` together with its score
    async fn classify(&self, text: &str) -> Result<Classification>;
}

/// Generation bounds passed to the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryParams {
    pub max_length: usize,
    pub min_length: usize,
    /// false means greedy decoding
    pub do_sample: bool,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 130,
            min_length: 30,
            do_sample: false,
        }
    }
}

/// Single label prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}
