//! Article analysis: fetch, length gate, summarize, credibility, fake-news verdict, record.
//!
//! Failures never escape [`Analyzer::analyze`]; they come back as the `error_message`
//! of an otherwise empty [`AnalysisResult`].

use std::sync::Arc;

use chrono::Utc;
use common::AnalysisConfig;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::TrustedSources;
use crate::llm::classifier::classify_summary;
use crate::llm::summarizer::summarize_article;
use crate::llm::{Classifier, Summarizer, SummaryParams};
use crate::scraping::ArticleSource;
use crate::sessions::{AnalysisRecord, Credibility, FakeNewsVerdict, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("❌ Invalid URL")]
    InvalidUrl,

    #[error("❌ Article too short to analyze")]
    ArticleTooShort,

    /// Collaborator failure, message passed through
    #[error("❌ Error analyzing article: {0}")]
    Analysis(String),
}

impl From<anyhow::Error> for AnalysisError {
    fn from(err: anyhow::Error) -> Self {
        AnalysisError::Analysis(format!("{:#}", err))
    }
}

/// Successful analysis of one article
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub summary: String,
    pub credibility: Credibility,
    pub verdict: FakeNewsVerdict,
    pub full_text: String,
}

/// What the caller sees. On error only `error_message` is set; on success it is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub error_message: String,
    pub summary: String,
    pub credibility: String,
    pub fake_news_status: String,
    pub full_text: String,
}

impl AnalysisResult {
    pub fn is_error(&self) -> bool {
        !self.error_message.is_empty()
    }
}

impl From<&Report> for AnalysisResult {
    fn from(report: &Report) -> Self {
        Self {
            error_message: String::new(),
            summary: report.summary.clone(),
            credibility: report.credibility.message().to_string(),
            fake_news_status: report.verdict.status_message(),
            full_text: report.full_text.clone(),
        }
    }
}

impl From<AnalysisError> for AnalysisResult {
    fn from(err: AnalysisError) -> Self {
        Self {
            error_message: err.to_string(),
            ..Default::default()
        }
    }
}

/// The analysis pipeline with its collaborators.
pub struct Analyzer {
    articles: Arc<dyn ArticleSource>,
    summarizer: Arc<dyn Summarizer>,
    classifier: Arc<dyn Classifier>,
    store: Arc<SessionStore>,
    sources: TrustedSources,
    settings: AnalysisConfig,
}

impl Analyzer {
    pub fn new(
        articles: Arc<dyn ArticleSource>,
        summarizer: Arc<dyn Summarizer>,
        classifier: Arc<dyn Classifier>,
        store: Arc<SessionStore>,
        sources: TrustedSources,
        settings: AnalysisConfig,
    ) -> Self {
        Self {
            articles,
            summarizer,
            classifier,
            store,
            sources,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn sources(&self) -> &TrustedSources {
        &self.sources
    }

    /// Analyze `url` and, when `identity` is logged in, append the outcome to its history.
    pub async fn analyze(&self, url: &str, identity: &str) -> AnalysisResult {
        let report = match self.run(url).await {
            Ok(report) => report,
            Err(e) => {
                warn!(%url, "analysis failed: {}", e);
                return e.into();
            }
        };

        let record = AnalysisRecord {
            url: url.to_string(),
            summary: report.summary.clone(),
            credibility: report.credibility,
            verdict: report.verdict,
            timestamp: Utc::now(),
        };
        if self.store.record_analysis(identity, record).await {
            info!(%identity, %url, "analysis recorded");
        }

        AnalysisResult::from(&report)
    }

    /// The pipeline without the history side effect.
    pub async fn run(&self, url: &str) -> Result<Report, AnalysisError> {
        if !has_http_scheme(url) {
            return Err(AnalysisError::InvalidUrl);
        }

        let raw = self.articles.fetch_text(url).await?;
        let text = raw.trim();
        if text.chars().count() < self.settings.min_article_chars {
            return Err(AnalysisError::ArticleTooShort);
        }

        let params = SummaryParams {
            max_length: self.settings.max_summary_length,
            min_length: self.settings.min_summary_length,
            do_sample: false,
        };
        let summary = summarize_article(
            self.summarizer.as_ref(),
            text,
            self.settings.max_input_chars,
            &params,
        )
        .await?;

        let credibility = Credibility::from_trusted(self.sources.is_trusted(url));

        // judged on the summary, not the full article
        let verdict =
            classify_summary(self.classifier.as_ref(), &summary, &self.settings.fake_label).await?;

        info!(%url, ?credibility, ?verdict, "analysis complete");
        Ok(Report {
            summary,
            credibility,
            verdict,
            full_text: text.to_string(),
        })
    }
}

fn has_http_scheme(url: &str) -> bool {
    let bytes = url.as_bytes();
    ["http://", "https://"].iter().any(|scheme| {
        bytes.len() >= scheme.len() && bytes[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
    })
}
