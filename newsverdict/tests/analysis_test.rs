use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use common::{default_users, AnalysisConfig};
use newsverdict::analysis::{AnalysisError, Analyzer};
use newsverdict::domain::TrustedSources;
use newsverdict::history::{format_history, NO_ARTICLES, USER_NOT_FOUND};
use newsverdict::llm::{Classification, Classifier, Summarizer, SummaryParams};
use newsverdict::scraping::{extract_text, ArticleSource};
use newsverdict::sessions::{Credentials, Credibility, FakeNewsLabel, SessionStore};

const ARTICLE: &str = "The city council approved a new public transport plan on Tuesday. \
    The plan adds three bus lines, extends tram service hours, and lowers fares for students \
    and seniors starting next spring.";

/// Serves a fixed body (or error) and counts calls.
struct StubArticles {
    body: Result<String, String>,
    calls: AtomicUsize,
}

impl StubArticles {
    fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self { body: Ok(body.to_string()), calls: AtomicUsize::new(0) })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self { body: Err(message.to_string()), calls: AtomicUsize::new(0) })
    }
}

#[async_trait::async_trait]
impl ArticleSource for StubArticles {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.body.clone().map_err(|m| anyhow::anyhow!(m))
    }
}

/// Serves an HTML page through the real text extraction.
struct HtmlPage(&'static str);

#[async_trait::async_trait]
impl ArticleSource for HtmlPage {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        extract_text(self.0.as_bytes(), &url::Url::parse(url)?)
    }
}

/// Echoes a fixed summary and remembers what it was asked.
struct StubSummarizer {
    summary: Option<String>,
    inputs: Mutex<Vec<(String, SummaryParams)>>,
}

impl StubSummarizer {
    fn returning(summary: &str) -> Arc<Self> {
        Arc::new(Self { summary: Some(summary.to_string()), inputs: Mutex::new(Vec::new()) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { summary: None, inputs: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String> {
        self.inputs.lock().unwrap().push((text.to_string(), *params));
        self.summary.clone().ok_or_else(|| anyhow::anyhow!("model unavailable"))
    }
}

struct StubClassifier {
    label: &'static str,
    score: f64,
    inputs: Mutex<Vec<String>>,
}

impl StubClassifier {
    fn new(label: &'static str, score: f64) -> Arc<Self> {
        Arc::new(Self { label, score, inputs: Mutex::new(Vec::new()) })
    }
}

#[async_trait::async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(Classification { label: self.label.to_string(), score: self.score })
    }
}

fn store() -> Arc<SessionStore> {
    Arc::new(SessionStore::new(Credentials::from_users(&default_users())))
}

fn analyzer(
    articles: Arc<StubArticles>,
    summarizer: Arc<StubSummarizer>,
    classifier: Arc<StubClassifier>,
    store: Arc<SessionStore>,
) -> Analyzer {
    Analyzer::new(
        articles,
        summarizer,
        classifier,
        store,
        TrustedSources::default(),
        AnalysisConfig::default(),
    )
}

#[tokio::test]
async fn test_successful_analysis_is_recorded() {
    let store = store();
    store.login("admin", "admin123").await;

    let summarizer = StubSummarizer::returning("Council approves transit plan.");
    let classifier = StubClassifier::new("REAL", 0.912);
    let analyzer = analyzer(StubArticles::ok(ARTICLE), summarizer.clone(), classifier.clone(), store.clone());

    let result = analyzer.analyze("https://www.bbc.com/news/123", "admin").await;

    assert!(!result.is_error(), "unexpected error: {}", result.error_message);
    assert_eq!(result.summary, "Council approves transit plan.");
    assert_eq!(result.credibility, "✅ Trusted Source");
    assert_eq!(result.fake_news_status, "✅ Article appears credible (confidence: 0.91)");
    assert_eq!(result.full_text, ARTICLE);

    // the classifier judges the summary, not the article
    assert_eq!(*classifier.inputs.lock().unwrap(), vec!["Council approves transit plan.".to_string()]);
    let params = summarizer.inputs.lock().unwrap()[0].1;
    assert_eq!(params, SummaryParams { max_length: 130, min_length: 30, do_sample: false });

    let history = store.get_history("admin").await.expect("session");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, "https://www.bbc.com/news/123");
    assert_eq!(history[0].credibility, Credibility::Trusted);
    assert_eq!(history[0].verdict.label, FakeNewsLabel::Real);
}

#[tokio::test]
async fn test_fake_verdict_and_unverified_source() {
    let analyzer = analyzer(
        StubArticles::ok(ARTICLE),
        StubSummarizer::returning("Aliens endorse candidate."),
        StubClassifier::new("FAKE", 0.8765),
        store(),
    );

    let result = analyzer.analyze("https://randomblog.example/post", "").await;

    assert_eq!(result.credibility, "⚠️ Unverified Source");
    assert_eq!(
        result.fake_news_status,
        "🚨 Warning: This article is likely FAKE news (confidence: 0.88)"
    );
}

#[tokio::test]
async fn test_invalid_url_short_circuits() {
    let articles = StubArticles::ok(ARTICLE);
    let analyzer = analyzer(
        articles.clone(),
        StubSummarizer::returning("unused"),
        StubClassifier::new("REAL", 0.5),
        store(),
    );

    for url in ["www.bbc.com/news", "ftp://bbc.com/a", "", "javascript:alert(1)"] {
        let result = analyzer.analyze(url, "").await;
        assert_eq!(result.error_message, "❌ Invalid URL");
        assert!(result.summary.is_empty());
        assert!(result.credibility.is_empty());
        assert!(result.fake_news_status.is_empty());
        assert!(result.full_text.is_empty());
    }
    assert_eq!(articles.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_short_article_rejected_before_models() {
    let summarizer = StubSummarizer::returning("unused");
    let store = store();
    store.login("guest", "guest").await;
    // 99 characters once surrounding whitespace is trimmed
    let body = format!("   {}\n\n", "a".repeat(99));
    let analyzer = analyzer(StubArticles::ok(&body), summarizer.clone(), StubClassifier::new("REAL", 0.5), store.clone());

    let err = analyzer.run("https://apnews.com/article/x").await.unwrap_err();
    assert_eq!(err, AnalysisError::ArticleTooShort);

    let result = analyzer.analyze("https://apnews.com/article/x", "guest").await;
    assert_eq!(result.error_message, "❌ Article too short to analyze");
    assert!(result.full_text.is_empty());
    assert_eq!(summarizer.calls(), 0);
    // errors are not persisted
    assert_eq!(store.get_history("guest").await, Some(vec![]));
}

#[tokio::test]
async fn test_link_heavy_short_page_is_too_short() {
    let summarizer = StubSummarizer::returning("unused");
    let analyzer = Analyzer::new(
        Arc::new(HtmlPage(
            "<html><body><article><p>Read <a href=\"https://a.example/one\">this one</a> and \
             <a href=\"https://a.example/two\">that</a> and \
             <a href=\"https://a.example/three\">more</a>. Short text.</p></article></body></html>",
        )),
        summarizer.clone(),
        StubClassifier::new("REAL", 0.5),
        store(),
        TrustedSources::default(),
        AnalysisConfig::default(),
    );

    let err = analyzer.run("https://a.example/story").await.unwrap_err();
    assert_eq!(err, AnalysisError::ArticleTooShort);
    assert_eq!(summarizer.calls(), 0);
}

#[tokio::test]
async fn test_exactly_minimum_length_passes() {
    let analyzer = analyzer(
        StubArticles::ok(&"b".repeat(100)),
        StubSummarizer::returning("ok"),
        StubClassifier::new("REAL", 0.5),
        store(),
    );
    assert!(analyzer.run("http://example.org/a").await.is_ok());
}

#[tokio::test]
async fn test_collaborator_failures_become_analysis_errors() {
    let store = store();
    store.login("user", "user").await;

    let analyzer_fetch = analyzer(
        StubArticles::failing("connection reset"),
        StubSummarizer::returning("unused"),
        StubClassifier::new("REAL", 0.5),
        store.clone(),
    );
    let result = analyzer_fetch.analyze("https://nytimes.com/a", "user").await;
    assert_eq!(result.error_message, "❌ Error analyzing article: connection reset");
    assert!(result.summary.is_empty() && result.full_text.is_empty());

    let analyzer_model = analyzer(
        StubArticles::ok(ARTICLE),
        StubSummarizer::failing(),
        StubClassifier::new("REAL", 0.5),
        store.clone(),
    );
    let result = analyzer_model.analyze("https://nytimes.com/a", "user").await;
    assert_eq!(result.error_message, "❌ Error analyzing article: model unavailable");
    assert!(result.credibility.is_empty());

    assert_eq!(store.get_history("user").await, Some(vec![]));
}

#[tokio::test]
async fn test_summarizer_sees_at_most_1024_chars() {
    let summarizer = StubSummarizer::returning("summary");
    let long_article = "word ".repeat(600);
    let analyzer = analyzer(StubArticles::ok(&long_article), summarizer.clone(), StubClassifier::new("REAL", 0.5), store());

    let result = analyzer.analyze("https://deccanherald.com/x", "").await;

    assert!(!result.is_error());
    assert_eq!(summarizer.inputs.lock().unwrap()[0].0.chars().count(), 1024);
    // the caller still gets the whole (trimmed) article
    assert_eq!(result.full_text, long_article.trim());
}

#[tokio::test]
async fn test_anonymous_and_logged_out_callers_are_not_recorded() {
    let store = store();
    let analyzer = analyzer(
        StubArticles::ok(ARTICLE),
        StubSummarizer::returning("summary"),
        StubClassifier::new("REAL", 0.5),
        store.clone(),
    );

    let result = analyzer.analyze("https://www.bbc.com/news/1", "admin").await;
    assert!(!result.is_error());
    assert!(store.get_history("admin").await.is_none());

    store.login("admin", "admin123").await;
    analyzer.analyze("https://www.bbc.com/news/2", "admin").await;
    store.logout("admin").await;
    let result = analyzer.analyze("https://www.bbc.com/news/3", "admin").await;
    assert!(!result.is_error());
    assert!(store.get_history("admin").await.is_none());
}

#[tokio::test]
async fn test_history_grows_by_one_per_analysis_and_formats_in_order() {
    let store = store();
    store.login("guest", "guest").await;
    assert_eq!(format_history(&store, "guest").await, NO_ARTICLES);
    assert_eq!(format_history(&store, "admin").await, USER_NOT_FOUND);

    let long_summary = "s".repeat(140);
    let analyzer = analyzer(
        StubArticles::ok(ARTICLE),
        StubSummarizer::returning(&long_summary),
        StubClassifier::new("FAKE", 0.6),
        store.clone(),
    );

    analyzer.analyze("https://www.bbc.com/news/first", "guest").await;
    assert_eq!(store.get_history("guest").await.map(|h| h.len()), Some(1));
    analyzer.analyze("https://randomblog.example/second", "guest").await;
    assert_eq!(store.get_history("guest").await.map(|h| h.len()), Some(2));

    let text = format_history(&store, "guest").await;
    let blocks: Vec<&str> = text.split("\n\n").collect();
    assert_eq!(blocks.len(), 2);

    assert!(blocks[0].contains("https://www.bbc.com/news/first"));
    assert!(blocks[0].contains(&format!("Summary: {}...", "s".repeat(100))));
    assert!(!blocks[0].contains(&"s".repeat(101)));
    assert!(blocks[0].contains("Credibility: ✅ Trusted Source"));
    assert!(blocks[0].contains("Status: 🚨 Warning: This article is likely FAKE news (confidence: 0.60)"));

    assert!(blocks[1].contains("https://randomblog.example/second"));
    assert!(blocks[1].contains("Credibility: ⚠️ Unverified Source"));
}
