//! One-off analysis of a single URL against the configured models, without the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use common::Config;

use newsverdict::analysis::Analyzer;
use newsverdict::domain::TrustedSources;
use newsverdict::llm::remote::{RemoteModel, DEFAULT_CLASSIFIER_MODEL, DEFAULT_SUMMARIZER_MODEL};
use newsverdict::scraping::HttpArticleSource;
use newsverdict::sessions::{Credentials, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "analyze_url", about = "Analyze one article URL and print the verdict")]
struct Args {
    /// Article URL
    url: String,

    /// Path to config.toml
    #[arg(long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Also print the extracted article text
    #[arg(long)]
    full_text: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let default_path = PathBuf::from("config.default.toml");
    let config = Config::load_with_defaults(Some(default_path.as_path()), Some(args.config.as_path())).await?;

    let models = config.models.as_ref();
    let summarizer = RemoteModel::from_config(models.and_then(|m| m.summarizer.as_ref()), DEFAULT_SUMMARIZER_MODEL)?;
    let classifier = RemoteModel::from_config(models.and_then(|m| m.classifier.as_ref()), DEFAULT_CLASSIFIER_MODEL)?;
    let articles = HttpArticleSource::new(
        config.fetch_timeout_seconds(),
        config.scraping.as_ref().and_then(|s| s.user_agent.as_deref()),
    )?;

    let analyzer = Analyzer::new(
        Arc::new(articles),
        Arc::new(summarizer),
        Arc::new(classifier),
        Arc::new(SessionStore::new(Credentials::default())),
        TrustedSources::new(config.sources.trusted.clone()),
        config.analysis.clone(),
    );

    let result = analyzer.analyze(&args.url, "").await;

    println!("\n{}", "=".repeat(60));
    println!("URL: {}", args.url);
    println!("{}", "=".repeat(60));
    if result.is_error() {
        println!("{}", result.error_message);
        std::process::exit(1);
    }
    println!("📝 Summary:\n{}\n", result.summary);
    println!("🔍 Source Credibility: {}", result.credibility);
    println!("⚠️ Fake News Detection: {}", result.fake_news_status);
    if args.full_text {
        println!("\n📄 Full Article:\n{}", result.full_text);
    }
    Ok(())
}
