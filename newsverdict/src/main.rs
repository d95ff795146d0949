/*
newsverdict - server main.rs
Loads configuration, wires the analysis pipeline to its collaborators and serves the HTTP API.
*/

use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsverdict::analysis::Analyzer;
use newsverdict::domain::TrustedSources;
use newsverdict::llm::remote::{RemoteModel, DEFAULT_CLASSIFIER_MODEL, DEFAULT_SUMMARIZER_MODEL};
use newsverdict::scraping::HttpArticleSource;
use newsverdict::server::{launch_rocket, AppState};
use newsverdict::sessions::{Credentials, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "newsverdict", about = "Article summary, credibility and fake-news verdict server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = match Config::load_with_defaults(
        if default_path.exists() { Some(default_path.as_path()) } else { None },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default_path = ?default_path, override_path = ?override_path, "configuration loaded");

    let credentials = Credentials::from_users(&config.users);
    if credentials.is_empty() {
        error!("no usable users configured; nobody will be able to log in");
    }
    info!("{} users loaded", credentials.len());
    let store = Arc::new(SessionStore::new(credentials));

    let scraping = config.scraping.as_ref();
    let articles = HttpArticleSource::new(
        config.fetch_timeout_seconds(),
        scraping.and_then(|s| s.user_agent.as_deref()),
    )?;

    let models = config.models.as_ref();
    let summarizer = RemoteModel::from_config(
        models.and_then(|m| m.summarizer.as_ref()),
        DEFAULT_SUMMARIZER_MODEL,
    )?;
    info!("summarizer model: {}", summarizer.model());
    let classifier = RemoteModel::from_config(
        models.and_then(|m| m.classifier.as_ref()),
        DEFAULT_CLASSIFIER_MODEL,
    )?;
    info!("classifier model: {}", classifier.model());

    let sources = TrustedSources::new(config.sources.trusted.clone());
    info!(trusted = ?sources.domains(), "trusted sources");

    let analyzer = Analyzer::new(
        Arc::new(articles),
        Arc::new(summarizer),
        Arc::new(classifier),
        store,
        sources,
        config.analysis.clone(),
    );

    info!("Launching Rocket HTTP server");
    if let Err(e) = launch_rocket(AppState::new(Arc::new(analyzer)), config.server.as_ref()).await {
        error!(%e, "Rocket server failed");
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}
