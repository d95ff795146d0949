use anyhow::{Context, Result};
use html2text::render::TrivialDecorator;
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;
use tracing::{info, warn};

/// Turns an article URL into its plain-text body.
#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Downloads the page and extracts the main content with readability.
pub struct HttpArticleSource {
    client: Client,
}

impl HttpArticleSource {
    pub fn new(timeout_secs: u64, user_agent: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent.unwrap_or("newsverdict/0.1.0"))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ArticleSource for HttpArticleSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        // Readability needs a parsed Url to resolve relative links
        let url_obj = url::Url::parse(url).context("failed to parse article URL")?;

        let response = self
            .client
            .get(url_obj.clone())
            .send()
            .await
            .context("failed to fetch article page")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("article fetch failed with status: {}", status);
        }

        let bytes = response.bytes().await.context("failed to read response body")?;
        extract_text(&bytes, &url_obj)
    }
}

// Wide enough that paragraphs come out as single lines.
const UNWRAPPED_WIDTH: usize = 10_000;

/// Main article text of an HTML page.
///
/// Plain text only: no link markers, footnotes, emphasis marks or hard wraps, so the
/// character count reflects what the article actually says.
pub fn extract_text(html: &[u8], url: &url::Url) -> Result<String> {
    let mut reader = Cursor::new(html);
    let product = readability::extractor::extract(&mut reader, url)
        .map_err(|e| anyhow::anyhow!("failed to extract article content: {}", e))?;

    let rendered = html2text::config::with_decorator(TrivialDecorator::new())
        .no_link_wrapping()
        .allow_width_overflow()
        .string_from_read(product.content.as_bytes(), UNWRAPPED_WIDTH);

    let text = match rendered {
        Ok(text) => text,
        Err(e) => {
            warn!("scraping: html to text conversion failed for {}: {}", url, e);
            product.text
        }
    };
    let text = text.trim().to_string();
    info!("scraping: extracted {} chars from {}", text.chars().count(), url);
    Ok(text)
}
