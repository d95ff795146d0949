// Summarizer module
use anyhow::Result;
use tracing::{debug, info};

use super::{Summarizer, SummaryParams};

/// Summarize the leading `max_input_chars` characters of an article.
///
/// Model failures are returned to the caller untouched; there is no fallback summary.
pub async fn summarize_article<S: Summarizer + ?Sized>(
    summarizer: &S,
    article_text: &str,
    max_input_chars: usize,
    params: &SummaryParams,
) -> Result<String> {
    let input = leading_chars(article_text, max_input_chars);
    debug!(
        "summarizer input: {} of {} chars",
        input.chars().count(),
        article_text.chars().count()
    );

    let summary = summarizer.summarize(input, params).await?;
    info!("summarization successful: {} chars", summary.chars().count());
    Ok(summary)
}

/// Prefix of `s` holding at most `max_chars` characters.
pub fn leading_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
