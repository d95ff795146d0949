use crate::llm::summarizer::leading_chars;
use crate::sessions::{AnalysisRecord, SessionStore};

pub const USER_NOT_FOUND: &str = "User not found.";
pub const NO_ARTICLES: &str = "No articles analyzed yet.";

/// Characters of each summary shown in the history listing
const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Render the identity's history as text, oldest first.
pub async fn format_history(store: &SessionStore, identity: &str) -> String {
    match store.get_history(identity).await {
        None => USER_NOT_FOUND.to_string(),
        Some(history) => render(&history),
    }
}

pub fn render(history: &[AnalysisRecord]) -> String {
    if history.is_empty() {
        return NO_ARTICLES.to_string();
    }

    history
        .iter()
        .map(render_record)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_record(record: &AnalysisRecord) -> String {
    format!(
        "[{}]\n{}\nSummary: {}...\nCredibility: {}\nStatus: {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.url,
        leading_chars(&record.summary, SUMMARY_PREVIEW_CHARS),
        record.credibility.message(),
        record.verdict.status_message(),
    )
}
