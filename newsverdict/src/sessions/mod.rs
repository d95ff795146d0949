use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod credentials;

pub use credentials::Credentials;

/// Source credibility derived from the URL's domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credibility {
    Trusted,
    Unverified,
}

impl Credibility {
    pub fn from_trusted(trusted: bool) -> Self {
        if trusted {
            Credibility::Trusted
        } else {
            Credibility::Unverified
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Credibility::Trusted => "✅ Trusted Source",
            Credibility::Unverified => "⚠️ Unverified Source",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FakeNewsLabel {
    Fake,
    Real,
}

/// Classifier verdict over an article summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FakeNewsVerdict {
    pub label: FakeNewsLabel,
    /// Classifier score in [0, 1]
    pub confidence: f64,
}

impl FakeNewsVerdict {
    pub fn status_message(&self) -> String {
        match self.label {
            FakeNewsLabel::Fake => format!(
                "🚨 Warning: This article is likely FAKE news (confidence: {:.2})",
                self.confidence
            ),
            FakeNewsLabel::Real => format!(
                "✅ Article appears credible (confidence: {:.2})",
                self.confidence
            ),
        }
    }
}

/// One completed analysis in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub url: String,
    pub summary: String,
    pub credibility: Credibility,
    pub verdict: FakeNewsVerdict,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

/// A logged-in user's state
#[derive(Debug, Clone)]
pub struct Session {
    pub started_at: DateTime<Utc>,
    pub history: Vec<AnalysisRecord>,
}

impl Session {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("❌ Invalid credentials - please try again.")]
    InvalidCredentials,
}

/// Result of a login attempt as shown to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub message: String,
    pub session_active: bool,
    pub identity: Option<String>,
}

impl LoginOutcome {
    fn success(username: &str) -> Self {
        Self {
            message: format!("✅ Logged in as {}", username),
            session_active: true,
            identity: Some(username.to_string()),
        }
    }

    fn failure(err: LoginError) -> Self {
        Self {
            message: err.to_string(),
            session_active: false,
            identity: None,
        }
    }
}

/// In-memory session store: username -> session, alive between login and logout.
///
/// Nothing here survives a restart.
pub struct SessionStore {
    credentials: Credentials,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Check credentials and open a fresh session, replacing any previous one.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), LoginError> {
        if !self.credentials.verify(username, password) {
            info!(%username, "login rejected");
            return Err(LoginError::InvalidCredentials);
        }

        let mut sessions = self.sessions.write().await;
        if sessions.insert(username.to_string(), Session::new()).is_some() {
            debug!(%username, "previous session replaced");
        }
        info!(%username, "session opened");
        Ok(())
    }

    pub async fn login(&self, username: &str, password: &str) -> LoginOutcome {
        match self.authenticate(username, password).await {
            Ok(()) => LoginOutcome::success(username),
            Err(e) => LoginOutcome::failure(e),
        }
    }

    /// Drop the session and its history. No-op when absent.
    pub async fn logout(&self, identity: &str) {
        if self.sessions.write().await.remove(identity).is_some() {
            info!(%identity, "session closed");
        }
    }

    pub async fn is_active(&self, identity: &str) -> bool {
        self.sessions.read().await.contains_key(identity)
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Append to the identity's history. Returns false (and stores nothing) when
    /// there is no session.
    pub async fn record_analysis(&self, identity: &str, mut record: AnalysisRecord) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(identity) else {
            debug!(%identity, url = %record.url, "no session, analysis not recorded");
            return false;
        };

        // keep history timestamps non-decreasing even if the wall clock steps back
        if let Some(last) = session.history.last() {
            if record.timestamp < last.timestamp {
                record.timestamp = last.timestamp;
            }
        }
        session.history.push(record);
        true
    }

    /// Snapshot of the identity's history, `None` when not logged in.
    pub async fn get_history(&self, identity: &str) -> Option<Vec<AnalysisRecord>> {
        self.sessions
            .read()
            .await
            .get(identity)
            .map(|s| s.history.clone())
    }
}
