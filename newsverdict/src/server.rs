use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};

use common::ServerConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};

use crate::analysis::{AnalysisResult, Analyzer};
use crate::history::format_history;

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self {
            started_at: Utc::now(),
            analyzer,
        }
    }
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    active_sessions: usize,
    trusted_sources: Vec<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    message: String,
    session_active: bool,
    identity: Option<String>,
    token: Option<String>,
}

#[derive(Deserialize)]
struct LogoutRequest {
    token: String,
}

/// The login message is cleared on logout, so `message` is empty on success.
#[derive(Serialize)]
struct LogoutResponse {
    message: String,
    session_active: bool,
}

/// `token` is optional: without it the article is analyzed but nothing is recorded.
#[derive(Deserialize)]
struct AnalyzeRequest {
    url: String,
    token: Option<String>,
}

/// JWT claims we encode (subject = username)
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

fn jwt_secret() -> String {
    std::env::var("NEWSVERDICT_JWT_SECRET").unwrap_or_else(|_| "dev-secret".into())
}

/// Create a signed JWT for a username. Expires after 24h.
fn create_jwt_for_user(username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize;
    let claims = Claims {
        sub: username.to_string(),
        exp: now + (24 * 3600),
    };
    encode(
        &JwtHeader::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
}

/// Username carried by a valid token.
fn identity_from_token(token: &str) -> Option<String> {
    let secret = jwt_secret();
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::warn!("failed to decode token: {}", e);
            None
        }
    }
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        active_sessions: state.analyzer.store().active_sessions().await,
        trusted_sources: state.analyzer.sources().domains().to_vec(),
    })
}

/// Login endpoint: check credentials, open a session and return a JWT.
#[post("/api/v1/login", data = "<body>")]
async fn login(state: &State<AppState>, body: Json<LoginRequest>) -> Custom<Json<LoginResponse>> {
    let outcome = state
        .analyzer
        .store()
        .login(&body.username, &body.password)
        .await;

    if !outcome.session_active {
        return Custom(
            Status::Unauthorized,
            Json(LoginResponse {
                message: outcome.message,
                session_active: false,
                identity: None,
                token: None,
            }),
        );
    }

    let token = match create_jwt_for_user(&body.username) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("failed to create jwt: {}", e);
            state.analyzer.store().logout(&body.username).await;
            return Custom(
                Status::InternalServerError,
                Json(LoginResponse {
                    message: "failed to issue token".to_string(),
                    session_active: false,
                    identity: None,
                    token: None,
                }),
            );
        }
    };

    Custom(
        Status::Ok,
        Json(LoginResponse {
            message: outcome.message,
            session_active: true,
            identity: outcome.identity,
            token: Some(token),
        }),
    )
}

#[post("/api/v1/logout", data = "<body>")]
async fn logout(state: &State<AppState>, body: Json<LogoutRequest>) -> Custom<Json<LogoutResponse>> {
    match identity_from_token(&body.token) {
        Some(identity) => {
            state.analyzer.store().logout(&identity).await;
            Custom(
                Status::Ok,
                Json(LogoutResponse {
                    message: String::new(),
                    session_active: false,
                }),
            )
        }
        None => Custom(
            Status::Unauthorized,
            Json(LogoutResponse {
                message: "invalid session token".to_string(),
                session_active: false,
            }),
        ),
    }
}

#[post("/api/v1/analyze", data = "<body>")]
async fn analyze(state: &State<AppState>, body: Json<AnalyzeRequest>) -> Json<AnalysisResult> {
    let identity = body
        .token
        .as_deref()
        .and_then(identity_from_token)
        .unwrap_or_default();

    tracing::info!(url = %body.url, identity = %identity, "analyze requested");
    Json(state.analyzer.analyze(&body.url, &identity).await)
}

/// Plain-text history; unknown or invalid tokens read as an unknown user.
#[get("/api/v1/history?<token>")]
async fn get_history(state: &State<AppState>, token: Option<&str>) -> String {
    let identity = token.and_then(identity_from_token).unwrap_or_default();
    format_history(state.analyzer.store(), &identity).await
}

/// Build the Rocket instance with managed state and all routes mounted.
pub fn build_rocket(state: AppState, server: Option<&ServerConfig>) -> Rocket<Build> {
    let mut fig = rocket::Config::figment();
    if let Some(server) = server {
        if let Some(bind) = &server.bind {
            fig = fig.merge(("address", bind.clone()));
        }
        if let Some(port) = server.port {
            fig = fig.merge(("port", port));
        }
    }

    rocket::custom(fig).manage(state).mount(
        "/",
        routes![health, status, login, logout, analyze, get_history],
    )
}

/// Build and launch the Rocket server.
///
/// Blocks until Rocket shuts down (SIGINT/SIGTERM) and returns an error if Rocket fails to start.
pub async fn launch_rocket(state: AppState, server: Option<&ServerConfig>) -> Result<()> {
    tracing::info!("Starting Rocket HTTP server");
    build_rocket(state, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
