//! Informational HTTP endpoints.
//!
//! `GET /health` and `GET /stats` report counts read from the matchmaker in a
//! single locked snapshot. They never mutate anything.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use vidimeet_matchmaker::{ClientSender, SharedMatchmaker};

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub waiting_users: usize,
    pub active_rooms: usize,
    /// RFC 3339 time the response was produced
    pub timestamp: String,
}

/// Body of `GET /stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: usize,
    pub waiting_users: usize,
    pub active_rooms: usize,
    /// Connections currently paired in a session
    pub active_connections: usize,
}

/// Routes for the status endpoints, bound to one matchmaker.
pub fn router<S>(matchmaker: SharedMatchmaker<S>) -> Router
where
    S: ClientSender + Send + 'static,
{
    Router::new()
        .route("/health", get(health::<S>))
        .route("/stats", get(stats::<S>))
        .with_state(matchmaker)
}

async fn health<S>(State(matchmaker): State<SharedMatchmaker<S>>) -> Json<HealthResponse>
where
    S: ClientSender + Send + 'static,
{
    let status = matchmaker.status();
    Json(HealthResponse {
        status: "OK",
        waiting_users: status.waiting,
        active_rooms: status.active_sessions,
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn stats<S>(State(matchmaker): State<SharedMatchmaker<S>>) -> Json<StatsResponse>
where
    S: ClientSender + Send + 'static,
{
    let stats = matchmaker.stats();
    Json(StatsResponse {
        total_users: stats.total_connections,
        waiting_users: stats.waiting,
        active_rooms: stats.active_sessions,
        active_connections: stats.paired_connections,
    })
}
