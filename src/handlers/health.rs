use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{db, AppState};

/// GET /health — liveness plus a database ping.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_ok = db::check_connection(&state.db).await.is_ok();
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
