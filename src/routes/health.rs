use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.store.snapshot().await;
    Json(json!({
        "status": "ok",
        "now": Utc::now().to_rfc3339(),
        "reference_date": state.config.today().to_string(),
        "customers": snapshot.customers.len(),
        "payments": snapshot.payments.len(),
    }))
}
