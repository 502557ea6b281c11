use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::{error::AppResult, state::AppState, store::seed::seed_state};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/demo/reset", axum::routing::post(reset_demo_data))
}

/// Restore the ledger to its seeded demo state. Handy for local
/// front-end work against a known dataset.
async fn reset_demo_data(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.store.reset(seed_state()).await;
    tracing::info!("demo data reset");
    Ok(Json(json!({ "data": { "status": "reset" } })))
}
