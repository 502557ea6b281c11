use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    schemas::{CustomerIdPath, CustomerLandPath, StatementQuery},
    services::statement::land_statement,
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/customers/{customer_id}/lands",
            axum::routing::get(list_customer_lands),
        )
        .route(
            "/customers/{customer_id}/lands/{land_id}/statement",
            axum::routing::get(get_land_statement),
        )
        .route("/auction-lands", axum::routing::get(list_auction_lands))
}

async fn list_customer_lands(
    State(state): State<AppState>,
    Path(path): Path<CustomerIdPath>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let profile = snapshot
        .profile(path.customer_id)
        .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", path.customer_id)))?;
    Ok(Json(json!({ "data": profile.lands })))
}

/// The engine's primary read surface: the full forecasted schedule for one
/// land with advance payments allocated, plus land-level totals.
async fn get_land_statement(
    State(state): State<AppState>,
    Path(path): Path<CustomerLandPath>,
    Query(query): Query<StatementQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let reference_date = state.reference_date(query.reference_date);
    let statement = land_statement(&snapshot, path.customer_id, &path.land_id, reference_date)?;
    Ok(Json(json!({ "data": statement })))
}

async fn list_auction_lands(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(json!({ "data": snapshot.auction_lands })))
}
