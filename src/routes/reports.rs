use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    schemas::{RevenuesQuery, StatementQuery, TopCenterQuery},
    services::reports::{arrears, financial_dues, revenues, top_center, RevenueFilter},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/reports/arrears", axum::routing::get(arrears_report))
        .route("/reports/revenues", axum::routing::get(revenues_report))
        .route(
            "/reports/revenues/top-center",
            axum::routing::get(top_center_report),
        )
        .route(
            "/reports/financial-dues",
            axum::routing::get(financial_dues_report),
        )
}

async fn arrears_report(
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let reference_date = state.reference_date(query.reference_date);
    Ok(Json(
        json!({ "data": arrears(&snapshot, reference_date), "reference_date": reference_date }),
    ))
}

async fn revenues_report(
    State(state): State<AppState>,
    Query(query): Query<RevenuesQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let report = revenues(
        &snapshot,
        &RevenueFilter {
            month: query.month,
            center: query.center,
            currency: query.currency,
        },
    );
    Ok(Json(json!({ "data": report })))
}

async fn top_center_report(
    State(state): State<AppState>,
    Query(query): Query<TopCenterQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(json!({ "data": top_center(&snapshot, &query.month) })))
}

async fn financial_dues_report(
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let reference_date = state.reference_date(query.reference_date);
    Ok(Json(json!({
        "data": financial_dues(&snapshot, reference_date),
        "reference_date": reference_date,
    })))
}
