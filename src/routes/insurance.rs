use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Datelike;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    schemas::{PaymentIdPath, TempInsuranceQuery},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/temp-insurances", axum::routing::get(list_temp_insurances))
        .route(
            "/temp-insurances/{payment_id}/return",
            axum::routing::post(return_insurance),
        )
        .route(
            "/temp-insurances/{payment_id}/award",
            axum::routing::post(award_insurance),
        )
}

/// Auction deposits, joined with auction-pool land data where the land has
/// not been awarded yet.
async fn list_temp_insurances(
    State(state): State<AppState>,
    Query(query): Query<TempInsuranceQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let rows: Vec<Value> = snapshot
        .temp_insurances()
        .into_iter()
        .filter(|payment| {
            query
                .status
                .is_none_or(|status| payment.temp_insurance_status == Some(status))
                && query
                    .auction_id
                    .as_deref()
                    .is_none_or(|auction_id| payment.auction_id.as_deref() == Some(auction_id))
        })
        .filter_map(|payment| {
            let auction_land = payment.auction_id.as_deref().and_then(|auction_id| {
                snapshot
                    .auction_lands
                    .iter()
                    .find(|land| land.auction_id.as_deref() == Some(auction_id))
            });
            if let Some(year) = query.auction_year {
                let session_year = auction_land
                    .and_then(|land| land.auction_session_date)
                    .map(|date| date.year());
                if session_year != Some(year) {
                    return None;
                }
            }
            let customer_name = snapshot
                .customer(payment.customer_id)
                .map(|customer| customer.name.clone())
                .unwrap_or_default();
            Some(json!({
                "payment": payment,
                "customer_name": customer_name,
                "auction_land": auction_land,
            }))
        })
        .collect();
    Ok(Json(json!({ "data": rows })))
}

async fn return_insurance(
    State(state): State<AppState>,
    Path(path): Path<PaymentIdPath>,
) -> AppResult<Json<Value>> {
    let payment = state.store.return_insurance(&path.payment_id).await?;
    Ok(Json(json!({ "data": payment })))
}

/// Award the auctioned land to the depositor. The deposit becomes rent
/// credit and starts participating in advance-payment allocation.
async fn award_insurance(
    State(state): State<AppState>,
    Path(path): Path<PaymentIdPath>,
) -> AppResult<Json<Value>> {
    let payment = state.store.award_insurance(&path.payment_id).await?;
    Ok(Json(json!({ "data": payment })))
}
