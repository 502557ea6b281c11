use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    schemas::{CustomerIdPath, CustomersQuery, InvoicesQuery, StatementQuery, UpdateNotesInput},
    services::statement::{customer_standing, effective_customer_views},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/customers", axum::routing::get(list_customers))
        .route("/customers/{customer_id}", axum::routing::get(get_customer))
        .route(
            "/customers/{customer_id}/profile",
            axum::routing::get(get_profile),
        )
        .route(
            "/customers/{customer_id}/notes",
            axum::routing::patch(update_notes),
        )
        .route(
            "/customers/{customer_id}/invoices",
            axum::routing::get(list_customer_invoices),
        )
        .route(
            "/customers/{customer_id}/payments",
            axum::routing::get(list_customer_payments),
        )
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomersQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let reference_date = state.reference_date(None);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .map(str::to_lowercase)
        .unwrap_or_default();

    let customers: Vec<Value> = snapshot
        .customers
        .iter()
        .filter(|customer| {
            query
                .mechanism
                .is_none_or(|mechanism| customer.mechanism == mechanism)
                && query.currency.is_none_or(|currency| customer.currency == currency)
                && query.center.is_none_or(|center| customer.center == center)
                && (search.is_empty() || customer.name.to_lowercase().contains(&search))
        })
        .map(|customer| {
            let standing = customer_standing(&snapshot, customer.id, reference_date);
            (customer, standing)
        })
        .filter(|(_, standing)| query.standing.is_none_or(|wanted| *standing == wanted))
        .map(|(customer, standing)| {
            let land_count = snapshot
                .profile(customer.id)
                .map(|profile| profile.lands.len())
                .unwrap_or(0);
            json!({
                "customer": customer,
                "standing": standing,
                "land_count": land_count,
            })
        })
        .collect();

    Ok(Json(json!({ "data": customers })))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(path): Path<CustomerIdPath>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let customer = snapshot
        .customer(path.customer_id)
        .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", path.customer_id)))?;
    let standing = customer_standing(&snapshot, customer.id, state.reference_date(None));
    Ok(Json(json!({ "customer": customer, "standing": standing })))
}

async fn get_profile(
    State(state): State<AppState>,
    Path(path): Path<CustomerIdPath>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let profile = snapshot
        .profile(path.customer_id)
        .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", path.customer_id)))?;
    Ok(Json(json!({ "data": profile })))
}

async fn update_notes(
    State(state): State<AppState>,
    Path(path): Path<CustomerIdPath>,
    Json(payload): Json<UpdateNotesInput>,
) -> AppResult<Json<Value>> {
    state
        .store
        .update_customer_notes(path.customer_id, payload.notes)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Unified invoice view for one customer: persisted invoices plus the
/// forecasted installments for every leased land, each with its effective
/// (allocation-aware) status and remaining amount.
async fn list_customer_invoices(
    State(state): State<AppState>,
    Path(path): Path<CustomerIdPath>,
    Query(query): Query<StatementQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    if snapshot.customer(path.customer_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Customer {} not found",
            path.customer_id
        )));
    }
    let reference_date = state.reference_date(query.reference_date);
    let rows: Vec<Value> =
        effective_customer_views(&snapshot, path.customer_id, reference_date)
            .into_iter()
            .map(|(invoice, status, remaining)| {
                let paid = invoice.original_amount - remaining;
                json!({
                    "invoice": invoice,
                    "status": status,
                    "paid_amount": paid,
                    "remaining_amount": remaining,
                })
            })
            .collect();
    Ok(Json(json!({ "data": rows, "reference_date": reference_date })))
}

async fn list_customer_payments(
    State(state): State<AppState>,
    Path(path): Path<CustomerIdPath>,
    Query(query): Query<InvoicesQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    if snapshot.customer(path.customer_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Customer {} not found",
            path.customer_id
        )));
    }
    let payments: Vec<&crate::domain::Payment> = snapshot
        .payments
        .iter()
        .filter(|payment| payment.customer_id == path.customer_id)
        .filter(|payment| {
            query
                .land_id
                .as_deref()
                .is_none_or(|land_id| payment.land_id == land_id)
        })
        .collect();
    Ok(Json(json!({ "data": payments })))
}
