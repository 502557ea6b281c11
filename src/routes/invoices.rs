use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    schemas::{InvoiceIdPath, InvoicesQuery, StatementQuery},
    services::reports::arrears,
    services::statement::{effective_customer_views, effective_invoice_amounts},
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/invoices", axum::routing::get(list_invoices))
        .route("/invoices/overdue", axum::routing::get(list_overdue))
        .route("/invoices/{invoice_id}", axum::routing::get(get_invoice))
}

/// Unified invoice list across all customers, with effective statuses.
async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<InvoicesQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let reference_date = state.reference_date(query.reference_date);
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .map(str::to_lowercase)
        .unwrap_or_default();

    let mut rows: Vec<Value> = Vec::new();
    for customer in &snapshot.customers {
        if query.customer_id.is_some_and(|id| customer.id != id) {
            continue;
        }
        if query.center.is_some_and(|center| customer.center != center) {
            continue;
        }
        for (invoice, status, remaining) in
            effective_customer_views(&snapshot, customer.id, reference_date)
        {
            if query
                .land_id
                .as_deref()
                .is_some_and(|land_id| invoice.land_id != land_id)
            {
                continue;
            }
            if query
                .currency
                .is_some_and(|currency| invoice.currency != currency)
            {
                continue;
            }
            if !search.is_empty()
                && !customer.name.to_lowercase().contains(&search)
                && !invoice.id.to_lowercase().contains(&search)
            {
                continue;
            }
            rows.push(json!({
                "invoice": invoice,
                "customer_name": customer.name,
                "status": status,
                "paid_amount": invoice.original_amount - remaining,
                "remaining_amount": remaining,
            }));
        }
    }
    Ok(Json(json!({ "data": rows, "reference_date": reference_date })))
}

async fn list_overdue(
    State(state): State<AppState>,
    Query(query): Query<StatementQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let reference_date = state.reference_date(query.reference_date);
    Ok(Json(
        json!({ "data": arrears(&snapshot, reference_date), "reference_date": reference_date }),
    ))
}

async fn get_invoice(
    State(state): State<AppState>,
    Path(path): Path<InvoiceIdPath>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let invoice = snapshot
        .find_unified_invoice(&path.invoice_id)
        .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", path.invoice_id)))?;
    let reference_date = state.reference_date(None);
    let (status, paid, remaining) = effective_invoice_amounts(&snapshot, &invoice, reference_date);
    Ok(Json(json!({
        "invoice": invoice,
        "status": status,
        "paid_amount": paid,
        "remaining_amount": remaining,
    })))
}
