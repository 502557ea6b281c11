use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    schemas::{
        validate_input, CreateAdvancePaymentInput, CreateInvoicePaymentInput, PaymentIdPath,
        PaymentsQuery, RejectPaymentInput, UpdatePaymentInput,
    },
    state::AppState,
    store::{PaymentPatch, RecordAdvancePayment, RecordInvoicePayment},
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/payments",
            axum::routing::get(list_payments).post(create_invoice_payment),
        )
        .route(
            "/payments/advance",
            axum::routing::post(create_advance_payment),
        )
        .route(
            "/payments/{payment_id}",
            axum::routing::get(get_payment).patch(update_payment),
        )
        .route(
            "/payments/{payment_id}/confirm",
            axum::routing::post(confirm_payment),
        )
        .route(
            "/payments/{payment_id}/reject",
            axum::routing::post(reject_payment),
        )
}

async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentsQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let payments: Vec<&crate::domain::Payment> = snapshot
        .payments
        .iter()
        .filter(|payment| {
            query
                .customer_id
                .is_none_or(|id| payment.customer_id == id)
                && query
                    .land_id
                    .as_deref()
                    .is_none_or(|land_id| payment.land_id == land_id)
                && query.status.is_none_or(|status| payment.status == status)
        })
        .collect();
    Ok(Json(json!({ "data": payments })))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentIdPath>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let payment = snapshot.payment(&path.payment_id).ok_or_else(|| {
        crate::error::AppError::NotFound(format!("Payment {} not found", path.payment_id))
    })?;
    Ok(Json(json!({ "data": payment })))
}

async fn create_invoice_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoicePaymentInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let payment = state
        .store
        .record_invoice_payment(RecordInvoicePayment {
            invoice_id: payload.invoice_id,
            amount: payload.amount,
            method: payload.method,
            payment_date: payload.payment_date,
            notes: payload.notes,
            document_url: payload.document_url,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": payment }))))
}

async fn create_advance_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreateAdvancePaymentInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let payment = state
        .store
        .record_advance_payment(RecordAdvancePayment {
            customer_id: payload.customer_id,
            land_id: payload.land_id,
            amount: payload.amount,
            currency: payload.currency,
            method: payload.method,
            payment_date: payload.payment_date,
            description: payload.description,
            notes: payload.notes,
            document_url: payload.document_url,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": payment }))))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentIdPath>,
) -> AppResult<Json<Value>> {
    let payment = state.store.confirm_payment(&path.payment_id).await?;
    Ok(Json(json!({ "data": payment })))
}

async fn reject_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentIdPath>,
    Json(payload): Json<RejectPaymentInput>,
) -> AppResult<Json<Value>> {
    validate_input(&payload)?;
    let payment = state
        .store
        .reject_payment(&path.payment_id, &payload.reason)
        .await?;
    Ok(Json(json!({ "data": payment })))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentIdPath>,
    Json(payload): Json<UpdatePaymentInput>,
) -> AppResult<Json<Value>> {
    validate_input(&payload)?;
    let payment = state
        .store
        .update_payment(
            &path.payment_id,
            PaymentPatch {
                amount: payload.amount,
                payment_date: payload.payment_date,
                method: payload.method,
                notes: payload.notes,
                document_url: payload.document_url,
            },
        )
        .await?;
    Ok(Json(json!({ "data": payment })))
}
