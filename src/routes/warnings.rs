use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    schemas::{
        validate_input, CreateWarningInput, HistoryQuery, InvoiceIdPath,
        UpdateWarningTemplateInput,
    },
    state::AppState,
};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/warning-template",
            axum::routing::get(get_template).put(update_template),
        )
        .route(
            "/invoices/{invoice_id}/reminders",
            axum::routing::post(add_reminder),
        )
        .route(
            "/invoices/{invoice_id}/warnings",
            axum::routing::post(add_warning),
        )
        .route("/history", axum::routing::get(list_history))
}

async fn get_template(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    Ok(Json(json!({ "data": snapshot.warning_template })))
}

async fn update_template(
    State(state): State<AppState>,
    Json(payload): Json<UpdateWarningTemplateInput>,
) -> AppResult<Json<Value>> {
    validate_input(&payload)?;
    let template = state.store.update_warning_template(payload.content).await?;
    Ok(Json(json!({ "data": template })))
}

async fn add_reminder(
    State(state): State<AppState>,
    Path(path): Path<InvoiceIdPath>,
) -> AppResult<impl IntoResponse> {
    let entry = state
        .store
        .add_reminder(&path.invoice_id, &state.config.default_operator)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": entry }))))
}

async fn add_warning(
    State(state): State<AppState>,
    Path(path): Path<InvoiceIdPath>,
    Json(payload): Json<CreateWarningInput>,
) -> AppResult<impl IntoResponse> {
    validate_input(&payload)?;
    let entry = state
        .store
        .add_warning(
            &path.invoice_id,
            &state.config.default_operator,
            payload.delivery_methods,
            payload.deadline,
            payload.content,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": entry }))))
}

async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Value>> {
    let snapshot = state.store.snapshot().await;
    let entries: Vec<&crate::domain::HistoryLogEntry> = snapshot
        .history_log
        .iter()
        .filter(|entry| {
            query
                .invoice_id
                .as_deref()
                .is_none_or(|invoice_id| entry.invoice_id == invoice_id)
        })
        .collect();
    Ok(Json(json!({ "data": entries })))
}
