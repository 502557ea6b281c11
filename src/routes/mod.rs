use axum::{routing::get, Router};

use crate::state::AppState;

pub mod customers;
pub mod demo;
pub mod health;
pub mod insurance;
pub mod invoices;
pub mod lands;
pub mod payments;
pub mod reports;
pub mod warnings;

pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(customers::router())
        .merge(lands::router())
        .merge(invoices::router())
        .merge(payments::router())
        .merge(insurance::router())
        .merge(warnings::router())
        .merge(reports::router())
        .merge(demo::router())
}
