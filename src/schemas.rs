use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::{Center, Currency, Mechanism, PaymentMethod, PaymentStatus};
use crate::error::AppError;
use crate::services::statement::CustomerStanding;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerIdPath {
    pub customer_id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerLandPath {
    pub customer_id: u32,
    pub land_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceIdPath {
    pub invoice_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIdPath {
    pub payment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomersQuery {
    pub mechanism: Option<Mechanism>,
    pub currency: Option<Currency>,
    pub center: Option<Center>,
    pub standing: Option<CustomerStanding>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementQuery {
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoicesQuery {
    pub customer_id: Option<u32>,
    pub land_id: Option<String>,
    pub currency: Option<Currency>,
    pub center: Option<Center>,
    pub search: Option<String>,
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsQuery {
    pub customer_id: Option<u32>,
    pub land_id: Option<String>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TempInsuranceQuery {
    pub status: Option<crate::domain::TempInsuranceStatus>,
    pub auction_id: Option<String>,
    /// Filter on the year of the auction session date.
    pub auction_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RevenuesQuery {
    /// `YYYY-MM` month key.
    pub month: Option<String>,
    pub center: Option<Center>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopCenterQuery {
    pub month: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoicePaymentInput {
    #[validate(length(min = 1))]
    pub invoice_id: String,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    #[serde(flatten)]
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdvancePaymentInput {
    pub customer_id: u32,
    #[validate(length(min = 1))]
    pub land_id: String,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    pub currency: Currency,
    #[serde(flatten)]
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePaymentInput {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: Option<f64>,
    pub payment_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RejectPaymentInput {
    #[validate(length(min = 1))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNotesInput {
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWarningTemplateInput {
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWarningInput {
    #[validate(length(min = 1))]
    pub delivery_methods: Vec<String>,
    pub deadline: NaiveDate,
    #[validate(length(min = 1))]
    pub content: String,
}
