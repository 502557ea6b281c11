use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lease-acquisition method. Determines the amortization formula used when
/// forecasting rent installments for a land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mechanism {
    PublicAuction,
    DirectOrder,
    Initiative,
}

impl Mechanism {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PublicAuction => "public-auction",
            Self::DirectOrder => "direct-order",
            Self::Initiative => "initiative",
        }
    }
}

impl FromStr for Mechanism {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "public-auction" => Ok(Self::PublicAuction),
            "direct-order" => Ok(Self::DirectOrder),
            "initiative" => Ok(Self::Initiative),
            other => Err(AppError::UnprocessableEntity(format!(
                "Invalid lease mechanism: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "EGP")]
    Egp,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Egp => "EGP",
            Self::Usd => "USD",
        }
    }
}

/// Administrative centers the authority operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Center {
    Kharga,
    Dakhla,
    Farafra,
    Paris,
    Balat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorType {
    Company,
    Individual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: u32,
    pub name: String,
    pub investor_type: InvestorType,
    pub mechanism: Mechanism,
    pub currency: Currency,
    pub center: Center,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPerson {
    pub name: String,
    pub phone: String,
}

/// Investor-type-specific registration data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "investor_type", rename_all = "snake_case")]
pub enum InvestorProfile {
    Company {
        file_number: Option<String>,
        company_nationality: Option<String>,
        partners_nationality: Option<String>,
        address: Option<String>,
        email: Option<String>,
        company_phone: Option<String>,
        commercial_reg_num: Option<String>,
        commercial_reg_expiry: Option<NaiveDate>,
        tax_card_num: Option<String>,
        tax_card_expiry: Option<NaiveDate>,
        issuing_authority: Option<String>,
        company_activity: Option<String>,
        chairman: Option<ContactPerson>,
        partners: Vec<ContactPerson>,
    },
    Individual {
        national_id: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        mailing_address: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub profile: InvestorProfile,
    pub notes: String,
    pub lands: Vec<Land>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandFinancials {
    pub feddan_value: f64,
    pub feddan_rental_value: f64,
    pub insurance: f64,
}

/// A leased (or auctionable) land parcel. Immutable once created; it only
/// changes hands via the auction award operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Land {
    pub land_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<String>,
    pub mechanism: Mechanism,
    pub receive_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_session_date: Option<NaiveDate>,
    pub area_feddan: f64,
    pub location: String,
    pub currency: Currency,
    pub base_rent: f64,
    pub financials: LandFinancials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    AwaitingConfirmation,
    Paid,
    Reviewed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub user: String,
    pub date: DateTime<Utc>,
}

/// A persisted invoice (explicitly created obligations such as initial
/// deposits). Forecasted installments share this shape in the unified view
/// but are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: u32,
    pub land_id: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub original_amount: f64,
    pub currency: Currency,
    pub reminder_log: Vec<Reminder>,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Forecasted installments carry a deterministic `AUTO-` id and never
    /// enter the confirmation workflow.
    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with("AUTO-")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    PendingReview,
    Confirmed,
    Rejected,
}

/// Method-specific payment details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer {
        bank_name: String,
        transfer_id: String,
    },
    Cheque {
        cheque_number: String,
        due_date: NaiveDate,
    },
    Cash {
        treasury: String,
        recipient: String,
    },
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BankTransfer { .. } => "bank_transfer",
            Self::Cheque { .. } => "cheque",
            Self::Cash { .. } => "cash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempInsuranceStatus {
    Booked,
    Awarded,
    Returned,
}

/// One ledger entry. `invoice_id = None` marks an advance payment that the
/// allocation engine may consume against forecasted installments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: String,
    pub invoice_id: Option<String>,
    pub customer_id: u32,
    pub land_id: String,
    pub payment_date: NaiveDate,
    pub amount: f64,
    pub currency: Currency,
    #[serde(flatten)]
    pub method: PaymentMethod,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    pub notes: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_insurance_status: Option<TempInsuranceStatus>,
}

impl Payment {
    /// Whether this payment counts as an auction deposit record.
    pub fn is_temp_insurance(&self) -> bool {
        self.auction_id.is_some() && self.temp_insurance_status.is_some()
    }

    /// Advance payments are allocatable once confirmed, unlinked, and (for
    /// auction deposits) converted to rent credit by an award.
    pub fn is_allocatable_advance(&self) -> bool {
        self.status == PaymentStatus::Confirmed
            && self.invoice_id.is_none()
            && matches!(
                self.temp_insurance_status,
                None | Some(TempInsuranceStatus::Awarded)
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryKind {
    Reminder,
    Warning {
        delivery_methods: Vec<String>,
        deadline: NaiveDate,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLogEntry {
    pub id: String,
    pub invoice_id: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: HistoryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningTemplate {
    pub content: String,
}

/// Round to two decimal places when materializing an amount on a persisted
/// record. Schedule views keep raw floating-point amounts.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn new_payment_id() -> String {
    format!("PAY-{}", short_uuid())
}

pub fn new_history_id() -> String {
    format!("LOG-{}", short_uuid())
}

fn short_uuid() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}
