//! In-process data store.
//!
//! The authority's back office runs against an in-memory ledger: a customer
//! and land registry, an append-only payment ledger with a confirmation
//! workflow, persisted invoices, and the warning/reminder history. There is
//! deliberately no database behind it — persistence is an external
//! collaborator's concern.
//!
//! Reads go through [`Store::snapshot`], which clones the full state, so
//! every computation (schedule forecasts, allocation) works on an immutable
//! snapshot and stays repeatable under concurrent mutation.

pub mod seed;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    new_history_id, new_payment_id, round_cents, Customer, CustomerProfile, HistoryKind,
    HistoryLogEntry, Invoice, InvoiceStatus, Land, Payment, PaymentMethod, PaymentStatus,
    Reminder, TempInsuranceStatus, WarningTemplate,
};
use crate::error::{AppError, AppResult};
use crate::services::schedule::forecast_invoices;

/// Full ledger state. Cloning it produces the immutable snapshot every
/// computation runs against.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub customers: Vec<Customer>,
    pub profiles: BTreeMap<u32, CustomerProfile>,
    /// Lands still in the auction pool, awaiting award.
    pub auction_lands: Vec<Land>,
    /// Persisted invoices only; forecasted installments are derived.
    pub invoices: Vec<Invoice>,
    /// Append-only, insertion order preserved. Allocation depends on it.
    pub payments: Vec<Payment>,
    pub history_log: Vec<HistoryLogEntry>,
    pub warning_template: WarningTemplate,
}

impl LedgerState {
    pub fn customer(&self, id: u32) -> Option<&Customer> {
        self.customers.iter().find(|customer| customer.id == id)
    }

    pub fn profile(&self, customer_id: u32) -> Option<&CustomerProfile> {
        self.profiles.get(&customer_id)
    }

    pub fn land(&self, customer_id: u32, land_id: &str) -> Option<&Land> {
        self.profiles
            .get(&customer_id)
            .and_then(|profile| profile.lands.iter().find(|land| land.land_id == land_id))
    }

    pub fn payment(&self, payment_id: &str) -> Option<&Payment> {
        self.payments
            .iter()
            .find(|payment| payment.payment_id == payment_id)
    }

    /// Persisted invoices plus the forecasted installments for every leased
    /// land, deduplicated against the persisted set.
    pub fn unified_invoices(&self) -> Vec<Invoice> {
        let mut all = self.invoices.clone();
        for customer in &self.customers {
            if let Some(profile) = self.profiles.get(&customer.id) {
                for land in &profile.lands {
                    all.extend(forecast_invoices(land, customer.id, &self.invoices));
                }
            }
        }
        all
    }

    pub fn find_unified_invoice(&self, invoice_id: &str) -> Option<Invoice> {
        self.unified_invoices()
            .into_iter()
            .find(|invoice| invoice.id == invoice_id)
    }

    /// Amount paid against a specific invoice id. Rejected payments do not
    /// count; pending-review ones do, matching the confirmation workflow.
    pub fn paid_amount_for_invoice(&self, invoice_id: &str) -> f64 {
        self.payments
            .iter()
            .filter(|payment| {
                payment.invoice_id.as_deref() == Some(invoice_id)
                    && payment.status != PaymentStatus::Rejected
            })
            .map(|payment| payment.amount)
            .sum()
    }

    /// Allocatable advance payments for a land/customer, in ledger order.
    pub fn advance_payments(&self, customer_id: u32, land_id: &str) -> Vec<Payment> {
        self.payments
            .iter()
            .filter(|payment| {
                payment.customer_id == customer_id
                    && payment.land_id == land_id
                    && payment.is_allocatable_advance()
            })
            .cloned()
            .collect()
    }

    pub fn temp_insurances(&self) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|payment| payment.is_temp_insurance())
            .collect()
    }
}

/// Shared handle to the ledger. Cheap to clone into handlers.
#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<LedgerState>>,
}

/// Fields accepted when recording a payment against an invoice.
#[derive(Debug, Clone)]
pub struct RecordInvoicePayment {
    pub invoice_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    pub notes: String,
    pub document_url: Option<String>,
}

/// Fields accepted when recording an advance (non-invoice-linked) payment.
#[derive(Debug, Clone)]
pub struct RecordAdvancePayment {
    pub customer_id: u32,
    pub land_id: String,
    pub amount: f64,
    pub currency: crate::domain::Currency,
    pub method: PaymentMethod,
    pub payment_date: NaiveDate,
    pub description: String,
    pub notes: String,
    pub document_url: Option<String>,
}

/// Partial payment edit. Amount changes on confirmed payments are refused.
#[derive(Debug, Clone, Default)]
pub struct PaymentPatch {
    pub amount: Option<f64>,
    pub payment_date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub document_url: Option<String>,
}

impl Store {
    pub fn new(state: LedgerState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn empty() -> Self {
        Self::new(LedgerState {
            customers: Vec::new(),
            profiles: BTreeMap::new(),
            auction_lands: Vec::new(),
            invoices: Vec::new(),
            payments: Vec::new(),
            history_log: Vec::new(),
            warning_template: WarningTemplate {
                content: String::new(),
            },
        })
    }

    /// Immutable snapshot of the current ledger.
    pub async fn snapshot(&self) -> LedgerState {
        self.inner.read().await.clone()
    }

    pub async fn reset(&self, state: LedgerState) {
        *self.inner.write().await = state;
    }

    /// Record a payment against an invoice (persisted or forecasted). The
    /// payment enters the ledger as `pending_review`; a persisted invoice
    /// that is not yet fully covered moves to `awaiting_confirmation`.
    /// Forecasted installments are never mutated.
    pub async fn record_invoice_payment(
        &self,
        input: RecordInvoicePayment,
    ) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        let invoice = state
            .find_unified_invoice(&input.invoice_id)
            .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", input.invoice_id)))?;

        let payment = Payment {
            payment_id: new_payment_id(),
            invoice_id: Some(invoice.id.clone()),
            customer_id: invoice.customer_id,
            land_id: invoice.land_id.clone(),
            payment_date: input.payment_date,
            amount: round_cents(input.amount),
            currency: invoice.currency,
            method: input.method,
            description: format!("Payment against invoice {}", invoice.id),
            document_url: input.document_url,
            notes: input.notes,
            status: PaymentStatus::PendingReview,
            auction_id: None,
            temp_insurance_status: None,
        };
        state.payments.push(payment.clone());

        if !invoice.is_synthetic() {
            let total_paid = state.paid_amount_for_invoice(&invoice.id);
            if let Some(target) = state
                .invoices
                .iter_mut()
                .find(|candidate| candidate.id == invoice.id)
            {
                if total_paid < target.original_amount {
                    target.status = InvoiceStatus::AwaitingConfirmation;
                }
            }
        }

        tracing::info!(
            payment_id = %payment.payment_id,
            invoice_id = %invoice.id,
            amount = payment.amount,
            "Invoice payment recorded"
        );
        Ok(payment)
    }

    pub async fn record_advance_payment(
        &self,
        input: RecordAdvancePayment,
    ) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        if state.customer(input.customer_id).is_none() {
            return Err(AppError::NotFound(format!(
                "Customer {} not found",
                input.customer_id
            )));
        }

        let payment = Payment {
            payment_id: new_payment_id(),
            invoice_id: None,
            customer_id: input.customer_id,
            land_id: input.land_id,
            payment_date: input.payment_date,
            amount: round_cents(input.amount),
            currency: input.currency,
            method: input.method,
            description: input.description,
            document_url: input.document_url,
            notes: input.notes,
            status: PaymentStatus::PendingReview,
            auction_id: None,
            temp_insurance_status: None,
        };
        state.payments.push(payment.clone());

        tracing::info!(
            payment_id = %payment.payment_id,
            customer_id = payment.customer_id,
            amount = payment.amount,
            "Advance payment recorded"
        );
        Ok(payment)
    }

    /// Confirm a pending payment. A linked persisted invoice becomes
    /// `reviewed` (archived) when fully covered, otherwise returns to
    /// `pending`.
    pub async fn confirm_payment(&self, payment_id: &str) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        let position = position_of(&state, payment_id)?;
        state.payments[position].status = PaymentStatus::Confirmed;
        let payment = state.payments[position].clone();

        if let Some(invoice_id) = payment
            .invoice_id
            .as_deref()
            .filter(|id| !id.starts_with("AUTO-"))
        {
            let total_paid = state.paid_amount_for_invoice(invoice_id);
            let invoice_id = invoice_id.to_string();
            if let Some(invoice) = state
                .invoices
                .iter_mut()
                .find(|candidate| candidate.id == invoice_id)
            {
                invoice.status = if total_paid >= invoice.original_amount {
                    InvoiceStatus::Reviewed
                } else {
                    InvoiceStatus::Pending
                };
            }
        }

        tracing::info!(payment_id = %payment.payment_id, "Payment confirmed");
        Ok(payment)
    }

    /// Reject a payment with a reason. A linked persisted invoice reverts to
    /// `pending`.
    pub async fn reject_payment(&self, payment_id: &str, reason: &str) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        let position = position_of(&state, payment_id)?;
        {
            let payment = &mut state.payments[position];
            payment.status = PaymentStatus::Rejected;
            payment.notes = format!("Rejected: {reason}\n{}", payment.notes);
        }
        let payment = state.payments[position].clone();

        if let Some(invoice_id) = payment
            .invoice_id
            .as_deref()
            .filter(|id| !id.starts_with("AUTO-"))
        {
            let invoice_id = invoice_id.to_string();
            if let Some(invoice) = state
                .invoices
                .iter_mut()
                .find(|candidate| candidate.id == invoice_id)
            {
                invoice.status = InvoiceStatus::Pending;
            }
        }

        tracing::info!(payment_id = %payment.payment_id, reason, "Payment rejected");
        Ok(payment)
    }

    pub async fn update_payment(
        &self,
        payment_id: &str,
        patch: PaymentPatch,
    ) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        let position = position_of(&state, payment_id)?;
        let payment = &mut state.payments[position];

        if let Some(amount) = patch.amount {
            // Confirmed amounts are immutable.
            if payment.status == PaymentStatus::Confirmed && amount != payment.amount {
                return Err(AppError::Conflict(format!(
                    "Payment {payment_id} is confirmed; its amount can no longer change"
                )));
            }
            payment.amount = round_cents(amount);
        }
        if let Some(payment_date) = patch.payment_date {
            payment.payment_date = payment_date;
        }
        if let Some(method) = patch.method {
            payment.method = method;
        }
        if let Some(notes) = patch.notes {
            payment.notes = notes;
        }
        if let Some(document_url) = patch.document_url {
            payment.document_url = Some(document_url);
        }

        Ok(payment.clone())
    }

    /// Append a reminder to a persisted invoice and the history log.
    pub async fn add_reminder(&self, invoice_id: &str, user: &str) -> AppResult<HistoryLogEntry> {
        if invoice_id.starts_with("AUTO-") {
            return Err(AppError::Conflict(
                "Forecasted installments cannot carry reminders".to_string(),
            ));
        }

        let mut state = self.inner.write().await;
        let now = Utc::now();
        let invoice = state
            .invoices
            .iter_mut()
            .find(|candidate| candidate.id == invoice_id)
            .ok_or_else(|| AppError::NotFound(format!("Invoice {invoice_id} not found")))?;
        invoice.reminder_log.push(Reminder {
            user: user.to_string(),
            date: now,
        });

        let entry = HistoryLogEntry {
            id: new_history_id(),
            invoice_id: invoice_id.to_string(),
            user: user.to_string(),
            timestamp: now,
            kind: HistoryKind::Reminder,
        };
        state.history_log.push(entry.clone());
        Ok(entry)
    }

    pub async fn add_warning(
        &self,
        invoice_id: &str,
        user: &str,
        delivery_methods: Vec<String>,
        deadline: NaiveDate,
        content: String,
    ) -> AppResult<HistoryLogEntry> {
        let mut state = self.inner.write().await;
        let entry = HistoryLogEntry {
            id: new_history_id(),
            invoice_id: invoice_id.to_string(),
            user: user.to_string(),
            timestamp: Utc::now(),
            kind: HistoryKind::Warning {
                delivery_methods,
                deadline,
                content,
            },
        };
        state.history_log.push(entry.clone());
        tracing::info!(invoice_id, user, "Warning notice issued");
        Ok(entry)
    }

    pub async fn update_customer_notes(&self, customer_id: u32, notes: String) -> AppResult<()> {
        let mut state = self.inner.write().await;
        let profile = state
            .profiles
            .get_mut(&customer_id)
            .ok_or_else(|| AppError::NotFound(format!("Customer {customer_id} not found")))?;
        profile.notes = notes;
        Ok(())
    }

    pub async fn update_warning_template(&self, content: String) -> AppResult<WarningTemplate> {
        let mut state = self.inner.write().await;
        state.warning_template.content = content;
        Ok(state.warning_template.clone())
    }

    /// Mark an auction deposit as returned (auction lost or withdrawn). A
    /// returned deposit is never allocatable as rent credit.
    pub async fn return_insurance(&self, payment_id: &str) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        let position = position_of(&state, payment_id)?;
        let payment = &mut state.payments[position];
        if payment.auction_id.is_none() {
            return Err(AppError::Conflict(format!(
                "Payment {payment_id} is not an auction deposit"
            )));
        }
        payment.temp_insurance_status = Some(TempInsuranceStatus::Returned);
        Ok(payment.clone())
    }

    /// Award the auctioned land to the depositor: the land moves from the
    /// auction pool to the customer's leased lands and the deposit becomes
    /// rent credit (allocatable by the engine).
    pub async fn award_insurance(&self, payment_id: &str) -> AppResult<Payment> {
        let mut state = self.inner.write().await;
        let position = position_of(&state, payment_id)?;
        let auction_id = state.payments[position]
            .auction_id
            .clone()
            .ok_or_else(|| {
                AppError::Conflict(format!("Payment {payment_id} is not an auction deposit"))
            })?;
        let customer_id = state.payments[position].customer_id;

        let land_position = state
            .auction_lands
            .iter()
            .position(|land| land.auction_id.as_deref() == Some(auction_id.as_str()))
            .ok_or_else(|| {
                AppError::NotFound(format!("No land in the auction pool for auction {auction_id}"))
            })?;
        let land = state.auction_lands.remove(land_position);

        let profile = state
            .profiles
            .get_mut(&customer_id)
            .ok_or_else(|| AppError::NotFound(format!("Customer {customer_id} not found")))?;
        profile.lands.push(land.clone());

        state.payments[position].temp_insurance_status = Some(TempInsuranceStatus::Awarded);
        let payment = state.payments[position].clone();

        tracing::info!(
            payment_id = %payment.payment_id,
            land_id = %land.land_id,
            customer_id,
            auction_id = %auction_id,
            "Auction land awarded"
        );
        Ok(payment)
    }
}

fn position_of(state: &LedgerState, payment_id: &str) -> AppResult<usize> {
    state
        .payments
        .iter()
        .position(|payment| payment.payment_id == payment_id)
        .ok_or_else(|| AppError::NotFound(format!("Payment {payment_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;
    use crate::store::seed::seed_state;

    fn cash(treasury: &str) -> PaymentMethod {
        PaymentMethod::Cash {
            treasury: treasury.to_string(),
            recipient: "desk".to_string(),
        }
    }

    #[tokio::test]
    async fn confirmation_archives_a_fully_covered_invoice() {
        let store = Store::new(seed_state());

        // INV-005 (initial deposit, 20 000) is already covered by PAY-001 in
        // the seed; record and confirm a payment on a fresh invoice instead.
        let snapshot = store.snapshot().await;
        let invoice = snapshot
            .invoices
            .iter()
            .find(|invoice| invoice.id == "INV-005")
            .unwrap()
            .clone();
        assert_eq!(
            snapshot.paid_amount_for_invoice(&invoice.id),
            invoice.original_amount
        );

        let payment = store
            .record_invoice_payment(RecordInvoicePayment {
                invoice_id: invoice.id.clone(),
                amount: 1.0,
                method: cash("T-01"),
                payment_date: "2024-08-01".parse().unwrap(),
                notes: String::new(),
                document_url: None,
            })
            .await
            .unwrap();
        let confirmed = store.confirm_payment(&payment.payment_id).await.unwrap();
        assert_eq!(confirmed.status, PaymentStatus::Confirmed);

        let snapshot = store.snapshot().await;
        let invoice = snapshot.find_unified_invoice("INV-005").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Reviewed);
    }

    #[tokio::test]
    async fn partial_payment_moves_invoice_to_awaiting_then_back_to_pending() {
        let store = Store::new(seed_state());
        let payment = store
            .record_invoice_payment(RecordInvoicePayment {
                invoice_id: "AUTO-LND-01A-2025-06-01".to_string(),
                amount: 5_000.0,
                method: cash("T-01"),
                payment_date: "2024-08-01".parse().unwrap(),
                notes: String::new(),
                document_url: None,
            })
            .await
            .unwrap();
        // Synthetic target: the invoice list itself is untouched.
        assert_eq!(payment.invoice_id.as_deref(), Some("AUTO-LND-01A-2025-06-01"));
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.invoices.len(), seed_state().invoices.len());

        let rejected = store
            .reject_payment(&payment.payment_id, "No matching bank record")
            .await
            .unwrap();
        assert_eq!(rejected.status, PaymentStatus::Rejected);
        assert!(rejected.notes.starts_with("Rejected: No matching bank record"));

        // Rejected payments stop counting toward the invoice.
        let snapshot = store.snapshot().await;
        assert_eq!(
            snapshot.paid_amount_for_invoice("AUTO-LND-01A-2025-06-01"),
            0.0
        );
    }

    #[tokio::test]
    async fn confirmed_payment_amount_is_immutable() {
        let store = Store::new(seed_state());
        let err = store
            .update_payment(
                "PAY-001",
                PaymentPatch {
                    amount: Some(25_000.0),
                    ..PaymentPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Notes stay editable.
        let updated = store
            .update_payment(
                "PAY-001",
                PaymentPatch {
                    notes: Some("verified against bank statement".to_string()),
                    ..PaymentPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes, "verified against bank statement");
    }

    #[tokio::test]
    async fn award_moves_land_and_converts_deposit_to_credit() {
        let store = Store::new(seed_state());

        // PAY-003 is customer 2's booked deposit for auction A-101.
        {
            let snapshot = store.snapshot().await;
            assert!(snapshot
                .payment("PAY-003")
                .unwrap()
                .temp_insurance_status
                == Some(TempInsuranceStatus::Booked));
            assert!(!snapshot.payment("PAY-003").unwrap().is_allocatable_advance());
        }

        let awarded = store.award_insurance("PAY-003").await.unwrap();
        assert_eq!(
            awarded.temp_insurance_status,
            Some(TempInsuranceStatus::Awarded)
        );

        let snapshot = store.snapshot().await;
        assert!(snapshot
            .auction_lands
            .iter()
            .all(|land| land.auction_id.as_deref() != Some("A-101")));
        assert!(snapshot
            .profile(2)
            .unwrap()
            .lands
            .iter()
            .any(|land| land.auction_id.as_deref() == Some("A-101")));
        assert!(snapshot.payment("PAY-003").unwrap().is_allocatable_advance());
    }

    #[tokio::test]
    async fn returned_deposit_is_not_rent_credit() {
        let store = Store::new(seed_state());
        let returned = store.return_insurance("PAY-006").await.unwrap();
        assert_eq!(
            returned.temp_insurance_status,
            Some(TempInsuranceStatus::Returned)
        );
        let snapshot = store.snapshot().await;
        assert!(!snapshot.payment("PAY-006").unwrap().is_allocatable_advance());
    }

    #[tokio::test]
    async fn reminders_are_refused_on_forecasted_installments() {
        let store = Store::new(seed_state());
        let err = store
            .add_reminder("AUTO-LND-01A-2025-06-01", "fund-operations")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let entry = store
            .add_reminder("INV-005", "fund-operations")
            .await
            .unwrap();
        assert!(matches!(entry.kind, HistoryKind::Reminder));
        let snapshot = store.snapshot().await;
        assert_eq!(
            snapshot
                .invoices
                .iter()
                .find(|invoice| invoice.id == "INV-005")
                .unwrap()
                .reminder_log
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn advance_payment_requires_known_customer() {
        let store = Store::new(seed_state());
        let err = store
            .record_advance_payment(RecordAdvancePayment {
                customer_id: 99,
                land_id: "LND-01A".to_string(),
                amount: 1_000.0,
                currency: Currency::Egp,
                method: cash("T-01"),
                payment_date: "2024-08-01".parse().unwrap(),
                description: "Advance".to_string(),
                notes: String::new(),
                document_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
