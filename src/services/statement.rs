//! Unified invoice/installment view and per-land statements.
//!
//! Persisted invoices and forecasted installments share one display model.
//! A persisted invoice's status reflects the confirmation workflow; a
//! forecasted installment's effective status and remaining amount come from
//! the allocation result. Everything here reads a ledger snapshot and
//! computes eagerly; nothing is cached or stored.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Invoice, InvoiceStatus, Land, PaymentStatus, TempInsuranceStatus};
use crate::error::{AppError, AppResult};
use crate::services::allocation::{allocate, Installment, InstallmentStatus};
use crate::services::schedule::generate_schedule;
use crate::store::LedgerState;

/// Display status shared by persisted invoices and forecasted installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Paid,
    PaidInAdvance,
    Archived,
    UnderReview,
    Late,
    LatePartial,
    Partial,
    PartiallyPaidInAdvance,
    Upcoming,
}

impl DisplayStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Paid | Self::PaidInAdvance | Self::Archived)
    }

    pub fn is_late(self) -> bool {
        matches!(self, Self::Late | Self::LatePartial)
    }
}

impl From<InstallmentStatus> for DisplayStatus {
    fn from(status: InstallmentStatus) -> Self {
        match status {
            InstallmentStatus::PaidInAdvance => Self::PaidInAdvance,
            InstallmentStatus::Overdue => Self::Late,
            InstallmentStatus::OverduePartial => Self::LatePartial,
            InstallmentStatus::Upcoming => Self::Upcoming,
            InstallmentStatus::PartiallyPaidInAdvance => Self::PartiallyPaidInAdvance,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementTotals {
    pub total_due: f64,
    pub total_paid: f64,
    pub total_remaining: f64,
}

/// The engine's primary output: a land's full installment view plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct LandStatement {
    pub land: Land,
    pub reference_date: NaiveDate,
    pub installments: Vec<Installment>,
    pub totals: StatementTotals,
}

/// Compute the statement for one leased land.
///
/// The schedule is forecast from the land's lease parameters, direct
/// payments (linked to synthetic slot ids) are applied first, then the
/// customer's confirmed advances in ledger order. Missing customers or
/// lands are the only failure modes; an empty ledger just yields a fully
/// unpaid schedule.
pub fn land_statement(
    snapshot: &LedgerState,
    customer_id: u32,
    land_id: &str,
    reference_date: NaiveDate,
) -> AppResult<LandStatement> {
    let land = snapshot
        .land(customer_id, land_id)
        .ok_or_else(|| {
            AppError::NotFound(format!("Land {land_id} not found for customer {customer_id}"))
        })?
        .clone();

    let schedule = generate_schedule(&land);
    let advances = snapshot.advance_payments(customer_id, land_id);
    let installments = allocate(
        &schedule,
        land_id,
        |synthetic_id| snapshot.paid_amount_for_invoice(synthetic_id),
        &advances,
        reference_date,
    );

    let land_invoices: Vec<Invoice> = snapshot
        .unified_invoices()
        .into_iter()
        .filter(|invoice| invoice.customer_id == customer_id && invoice.land_id == land_id)
        .collect();

    let by_synthetic_id: HashMap<&str, &Installment> = installments
        .iter()
        .map(|installment| (installment.synthetic_id.as_str(), installment))
        .collect();

    let total_due = land_invoices
        .iter()
        .map(|invoice| invoice.original_amount)
        .sum();
    // Confirmed money received on the land, excluding returned deposits.
    let total_paid = snapshot
        .payments
        .iter()
        .filter(|payment| {
            payment.land_id == land_id
                && payment.status == PaymentStatus::Confirmed
                && payment.temp_insurance_status != Some(TempInsuranceStatus::Returned)
        })
        .map(|payment| payment.amount)
        .sum();
    let total_remaining = land_invoices
        .iter()
        .filter_map(|invoice| {
            let (status, remaining) =
                effective_view(snapshot, invoice, &by_synthetic_id, reference_date);
            (!status.is_settled()).then_some(remaining)
        })
        .sum();

    Ok(LandStatement {
        land,
        reference_date,
        installments,
        totals: StatementTotals {
            total_due,
            total_paid,
            total_remaining,
        },
    })
}

/// Display status for a persisted invoice, derived from paid amounts and the
/// confirmation workflow.
pub fn invoice_display_status(
    snapshot: &LedgerState,
    invoice: &Invoice,
    reference_date: NaiveDate,
) -> DisplayStatus {
    let paid = snapshot.paid_amount_for_invoice(&invoice.id);
    if paid >= invoice.original_amount {
        return DisplayStatus::Paid;
    }
    match invoice.status {
        InvoiceStatus::Reviewed => DisplayStatus::Archived,
        InvoiceStatus::AwaitingConfirmation => DisplayStatus::UnderReview,
        _ if invoice.due_date < reference_date => {
            if paid > 0.0 {
                DisplayStatus::LatePartial
            } else {
                DisplayStatus::Late
            }
        }
        _ if paid > 0.0 => DisplayStatus::Partial,
        _ => DisplayStatus::Upcoming,
    }
}

/// Effective status and remaining amount for any unified invoice. Forecasted
/// installments defer to the allocation result; persisted invoices use the
/// workflow-aware display status and direct payments only.
pub fn effective_view(
    snapshot: &LedgerState,
    invoice: &Invoice,
    allocated: &HashMap<&str, &Installment>,
    reference_date: NaiveDate,
) -> (DisplayStatus, f64) {
    if let Some(installment) = allocated.get(invoice.id.as_str()) {
        return (installment.status.into(), installment.remaining_amount);
    }
    let status = invoice_display_status(snapshot, invoice, reference_date);
    let remaining = invoice.original_amount - snapshot.paid_amount_for_invoice(&invoice.id);
    (status, remaining)
}

/// Effective status/remaining across all of a customer's unified invoices,
/// allocation-aware for every leased land.
pub fn effective_customer_views(
    snapshot: &LedgerState,
    customer_id: u32,
    reference_date: NaiveDate,
) -> Vec<(Invoice, DisplayStatus, f64)> {
    let mut allocated: Vec<Installment> = Vec::new();
    if let Some(profile) = snapshot.profile(customer_id) {
        for land in &profile.lands {
            let schedule = generate_schedule(land);
            let advances = snapshot.advance_payments(customer_id, &land.land_id);
            allocated.extend(allocate(
                &schedule,
                &land.land_id,
                |synthetic_id| snapshot.paid_amount_for_invoice(synthetic_id),
                &advances,
                reference_date,
            ));
        }
    }
    let by_synthetic_id: HashMap<&str, &Installment> = allocated
        .iter()
        .map(|installment| (installment.synthetic_id.as_str(), installment))
        .collect();

    snapshot
        .unified_invoices()
        .into_iter()
        .filter(|invoice| invoice.customer_id == customer_id)
        .map(|invoice| {
            let (status, remaining) =
                effective_view(snapshot, &invoice, &by_synthetic_id, reference_date);
            (invoice, status, remaining)
        })
        .collect()
}

/// Status, paid amount, and remaining amount for a single unified invoice.
/// Forecasted installments take all three from the allocation result, so a
/// slot covered by an advance reports the allocated amount as paid even
/// though no payment targets its synthetic id directly.
pub fn effective_invoice_amounts(
    snapshot: &LedgerState,
    invoice: &Invoice,
    reference_date: NaiveDate,
) -> (DisplayStatus, f64, f64) {
    if invoice.is_synthetic() {
        return effective_customer_views(snapshot, invoice.customer_id, reference_date)
            .into_iter()
            .find(|(candidate, _, _)| candidate.id == invoice.id)
            .map(|(candidate, status, remaining)| {
                (status, candidate.original_amount - remaining, remaining)
            })
            .unwrap_or((DisplayStatus::Upcoming, 0.0, invoice.original_amount));
    }
    let paid = snapshot.paid_amount_for_invoice(&invoice.id);
    let status = invoice_display_status(snapshot, invoice, reference_date);
    (status, paid, invoice.original_amount - paid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStanding {
    Regular,
    PartialDefault,
    FullDefault,
}

/// A customer is regular unless some installment or invoice is late; a
/// defaulter who has paid anything at all counts as partial.
pub fn customer_standing(
    snapshot: &LedgerState,
    customer_id: u32,
    reference_date: NaiveDate,
) -> CustomerStanding {
    let has_late = effective_customer_views(snapshot, customer_id, reference_date)
        .iter()
        .any(|(_, status, _)| status.is_late());
    if !has_late {
        return CustomerStanding::Regular;
    }
    let has_paid = snapshot
        .payments
        .iter()
        .any(|payment| payment.customer_id == customer_id);
    if has_paid {
        CustomerStanding::PartialDefault
    } else {
        CustomerStanding::FullDefault
    }
}

/// Whole days of delay between a due date and a settlement date; zero when
/// settled on time.
pub fn delay_days(due_date: NaiveDate, settled_on: NaiveDate) -> i64 {
    (settled_on - due_date).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::seed_state;

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    #[test]
    fn statement_matches_reference_scenario() {
        // Customer 1, LND-01A: public auction, received 2023-03-01, base
        // rent 150 000, one confirmed 100 000 advance (PAY-002).
        let snapshot = seed_state();
        let statement = land_statement(&snapshot, 1, "LND-01A", date("2025-01-01")).unwrap();

        assert_eq!(statement.installments.len(), 51);
        let first = &statement.installments[0];
        assert_eq!(first.due_date, date("2025-06-01"));
        assert_eq!(first.original_amount, 30_000.0);
        assert_eq!(first.remaining_amount, 0.0);
        assert_eq!(first.status, InstallmentStatus::PaidInAdvance);

        let second = &statement.installments[1];
        assert_eq!(second.paid_amount, 60_000.0);
        assert_eq!(second.status, InstallmentStatus::PaidInAdvance);

        let third = &statement.installments[2];
        assert_eq!(third.paid_amount, 10_000.0);
        assert_eq!(third.remaining_amount, 50_000.0);
        assert_eq!(third.status, InstallmentStatus::PartiallyPaidInAdvance);
    }

    #[test]
    fn statement_is_idempotent_across_reads() {
        let snapshot = seed_state();
        let first = land_statement(&snapshot, 1, "LND-01A", date("2025-01-01")).unwrap();
        let second = land_statement(&snapshot, 1, "LND-01A", date("2025-01-01")).unwrap();
        assert_eq!(first.totals.total_remaining, second.totals.total_remaining);
        for (a, b) in first.installments.iter().zip(&second.installments) {
            assert_eq!(a.paid_amount, b.paid_amount);
            assert_eq!(a.status, b.status);
        }
    }

    #[test]
    fn unknown_land_is_a_not_found() {
        let snapshot = seed_state();
        assert!(land_statement(&snapshot, 1, "LND-404", date("2025-01-01")).is_err());
        assert!(land_statement(&snapshot, 9, "LND-01A", date("2025-01-01")).is_err());
    }

    #[test]
    fn fully_paid_persisted_invoice_displays_paid() {
        let snapshot = seed_state();
        let invoice = snapshot.find_unified_invoice("INV-005").unwrap();
        assert_eq!(
            invoice_display_status(&snapshot, &invoice, date("2025-01-01")),
            DisplayStatus::Paid
        );
    }

    #[test]
    fn late_statuses_depend_on_partial_payment() {
        let mut snapshot = seed_state();
        snapshot.invoices.push(Invoice {
            id: "INV-010".to_string(),
            customer_id: 1,
            land_id: "LND-01A".to_string(),
            description: "Road works levy".to_string(),
            due_date: date("2024-01-01"),
            original_amount: 10_000.0,
            currency: crate::domain::Currency::Egp,
            reminder_log: Vec::new(),
            status: InvoiceStatus::Pending,
        });
        let invoice = snapshot.find_unified_invoice("INV-010").unwrap();
        assert_eq!(
            invoice_display_status(&snapshot, &invoice, date("2025-01-01")),
            DisplayStatus::Late
        );
        // Due today is not late.
        assert_eq!(
            invoice_display_status(&snapshot, &invoice, date("2024-01-01")),
            DisplayStatus::Upcoming
        );
    }

    #[test]
    fn customer_standing_reflects_overdue_installments() {
        let snapshot = seed_state();
        // At 2025-01-01 nothing on LND-01A is due yet and the advance covers
        // upcoming slots.
        assert_eq!(
            customer_standing(&snapshot, 1, date("2025-01-01")),
            CustomerStanding::Regular
        );
        // Far in the future the advance is exhausted and installments are
        // overdue; customer 1 has payments, so partial default.
        assert_eq!(
            customer_standing(&snapshot, 1, date("2030-01-01")),
            CustomerStanding::PartialDefault
        );
        // Customer 3's only ledger entry is the returned deposit PAY-005,
        // which still counts as "has paid something".
        assert_eq!(
            customer_standing(&snapshot, 3, date("2030-01-01")),
            CustomerStanding::PartialDefault
        );
        // With no payments at all the same arrears mean full default.
        let mut bare = seed_state();
        bare.payments.retain(|payment| payment.customer_id != 3);
        assert_eq!(
            customer_standing(&bare, 3, date("2030-01-01")),
            CustomerStanding::FullDefault
        );
    }

    #[test]
    fn advance_covered_installment_reports_allocated_paid_amount() {
        let snapshot = seed_state();
        let invoice = snapshot
            .find_unified_invoice("AUTO-LND-01A-2025-06-01")
            .unwrap();
        // No payment targets the synthetic id directly; coverage comes from
        // the 100 000 advance (PAY-002).
        assert_eq!(snapshot.paid_amount_for_invoice(&invoice.id), 0.0);

        let (status, paid, remaining) =
            effective_invoice_amounts(&snapshot, &invoice, date("2025-01-01"));
        assert_eq!(status, DisplayStatus::PaidInAdvance);
        assert_eq!(paid, 30_000.0);
        assert_eq!(remaining, 0.0);

        // Persisted invoices keep workflow-derived amounts.
        let persisted = snapshot.find_unified_invoice("INV-005").unwrap();
        let (status, paid, remaining) =
            effective_invoice_amounts(&snapshot, &persisted, date("2025-01-01"));
        assert_eq!(status, DisplayStatus::Paid);
        assert_eq!(paid, 20_000.0);
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn delay_days_clamps_on_time_settlement() {
        assert_eq!(delay_days(date("2024-01-01"), date("2024-01-01")), 0);
        assert_eq!(delay_days(date("2024-01-01"), date("2023-12-31")), 0);
        assert_eq!(delay_days(date("2024-01-01"), date("2024-01-11")), 10);
    }
}
