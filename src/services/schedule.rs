//! Installment schedule generation.
//!
//! Given a land's lease parameters this module forecasts the full 25-year
//! rent schedule. Generation is pure: for a fixed land the output depends on
//! nothing else, and repeated invocation yields the identical sequence.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::domain::{round_cents, Invoice, InvoiceStatus, Land, Mechanism};

/// Lease term in years, common to every mechanism.
pub const LEASE_YEARS: u32 = 25;
/// Annual rent escalation factor applied from year 2 onward.
pub const ESCALATION_FACTOR: f64 = 1.02;

/// One forecasted rent obligation, before any payments are applied.
#[derive(Debug, Clone, Serialize)]
pub struct RawInstallment {
    pub period: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}

/// Deterministic identifier for a forecasted installment. Stable across
/// recomputations so direct payments can target a schedule slot.
pub fn synthetic_invoice_id(land_id: &str, due_date: NaiveDate) -> String {
    format!("AUTO-{land_id}-{due_date}")
}

/// Forecast the full installment schedule for a land.
///
/// `public-auction` leases get a 27-month grace period, a 20/40/40 split in
/// year 1, then semi-annual 50/50 payments with 2% annual escalation
/// (51 installments). `direct-order` and `initiative` leases get a 24-month
/// grace period and one annual payment per year, escalating from year 2
/// (25 installments).
pub fn generate_schedule(land: &Land) -> Vec<RawInstallment> {
    match land.mechanism {
        Mechanism::PublicAuction => auction_schedule(land),
        Mechanism::DirectOrder | Mechanism::Initiative => annual_schedule(land),
    }
}

fn auction_schedule(land: &Land) -> Vec<RawInstallment> {
    let grace_end = add_months(land.receive_date, 27);
    let mut installments = Vec::with_capacity(3 + (LEASE_YEARS as usize - 1) * 2);
    let mut annual_amount = land.base_rent;

    // Year 1: three payments six months apart, weighted 20/40/40.
    installments.push(raw("Year 1 - payment 1", annual_amount * 0.20, grace_end));
    installments.push(raw(
        "Year 1 - payment 2",
        annual_amount * 0.40,
        add_months(grace_end, 6),
    ));
    installments.push(raw(
        "Year 1 - payment 3",
        annual_amount * 0.40,
        add_months(grace_end, 12),
    ));

    // Years 2..=25: the annual amount compounds before each year's first
    // payment, then splits 50/50 across two semi-annual slots.
    let mut months_from_grace = 12;
    for year in 2..=LEASE_YEARS {
        annual_amount *= ESCALATION_FACTOR;
        months_from_grace += 6;
        installments.push(raw(
            &format!("Year {year} - payment 1"),
            annual_amount * 0.50,
            add_months(grace_end, months_from_grace),
        ));
        months_from_grace += 6;
        installments.push(raw(
            &format!("Year {year} - payment 2"),
            annual_amount * 0.50,
            add_months(grace_end, months_from_grace),
        ));
    }

    installments
}

fn annual_schedule(land: &Land) -> Vec<RawInstallment> {
    let grace_end = add_months(land.receive_date, 24);
    let mut installments = Vec::with_capacity(LEASE_YEARS as usize);
    let mut annual_amount = land.base_rent;

    for year in 1..=LEASE_YEARS {
        if year > 1 {
            annual_amount *= ESCALATION_FACTOR;
        }
        installments.push(raw(
            &format!("Annual installment - year {year}"),
            annual_amount,
            add_months(grace_end, (year - 1) * 12),
        ));
    }

    installments
}

fn raw(period: &str, amount: f64, due_date: NaiveDate) -> RawInstallment {
    RawInstallment {
        period: period.to_string(),
        amount,
        due_date,
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    // Out of range only past year 262142; fall back to the input rather
    // than panic.
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Materialize a land's forecast as display invoices, skipping any slot the
/// ledger already carries as a persisted invoice for the same customer,
/// land, and period. Keeps recomputation idempotent: a forecast slot that an
/// operator explicitly invoiced is never duplicated.
pub fn forecast_invoices(land: &Land, customer_id: u32, existing: &[Invoice]) -> Vec<Invoice> {
    generate_schedule(land)
        .into_iter()
        .filter(|slot| {
            !existing.iter().any(|invoice| {
                invoice.customer_id == customer_id
                    && invoice.land_id == land.land_id
                    && invoice.description == slot.period
            })
        })
        .map(|slot| Invoice {
            id: synthetic_invoice_id(&land.land_id, slot.due_date),
            customer_id,
            land_id: land.land_id.clone(),
            description: slot.period,
            due_date: slot.due_date,
            original_amount: round_cents(slot.amount),
            currency: land.currency,
            reminder_log: Vec::new(),
            status: InvoiceStatus::Pending,
        })
        .collect()
}
