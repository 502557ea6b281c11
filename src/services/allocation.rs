//! Advance-payment allocation over a forecasted schedule.
//!
//! Installments are processed earliest-due-first; each one first absorbs
//! payments explicitly linked to its synthetic id, then drains the
//! customer's confirmed advance payments in ledger insertion order. The
//! input snapshot is never mutated, so the same snapshot always produces
//! the same output.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Payment;
use crate::services::schedule::{synthetic_invoice_id, RawInstallment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    PaidInAdvance,
    Overdue,
    OverduePartial,
    Upcoming,
    PartiallyPaidInAdvance,
}

/// One payment's share of an installment.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub payment_id: String,
    pub payment_date: NaiveDate,
    pub amount_applied: f64,
}

/// A schedule slot with payments applied.
#[derive(Debug, Clone, Serialize)]
pub struct Installment {
    pub synthetic_id: String,
    pub period: String,
    pub due_date: NaiveDate,
    pub original_amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub status: InstallmentStatus,
    pub contributions: Vec<Contribution>,
}

/// Apply a customer's advance payments to a land's schedule.
///
/// `direct_paid` resolves the amount already paid against a specific
/// synthetic invoice id (payments an operator recorded directly on a slot);
/// it takes precedence over advance allocation. `advances` must be the
/// allocatable advance payments for this land/customer in ledger order —
/// they are read, never modified.
pub fn allocate(
    schedule: &[RawInstallment],
    land_id: &str,
    direct_paid: impl Fn(&str) -> f64,
    advances: &[Payment],
    reference_date: NaiveDate,
) -> Vec<Installment> {
    // Each advance carries a remaining applicable amount, initialized to its
    // full amount and consumed across installments.
    let mut funds: Vec<(&Payment, f64)> = advances
        .iter()
        .map(|payment| (payment, payment.amount))
        .collect();

    schedule
        .iter()
        .map(|slot| {
            let synthetic_id = synthetic_invoice_id(land_id, slot.due_date);
            let mut paid_amount = direct_paid(&synthetic_id);
            let mut remaining_amount = slot.amount - paid_amount;
            let mut contributions = Vec::new();

            if remaining_amount > 0.0 {
                for (payment, fund_remaining) in funds.iter_mut() {
                    if *fund_remaining <= 0.0 {
                        continue;
                    }
                    let applied = fund_remaining.min(remaining_amount);
                    paid_amount += applied;
                    remaining_amount -= applied;
                    *fund_remaining -= applied;
                    contributions.push(Contribution {
                        payment_id: payment.payment_id.clone(),
                        payment_date: payment.payment_date,
                        amount_applied: applied,
                    });
                    if remaining_amount <= 0.0 {
                        break;
                    }
                }
            }

            let status = derive_status(remaining_amount, paid_amount, slot.due_date, reference_date);

            Installment {
                synthetic_id,
                period: slot.period.clone(),
                due_date: slot.due_date,
                original_amount: slot.amount,
                paid_amount,
                remaining_amount,
                status,
                contributions,
            }
        })
        .collect()
}

/// First match wins: covered, then overdue (strictly before the reference
/// date), then upcoming. A slot due exactly on the reference date is not
/// overdue.
fn derive_status(
    remaining: f64,
    paid: f64,
    due_date: NaiveDate,
    reference_date: NaiveDate,
) -> InstallmentStatus {
    if remaining <= 0.0 {
        InstallmentStatus::PaidInAdvance
    } else if due_date < reference_date {
        if paid > 0.0 {
            InstallmentStatus::OverduePartial
        } else {
            InstallmentStatus::Overdue
        }
    } else if paid > 0.0 {
        InstallmentStatus::PartiallyPaidInAdvance
    } else {
        InstallmentStatus::Upcoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, PaymentMethod, PaymentStatus};

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    fn slot(period: &str, amount: f64, due: &str) -> RawInstallment {
        RawInstallment {
            period: period.to_string(),
            amount,
            due_date: date(due),
        }
    }

    fn advance(id: &str, amount: f64, paid_on: &str) -> Payment {
        Payment {
            payment_id: id.to_string(),
            invoice_id: None,
            customer_id: 1,
            land_id: "LND-01A".to_string(),
            payment_date: date(paid_on),
            amount,
            currency: Currency::Egp,
            method: PaymentMethod::Cheque {
                cheque_number: "CHK100548".to_string(),
                due_date: date(paid_on),
            },
            description: "Advance against rent".to_string(),
            document_url: None,
            notes: String::new(),
            status: PaymentStatus::Confirmed,
            auction_id: None,
            temp_insurance_status: None,
        }
    }

    fn no_direct(_: &str) -> f64 {
        0.0
    }

    #[test]
    fn single_advance_carries_forward_fifo() {
        let schedule = vec![
            slot("Year 1 - payment 1", 30_000.0, "2025-06-01"),
            slot("Year 1 - payment 2", 60_000.0, "2025-12-01"),
            slot("Year 1 - payment 3", 60_000.0, "2026-06-01"),
        ];
        let advances = vec![advance("PAY-002", 50_000.0, "2024-07-20")];

        let result = allocate(&schedule, "LND-01A", no_direct, &advances, date("2025-01-01"));

        assert_eq!(result[0].remaining_amount, 0.0);
        assert_eq!(result[0].paid_amount, 30_000.0);
        assert_eq!(result[0].status, InstallmentStatus::PaidInAdvance);

        assert_eq!(result[1].paid_amount, 20_000.0);
        assert_eq!(result[1].remaining_amount, 40_000.0);
        assert_eq!(result[1].status, InstallmentStatus::PartiallyPaidInAdvance);

        assert_eq!(result[2].paid_amount, 0.0);
        assert_eq!(result[2].status, InstallmentStatus::Upcoming);
    }

    #[test]
    fn advances_drain_in_ledger_order_not_by_amount() {
        let schedule = vec![slot("Year 1 - payment 1", 30_000.0, "2025-06-01")];
        let advances = vec![
            advance("PAY-A", 10_000.0, "2024-01-01"),
            advance("PAY-B", 40_000.0, "2024-02-01"),
        ];

        let result = allocate(&schedule, "LND-01A", no_direct, &advances, date("2025-01-01"));
        let ids: Vec<&str> = result[0]
            .contributions
            .iter()
            .map(|c| c.payment_id.as_str())
            .collect();
        assert_eq!(ids, vec!["PAY-A", "PAY-B"]);
        assert_eq!(result[0].contributions[0].amount_applied, 10_000.0);
        assert_eq!(result[0].contributions[1].amount_applied, 20_000.0);
    }

    #[test]
    fn allocation_conserves_payment_amounts() {
        let schedule = vec![
            slot("Year 1 - payment 1", 30_000.0, "2025-06-01"),
            slot("Year 1 - payment 2", 60_000.0, "2025-12-01"),
        ];
        let advances = vec![
            advance("PAY-A", 45_000.0, "2024-01-01"),
            advance("PAY-B", 70_000.0, "2024-02-01"),
        ];
        let total_schedule: f64 = 90_000.0;
        let total_paid: f64 = 115_000.0;

        let result = allocate(&schedule, "LND-01A", no_direct, &advances, date("2025-01-01"));
        let applied: f64 = result
            .iter()
            .flat_map(|inst| &inst.contributions)
            .map(|c| c.amount_applied)
            .sum();
        assert!((applied - total_paid.min(total_schedule)).abs() < 1e-9);
        assert!(result
            .iter()
            .flat_map(|inst| &inst.contributions)
            .all(|c| c.amount_applied > 0.0));
        assert!(result.iter().all(|inst| inst.remaining_amount >= 0.0));
    }

    #[test]
    fn allocation_does_not_mutate_payments_between_calls() {
        let schedule = vec![slot("Year 1 - payment 1", 30_000.0, "2025-06-01")];
        let advances = vec![advance("PAY-A", 50_000.0, "2024-01-01")];

        let first = allocate(&schedule, "LND-01A", no_direct, &advances, date("2025-01-01"));
        let second = allocate(&schedule, "LND-01A", no_direct, &advances, date("2025-01-01"));

        assert_eq!(advances[0].amount, 50_000.0);
        assert_eq!(first[0].paid_amount, second[0].paid_amount);
        assert_eq!(first[0].contributions.len(), second[0].contributions.len());
        assert_eq!(
            first[0].contributions[0].amount_applied,
            second[0].contributions[0].amount_applied
        );
    }

    #[test]
    fn due_date_equal_to_reference_date_is_not_overdue() {
        let schedule = vec![
            slot("Annual installment - year 1", 5_000.0, "2025-01-01"),
            slot("Annual installment - year 2", 5_100.0, "2024-12-31"),
        ];
        let result = allocate(&schedule, "LND-02A", no_direct, &[], date("2025-01-01"));
        assert_eq!(result[0].status, InstallmentStatus::Upcoming);
        assert_eq!(result[1].status, InstallmentStatus::Overdue);
    }

    #[test]
    fn overdue_partial_when_some_paid_before_reference_date() {
        let schedule = vec![slot("Year 1 - payment 1", 30_000.0, "2025-06-01")];
        let advances = vec![advance("PAY-A", 10_000.0, "2024-01-01")];
        let result = allocate(&schedule, "LND-01A", no_direct, &advances, date("2025-07-01"));
        assert_eq!(result[0].status, InstallmentStatus::OverduePartial);
        assert_eq!(result[0].remaining_amount, 20_000.0);
    }

    #[test]
    fn direct_payments_take_precedence_over_advances() {
        let schedule = vec![
            slot("Year 1 - payment 1", 30_000.0, "2025-06-01"),
            slot("Year 1 - payment 2", 60_000.0, "2025-12-01"),
        ];
        let advances = vec![advance("PAY-A", 10_000.0, "2024-01-01")];
        let direct = |id: &str| {
            if id == "AUTO-LND-01A-2025-06-01" {
                30_000.0
            } else {
                0.0
            }
        };

        let result = allocate(&schedule, "LND-01A", direct, &advances, date("2025-01-01"));

        // Slot one is covered directly; the advance stays available for the
        // next slot.
        assert_eq!(result[0].status, InstallmentStatus::PaidInAdvance);
        assert!(result[0].contributions.is_empty());
        assert_eq!(result[1].paid_amount, 10_000.0);
        assert_eq!(result[1].contributions.len(), 1);
    }

    #[test]
    fn empty_ledger_yields_fully_unpaid_schedule() {
        let schedule = vec![
            slot("Annual installment - year 1", 5_000.0, "2026-01-01"),
            slot("Annual installment - year 2", 5_100.0, "2027-01-01"),
        ];
        let result = allocate(&schedule, "LND-02A", no_direct, &[], date("2025-01-01"));
        assert!(result.iter().all(|inst| inst.paid_amount == 0.0));
        assert!(result
            .iter()
            .all(|inst| inst.status == InstallmentStatus::Upcoming));
        assert!(allocate(&[], "LND-02A", no_direct, &[], date("2025-01-01")).is_empty());
    }
}
