//! Read-only reporting over a ledger snapshot: arrears, confirmed revenues,
//! and outstanding financial dues. Pure derivations for the presentation
//! layer; nothing here mutates state.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{Center, Currency, Invoice, Payment, PaymentStatus};
use crate::services::statement::{
    delay_days, effective_customer_views, DisplayStatus,
};
use crate::store::LedgerState;

#[derive(Debug, Clone, Serialize)]
pub struct ArrearsEntry {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer_name: String,
    pub status: DisplayStatus,
    pub remaining_amount: f64,
    pub delay_days: i64,
}

/// Every unified invoice/installment that is late at the reference date,
/// with allocation-aware remaining amounts.
pub fn arrears(snapshot: &LedgerState, reference_date: NaiveDate) -> Vec<ArrearsEntry> {
    let mut entries = Vec::new();
    for customer in &snapshot.customers {
        for (invoice, status, remaining) in
            effective_customer_views(snapshot, customer.id, reference_date)
        {
            if !status.is_late() {
                continue;
            }
            entries.push(ArrearsEntry {
                delay_days: delay_days(invoice.due_date, reference_date),
                invoice,
                customer_name: customer.name.clone(),
                status,
                remaining_amount: remaining,
            });
        }
    }
    entries.sort_by(|a, b| a.invoice.due_date.cmp(&b.invoice.due_date));
    entries
}

#[derive(Debug, Clone, Serialize)]
pub struct DuesEntry {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer_name: String,
    pub status: DisplayStatus,
    pub paid_amount: f64,
    pub remaining_amount: f64,
}

/// All unified invoices that are not yet settled: the financial-dues ledger.
pub fn financial_dues(snapshot: &LedgerState, reference_date: NaiveDate) -> Vec<DuesEntry> {
    let mut entries = Vec::new();
    for customer in &snapshot.customers {
        for (invoice, status, remaining) in
            effective_customer_views(snapshot, customer.id, reference_date)
        {
            if status.is_settled() {
                continue;
            }
            entries.push(DuesEntry {
                paid_amount: invoice.original_amount - remaining,
                invoice,
                customer_name: customer.name.clone(),
                status,
                remaining_amount: remaining,
            });
        }
    }
    entries.sort_by(|a, b| a.invoice.due_date.cmp(&b.invoice.due_date));
    entries
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RevenueTotals {
    pub egp: f64,
    pub usd: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub payments: Vec<Payment>,
    pub totals: RevenueTotals,
    /// Distinct `YYYY-MM` months carrying confirmed revenue, newest first.
    pub available_months: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RevenueFilter {
    /// `YYYY-MM` month key.
    pub month: Option<String>,
    pub center: Option<Center>,
    pub currency: Option<Currency>,
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Confirmed payments, filterable by month, center, and currency.
pub fn revenues(snapshot: &LedgerState, filter: &RevenueFilter) -> RevenueReport {
    let confirmed: Vec<&Payment> = snapshot
        .payments
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Confirmed)
        .collect();

    let mut available_months: Vec<String> = confirmed
        .iter()
        .map(|payment| month_key(payment.payment_date))
        .collect();
    available_months.sort_unstable();
    available_months.dedup();
    available_months.reverse();

    let payments: Vec<Payment> = confirmed
        .into_iter()
        .filter(|payment| {
            let month_match = filter
                .month
                .as_deref()
                .is_none_or(|month| month_key(payment.payment_date) == month);
            let currency_match = filter
                .currency
                .is_none_or(|currency| payment.currency == currency);
            let center_match = filter.center.is_none_or(|center| {
                snapshot
                    .customer(payment.customer_id)
                    .map(|customer| customer.center == center)
                    .unwrap_or(false)
            });
            month_match && currency_match && center_match
        })
        .cloned()
        .collect();

    let mut totals = RevenueTotals::default();
    for payment in &payments {
        match payment.currency {
            Currency::Egp => totals.egp += payment.amount,
            Currency::Usd => totals.usd += payment.amount,
        }
    }

    RevenueReport {
        payments,
        totals,
        available_months,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TopCenter {
    pub center: Center,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopCenterReport {
    pub month: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egp: Option<TopCenter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd: Option<TopCenter>,
}

/// Highest-revenue center for a month, per currency. `None` sides mean no
/// confirmed revenue in that currency for the month.
pub fn top_center(snapshot: &LedgerState, month: &str) -> TopCenterReport {
    let mut by_center: Vec<(Center, RevenueTotals)> = Vec::new();
    for payment in snapshot
        .payments
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Confirmed)
        .filter(|payment| month_key(payment.payment_date) == month)
    {
        let Some(customer) = snapshot.customer(payment.customer_id) else {
            continue;
        };
        let index = match by_center
            .iter()
            .position(|(center, _)| *center == customer.center)
        {
            Some(index) => index,
            None => {
                by_center.push((customer.center, RevenueTotals::default()));
                by_center.len() - 1
            }
        };
        match payment.currency {
            Currency::Egp => by_center[index].1.egp += payment.amount,
            Currency::Usd => by_center[index].1.usd += payment.amount,
        }
    }

    let pick = |amount_of: fn(&RevenueTotals) -> f64| {
        by_center
            .iter()
            .filter(|(_, totals)| amount_of(totals) > 0.0)
            .max_by(|a, b| amount_of(&a.1).total_cmp(&amount_of(&b.1)))
            .map(|(center, totals)| TopCenter {
                center: *center,
                amount: amount_of(totals),
            })
    };

    TopCenterReport {
        month: month.to_string(),
        egp: pick(|totals| totals.egp),
        usd: pick(|totals| totals.usd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed::seed_state;

    fn date(raw: &str) -> NaiveDate {
        raw.parse().unwrap()
    }

    #[test]
    fn arrears_are_empty_before_anything_is_due() {
        let snapshot = seed_state();
        assert!(arrears(&snapshot, date("2024-01-01")).is_empty());
    }

    #[test]
    fn arrears_pick_up_overdue_installments_with_delay_days() {
        let snapshot = seed_state();
        // Customer 3's initiative land (received 2022-05-10) has its first
        // annual installment due 2024-05-10 and no allocatable payments.
        let entries = arrears(&snapshot, date("2024-06-10"));
        assert!(!entries.is_empty());
        let first = &entries[0];
        assert_eq!(first.invoice.land_id, "LND-03A");
        assert_eq!(first.invoice.due_date, date("2024-05-10"));
        assert_eq!(first.status, DisplayStatus::Late);
        assert_eq!(first.remaining_amount, 77_000.0);
        assert_eq!(first.delay_days, 31);
        assert_eq!(first.customer_name, "Horizon Investment Group");
    }

    #[test]
    fn dues_exclude_settled_invoices() {
        let snapshot = seed_state();
        let entries = financial_dues(&snapshot, date("2025-01-01"));
        // INV-005 is fully paid; slots covered by the 100 000 advance are
        // settled as paid-in-advance.
        assert!(entries.iter().all(|entry| entry.invoice.id != "INV-005"));
        assert!(entries
            .iter()
            .all(|entry| !entry.status.is_settled() && entry.remaining_amount > 0.0));
        assert!(entries
            .iter()
            .any(|entry| entry.status == DisplayStatus::PartiallyPaidInAdvance));
    }

    #[test]
    fn revenue_totals_split_by_currency() {
        let snapshot = seed_state();
        let report = revenues(&snapshot, &RevenueFilter::default());
        // All seed payments are confirmed: EGP 20k+100k+10k+15k+25k, USD 500.
        assert_eq!(report.totals.egp, 170_000.0);
        assert_eq!(report.totals.usd, 500.0);
        assert!(report.available_months.contains(&"2024-07".to_string()));

        let july = revenues(
            &snapshot,
            &RevenueFilter {
                month: Some("2024-07".to_string()),
                ..RevenueFilter::default()
            },
        );
        assert_eq!(july.payments.len(), 1);
        assert_eq!(july.totals.egp, 100_000.0);
    }

    #[test]
    fn revenue_center_filter_follows_the_customer() {
        let snapshot = seed_state();
        let dakhla = revenues(
            &snapshot,
            &RevenueFilter {
                center: Some(Center::Dakhla),
                ..RevenueFilter::default()
            },
        );
        assert!(dakhla
            .payments
            .iter()
            .all(|payment| payment.customer_id == 2));
        assert_eq!(dakhla.totals.usd, 500.0);
        assert_eq!(dakhla.totals.egp, 0.0);
    }

    #[test]
    fn top_center_ranks_per_currency() {
        let snapshot = seed_state();
        let report = top_center(&snapshot, "2024-07");
        let egp = report.egp.unwrap();
        assert_eq!(egp.center, Center::Kharga);
        assert_eq!(egp.amount, 100_000.0);
        assert!(report.usd.is_none());

        let empty = top_center(&snapshot, "2020-01");
        assert!(empty.egp.is_none() && empty.usd.is_none());
    }
}
