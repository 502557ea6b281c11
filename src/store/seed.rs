//! Deterministic demo dataset mirroring the authority's reference records.
//! Loaded at startup when `SEED_DEMO_DATA` is enabled and by the demo reset
//! endpoint.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{
    Center, ContactPerson, Currency, Customer, CustomerProfile, InvestorProfile, InvestorType,
    Invoice, InvoiceStatus, Land, LandFinancials, Mechanism, Payment, PaymentMethod,
    PaymentStatus, TempInsuranceStatus, WarningTemplate,
};
use crate::store::LedgerState;

const WARNING_TEMPLATE: &str = "\
To: [client_name]\n\
Address: [client_address]\n\n\
Formal notice of outstanding dues\n\n\
Regarding the land allocated to you, area [area] feddan in [center] center: \
our records show outstanding dues of [amount_overdue] against your account.\n\n\
You are hereby notified that:\n\
- The state dues of [amount_overdue] must be settled.\n\
- Failure to settle or reschedule before [deadline] will trigger legal \
proceedings and repossession of the land.\n\
- Criminal reports for encroachment on state land and non-payment of dues \
will additionally be filed.\n";

fn date(raw: &str) -> NaiveDate {
    raw.parse().expect("valid seed date")
}

pub fn seed_state() -> LedgerState {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        1,
        CustomerProfile {
            profile: InvestorProfile::Company {
                file_number: Some("C-2023-101".to_string()),
                company_nationality: Some("Egyptian".to_string()),
                partners_nationality: Some("Egyptian".to_string()),
                address: Some("123 Gomhoria St, Cairo".to_string()),
                email: Some("contact@modern-construction.example".to_string()),
                company_phone: Some("0225678901".to_string()),
                commercial_reg_num: Some("12345".to_string()),
                commercial_reg_expiry: Some(date("2028-12-31")),
                tax_card_num: Some("54321-A".to_string()),
                tax_card_expiry: Some(date("2027-10-15")),
                issuing_authority: Some("Cairo investment office".to_string()),
                company_activity: Some("General contracting and supplies".to_string()),
                chairman: Some(ContactPerson {
                    name: "Ahmed Mahmoud".to_string(),
                    phone: "01001234567".to_string(),
                }),
                partners: vec![ContactPerson {
                    name: "Mohamed Khaled".to_string(),
                    phone: "01112345678".to_string(),
                }],
            },
            notes: "Client contacted on 2024-07-29 and promised to settle within a week."
                .to_string(),
            lands: vec![
                Land {
                    land_id: "LND-01A".to_string(),
                    auction_id: None,
                    mechanism: Mechanism::PublicAuction,
                    receive_date: date("2023-03-01"),
                    auction_session_date: Some(date("2023-02-15")),
                    area_feddan: 100.0,
                    location: "North of the industrial city".to_string(),
                    currency: Currency::Egp,
                    base_rent: 150_000.0,
                    financials: LandFinancials {
                        feddan_value: 200_000.0,
                        feddan_rental_value: 1_500.0,
                        insurance: 20_000.0,
                    },
                },
                // Won at auction B-204; deposit PAY-004 is awarded rent credit.
                Land {
                    land_id: "LND-AUC-02".to_string(),
                    auction_id: Some("B-204".to_string()),
                    mechanism: Mechanism::PublicAuction,
                    receive_date: date("2023-10-01"),
                    auction_session_date: Some(date("2023-09-20")),
                    area_feddan: 50.0,
                    location: "West of the free zone".to_string(),
                    currency: Currency::Egp,
                    base_rent: 90_000.0,
                    financials: LandFinancials {
                        feddan_value: 220_000.0,
                        feddan_rental_value: 1_800.0,
                        insurance: 22_000.0,
                    },
                },
            ],
        },
    );
    profiles.insert(
        2,
        CustomerProfile {
            profile: InvestorProfile::Individual {
                national_id: Some("28504032100123".to_string()),
                phone: Some("01223456789".to_string()),
                email: Some("investor2@example.com".to_string()),
                mailing_address: Some("PO Box 150, Dakhla, New Valley".to_string()),
            },
            notes: String::new(),
            lands: vec![Land {
                land_id: "LND-02A".to_string(),
                auction_id: None,
                mechanism: Mechanism::DirectOrder,
                receive_date: date("2023-01-01"),
                auction_session_date: None,
                area_feddan: 20.0,
                location: "Free zone".to_string(),
                currency: Currency::Usd,
                base_rent: 5_000.0,
                financials: LandFinancials {
                    feddan_value: 3_000.0,
                    feddan_rental_value: 250.0,
                    insurance: 600.0,
                },
            }],
        },
    );
    profiles.insert(
        3,
        CustomerProfile {
            profile: InvestorProfile::Company {
                file_number: None,
                company_nationality: None,
                partners_nationality: None,
                address: None,
                email: None,
                company_phone: None,
                commercial_reg_num: None,
                commercial_reg_expiry: None,
                tax_card_num: None,
                tax_card_expiry: None,
                issuing_authority: None,
                company_activity: None,
                chairman: None,
                partners: Vec::new(),
            },
            notes: String::new(),
            lands: vec![Land {
                land_id: "LND-03A".to_string(),
                auction_id: None,
                mechanism: Mechanism::Initiative,
                receive_date: date("2022-05-10"),
                auction_session_date: None,
                area_feddan: 70.0,
                location: "East of Balat".to_string(),
                currency: Currency::Egp,
                base_rent: 77_000.0,
                financials: LandFinancials {
                    feddan_value: 100_000.0,
                    feddan_rental_value: 1_100.0,
                    insurance: 10_000.0,
                },
            }],
        },
    );

    LedgerState {
        customers: vec![
            Customer {
                id: 1,
                name: "Modern Construction Co.".to_string(),
                investor_type: InvestorType::Company,
                mechanism: Mechanism::PublicAuction,
                currency: Currency::Egp,
                center: Center::Kharga,
            },
            Customer {
                id: 2,
                name: "Desert Trading Est.".to_string(),
                investor_type: InvestorType::Individual,
                mechanism: Mechanism::DirectOrder,
                currency: Currency::Usd,
                center: Center::Dakhla,
            },
            Customer {
                id: 3,
                name: "Horizon Investment Group".to_string(),
                investor_type: InvestorType::Company,
                mechanism: Mechanism::Initiative,
                currency: Currency::Egp,
                center: Center::Farafra,
            },
        ],
        profiles,
        auction_lands: vec![
            Land {
                land_id: "LND-AUC-01".to_string(),
                auction_id: Some("A-101".to_string()),
                mechanism: Mechanism::PublicAuction,
                receive_date: date("2024-08-01"),
                auction_session_date: Some(date("2024-07-15")),
                area_feddan: 25.0,
                location: "South of Kharga".to_string(),
                currency: Currency::Usd,
                base_rent: 6_250.0,
                financials: LandFinancials {
                    feddan_value: 3_000.0,
                    feddan_rental_value: 250.0,
                    insurance: 500.0,
                },
            },
            Land {
                land_id: "LND-AUC-03".to_string(),
                auction_id: Some("C-301".to_string()),
                mechanism: Mechanism::PublicAuction,
                receive_date: date("2024-04-01"),
                auction_session_date: Some(date("2024-03-15")),
                area_feddan: 80.0,
                location: "North of Farafra".to_string(),
                currency: Currency::Egp,
                base_rent: 120_000.0,
                financials: LandFinancials {
                    feddan_value: 200_000.0,
                    feddan_rental_value: 1_500.0,
                    insurance: 15_000.0,
                },
            },
        ],
        invoices: vec![Invoice {
            id: "INV-005".to_string(),
            customer_id: 1,
            land_id: "LND-01A".to_string(),
            description: "Initial deposit".to_string(),
            due_date: date("2023-02-20"),
            original_amount: 20_000.0,
            currency: Currency::Egp,
            reminder_log: Vec::new(),
            status: InvoiceStatus::Paid,
        }],
        payments: vec![
            Payment {
                payment_id: "PAY-001".to_string(),
                invoice_id: Some("INV-005".to_string()),
                customer_id: 1,
                land_id: "LND-01A".to_string(),
                payment_date: date("2023-02-20"),
                amount: 20_000.0,
                currency: Currency::Egp,
                method: PaymentMethod::BankTransfer {
                    bank_name: "Banque Misr".to_string(),
                    transfer_id: "TRN584399".to_string(),
                },
                description: "Initial deposit".to_string(),
                document_url: None,
                notes: "Amount received and transfer confirmed.".to_string(),
                status: PaymentStatus::Confirmed,
                auction_id: None,
                temp_insurance_status: None,
            },
            Payment {
                payment_id: "PAY-002".to_string(),
                invoice_id: None,
                customer_id: 1,
                land_id: "LND-01A".to_string(),
                payment_date: date("2024-07-20"),
                amount: 100_000.0,
                currency: Currency::Egp,
                method: PaymentMethod::Cheque {
                    cheque_number: "CHK100548".to_string(),
                    due_date: date("2024-07-20"),
                },
                description: "Advance against 2024 rental value".to_string(),
                document_url: None,
                notes: "Cheque under collection.".to_string(),
                status: PaymentStatus::Confirmed,
                auction_id: None,
                temp_insurance_status: None,
            },
            Payment {
                payment_id: "PAY-003".to_string(),
                invoice_id: None,
                customer_id: 2,
                land_id: "LND-AUC-01".to_string(),
                payment_date: date("2023-01-05"),
                amount: 500.0,
                currency: Currency::Usd,
                method: PaymentMethod::Cash {
                    treasury: "T-01".to_string(),
                    recipient: "Ali Hassan".to_string(),
                },
                description: "Temporary deposit for auction A-101".to_string(),
                document_url: None,
                notes: String::new(),
                status: PaymentStatus::Confirmed,
                auction_id: Some("A-101".to_string()),
                temp_insurance_status: Some(TempInsuranceStatus::Booked),
            },
            Payment {
                payment_id: "PAY-004".to_string(),
                invoice_id: None,
                customer_id: 1,
                land_id: "LND-AUC-02".to_string(),
                payment_date: date("2023-09-18"),
                amount: 10_000.0,
                currency: Currency::Egp,
                method: PaymentMethod::BankTransfer {
                    bank_name: "National Bank".to_string(),
                    transfer_id: "TRN99834".to_string(),
                },
                description: "Temporary deposit for auction B-204".to_string(),
                document_url: None,
                notes: String::new(),
                status: PaymentStatus::Confirmed,
                auction_id: Some("B-204".to_string()),
                temp_insurance_status: Some(TempInsuranceStatus::Awarded),
            },
            Payment {
                payment_id: "PAY-005".to_string(),
                invoice_id: None,
                customer_id: 3,
                land_id: "LND-AUC-03".to_string(),
                payment_date: date("2024-03-10"),
                amount: 15_000.0,
                currency: Currency::Egp,
                method: PaymentMethod::Cheque {
                    cheque_number: "CHK20583".to_string(),
                    due_date: date("2024-03-10"),
                },
                description: "Temporary deposit for auction C-301".to_string(),
                document_url: None,
                notes: "Deposit returned; auction not awarded.".to_string(),
                status: PaymentStatus::Confirmed,
                auction_id: Some("C-301".to_string()),
                temp_insurance_status: Some(TempInsuranceStatus::Returned),
            },
            Payment {
                payment_id: "PAY-006".to_string(),
                invoice_id: None,
                customer_id: 1,
                land_id: "LND-AUC-01".to_string(),
                payment_date: date("2024-01-20"),
                amount: 25_000.0,
                currency: Currency::Egp,
                method: PaymentMethod::Cash {
                    treasury: "T-02".to_string(),
                    recipient: "Mohamed Said".to_string(),
                },
                description: "Temporary deposit for auction A-101".to_string(),
                document_url: None,
                notes: String::new(),
                status: PaymentStatus::Confirmed,
                auction_id: Some("A-101".to_string()),
                temp_insurance_status: Some(TempInsuranceStatus::Booked),
            },
        ],
        history_log: Vec::new(),
        warning_template: WarningTemplate {
            content: WARNING_TEMPLATE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::seed_state;

    #[test]
    fn seed_is_internally_consistent() {
        let state = seed_state();
        assert_eq!(state.customers.len(), 3);
        for customer in &state.customers {
            assert!(state.profiles.contains_key(&customer.id));
        }
        for payment in &state.payments {
            assert!(state.customer(payment.customer_id).is_some());
        }
        // One advance is allocatable out of the box (PAY-002).
        let advances = state.advance_payments(1, "LND-01A");
        assert_eq!(advances.len(), 1);
        assert_eq!(advances[0].payment_id, "PAY-002");
    }
}
