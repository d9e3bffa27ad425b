use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{cents_to_units, Cents, CustomerId};

/// Ledger-allocated loan identifier, e.g. `LN00000005`.
pub type LoanId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    /// Principal
    #[serde(with = "super::units")]
    pub loan_amount: Cents,
    /// Term in months
    pub time_period: i64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    pub loan_type: String,
    #[serde(with = "super::units")]
    pub remaining_amount: Cents,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    pub fn monthly_emi(&self) -> f64 {
        monthly_emi(self.loan_amount, self.interest_rate, self.time_period)
    }
}

/// Row of the loan listing: the loan, its owner's name and the derived installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    #[serde(flatten)]
    pub loan: Loan,
    pub customer_name: String,
    pub monthly_emi: f64,
}

/// Single-loan projection joined with the borrowing customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetail {
    #[serde(flatten)]
    pub record: LoanRecord,
    pub cnic: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub customer_id: CustomerId,
    pub loan_amount: Cents,
    pub time_period: i64,
    pub interest_rate: f64,
    pub loan_type: String,
}

/// Out-parameter of the create-loan ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReceipt {
    pub loan_id: LoanId,
}

/// Result of creating a loan: the allocated id and the installment it implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCreated {
    pub loan_id: LoanId,
    pub monthly_emi: f64,
}

/// Equated monthly installment, in currency units rounded to 2 decimals.
///
/// `annual_rate` is a percentage and `months` the term. Uses the standard
/// amortisation formula `P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly
/// rate; a zero rate spreads the principal evenly. A non-positive term
/// yields 0.
pub fn monthly_emi(principal: Cents, annual_rate: f64, months: i64) -> f64 {
    if months <= 0 {
        return 0.0;
    }

    let principal = cents_to_units(principal);
    let n = months as f64;
    let r = annual_rate / 12.0 / 100.0;

    let emi = if r == 0.0 {
        principal / n
    } else {
        let growth = (1.0 + r).powf(n);
        principal * r * growth / (growth - 1.0)
    };

    (emi * 100.0).round() / 100.0
}
