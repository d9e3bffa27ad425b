use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cents;

/// Ledger-allocated customer identifier, e.g. `CUS00000042`.
pub type CustomerId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    /// National identity card number, unique across customers
    pub cnic: String,
    pub name: String,
    pub contact: Option<String>,
    /// Set by the ledger once the customer opens their first account
    pub have_account: bool,
    pub created_at: DateTime<Utc>,
}

/// A customer together with an aggregate over the accounts they own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    pub total_accounts: i64,
    #[serde(with = "super::units")]
    pub total_balance: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub cnic: String,
    pub name: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub name: String,
    pub contact: Option<String>,
}

/// Out-parameter of the create-customer ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCreated {
    pub customer_id: CustomerId,
}
