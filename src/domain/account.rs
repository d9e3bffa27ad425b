use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, CustomerId};

/// Ledger-allocated account number, e.g. `ACC00000007`.
pub type AccountNo = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Interest-bearing deposit account
    Savings,
    /// Transactional account for day-to-day use
    Current,
    /// Term deposit
    Fixed,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Current => "current",
            AccountType::Fixed => "fixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Some(AccountType::Savings),
            "current" => Some(AccountType::Current),
            "fixed" => Some(AccountType::Fixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Frozen => "frozen",
            AccountStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(AccountStatus::Active),
            "inactive" => Some(AccountStatus::Inactive),
            "frozen" => Some(AccountStatus::Frozen),
            "closed" => Some(AccountStatus::Closed),
            _ => None,
        }
    }

    /// Only active accounts accept deposits, withdrawals and transfers.
    pub fn can_transact(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_no: AccountNo,
    pub customer_id: CustomerId,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(with = "super::units")]
    pub balance: Cents,
    pub status: AccountStatus,
    pub opening_date: DateTime<Utc>,
}

/// Row of the account listing: the account and its owner's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    #[serde(flatten)]
    pub account: Account,
    pub customer_name: String,
}

/// Single-account projection joined with the owning customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    pub customer_name: String,
    pub cnic: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub customer_id: CustomerId,
    pub account_type: AccountType,
    pub initial_balance: Cents,
}

/// Out-parameter of the create-account ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOpened {
    pub account_no: AccountNo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_no: AccountNo,
    #[serde(with = "super::units")]
    pub balance: Cents,
}
