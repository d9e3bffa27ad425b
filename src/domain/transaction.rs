use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountNo, Cents};

/// Ledger-allocated transaction identifier, e.g. `TXN00000113`.
pub type TransactionId = String;

/// Status recorded on every committed transaction.
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Transfer => "transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deposit" => Some(TransactionType::Deposit),
            "withdrawal" => Some(TransactionType::Withdrawal),
            "transfer" => Some(TransactionType::Transfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An append-only log entry written by the ledger when a deposit,
/// withdrawal or transfer commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    /// Debited account (absent for deposits)
    pub from_account: Option<AccountNo>,
    /// Credited account (absent for withdrawals)
    pub to_account: Option<AccountNo>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "super::units")]
    pub amount: Cents,
    pub date_time: DateTime<Utc>,
    pub status: String,
    #[serde(with = "super::units")]
    pub fee: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub account_no: AccountNo,
    pub amount: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub account_no: AccountNo,
    pub amount: Cents,
}

/// Movement between two accounts. `from_account == to_account` is not
/// rejected here; the ledger decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from_account: AccountNo,
    pub to_account: AccountNo,
    pub amount: Cents,
}

/// Out-parameter of the deposit, withdraw and transfer ledger operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account: Option<AccountNo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account: Option<AccountNo>,
    #[serde(with = "super::units")]
    pub amount: Cents,
}
