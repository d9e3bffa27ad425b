//! Request bodies as they arrive over HTTP, and their validation into ledger commands.
//!
//! Every field is optional at the deserialisation stage so that a missing
//! field is reported with the same 400 envelope as any other invalid input.

use serde::Deserialize;
use serde_json::Number;

use crate::domain::{
    cents_from_units, parse_cents, AccountStatus, AccountType, Cents, CustomerUpdate, Deposit,
    NewAccount, NewCustomer, NewLoan, Transfer, Withdrawal,
};

use super::AppError;

/// A JSON scalar that may be sent either as a string or as a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
}

impl Scalar {
    /// Textual form; blank strings count as absent.
    pub fn text(&self) -> Option<String> {
        match self {
            Scalar::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Scalar::Number(n) => Some(n.to_string()),
        }
    }

    /// Amount in cents. `Ok(None)` for a blank string, `Err` for anything non-numeric.
    pub fn cents(&self) -> Result<Option<Cents>, String> {
        match self {
            Scalar::Text(s) if s.trim().is_empty() => Ok(None),
            Scalar::Text(s) => parse_cents(s)
                .map(Some)
                .map_err(|e| format!("{}: {:?}", e, s)),
            Scalar::Number(n) => n
                .as_f64()
                .and_then(cents_from_units)
                .map(Some)
                .ok_or_else(|| format!("amount out of range: {}", n)),
        }
    }

    /// Plain floating point value. `Ok(None)` for a blank string.
    pub fn number(&self) -> Result<Option<f64>, String> {
        let value = match self {
            Scalar::Text(s) if s.trim().is_empty() => return Ok(None),
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("not a number: {:?}", s))?,
            Scalar::Number(n) => n.as_f64().ok_or_else(|| format!("not a number: {}", n))?,
        };
        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(format!("not a number: {}", value))
        }
    }
}

fn text(field: Option<Scalar>) -> Option<String> {
    field.as_ref().and_then(Scalar::text)
}

fn cents(field: Option<Scalar>, field_name: &str) -> Result<Option<Cents>, AppError> {
    match field {
        None => Ok(None),
        Some(scalar) => scalar
            .cents()
            .map_err(|e| AppError::validation(format!("Invalid {}: {}", field_name, e))),
    }
}

fn number(field: Option<Scalar>, field_name: &str) -> Result<Option<f64>, AppError> {
    match field {
        None => Ok(None),
        Some(scalar) => scalar
            .number()
            .map_err(|e| AppError::validation(format!("Invalid {}: {}", field_name, e))),
    }
}

// ========================
// Customers
// ========================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CreateCustomerRequest {
    pub cnic: Option<Scalar>,
    pub name: Option<Scalar>,
    pub contact: Option<Scalar>,
}

impl CreateCustomerRequest {
    pub fn validate(self) -> Result<NewCustomer, AppError> {
        match (text(self.cnic), text(self.name)) {
            (Some(cnic), Some(name)) => Ok(NewCustomer {
                cnic,
                name,
                contact: text(self.contact),
            }),
            _ => Err(AppError::validation("CNIC and Name are required")),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateCustomerRequest {
    pub name: Option<Scalar>,
    pub contact: Option<Scalar>,
}

impl UpdateCustomerRequest {
    pub fn validate(self) -> Result<CustomerUpdate, AppError> {
        let name = text(self.name).ok_or_else(|| AppError::validation("Name is required"))?;
        Ok(CustomerUpdate {
            name,
            contact: text(self.contact),
        })
    }
}

// ========================
// Accounts
// ========================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CreateAccountRequest {
    pub customer_id: Option<Scalar>,
    #[serde(rename = "type")]
    pub account_type: Option<Scalar>,
    pub initial_balance: Option<Scalar>,
}

impl CreateAccountRequest {
    pub fn validate(self) -> Result<NewAccount, AppError> {
        let initial_balance = cents(self.initial_balance, "initial_balance")?;
        let (Some(customer_id), Some(type_str), Some(initial_balance)) =
            (text(self.customer_id), text(self.account_type), initial_balance)
        else {
            return Err(AppError::validation(
                "Customer ID, Type, and Initial Balance are required",
            ));
        };

        let account_type = AccountType::from_str(&type_str).ok_or_else(|| {
            AppError::validation(format!(
                "Invalid account type: {} (expected savings, current or fixed)",
                type_str
            ))
        })?;
        if initial_balance < 0 {
            return Err(AppError::validation("Initial balance cannot be negative"));
        }

        Ok(NewAccount {
            customer_id,
            account_type,
            initial_balance,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateAccountStatusRequest {
    pub status: Option<Scalar>,
}

impl UpdateAccountStatusRequest {
    pub fn validate(self) -> Result<AccountStatus, AppError> {
        text(self.status)
            .as_deref()
            .and_then(AccountStatus::from_str)
            .ok_or_else(|| {
                AppError::validation("Status must be one of active, inactive, frozen or closed")
            })
    }
}

// ========================
// Transactions
// ========================

const ACCOUNT_AND_AMOUNT_REQUIRED: &str = "Valid account number and positive amount required";
const TRANSFER_FIELDS_REQUIRED: &str =
    "Valid from/to account numbers and positive amount required";

/// Body shared by deposit and withdrawal.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AmountRequest {
    pub account_no: Option<Scalar>,
    pub amount: Option<Scalar>,
}

impl AmountRequest {
    fn validated(self) -> Result<(String, Cents), AppError> {
        let amount = cents(self.amount, "amount")?;
        match (text(self.account_no), amount) {
            (Some(account_no), Some(amount)) if amount > 0 => Ok((account_no, amount)),
            _ => Err(AppError::validation(ACCOUNT_AND_AMOUNT_REQUIRED)),
        }
    }

    pub fn into_deposit(self) -> Result<Deposit, AppError> {
        let (account_no, amount) = self.validated()?;
        Ok(Deposit { account_no, amount })
    }

    pub fn into_withdrawal(self) -> Result<Withdrawal, AppError> {
        let (account_no, amount) = self.validated()?;
        Ok(Withdrawal { account_no, amount })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub from_account: Option<Scalar>,
    pub to_account: Option<Scalar>,
    pub amount: Option<Scalar>,
}

impl TransferRequest {
    pub fn validate(self) -> Result<Transfer, AppError> {
        let amount = cents(self.amount, "amount")?;
        match (text(self.from_account), text(self.to_account), amount) {
            (Some(from_account), Some(to_account), Some(amount)) if amount > 0 => Ok(Transfer {
                from_account,
                to_account,
                amount,
            }),
            _ => Err(AppError::validation(TRANSFER_FIELDS_REQUIRED)),
        }
    }
}

// ========================
// Loans
// ========================

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CreateLoanRequest {
    pub customer_id: Option<Scalar>,
    pub loan_amount: Option<Scalar>,
    pub time_period: Option<Scalar>,
    pub interest_rate: Option<Scalar>,
    pub loan_type: Option<Scalar>,
}

impl CreateLoanRequest {
    pub fn validate(self) -> Result<NewLoan, AppError> {
        let loan_amount = cents(self.loan_amount, "loan_amount")?.filter(|c| *c > 0);
        // Whole months only
        let time_period = number(self.time_period, "time_period")?
            .map(|months| months.trunc())
            .filter(|months| *months >= 1.0 && *months <= i64::MAX as f64)
            .map(|months| months as i64);
        let interest_rate = number(self.interest_rate, "interest_rate")?.filter(|r| *r > 0.0);

        match (
            text(self.customer_id),
            loan_amount,
            time_period,
            interest_rate,
            text(self.loan_type),
        ) {
            (
                Some(customer_id),
                Some(loan_amount),
                Some(time_period),
                Some(interest_rate),
                Some(loan_type),
            ) => Ok(NewLoan {
                customer_id,
                loan_amount,
                time_period,
                interest_rate,
                loan_type,
            }),
            _ => Err(AppError::validation("All loan fields are required")),
        }
    }
}
