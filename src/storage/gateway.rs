use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    format_cents, AccountDetail, AccountOpened, AccountStatus, AccountView, Cents, Customer,
    CustomerCreated, CustomerSummary, CustomerUpdate, Deposit, LoanDetail, LoanReceipt,
    LoanRecord, NewAccount, NewCustomer, NewLoan, Transaction, TransactionReceipt, Transfer,
    Withdrawal,
};

/// Every way a ledger operation can fail. All variants travel through the
/// same channel; callers that only care about "it failed" can use `Display`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Customer not found: {0}")]
    UnknownCustomer(String),

    #[error("Account not found: {0}")]
    UnknownAccount(String),

    #[error("Account {account_no} is {status}")]
    AccountNotActive {
        account_no: String,
        status: AccountStatus,
    },

    #[error(
        "Insufficient funds in account {account_no}: balance {}, required {}",
        format_cents(*.balance),
        format_cents(*.required)
    )]
    InsufficientFunds {
        account_no: String,
        balance: Cents,
        required: Cents,
    },

    #[error(
        "Crediting {} to account {account_no} would overflow its balance {}",
        format_cents(*.amount),
        format_cents(*.balance)
    )]
    BalanceOverflow {
        account_no: String,
        balance: Cents,
        amount: Cents,
    },

    #[error("Customer already exists with CNIC {0}")]
    DuplicateCnic(String),

    /// Constraint violations, connectivity loss, pool exhaustion, corrupt rows.
    #[error("{0:#}")]
    Database(#[from] anyhow::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// The transactional boundary between the API and the ledger engine.
///
/// Each method is one atomic ledger call: mutations either commit completely
/// or leave no trace. Reads are side-effect free. `Option`/`bool` results
/// signal "zero rows returned/affected" and are not errors.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    // Customers
    async fn create_customer(&self, customer: NewCustomer) -> LedgerResult<CustomerCreated>;
    async fn list_customers(&self) -> LedgerResult<Vec<Customer>>;
    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Option<CustomerSummary>>;
    async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> LedgerResult<bool>;
    async fn delete_customer(&self, customer_id: &str) -> LedgerResult<bool>;

    // Accounts
    async fn create_account(&self, account: NewAccount) -> LedgerResult<AccountOpened>;
    async fn list_accounts(&self) -> LedgerResult<Vec<AccountView>>;
    async fn get_account(&self, account_no: &str) -> LedgerResult<Option<AccountDetail>>;
    async fn get_balance(&self, account_no: &str) -> LedgerResult<Option<Cents>>;
    async fn update_account_status(
        &self,
        account_no: &str,
        status: AccountStatus,
    ) -> LedgerResult<bool>;

    // Transactions
    async fn deposit(&self, deposit: Deposit) -> LedgerResult<TransactionReceipt>;
    async fn withdraw(&self, withdrawal: Withdrawal) -> LedgerResult<TransactionReceipt>;
    async fn transfer(&self, transfer: Transfer) -> LedgerResult<TransactionReceipt>;
    async fn list_transactions(&self) -> LedgerResult<Vec<Transaction>>;
    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>>;

    // Loans
    async fn create_loan(&self, loan: NewLoan) -> LedgerResult<LoanReceipt>;
    async fn list_loans(&self) -> LedgerResult<Vec<LoanRecord>>;
    async fn get_loan(&self, loan_id: &str) -> LedgerResult<Option<LoanDetail>>;
}
