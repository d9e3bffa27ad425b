// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use corebank::api::{build_router, AppState};
use corebank::application::BankingService;
use corebank::config::LedgerConfig;
use corebank::domain::{
    AccountDetail, AccountOpened, AccountStatus, AccountType, AccountView, Cents, Customer,
    CustomerCreated, CustomerSummary, CustomerUpdate, Deposit, LoanDetail, LoanReceipt,
    LoanRecord, NewAccount, NewCustomer, NewLoan, Transaction, TransactionReceipt, Transfer,
    Withdrawal,
};
use corebank::storage::{LedgerError, LedgerGateway, LedgerResult, Repository};

/// Helper to create a ledger backed by a temporary SQLite database
pub async fn test_ledger() -> Result<(Arc<Repository>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = LedgerConfig::for_path(&temp_dir.path().join("test.db"));
    let repo = Repository::init(&config).await?;
    Ok((Arc::new(repo), temp_dir))
}

/// Helper to create a service over a temporary ledger.
/// The repository is returned too so tests can inspect state directly.
pub async fn test_service() -> Result<(BankingService, Arc<Repository>, TempDir)> {
    let (repo, temp_dir) = test_ledger().await?;
    let service = BankingService::new(repo.clone());
    Ok((service, repo, temp_dir))
}

/// Test fixture: a customer owning one account with `balance` cents.
pub async fn customer_with_account(
    ledger: &dyn LedgerGateway,
    cnic: &str,
    balance: Cents,
) -> Result<(String, String)> {
    let customer = ledger
        .create_customer(NewCustomer {
            cnic: cnic.to_string(),
            name: format!("Holder {}", cnic),
            contact: None,
        })
        .await?;
    let account = ledger
        .create_account(NewAccount {
            customer_id: customer.customer_id.clone(),
            account_type: AccountType::Savings,
            initial_balance: balance,
        })
        .await?;
    Ok((customer.customer_id, account.account_no))
}

/// Current balance of an account that is known to exist.
pub async fn balance_of(ledger: &dyn LedgerGateway, account_no: &str) -> Result<Cents> {
    ledger
        .get_balance(account_no)
        .await?
        .ok_or_else(|| anyhow::anyhow!("account {} vanished", account_no))
}

pub fn router(gateway: Arc<dyn LedgerGateway>) -> Router {
    build_router(AppState::new(gateway))
}

/// Drive one request through the router and decode the JSON reply.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    dispatch(app, request).await
}

/// Like [`send`] but with a raw body and an optional content type.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.to_string()))?;
    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

/// Gateway double that counts invocations and answers with canned values.
///
/// Reads find nothing and updates affect nothing, so they map to 404.
/// A failing gateway answers every call with a database fault.
#[derive(Default)]
pub struct RecordingGateway {
    calls: AtomicUsize,
    failure: Option<String>,
    transfers: Mutex<Vec<Transfer>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().unwrap().clone()
    }

    fn record(&self) -> LedgerResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(LedgerError::Database(anyhow::anyhow!(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerGateway for RecordingGateway {
    async fn create_customer(&self, _customer: NewCustomer) -> LedgerResult<CustomerCreated> {
        self.record()?;
        Ok(CustomerCreated {
            customer_id: "CUS00000001".into(),
        })
    }

    async fn list_customers(&self) -> LedgerResult<Vec<Customer>> {
        self.record()?;
        Ok(Vec::new())
    }

    async fn get_customer(&self, _customer_id: &str) -> LedgerResult<Option<CustomerSummary>> {
        self.record()?;
        Ok(None)
    }

    async fn update_customer(&self, _customer_id: &str, _update: CustomerUpdate) -> LedgerResult<bool> {
        self.record()?;
        Ok(false)
    }

    async fn delete_customer(&self, _customer_id: &str) -> LedgerResult<bool> {
        self.record()?;
        Ok(false)
    }

    async fn create_account(&self, _account: NewAccount) -> LedgerResult<AccountOpened> {
        self.record()?;
        Ok(AccountOpened {
            account_no: "ACC00000001".into(),
        })
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<AccountView>> {
        self.record()?;
        Ok(Vec::new())
    }

    async fn get_account(&self, _account_no: &str) -> LedgerResult<Option<AccountDetail>> {
        self.record()?;
        Ok(None)
    }

    async fn get_balance(&self, _account_no: &str) -> LedgerResult<Option<Cents>> {
        self.record()?;
        Ok(None)
    }

    async fn update_account_status(
        &self,
        _account_no: &str,
        _status: AccountStatus,
    ) -> LedgerResult<bool> {
        self.record()?;
        Ok(false)
    }

    async fn deposit(&self, deposit: Deposit) -> LedgerResult<TransactionReceipt> {
        self.record()?;
        Ok(TransactionReceipt {
            transaction_id: "TXN00000001".into(),
            from_account: None,
            to_account: Some(deposit.account_no),
            amount: deposit.amount,
        })
    }

    async fn withdraw(&self, withdrawal: Withdrawal) -> LedgerResult<TransactionReceipt> {
        self.record()?;
        Ok(TransactionReceipt {
            transaction_id: "TXN00000002".into(),
            from_account: Some(withdrawal.account_no),
            to_account: None,
            amount: withdrawal.amount,
        })
    }

    async fn transfer(&self, transfer: Transfer) -> LedgerResult<TransactionReceipt> {
        self.record()?;
        self.transfers.lock().unwrap().push(transfer.clone());
        Ok(TransactionReceipt {
            transaction_id: "TXN00000003".into(),
            from_account: Some(transfer.from_account),
            to_account: Some(transfer.to_account),
            amount: transfer.amount,
        })
    }

    async fn list_transactions(&self) -> LedgerResult<Vec<Transaction>> {
        self.record()?;
        Ok(Vec::new())
    }

    async fn get_transaction(&self, _transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        self.record()?;
        Ok(None)
    }

    async fn create_loan(&self, _loan: NewLoan) -> LedgerResult<LoanReceipt> {
        self.record()?;
        Ok(LoanReceipt {
            loan_id: "LN00000001".into(),
        })
    }

    async fn list_loans(&self) -> LedgerResult<Vec<LoanRecord>> {
        self.record()?;
        Ok(Vec::new())
    }

    async fn get_loan(&self, _loan_id: &str) -> LedgerResult<Option<LoanDetail>> {
        self.record()?;
        Ok(None)
    }
}
