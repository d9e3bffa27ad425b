use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::{
    monthly_emi, AccountBalance, AccountDetail, AccountOpened, AccountView, Customer,
    CustomerCreated, CustomerSummary, LoanCreated, LoanDetail, LoanRecord, Transaction,
    TransactionReceipt,
};
use crate::storage::{LedgerGateway, LedgerResult};

use super::{
    AmountRequest, AppError, CreateAccountRequest, CreateCustomerRequest, CreateLoanRequest,
    TransferRequest, UpdateAccountStatusRequest, UpdateCustomerRequest,
};

pub type AppResult<T> = Result<T, AppError>;

/// Application service in front of the ledger.
/// Each operation validates its input, then makes exactly one gateway call.
#[derive(Clone)]
pub struct BankingService {
    gateway: Arc<dyn LedgerGateway>,
}

/// Log a rejected request at debug level and pass the error on.
fn rejected<T>(operation: &str, result: AppResult<T>) -> AppResult<T> {
    result.inspect_err(|e| debug!(operation, error = %e, "Request rejected"))
}

/// Log a ledger fault and lift it into the application error.
fn ledger<T>(operation: &str, result: LedgerResult<T>) -> AppResult<T> {
    result.map_err(|e| {
        error!(operation, error = %e, "Ledger operation failed");
        AppError::from(e)
    })
}

fn found<T>(entity: &'static str, value: Option<T>) -> AppResult<T> {
    value.ok_or(AppError::NotFound(entity))
}

fn affected(entity: &'static str, rows_affected: bool) -> AppResult<()> {
    if rows_affected {
        Ok(())
    } else {
        Err(AppError::NotFound(entity))
    }
}

impl BankingService {
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Self {
        Self { gateway }
    }

    // ========================
    // Customers
    // ========================

    pub async fn create_customer(&self, request: CreateCustomerRequest) -> AppResult<CustomerCreated> {
        let customer = rejected("create_customer", request.validate())?;
        let created = ledger("create_customer", self.gateway.create_customer(customer).await)?;
        info!(customer_id = %created.customer_id, "Customer created");
        Ok(created)
    }

    pub async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        ledger("list_customers", self.gateway.list_customers().await)
    }

    pub async fn get_customer(&self, customer_id: &str) -> AppResult<CustomerSummary> {
        let summary = ledger("get_customer", self.gateway.get_customer(customer_id).await)?;
        found("Customer", summary)
    }

    pub async fn update_customer(
        &self,
        customer_id: &str,
        request: UpdateCustomerRequest,
    ) -> AppResult<()> {
        let update = rejected("update_customer", request.validate())?;
        let updated = ledger(
            "update_customer",
            self.gateway.update_customer(customer_id, update).await,
        )?;
        affected("Customer", updated)?;
        info!(customer_id, "Customer updated");
        Ok(())
    }

    pub async fn delete_customer(&self, customer_id: &str) -> AppResult<()> {
        let deleted = ledger(
            "delete_customer",
            self.gateway.delete_customer(customer_id).await,
        )?;
        affected("Customer", deleted)?;
        info!(customer_id, "Customer deleted");
        Ok(())
    }

    // ========================
    // Accounts
    // ========================

    pub async fn create_account(&self, request: CreateAccountRequest) -> AppResult<AccountOpened> {
        let account = rejected("create_account", request.validate())?;
        let opened = ledger("create_account", self.gateway.create_account(account).await)?;
        info!(account_no = %opened.account_no, "Account created");
        Ok(opened)
    }

    pub async fn list_accounts(&self) -> AppResult<Vec<AccountView>> {
        ledger("list_accounts", self.gateway.list_accounts().await)
    }

    pub async fn get_account(&self, account_no: &str) -> AppResult<AccountDetail> {
        let detail = ledger("get_account", self.gateway.get_account(account_no).await)?;
        found("Account", detail)
    }

    pub async fn get_balance(&self, account_no: &str) -> AppResult<AccountBalance> {
        let balance = ledger("get_balance", self.gateway.get_balance(account_no).await)?;
        Ok(AccountBalance {
            account_no: account_no.to_string(),
            balance: found("Account", balance)?,
        })
    }

    pub async fn update_account_status(
        &self,
        account_no: &str,
        request: UpdateAccountStatusRequest,
    ) -> AppResult<()> {
        let status = rejected("update_account_status", request.validate())?;
        let updated = ledger(
            "update_account_status",
            self.gateway.update_account_status(account_no, status).await,
        )?;
        affected("Account", updated)?;
        info!(account_no, %status, "Account status updated");
        Ok(())
    }

    // ========================
    // Transactions
    // ========================

    pub async fn deposit(&self, request: AmountRequest) -> AppResult<TransactionReceipt> {
        let deposit = rejected("deposit", request.into_deposit())?;
        let receipt = ledger("deposit", self.gateway.deposit(deposit).await)?;
        info!(transaction_id = %receipt.transaction_id, "Deposit completed");
        Ok(receipt)
    }

    pub async fn withdraw(&self, request: AmountRequest) -> AppResult<TransactionReceipt> {
        let withdrawal = rejected("withdraw", request.into_withdrawal())?;
        let receipt = ledger("withdraw", self.gateway.withdraw(withdrawal).await)?;
        info!(transaction_id = %receipt.transaction_id, "Withdrawal completed");
        Ok(receipt)
    }

    pub async fn transfer(&self, request: TransferRequest) -> AppResult<TransactionReceipt> {
        let transfer = rejected("transfer", request.validate())?;
        let receipt = ledger("transfer", self.gateway.transfer(transfer).await)?;
        info!(transaction_id = %receipt.transaction_id, "Transfer completed");
        Ok(receipt)
    }

    pub async fn list_transactions(&self) -> AppResult<Vec<Transaction>> {
        ledger("list_transactions", self.gateway.list_transactions().await)
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> AppResult<Transaction> {
        let transaction = ledger(
            "get_transaction",
            self.gateway.get_transaction(transaction_id).await,
        )?;
        found("Transaction", transaction)
    }

    // ========================
    // Loans
    // ========================

    /// Create a loan and report the installment it implies.
    /// The installment is derived from the validated terms, not read back.
    pub async fn create_loan(&self, request: CreateLoanRequest) -> AppResult<LoanCreated> {
        let loan = rejected("create_loan", request.validate())?;
        let emi = monthly_emi(loan.loan_amount, loan.interest_rate, loan.time_period);
        let receipt = ledger("create_loan", self.gateway.create_loan(loan).await)?;
        info!(loan_id = %receipt.loan_id, monthly_emi = emi, "Loan created");
        Ok(LoanCreated {
            loan_id: receipt.loan_id,
            monthly_emi: emi,
        })
    }

    pub async fn list_loans(&self) -> AppResult<Vec<LoanRecord>> {
        ledger("list_loans", self.gateway.list_loans().await)
    }

    pub async fn get_loan(&self, loan_id: &str) -> AppResult<LoanDetail> {
        let detail = ledger("get_loan", self.gateway.get_loan(loan_id).await)?;
        found("Loan", detail)
    }
}
