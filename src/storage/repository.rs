use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::config::LedgerConfig;
use crate::domain::{
    Account, AccountDetail, AccountOpened, AccountStatus, AccountType, AccountView, Cents,
    Customer, CustomerCreated, CustomerSummary, CustomerUpdate, Deposit, Loan, LoanDetail,
    LoanReceipt, LoanRecord, NewAccount, NewCustomer, NewLoan, Transaction, TransactionReceipt,
    TransactionType, Transfer, Withdrawal, STATUS_COMPLETED,
};

use super::{LedgerError, LedgerGateway, LedgerResult, MIGRATION_001_INITIAL};

type Tx<'c> = sqlx::Transaction<'c, Sqlite>;

const BUSY_TIMEOUT_SECS: u64 = 5;

const CUSTOMER_COLUMNS: &str = "c.customer_id, c.cnic, c.name, c.contact, c.have_account, c.created_at";

const ACCOUNT_COLUMNS: &str =
    "a.account_no, a.customer_id, a.account_type, a.balance, a.status, a.opening_date";

const TRANSACTION_COLUMNS: &str =
    "transaction_id, from_account, to_account, transaction_type, amount, date_time, status, fee";

const LOAN_COLUMNS: &str = "l.loan_id, l.customer_id, l.loan_amount, l.time_period, l.interest_rate, l.loan_type, l.remaining_amount, l.created_at";

/// Kinds of ledger-allocated identifiers, each backed by a row in `sequence_counter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdKind {
    Customer,
    Account,
    Transaction,
    Loan,
}

impl IdKind {
    fn counter(&self) -> &'static str {
        match self {
            IdKind::Customer => "customer",
            IdKind::Account => "account",
            IdKind::Transaction => "transaction",
            IdKind::Loan => "loan",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            IdKind::Customer => "CUS",
            IdKind::Account => "ACC",
            IdKind::Transaction => "TXN",
            IdKind::Loan => "LN",
        }
    }

    fn format(&self, value: i64) -> String {
        format!("{}{:08}", self.prefix(), value)
    }
}

/// A balance update attempted by a guarded `UPDATE accounts` statement.
#[derive(Debug, Clone, Copy)]
enum BalanceChange {
    Debit(Cents),
    Credit(Cents),
}

/// SQLite-backed ledger engine.
///
/// Every mutating operation runs in a single transaction whose first
/// statement is a write, so concurrent writers queue on SQLite's write lock
/// instead of failing on a read-to-write upgrade. Dropping an uncommitted
/// transaction rolls it back.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a connection pool sized by `config`.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;

        let options = config
            .database_url
            .parse::<SqliteConnectOptions>()
            .with_context(|| format!("Invalid database URL: {}", config.database_url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .min_connections(config.pool.min)
            .max_connections(config.pool.max)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        info!(
            url = %config.database_url,
            min = config.pool.min,
            max = config.pool.max,
            increment = config.pool.increment,
            "Ledger connection pool created"
        );
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize the ledger (connect + migrate).
    pub async fn init(config: &LedgerConfig) -> Result<Self> {
        let repo = Self::connect(config).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close every pooled connection, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Ledger connection pool closed");
    }

    /// Allocate the next identifier of `kind` inside `tx`.
    async fn next_identifier(tx: &mut Tx<'_>, kind: IdKind) -> Result<String> {
        let row = sqlx::query(
            r#"
            UPDATE sequence_counter
            SET value = value + 1
            WHERE name = ?
            RETURNING value
            "#,
        )
        .bind(kind.counter())
        .fetch_one(&mut **tx)
        .await
        .with_context(|| format!("Failed to allocate {} identifier", kind.counter()))?;

        Ok(kind.format(row.try_get("value")?))
    }

    /// Append a completed transaction record inside `tx`.
    async fn record_transaction(
        tx: &mut Tx<'_>,
        from_account: Option<&str>,
        to_account: Option<&str>,
        transaction_type: TransactionType,
        amount: Cents,
    ) -> Result<TransactionReceipt> {
        let transaction_id = Self::next_identifier(tx, IdKind::Transaction).await?;

        sqlx::query(
            r#"
            INSERT INTO transactions (transaction_id, from_account, to_account, transaction_type, amount, date_time, status, fee)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&transaction_id)
        .bind(from_account)
        .bind(to_account)
        .bind(transaction_type.as_str())
        .bind(amount)
        .bind(timestamp_now())
        .bind(STATUS_COMPLETED)
        .execute(&mut **tx)
        .await
        .context("Failed to record transaction")?;

        Ok(TransactionReceipt {
            transaction_id,
            from_account: from_account.map(str::to_string),
            to_account: to_account.map(str::to_string),
            amount,
        })
    }

    /// Explain why a guarded balance update on `account_no` touched no rows.
    async fn rejection(tx: &mut Tx<'_>, account_no: &str, change: BalanceChange) -> LedgerError {
        let row = match sqlx::query("SELECT balance, status FROM accounts WHERE account_no = ?")
            .bind(account_no)
            .fetch_optional(&mut **tx)
            .await
            .context("Failed to inspect account")
        {
            Ok(row) => row,
            Err(e) => return e.into(),
        };

        let Some(row) = row else {
            return LedgerError::UnknownAccount(account_no.to_string());
        };

        match Self::account_state(&row) {
            Ok((_, status)) if !status.can_transact() => LedgerError::AccountNotActive {
                account_no: account_no.to_string(),
                status,
            },
            Ok((balance, _)) => match change {
                BalanceChange::Debit(required) => LedgerError::InsufficientFunds {
                    account_no: account_no.to_string(),
                    balance,
                    required,
                },
                BalanceChange::Credit(amount) => LedgerError::BalanceOverflow {
                    account_no: account_no.to_string(),
                    balance,
                    amount,
                },
            },
            Err(e) => e.into(),
        }
    }

    /// Add `amount` to an active account unless the sum would leave the
    /// integer range. Returns whether a row was updated.
    async fn credit(tx: &mut Tx<'_>, account_no: &str, amount: Cents) -> Result<bool> {
        let credited = sqlx::query(
            r#"
            UPDATE accounts SET balance = balance + ?
            WHERE account_no = ? AND status = 'active' AND balance <= ?
            "#,
        )
        .bind(amount)
        .bind(account_no)
        .bind(Cents::MAX.saturating_sub(amount))
        .execute(&mut **tx)
        .await
        .with_context(|| format!("Failed to credit account {}", account_no))?;
        Ok(credited.rows_affected() > 0)
    }

    fn account_state(row: &SqliteRow) -> Result<(Cents, AccountStatus)> {
        let balance: Cents = row.try_get("balance")?;
        let status_str: String = row.try_get("status")?;
        let status = AccountStatus::from_str(&status_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid account status: {}", status_str))?;
        Ok((balance, status))
    }

    fn row_to_customer(row: &SqliteRow) -> Result<Customer> {
        let created_at_str: String = row.try_get("created_at")?;

        Ok(Customer {
            customer_id: row.try_get("customer_id")?,
            cnic: row.try_get("cnic")?,
            name: row.try_get("name")?,
            contact: row.try_get("contact")?,
            have_account: row.try_get::<i32, _>("have_account")? != 0,
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
        })
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account> {
        let account_type_str: String = row.try_get("account_type")?;
        let status_str: String = row.try_get("status")?;
        let opening_date_str: String = row.try_get("opening_date")?;

        Ok(Account {
            account_no: row.try_get("account_no")?,
            customer_id: row.try_get("customer_id")?,
            account_type: AccountType::from_str(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
            balance: row.try_get("balance")?,
            status: AccountStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account status: {}", status_str))?,
            opening_date: parse_timestamp(&opening_date_str)
                .context("Invalid opening_date timestamp")?,
        })
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        let type_str: String = row.try_get("transaction_type")?;
        let date_time_str: String = row.try_get("date_time")?;

        Ok(Transaction {
            transaction_id: row.try_get("transaction_id")?,
            from_account: row.try_get("from_account")?,
            to_account: row.try_get("to_account")?,
            transaction_type: TransactionType::from_str(&type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction type: {}", type_str))?,
            amount: row.try_get("amount")?,
            date_time: parse_timestamp(&date_time_str).context("Invalid date_time timestamp")?,
            status: row.try_get("status")?,
            fee: row.try_get("fee")?,
        })
    }

    fn row_to_loan_record(row: &SqliteRow) -> Result<LoanRecord> {
        let created_at_str: String = row.try_get("created_at")?;

        let loan = Loan {
            loan_id: row.try_get("loan_id")?,
            customer_id: row.try_get("customer_id")?,
            loan_amount: row.try_get("loan_amount")?,
            time_period: row.try_get("time_period")?,
            interest_rate: row.try_get("interest_rate")?,
            loan_type: row.try_get("loan_type")?,
            remaining_amount: row.try_get("remaining_amount")?,
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
        };
        let monthly_emi = loan.monthly_emi();

        Ok(LoanRecord {
            loan,
            customer_name: row.try_get("customer_name")?,
            monthly_emi,
        })
    }
}

/// Fixed-width UTC timestamp, so text ordering matches time ordering.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// `ORDER BY` terms listing ledger identifiers newest first. Identifiers of
/// one kind share a prefix and grow wider past eight digits, so the longer
/// one is always the newer.
fn newest_first(column: &str) -> String {
    format!("length({column}) DESC, {column} DESC")
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl LedgerGateway for Repository {
    // ========================
    // Customer operations
    // ========================

    async fn create_customer(&self, customer: NewCustomer) -> LedgerResult<CustomerCreated> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let customer_id = Self::next_identifier(&mut tx, IdKind::Customer).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO customers (customer_id, cnic, name, contact, have_account, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&customer_id)
        .bind(&customer.cnic)
        .bind(&customer.name)
        .bind(&customer.contact)
        .bind(timestamp_now())
        .execute(&mut *tx)
        .await;

        match inserted {
            Err(e) if is_unique_violation(&e) => return Err(LedgerError::DuplicateCnic(customer.cnic)),
            other => other.context("Failed to save customer")?,
        };

        tx.commit().await.context("Failed to commit customer")?;
        debug!(%customer_id, "Customer committed");
        Ok(CustomerCreated { customer_id })
    }

    async fn list_customers(&self) -> LedgerResult<Vec<Customer>> {
        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers c ORDER BY {}",
            newest_first("c.customer_id")
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list customers")?;

        Ok(rows.iter().map(Self::row_to_customer).collect::<Result<_>>()?)
    }

    async fn get_customer(&self, customer_id: &str) -> LedgerResult<Option<CustomerSummary>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS},
                COUNT(a.account_no) AS total_accounts,
                COALESCE(SUM(a.balance), 0) AS total_balance
            FROM customers c
            LEFT JOIN accounts a ON a.customer_id = c.customer_id
            WHERE c.customer_id = ?
            GROUP BY c.customer_id
            "#
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch customer")?;

        let summary = row
            .map(|row| -> Result<CustomerSummary> {
                Ok(CustomerSummary {
                    customer: Self::row_to_customer(&row)?,
                    total_accounts: row.try_get("total_accounts")?,
                    total_balance: row.try_get("total_balance")?,
                })
            })
            .transpose()?;
        Ok(summary)
    }

    async fn update_customer(
        &self,
        customer_id: &str,
        update: CustomerUpdate,
    ) -> LedgerResult<bool> {
        let result = sqlx::query("UPDATE customers SET name = ?, contact = ? WHERE customer_id = ?")
            .bind(&update.name)
            .bind(&update.contact)
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .context("Failed to update customer")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_customer(&self, customer_id: &str) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = ?")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete customer")?;
        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Account operations
    // ========================

    async fn create_account(&self, account: NewAccount) -> LedgerResult<AccountOpened> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let flagged = sqlx::query("UPDATE customers SET have_account = 1 WHERE customer_id = ?")
            .bind(&account.customer_id)
            .execute(&mut *tx)
            .await
            .context("Failed to flag customer")?;
        if flagged.rows_affected() == 0 {
            return Err(LedgerError::UnknownCustomer(account.customer_id));
        }

        let account_no = Self::next_identifier(&mut tx, IdKind::Account).await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (account_no, customer_id, account_type, balance, status, opening_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account_no)
        .bind(&account.customer_id)
        .bind(account.account_type.as_str())
        .bind(account.initial_balance)
        .bind(AccountStatus::Active.as_str())
        .bind(timestamp_now())
        .execute(&mut *tx)
        .await
        .context("Failed to open account")?;

        tx.commit().await.context("Failed to commit account")?;
        debug!(%account_no, customer_id = %account.customer_id, "Account committed");
        Ok(AccountOpened { account_no })
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<AccountView>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}, c.name AS customer_name
            FROM accounts a
            JOIN customers c ON a.customer_id = c.customer_id
            ORDER BY {}
            "#,
            newest_first("a.account_no")
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        let views = rows
            .iter()
            .map(|row| -> Result<AccountView> {
                Ok(AccountView {
                    account: Self::row_to_account(row)?,
                    customer_name: row.try_get("customer_name")?,
                })
            })
            .collect::<Result<_>>()?;
        Ok(views)
    }

    async fn get_account(&self, account_no: &str) -> LedgerResult<Option<AccountDetail>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}, c.name AS customer_name, c.cnic, c.contact
            FROM accounts a
            JOIN customers c ON a.customer_id = c.customer_id
            WHERE a.account_no = ?
            "#
        ))
        .bind(account_no)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        let detail = row
            .map(|row| -> Result<AccountDetail> {
                Ok(AccountDetail {
                    account: Self::row_to_account(&row)?,
                    customer_name: row.try_get("customer_name")?,
                    cnic: row.try_get("cnic")?,
                    contact: row.try_get("contact")?,
                })
            })
            .transpose()?;
        Ok(detail)
    }

    async fn get_balance(&self, account_no: &str) -> LedgerResult<Option<Cents>> {
        let row = sqlx::query("SELECT balance FROM accounts WHERE account_no = ?")
            .bind(account_no)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch balance")?;

        let balance = row
            .map(|row| row.try_get::<Cents, _>("balance"))
            .transpose()
            .context("Invalid balance")?;
        Ok(balance)
    }

    async fn update_account_status(
        &self,
        account_no: &str,
        status: AccountStatus,
    ) -> LedgerResult<bool> {
        let result = sqlx::query("UPDATE accounts SET status = ? WHERE account_no = ?")
            .bind(status.as_str())
            .bind(account_no)
            .execute(&self.pool)
            .await
            .context("Failed to update account status")?;
        Ok(result.rows_affected() > 0)
    }

    // ========================
    // Transaction operations
    // ========================

    async fn deposit(&self, deposit: Deposit) -> LedgerResult<TransactionReceipt> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        if !Self::credit(&mut tx, &deposit.account_no, deposit.amount).await? {
            let change = BalanceChange::Credit(deposit.amount);
            return Err(Self::rejection(&mut tx, &deposit.account_no, change).await);
        }

        let receipt = Self::record_transaction(
            &mut tx,
            None,
            Some(&deposit.account_no),
            TransactionType::Deposit,
            deposit.amount,
        )
        .await?;

        tx.commit().await.context("Failed to commit deposit")?;
        debug!(transaction_id = %receipt.transaction_id, "Deposit committed");
        Ok(receipt)
    }

    async fn withdraw(&self, withdrawal: Withdrawal) -> LedgerResult<TransactionReceipt> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let debited = sqlx::query(
            r#"
            UPDATE accounts SET balance = balance - ?
            WHERE account_no = ? AND status = 'active' AND balance >= ?
            "#,
        )
        .bind(withdrawal.amount)
        .bind(&withdrawal.account_no)
        .bind(withdrawal.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to debit account")?;
        if debited.rows_affected() == 0 {
            let change = BalanceChange::Debit(withdrawal.amount);
            return Err(Self::rejection(&mut tx, &withdrawal.account_no, change).await);
        }

        let receipt = Self::record_transaction(
            &mut tx,
            Some(&withdrawal.account_no),
            None,
            TransactionType::Withdrawal,
            withdrawal.amount,
        )
        .await?;

        tx.commit().await.context("Failed to commit withdrawal")?;
        debug!(transaction_id = %receipt.transaction_id, "Withdrawal committed");
        Ok(receipt)
    }

    async fn transfer(&self, transfer: Transfer) -> LedgerResult<TransactionReceipt> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let debited = sqlx::query(
            r#"
            UPDATE accounts SET balance = balance - ?
            WHERE account_no = ? AND status = 'active' AND balance >= ?
            "#,
        )
        .bind(transfer.amount)
        .bind(&transfer.from_account)
        .bind(transfer.amount)
        .execute(&mut *tx)
        .await
        .context("Failed to debit source account")?;
        if debited.rows_affected() == 0 {
            let change = BalanceChange::Debit(transfer.amount);
            return Err(Self::rejection(&mut tx, &transfer.from_account, change).await);
        }

        if !Self::credit(&mut tx, &transfer.to_account, transfer.amount).await? {
            // Dropping `tx` rolls the debit back
            let change = BalanceChange::Credit(transfer.amount);
            return Err(Self::rejection(&mut tx, &transfer.to_account, change).await);
        }

        let receipt = Self::record_transaction(
            &mut tx,
            Some(&transfer.from_account),
            Some(&transfer.to_account),
            TransactionType::Transfer,
            transfer.amount,
        )
        .await?;

        tx.commit().await.context("Failed to commit transfer")?;
        debug!(transaction_id = %receipt.transaction_id, "Transfer committed");
        Ok(receipt)
    }

    async fn list_transactions(&self) -> LedgerResult<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY date_time DESC, {}",
            newest_first("transaction_id")
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        Ok(rows.iter().map(Self::row_to_transaction).collect::<Result<_>>()?)
    }

    async fn get_transaction(&self, transaction_id: &str) -> LedgerResult<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = ?"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        Ok(row.as_ref().map(Self::row_to_transaction).transpose()?)
    }

    // ========================
    // Loan operations
    // ========================

    async fn create_loan(&self, loan: NewLoan) -> LedgerResult<LoanReceipt> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let loan_id = Self::next_identifier(&mut tx, IdKind::Loan).await?;

        let borrower = sqlx::query("SELECT 1 FROM customers WHERE customer_id = ?")
            .bind(&loan.customer_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up borrower")?;
        if borrower.is_none() {
            return Err(LedgerError::UnknownCustomer(loan.customer_id));
        }

        sqlx::query(
            r#"
            INSERT INTO loans (loan_id, customer_id, loan_amount, time_period, interest_rate, loan_type, remaining_amount, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&loan_id)
        .bind(&loan.customer_id)
        .bind(loan.loan_amount)
        .bind(loan.time_period)
        .bind(loan.interest_rate)
        .bind(&loan.loan_type)
        .bind(loan.loan_amount)
        .bind(timestamp_now())
        .execute(&mut *tx)
        .await
        .context("Failed to save loan")?;

        tx.commit().await.context("Failed to commit loan")?;
        debug!(%loan_id, customer_id = %loan.customer_id, "Loan committed");
        Ok(LoanReceipt { loan_id })
    }

    async fn list_loans(&self) -> LedgerResult<Vec<LoanRecord>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {LOAN_COLUMNS}, c.name AS customer_name
            FROM loans l
            JOIN customers c ON l.customer_id = c.customer_id
            ORDER BY {}
            "#,
            newest_first("l.loan_id")
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list loans")?;

        Ok(rows.iter().map(Self::row_to_loan_record).collect::<Result<_>>()?)
    }

    async fn get_loan(&self, loan_id: &str) -> LedgerResult<Option<LoanDetail>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {LOAN_COLUMNS}, c.name AS customer_name, c.cnic, c.contact
            FROM loans l
            JOIN customers c ON l.customer_id = c.customer_id
            WHERE l.loan_id = ?
            "#
        ))
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch loan")?;

        let detail = row
            .map(|row| -> Result<LoanDetail> {
                Ok(LoanDetail {
                    record: Self::row_to_loan_record(&row)?,
                    cnic: row.try_get("cnic")?,
                    contact: row.try_get("contact")?,
                })
            })
            .transpose()?;
        Ok(detail)
    }
}
