mod common;

use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;

use corebank::application::{
    AppError, CreateCustomerRequest, CreateLoanRequest, UpdateAccountStatusRequest,
};
use corebank::config::{LedgerConfig, PoolConfig};
use corebank::domain::{
    AccountStatus, AccountType, Deposit, NewAccount, NewCustomer, NewLoan, TransactionType,
    Transfer, Withdrawal,
};
use corebank::storage::{LedgerError, LedgerGateway, Repository};

use common::{balance_of, customer_with_account, test_ledger, test_service};

#[tokio::test]
async fn test_customer_round_trip() -> Result<()> {
    let (service, _repo, _temp) = test_service().await?;

    let request: CreateCustomerRequest = serde_json::from_value(json!({
        "cnic": "35202-1234567-1",
        "name": "Ayesha Khan",
        "contact": "0300-1234567"
    }))?;
    let created = service.create_customer(request).await?;
    assert_eq!(created.customer_id, "CUS00000001");

    let summary = service.get_customer(&created.customer_id).await?;
    assert_eq!(summary.customer.cnic, "35202-1234567-1");
    assert_eq!(summary.customer.name, "Ayesha Khan");
    assert_eq!(summary.customer.contact.as_deref(), Some("0300-1234567"));
    assert!(!summary.customer.have_account);
    assert_eq!(summary.total_accounts, 0);
    assert_eq!(summary.total_balance, 0);

    Ok(())
}

#[tokio::test]
async fn test_customer_totals_follow_accounts() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let (customer_id, _) = customer_with_account(&*ledger, "11111-1111111-1", 15_000).await?;
    ledger
        .create_account(NewAccount {
            customer_id: customer_id.clone(),
            account_type: AccountType::Current,
            initial_balance: 2_550,
        })
        .await?;

    let summary = ledger.get_customer(&customer_id).await?.unwrap();
    assert!(summary.customer.have_account);
    assert_eq!(summary.total_accounts, 2);
    assert_eq!(summary.total_balance, 17_550);

    Ok(())
}

#[tokio::test]
async fn test_identifiers_are_allocated_sequentially() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let (first_customer, first_account) =
        customer_with_account(&*ledger, "11111-1111111-1", 0).await?;
    let (second_customer, second_account) =
        customer_with_account(&*ledger, "22222-2222222-2", 0).await?;

    assert_eq!(first_customer, "CUS00000001");
    assert_eq!(second_customer, "CUS00000002");
    assert_eq!(first_account, "ACC00000001");
    assert_eq!(second_account, "ACC00000002");

    // Listings are newest first
    let customers = ledger.list_customers().await?;
    assert_eq!(customers[0].customer_id, "CUS00000002");
    let accounts = ledger.list_accounts().await?;
    assert_eq!(accounts[0].account.account_no, "ACC00000002");
    assert_eq!(accounts[0].customer_name, "Holder 22222-2222222-2");

    Ok(())
}

#[tokio::test]
async fn test_duplicate_cnic_is_rejected() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let customer = NewCustomer {
        cnic: "35202-7654321-0".into(),
        name: "Usman".into(),
        contact: None,
    };

    ledger.create_customer(customer.clone()).await?;
    let err = ledger.create_customer(customer).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateCnic(ref cnic) if cnic == "35202-7654321-0"));

    // The failed attempt does not consume an identifier
    let next = ledger
        .create_customer(NewCustomer {
            cnic: "35202-0000000-0".into(),
            name: "Sana".into(),
            contact: None,
        })
        .await?;
    assert_eq!(next.customer_id, "CUS00000002");

    Ok(())
}

#[tokio::test]
async fn test_open_account_for_unknown_customer_fails() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger
        .create_account(NewAccount {
            customer_id: "CUS99999999".into(),
            account_type: AccountType::Savings,
            initial_balance: 100,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownCustomer(_)));
    assert!(ledger.list_accounts().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_account_detail_joins_customer() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (customer_id, account_no) =
        customer_with_account(&*ledger, "33333-3333333-3", 4_200).await?;

    let detail = ledger.get_account(&account_no).await?.unwrap();
    assert_eq!(detail.account.customer_id, customer_id);
    assert_eq!(detail.account.account_type, AccountType::Savings);
    assert_eq!(detail.account.status, AccountStatus::Active);
    assert_eq!(detail.account.balance, 4_200);
    assert_eq!(detail.cnic, "33333-3333333-3");
    assert_eq!(detail.customer_name, "Holder 33333-3333333-3");

    assert!(ledger.get_account("ACC99999999").await?.is_none());
    assert!(ledger.get_balance("ACC99999999").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_update_account_status_then_read() -> Result<()> {
    let (service, repo, _temp) = test_service().await?;
    let (_, account_no) = customer_with_account(&*repo, "44444-4444444-4", 0).await?;

    let request: UpdateAccountStatusRequest = serde_json::from_value(json!({"status": "frozen"}))?;
    let missing = service
        .update_account_status("ACC99999999", request.clone())
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound("Account")));

    service.update_account_status(&account_no, request).await?;
    let detail = service.get_account(&account_no).await?;
    assert_eq!(detail.account.status, AccountStatus::Frozen);

    Ok(())
}

#[tokio::test]
async fn test_deposit_and_withdraw_update_balance() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, account_no) = customer_with_account(&*ledger, "55555-5555555-5", 10_000).await?;

    let deposit = ledger
        .deposit(Deposit {
            account_no: account_no.clone(),
            amount: 2_500,
        })
        .await?;
    let withdrawal = ledger
        .withdraw(Withdrawal {
            account_no: account_no.clone(),
            amount: 4_000,
        })
        .await?;

    assert_eq!(balance_of(&*ledger, &account_no).await?, 8_500);
    assert_eq!(deposit.to_account.as_deref(), Some(account_no.as_str()));
    assert_eq!(withdrawal.from_account.as_deref(), Some(account_no.as_str()));

    let recorded = ledger.get_transaction(&withdrawal.transaction_id).await?.unwrap();
    assert_eq!(recorded.transaction_type, TransactionType::Withdrawal);
    assert_eq!(recorded.amount, 4_000);
    assert_eq!(recorded.status, "completed");
    assert_eq!(recorded.fee, 0);
    assert_eq!(recorded.to_account, None);

    Ok(())
}

#[tokio::test]
async fn test_deposit_to_unknown_account_fails() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger
        .deposit(Deposit {
            account_no: "ACC99999999".into(),
            amount: 100,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownAccount(_)));
    assert!(ledger.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_frozen_account_cannot_transact() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, account_no) = customer_with_account(&*ledger, "66666-6666666-6", 5_000).await?;
    ledger
        .update_account_status(&account_no, AccountStatus::Frozen)
        .await?;

    let err = ledger
        .deposit(Deposit {
            account_no: account_no.clone(),
            amount: 100,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::AccountNotActive {
            status: AccountStatus::Frozen,
            ..
        }
    ));
    assert_eq!(balance_of(&*ledger, &account_no).await?, 5_000);

    Ok(())
}

#[tokio::test]
async fn test_withdraw_insufficient_funds_leaves_no_trace() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, account_no) = customer_with_account(&*ledger, "77777-7777777-7", 1_000).await?;

    let err = ledger
        .withdraw(Withdrawal {
            account_no: account_no.clone(),
            amount: 1_001,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::InsufficientFunds {
            balance: 1_000,
            required: 1_001,
            ..
        }
    ));
    assert_eq!(balance_of(&*ledger, &account_no).await?, 1_000);
    assert!(ledger.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_transfer_moves_funds_atomically() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, source) = customer_with_account(&*ledger, "88888-8888888-1", 10_000).await?;
    let (_, destination) =
        customer_with_account(&*ledger, "88888-8888888-2", 500).await?;

    let receipt = ledger
        .transfer(Transfer {
            from_account: source.clone(),
            to_account: destination.clone(),
            amount: 3_000,
        })
        .await?;

    assert_eq!(balance_of(&*ledger, &source).await?, 7_000);
    assert_eq!(balance_of(&*ledger, &destination).await?, 3_500);

    let transactions = ledger.list_transactions().await?;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction_id, receipt.transaction_id);
    assert_eq!(transactions[0].transaction_type, TransactionType::Transfer);
    assert_eq!(transactions[0].from_account.as_deref(), Some(source.as_str()));
    assert_eq!(transactions[0].to_account.as_deref(), Some(destination.as_str()));

    Ok(())
}

#[tokio::test]
async fn test_failed_transfer_changes_nothing() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, source) = customer_with_account(&*ledger, "99999-9999999-1", 2_000).await?;
    let (_, destination) =
        customer_with_account(&*ledger, "99999-9999999-2", 0).await?;

    // Insufficient funds
    let err = ledger
        .transfer(Transfer {
            from_account: source.clone(),
            to_account: destination.clone(),
            amount: 2_001,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    // Unknown destination: the debit must be rolled back
    let err = ledger
        .transfer(Transfer {
            from_account: source.clone(),
            to_account: "ACC99999999".into(),
            amount: 500,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownAccount(ref no) if no == "ACC99999999"));

    // Inactive destination
    ledger
        .update_account_status(&destination, AccountStatus::Closed)
        .await?;
    let err = ledger
        .transfer(Transfer {
            from_account: source.clone(),
            to_account: destination.clone(),
            amount: 500,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotActive { .. }));

    assert_eq!(balance_of(&*ledger, &source).await?, 2_000);
    assert_eq!(balance_of(&*ledger, &destination).await?, 0);
    assert!(ledger.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_transfer_to_same_account_nets_zero() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, account_no) = customer_with_account(&*ledger, "12121-1212121-2", 800).await?;

    ledger
        .transfer(Transfer {
            from_account: account_no.clone(),
            to_account: account_no.clone(),
            amount: 800,
        })
        .await?;

    assert_eq!(balance_of(&*ledger, &account_no).await?, 800);
    assert_eq!(ledger.list_transactions().await?.len(), 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_all_apply() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (_, account_no) = customer_with_account(&*ledger, "13131-1313131-3", 1_000).await?;

    const DEPOSITS: usize = 25;
    const AMOUNT: i64 = 250;

    let mut handles = Vec::with_capacity(DEPOSITS);
    for _ in 0..DEPOSITS {
        let ledger = ledger.clone();
        let account_no = account_no.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .deposit(Deposit {
                    account_no,
                    amount: AMOUNT,
                })
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(
        balance_of(&*ledger, &account_no).await?,
        1_000 + DEPOSITS as i64 * AMOUNT
    );
    assert_eq!(ledger.list_transactions().await?.len(), DEPOSITS);

    Ok(())
}

#[tokio::test]
async fn test_delete_customer() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    let (owner, _) = customer_with_account(&*ledger, "14141-1414141-4", 0).await?;
    let loner = ledger
        .create_customer(NewCustomer {
            cnic: "15151-1515151-5".into(),
            name: "No Accounts".into(),
            contact: None,
        })
        .await?;

    // Still owns an account
    let err = ledger.delete_customer(&owner).await.unwrap_err();
    assert!(matches!(err, LedgerError::Database(_)));
    assert!(err.to_string().contains("FOREIGN KEY"));
    assert!(ledger.get_customer(&owner).await?.is_some());

    assert!(ledger.delete_customer(&loner.customer_id).await?);
    assert!(!ledger.delete_customer(&loner.customer_id).await?);

    Ok(())
}

#[tokio::test]
async fn test_loan_create_and_read() -> Result<()> {
    let (service, repo, _temp) = test_service().await?;
    let (customer_id, _) = customer_with_account(&*repo, "16161-1616161-6", 0).await?;

    let request: CreateLoanRequest = serde_json::from_value(json!({
        "customer_id": customer_id,
        "loan_amount": 100000,
        "time_period": 12,
        "interest_rate": 12,
        "loan_type": "personal"
    }))?;
    let created = service.create_loan(request).await?;
    assert_eq!(created.loan_id, "LN00000001");
    assert_eq!(created.monthly_emi, 8884.88);

    let detail = service.get_loan(&created.loan_id).await?;
    assert_eq!(detail.record.loan.loan_amount, 10_000_000);
    assert_eq!(detail.record.loan.remaining_amount, 10_000_000);
    assert_eq!(detail.record.loan.time_period, 12);
    assert_eq!(detail.record.monthly_emi, 8884.88);
    assert_eq!(detail.cnic, "16161-1616161-6");

    let loans = service.list_loans().await?;
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].customer_name, "Holder 16161-1616161-6");

    Ok(())
}

#[tokio::test]
async fn test_loan_for_unknown_customer_fails() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;

    let err = ledger
        .create_loan(NewLoan {
            customer_id: "CUS99999999".into(),
            loan_amount: 50_000,
            time_period: 6,
            interest_rate: 9.5,
            loan_type: "auto".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownCustomer(_)));
    assert!(ledger.list_loans().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_migration_is_idempotent() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    customer_with_account(&*ledger, "17171-1717171-7", 100).await?;

    ledger.migrate().await?;

    // Counters were not reset
    let (customer_id, _) = customer_with_account(&*ledger, "18181-1818181-8", 0).await?;
    assert_eq!(customer_id, "CUS00000002");

    Ok(())
}

#[tokio::test]
async fn test_credit_past_integer_range_is_rejected() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    const LARGE: i64 = 9_000_000_000_000_000_000;
    let (_, account_no) = customer_with_account(&*ledger, "19191-1919191-9", 0).await?;

    ledger
        .deposit(Deposit {
            account_no: account_no.clone(),
            amount: LARGE,
        })
        .await?;
    let err = ledger
        .deposit(Deposit {
            account_no: account_no.clone(),
            amount: LARGE,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::BalanceOverflow {
            balance: LARGE,
            amount: LARGE,
            ..
        }
    ));

    // Still an exact integer, and still debitable
    assert_eq!(balance_of(&*ledger, &account_no).await?, LARGE);
    assert!(ledger.get_account(&account_no).await?.is_some());
    assert_eq!(ledger.list_transactions().await?.len(), 1);
    ledger
        .withdraw(Withdrawal {
            account_no: account_no.clone(),
            amount: 1,
        })
        .await?;
    assert_eq!(balance_of(&*ledger, &account_no).await?, LARGE - 1);

    // The maximum itself is reachable
    ledger
        .deposit(Deposit {
            account_no: account_no.clone(),
            amount: i64::MAX - (LARGE - 1),
        })
        .await?;
    assert_eq!(balance_of(&*ledger, &account_no).await?, i64::MAX);

    Ok(())
}

#[tokio::test]
async fn test_transfer_credit_overflow_rolls_back_debit() -> Result<()> {
    let (ledger, _temp) = test_ledger().await?;
    const LARGE: i64 = 9_000_000_000_000_000_000;
    let (_, source) = customer_with_account(&*ledger, "20202-2020202-1", LARGE).await?;
    let (_, destination) = customer_with_account(&*ledger, "20202-2020202-2", LARGE).await?;

    let err = ledger
        .transfer(Transfer {
            from_account: source.clone(),
            to_account: destination.clone(),
            amount: LARGE,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::BalanceOverflow { ref account_no, .. } if *account_no == destination
    ));

    assert_eq!(balance_of(&*ledger, &source).await?, LARGE);
    assert_eq!(balance_of(&*ledger, &destination).await?, LARGE);
    assert!(ledger.list_transactions().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_failed_operations_release_their_connection() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = LedgerConfig {
        pool: PoolConfig {
            min: 1,
            max: 1,
            increment: 1,
        },
        acquire_timeout: Duration::from_secs(2),
        ..LedgerConfig::for_path(&temp_dir.path().join("single.db"))
    };
    let ledger = Repository::init(&config).await?;
    let (customer_id, account_no) = customer_with_account(&ledger, "21212-2121212-1", 100).await?;

    // Each failure must hand the only connection back to the pool
    for _ in 0..3 {
        let overdraft = ledger
            .withdraw(Withdrawal {
                account_no: account_no.clone(),
                amount: 101,
            })
            .await;
        assert!(matches!(overdraft, Err(LedgerError::InsufficientFunds { .. })));

        let unknown = ledger
            .deposit(Deposit {
                account_no: "ACC99999999".into(),
                amount: 1,
            })
            .await;
        assert!(matches!(unknown, Err(LedgerError::UnknownAccount(_))));

        let dangling = ledger
            .transfer(Transfer {
                from_account: account_no.clone(),
                to_account: "ACC99999999".into(),
                amount: 50,
            })
            .await;
        assert!(matches!(dangling, Err(LedgerError::UnknownAccount(_))));

        let duplicate = ledger
            .create_customer(NewCustomer {
                cnic: "21212-2121212-1".into(),
                name: "Again".into(),
                contact: None,
            })
            .await;
        assert!(matches!(duplicate, Err(LedgerError::DuplicateCnic(_))));

        let orphan = ledger
            .create_loan(NewLoan {
                customer_id: "CUS99999999".into(),
                loan_amount: 1_000,
                time_period: 3,
                interest_rate: 5.0,
                loan_type: "personal".into(),
            })
            .await;
        assert!(matches!(orphan, Err(LedgerError::UnknownCustomer(_))));

        assert!(ledger.delete_customer(&customer_id).await.is_err());
    }

    ledger
        .deposit(Deposit {
            account_no: account_no.clone(),
            amount: 25,
        })
        .await?;
    assert_eq!(balance_of(&ledger, &account_no).await?, 125);

    ledger.close().await;
    Ok(())
}

#[tokio::test]
async fn test_init_fails_on_bad_configuration() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let unreachable = LedgerConfig::for_path(&temp_dir.path().join("missing").join("ledger.db"));
    assert!(Repository::init(&unreachable).await.is_err());

    let inverted = LedgerConfig {
        pool: PoolConfig {
            min: 4,
            max: 1,
            increment: 1,
        },
        ..LedgerConfig::for_path(&temp_dir.path().join("ledger.db"))
    };
    let err = Repository::init(&inverted).await.err().unwrap();
    assert!(err.to_string().contains("Invalid pool configuration"));
    assert!(!temp_dir.path().join("ledger.db").exists());

    Ok(())
}

#[tokio::test]
async fn test_listings_stay_newest_first_past_eight_digits() -> Result<()> {
    let (ledger, temp_dir) = test_ledger().await?;

    // Jump the counters to the edge of the eight-digit range
    let url = format!("sqlite:{}", temp_dir.path().join("test.db").display());
    let pool = SqlitePool::connect(&url).await?;
    sqlx::query(
        "UPDATE sequence_counter SET value = 99999998 WHERE name IN ('customer', 'account', 'loan')",
    )
    .execute(&pool)
    .await?;
    pool.close().await;

    let (first_customer, first_account) =
        customer_with_account(&*ledger, "22222-0000000-1", 0).await?;
    let (second_customer, second_account) =
        customer_with_account(&*ledger, "22222-0000000-2", 0).await?;
    assert_eq!(first_customer, "CUS99999999");
    assert_eq!(second_customer, "CUS100000000");
    assert_eq!(first_account, "ACC99999999");
    assert_eq!(second_account, "ACC100000000");

    let customers = ledger.list_customers().await?;
    assert_eq!(customers[0].customer_id, second_customer);
    assert_eq!(customers[1].customer_id, first_customer);

    let accounts = ledger.list_accounts().await?;
    assert_eq!(accounts[0].account.account_no, second_account);

    for customer_id in [&first_customer, &second_customer] {
        ledger
            .create_loan(NewLoan {
                customer_id: customer_id.clone(),
                loan_amount: 10_000,
                time_period: 12,
                interest_rate: 10.0,
                loan_type: "personal".into(),
            })
            .await?;
    }
    let loans = ledger.list_loans().await?;
    assert_eq!(loans[0].loan.loan_id, "LN100000000");
    assert_eq!(loans[1].loan.loan_id, "LN99999999");

    Ok(())
}
