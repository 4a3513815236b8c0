//! Integration tests for the wallet vertical slice
//!
//! The balance must never go negative, whatever the interleaving of
//! withdrawals.


use proptest::prelude::*;
use remotejob_core::{types::*, MarketError};
use remotejob_storage::{messages, wallet};
use test_helpers::*;

fn request(amount_cents: i64) -> WithdrawalRequest {
    WithdrawalRequest::new(cents(amount_cents), "USDT", "T9yDxyz").unwrap()
}

#[tokio::test]
async fn test_withdraw_until_insufficient() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "worker@example.com").await;
    fund(pool, &user, 5000).await;

    let withdrawal = wallet::withdraw(pool, &user.id, &request(4000)).await.unwrap();
    assert_eq!(withdrawal.amount, cents(4000));
    assert_eq!(withdrawal.balance_after, cents(1000));
    assert_eq!(withdrawal.crypto, "USDT");
    assert_eq!(wallet::get_balance(pool, &user.id).await.unwrap(), cents(1000));

    let err = wallet::withdraw(pool, &user.id, &request(4000)).await.unwrap_err();
    assert!(matches!(err, MarketError::InsufficientFunds));
    assert_eq!(wallet::get_balance(pool, &user.id).await.unwrap(), cents(1000));

    // Only the successful withdrawal left a trace
    assert_eq!(messages::get_for_user(pool, &user.id).await.unwrap().len(), 1);
    assert_eq!(wallet::get_withdrawals(pool, &user.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_withdraw_exact_balance() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "worker@example.com").await;
    fund(pool, &user, 2550).await;

    let withdrawal = wallet::withdraw(pool, &user.id, &request(2550)).await.unwrap();
    assert_eq!(withdrawal.balance_after, Amount::ZERO);
}

#[tokio::test]
async fn test_withdraw_unknown_user() {
    let test_db = TestDb::new().await;

    let err = wallet::withdraw(test_db.pool(), &UserId::new("missing"), &request(100))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound { .. }));
}

#[tokio::test]
async fn test_withdrawal_message_and_ledger() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "worker@example.com").await;
    fund(pool, &user, 10000).await;

    wallet::withdraw(pool, &user.id, &request(1000)).await.unwrap();
    wallet::withdraw(pool, &user.id, &request(2500)).await.unwrap();

    let ledger = wallet::get_withdrawals(pool, &user.id).await.unwrap();
    assert_eq!(ledger.len(), 2);
    // Newest first
    assert_eq!(ledger[0].amount, cents(2500));
    assert_eq!(ledger[0].balance_after, cents(6500));
    assert_eq!(ledger[1].balance_after, cents(9000));

    let inbox = messages::get_for_user(pool, &user.id).await.unwrap();
    assert!(inbox[0].content.contains("10.00"));
    assert!(inbox[0].content.contains("USDT"));
    assert!(inbox[0].content.contains("T9yDxyz"));
}

#[tokio::test]
async fn test_set_balance() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "worker@example.com").await;

    let balance = wallet::set_balance(pool, &user.id, cents(1234)).await.unwrap();
    assert_eq!(balance, cents(1234));
    assert_eq!(wallet::get_balance(pool, &user.id).await.unwrap(), cents(1234));

    let missing = wallet::set_balance(pool, &UserId::new("missing"), cents(1)).await;
    assert!(matches!(missing, Err(MarketError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool().clone();

    let user = create_test_user(&pool, "worker@example.com").await;
    fund(&pool, &user, 10000).await;

    // Ten requests of 30.00 against 100.00: exactly three can succeed
    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        let user_id = user.id.clone();
        handles.push(tokio::spawn(async move {
            wallet::withdraw(&pool, &user_id, &request(3000)).await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(MarketError::InsufficientFunds) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(wallet::get_balance(&pool, &user.id).await.unwrap(), cents(1000));
    assert_eq!(wallet::get_withdrawals(&pool, &user.id).await.unwrap().len(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Property: debits never exceed the starting balance, and the final
    /// balance is the start minus exactly the accepted amounts
    #[test]
    fn withdrawals_never_exceed_balance(
        start in 0i64..20_000,
        amounts in prop::collection::vec(1i64..8_000, 1..12)
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let test_db = TestDb::new().await;
            let pool = test_db.pool();

            let user = create_test_user(pool, "worker@example.com").await;
            fund(pool, &user, start).await;

            let mut expected = start;
            for amount in &amounts {
                match wallet::withdraw(pool, &user.id, &request(*amount)).await {
                    Ok(w) => {
                        expected -= amount;
                        assert_eq!(w.balance_after.cents(), expected);
                    }
                    Err(MarketError::InsufficientFunds) => assert!(*amount > expected),
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }

            assert!(expected >= 0);
            assert_eq!(wallet::get_balance(pool, &user.id).await.unwrap().cents(), expected);

            let debited: i64 = wallet::get_withdrawals(pool, &user.id)
                .await
                .unwrap()
                .iter()
                .map(|w| w.amount.cents())
                .sum();
            assert_eq!(debited, start - expected);
        });
    }
}
