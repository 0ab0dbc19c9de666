//! Service-level tests for the session lifecycle, the wallet ledger and the
//! notification fan-out, run against the in-memory store.

mod common;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::*;
use mentor_core::{
    accounts::LoginRequest,
    domain::{Notification, Page, SessionFilter, TransactionKind, TransferKind, TransferRequest},
    ports::NotificationStore,
    AuthError, Notifier, PortError, PortResult, Role, SessionLedger, SessionPatch, SessionStatus,
    WalletLedger,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

fn transfer(kind: TransferKind, amount: &str) -> TransferRequest {
    TransferRequest {
        amount: dec(amount),
        kind,
        description: None,
    }
}

//=========================================================================================
// Accounts
//=========================================================================================

#[tokio::test]
async fn registration_opens_an_empty_wallet_and_allows_login() {
    let (_, state) = app();
    let auth = register(&state, "  Solver@Example.com ", Role::Solver).await;
    assert_eq!(auth.user.email, "solver@example.com");

    let wallet = state.wallets.get_wallet(auth.user.id).await.unwrap();
    assert_eq!(wallet.balance, Decimal::ZERO);
    assert_eq!(wallet.currency, "USD");

    let login = state
        .accounts
        .login(LoginRequest {
            email: "solver@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap();
    let caller = state.accounts.authenticate(&login.token).unwrap();
    assert_eq!(caller.user_id, auth.user.id);
    assert_eq!(caller.role, Role::Solver);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let (_, state) = app();
    register(&state, "dup@example.com", Role::Seeker).await;
    let err = state
        .accounts
        .register(registration("DUP@example.com", Role::Solver))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Conflict(_)));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let (_, state) = app();
    register(&state, "seeker@example.com", Role::Seeker).await;

    let wrong = state
        .accounts
        .login(LoginRequest {
            email: "seeker@example.com".into(),
            password: "Wrong1234".into(),
        })
        .await
        .unwrap_err();
    let unknown = state
        .accounts
        .login(LoginRequest {
            email: "nobody@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(wrong, PortError::InvalidCredentials));
    assert!(matches!(unknown, PortError::InvalidCredentials));
}

#[tokio::test]
async fn deactivated_account_cannot_log_in() {
    let (_, state) = app();
    let auth = register(&state, "gone@example.com", Role::Seeker).await;
    let user = state
        .accounts
        .set_user_active(&admin(), auth.user.id, false)
        .await
        .unwrap();
    assert!(!user.is_active);

    let err = state
        .accounts
        .login(LoginRequest {
            email: "gone@example.com".into(),
            password: PASSWORD.into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::AccountDeactivated));
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (_, state) = app();
    let auth = register(&state, "late@example.com", Role::Seeker).await;
    let stale = tokens()
        .issue_token_at(
            auth.user.id,
            &auth.user.email,
            Role::Seeker,
            Utc::now() - Duration::hours(25),
        )
        .unwrap();

    assert_eq!(tokens().validate_token(&stale).unwrap_err(), AuthError::Expired);
    assert!(matches!(
        state.accounts.authenticate(&stale),
        Err(PortError::Auth(AuthError::Expired))
    ));
    assert!(state.accounts.refresh(&stale).is_err());
}

//=========================================================================================
// Wallet Ledger
//=========================================================================================

#[tokio::test]
async fn balance_reconciles_with_completed_transactions() {
    let (_, state) = app();
    let user = register(&state, "wallet@example.com", Role::Seeker).await.user;

    state.wallets.transfer(user.id, transfer(TransferKind::Deposit, "100.00")).await.unwrap();
    let receipt = state
        .wallets
        .transfer(user.id, transfer(TransferKind::Withdraw, "30.25"))
        .await
        .unwrap();
    assert_eq!(receipt.new_balance, dec("69.75"));

    let history = state.wallets.list_transactions(user.id, Page::default()).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, TransactionKind::Withdraw);

    let derived: Decimal = history.iter().map(|t| t.kind.signed(t.amount)).sum();
    let wallet = state.wallets.get_wallet(user.id).await.unwrap();
    assert_eq!(wallet.balance, derived);
}

#[tokio::test]
async fn failed_withdraw_leaves_no_trace() {
    let (_, state) = app();
    let user = register(&state, "short@example.com", Role::Seeker).await.user;
    state.wallets.transfer(user.id, transfer(TransferKind::Deposit, "10.00")).await.unwrap();

    let err = state
        .wallets
        .transfer(user.id, transfer(TransferKind::Withdraw, "10.01"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::InsufficientBalance { .. }));

    let wallet = state.wallets.get_wallet(user.id).await.unwrap();
    assert_eq!(wallet.balance, dec("10.00"));
    let history = state.wallets.list_transactions(user.id, Page::default()).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn invalid_amounts_are_rejected_before_touching_the_wallet() {
    let (_, state) = app();
    let user = register(&state, "zero@example.com", Role::Seeker).await.user;

    for amount in ["0", "-5.00", "1.005", "1000000000000"] {
        let err = state
            .wallets
            .transfer(user.id, transfer(TransferKind::Deposit, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)), "amount {amount}");
    }
    assert!(state
        .wallets
        .list_transactions(user.id, Page::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn balance_cannot_grow_past_the_cap() {
    let (_, state) = app();
    let user = register(&state, "rich@example.com", Role::Seeker).await.user;

    state
        .wallets
        .transfer(user.id, transfer(TransferKind::Deposit, "999999999999.99"))
        .await
        .unwrap();
    let err = state
        .wallets
        .transfer(user.id, transfer(TransferKind::Deposit, "0.01"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));

    let wallet = state.wallets.get_wallet(user.id).await.unwrap();
    assert_eq!(wallet.balance, dec("999999999999.99"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_withdrawals_cannot_overdraw() {
    let (store, state) = app();
    let user = register(&state, "race@example.com", Role::Seeker).await.user;
    let ledger = WalletLedger::new(store);
    ledger.transfer(user.id, transfer(TransferKind::Deposit, "50.00")).await.unwrap();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .transfer(user.id, transfer(TransferKind::Withdraw, "50.00"))
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for outcome in futures::future::join_all(attempts).await {
        match outcome.unwrap() {
            Ok(_) => succeeded += 1,
            Err(e) => assert!(matches!(e, PortError::InsufficientBalance { .. })),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(ledger.get_wallet(user.id).await.unwrap().balance, Decimal::ZERO);
    let history = ledger.list_transactions(user.id, Page::default()).await.unwrap();
    assert_eq!(history.len(), 2);
}

//=========================================================================================
// Session Lifecycle
//=========================================================================================

#[tokio::test]
async fn sessions_must_be_scheduled_in_the_future() {
    let (_, state) = app();
    let solver = register(&state, "solver@example.com", Role::Solver).await.user;
    let seeker = register(&state, "seeker@example.com", Role::Seeker).await.user;

    let past = booking(seeker.id, Utc::now() - Duration::minutes(5));
    let err = state.sessions.create_session(&caller(&solver), past).await.unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));

    let future = booking(seeker.id, Utc::now() + Duration::days(2));
    let session = state.sessions.create_session(&caller(&solver), future).await.unwrap();
    assert_eq!(session.status, SessionStatus::Scheduled);
    assert_eq!(session.solver_id, solver.id);
    assert_eq!(session.seeker_id, seeker.id);
}

#[tokio::test]
async fn unknown_counterpart_is_rejected() {
    let (_, state) = app();
    let solver = register(&state, "solo@example.com", Role::Solver).await.user;
    let req = booking(Uuid::new_v4(), Utc::now() + Duration::days(1));
    let err = state.sessions.create_session(&caller(&solver), req).await.unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));
}

#[tokio::test]
async fn both_participants_see_the_session_and_get_notified() {
    let (_, state) = app();
    let solver = register(&state, "solver@example.com", Role::Solver).await.user;
    let seeker = register(&state, "seeker@example.com", Role::Seeker).await.user;
    let stranger = register(&state, "stranger@example.com", Role::Seeker).await.user;

    let session = state
        .sessions
        .create_session(&caller(&seeker), booking(solver.id, Utc::now() + Duration::days(1)))
        .await
        .unwrap();

    for participant in [&solver, &seeker] {
        let listing = state.sessions.get_session(&caller(participant), session.id).await.unwrap();
        assert_eq!(listing.solver_name, "Ada Lovelace");

        let listed = state
            .sessions
            .list_sessions(&caller(participant), &SessionFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        let inbox = state.notifier.list(participant.id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].title, "New Session Scheduled");
        assert!(!inbox[0].is_read);
    }

    let hidden = state.sessions.get_session(&caller(&stranger), session.id).await.unwrap_err();
    assert!(matches!(hidden, PortError::NotFound(_)));
    let patch = SessionPatch {
        status: Some(SessionStatus::Confirmed),
        ..Default::default()
    };
    let denied = state
        .sessions
        .update_session(&caller(&stranger), session.id, patch)
        .await
        .unwrap_err();
    assert!(matches!(denied, PortError::Forbidden(_)));
    assert!(state.notifier.list(stranger.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_runs_to_completion_then_accepts_only_feedback() {
    let (_, state) = app();
    let solver = register(&state, "solver@example.com", Role::Solver).await.user;
    let seeker = register(&state, "seeker@example.com", Role::Seeker).await.user;
    let session = state
        .sessions
        .create_session(&caller(&solver), booking(seeker.id, Utc::now() + Duration::hours(3)))
        .await
        .unwrap();
    let as_solver = caller(&solver);
    let status = |s| SessionPatch {
        status: Some(s),
        ..Default::default()
    };

    let skip = state
        .sessions
        .update_session(&as_solver, session.id, status(SessionStatus::Completed))
        .await
        .unwrap_err();
    assert!(matches!(skip, PortError::Validation(_)));

    for next in [SessionStatus::Confirmed, SessionStatus::Active, SessionStatus::Completed] {
        let updated = state
            .sessions
            .update_session(&as_solver, session.id, status(next))
            .await
            .unwrap();
        assert_eq!(updated.status, next);
    }

    let feedback = SessionPatch {
        rating: Some(5),
        review: Some("Clear and patient".into()),
        ..Default::default()
    };
    let rated = state
        .sessions
        .update_session(&caller(&seeker), session.id, feedback)
        .await
        .unwrap();
    assert_eq!(rated.rating, Some(5));
    assert_eq!(rated.title, session.title);
    assert_eq!(rated.price, session.price);

    let reopen = state
        .sessions
        .update_session(&as_solver, session.id, status(SessionStatus::Cancelled))
        .await
        .unwrap_err();
    assert!(matches!(reopen, PortError::Validation(_)));

    let empty = state
        .sessions
        .update_session(&as_solver, session.id, SessionPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(empty, PortError::NoOp));
}

#[tokio::test]
async fn deleted_session_is_gone_for_everyone() {
    let (_, state) = app();
    let solver = register(&state, "solver@example.com", Role::Solver).await.user;
    let seeker = register(&state, "seeker@example.com", Role::Seeker).await.user;
    let session = state
        .sessions
        .create_session(&caller(&solver), booking(seeker.id, Utc::now() + Duration::hours(1)))
        .await
        .unwrap();

    state.sessions.delete_session(&caller(&seeker), session.id).await.unwrap();
    let err = state.sessions.get_session(&caller(&solver), session.id).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
    let again = state.sessions.delete_session(&caller(&solver), session.id).await.unwrap_err();
    assert!(matches!(again, PortError::NotFound(_)));
}

#[tokio::test]
async fn notifications_are_scoped_to_their_owner() {
    let (_, state) = app();
    let owner = register(&state, "owner@example.com", Role::Seeker).await.user;
    let other = register(&state, "other@example.com", Role::Seeker).await.user;

    let note = state.notifier.notify(owner.id, "Welcome", "Glad to have you").await.unwrap();
    state.notifier.mark_read(other.id, note.id).await.unwrap();
    state.notifier.delete(other.id, note.id).await.unwrap();
    let inbox = state.notifier.list(owner.id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(!inbox[0].is_read);

    state.notifier.mark_read(owner.id, note.id).await.unwrap();
    assert!(state.notifier.list(owner.id).await.unwrap()[0].is_read);

    state.notifier.delete(owner.id, note.id).await.unwrap();
    assert!(state.notifier.list(owner.id).await.unwrap().is_empty());
}

struct BrokenInbox;

#[async_trait]
impl NotificationStore for BrokenInbox {
    async fn insert_notification(&self, _: Uuid, _: &str, _: &str) -> PortResult<Notification> {
        Err(PortError::Unexpected("notification table unavailable".into()))
    }

    async fn list_notifications(&self, _: Uuid, _: i64) -> PortResult<Vec<Notification>> {
        Ok(Vec::new())
    }

    async fn mark_notification_read(&self, _: Uuid, _: Uuid) -> PortResult<u64> {
        Ok(0)
    }

    async fn delete_notification(&self, _: Uuid, _: Uuid) -> PortResult<u64> {
        Ok(0)
    }
}

#[tokio::test]
async fn notification_failure_does_not_fail_scheduling() {
    let (store, state) = app();
    let solver = register(&state, "solver@example.com", Role::Solver).await.user;
    let seeker = register(&state, "seeker@example.com", Role::Seeker).await.user;

    let ledger = SessionLedger::new(store, Notifier::new(Arc::new(BrokenInbox)));
    let session = ledger
        .create_session(&caller(&solver), booking(seeker.id, Utc::now() + Duration::days(1)))
        .await
        .unwrap();

    assert!(ledger.get_session(&caller(&seeker), session.id).await.is_ok());
}

//=========================================================================================
// End to End
//=========================================================================================

#[tokio::test]
async fn solver_and_seeker_book_and_pay() {
    let (_, state) = app();
    let solver = register(&state, "mentor@example.com", Role::Solver).await.user;
    let seeker = register(&state, "learner@example.com", Role::Seeker).await.user;

    state
        .wallets
        .transfer(seeker.id, transfer(TransferKind::Deposit, "120.00"))
        .await
        .unwrap();

    let session = state
        .sessions
        .create_session(&caller(&seeker), booking(solver.id, Utc::now() + Duration::days(3)))
        .await
        .unwrap();
    state
        .wallets
        .transfer(seeker.id, transfer(TransferKind::Withdraw, "45.00"))
        .await
        .unwrap();

    assert_eq!(state.wallets.get_wallet(seeker.id).await.unwrap().balance, dec("75.00"));
    assert_eq!(state.wallets.get_wallet(solver.id).await.unwrap().balance, Decimal::ZERO);

    let upcoming = state.dashboard.upcoming_sessions(&caller(&seeker)).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, session.id);

    let stats = state.dashboard.stats(&caller(&solver)).await.unwrap();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.completed_sessions, 0);

    let all = state.sessions.list_all_sessions(Page::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}
