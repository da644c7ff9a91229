//! Integration tests for the credential store
//!
//! Covers loading, re-authentication and the logout path that clears the
//! credential and identity together.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use inkstat_domain::{
    CredentialEvent, CredentialSnapshot, Identity, InkstatError, SessionToken, StoredCredential,
};
use support::{identity, Harness, MemoryPersistence, ScriptedExchangeApi, COOKIE_DOMAIN};

fn seeded() -> MemoryPersistence {
    MemoryPersistence::seeded(StoredCredential::new(SessionToken::new("persisted"), Some(identity())))
}

#[tokio::test]
async fn test_init_loads_persisted_credential() {
    let harness = Harness::with_persistence(ScriptedExchangeApi::succeeding(), seeded());

    let snapshot = harness.store.init().await.unwrap();

    assert!(snapshot.is_signed_in());
    assert_eq!(harness.store.get(), Some(SessionToken::new("persisted")));
    assert_eq!(harness.store.identity(), Some(identity()));
}

#[tokio::test]
async fn test_init_without_record_is_signed_out() {
    let harness = Harness::new(ScriptedExchangeApi::succeeding());
    assert_eq!(harness.store.init().await.unwrap(), CredentialSnapshot::default());
}

/// Logout clears credential and identity in one update.
///
/// Assertions:
/// - A subscriber never sees an identity without a credential.
/// - The persisted record is deleted and provider cookies purged.
/// - Exactly one logout event is emitted.
#[tokio::test]
async fn test_clear_removes_credential_and_identity_together() {
    let harness = Harness::with_persistence(ScriptedExchangeApi::succeeding(), seeded());
    harness.store.init().await.unwrap();
    let mut events = harness.credential_events.subscribe();
    let mut rx = harness.store.subscribe();
    rx.borrow_and_update();

    assert!(harness.store.clear().await.unwrap());

    rx.changed().await.unwrap();
    let observed = rx.borrow_and_update().clone();
    assert!(observed.session_token.is_none());
    assert!(observed.identity.is_none());
    assert!(!rx.has_changed().unwrap());

    assert!(harness.persistence.stored().is_none());
    assert_eq!(harness.cookies.purged(), vec![COOKIE_DOMAIN.to_string()]);
    assert_eq!(events.recv().await.unwrap(), CredentialEvent::LoggedOut);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_clear_when_signed_out_emits_nothing() {
    let harness = Harness::new(ScriptedExchangeApi::succeeding());
    let mut events = harness.credential_events.subscribe();

    assert!(!harness.store.clear().await.unwrap());
    assert!(events.try_recv().is_err());
    assert_eq!(harness.persistence.deletes.load(Ordering::SeqCst), 1);
}

/// A failing keychain delete still logs the user out in memory.
#[tokio::test]
async fn test_clear_with_failing_delete_still_clears_memory() {
    let persistence = seeded();
    persistence.fail_delete.store(true, Ordering::SeqCst);
    let harness = Harness::with_persistence(ScriptedExchangeApi::succeeding(), persistence);
    harness.store.init().await.unwrap();
    let mut events = harness.credential_events.subscribe();

    let err = harness.store.clear().await.unwrap_err();

    assert!(matches!(err, InkstatError::Storage(_)));
    assert!(harness.store.snapshot().is_empty());
    assert_eq!(events.recv().await.unwrap(), CredentialEvent::LoggedOut);
}

#[tokio::test]
async fn test_update_none_is_logout() {
    let harness = Harness::with_persistence(ScriptedExchangeApi::succeeding(), seeded());
    harness.store.init().await.unwrap();

    harness.store.update(None).await.unwrap();

    assert!(harness.store.snapshot().is_empty());
    assert!(harness.persistence.stored().is_none());
}

#[tokio::test]
async fn test_update_some_keeps_identity() {
    let harness = Harness::with_persistence(ScriptedExchangeApi::succeeding(), seeded());
    harness.store.init().await.unwrap();
    let mut events = harness.credential_events.subscribe();

    harness.store.update(Some(SessionToken::new("rotated"))).await.unwrap();

    assert_eq!(harness.store.get(), Some(SessionToken::new("rotated")));
    assert_eq!(harness.store.identity(), Some(identity()));
    assert_eq!(events.recv().await.unwrap(), CredentialEvent::SignedIn);
    assert_eq!(harness.persistence.stored().unwrap().session_token.as_str(), "rotated");
}

#[tokio::test]
async fn test_set_rejects_empty_token() {
    let harness = Harness::new(ScriptedExchangeApi::succeeding());
    let err = harness.store.set(SessionToken::new(""), None).await.unwrap_err();
    assert!(matches!(err, InkstatError::InvalidInput(_)));
    assert_eq!(harness.persistence.save_count(), 0);
}

#[tokio::test]
async fn test_set_identity_requires_credential() {
    let harness = Harness::new(ScriptedExchangeApi::succeeding());
    let identity = Identity { account_id: "x".into(), nickname: None, linked_game: false };

    let err = harness.store.set_identity(identity.clone()).await.unwrap_err();
    assert!(matches!(err, InkstatError::NotFound(_)));

    harness.store.set(SessionToken::new("s"), None).await.unwrap();
    harness.store.set_identity(identity.clone()).await.unwrap();
    assert_eq!(harness.store.identity(), Some(identity));
}

/// Concurrent logouts and logins serialize; the final state is consistent.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_never_split_snapshot() {
    let harness = Harness::new(ScriptedExchangeApi::succeeding());
    let store = Arc::clone(&harness.store);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                store.set(SessionToken::new(format!("s{i}")), Some(identity())).await.unwrap();
            } else {
                store.clear().await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.session_token.is_some(), snapshot.identity.is_some());
    assert_eq!(harness.persistence.stored().is_some(), snapshot.is_signed_in());
}
