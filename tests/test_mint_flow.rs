//! Mint orchestration against in-memory stores and a scripted chain.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use value_minter::{
    MintError, MintOutcome, MintRequest, SyncRetryPolicy, UserMintRecordSource,
    ValueCatalogSource,
};

fn request(identity: &str) -> MintRequest {
    MintRequest {
        project_id: PROJECT_ID.to_string(),
        identity: identity.to_string(),
        recipient: WALLET.to_string(),
    }
}

#[tokio::test]
async fn mints_only_values_the_user_does_not_hold() {
    let store = seeded_store().await;
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(store.clone(), chain.clone(), SyncRetryPolicy::no_retry());

    let outcome = service.mint(request(USER)).await.unwrap();

    let MintOutcome::Done(receipt) = outcome else {
        panic!("expected Done, got {:?}", outcome);
    };
    assert_eq!(receipt.values, vec!["integrity".to_string()]);
    assert_eq!(receipt.tx_hash, "0xabc");
    assert_eq!(receipt.recipient, WALLET);

    assert_eq!(
        chain.calls(),
        vec![SubmitCall {
            recipient: WALLET.to_string(),
            cids: vec!["cid1".to_string()],
            chain_id: CHAIN_ID,
        }]
    );

    let user = store.get_user(USER).await.unwrap().expect("ledger record");
    assert_eq!(user.minted_values.len(), 1);
    assert_eq!(user.minted_values[0].value, "integrity");
    assert_eq!(user.minted_values[0].tx_hash, "0xabc");

    let catalog = store.get_all_values().await.unwrap();
    let integrity = catalog.get("integrity").unwrap();
    assert_eq!(
        integrity.minters.iter().filter(|m| m.as_str() == USER).count(),
        1
    );
}

#[tokio::test]
async fn empty_batch_skips_the_chain() {
    let store = seeded_store().await;
    store.add_minter("integrity", USER).await.unwrap();
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(store.clone(), chain.clone(), SyncRetryPolicy::no_retry());

    let outcome = service.mint(request(USER)).await.unwrap();

    assert!(matches!(outcome, MintOutcome::EmptyBatch));
    assert_eq!(outcome.status(), "empty_batch");
    assert!(outcome.receipt().is_none());
    assert!(chain.calls().is_empty());
    assert!(store.get_user(USER).await.unwrap().is_none());
}

#[tokio::test]
async fn repeated_mints_never_double_mint() {
    let store = seeded_store().await;
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(store.clone(), chain.clone(), SyncRetryPolicy::no_retry());

    assert!(matches!(
        service.mint(request(USER)).await.unwrap(),
        MintOutcome::Done(_)
    ));
    for _ in 0..3 {
        assert!(matches!(
            service.mint(request(USER)).await.unwrap(),
            MintOutcome::EmptyBatch
        ));
    }

    assert_eq!(chain.calls().len(), 1);
    let user = store.get_user(USER).await.unwrap().unwrap();
    assert_eq!(
        user.minted_values
            .iter()
            .filter(|v| v.value == "integrity")
            .count(),
        1
    );
}

#[tokio::test]
async fn a_new_user_gets_every_catalogued_value_in_project_order() {
    let store = seeded_store().await;
    let chain = Arc::new(ScriptedChain::confirming("0xdef"));
    let service = service_over(store.clone(), chain.clone(), SyncRetryPolicy::no_retry());

    let outcome = service.mint(request("other@x.com")).await.unwrap();

    let receipt = outcome.receipt().expect("receipt").clone();
    assert_eq!(receipt.values, vec!["integrity", "speed"]);
    assert_eq!(chain.calls()[0].cids, vec!["cid1", "cid2"]);

    let catalog = store.get_all_values().await.unwrap();
    assert!(catalog.get("speed").unwrap().is_minted_by("other@x.com"));
    assert!(catalog.get("speed").unwrap().is_minted_by(USER));
}

#[tokio::test]
async fn chain_failure_leaves_the_ledger_untouched() {
    let store = seeded_store().await;
    let chain = Arc::new(ScriptedChain::rejecting("custom program error: 0x1770"));
    let service = service_over(store.clone(), chain.clone(), SyncRetryPolicy::default());

    let err = service.mint(request(USER)).await.unwrap_err();

    assert!(matches!(err, MintError::ChainSubmissionFailed(_)));
    assert!(err.is_safe_to_retry());
    assert_eq!(chain.calls().len(), 1);
    assert!(store.get_user(USER).await.unwrap().is_none());
    let catalog = store.get_all_values().await.unwrap();
    assert!(!catalog.get("integrity").unwrap().is_minted_by(USER));
    assert!(!service.is_in_flight(USER));
}

#[tokio::test]
async fn sync_failure_after_mint_is_partial_success() {
    let flaky = FlakyStore::new(seeded_store().await);
    flaky.fail_ledger_writes(1);
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = flaky.service(chain.clone(), SyncRetryPolicy::no_retry());

    let outcome = service.mint(request(USER)).await.unwrap();

    assert_eq!(outcome.status(), "partial_success");
    let MintOutcome::PartialSuccess { receipt, error } = outcome else {
        panic!("expected PartialSuccess");
    };
    assert_eq!(receipt.tx_hash, "0xabc");
    match error {
        MintError::LedgerSyncFailed { tx_hash, .. } => assert_eq!(tx_hash, "0xabc"),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(flaky.inner.get_user(USER).await.unwrap().is_none());

    // Only the sync step is replayed; the chain is not called again.
    service
        .reconcile(USER, &receipt.values, &receipt.tx_hash)
        .await
        .unwrap();
    let user = flaky.inner.get_user(USER).await.unwrap().unwrap();
    assert_eq!(user.minted_values[0].tx_hash, "0xabc");
    assert!(matches!(
        service.mint(request(USER)).await.unwrap(),
        MintOutcome::EmptyBatch
    ));
    assert_eq!(chain.calls().len(), 1);
}

#[tokio::test]
async fn sync_retry_recovers_from_transient_failures() {
    let flaky = FlakyStore::new(seeded_store().await);
    flaky.fail_ledger_writes(2);
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = flaky.service(
        chain.clone(),
        SyncRetryPolicy::new(3, Duration::from_millis(1)),
    );

    let outcome = service.mint(request(USER)).await.unwrap();

    assert!(matches!(outcome, MintOutcome::Done(_)));
    assert_eq!(chain.calls().len(), 1);
    let user = flaky.inner.get_user(USER).await.unwrap().unwrap();
    assert_eq!(user.minted_values.len(), 1);
}

#[tokio::test]
async fn ledger_entries_count_as_minted_when_the_catalog_lags() {
    let store = seeded_store().await;
    store
        .append_minted_values(
            USER,
            &[value_minter::MintEntry {
                value: "integrity".to_string(),
                tx_hash: "0xold".to_string(),
            }],
        )
        .await
        .unwrap();
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(store, chain.clone(), SyncRetryPolicy::no_retry());

    let outcome = service.mint(request(USER)).await.unwrap();

    assert!(matches!(outcome, MintOutcome::EmptyBatch));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn unknown_project_is_reported() {
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(seeded_store().await, chain.clone(), SyncRetryPolicy::no_retry());

    let err = service
        .mint(MintRequest {
            project_id: "999".to_string(),
            ..request(USER)
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::ProjectNotFound(ref id) if id == "999"));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn unreachable_catalog_fails_before_submission() {
    let flaky = FlakyStore::new(seeded_store().await);
    flaky.take_catalog_down();
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = flaky.service(chain.clone(), SyncRetryPolicy::no_retry());

    let err = service.mint(request(USER)).await.unwrap_err();

    assert!(matches!(err, MintError::SourceUnavailable(_)));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn blank_identity_or_wallet_is_rejected() {
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(seeded_store().await, chain.clone(), SyncRetryPolicy::no_retry());

    let err = service.mint(request("   ")).await.unwrap_err();
    assert!(matches!(err, MintError::InvalidInput(_)));

    let err = service
        .mint(MintRequest {
            recipient: String::new(),
            ..request(USER)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::InvalidInput(_)));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn invalid_project_values_surface_as_invalid_input() {
    let store = seeded_store().await;
    store
        .upsert_project(value_minter::Project {
            id: "7".to_string(),
            name: "Broken".to_string(),
            values: vec!["Integrity".to_string(), "  ".to_string()],
            contract_address: String::new(),
            chain_id: 1,
            category: Default::default(),
        })
        .await;
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(store, chain.clone(), SyncRetryPolicy::no_retry());

    let err = service
        .mint(MintRequest {
            project_id: "7".to_string(),
            ..request(USER)
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::InvalidInput(_)));
    assert!(!err.is_safe_to_retry());
    assert!(chain.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_mint_for_the_same_identity_is_rejected() {
    let release = Arc::new(Notify::new());
    let chain = Arc::new(ScriptedChain::held("0xabc", release.clone()));
    let store = seeded_store().await;
    let service = Arc::new(service_over(
        store.clone(),
        chain.clone(),
        SyncRetryPolicy::no_retry(),
    ));

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.mint(request(USER)).await })
    };
    chain.started.notified().await;
    assert!(service.is_in_flight(USER));

    let err = service.mint(request(USER)).await.unwrap_err();
    assert!(matches!(err, MintError::AlreadyInFlight(_)));
    assert!(err.is_safe_to_retry());

    release.notify_one();
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, MintOutcome::Done(_)));
    assert!(!service.is_in_flight(USER));
    assert_eq!(chain.calls().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_the_caller_after_submission_still_syncs() {
    let release = Arc::new(Notify::new());
    let chain = Arc::new(ScriptedChain::held("0xabc", release.clone()));
    let store = seeded_store().await;
    let service = Arc::new(service_over(
        store.clone(),
        chain.clone(),
        SyncRetryPolicy::no_retry(),
    ));

    let caller = {
        let service = service.clone();
        tokio::spawn(async move { service.mint(request(USER)).await })
    };
    chain.started.notified().await;
    caller.abort();
    assert!(caller.await.unwrap_err().is_cancelled());

    release.notify_one();
    let mut synced = false;
    for _ in 0..100 {
        if store.get_user(USER).await.unwrap().is_some() {
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(synced, "ledger was not synced after the caller went away");

    let catalog = store.get_all_values().await.unwrap();
    assert!(catalog.get("integrity").unwrap().is_minted_by(USER));
}

#[tokio::test]
async fn reconcile_requires_values_and_a_transaction() {
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(seeded_store().await, chain, SyncRetryPolicy::no_retry());

    let err = service
        .reconcile(USER, &["integrity".to_string()], " ")
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::InvalidInput(_)));

    let err = service.reconcile(USER, &[], "0xabc").await.unwrap_err();
    assert!(matches!(err, MintError::InvalidInput(_)));
}

#[tokio::test]
async fn batch_over_the_transaction_limit_is_rejected_before_submission() {
    let store = seeded_store().await;
    let names: Vec<String> = (0..=BATCH_LIMIT).map(|i| format!("Value{}", i)).collect();
    for (i, name) in names.iter().enumerate() {
        store.upsert_value(name, &format!("cid-v{}", i)).await.unwrap();
    }
    store
        .upsert_project(value_minter::Project {
            id: "11".to_string(),
            name: "Crowded".to_string(),
            values: names,
            contract_address: String::new(),
            chain_id: 1,
            category: Default::default(),
        })
        .await;
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(store.clone(), chain.clone(), SyncRetryPolicy::no_retry());

    for _ in 0..2 {
        let err = service
            .mint(MintRequest {
                project_id: "11".to_string(),
                ..request("new@x.com")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::InvalidInput(_)));
        assert!(!err.is_safe_to_retry());
    }

    assert!(chain.calls().is_empty());
    assert!(!service.is_in_flight("new@x.com"));
    assert!(store.get_user("new@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn unaddressable_wallet_is_rejected_before_submission() {
    let chain = Arc::new(ScriptedChain::confirming("0xabc"));
    let service = service_over(seeded_store().await, chain.clone(), SyncRetryPolicy::no_retry());

    let err = service
        .mint(MintRequest {
            recipient: "0x00000000000000000000000000000000000000aa".to_string(),
            ..request(USER)
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::InvalidRecipient(_)));
    assert!(!err.is_safe_to_retry());
    assert!(chain.calls().is_empty());
    assert!(!service.is_in_flight(USER));
}
