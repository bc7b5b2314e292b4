//! Shared fixtures: a seeded in-memory store, a scripted chain and a store that fails on demand.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use value_minter::{
    AuthorityCredential, BatchMintExecutor, CatalogSnapshot, ChainProvider, InMemoryMintStore,
    MintEntry, MintService, Project, ProjectCategory, SyncRetryPolicy, UserMintRecord,
    UserMintRecordSource, ValueCatalogSource, ValueRecord,
};

pub const USER: &str = "user@x.com";
pub const WALLET: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
pub const PROJECT_ID: &str = "42";
pub const CHAIN_ID: u64 = 101;

/// Project 42 declares `Integrity` and `Speed`; `speed` is already minted by [`USER`].
pub async fn seeded_store() -> InMemoryMintStore {
    let store = InMemoryMintStore::new();
    store
        .upsert_project(Project {
            id: PROJECT_ID.to_string(),
            name: "Acme Labs".to_string(),
            values: vec!["Integrity".to_string(), "Speed".to_string()],
            contract_address: "0x00000000000000000000000000000000000000aa".to_string(),
            chain_id: 1,
            category: ProjectCategory::Token,
        })
        .await;
    store.upsert_value("integrity", "cid1").await.unwrap();
    store.upsert_value("speed", "cid2").await.unwrap();
    store.add_minter("speed", USER).await.unwrap();
    store
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCall {
    pub recipient: String,
    pub cids: Vec<String>,
    pub chain_id: u64,
}

/// Chain provider that records every submission and answers from a script.
pub struct ScriptedChain {
    calls: Mutex<Vec<SubmitCall>>,
    tx_hash: String,
    failure: Option<String>,
    hold: Option<Arc<Notify>>,
    batch_limit: usize,
    pub started: Arc<Notify>,
}

pub const BATCH_LIMIT: usize = 10;

impl ScriptedChain {
    pub fn confirming(tx_hash: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            tx_hash: tx_hash.to_string(),
            failure: None,
            hold: None,
            batch_limit: BATCH_LIMIT,
            started: Arc::new(Notify::new()),
        }
    }

    pub fn rejecting(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::confirming("unused")
        }
    }

    /// Submissions block until `release` is notified.
    pub fn held(tx_hash: &str, release: Arc<Notify>) -> Self {
        Self {
            hold: Some(release),
            ..Self::confirming(tx_hash)
        }
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainProvider for ScriptedChain {
    fn max_batch_len(&self) -> usize {
        self.batch_limit
    }

    /// Accepts base58 strings of a plausible address length.
    fn check_recipient(&self, recipient: &str) -> anyhow::Result<()> {
        let base58 = recipient
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !"0OIl".contains(c));
        if base58 && (32..=44).contains(&recipient.len()) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("'{}' is not an address", recipient))
        }
    }

    async fn submit_batch_mint(
        &self,
        recipient: &str,
        cids: &[String],
        _authority: &AuthorityCredential,
        chain_id: u64,
    ) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(SubmitCall {
            recipient: recipient.to_string(),
            cids: cids.to_vec(),
            chain_id,
        });
        self.started.notify_one();
        if let Some(release) = &self.hold {
            release.notified().await;
        }
        match &self.failure {
            Some(reason) => Err(anyhow::anyhow!("{}", reason)),
            None => Ok(self.tx_hash.clone()),
        }
    }
}

pub fn test_authority() -> AuthorityCredential {
    AuthorityCredential::KeypairJson("[0,0,0]".to_string())
}

pub fn service_over(
    store: InMemoryMintStore,
    chain: Arc<ScriptedChain>,
    policy: SyncRetryPolicy,
) -> MintService {
    let store = Arc::new(store);
    MintService::new(
        store.clone(),
        store.clone(),
        store,
        BatchMintExecutor::new(chain, test_authority(), CHAIN_ID),
        policy,
    )
}

/// Wraps an in-memory store and fails writes or reads while armed.
#[derive(Clone)]
pub struct FlakyStore {
    pub inner: InMemoryMintStore,
    ledger_write_failures: Arc<AtomicU32>,
    catalog_down: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: InMemoryMintStore) -> Self {
        Self {
            inner,
            ledger_write_failures: Arc::new(AtomicU32::new(0)),
            catalog_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The next `n` ledger writes fail.
    pub fn fail_ledger_writes(&self, n: u32) {
        self.ledger_write_failures.store(n, Ordering::SeqCst);
    }

    pub fn take_catalog_down(&self) {
        self.catalog_down.store(true, Ordering::SeqCst);
    }

    pub fn service(&self, chain: Arc<ScriptedChain>, policy: SyncRetryPolicy) -> MintService {
        let store = Arc::new(self.clone());
        MintService::new(
            Arc::new(self.inner.clone()),
            store.clone(),
            store,
            BatchMintExecutor::new(chain, test_authority(), CHAIN_ID),
            policy,
        )
    }
}

#[async_trait]
impl ValueCatalogSource for FlakyStore {
    async fn get_all_values(&self) -> anyhow::Result<CatalogSnapshot> {
        if self.catalog_down.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("catalog store unreachable"));
        }
        self.inner.get_all_values().await
    }

    async fn add_minter(&self, value: &str, identity: &str) -> anyhow::Result<()> {
        self.inner.add_minter(value, identity).await
    }

    async fn upsert_value(&self, value: &str, cid: &str) -> anyhow::Result<ValueRecord> {
        self.inner.upsert_value(value, cid).await
    }
}

#[async_trait]
impl UserMintRecordSource for FlakyStore {
    async fn get_user(&self, identity: &str) -> anyhow::Result<Option<UserMintRecord>> {
        self.inner.get_user(identity).await
    }

    async fn append_minted_values(
        &self,
        identity: &str,
        entries: &[MintEntry],
    ) -> anyhow::Result<()> {
        let armed = self
            .ledger_write_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(anyhow::anyhow!("ledger write timed out"));
        }
        self.inner.append_minted_values(identity, entries).await
    }
}
