//! Records a confirmed batch mint in the user ledger and the value catalog.

use crate::domain::error::MintError;
use crate::domain::model::{normalize_value_name, MintEntry};
use crate::storage::{UserMintRecordSource, ValueCatalogSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How often the sync step alone may be retried after a persistence failure.
#[derive(Debug, Clone)]
pub struct SyncRetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub attempts: u32,
    /// Delay before the second attempt; grows linearly afterwards.
    pub backoff: Duration,
}

impl SyncRetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for SyncRetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250))
    }
}

pub struct LedgerSync {
    catalog: Arc<dyn ValueCatalogSource>,
    ledger: Arc<dyn UserMintRecordSource>,
}

impl LedgerSync {
    pub fn new(catalog: Arc<dyn ValueCatalogSource>, ledger: Arc<dyn UserMintRecordSource>) -> Self {
        Self { catalog, ledger }
    }

    /// Writes `values` minted in `tx_hash` to the user's record and adds the user
    /// to each value's minters.
    ///
    /// Both writes are upserts, so committing the same arguments again changes nothing.
    /// `identity` is trimmed and must not be blank.
    pub async fn commit(
        &self,
        identity: &str,
        values: &[String],
        tx_hash: &str,
    ) -> Result<(), MintError> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(MintError::InvalidInput("user identity is empty".to_string()));
        }
        if values.is_empty() {
            return Ok(());
        }

        let entries: Vec<MintEntry> = values
            .iter()
            .map(|value| MintEntry {
                value: normalize_value_name(value),
                tx_hash: tx_hash.to_string(),
            })
            .collect();

        self.ledger
            .append_minted_values(identity, &entries)
            .await
            .map_err(|source| MintError::LedgerSyncFailed {
                tx_hash: tx_hash.to_string(),
                source,
            })?;

        for entry in &entries {
            self.catalog
                .add_minter(&entry.value, identity)
                .await
                .map_err(|source| MintError::LedgerSyncFailed {
                    tx_hash: tx_hash.to_string(),
                    source,
                })?;
        }

        debug!(identity, tx_hash, count = entries.len(), "ledger synced");
        Ok(())
    }

    /// [`LedgerSync::commit`] repeated under `policy`. Returns the last failure;
    /// invalid input is returned at once.
    pub async fn commit_with_retry(
        &self,
        identity: &str,
        values: &[String],
        tx_hash: &str,
        policy: &SyncRetryPolicy,
    ) -> Result<(), MintError> {
        let mut attempt = 1;
        loop {
            match self.commit(identity, values, tx_hash).await {
                Ok(()) => return Ok(()),
                Err(e @ MintError::InvalidInput(_)) => return Err(e),
                Err(e) if attempt < policy.attempts => {
                    warn!(identity, tx_hash, attempt, error = %e, "ledger sync failed, retrying");
                    tokio::time::sleep(policy.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
