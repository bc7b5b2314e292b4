//! The mint operation: resolve eligibility, submit one batch, record the result.
//!
//! Each call runs `Resolving -> Submitting -> Syncing` at most once and returns
//! its terminal state:
//! - nothing eligible: [`MintOutcome::EmptyBatch`], no transaction is sent;
//! - a batch or wallet the chain would always refuse: [`MintError::InvalidInput`]
//!   or [`MintError::InvalidRecipient`], checked before anything is sent;
//! - chain rejection: [`MintError::ChainSubmissionFailed`], nothing is recorded;
//! - recording failure after a confirmed mint: [`MintOutcome::PartialSuccess`];
//! - otherwise [`MintOutcome::Done`].
//!
//! Calls for the same identity are serialized by a single-flight guard. Once a
//! batch is being submitted, the rest of the run happens on a detached task so
//! dropping the caller cannot strand a broadcast transaction without its sync.

use crate::app::batch_mint::BatchMintExecutor;
use crate::app::ledger_sync::{LedgerSync, SyncRetryPolicy};
use crate::domain::eligibility::resolve;
use crate::domain::error::MintError;
use crate::domain::mint::{FlightGuard, MintOutcome, MintPhase, MintReceipt, SingleFlight};
use crate::domain::model::{normalize_value_name, MintBatch};
use crate::storage::{ProjectSource, UserMintRecordSource, ValueCatalogSource};
use std::sync::Arc;
use tracing::{error, info, warn};

/// A user's request to claim the values of one project.
///
/// The caller has already authenticated `identity` and checked that `recipient`
/// is a wallet linked to it.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub project_id: String,
    pub identity: String,
    pub recipient: String,
}

pub struct MintService {
    projects: Arc<dyn ProjectSource>,
    catalog: Arc<dyn ValueCatalogSource>,
    ledger: Arc<dyn UserMintRecordSource>,
    executor: Arc<BatchMintExecutor>,
    ledger_sync: Arc<LedgerSync>,
    flights: SingleFlight,
    sync_policy: SyncRetryPolicy,
}

impl MintService {
    pub fn new(
        projects: Arc<dyn ProjectSource>,
        catalog: Arc<dyn ValueCatalogSource>,
        ledger: Arc<dyn UserMintRecordSource>,
        executor: BatchMintExecutor,
        sync_policy: SyncRetryPolicy,
    ) -> Self {
        let ledger_sync = Arc::new(LedgerSync::new(catalog.clone(), ledger.clone()));
        Self {
            projects,
            catalog,
            ledger,
            executor: Arc::new(executor),
            ledger_sync,
            flights: SingleFlight::new(),
            sync_policy,
        }
    }

    pub fn is_in_flight(&self, identity: &str) -> bool {
        self.flights.is_in_flight(identity.trim())
    }

    /// Runs the mint operation for `request`.
    pub async fn mint(&self, request: MintRequest) -> Result<MintOutcome, MintError> {
        let identity = request.identity.trim().to_string();
        let recipient = request.recipient.trim().to_string();
        if identity.is_empty() {
            return Err(MintError::InvalidInput("user identity is empty".to_string()));
        }
        if recipient.is_empty() {
            return Err(MintError::InvalidInput("recipient wallet is empty".to_string()));
        }
        self.executor.check_recipient(&recipient)?;

        let guard = self
            .flights
            .try_acquire(&identity)
            .ok_or_else(|| MintError::AlreadyInFlight(identity.clone()))?;

        info!(phase = %MintPhase::Resolving, project_id = %request.project_id, identity = %identity, "mint requested");
        let batch = self.resolve_batch(&request.project_id, &identity).await?;

        if batch.is_empty() {
            info!(project_id = %request.project_id, identity = %identity, "nothing new to mint");
            return Ok(MintOutcome::EmptyBatch);
        }
        self.executor.check_batch(&batch.cids).map_err(|e| {
            warn!(project_id = %request.project_id, count = batch.len(), error = %e, "batch cannot be submitted");
            e
        })?;

        let run = SubmitAndSync {
            executor: self.executor.clone(),
            ledger_sync: self.ledger_sync.clone(),
            sync_policy: self.sync_policy.clone(),
            identity,
            recipient,
            batch,
            _guard: guard,
        };
        tokio::spawn(run.run())
            .await
            .map_err(|e| MintError::Interrupted(e.to_string()))?
    }

    /// Re-runs only the sync step for a mint that already landed on-chain.
    pub async fn reconcile(
        &self,
        identity: &str,
        values: &[String],
        tx_hash: &str,
    ) -> Result<(), MintError> {
        let identity = identity.trim();
        let tx_hash = tx_hash.trim();
        if identity.is_empty() || tx_hash.is_empty() {
            return Err(MintError::InvalidInput(
                "identity and transaction hash are required".to_string(),
            ));
        }
        let values: Vec<String> = values
            .iter()
            .map(|v| normalize_value_name(v))
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Err(MintError::InvalidInput("no values to reconcile".to_string()));
        }

        let _guard = self
            .flights
            .try_acquire(identity)
            .ok_or_else(|| MintError::AlreadyInFlight(identity.to_string()))?;

        info!(identity, tx_hash, count = values.len(), "reconciling ledger");
        self.ledger_sync.commit(identity, &values, tx_hash).await
    }

    /// Fetches fresh project, catalog and ledger state and picks the eligible values.
    async fn resolve_batch(&self, project_id: &str, identity: &str) -> Result<MintBatch, MintError> {
        let project = self
            .projects
            .get_project(project_id)
            .await
            .map_err(MintError::SourceUnavailable)?
            .ok_or_else(|| MintError::ProjectNotFound(project_id.to_string()))?;

        let mut catalog = self
            .catalog
            .get_all_values()
            .await
            .map_err(MintError::SourceUnavailable)?;

        // A catalog write can lag the user's ledger after a partial sync; the
        // ledger counts as proof of minting too.
        if let Some(user) = self
            .ledger
            .get_user(identity)
            .await
            .map_err(MintError::SourceUnavailable)?
        {
            for minted in &user.minted_values {
                catalog.record_minter(&minted.value, identity);
            }
        }

        resolve(&project.values, &catalog, identity).map_err(|e| {
            warn!(project_id, error = %e, "project data rejected");
            e
        })
    }
}

/// The non-cancellable tail of a mint.
struct SubmitAndSync {
    executor: Arc<BatchMintExecutor>,
    ledger_sync: Arc<LedgerSync>,
    sync_policy: SyncRetryPolicy,
    identity: String,
    recipient: String,
    batch: MintBatch,
    _guard: FlightGuard,
}

impl SubmitAndSync {
    async fn run(mut self) -> Result<MintOutcome, MintError> {
        info!(
            phase = %MintPhase::Submitting,
            identity = %self.identity,
            values = ?self.batch.requested_values,
            chain_id = self.executor.chain_id(),
            "submitting batch mint"
        );
        let tx_hash = self.executor.execute(&self.recipient, &self.batch.cids).await?;
        self.batch.transaction_hash = Some(tx_hash.clone());

        let receipt = MintReceipt {
            identity: self.identity.clone(),
            recipient: self.recipient.clone(),
            values: self.batch.requested_values.clone(),
            tx_hash: tx_hash.clone(),
        };

        info!(phase = %MintPhase::Syncing, identity = %self.identity, tx_hash = %tx_hash, "recording mint");
        match self
            .ledger_sync
            .commit_with_retry(
                &self.identity,
                &self.batch.requested_values,
                &tx_hash,
                &self.sync_policy,
            )
            .await
        {
            Ok(()) => Ok(MintOutcome::Done(receipt)),
            Err(e) => {
                error!(
                    identity = %self.identity,
                    tx_hash = %tx_hash,
                    values = ?self.batch.requested_values,
                    error = %e,
                    "minted on-chain but ledger sync failed; manual reconciliation required"
                );
                Ok(MintOutcome::PartialSuccess { receipt, error: e })
            }
        }
    }
}
