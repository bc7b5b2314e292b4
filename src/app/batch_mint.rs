//! Submits one batch mint transaction per orchestration.

use crate::domain::error::MintError;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Signing material of the minting authority. The end user never signs the mint.
#[derive(Clone)]
pub enum AuthorityCredential {
    /// Path to a JSON keypair file (Solana CLI format).
    KeypairFile(PathBuf),
    /// The same JSON byte-array format, held inline.
    KeypairJson(String),
}

impl fmt::Debug for AuthorityCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorityCredential::KeypairFile(path) => {
                f.debug_tuple("KeypairFile").field(path).finish()
            }
            AuthorityCredential::KeypairJson(_) => f.write_str("KeypairJson(<redacted>)"),
        }
    }
}

/// Chain-side collaborator that mints every CID to `recipient` in one transaction.
///
/// Implementations own their own request timeout; the caller waits for a
/// confirmed transaction hash or an error.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Most CIDs a single transaction can carry.
    fn max_batch_len(&self) -> usize;

    /// Rejects a recipient the chain cannot address.
    fn check_recipient(&self, recipient: &str) -> anyhow::Result<()>;

    /// Rejects a batch the chain would refuse no matter how often it is sent.
    fn check_batch(&self, cids: &[String]) -> anyhow::Result<()> {
        if cids.len() > self.max_batch_len() {
            return Err(anyhow::anyhow!(
                "batch of {} values exceeds the per-transaction limit of {}",
                cids.len(),
                self.max_batch_len()
            ));
        }
        Ok(())
    }

    async fn submit_batch_mint(
        &self,
        recipient: &str,
        cids: &[String],
        authority: &AuthorityCredential,
        chain_id: u64,
    ) -> anyhow::Result<String>;
}

/// Binds a chain provider to the minting authority and the chain it mints on.
#[derive(Clone)]
pub struct BatchMintExecutor {
    provider: Arc<dyn ChainProvider>,
    authority: AuthorityCredential,
    chain_id: u64,
}

impl BatchMintExecutor {
    pub fn new(provider: Arc<dyn ChainProvider>, authority: AuthorityCredential, chain_id: u64) -> Self {
        Self {
            provider,
            authority,
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Fails with [`MintError::InvalidRecipient`] for a wallet the chain cannot address.
    pub fn check_recipient(&self, recipient: &str) -> Result<(), MintError> {
        self.provider
            .check_recipient(recipient)
            .map_err(|e| MintError::InvalidRecipient(e.to_string()))
    }

    /// Fails with [`MintError::InvalidInput`] for a batch that can never be submitted.
    pub fn check_batch(&self, cids: &[String]) -> Result<(), MintError> {
        self.provider
            .check_batch(cids)
            .map_err(|e| MintError::InvalidInput(e.to_string()))
    }

    /// Sends the batch and returns its transaction hash. Never retries.
    pub async fn execute(&self, recipient: &str, cids: &[String]) -> Result<String, MintError> {
        if cids.is_empty() {
            return Err(MintError::InvalidInput(
                "refusing to submit an empty batch mint".to_string(),
            ));
        }

        match self
            .provider
            .submit_batch_mint(recipient, cids, &self.authority, self.chain_id)
            .await
        {
            Ok(tx_hash) => {
                info!(recipient, count = cids.len(), tx_hash = %tx_hash, "batch mint confirmed");
                Ok(tx_hash)
            }
            Err(e) => {
                warn!(recipient, count = cids.len(), error = %e, "batch mint rejected");
                Err(MintError::ChainSubmissionFailed(e))
            }
        }
    }
}
