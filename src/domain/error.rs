//! Error taxonomy for the mint operation.

/// Failures of the mint operation and its steps.
///
/// An empty batch is not an error, see [`crate::domain::mint::MintOutcome::EmptyBatch`].
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    /// Malformed project or request data. Operator-facing, never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The wallet address cannot receive a mint on the configured chain.
    #[error("Invalid recipient wallet: {0}")]
    InvalidRecipient(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// Another mint for the same identity has not finished yet.
    #[error("A mint is already in progress for {0}")]
    AlreadyInFlight(String),

    /// Project, catalog or ledger could not be read. Nothing was minted.
    #[error("Mint state unavailable: {0}")]
    SourceUnavailable(#[source] anyhow::Error),

    /// The batch mint transaction was rejected or never confirmed. Nothing was recorded.
    #[error("Chain submission failed: {0}")]
    ChainSubmissionFailed(#[source] anyhow::Error),

    /// Tokens were minted in `tx_hash` but the ledger could not be updated.
    #[error("Ledger sync failed for transaction {tx_hash}: {source}")]
    LedgerSyncFailed {
        tx_hash: String,
        #[source]
        source: anyhow::Error,
    },

    /// The detached submit/sync task stopped without reporting. The chain must be
    /// checked before anything is retried.
    #[error("Mint task interrupted: {0}")]
    Interrupted(String),
}

impl MintError {
    /// True when a retry of the whole operation cannot double-mint.
    pub fn is_safe_to_retry(&self) -> bool {
        matches!(
            self,
            MintError::AlreadyInFlight(_)
                | MintError::SourceUnavailable(_)
                | MintError::ChainSubmissionFailed(_)
        )
    }
}
