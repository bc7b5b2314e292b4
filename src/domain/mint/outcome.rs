//! Terminal states of a mint and the notification each one produces.

use crate::domain::error::MintError;
use serde::Serialize;

/// Phases a mint passes through. Only used for logging; nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MintPhase {
    Resolving,
    Submitting,
    Syncing,
}

impl std::fmt::Display for MintPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MintPhase::Resolving => "resolving",
            MintPhase::Submitting => "submitting",
            MintPhase::Syncing => "syncing",
        };
        f.write_str(label)
    }
}

/// What was minted, to whom, and in which transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintReceipt {
    pub identity: String,
    pub recipient: String,
    pub values: Vec<String>,
    pub tx_hash: String,
}

/// Successful terminal states. Failures are returned as [`MintError`].
#[derive(Debug)]
pub enum MintOutcome {
    /// Nothing new to mint; no transaction was sent.
    EmptyBatch,
    /// Minted and recorded.
    Done(MintReceipt),
    /// Minted on-chain, but recording failed. The user holds the tokens.
    PartialSuccess {
        receipt: MintReceipt,
        error: MintError,
    },
}

impl MintOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            MintOutcome::EmptyBatch => "empty_batch",
            MintOutcome::Done(_) => "done",
            MintOutcome::PartialSuccess { .. } => "partial_success",
        }
    }

    pub fn receipt(&self) -> Option<&MintReceipt> {
        match self {
            MintOutcome::EmptyBatch => None,
            MintOutcome::Done(receipt) => Some(receipt),
            MintOutcome::PartialSuccess { receipt, .. } => Some(receipt),
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            MintOutcome::EmptyBatch => Notification::new(
                NotificationLevel::Info,
                "You already hold these Values",
                "View them in your wallet",
            ),
            MintOutcome::Done(_) => Notification::new(
                NotificationLevel::Success,
                "We just dropped Value NFTs to your wallet",
                "View them in your wallet",
            ),
            MintOutcome::PartialSuccess { .. } => Notification::new(
                NotificationLevel::Warning,
                "Your Value NFTs were minted",
                "Check your wallet. Your profile may take a while to show them.",
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Human-readable summary handed to whoever displays the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: &str, description: &str) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    /// End-user summary of a failed mint. Operator details stay in the logs.
    pub fn for_error(error: &MintError) -> Self {
        match error {
            MintError::AlreadyInFlight(_) => Notification::new(
                NotificationLevel::Info,
                "Minting is already in progress",
                "Wait for the current mint to finish",
            ),
            MintError::InvalidRecipient(_) => Notification::new(
                NotificationLevel::Error,
                "This wallet can't receive Values",
                "Nothing was minted. Connect a different wallet",
            ),
            MintError::InvalidInput(_) => Notification::new(
                NotificationLevel::Error,
                "Minting is unavailable for this project",
                "Nothing was minted. The project needs attention before Values can be claimed",
            ),
            MintError::ProjectNotFound(_) => Notification::new(
                NotificationLevel::Error,
                "Project not found",
                "This project is not available",
            ),
            MintError::LedgerSyncFailed { .. } => Notification::new(
                NotificationLevel::Warning,
                "Your Value NFTs were minted",
                "Check your wallet. Your profile may take a while to show them.",
            ),
            MintError::Interrupted(_) => Notification::new(
                NotificationLevel::Warning,
                "Minting was interrupted",
                "Check your wallet before trying again",
            ),
            _ => Notification::new(
                NotificationLevel::Error,
                "Minting failed",
                "Nothing was minted. Please try again",
            ),
        }
    }
}
