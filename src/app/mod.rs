pub mod batch_mint;
pub mod ledger_sync;
pub mod mint_service;

pub use batch_mint::{AuthorityCredential, BatchMintExecutor, ChainProvider};
pub use ledger_sync::{LedgerSync, SyncRetryPolicy};
pub use mint_service::{MintRequest, MintService};
