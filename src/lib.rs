pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{
    AuthorityCredential, BatchMintExecutor, ChainProvider, LedgerSync, MintRequest, MintService,
    SyncRetryPolicy,
};
pub use domain::eligibility::resolve;
pub use domain::mint::{MintOutcome, MintReceipt, Notification, NotificationLevel};
pub use domain::model::{
    CatalogSnapshot, MintBatch, MintEntry, Project, ProjectCategory, UserMintRecord, ValueRecord,
};
pub use domain::MintError;
pub use infra::solana;
pub use storage::{
    InMemoryMintStore, PostgresMintStore, ProjectSource, UserMintRecordSource, ValueCatalogSource,
};
