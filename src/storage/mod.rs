//! Collaborator interfaces for the mint stores and their implementations.

use crate::domain::model::{CatalogSnapshot, MintEntry, Project, UserMintRecord, ValueRecord};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryMintStore;
pub use postgres::PostgresMintStore;

/// Source of project definitions.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn get_project(&self, id: &str) -> anyhow::Result<Option<Project>>;
}

/// The catalog of mintable values and who has minted them.
#[async_trait]
pub trait ValueCatalogSource: Send + Sync {
    /// Fetches every catalog record, keyed by lowercase value name.
    async fn get_all_values(&self) -> anyhow::Result<CatalogSnapshot>;

    /// Records `identity` as a minter of `value`. Adding an existing minter is a no-op.
    async fn add_minter(&self, value: &str, identity: &str) -> anyhow::Result<()>;

    /// Registers a value or replaces its CID. Existing minters are kept.
    async fn upsert_value(&self, value: &str, cid: &str) -> anyhow::Result<ValueRecord>;
}

/// Per-user mint history.
#[async_trait]
pub trait UserMintRecordSource: Send + Sync {
    async fn get_user(&self, identity: &str) -> anyhow::Result<Option<UserMintRecord>>;

    /// Upserts `entries` by value: an entry for a value the user already holds
    /// replaces its transaction hash instead of adding a row.
    async fn append_minted_values(&self, identity: &str, entries: &[MintEntry])
        -> anyhow::Result<()>;
}
