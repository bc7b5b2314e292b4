//! In-process store used by tests and local runs without Postgres.

use crate::domain::model::{
    normalize_value_name, CatalogSnapshot, MintEntry, Project, UserMintRecord, ValueRecord,
};
use crate::storage::{ProjectSource, UserMintRecordSource, ValueCatalogSource};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Holds projects, catalog and user ledgers in memory. Cloning shares the data.
#[derive(Clone, Default)]
pub struct InMemoryMintStore {
    projects: Arc<RwLock<HashMap<String, Project>>>,
    catalog: Arc<RwLock<BTreeMap<String, ValueRecord>>>,
    users: Arc<RwLock<HashMap<String, UserMintRecord>>>,
}

impl InMemoryMintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_project(&self, project: Project) {
        let mut projects = self.projects.write().await;
        projects.insert(project.id.clone(), project);
    }
}

#[async_trait]
impl ProjectSource for InMemoryMintStore {
    async fn get_project(&self, id: &str) -> anyhow::Result<Option<Project>> {
        let projects = self.projects.read().await;
        Ok(projects.get(id).cloned())
    }
}

#[async_trait]
impl ValueCatalogSource for InMemoryMintStore {
    async fn get_all_values(&self) -> anyhow::Result<CatalogSnapshot> {
        let catalog = self.catalog.read().await;
        Ok(CatalogSnapshot::from_records(catalog.values().cloned()))
    }

    async fn add_minter(&self, value: &str, identity: &str) -> anyhow::Result<()> {
        let key = normalize_value_name(value);
        let mut catalog = self.catalog.write().await;
        let record = catalog
            .get_mut(&key)
            .ok_or_else(|| anyhow::anyhow!("Value '{}' is not in the catalog", key))?;
        record.minters.insert(identity.to_string());
        Ok(())
    }

    async fn upsert_value(&self, value: &str, cid: &str) -> anyhow::Result<ValueRecord> {
        let key = normalize_value_name(value);
        if key.is_empty() {
            return Err(anyhow::anyhow!("value name cannot be empty"));
        }
        let mut catalog = self.catalog.write().await;
        let record = catalog
            .entry(key.clone())
            .or_insert_with(|| ValueRecord::new(&key, cid));
        record.cid = cid.to_string();
        Ok(record.clone())
    }
}

#[async_trait]
impl UserMintRecordSource for InMemoryMintStore {
    async fn get_user(&self, identity: &str) -> anyhow::Result<Option<UserMintRecord>> {
        let users = self.users.read().await;
        Ok(users.get(identity).cloned())
    }

    async fn append_minted_values(
        &self,
        identity: &str,
        entries: &[MintEntry],
    ) -> anyhow::Result<()> {
        let mut users = self.users.write().await;
        let record = users
            .entry(identity.to_string())
            .or_insert_with(|| UserMintRecord::new(identity));
        for entry in entries {
            record.upsert(entry);
        }
        Ok(())
    }
}
