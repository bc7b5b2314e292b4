//! Persistent mint stores backed by PostgreSQL.

use crate::domain::model::{
    normalize_value_name, CatalogSnapshot, MintEntry, MintedValue, Project, ProjectCategory,
    UserMintRecord, ValueRecord,
};
use crate::storage::{ProjectSource, UserMintRecordSource, ValueCatalogSource};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use tracing::debug;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        value_names TEXT[] NOT NULL DEFAULT '{}',
        contract_address TEXT NOT NULL,
        chain_id BIGINT NOT NULL,
        category TEXT NOT NULL DEFAULT 'token'
    )",
    "CREATE TABLE IF NOT EXISTS value_catalog (
        value TEXT PRIMARY KEY,
        cid TEXT NOT NULL
    )",
    // The composite keys below are the multi-instance backstop against double recording.
    "CREATE TABLE IF NOT EXISTS value_minters (
        value TEXT NOT NULL REFERENCES value_catalog (value) ON DELETE CASCADE,
        identity TEXT NOT NULL,
        added_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (value, identity)
    )",
    "CREATE TABLE IF NOT EXISTS mint_users (
        identity TEXT PRIMARY KEY,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS user_minted_values (
        identity TEXT NOT NULL REFERENCES mint_users (identity) ON DELETE CASCADE,
        value TEXT NOT NULL,
        tx_hash TEXT NOT NULL,
        weightage INTEGER NOT NULL DEFAULT 1,
        minted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (identity, value)
    )",
];

/// Projects, value catalog and user ledgers stored in one Postgres database.
#[derive(Clone)]
pub struct PostgresMintStore {
    pool: PgPool,
}

impl PostgresMintStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and makes sure every table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("mint store schema ensured");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn upsert_project(&self, project: &Project) -> Result<()> {
        let chain_id = i64::try_from(project.chain_id)
            .map_err(|_| anyhow::anyhow!("chain id {} does not fit BIGINT", project.chain_id))?;
        sqlx::query(
            "INSERT INTO projects (id, name, value_names, contract_address, chain_id, category)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                value_names = EXCLUDED.value_names,
                contract_address = EXCLUDED.contract_address,
                chain_id = EXCLUDED.chain_id,
                category = EXCLUDED.category",
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.values)
        .bind(&project.contract_address)
        .bind(chain_id)
        .bind(project.category.as_label())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectSource for PostgresMintStore {
    async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query(
            "SELECT id, name, value_names, contract_address, chain_id, category
             FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let chain_id: i64 = row.try_get("chain_id")?;
        let category: String = row.try_get("category")?;
        Ok(Some(Project {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            values: row.try_get("value_names")?,
            contract_address: row.try_get("contract_address")?,
            chain_id: u64::try_from(chain_id)
                .map_err(|_| anyhow::anyhow!("Negative chain id {} for project {}", chain_id, id))?,
            category: ProjectCategory::from_label(&category),
        }))
    }
}

#[async_trait]
impl ValueCatalogSource for PostgresMintStore {
    async fn get_all_values(&self) -> Result<CatalogSnapshot> {
        let rows = sqlx::query(
            "SELECT c.value, c.cid, m.identity
             FROM value_catalog c
             LEFT JOIN value_minters m ON m.value = c.value
             ORDER BY c.value",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut records: BTreeMap<String, ValueRecord> = BTreeMap::new();
        for row in rows {
            let value: String = row.try_get("value")?;
            let cid: String = row.try_get("cid")?;
            let identity: Option<String> = row.try_get("identity")?;
            let record = records
                .entry(value.clone())
                .or_insert_with(|| ValueRecord::new(&value, cid));
            if let Some(identity) = identity {
                record.minters.insert(identity);
            }
        }
        Ok(CatalogSnapshot::from_records(records.into_values()))
    }

    async fn add_minter(&self, value: &str, identity: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO value_minters (value, identity) VALUES ($1, $2)
             ON CONFLICT (value, identity) DO NOTHING",
        )
        .bind(normalize_value_name(value))
        .bind(identity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_value(&self, value: &str, cid: &str) -> Result<ValueRecord> {
        let key = normalize_value_name(value);
        if key.is_empty() {
            return Err(anyhow::anyhow!("value name cannot be empty"));
        }
        sqlx::query(
            "INSERT INTO value_catalog (value, cid) VALUES ($1, $2)
             ON CONFLICT (value) DO UPDATE SET cid = EXCLUDED.cid",
        )
        .bind(&key)
        .bind(cid)
        .execute(&self.pool)
        .await?;

        let minters: Vec<String> =
            sqlx::query_scalar("SELECT identity FROM value_minters WHERE value = $1")
                .bind(&key)
                .fetch_all(&self.pool)
                .await?;
        let mut record = ValueRecord::new(&key, cid);
        record.minters.extend(minters);
        Ok(record)
    }
}

#[async_trait]
impl UserMintRecordSource for PostgresMintStore {
    async fn get_user(&self, identity: &str) -> Result<Option<UserMintRecord>> {
        let exists: Option<String> =
            sqlx::query_scalar("SELECT identity FROM mint_users WHERE identity = $1")
                .bind(identity)
                .fetch_optional(&self.pool)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            "SELECT value, tx_hash, weightage, minted_at FROM user_minted_values
             WHERE identity = $1
             ORDER BY weightage DESC, value",
        )
        .bind(identity)
        .fetch_all(&self.pool)
        .await?;

        let mut record = UserMintRecord::new(identity);
        for row in rows {
            record.minted_values.push(MintedValue {
                value: row.try_get("value")?,
                tx_hash: row.try_get("tx_hash")?,
                weightage: row.try_get("weightage")?,
                minted_at: Some(row.try_get("minted_at")?),
            });
        }
        Ok(Some(record))
    }

    async fn append_minted_values(&self, identity: &str, entries: &[MintEntry]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO mint_users (identity) VALUES ($1) ON CONFLICT (identity) DO NOTHING")
            .bind(identity)
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO user_minted_values (identity, value, tx_hash) VALUES ($1, $2, $3)
                 ON CONFLICT (identity, value) DO UPDATE SET tx_hash = EXCLUDED.tx_hash",
            )
            .bind(identity)
            .bind(normalize_value_name(&entry.value))
            .bind(&entry.tx_hash)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
