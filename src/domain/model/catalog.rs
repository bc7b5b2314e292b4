//! Point-in-time view of the value catalog.

use crate::domain::model::{normalize_value_name, ValueRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Catalog records keyed by lowercase value name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CatalogSnapshot {
    records: BTreeMap<String, ValueRecord>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot, re-keying every record by its normalized name.
    ///
    /// If two records normalize to the same key their minter sets are merged and
    /// the first CID wins.
    pub fn from_records(records: impl IntoIterator<Item = ValueRecord>) -> Self {
        let mut snapshot = Self::new();
        for record in records {
            snapshot.insert(record);
        }
        snapshot
    }

    pub fn insert(&mut self, mut record: ValueRecord) {
        let key = normalize_value_name(&record.key);
        record.key = key.clone();
        match self.records.get_mut(&key) {
            Some(existing) => existing.minters.extend(record.minters),
            None => {
                self.records.insert(key, record);
            }
        }
    }

    /// Adds `identity` to the minters of `value` if the value is catalogued.
    pub fn record_minter(&mut self, value: &str, identity: &str) {
        if let Some(record) = self.records.get_mut(&normalize_value_name(value)) {
            record.minters.insert(identity.to_string());
        }
    }

    /// Looks up a value by name, case-insensitively.
    pub fn get(&self, value: &str) -> Option<&ValueRecord> {
        self.records.get(&normalize_value_name(value))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ValueRecord> {
        self.records.values()
    }
}
