//! Domain model for value minting: projects, the value catalog and per-user mint ledgers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod catalog;

pub use catalog::CatalogSnapshot;

/// Weightage assigned to a minted value when none is recorded.
pub const DEFAULT_WEIGHTAGE: i32 = 1;

/// Kind of asset a project uses to gate minting.
///
/// Only affects how a holder's balance is described, never eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectCategory {
    #[default]
    Token,
    Nft,
}

impl ProjectCategory {
    /// Parses the stored category label. Anything that is not an NFT is treated as a token.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("nft") {
            ProjectCategory::Nft
        } else {
            ProjectCategory::Token
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            ProjectCategory::Token => "token",
            ProjectCategory::Nft => "nft",
        }
    }

    /// Noun used when talking to a holder about their balance.
    pub fn holding_noun(&self) -> &'static str {
        match self {
            ProjectCategory::Token => "tokens",
            ProjectCategory::Nft => "NFT",
        }
    }
}

/// A partner project whose holders may claim value badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Value names as declared by the project owner, in display order.
    pub values: Vec<String>,
    pub contract_address: String,
    pub chain_id: u64,
    #[serde(default)]
    pub category: ProjectCategory,
}

/// Catalog entry for one distinct value name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRecord {
    /// Lowercase value name.
    pub key: String,
    /// Content identifier passed to the batch mint.
    pub cid: String,
    #[serde(default)]
    pub minters: BTreeSet<String>,
}

impl ValueRecord {
    pub fn new(key: impl AsRef<str>, cid: impl Into<String>) -> Self {
        Self {
            key: normalize_value_name(key.as_ref()),
            cid: cid.into(),
            minters: BTreeSet::new(),
        }
    }

    pub fn is_minted_by(&self, identity: &str) -> bool {
        self.minters.contains(identity)
    }
}

/// One value a user holds, with the transaction that minted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedValue {
    pub value: String,
    pub tx_hash: String,
    #[serde(default = "default_weightage")]
    pub weightage: i32,
    /// When the value was first recorded for the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minted_at: Option<DateTime<Utc>>,
}

fn default_weightage() -> i32 {
    DEFAULT_WEIGHTAGE
}

/// Entry handed to the user ledger after a confirmed mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintEntry {
    pub value: String,
    pub tx_hash: String,
}

/// Per-user mint history. `minted_values` is unique by `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMintRecord {
    pub identity: String,
    #[serde(default)]
    pub minted_values: Vec<MintedValue>,
}

impl UserMintRecord {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            minted_values: Vec::new(),
        }
    }

    pub fn has_minted(&self, value: &str) -> bool {
        let key = normalize_value_name(value);
        self.minted_values.iter().any(|m| m.value == key)
    }

    /// Inserts or refreshes the entry for `entry.value`.
    ///
    /// An existing entry keeps its weightage and first-mint time and takes the new
    /// transaction hash.
    pub fn upsert(&mut self, entry: &MintEntry) {
        let key = normalize_value_name(&entry.value);
        match self.minted_values.iter_mut().find(|m| m.value == key) {
            Some(existing) => existing.tx_hash = entry.tx_hash.clone(),
            None => self.minted_values.push(MintedValue {
                value: key,
                tx_hash: entry.tx_hash.clone(),
                weightage: DEFAULT_WEIGHTAGE,
                minted_at: Some(Utc::now()),
            }),
        }
    }

    /// Minted values ordered for the profile listing (heaviest first, ties by name).
    pub fn ranked(&self) -> Vec<MintedValue> {
        let mut values = self.minted_values.clone();
        values.sort_by(|a, b| b.weightage.cmp(&a.weightage).then_with(|| a.value.cmp(&b.value)));
        values
    }
}

/// The set of values selected for one orchestration call.
///
/// `requested_values[i]` is minted from `cids[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MintBatch {
    pub requested_values: Vec<String>,
    pub cids: Vec<String>,
    pub transaction_hash: Option<String>,
}

impl MintBatch {
    pub fn push(&mut self, value: String, cid: String) {
        self.requested_values.push(value);
        self.cids.push(cid);
    }

    pub fn is_empty(&self) -> bool {
        self.requested_values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.requested_values.len()
    }
}

/// Canonical catalog key for a value name.
pub fn normalize_value_name(value: &str) -> String {
    value.trim().to_lowercase()
}
