//! Decides which of a project's values a user may still mint.

use crate::domain::error::MintError;
use crate::domain::model::{normalize_value_name, CatalogSnapshot, MintBatch};
use std::collections::HashSet;

/// Computes the batch of values `identity` has not minted yet.
///
/// Values missing from the catalog are skipped, as are values whose minter set
/// already holds `identity`. Output follows the project's order, lowercased and
/// without duplicates. No I/O happens here.
pub fn resolve(
    project_values: &[String],
    catalog: &CatalogSnapshot,
    identity: &str,
) -> Result<MintBatch, MintError> {
    let identity = identity.trim();
    if identity.is_empty() {
        return Err(MintError::InvalidInput("user identity is empty".to_string()));
    }

    let mut batch = MintBatch::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(project_values.len());

    for (index, raw) in project_values.iter().enumerate() {
        let value = normalize_value_name(raw);
        if value.is_empty() {
            return Err(MintError::InvalidInput(format!(
                "project value at index {} is blank",
                index
            )));
        }
        if !seen.insert(value.clone()) {
            continue;
        }

        let Some(record) = catalog.get(&value) else {
            continue;
        };
        if record.is_minted_by(identity) {
            continue;
        }

        batch.push(value, record.cid.clone());
    }

    Ok(batch)
}
