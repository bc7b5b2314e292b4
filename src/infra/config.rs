//! Centralized configuration (environment variables + defaults).

use crate::app::{AuthorityCredential, SyncRetryPolicy};
use anyhow::Context;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_AUTHORITY_KEYPAIR: &str = "~/.config/solana/id.json";

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{} must be set", name))
}

fn parsed_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        Err(_) => Ok(default),
    }
}

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> anyhow::Result<String> {
    required("DATABASE_URL")
}

pub fn db_max_connections() -> anyhow::Result<u32> {
    parsed_or("DB_MAX_CONNECTIONS", 5)
}

/// Solana RPC URL (required).
pub fn solana_rpc_url() -> anyhow::Result<String> {
    required("SOLANA_RPC_URL")
}

/// Program id of the deployed value badge program (required).
pub fn solana_program_id() -> anyhow::Result<String> {
    required("SOLANA_PROGRAM_ID")
}

/// Chain id this deployment mints on (required).
pub fn mint_chain_id() -> anyhow::Result<u64> {
    let raw = required("MINT_CHAIN_ID")?;
    raw.trim()
        .parse::<u64>()
        .map_err(|e| anyhow::anyhow!("MINT_CHAIN_ID must be a valid u64: {}", e))
}

/// Timeout applied to every RPC request while submitting a mint.
pub fn rpc_timeout() -> anyhow::Result<Duration> {
    Ok(Duration::from_secs(parsed_or("RPC_TIMEOUT_SECS", 30u64)?))
}

/// Minting authority keypair.
///
/// `MINT_AUTHORITY_KEYPAIR_JSON` wins over `MINT_AUTHORITY_KEYPAIR`; without either
/// the Solana CLI default keypair is used.
pub fn mint_authority() -> AuthorityCredential {
    if let Ok(json) = std::env::var("MINT_AUTHORITY_KEYPAIR_JSON") {
        if !json.trim().is_empty() {
            return AuthorityCredential::KeypairJson(json);
        }
    }
    let path = std::env::var("MINT_AUTHORITY_KEYPAIR")
        .unwrap_or_else(|_| DEFAULT_AUTHORITY_KEYPAIR.to_string());
    AuthorityCredential::KeypairFile(PathBuf::from(shellexpand::tilde(&path).to_string()))
}

pub fn ledger_sync_policy() -> anyhow::Result<SyncRetryPolicy> {
    let attempts = parsed_or("LEDGER_SYNC_ATTEMPTS", 3u32)?;
    let backoff_ms = parsed_or("LEDGER_SYNC_BACKOFF_MS", 250u64)?;
    Ok(SyncRetryPolicy::new(attempts, Duration::from_millis(backoff_ms)))
}

pub fn listen_addr() -> anyhow::Result<std::net::SocketAddr> {
    parsed_or(
        "LISTEN_ADDR",
        std::net::SocketAddr::from(([0, 0, 0, 0], 3000)),
    )
}
