// Instruction layouts of the value badge program (Anchor encoding).

use sha2::{Digest, Sha256};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

/// Discriminator for initialize: sha256("global:initialize")[..8]
pub const INITIALIZE_DISCRIMINATOR: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
/// Discriminator for batch_mint: sha256("global:batch_mint")[..8]
pub const BATCH_MINT_DISCRIMINATOR: [u8; 8] = [196, 91, 50, 129, 93, 48, 13, 186];

pub const MINT_CONFIG_SEED: &[u8] = b"mint_config";
pub const BADGE_LEDGER_SEED: &[u8] = b"badge_ledger";

/// Largest batch that still fits one transaction.
pub const MAX_CIDS_PER_BATCH: usize = 10;
/// Longest CID the program stores (CIDv1 base32 is 59 characters).
pub const MAX_CID_LEN: usize = 64;

/// Anchor's instruction discriminator for `name`.
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{}", name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

pub fn mint_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MINT_CONFIG_SEED], program_id)
}

pub fn badge_ledger_address(program_id: &Pubkey, recipient: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[BADGE_LEDGER_SEED, recipient.as_ref()], program_id)
}

/// Checks a batch against the program's limits before anything is signed.
pub fn validate_cids(cids: &[String]) -> anyhow::Result<()> {
    if cids.is_empty() {
        return Err(anyhow::anyhow!("batch mint needs at least one CID"));
    }
    if cids.len() > MAX_CIDS_PER_BATCH {
        return Err(anyhow::anyhow!(
            "batch of {} CIDs exceeds the limit of {}",
            cids.len(),
            MAX_CIDS_PER_BATCH
        ));
    }
    if let Some(cid) = cids.iter().find(|c| c.is_empty() || c.len() > MAX_CID_LEN) {
        return Err(anyhow::anyhow!(
            "CID '{}' must be between 1 and {} bytes",
            cid,
            MAX_CID_LEN
        ));
    }
    Ok(())
}

/// Borsh layout of `Vec<String>`: u32 LE length, then each string as u32 LE length + UTF-8 bytes.
fn encode_string_vec(out: &mut Vec<u8>, items: &[String]) {
    out.extend_from_slice(&(items.len() as u32).to_le_bytes());
    for item in items {
        out.extend_from_slice(&(item.len() as u32).to_le_bytes());
        out.extend_from_slice(item.as_bytes());
    }
}

pub fn initialize_instruction(program_id: Pubkey, authority: Pubkey) -> Instruction {
    let (mint_config, _bump) = mint_config_address(&program_id);
    let accounts = vec![
        AccountMeta::new(mint_config, false),
        AccountMeta::new(authority, true),
        AccountMeta::new_readonly(solana_program::system_program::ID, false),
    ];

    Instruction {
        program_id,
        accounts,
        data: INITIALIZE_DISCRIMINATOR.to_vec(),
    }
}

pub fn batch_mint_instruction(
    program_id: Pubkey,
    authority: Pubkey,
    recipient: Pubkey,
    cids: &[String],
) -> Instruction {
    let (mint_config, _) = mint_config_address(&program_id);
    let (badge_ledger, _) = badge_ledger_address(&program_id, &recipient);
    let accounts = vec![
        AccountMeta::new(mint_config, false),
        AccountMeta::new(badge_ledger, false),
        AccountMeta::new_readonly(recipient, false),
        AccountMeta::new(authority, true),
        AccountMeta::new_readonly(solana_program::system_program::ID, false),
    ];

    let mut data = BATCH_MINT_DISCRIMINATOR.to_vec();
    encode_string_vec(&mut data, cids);

    Instruction {
        program_id,
        accounts,
        data,
    }
}
