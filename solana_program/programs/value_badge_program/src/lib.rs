// Solana program that records Value badges minted to a wallet.
use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

declare_id!("6fSQZwqdsr8zVSbE8DTo4tsHDW4af3iZyB5KGzEGqyW8");

pub const MAX_CIDS_PER_BATCH: usize = 10;
pub const MAX_CID_LEN: usize = 64;

#[program]
pub mod value_badge_program {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        let mint_config = &mut ctx.accounts.mint_config;
        mint_config.authority = ctx.accounts.authority.key();
        mint_config.total_minted = 0;
        Ok(())
    }

    pub fn batch_mint(ctx: Context<BatchMint>, cids: Vec<String>) -> Result<()> {
        require!(!cids.is_empty(), BadgeError::EmptyBatch);
        require!(cids.len() <= MAX_CIDS_PER_BATCH, BadgeError::BatchTooLarge);
        for cid in &cids {
            require!(
                !cid.is_empty() && cid.len() <= MAX_CID_LEN,
                BadgeError::InvalidCid
            );
        }

        let ledger = &mut ctx.accounts.badge_ledger;
        ledger.recipient = ctx.accounts.recipient.key();
        for cid in &cids {
            if !ledger.cids.contains(cid) {
                ledger.cids.push(cid.clone());
            }
        }
        ledger.updated_at = Clock::get()?.unix_timestamp;
        let recipient = ledger.recipient;
        let timestamp = ledger.updated_at;
        let needed = BadgeLedger::space_for(ledger.cids.len());

        // Grow the ledger account before Anchor writes it back on exit.
        let ledger_info = ctx.accounts.badge_ledger.to_account_info();
        if needed > ledger_info.data_len() {
            let top_up = Rent::get()?
                .minimum_balance(needed)
                .saturating_sub(ledger_info.lamports());
            if top_up > 0 {
                transfer(
                    CpiContext::new(
                        ctx.accounts.system_program.to_account_info(),
                        Transfer {
                            from: ctx.accounts.authority.to_account_info(),
                            to: ledger_info.clone(),
                        },
                    ),
                    top_up,
                )?;
            }
            ledger_info.realloc(needed, false)?;
        }

        let mint_config = &mut ctx.accounts.mint_config;
        mint_config.total_minted = mint_config.total_minted.saturating_add(cids.len() as u64);

        emit!(BadgesMinted {
            recipient,
            cids,
            timestamp,
        });
        Ok(())
    }
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = authority,
        space = MintConfig::LEN,
        seeds = [MintConfig::SEED_PREFIX],
        bump
    )]
    pub mint_config: Account<'info, MintConfig>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct BatchMint<'info> {
    #[account(
        mut,
        seeds = [MintConfig::SEED_PREFIX],
        bump,
        has_one = authority
    )]
    pub mint_config: Account<'info, MintConfig>,
    #[account(
        init_if_needed,
        payer = authority,
        space = BadgeLedger::space_for(MAX_CIDS_PER_BATCH),
        seeds = [BadgeLedger::SEED_PREFIX, recipient.key().as_ref()],
        bump
    )]
    pub badge_ledger: Account<'info, BadgeLedger>,
    /// CHECK: only used as the ledger owner and PDA seed.
    pub recipient: UncheckedAccount<'info>,
    #[account(mut)]
    pub authority: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[account]
pub struct MintConfig {
    pub authority: Pubkey,
    pub total_minted: u64,
}

impl MintConfig {
    pub const SEED_PREFIX: &'static [u8] = b"mint_config";
    pub const LEN: usize = 8 + 32 + 8;
}

#[account]
pub struct BadgeLedger {
    pub recipient: Pubkey,
    pub cids: Vec<String>,
    pub updated_at: i64,
}

impl BadgeLedger {
    pub const SEED_PREFIX: &'static [u8] = b"badge_ledger";

    /// Account size for a ledger holding `badges` CIDs.
    pub const fn space_for(badges: usize) -> usize {
        8 + 32 + 4 + badges * (4 + MAX_CID_LEN) + 8
    }
}

#[event]
pub struct BadgesMinted {
    pub recipient: Pubkey,
    pub cids: Vec<String>,
    pub timestamp: i64,
}

#[error_code]
pub enum BadgeError {
    #[msg("Batch must contain at least one CID")]
    EmptyBatch,
    #[msg("Batch exceeds the per-transaction CID limit")]
    BatchTooLarge,
    #[msg("CID is empty or too long")]
    InvalidCid,
}
