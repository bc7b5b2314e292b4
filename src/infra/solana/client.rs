// Responsible for all communication with the Solana blockchain.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::pubkey::Pubkey;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signer::{
        keypair::{read_keypair, read_keypair_file, Keypair},
        Signer,
    },
    transaction::Transaction,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::app::{AuthorityCredential, ChainProvider};
use crate::infra::config;
use crate::infra::solana::instruction::{
    batch_mint_instruction, initialize_instruction, mint_config_address, validate_cids,
    MAX_CIDS_PER_BATCH,
};

/// Loads the minting authority keypair.
pub fn load_authority(credential: &AuthorityCredential) -> anyhow::Result<Keypair> {
    match credential {
        AuthorityCredential::KeypairFile(path) => read_keypair_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read keypair file {:?}: {}", path, e)),
        AuthorityCredential::KeypairJson(json) => read_keypair(&mut json.as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to parse inline authority keypair: {}", e)),
    }
}

/// Submits batch mints to the value badge program.
#[derive(Debug, Clone)]
pub struct SolanaMintClient {
    rpc_url: String,
    program_id: Pubkey,
    chain_id: u64,
    timeout: Duration,
}

impl SolanaMintClient {
    pub fn new(rpc_url: String, program_id: &str, chain_id: u64, timeout: Duration) -> anyhow::Result<Self> {
        let program_id = Pubkey::from_str(program_id)
            .map_err(|e| anyhow::anyhow!("SOLANA_PROGRAM_ID is not a valid pubkey: {}", e))?;
        Ok(Self {
            rpc_url,
            program_id,
            chain_id,
            timeout,
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(
            config::solana_rpc_url()?,
            &config::solana_program_id()?,
            config::mint_chain_id()?,
            config::rpc_timeout()?,
        )
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc_client(&self) -> RpcClient {
        RpcClient::new_with_timeout_and_commitment(
            self.rpc_url.clone(),
            self.timeout,
            CommitmentConfig::confirmed(),
        )
    }

    /// Creates the program's mint-config account with `authority` as the only minter.
    /// This only needs to be called once.
    pub async fn initialize(&self, authority: &AuthorityCredential) -> anyhow::Result<()> {
        let client = self.rpc_client();
        let payer = load_authority(authority)?;
        let (mint_config, _bump) = mint_config_address(&self.program_id);

        if client.get_account(&mint_config).await.is_ok() {
            info!(%mint_config, "mint config account already initialized");
            return Ok(());
        }

        info!(%mint_config, authority = %payer.pubkey(), "initializing mint config account");
        let instruction = initialize_instruction(self.program_id, payer.pubkey());
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer.pubkey()));
        let recent_blockhash = client.get_latest_blockhash().await?;
        transaction.sign(&[&payer], recent_blockhash);
        let signature = client.send_and_confirm_transaction(&transaction).await?;

        info!(%signature, "mint config account initialized");
        Ok(())
    }
}

fn parse_recipient(recipient: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(recipient)
        .map_err(|e| anyhow::anyhow!("'{}' is not a valid Solana address: {}", recipient, e))
}

#[async_trait]
impl ChainProvider for SolanaMintClient {
    fn max_batch_len(&self) -> usize {
        MAX_CIDS_PER_BATCH
    }

    fn check_recipient(&self, recipient: &str) -> anyhow::Result<()> {
        parse_recipient(recipient).map(|_| ())
    }

    fn check_batch(&self, cids: &[String]) -> anyhow::Result<()> {
        validate_cids(cids)
    }

    async fn submit_batch_mint(
        &self,
        recipient: &str,
        cids: &[String],
        authority: &AuthorityCredential,
        chain_id: u64,
    ) -> anyhow::Result<String> {
        if chain_id != self.chain_id {
            return Err(anyhow::anyhow!(
                "Chain {} is not served by this client (configured for {})",
                chain_id,
                self.chain_id
            ));
        }
        validate_cids(cids)?;
        let recipient = parse_recipient(recipient)?;
        let payer = load_authority(authority)?;

        let client = self.rpc_client();
        let instruction = batch_mint_instruction(self.program_id, payer.pubkey(), recipient, cids);
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer.pubkey()));
        let recent_blockhash = client.get_latest_blockhash().await?;
        transaction.sign(&[&payer], recent_blockhash);

        debug!(%recipient, count = cids.len(), "sending batch mint transaction");
        let signature = client.send_and_confirm_transaction(&transaction).await?;

        Ok(signature.to_string())
    }
}
