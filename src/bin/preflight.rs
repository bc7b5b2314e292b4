use solana_sdk::signer::Signer;
use value_minter::infra::{config, logging};
use value_minter::solana::instruction::mint_config_address;
use value_minter::solana::{load_authority, SolanaMintClient};
use value_minter::PostgresMintStore;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--init-config-if-missing]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL, SOLANA_RPC_URL, SOLANA_PROGRAM_ID, MINT_CHAIN_ID\n\
         And the minting authority key:\n\
           MINT_AUTHORITY_KEYPAIR (default ~/.config/solana/id.json) or MINT_AUTHORITY_KEYPAIR_JSON\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init("info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let init_config_if_missing = args.iter().any(|a| a == "--init-config-if-missing");

    // Force-read config (nice error messages if missing)
    let chain = SolanaMintClient::from_env()?;
    let sync_policy = config::ledger_sync_policy()?;
    let authority = config::mint_authority();

    println!("> Preflight:");
    println!("  SOLANA_RPC_URL={}", config::solana_rpc_url()?);
    println!("  SOLANA_PROGRAM_ID={}", chain.program_id());
    println!("  MINT_CHAIN_ID={}", chain.chain_id());
    println!("  MINT_AUTHORITY={:?}", authority);
    println!(
        "  LEDGER_SYNC_ATTEMPTS={} (backoff {:?})",
        sync_policy.attempts, sync_policy.backoff
    );

    // Database reachable + schema present
    let store =
        PostgresMintStore::connect(&config::database_url()?, config::db_max_connections()?).await?;
    store.ping().await?;
    println!("  Database reachable, mint tables ensured.");

    let payer = load_authority(&authority)?;
    let client = chain.rpc_client();

    // Basic RPC connectivity
    let version = client.get_version().await?;
    println!("  RPC version: {}", version.solana_core);

    // Authority balance pays for every batch mint.
    let balance_lamports = client.get_balance(&payer.pubkey()).await?;
    let sol = balance_lamports as f64 / 1_000_000_000_f64;
    println!("  Authority: {}", payer.pubkey());
    println!("  Authority balance: {} lamports (~{:.6} SOL)", balance_lamports, sol);
    if balance_lamports < 10_000_000 {
        eprintln!("  Warning: authority balance looks low; batch mints may fail.");
    }

    // Program account existence
    let program_id = chain.program_id();
    let program_acct = client
        .get_account(&program_id)
        .await
        .map_err(|e| anyhow::anyhow!("Program account not found on cluster: {} ({})", program_id, e))?;
    if !program_acct.executable {
        eprintln!("  Warning: program account exists but is not marked executable.");
    } else {
        println!("  Program account is deployed + executable.");
    }

    // Mint config PDA existence
    let (mint_config, _bump) = mint_config_address(&program_id);
    println!("  Mint config PDA: {}", mint_config);

    if client.get_account(&mint_config).await.is_ok() {
        println!("  Mint config account exists.");
    } else if init_config_if_missing {
        println!("  Mint config missing -> initializing with the configured authority...");
        chain.initialize(&authority).await?;
        client
            .get_account(&mint_config)
            .await
            .map_err(|e| anyhow::anyhow!("Mint config still missing after initialize: {}", e))?;
        println!("  Mint config initialized successfully.");
    } else {
        return Err(anyhow::anyhow!(
            "Mint config PDA does not exist. Re-run with --init-config-if-missing"
        ));
    }

    println!("> Preflight OK.");
    Ok(())
}
