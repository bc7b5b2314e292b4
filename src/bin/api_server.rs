// src/bin/api_server.rs

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use value_minter::infra::{config, logging};
use value_minter::solana::SolanaMintClient;
use value_minter::{transport, BatchMintExecutor, MintService, PostgresMintStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init("info");

    // --- Store Initialization ---
    info!("Connecting to Postgres...");
    let store = Arc::new(
        PostgresMintStore::connect(&config::database_url()?, config::db_max_connections()?).await?,
    );
    let pool = store.pool().clone();
    info!("Mint store ready");

    // --- Chain Provider Initialization ---
    let chain = SolanaMintClient::from_env()?;
    let authority = config::mint_authority();
    info!(
        program_id = %chain.program_id(),
        chain_id = chain.chain_id(),
        authority = ?authority,
        "Solana mint client configured"
    );
    let executor = BatchMintExecutor::new(Arc::new(chain.clone()), authority, chain.chain_id());

    // --- Service Initialization ---
    let sync_policy = config::ledger_sync_policy()?;
    info!(attempts = sync_policy.attempts, backoff = ?sync_policy.backoff, "Ledger sync policy");
    let mint_service = Arc::new(MintService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        executor,
        sync_policy,
    ));

    let app_state = transport::http::AppState {
        mint_service,
        projects: store.clone(),
        catalog: store.clone(),
        ledger: store,
        db_pool: Some(pool),
    };

    // --- API Server Initialization ---
    let listen_addr = config::listen_addr()?;
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()),
        )
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("API server listening on http://{}", listen_addr);
    info!("Swagger UI available at http://{}/swagger-ui", listen_addr);

    // Graceful shutdown waits for open requests, so a mint past submission still gets synced.
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Graceful shutdown complete");
    Ok(())
}
