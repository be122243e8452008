// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use proxy_wallet_service::{
    api::router,
    auth::ChallengeService,
    config::Config,
    crypto::EnvelopeCipher,
    custody::CustodyService,
    ledger::{RpcLedgerClient, TransferEngine},
    state::AppState,
    storage::WalletDatabase,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            std::process::exit(1);
        }
    };

    let db = match WalletDatabase::open(&config.wallet_db_path()) {
        Ok(db) => Arc::new(db),
        Err(error) => {
            tracing::error!(%error, "failed to open wallet database");
            std::process::exit(1);
        }
    };

    let cipher = EnvelopeCipher::new(&config.master_key);
    let custody = Arc::new(CustodyService::new(Arc::clone(&db), cipher));
    let challenges = Arc::new(ChallengeService::new());
    let ledger = match RpcLedgerClient::new(&config.ledger_rpc_url) {
        Ok(client) => Arc::new(client),
        Err(error) => {
            tracing::error!(%error, "invalid ledger RPC endpoint");
            std::process::exit(1);
        }
    };
    let transfers = Arc::new(TransferEngine::new(ledger));

    let state = AppState::new(
        db,
        custody,
        challenges,
        transfers,
        config.fee_wallet.clone(),
        config.fee_percent,
    );
    let app = router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(error) => {
            tracing::error!(%error, "failed to parse bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "proxy wallet service listening (docs at /docs)");

    if let Err(error) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,proxy_wallet_service=debug"));

    // LOG_FORMAT=json switches to machine-readable output for production.
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
    tracing::info!("shutdown signal received");
}
