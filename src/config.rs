// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup into a
//! [`Config`] value that is threaded into the services explicitly; there is
//! no process-global configuration state.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WALLET_MASTER_KEY` | 32-byte envelope master key (base64, hex, or raw) | Required |
//! | `LEDGER_RPC_URL` | Ledger node JSON-RPC endpoint | `http://127.0.0.1:8899` |
//! | `FEE_WALLET` | Platform fee wallet public key | Unset (no fee skim) |
//! | `FEE_PERCENT` | Platform fee fraction, `0.0 <= f < 1.0` | `0.0` |
//! | `DATA_DIR` | Directory for the embedded wallet database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,proxy_wallet_service=debug` |

use std::env;
use std::path::PathBuf;

use crate::crypto::{EnvelopeError, MasterKey};

/// Environment variable name for the envelope master key.
pub const MASTER_KEY_ENV: &str = "WALLET_MASTER_KEY";

/// Environment variable name for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Error type for startup configuration.
///
/// All of these are fatal: the process must refuse to start rather than run
/// with a wrong key or a nonsensical fee.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{MASTER_KEY_ENV} is not set")]
    MissingMasterKey,

    #[error(transparent)]
    InvalidMasterKey(#[from] EnvelopeError),

    #[error("FEE_PERCENT must be a fraction in [0.0, 1.0), got {0}")]
    InvalidFeePercent(String),

    #[error("PORT must be a valid port number, got {0}")]
    InvalidPort(String),
}

/// Resolved runtime configuration.
pub struct Config {
    pub master_key: MasterKey,
    pub ledger_rpc_url: String,
    pub fee_wallet: Option<String>,
    pub fee_percent: f64,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let master_key_secret =
            env::var(MASTER_KEY_ENV).map_err(|_| ConfigError::MissingMasterKey)?;
        let master_key = MasterKey::from_configured(&master_key_secret)?;

        let ledger_rpc_url = env::var("LEDGER_RPC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8899".to_string());

        let fee_wallet = env::var("FEE_WALLET").ok().filter(|w| !w.is_empty());
        let fee_percent = match env::var("FEE_PERCENT") {
            Ok(raw) => parse_fee_percent(&raw)?,
            Err(_) => 0.0,
        };

        let data_dir = PathBuf::from(env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string()));
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            master_key,
            ledger_rpc_url,
            fee_wallet,
            fee_percent,
            data_dir,
            host,
            port,
        })
    }

    /// Path of the embedded wallet database file.
    pub fn wallet_db_path(&self) -> PathBuf {
        self.data_dir.join("proxy_wallets.redb")
    }
}

fn parse_fee_percent(raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidFeePercent(raw.to_string()))?;
    if !value.is_finite() || !(0.0..1.0).contains(&value) {
        return Err(ConfigError::InvalidFeePercent(raw.to_string()));
    }
    Ok(value)
}
