// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state: the explicitly constructed service objects.

use std::sync::Arc;

use crate::auth::ChallengeService;
use crate::custody::CustodyService;
use crate::ledger::TransferEngine;
use crate::storage::WalletDatabase;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<WalletDatabase>,
    pub custody: Arc<CustodyService>,
    pub challenges: Arc<ChallengeService>,
    pub transfers: Arc<TransferEngine>,
    /// Platform fee destination; `None` disables the fee skim.
    pub fee_wallet: Option<String>,
    /// Platform fee fraction in `[0.0, 1.0)`.
    pub fee_percent: f64,
}

impl AppState {
    pub fn new(
        db: Arc<WalletDatabase>,
        custody: Arc<CustodyService>,
        challenges: Arc<ChallengeService>,
        transfers: Arc<TransferEngine>,
        fee_wallet: Option<String>,
        fee_percent: f64,
    ) -> Self {
        Self {
            db,
            custody,
            challenges,
            transfers,
            fee_wallet,
            fee_percent,
        }
    }
}

#[cfg(test)]
pub mod test_support {
    //! Builders for handler and router tests: temp-file database, throwaway
    //! master key, and an in-memory ledger with a settable balance.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::crypto::{EnvelopeCipher, MasterKey};
    use crate::ledger::{LedgerClient, LedgerError, SignedTransfer};

    /// In-memory ledger: fixed balance, every submission accepted.
    pub struct TestLedger {
        pub balance: u64,
        pub submissions: Mutex<Vec<SignedTransfer>>,
    }

    impl TestLedger {
        pub fn with_balance(balance: u64) -> Self {
            Self {
                balance,
                submissions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LedgerClient for TestLedger {
        async fn get_balance(&self, _public_key: &str) -> Result<u64, LedgerError> {
            Ok(self.balance)
        }

        async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<String, LedgerError> {
            self.submissions.lock().unwrap().push(transfer.clone());
            Ok(transfer.signature.clone())
        }
    }

    /// Build a complete state against a temp database and test ledger.
    /// Returns the temp dir so callers keep it alive for the test.
    pub fn test_state(balance: u64) -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Arc::new(
            WalletDatabase::open(&dir.path().join("wallets.redb")).expect("open wallet db"),
        );
        let cipher = EnvelopeCipher::new(&MasterKey::from_bytes([9u8; 32]));
        let custody = Arc::new(CustodyService::new(Arc::clone(&db), cipher));
        let challenges = Arc::new(ChallengeService::new());
        let ledger = Arc::new(TestLedger::with_balance(balance));
        let transfers = Arc::new(TransferEngine::new(ledger));

        let state = AppState::new(
            db,
            custody,
            challenges,
            transfers,
            Some("FeeWallet1111111111111111111111".to_string()),
            0.1,
        );
        (dir, state)
    }
}
