// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Value transfers between custodial wallets.
//!
//! Two operations move funds out of custody, both behind the challenge
//! protocol at the API boundary:
//!
//! - **transfer**: credit a recipient's custodial wallet, optionally
//!   skimming a platform fee into the fee wallet, as one atomic signed
//!   transaction.
//! - **sweep withdrawal**: move a custodial wallet's entire spendable
//!   balance back to the owning primary wallet. No partial withdrawals.
//!
//! The engine checks balances before submitting anything, so the only
//! partial-state risk left is external: a ledger confirmation arriving
//! after the caller's own timeout (surfaced as [`LedgerError::Unknown`]).

use std::sync::Arc;

use ed25519_dalek::{Signer, SigningKey};

use super::client::LedgerClient;
use super::types::{Credit, LedgerError, SignedTransfer, TransferIntent, NETWORK_FEE_LAMPORTS};

/// Error type for transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Amount must be strictly positive.
    #[error("transfer amount must be strictly positive")]
    InvalidAmount,

    /// Balance cannot cover the requested movement plus the network fee.
    #[error("insufficient balance: {available} available, {required} required")]
    InsufficientFunds { available: u64, required: u64 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Outcome of a fee-split transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Ledger transaction signature.
    pub transaction_signature: String,
    /// Total amount debited from the sender (recipient + fee).
    pub amount: u64,
    /// Portion credited to the recipient.
    pub recipient_amount: u64,
    /// Portion skimmed into the platform fee wallet.
    pub fee_amount: u64,
}

/// Outcome of a sweep withdrawal.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Ledger transaction signature.
    pub transaction_signature: String,
    /// Amount moved back to the primary wallet.
    pub amount_swept: u64,
}

/// Builds, signs, and submits value transfers.
pub struct TransferEngine {
    ledger: Arc<dyn LedgerClient>,
}

impl TransferEngine {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Transfer `amount` from a custodial wallet to a recipient, skimming
    /// `floor(amount * fee_percent)` into `fee_wallet` when one is
    /// configured with a nonzero percentage.
    ///
    /// Recipient credit and fee credit ride in one signed transaction, so
    /// no partial-credit state exists: the ledger applies both or neither.
    pub async fn transfer(
        &self,
        from: &SigningKey,
        to_public_key: &str,
        amount: u64,
        fee_wallet: Option<&str>,
        fee_percent: f64,
    ) -> Result<TransferOutcome, TransferError> {
        if amount == 0 {
            return Err(TransferError::InvalidAmount);
        }

        let fee_amount = match fee_wallet {
            Some(_) if fee_percent > 0.0 => split_fee(amount, fee_percent),
            _ => 0,
        };
        let recipient_amount = amount - fee_amount;

        let from_public_key = bs58::encode(from.verifying_key().to_bytes()).into_string();
        self.check_spendable(&from_public_key, amount).await?;

        let mut credits = vec![Credit {
            to: to_public_key.to_string(),
            lamports: recipient_amount,
        }];
        if fee_amount > 0 {
            credits.push(Credit {
                // Checked above: fee_amount is only nonzero with a wallet.
                to: fee_wallet.unwrap_or_default().to_string(),
                lamports: fee_amount,
            });
        }

        let signed = sign_transfer(from, TransferIntent {
            from: from_public_key.clone(),
            credits,
        });
        let transaction_signature = self.ledger.submit_transfer(&signed).await?;

        tracing::info!(
            from = %from_public_key,
            to = %to_public_key,
            amount,
            fee_amount,
            signature = %transaction_signature,
            "transfer submitted"
        );
        Ok(TransferOutcome {
            transaction_signature,
            amount,
            recipient_amount,
            fee_amount,
        })
    }

    /// Sweep a custodial wallet's full spendable balance back to the
    /// owning primary wallet.
    ///
    /// Reads the balance, subtracts the flat network-fee estimate, and
    /// moves the remainder iff it is positive; otherwise fails without
    /// submitting anything. There is deliberately no amount parameter.
    pub async fn sweep_withdraw(
        &self,
        from: &SigningKey,
        owner_public_key: &str,
    ) -> Result<SweepOutcome, TransferError> {
        let from_public_key = bs58::encode(from.verifying_key().to_bytes()).into_string();
        let balance = self.ledger.get_balance(&from_public_key).await?;

        if balance <= NETWORK_FEE_LAMPORTS {
            return Err(TransferError::InsufficientFunds {
                available: balance,
                required: NETWORK_FEE_LAMPORTS + 1,
            });
        }
        let amount_swept = balance - NETWORK_FEE_LAMPORTS;

        let signed = sign_transfer(from, TransferIntent {
            from: from_public_key.clone(),
            credits: vec![Credit {
                to: owner_public_key.to_string(),
                lamports: amount_swept,
            }],
        });
        let transaction_signature = self.ledger.submit_transfer(&signed).await?;

        tracing::info!(
            from = %from_public_key,
            owner = %owner_public_key,
            amount_swept,
            signature = %transaction_signature,
            "sweep withdrawal submitted"
        );
        Ok(SweepOutcome {
            transaction_signature,
            amount_swept,
        })
    }

    /// Reject before submission when the balance cannot cover the amount
    /// plus the network fee.
    async fn check_spendable(&self, public_key: &str, amount: u64) -> Result<(), TransferError> {
        let balance = self.ledger.get_balance(public_key).await?;
        let required = amount.saturating_add(NETWORK_FEE_LAMPORTS);
        if balance < required {
            return Err(TransferError::InsufficientFunds {
                available: balance,
                required,
            });
        }
        Ok(())
    }
}

/// Platform fee: `floor(amount * fee_percent)`, capped at the amount so the
/// split can never exceed what the sender put in.
fn split_fee(amount: u64, fee_percent: f64) -> u64 {
    let fee = (amount as f64 * fee_percent).floor() as u64;
    fee.min(amount)
}

/// Sign a transfer intent over its canonical JSON bytes.
fn sign_transfer(key: &SigningKey, intent: TransferIntent) -> SignedTransfer {
    let message = SignedTransfer::message_bytes(&intent);
    let signature = bs58::encode(key.sign(&message).to_bytes()).into_string();
    SignedTransfer { intent, signature }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use ed25519_dalek::{Verifier, VerifyingKey};
    use rand::rngs::OsRng;

    use super::*;

    /// In-memory ledger recording every submission.
    struct MockLedger {
        balance: u64,
        submissions: Mutex<Vec<SignedTransfer>>,
        submit_result: SubmitBehavior,
    }

    enum SubmitBehavior {
        Accept,
        Reject(&'static str),
        Drop,
    }

    impl MockLedger {
        fn with_balance(balance: u64) -> Self {
            Self {
                balance,
                submissions: Mutex::new(Vec::new()),
                submit_result: SubmitBehavior::Accept,
            }
        }

        fn submissions(&self) -> Vec<SignedTransfer> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LedgerClient for MockLedger {
        async fn get_balance(&self, _public_key: &str) -> Result<u64, LedgerError> {
            Ok(self.balance)
        }

        async fn submit_transfer(&self, transfer: &SignedTransfer) -> Result<String, LedgerError> {
            self.submissions.lock().unwrap().push(transfer.clone());
            match self.submit_result {
                SubmitBehavior::Accept => Ok(transfer.signature.clone()),
                SubmitBehavior::Reject(reason) => Err(LedgerError::Rejected(reason.to_string())),
                SubmitBehavior::Drop => Err(LedgerError::Unknown("timed out".to_string())),
            }
        }
    }

    fn engine_with(ledger: MockLedger) -> (Arc<MockLedger>, TransferEngine) {
        let ledger = Arc::new(ledger);
        let engine = TransferEngine::new(Arc::clone(&ledger) as Arc<dyn LedgerClient>);
        (ledger, engine)
    }

    fn test_key() -> SigningKey {
        SigningKey::generate(&mut OsRng)
    }

    #[tokio::test]
    async fn fee_split_matches_reference_numbers() {
        let (ledger, engine) = engine_with(MockLedger::with_balance(1_000_000));
        let outcome = engine
            .transfer(&test_key(), "recipient", 100, Some("fee-wallet"), 0.1)
            .await
            .unwrap();

        assert_eq!(outcome.recipient_amount, 90);
        assert_eq!(outcome.fee_amount, 10);
        assert_eq!(outcome.amount, 100);

        let submitted = ledger.submissions();
        assert_eq!(submitted.len(), 1, "one atomic transaction");
        let credits = &submitted[0].intent.credits;
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0], Credit { to: "recipient".into(), lamports: 90 });
        assert_eq!(credits[1], Credit { to: "fee-wallet".into(), lamports: 10 });
    }

    #[tokio::test]
    async fn fee_split_never_leaks_or_exceeds_amount() {
        for amount in [1u64, 7, 99, 100, 1_001, 123_456_789, u32::MAX as u64] {
            let (_, engine) = engine_with(MockLedger::with_balance(u64::MAX));
            let outcome = engine
                .transfer(&test_key(), "recipient", amount, Some("fee-wallet"), 0.1)
                .await
                .unwrap();
            assert_eq!(
                outcome.recipient_amount + outcome.fee_amount,
                amount,
                "split must sum to the original amount for {amount}"
            );
            assert!(outcome.fee_amount <= amount);
        }
    }

    #[tokio::test]
    async fn no_fee_wallet_means_single_full_credit() {
        let (ledger, engine) = engine_with(MockLedger::with_balance(1_000_000));
        let outcome = engine
            .transfer(&test_key(), "recipient", 500, None, 0.1)
            .await
            .unwrap();

        assert_eq!(outcome.fee_amount, 0);
        assert_eq!(outcome.recipient_amount, 500);
        let credits = &ledger.submissions()[0].intent.credits;
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].lamports, 500);
    }

    #[tokio::test]
    async fn zero_fee_percent_means_no_skim() {
        let (ledger, engine) = engine_with(MockLedger::with_balance(1_000_000));
        let outcome = engine
            .transfer(&test_key(), "recipient", 500, Some("fee-wallet"), 0.0)
            .await
            .unwrap();
        assert_eq!(outcome.fee_amount, 0);
        assert_eq!(ledger.submissions()[0].intent.credits.len(), 1);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let (ledger, engine) = engine_with(MockLedger::with_balance(1_000_000));
        assert!(matches!(
            engine.transfer(&test_key(), "recipient", 0, None, 0.0).await,
            Err(TransferError::InvalidAmount)
        ));
        assert!(ledger.submissions().is_empty());
    }

    #[tokio::test]
    async fn insufficient_balance_rejected_before_submission() {
        // 100 requested + 5000 network fee > 5000 balance.
        let (ledger, engine) = engine_with(MockLedger::with_balance(5_000));
        let result = engine.transfer(&test_key(), "recipient", 100, None, 0.0).await;

        assert!(matches!(
            result,
            Err(TransferError::InsufficientFunds { available: 5_000, .. })
        ));
        assert!(ledger.submissions().is_empty(), "nothing may reach the ledger");
    }

    #[tokio::test]
    async fn transfer_signature_verifies_against_sender_key() {
        let (ledger, engine) = engine_with(MockLedger::with_balance(1_000_000));
        let key = test_key();
        engine
            .transfer(&key, "recipient", 250, Some("fee-wallet"), 0.02)
            .await
            .unwrap();

        let submitted = &ledger.submissions()[0];
        let message = SignedTransfer::message_bytes(&submitted.intent);
        let sig_bytes: [u8; 64] = bs58::decode(&submitted.signature)
            .into_vec()
            .unwrap()
            .try_into()
            .unwrap();
        let verifier = VerifyingKey::from_bytes(&key.verifying_key().to_bytes()).unwrap();
        assert!(verifier
            .verify(&message, &ed25519_dalek::Signature::from_bytes(&sig_bytes))
            .is_ok());
    }

    #[tokio::test]
    async fn sweep_moves_balance_minus_network_fee() {
        let (ledger, engine) = engine_with(MockLedger::with_balance(1_000_000));
        let outcome = engine
            .sweep_withdraw(&test_key(), "owner-primary")
            .await
            .unwrap();

        assert_eq!(outcome.amount_swept, 1_000_000 - NETWORK_FEE_LAMPORTS);
        let credits = &ledger.submissions()[0].intent.credits;
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].to, "owner-primary");
        assert_eq!(credits[0].lamports, outcome.amount_swept);
    }

    #[tokio::test]
    async fn sweep_fails_when_balance_cannot_cover_network_fee() {
        for balance in [0, NETWORK_FEE_LAMPORTS - 1, NETWORK_FEE_LAMPORTS] {
            let (ledger, engine) = engine_with(MockLedger::with_balance(balance));
            let result = engine.sweep_withdraw(&test_key(), "owner-primary").await;

            assert!(
                matches!(result, Err(TransferError::InsufficientFunds { .. })),
                "balance {balance} must not sweep"
            );
            assert!(ledger.submissions().is_empty(), "zero ledger submissions");
        }
    }

    #[tokio::test]
    async fn explicit_rejection_propagates_as_rejected() {
        let mut ledger = MockLedger::with_balance(1_000_000);
        ledger.submit_result = SubmitBehavior::Reject("blockhash expired");
        let (_, engine) = engine_with(ledger);

        match engine.transfer(&test_key(), "recipient", 100, None, 0.0).await {
            Err(TransferError::Ledger(LedgerError::Rejected(reason))) => {
                assert!(reason.contains("blockhash"));
            }
            other => panic!("expected definite rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_loss_propagates_as_unknown() {
        let mut ledger = MockLedger::with_balance(1_000_000);
        ledger.submit_result = SubmitBehavior::Drop;
        let (_, engine) = engine_with(ledger);

        assert!(matches!(
            engine.sweep_withdraw(&test_key(), "owner-primary").await,
            Err(TransferError::Ledger(LedgerError::Unknown(_)))
        ));
    }

    #[test]
    fn split_fee_floors() {
        assert_eq!(split_fee(100, 0.1), 10);
        assert_eq!(split_fee(99, 0.1), 9);
        assert_eq!(split_fee(1, 0.1), 0);
        assert_eq!(split_fee(10, 1.5), 10, "fee is capped at the amount");
    }
}
