// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded custodial-wallet database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `proxy_wallets`: owner_identity → serialized ProxyWalletRecord
//!
//! One record per owner identity, keyed by the primary wallet's base58
//! public key. Records are never deleted: a deleted record would strand
//! whatever funds the custodial keypair still holds.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};

/// Primary table: owner_identity → serialized ProxyWalletRecord (JSON bytes).
const PROXY_WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("proxy_wallets");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WalletDbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no proxy wallet for owner {0}")]
    NotFound(String),
}

pub type WalletDbResult<T> = Result<T, WalletDbError>;

// =============================================================================
// Record
// =============================================================================

/// Persisted custodial wallet record, one per owner identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyWalletRecord {
    /// Primary wallet's base58 public key; unique key into the table.
    pub owner_identity: String,
    /// Base58 public half of the custodial keypair.
    pub proxy_public_key: String,
    /// Envelope-sealed private key (or legacy plaintext pending re-seal).
    pub encrypted_private_key: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an insert-if-absent attempt.
#[derive(Debug)]
pub enum InsertOutcome {
    /// The record was persisted; this caller provisioned the wallet.
    Created,
    /// Another caller won the race; their record is returned unchanged.
    Lost(ProxyWalletRecord),
}

// =============================================================================
// WalletDatabase
// =============================================================================

/// Embedded ACID database holding the custodial wallet table.
pub struct WalletDatabase {
    db: Database,
}

impl WalletDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> WalletDbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail.
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PROXY_WALLETS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Fetch the record for an owner, if one exists.
    pub fn get(&self, owner_identity: &str) -> WalletDbResult<Option<ProxyWalletRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROXY_WALLETS)?;
        match table.get(owner_identity)? {
            Some(guard) => {
                let record: ProxyWalletRecord = serde_json::from_slice(guard.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Insert a record only if no record exists for its owner.
    ///
    /// redb serializes write transactions, so this check-and-insert is the
    /// uniqueness guard for concurrent first-time provisioning: the loser
    /// observes the winner's committed row and gets it back via
    /// [`InsertOutcome::Lost`] instead of creating a duplicate.
    pub fn insert_new(&self, record: &ProxyWalletRecord) -> WalletDbResult<InsertOutcome> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(PROXY_WALLETS)?;
            let existing: Option<ProxyWalletRecord> =
                match table.get(record.owner_identity.as_str())? {
                    Some(guard) => Some(serde_json::from_slice(guard.value())?),
                    None => None,
                };
            match existing {
                Some(winner) => InsertOutcome::Lost(winner),
                None => {
                    let bytes = serde_json::to_vec(record)?;
                    table.insert(record.owner_identity.as_str(), bytes.as_slice())?;
                    InsertOutcome::Created
                }
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Overwrite an existing record (envelope re-seal, `updated_at` bumps).
    pub fn update(&self, record: &ProxyWalletRecord) -> WalletDbResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PROXY_WALLETS)?;
            let exists = table.get(record.owner_identity.as_str())?.is_some();
            if !exists {
                return Err(WalletDbError::NotFound(record.owner_identity.clone()));
            }
            let bytes = serde_json::to_vec(record)?;
            table.insert(record.owner_identity.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Count persisted records (health checks, tests).
    pub fn count(&self) -> WalletDbResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROXY_WALLETS)?;
        Ok(table.len()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> (tempfile::TempDir, WalletDatabase) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = WalletDatabase::open(&dir.path().join("wallets.redb")).expect("open db");
        (dir, db)
    }

    fn record(owner: &str) -> ProxyWalletRecord {
        let now = Utc::now();
        ProxyWalletRecord {
            owner_identity: owner.to_string(),
            proxy_public_key: format!("proxy-for-{owner}"),
            encrypted_private_key: "pwk1:a.b.c".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn get_returns_none_for_unknown_owner() {
        let (_dir, db) = test_db();
        assert!(db.get("nobody").unwrap().is_none());
    }

    #[test]
    fn insert_then_get_round_trips() {
        let (_dir, db) = test_db();
        let rec = record("alice");

        assert!(matches!(db.insert_new(&rec).unwrap(), InsertOutcome::Created));
        let fetched = db.get("alice").unwrap().expect("record exists");
        assert_eq!(fetched, rec);
    }

    #[test]
    fn losing_insert_returns_winning_record() {
        let (_dir, db) = test_db();
        let winner = record("alice");
        let loser = record("alice");

        assert!(matches!(db.insert_new(&winner).unwrap(), InsertOutcome::Created));
        match db.insert_new(&loser).unwrap() {
            InsertOutcome::Lost(existing) => {
                assert_eq!(existing.proxy_public_key, winner.proxy_public_key);
            }
            InsertOutcome::Created => panic!("duplicate record for one owner"),
        }
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn update_overwrites_existing_record() {
        let (_dir, db) = test_db();
        let mut rec = record("alice");
        db.insert_new(&rec).unwrap();

        rec.encrypted_private_key = "pwk1:x.y.z".to_string();
        rec.updated_at = Utc::now();
        db.update(&rec).unwrap();

        let fetched = db.get("alice").unwrap().unwrap();
        assert_eq!(fetched.encrypted_private_key, "pwk1:x.y.z");
    }

    #[test]
    fn update_of_missing_record_fails() {
        let (_dir, db) = test_db();
        assert!(matches!(
            db.update(&record("ghost")),
            Err(WalletDbError::NotFound(_))
        ));
    }
}
