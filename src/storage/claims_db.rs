// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded claims database backed by redb (pure Rust, ACID).

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{ClaimRecord, ClaimStore};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized ClaimRecord (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
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

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// ClaimDatabase
// =============================================================================

/// Embedded ACID claims database.
pub struct ClaimDatabase {
    db: Database,
}

impl ClaimDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Look up a claim by user id.
    pub fn get_claim(&self, user_id: &str) -> StorageResult<Option<ClaimRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => {
                let record: ClaimRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Insert a claim unless one already exists for the user.
    ///
    /// The existence check and the write share one write transaction, so two
    /// concurrent inserts for the same user cannot both succeed.
    pub fn insert_claim(&self, record: &ClaimRecord) -> StorageResult<()> {
        let json = serde_json::to_vec(record)?;

        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(USERS)?;
            let taken = table.get(record.user_id.as_str())?.is_some();
            if !taken {
                table.insert(record.user_id.as_str(), json.as_slice())?;
            }
            !taken
        };

        if !inserted {
            write_txn.abort()?;
            return Err(StorageError::AlreadyExists(format!(
                "Claim for user {}",
                record.user_id
            )));
        }

        write_txn.commit()?;
        Ok(())
    }

    /// Number of recorded claims.
    pub fn count(&self) -> StorageResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let mut total = 0;
        for entry in table.iter()? {
            entry?;
            total += 1;
        }
        Ok(total)
    }
}

impl ClaimStore for ClaimDatabase {
    fn find_by_user_id(&self, user_id: &str) -> StorageResult<Option<ClaimRecord>> {
        self.get_claim(user_id)
    }

    fn insert(&self, record: &ClaimRecord) -> StorageResult<()> {
        self.insert_claim(record)
    }

    fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WalletAddress;

    fn test_db() -> (tempfile::TempDir, ClaimDatabase) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = ClaimDatabase::open(&dir.path().join("claims.redb")).expect("open db");
        (dir, db)
    }

    #[test]
    fn insert_and_get_claim() {
        let (_dir, db) = test_db();
        let record = ClaimRecord::new("U1", WalletAddress::from("0xABC"));

        db.insert_claim(&record).unwrap();

        let loaded = db.get_claim("U1").unwrap().expect("record exists");
        assert_eq!(loaded.user_id, "U1");
        assert_eq!(loaded.wallet, WalletAddress::from("0xABC"));
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn missing_claim_is_none() {
        let (_dir, db) = test_db();
        assert!(db.get_claim("nobody").unwrap().is_none());
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn second_insert_for_same_user_is_rejected() {
        let (_dir, db) = test_db();
        db.insert_claim(&ClaimRecord::new("U1", WalletAddress::from("0xABC")))
            .unwrap();

        let result = db.insert_claim(&ClaimRecord::new("U1", WalletAddress::from("0xDEF")));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));

        // Original wallet is untouched
        let loaded = db.get_claim("U1").unwrap().unwrap();
        assert_eq!(loaded.wallet, WalletAddress::from("0xABC"));
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn claims_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("claims.redb");
        {
            let db = ClaimDatabase::open(&path).unwrap();
            db.insert_claim(&ClaimRecord::new("U1", WalletAddress::from("0xABC")))
                .unwrap();
        }

        let db = ClaimDatabase::open(&path).unwrap();
        assert!(db.get_claim("U1").unwrap().is_some());
        assert!(db.health_check().is_ok());
    }
}
