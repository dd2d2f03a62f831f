//! Redb Error

use std::num::ParseIntError;

use lendaswap_common::database;
use thiserror::Error;

/// Redb Database Error
#[derive(Debug, Error)]
pub enum Error {
    /// Redb Error
    #[error(transparent)]
    Redb(#[from] redb::Error),
    /// Redb Database Error
    #[error(transparent)]
    Database(#[from] redb::DatabaseError),
    /// Redb Transaction Error
    #[error(transparent)]
    Transaction(#[from] redb::TransactionError),
    /// Redb Commit Error
    #[error(transparent)]
    Commit(#[from] redb::CommitError),
    /// Redb Table Error
    #[error(transparent)]
    Table(#[from] redb::TableError),
    /// Redb Storage Error
    #[error(transparent)]
    Storage(#[from] redb::StorageError),
    /// Serde Json Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// Parse int Error
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
    /// IO Error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Lendaswap Database Error
    #[error(transparent)]
    LendaswapDatabase(#[from] database::Error),
    /// Unknown Database Version
    #[error("Unknown Database Version")]
    UnknownDatabaseVersion,
}

impl From<Error> for database::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::LendaswapDatabase(e) => e,
            Error::Serde(e) => Self::Serde(e),
            e => Self::Database(Box::new(e)),
        }
    }
}
