//! Redb Wallet

use std::cmp::Ordering;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use lendaswap_common::database::{self, ensure_record_id, SwapDatabase, WalletDatabase};
use lendaswap_common::SwapRecord;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::instrument;

use crate::error::Error;

const CONFIG_TABLE: TableDefinition<&str, &str> = TableDefinition::new("config");
// <"seed", mnemonic>
const SEED_TABLE: TableDefinition<&str, &str> = TableDefinition::new("seed");
// <"key_index", next unused index>
const KEY_INDEX_TABLE: TableDefinition<&str, u32> = TableDefinition::new("key_index");
// <Swap_id, SwapRecord json>
const SWAPS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("swaps");

const SEED_KEY: &str = "seed";
const KEY_INDEX_KEY: &str = "key_index";

const DATABASE_VERSION: u32 = 1;

/// Wallet Redb Database
#[derive(Debug, Clone)]
pub struct WalletRedbDatabase {
    db: Arc<Database>,
}

impl WalletRedbDatabase {
    /// Open or create the database at `path`
    pub fn new(path: &Path) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Parent directory does not exist: {parent:?}"),
                )));
            }
        }

        let db = Database::create(path)?;

        let db_version: Option<String>;
        {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(CONFIG_TABLE);

            db_version = match table {
                Ok(table) => table.get("db_version")?.map(|v| v.value().to_string()),
                Err(_) => None,
            };
        }

        match db_version {
            Some(db_version) => {
                let current_file_version = u32::from_str(&db_version)?;

                match current_file_version.cmp(&DATABASE_VERSION) {
                    Ordering::Equal => {
                        tracing::info!("Database is at current version {}", DATABASE_VERSION);
                    }
                    Ordering::Less | Ordering::Greater => {
                        tracing::warn!(
                            "Database file is at version {} current is {}",
                            current_file_version,
                            DATABASE_VERSION
                        );
                        return Err(Error::UnknownDatabaseVersion);
                    }
                }
            }
            None => {
                let write_txn = db.begin_write()?;
                {
                    let mut table = write_txn.open_table(CONFIG_TABLE)?;
                    // Open all tables to init a new db
                    let _ = write_txn.open_table(SEED_TABLE)?;
                    let _ = write_txn.open_table(KEY_INDEX_TABLE)?;
                    let _ = write_txn.open_table(SWAPS_TABLE)?;
                    table.insert("db_version", DATABASE_VERSION.to_string().as_str())?;
                }

                write_txn.commit()?;
                tracing::info!("Created database at version {}", DATABASE_VERSION);
            }
        }

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl WalletDatabase<database::Error> for WalletRedbDatabase {
    #[instrument(skip(self))]
    async fn get_seed(&self) -> Result<Option<String>, database::Error> {
        let read_txn = self.db.begin_read().map_err(Error::from)?;
        let table = read_txn.open_table(SEED_TABLE).map_err(Error::from)?;

        let seed = table
            .get(SEED_KEY)
            .map_err(Error::from)?
            .map(|s| s.value().to_string());

        Ok(seed)
    }

    #[instrument(skip_all)]
    async fn set_seed(&self, mnemonic: &str) -> Result<(), database::Error> {
        let write_txn = self.db.begin_write().map_err(Error::from)?;
        {
            let mut table = write_txn.open_table(SEED_TABLE).map_err(Error::from)?;
            table.insert(SEED_KEY, mnemonic).map_err(Error::from)?;
        }
        write_txn.commit().map_err(Error::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_key_index(&self) -> Result<u32, database::Error> {
        let read_txn = self.db.begin_read().map_err(Error::from)?;
        let table = read_txn.open_table(KEY_INDEX_TABLE).map_err(Error::from)?;

        let key_index = table
            .get(KEY_INDEX_KEY)
            .map_err(Error::from)?
            .map(|x| x.value())
            .unwrap_or_default();

        Ok(key_index)
    }

    #[instrument(skip(self))]
    async fn set_key_index(&self, index: u32) -> Result<(), database::Error> {
        let write_txn = self.db.begin_write().map_err(Error::from)?;
        {
            let mut table = write_txn.open_table(KEY_INDEX_TABLE).map_err(Error::from)?;
            table.insert(KEY_INDEX_KEY, index).map_err(Error::from)?;
        }
        write_txn.commit().map_err(Error::from)?;

        Ok(())
    }
}

#[async_trait]
impl SwapDatabase<database::Error> for WalletRedbDatabase {
    #[instrument(skip(self))]
    async fn get_swap(&self, id: &str) -> Result<Option<SwapRecord>, database::Error> {
        let read_txn = self.db.begin_read().map_err(Error::from)?;
        let table = read_txn.open_table(SWAPS_TABLE).map_err(Error::from)?;

        if let Some(record) = table.get(id).map_err(Error::from)? {
            return Ok(Some(
                serde_json::from_str(record.value()).map_err(Error::from)?,
            ));
        }

        Ok(None)
    }

    #[instrument(skip(self, record))]
    async fn store_swap(&self, id: &str, record: SwapRecord) -> Result<(), database::Error> {
        ensure_record_id(id, &record)?;
        let json = serde_json::to_string(&record).map_err(Error::from)?;

        let write_txn = self.db.begin_write().map_err(Error::from)?;
        {
            let mut table = write_txn.open_table(SWAPS_TABLE).map_err(Error::from)?;
            table.insert(id, json.as_str()).map_err(Error::from)?;
        }
        write_txn.commit().map_err(Error::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_swap(&self, id: &str) -> Result<(), database::Error> {
        let write_txn = self.db.begin_write().map_err(Error::from)?;
        {
            let mut table = write_txn.open_table(SWAPS_TABLE).map_err(Error::from)?;
            table.remove(id).map_err(Error::from)?;
        }
        write_txn.commit().map_err(Error::from)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_swap_ids(&self) -> Result<Vec<String>, database::Error> {
        let read_txn = self.db.begin_read().map_err(Error::from)?;
        let table = read_txn.open_table(SWAPS_TABLE).map_err(Error::from)?;

        let ids = table
            .iter()
            .map_err(Error::from)?
            .flatten()
            .map(|(id, _)| id.value().to_string())
            .collect();

        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn get_all_swaps(&self) -> Result<Vec<SwapRecord>, database::Error> {
        let read_txn = self.db.begin_read().map_err(Error::from)?;
        let table = read_txn.open_table(SWAPS_TABLE).map_err(Error::from)?;

        let mut records: Vec<SwapRecord> = Vec::new();
        for entry in table.iter().map_err(Error::from)? {
            let (_, record) = entry.map_err(Error::from)?;
            records.push(serde_json::from_str(record.value()).map_err(Error::from)?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use lendaswap_common::database::test::test_record;
    use lendaswap_common::swap_db_test;
    use lendaswap_common::SwapStatus;

    use super::*;

    async fn provide_db(test_id: String) -> WalletRedbDatabase {
        let path = std::env::temp_dir().join(format!("lendaswap-redb-{test_id}.redb"));
        WalletRedbDatabase::new(&path).expect("open database")
    }

    swap_db_test!(provide_db);

    fn temp_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("lendaswap.redb")
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let record = test_record(7, SwapStatus::ClientFunded);

        {
            let db = WalletRedbDatabase::new(&temp_path(&dir)).unwrap();
            db.set_seed("abandon about").await.unwrap();
            db.set_key_index(8).await.unwrap();
            db.store_swap(&record.id(), record.clone()).await.unwrap();
        }

        let db = WalletRedbDatabase::new(&temp_path(&dir)).unwrap();
        assert_eq!(db.get_seed().await.unwrap().as_deref(), Some("abandon about"));
        assert_eq!(db.get_key_index().await.unwrap(), 8);
        assert_eq!(db.get_swap(&record.id()).await.unwrap(), Some(record));
    }

    #[test]
    fn test_newer_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);

        {
            let db = Database::create(&path).unwrap();
            let write_txn = db.begin_write().unwrap();
            {
                let mut table = write_txn.open_table(CONFIG_TABLE).unwrap();
                table.insert("db_version", "2").unwrap();
            }
            write_txn.commit().unwrap();
        }

        assert!(matches!(
            WalletRedbDatabase::new(&path),
            Err(Error::UnknownDatabaseVersion)
        ));
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("lendaswap.redb");

        assert!(matches!(WalletRedbDatabase::new(&path), Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_mismatched_id_keeps_its_variant() {
        let dir = tempfile::tempdir().unwrap();
        let db = WalletRedbDatabase::new(&temp_path(&dir)).unwrap();
        let record = test_record(1, SwapStatus::Pending);

        assert!(matches!(
            db.store_swap("other", record).await,
            Err(database::Error::MismatchedSwapId { .. })
        ));
    }
}
