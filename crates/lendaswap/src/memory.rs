//! Wallet in memory database

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lendaswap_common::database::{ensure_record_id, Error, SwapDatabase, WalletDatabase};
use lendaswap_common::SwapRecord;
use tokio::sync::RwLock;

/// Wallet in Memory Database
#[derive(Debug, Clone, Default)]
pub struct WalletMemoryDatabase {
    seed: Arc<RwLock<Option<String>>>,
    key_index: Arc<RwLock<u32>>,
    swaps: Arc<RwLock<HashMap<String, SwapRecord>>>,
}

impl WalletMemoryDatabase {
    /// Create new [`WalletMemoryDatabase`]
    pub fn new(seed: Option<String>, key_index: u32, swaps: Vec<SwapRecord>) -> Self {
        Self {
            seed: Arc::new(RwLock::new(seed)),
            key_index: Arc::new(RwLock::new(key_index)),
            swaps: Arc::new(RwLock::new(
                swaps.into_iter().map(|s| (s.id(), s)).collect(),
            )),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl WalletDatabase<Error> for WalletMemoryDatabase {
    async fn get_seed(&self) -> Result<Option<String>, Error> {
        Ok(self.seed.read().await.clone())
    }

    async fn set_seed(&self, mnemonic: &str) -> Result<(), Error> {
        *self.seed.write().await = Some(mnemonic.to_string());
        Ok(())
    }

    async fn get_key_index(&self) -> Result<u32, Error> {
        Ok(*self.key_index.read().await)
    }

    async fn set_key_index(&self, index: u32) -> Result<(), Error> {
        *self.key_index.write().await = index;
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SwapDatabase<Error> for WalletMemoryDatabase {
    async fn get_swap(&self, id: &str) -> Result<Option<SwapRecord>, Error> {
        Ok(self.swaps.read().await.get(id).cloned())
    }

    async fn store_swap(&self, id: &str, record: SwapRecord) -> Result<(), Error> {
        ensure_record_id(id, &record)?;
        self.swaps.write().await.insert(id.to_string(), record);
        Ok(())
    }

    async fn delete_swap(&self, id: &str) -> Result<(), Error> {
        self.swaps.write().await.remove(id);
        Ok(())
    }

    async fn list_swap_ids(&self) -> Result<Vec<String>, Error> {
        Ok(self.swaps.read().await.keys().cloned().collect())
    }

    async fn get_all_swaps(&self) -> Result<Vec<SwapRecord>, Error> {
        Ok(self.swaps.read().await.values().cloned().collect())
    }
}
