//! Lendaswap Database

use std::fmt::Debug;

use async_trait::async_trait;

use crate::swap::SwapRecord;


/// Database Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database Error
    #[error(transparent)]
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// Stored record is keyed under a different id than its response carries
    #[error("Record for `{expected}` carries id `{found}`")]
    MismatchedSwapId {
        /// Key it was stored under
        expected: String,
        /// Id inside the record
        found: String,
    },
    /// Internal error
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Seed material and key index
///
/// Both values are scoped to the single seed a wallet works with.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletDatabase<Err>: Debug
where
    Err: Into<Error> + From<Error>,
{
    /// Get the stored mnemonic
    async fn get_seed(&self) -> Result<Option<String>, Err>;

    /// Store the mnemonic
    async fn set_seed(&self, mnemonic: &str) -> Result<(), Err>;

    /// Get the next unused key index, `0` when never set
    async fn get_key_index(&self) -> Result<u32, Err>;

    /// Persist the key index
    async fn set_key_index(&self, index: u32) -> Result<(), Err>;
}

/// Swap records keyed by swap id
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SwapDatabase<Err>: Debug
where
    Err: Into<Error> + From<Error>,
{
    /// Get swap record
    async fn get_swap(&self, id: &str) -> Result<Option<SwapRecord>, Err>;

    /// Insert or replace the whole swap record stored under `id`
    async fn store_swap(&self, id: &str, record: SwapRecord) -> Result<(), Err>;

    /// Remove swap record
    async fn delete_swap(&self, id: &str) -> Result<(), Err>;

    /// Ids of every stored swap
    async fn list_swap_ids(&self) -> Result<Vec<String>, Err>;

    /// Every stored swap record
    async fn get_all_swaps(&self) -> Result<Vec<SwapRecord>, Err>;
}

/// Shared handle to a [`WalletDatabase`]
pub type DynWalletDatabase = std::sync::Arc<dyn WalletDatabase<Error> + Send + Sync>;

/// Shared handle to a [`SwapDatabase`]
pub type DynSwapDatabase = std::sync::Arc<dyn SwapDatabase<Error> + Send + Sync>;

/// Check that `record` belongs under `id`
pub fn ensure_record_id(id: &str, record: &SwapRecord) -> Result<(), Error> {
    let found = record.id();
    if found != id {
        return Err(Error::MismatchedSwapId {
            expected: id.to_string(),
            found,
        });
    }
    Ok(())
}
