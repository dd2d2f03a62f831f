//! Swap wallet
//!
//! [`SwapWallet`] ties the pieces together: it owns the seed scope (seed, key index counter and
//! swap records) and talks to the backend through a [`SwapConnector`].

use std::str::FromStr;
use std::sync::Arc;

use bip39::Mnemonic;
use bitcoin::bip32::Xpub;
use lendaswap_common::api::{
    AssetPair, BtcToEvmSwapRequest, EvmChain, EvmToArkadeSwapRequest, EvmToLightningSwapRequest,
    GetSwapResponse, QuoteRequest, QuoteResponse, TokenId, TokenInfo, Version,
};
use lendaswap_common::database::{DynSwapDatabase, DynWalletDatabase};
use lendaswap_common::{Network, SwapRecord, SwapSecretBundle};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::client::SwapConnector;
use crate::counter::KeyIndexCounter;
use crate::derivation::SwapKeyDeriver;
use crate::error::Error;
use crate::settlement::HtlcSettler;

mod builder;
mod claim;
mod recovery;

pub use builder::SwapWalletBuilder;

/// Lendaswap Wallet
///
/// A [`SwapWallet`] works with a single seed against a single backend.
#[derive(Debug, Clone)]
pub struct SwapWallet {
    /// Network
    pub network: Network,
    /// Seed and key index storage
    pub localstore: DynWalletDatabase,
    /// Swap record storage
    pub swapstore: DynSwapDatabase,
    /// Referral code attached to created swaps
    pub referral_code: Option<String>,
    counter: Arc<KeyIndexCounter>,
    deriver: Arc<RwLock<Option<SwapKeyDeriver>>>,
    client: Arc<dyn SwapConnector + Send + Sync>,
    settler: Option<Arc<dyn HtlcSettler + Send + Sync>>,
}

impl SwapWallet {
    /// Create new [`SwapWallet`]
    pub fn new(
        network: Network,
        localstore: DynWalletDatabase,
        swapstore: DynSwapDatabase,
        client: Arc<dyn SwapConnector + Send + Sync>,
    ) -> Self {
        Self {
            network,
            counter: Arc::new(KeyIndexCounter::new(localstore.clone())),
            localstore,
            swapstore,
            referral_code: None,
            deriver: Arc::new(RwLock::new(None)),
            client,
            settler: None,
        }
    }

    /// Set the chain collaborator used for claims and refunds
    pub fn set_settler<S: HtlcSettler + 'static + Send + Sync>(&mut self, settler: S) {
        self.settler = Some(Arc::new(settler));
    }

    /// Return the stored mnemonic, generating and storing a fresh one if there is none
    #[instrument(skip(self))]
    pub async fn generate_or_get_seed(&self) -> Result<String, Error> {
        if let Some(seed) = self.localstore.get_seed().await? {
            return Ok(seed);
        }

        let mnemonic = Mnemonic::generate(12)?;
        let phrase = mnemonic.to_string();
        self.localstore.set_seed(&phrase).await?;

        tracing::info!("Generated new wallet seed");

        Ok(phrase)
    }

    /// Replace the stored mnemonic
    ///
    /// A different seed starts a new index scope, so the key index is reset to `0`. Importing the
    /// seed that is already stored changes nothing.
    #[instrument(skip_all)]
    pub async fn import_seed(&self, phrase: &str) -> Result<(), Error> {
        let phrase = Mnemonic::from_str(phrase)?.to_string();

        // Held until the counter is reset so no reservation mixes the two seeds
        let mut cached = self.deriver.write().await;

        if self.localstore.get_seed().await?.as_deref() == Some(phrase.as_str()) {
            tracing::debug!("Imported seed is already in use");
            return Ok(());
        }

        // Seed first: a failed reset then leaves a higher index, never a reused one
        self.localstore.set_seed(&phrase).await?;
        *cached = None;
        self.counter.reset_for_new_seed().await?;

        tracing::info!("Imported wallet seed");

        Ok(())
    }

    /// Stored mnemonic
    pub async fn get_seed(&self) -> Result<String, Error> {
        self.localstore.get_seed().await?.ok_or(Error::NoSeed)
    }

    /// Identity xpub the backend indexes this seed's swaps by
    pub async fn identity_xpub(&self) -> Result<Xpub, Error> {
        self.deriver().await?.identity_xpub()
    }

    /// Next key index that will be reserved
    pub async fn key_index(&self) -> Result<u32, Error> {
        self.counter.current().await
    }

    /// Reserve a fresh key index and derive its secrets
    #[instrument(skip(self))]
    pub async fn derive_swap_params(&self) -> Result<SwapSecretBundle, Error> {
        // Fail on a missing or broken seed before an index is spent
        let mut cached = self.deriver.write().await;
        let deriver = self.load_deriver(&mut cached).await?;
        let index = self.counter.reserve_next_index().await?;
        deriver.derive(index)
    }

    /// Derive the secrets at `index` without touching the counter
    pub async fn derive_swap_params_at_index(
        &self,
        index: u32,
    ) -> Result<SwapSecretBundle, Error> {
        self.deriver().await?.derive(index)
    }

    /// Create a swap from BTC on Arkade to an EVM token
    #[instrument(skip(self))]
    pub async fn create_btc_to_evm_swap(
        &self,
        target_address: &str,
        target_amount: f64,
        target_token: TokenId,
        chain: EvmChain,
    ) -> Result<SwapRecord, Error> {
        let bundle = self.derive_swap_params().await?;

        let request = BtcToEvmSwapRequest {
            target_address: target_address.to_string(),
            target_amount,
            target_token,
            hash_lock: bundle.hash_lock(),
            refund_pk: bundle.public_key_hex(),
            user_id: bundle.user_id_hex(),
            referral_code: self.referral_code.clone(),
        };

        let response = self.client.create_btc_to_evm_swap(request, chain).await?;

        let record = self.store_created(response.into(), bundle).await?;
        ensure_hash_lock(&record)?;
        Ok(record)
    }

    /// Create a swap from an EVM token to BTC on Arkade
    #[instrument(skip(self))]
    pub async fn create_evm_to_arkade_swap(
        &self,
        target_address: &str,
        user_address: &str,
        source_amount: f64,
        source_token: TokenId,
        chain: EvmChain,
    ) -> Result<SwapRecord, Error> {
        let bundle = self.derive_swap_params().await?;

        let request = EvmToArkadeSwapRequest {
            target_address: target_address.to_string(),
            source_amount,
            source_token,
            hash_lock: bundle.hash_lock(),
            receiver_pk: bundle.public_key_hex(),
            user_address: user_address.to_string(),
            user_id: bundle.user_id_hex(),
            referral_code: self.referral_code.clone(),
        };

        let response = self.client.create_evm_to_arkade_swap(request, chain).await?;

        let record = self.store_created(response.into(), bundle).await?;
        ensure_hash_lock(&record)?;
        Ok(record)
    }

    /// Create a swap from an EVM token to a lightning invoice
    ///
    /// The invoice fixes the payment hash, so no hash lock is sent.
    #[instrument(skip(self, bolt11_invoice))]
    pub async fn create_evm_to_lightning_swap(
        &self,
        bolt11_invoice: &str,
        user_address: &str,
        source_token: TokenId,
        chain: EvmChain,
    ) -> Result<SwapRecord, Error> {
        let bundle = self.derive_swap_params().await?;

        let request = EvmToLightningSwapRequest {
            bolt11_invoice: bolt11_invoice.to_string(),
            source_token,
            user_address: user_address.to_string(),
            user_id: bundle.user_id_hex(),
            referral_code: self.referral_code.clone(),
        };

        let response = self
            .client
            .create_evm_to_lightning_swap(request, chain)
            .await?;

        self.store_created(response.into(), bundle).await
    }

    /// Refresh a stored swap from the backend
    ///
    /// Replaces the stored server response and keeps the secret bundle.
    #[instrument(skip(self))]
    pub async fn get_swap(&self, id: &str) -> Result<SwapRecord, Error> {
        let stored = self
            .swapstore
            .get_swap(id)
            .await?
            .ok_or_else(|| Error::SwapNotFound(id.to_string()))?;

        let response = self.client.get_swap(id).await?;
        let previous_status = stored.status();
        let record = stored.with_response(response);

        self.swapstore.store_swap(id, record.clone()).await?;

        if previous_status != record.status() {
            tracing::debug!(
                "Swap {} moved from {} to {}",
                id,
                previous_status,
                record.status()
            );
        }

        Ok(record)
    }

    /// Stored swap, without asking the backend
    pub async fn get_stored_swap(&self, id: &str) -> Result<Option<SwapRecord>, Error> {
        Ok(self.swapstore.get_swap(id).await?)
    }

    /// Every stored swap
    pub async fn list_all_swaps(&self) -> Result<Vec<SwapRecord>, Error> {
        Ok(self.swapstore.get_all_swaps().await?)
    }

    /// Delete a stored swap
    ///
    /// The secrets stay derivable from the seed, the server state is lost until recovery.
    #[instrument(skip(self))]
    pub async fn delete_swap(&self, id: &str) -> Result<(), Error> {
        self.swapstore.delete_swap(id).await?;
        Ok(())
    }

    /// Delete every stored swap, returns how many were removed
    ///
    /// The key index is left alone.
    #[instrument(skip(self))]
    pub async fn clear_swap_storage(&self) -> Result<usize, Error> {
        let ids = self.swapstore.list_swap_ids().await?;
        for id in &ids {
            self.swapstore.delete_swap(id).await?;
        }

        tracing::info!("Cleared {} swaps", ids.len());

        Ok(ids.len())
    }

    /// Quote for swapping `base_amount` sats
    pub async fn get_quote(
        &self,
        from: TokenId,
        to: TokenId,
        base_amount: u64,
    ) -> Result<QuoteResponse, Error> {
        self.client
            .get_quote(QuoteRequest {
                from,
                to,
                base_amount,
            })
            .await
    }

    /// Tokens the backend can swap
    pub async fn get_tokens(&self) -> Result<Vec<TokenInfo>, Error> {
        self.client.get_tokens().await
    }

    /// Tradable pairs
    pub async fn get_asset_pairs(&self) -> Result<Vec<AssetPair>, Error> {
        self.client.get_asset_pairs().await
    }

    /// Backend version
    pub async fn get_version(&self) -> Result<Version, Error> {
        self.client.get_version().await
    }

    async fn deriver(&self) -> Result<SwapKeyDeriver, Error> {
        let mut cached = self.deriver.write().await;
        self.load_deriver(&mut cached).await
    }

    /// Deriver of the stored seed, filling `cached` on first use
    ///
    /// Callers hold the deriver lock so the seed cannot change between the read and the fill.
    async fn load_deriver(
        &self,
        cached: &mut Option<SwapKeyDeriver>,
    ) -> Result<SwapKeyDeriver, Error> {
        if let Some(deriver) = cached.as_ref() {
            return Ok(deriver.clone());
        }

        let seed = self.localstore.get_seed().await?.ok_or(Error::NoSeed)?;
        let deriver = SwapKeyDeriver::from_mnemonic(&seed, self.network)?;
        *cached = Some(deriver.clone());

        Ok(deriver)
    }

    fn settler(&self) -> Result<&Arc<dyn HtlcSettler + Send + Sync>, Error> {
        self.settler.as_ref().ok_or(Error::NoSettler)
    }

    async fn store_created(
        &self,
        response: GetSwapResponse,
        bundle: SwapSecretBundle,
    ) -> Result<SwapRecord, Error> {
        let record = SwapRecord::new(response, bundle);
        let id = record.id();

        self.swapstore.store_swap(&id, record.clone()).await?;

        tracing::info!(
            "Created {} swap {} at key index {}",
            record.direction(),
            id,
            record.secret_bundle.key_index
        );

        Ok(record)
    }
}

/// The backend has to lock the swap to the hash that was sent
fn ensure_hash_lock(record: &SwapRecord) -> Result<(), Error> {
    let expected = record.secret_bundle.hash_lock();
    let found = &record.response.common().hash_lock;

    if !found
        .trim_start_matches("0x")
        .eq_ignore_ascii_case(expected.trim_start_matches("0x"))
    {
        tracing::warn!("Swap {} has an unexpected hash lock", record.id());
        return Err(Error::HashLockMismatch {
            id: record.id(),
            expected,
            found: found.clone(),
        });
    }

    Ok(())
}
