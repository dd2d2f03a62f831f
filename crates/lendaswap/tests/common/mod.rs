//! Shared fixtures for the wallet integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lendaswap::api::{
    AssetPair, BtcToEvmSwapRequest, BtcToEvmSwapResponse, EvmChain, EvmToArkadeSwapRequest,
    EvmToBtcSwapResponse, EvmToLightningSwapRequest, GetSwapResponse, QuoteRequest,
    QuoteResponse, RecoverSwapsResponse, RecoveredSwap, SwapCommonFields, TokenId, TokenInfo,
    Version,
};
use lendaswap::database::{self, SwapDatabase, WalletDatabase};
use lendaswap::memory::WalletMemoryDatabase;
use lendaswap::settlement::{HtlcSettler, VhtlcAmounts, VhtlcParams};
use lendaswap::{Error, Network, SwapConnector, SwapRecord, SwapStatus, SwapWallet};
use uuid::Uuid;

pub const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub const LENDASWAP_PK: &str = "0265393346c0188676593f4335afd3bdba6d506522278fd1f1ecf8b2177be4c833";
pub const SERVER_PK: &str = "03493441df4aeffeae06e03db0cbaeebb9c4b66814ceeda19e64eab07efd02e016";

pub fn common_fields(
    id: Uuid,
    status: SwapStatus,
    hash_lock: &str,
    sender_pk: &str,
    receiver_pk: &str,
    refund_locktime: u32,
) -> SwapCommonFields {
    SwapCommonFields {
        id,
        status,
        hash_lock: hash_lock.to_string(),
        fee_sats: 250,
        asset_amount: 10.0,
        sender_pk: sender_pk.to_string(),
        receiver_pk: receiver_pk.to_string(),
        server_pk: SERVER_PK.to_string(),
        refund_locktime,
        unilateral_claim_delay: 512,
        unilateral_refund_delay: 1024,
        unilateral_refund_without_receiver_delay: 2048,
        network: "signet".to_string(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

pub fn btc_to_evm_response(
    id: Uuid,
    status: SwapStatus,
    hash_lock: &str,
    refund_pk: &str,
    refund_locktime: u32,
) -> GetSwapResponse {
    GetSwapResponse::BtcToEvm(BtcToEvmSwapResponse {
        common: common_fields(
            id,
            status,
            hash_lock,
            refund_pk,
            LENDASWAP_PK,
            refund_locktime,
        ),
        htlc_address_evm: "0x00000000000000000000000000000000000000aa".to_string(),
        htlc_address_arkade: "tark1qvhtlc".to_string(),
        user_address_evm: "0x00000000000000000000000000000000000000bb".to_string(),
        ln_invoice: "lntbs1".to_string(),
        sats_receive: 100_000,
        source_token: TokenId::BtcArkade,
        target_token: TokenId::Coin("usdc_pol".to_string()),
        bitcoin_htlc_claim_txid: None,
        bitcoin_htlc_fund_txid: None,
        evm_htlc_claim_txid: None,
        evm_htlc_fund_txid: None,
    })
}

pub fn evm_to_btc_response(
    id: Uuid,
    status: SwapStatus,
    hash_lock: &str,
    client_pk: &str,
    user_address_arkade: Option<&str>,
) -> GetSwapResponse {
    GetSwapResponse::EvmToBtc(EvmToBtcSwapResponse {
        common: common_fields(
            id,
            status,
            hash_lock,
            client_pk,
            LENDASWAP_PK,
            1_700_000_000,
        ),
        htlc_address_evm: "0x00000000000000000000000000000000000000aa".to_string(),
        htlc_address_arkade: "tark1qvhtlc".to_string(),
        user_address_evm: "0x00000000000000000000000000000000000000bb".to_string(),
        user_address_arkade: user_address_arkade.map(str::to_string),
        ln_invoice: String::new(),
        source_token: TokenId::Coin("usdc_pol".to_string()),
        target_token: TokenId::BtcArkade,
        sats_receive: 90_000,
        bitcoin_htlc_fund_txid: None,
        bitcoin_htlc_claim_txid: None,
        evm_htlc_claim_txid: None,
        evm_htlc_fund_txid: None,
        create_swap_tx: None,
        approve_tx: None,
        gelato_forwarder_address: None,
        gelato_user_nonce: None,
        gelato_user_deadline: None,
        source_token_address: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".to_string(),
    })
}

/// Set the status of a response in place
pub fn set_status(response: &mut GetSwapResponse, status: SwapStatus) {
    match response {
        GetSwapResponse::BtcToEvm(r) => r.common.status = status,
        GetSwapResponse::EvmToBtc(r) => r.common.status = status,
    }
}

/// In-process backend
#[derive(Debug, Default)]
pub struct MockConnector {
    /// Server side state, keyed by swap id
    pub swaps: Mutex<HashMap<String, GetSwapResponse>>,
    /// Requests seen by the create endpoints
    pub btc_to_evm_requests: Mutex<Vec<BtcToEvmSwapRequest>>,
    pub evm_to_arkade_requests: Mutex<Vec<EvmToArkadeSwapRequest>>,
    pub evm_to_lightning_requests: Mutex<Vec<EvmToLightningSwapRequest>>,
    /// `(id, secret)` pairs revealed to the relay
    pub revealed: Mutex<Vec<(String, String)>>,
    /// Identity xpubs asked for recovery
    pub recover_requests: Mutex<Vec<String>>,
    /// Answer of the recovery endpoint
    pub recover_response: Mutex<Option<RecoverSwapsResponse>>,
    /// Reject swap creation
    pub fail_create: AtomicBool,
    /// Answer with a hash lock other than the requested one
    pub tamper_hash_lock: AtomicBool,
}

impl MockConnector {
    pub fn set_recover_response(&self, swaps: Vec<RecoveredSwap>, highest_index: u32) {
        *self.recover_response.lock().unwrap() = Some(RecoverSwapsResponse {
            swaps,
            highest_index,
        });
    }

    pub fn set_server_status(&self, id: &str, status: SwapStatus) {
        let mut swaps = self.swaps.lock().unwrap();
        if let Some(response) = swaps.get_mut(id) {
            set_status(response, status);
        }
    }

    fn check_create(&self) -> Result<(), Error> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::ErrorResponse("service unavailable".to_string()));
        }
        Ok(())
    }

    fn hash_lock(&self, requested: &str) -> String {
        if self.tamper_hash_lock.load(Ordering::SeqCst) {
            format!("0x{}", "00".repeat(32))
        } else {
            requested.to_string()
        }
    }
}

#[async_trait]
impl SwapConnector for MockConnector {
    async fn health(&self) -> Result<String, Error> {
        Ok("ok".to_string())
    }

    async fn get_tokens(&self) -> Result<Vec<TokenInfo>, Error> {
        Ok(Vec::new())
    }

    async fn get_asset_pairs(&self) -> Result<Vec<AssetPair>, Error> {
        Ok(Vec::new())
    }

    async fn get_quote(&self, _request: QuoteRequest) -> Result<QuoteResponse, Error> {
        Ok(QuoteResponse {
            exchange_rate: "100000.00".to_string(),
            network_fee: 200,
            protocol_fee: 250,
            protocol_fee_rate: 0.0025,
            min_amount: 1_000,
            max_amount: 1_000_000,
        })
    }

    async fn get_swap(&self, id: &str) -> Result<GetSwapResponse, Error> {
        self.swaps
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ErrorResponse("swap not found".to_string()))
    }

    async fn create_btc_to_evm_swap(
        &self,
        request: BtcToEvmSwapRequest,
        _chain: EvmChain,
    ) -> Result<BtcToEvmSwapResponse, Error> {
        self.btc_to_evm_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.check_create()?;

        let response = btc_to_evm_response(
            Uuid::new_v4(),
            SwapStatus::Pending,
            &self.hash_lock(&request.hash_lock),
            &request.refund_pk,
            1_700_000_000,
        );
        self.swaps
            .lock()
            .unwrap()
            .insert(response.id(), response.clone());

        match response {
            GetSwapResponse::BtcToEvm(r) => Ok(r),
            GetSwapResponse::EvmToBtc(_) => Err(Error::Custom("wrong direction".to_string())),
        }
    }

    async fn create_evm_to_arkade_swap(
        &self,
        request: EvmToArkadeSwapRequest,
        _chain: EvmChain,
    ) -> Result<EvmToBtcSwapResponse, Error> {
        self.evm_to_arkade_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.check_create()?;

        let response = evm_to_btc_response(
            Uuid::new_v4(),
            SwapStatus::Pending,
            &self.hash_lock(&request.hash_lock),
            &request.receiver_pk,
            Some(&request.target_address),
        );
        self.swaps
            .lock()
            .unwrap()
            .insert(response.id(), response.clone());

        match response {
            GetSwapResponse::EvmToBtc(r) => Ok(r),
            GetSwapResponse::BtcToEvm(_) => Err(Error::Custom("wrong direction".to_string())),
        }
    }

    async fn create_evm_to_lightning_swap(
        &self,
        request: EvmToLightningSwapRequest,
        _chain: EvmChain,
    ) -> Result<EvmToBtcSwapResponse, Error> {
        self.evm_to_lightning_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.check_create()?;

        // The invoice payment hash, unrelated to any derived preimage
        let response = evm_to_btc_response(
            Uuid::new_v4(),
            SwapStatus::Pending,
            &format!("0x{}", "11".repeat(32)),
            SERVER_PK,
            None,
        );
        self.swaps
            .lock()
            .unwrap()
            .insert(response.id(), response.clone());

        match response {
            GetSwapResponse::EvmToBtc(r) => Ok(r),
            GetSwapResponse::BtcToEvm(_) => Err(Error::Custom("wrong direction".to_string())),
        }
    }

    async fn claim_gelato(&self, id: &str, secret: &str) -> Result<(), Error> {
        self.revealed
            .lock()
            .unwrap()
            .push((id.to_string(), secret.to_string()));
        Ok(())
    }

    async fn get_version(&self) -> Result<Version, Error> {
        Ok(Version {
            tag: "v0.3.0".to_string(),
            commit_hash: "abcdef0".to_string(),
        })
    }

    async fn recover_swaps(&self, xpub: &str) -> Result<RecoverSwapsResponse, Error> {
        self.recover_requests.lock().unwrap().push(xpub.to_string());
        self.recover_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::ErrorResponse("no swaps".to_string()))
    }
}

/// Settler that records what it was asked to do
#[derive(Debug, Default)]
pub struct MockSettler {
    pub claims: Mutex<Vec<(String, VhtlcParams, String)>>,
    pub refunds: Mutex<Vec<(String, VhtlcParams, String)>>,
}

#[async_trait]
impl HtlcSettler for MockSettler {
    async fn claim(
        &self,
        record: &SwapRecord,
        params: &VhtlcParams,
        destination: &str,
    ) -> Result<String, Error> {
        self.claims
            .lock()
            .unwrap()
            .push((record.id(), params.clone(), destination.to_string()));
        Ok(format!("claim-{}", record.id()))
    }

    async fn refund(
        &self,
        record: &SwapRecord,
        params: &VhtlcParams,
        refund_address: &str,
    ) -> Result<String, Error> {
        self.refunds
            .lock()
            .unwrap()
            .push((record.id(), params.clone(), refund_address.to_string()));
        Ok(format!("refund-{}", record.id()))
    }

    async fn amounts(&self, _params: &VhtlcParams) -> Result<VhtlcAmounts, Error> {
        Ok(VhtlcAmounts {
            spendable: 100_000,
            spent: 0,
            recoverable: 0,
        })
    }
}

/// Memory database whose writes can be made to fail
#[derive(Debug, Default)]
pub struct FlakyDatabase {
    pub inner: WalletMemoryDatabase,
    /// Swap writes left before one `store_swap` fails, unlimited when `None`
    pub store_budget: Mutex<Option<usize>>,
    /// Fail every `set_key_index`
    pub fail_key_index: AtomicBool,
    /// Number of `store_swap` calls seen
    pub store_calls: AtomicUsize,
    /// Stall the next `get_seed` for this long
    pub slow_seed_read: Mutex<Option<Duration>>,
}

impl FlakyDatabase {
    pub fn fail_stores_after(&self, successes: usize) {
        *self.store_budget.lock().unwrap() = Some(successes);
    }
}

#[async_trait]
impl WalletDatabase<database::Error> for FlakyDatabase {
    async fn get_seed(&self) -> Result<Option<String>, database::Error> {
        let delay = self.slow_seed_read.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.get_seed().await
    }

    async fn set_seed(&self, mnemonic: &str) -> Result<(), database::Error> {
        self.inner.set_seed(mnemonic).await
    }

    async fn get_key_index(&self) -> Result<u32, database::Error> {
        self.inner.get_key_index().await
    }

    async fn set_key_index(&self, index: u32) -> Result<(), database::Error> {
        if self.fail_key_index.load(Ordering::SeqCst) {
            return Err(database::Error::Internal("disk full".to_string()));
        }
        self.inner.set_key_index(index).await
    }
}

#[async_trait]
impl SwapDatabase<database::Error> for FlakyDatabase {
    async fn get_swap(&self, id: &str) -> Result<Option<SwapRecord>, database::Error> {
        self.inner.get_swap(id).await
    }

    async fn store_swap(&self, id: &str, record: SwapRecord) -> Result<(), database::Error> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut budget = self.store_budget.lock().unwrap();
            if let Some(left) = budget.as_mut() {
                if *left == 0 {
                    *budget = None;
                    return Err(database::Error::Internal("disk full".to_string()));
                }
                *left -= 1;
            }
        }
        self.inner.store_swap(id, record).await
    }

    async fn delete_swap(&self, id: &str) -> Result<(), database::Error> {
        self.inner.delete_swap(id).await
    }

    async fn list_swap_ids(&self) -> Result<Vec<String>, database::Error> {
        self.inner.list_swap_ids().await
    }

    async fn get_all_swaps(&self) -> Result<Vec<SwapRecord>, database::Error> {
        self.inner.get_all_swaps().await
    }
}

pub struct Harness {
    pub wallet: SwapWallet,
    pub connector: Arc<MockConnector>,
    pub settler: Arc<MockSettler>,
    pub db: Arc<FlakyDatabase>,
}

/// Wallet on the "abandon" seed with a mock backend and settler
pub async fn harness() -> anyhow::Result<Harness> {
    let db = Arc::new(FlakyDatabase::default());
    let connector = Arc::new(MockConnector::default());
    let settler = Arc::new(MockSettler::default());

    let wallet = lendaswap::SwapWalletBuilder::new()
        .network(Network::Mutinynet)
        .store(db.clone())
        .shared_client(connector.clone())
        .shared_settler(settler.clone())
        .build()?;

    wallet.import_seed(ABANDON).await?;

    Ok(Harness {
        wallet,
        connector,
        settler,
        db,
    })
}
