//! On-chain settlement
//!
//! Building and broadcasting claim and refund transactions happens outside this crate. The wallet
//! only decides *whether* a claim or refund may be attempted and hands the stored record to an
//! [`HtlcSettler`].

use std::fmt::Debug;
use std::str::FromStr;

use async_trait::async_trait;
use lendaswap_common::api::GetSwapResponse;
use lendaswap_common::{Network, SwapRecord};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Amounts locked in a swap's Arkade VHTLC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhtlcAmounts {
    /// Spendable sats
    pub spendable: u64,
    /// Already spent sats
    pub spent: u64,
    /// Sats recoverable through a refund
    pub recoverable: u64,
}

/// Parameters of the Arkade VHTLC of a swap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhtlcParams {
    /// Derivation index of the swap key
    pub key_index: u32,
    /// Lendaswap public key (hex)
    pub lendaswap_pk: String,
    /// Arkade server public key (hex)
    pub arkade_server_pk: String,
    /// Absolute refund locktime
    pub refund_locktime: u32,
    /// Relative claim delay
    pub unilateral_claim_delay: i64,
    /// Relative refund delay
    pub unilateral_refund_delay: i64,
    /// Relative refund delay without receiver
    pub unilateral_refund_without_receiver_delay: i64,
    /// Network
    pub network: Network,
    /// VHTLC address
    pub vhtlc_address: String,
}

impl VhtlcParams {
    /// Collect the VHTLC parameters of a stored swap
    pub fn from_record(record: &SwapRecord) -> Result<Self, Error> {
        let common = record.response.common();
        // `sender_pk` is the client key in both directions
        let vhtlc_address = match &record.response {
            GetSwapResponse::BtcToEvm(r) => &r.htlc_address_arkade,
            GetSwapResponse::EvmToBtc(r) => &r.htlc_address_arkade,
        };

        Ok(Self {
            key_index: record.secret_bundle.key_index,
            lendaswap_pk: common.receiver_pk.clone(),
            arkade_server_pk: common.server_pk.clone(),
            refund_locktime: common.refund_locktime,
            unilateral_claim_delay: common.unilateral_claim_delay,
            unilateral_refund_delay: common.unilateral_refund_delay,
            unilateral_refund_without_receiver_delay: common
                .unilateral_refund_without_receiver_delay,
            network: Network::from_str(&common.network)?,
            vhtlc_address: vhtlc_address.clone(),
        })
    }
}

/// Chain side of claims and refunds
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait HtlcSettler: Debug {
    /// Claim the VHTLC of an EVM to BTC swap into `destination`, returns the txid
    async fn claim(
        &self,
        record: &SwapRecord,
        params: &VhtlcParams,
        destination: &str,
    ) -> Result<String, Error>;

    /// Refund the VHTLC of a BTC to EVM swap to `refund_address`, returns the txid
    async fn refund(
        &self,
        record: &SwapRecord,
        params: &VhtlcParams,
        refund_address: &str,
    ) -> Result<String, Error>;

    /// Amounts currently locked in the VHTLC
    async fn amounts(&self, params: &VhtlcParams) -> Result<VhtlcAmounts, Error>;
}
