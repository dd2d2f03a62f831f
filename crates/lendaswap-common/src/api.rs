//! Backend wire types
//!
//! Request and response bodies of the Lendaswap backend REST api.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Error;
use crate::status::SwapStatus;

/// Token identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenId {
    /// Bitcoin over lightning
    BtcLightning,
    /// Bitcoin on Arkade
    BtcArkade,
    /// EVM token, e.g. `usdc_pol`
    #[serde(untagged)]
    Coin(String),
}

impl TokenId {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            TokenId::BtcLightning => "btc_lightning",
            TokenId::BtcArkade => "btc_arkade",
            TokenId::Coin(s) => s,
        }
    }
}

impl FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "btc_lightning" => TokenId::BtcLightning,
            "btc_arkade" => TokenId::BtcArkade,
            coin => TokenId::Coin(coin.to_string()),
        })
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chain a token lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Chain {
    /// Arkade
    Arkade,
    /// Lightning
    Lightning,
    /// Polygon
    Polygon,
    /// Ethereum
    Ethereum,
}

/// Token information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token id
    pub token_id: TokenId,
    /// Ticker
    pub symbol: String,
    /// Chain
    pub chain: Chain,
    /// Display name
    pub name: String,
    /// Decimals
    pub decimals: u8,
}

/// Tradable pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPair {
    /// Source token
    pub source: TokenInfo,
    /// Target token
    pub target: TokenInfo,
}

/// Price per BTC by quote asset amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTiers {
    /// Swapping 1 unit of the quote asset
    pub tier_1: f64,
    /// Swapping 100 units
    pub tier_100: f64,
    /// Swapping 1,000 units
    pub tier_1000: f64,
    /// Swapping 5,000 units
    pub tier_5000: f64,
}

/// Prices of one pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPairPrices {
    /// e.g. `USDC_POL-BTC`
    pub pair: String,
    /// Tiers
    pub tiers: PriceTiers,
}

/// Price feed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdateMessage {
    /// Unix timestamp
    pub timestamp: u64,
    /// Pair prices
    pub pairs: Vec<TradingPairPrices>,
}

/// EVM chain of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvmChain {
    /// Ethereum
    Ethereum,
    /// Polygon
    Polygon,
}

impl fmt::Display for EvmChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvmChain::Ethereum => write!(f, "ethereum"),
            EvmChain::Polygon => write!(f, "polygon"),
        }
    }
}

impl FromStr for EvmChain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" => Ok(EvmChain::Ethereum),
            "polygon" => Ok(EvmChain::Polygon),
            _ => Err(Error::UnknownEvmChain(s.to_string())),
        }
    }
}

/// Create a BTC (Arkade) to EVM swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BtcToEvmSwapRequest {
    /// EVM address receiving the tokens
    pub target_address: String,
    /// Token amount to receive
    pub target_amount: f64,
    /// Token to receive
    pub target_token: TokenId,
    /// `0x` prefixed hex of the preimage hash
    pub hash_lock: String,
    /// Client public key able to refund the client leg
    pub refund_pk: String,
    /// Per-swap identity key
    pub user_id: String,
    /// Referral code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

/// Create an EVM to Arkade swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmToArkadeSwapRequest {
    /// Arkade address receiving the BTC
    pub target_address: String,
    /// Token amount sent
    pub source_amount: f64,
    /// Token sent
    pub source_token: TokenId,
    /// `0x` prefixed hex of the preimage hash
    pub hash_lock: String,
    /// Client public key able to claim the server leg
    pub receiver_pk: String,
    /// EVM address funding the swap
    pub user_address: String,
    /// Per-swap identity key
    pub user_id: String,
    /// Referral code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

/// Create an EVM to Lightning swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmToLightningSwapRequest {
    /// Invoice to be paid
    pub bolt11_invoice: String,
    /// Token sent
    pub source_token: TokenId,
    /// EVM address funding the swap
    pub user_address: String,
    /// Per-swap identity key
    pub user_id: String,
    /// Referral code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

/// Fields shared by both swap directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapCommonFields {
    /// Swap id
    pub id: Uuid,
    /// Lifecycle status
    pub status: SwapStatus,
    /// `0x` prefixed hex of the preimage hash
    pub hash_lock: String,
    /// Protocol fee in sats
    pub fee_sats: i64,
    /// Amount of the EVM asset
    pub asset_amount: f64,
    /// Client public key
    pub sender_pk: String,
    /// Lendaswap public key
    pub receiver_pk: String,
    /// Arkade server public key
    pub server_pk: String,
    /// Unix time after which the client leg can be refunded
    pub refund_locktime: u32,
    /// Relative claim delay in seconds
    pub unilateral_claim_delay: i64,
    /// Relative refund delay in seconds
    pub unilateral_refund_delay: i64,
    /// Relative refund delay without receiver in seconds
    pub unilateral_refund_without_receiver_delay: i64,
    /// Bitcoin network name as reported by the backend
    pub network: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// BTC to EVM swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BtcToEvmSwapResponse {
    /// Shared fields
    #[serde(flatten)]
    pub common: SwapCommonFields,
    /// EVM HTLC contract
    pub htlc_address_evm: String,
    /// Arkade VHTLC address
    pub htlc_address_arkade: String,
    /// EVM address receiving the tokens
    pub user_address_evm: String,
    /// Invoice to fund the swap over lightning
    pub ln_invoice: String,
    /// Sats the server expects
    pub sats_receive: i64,
    /// Source token
    pub source_token: TokenId,
    /// Target token
    pub target_token: TokenId,
    /// Bitcoin HTLC claim txid
    #[serde(default)]
    pub bitcoin_htlc_claim_txid: Option<String>,
    /// Bitcoin HTLC fund txid
    #[serde(default)]
    pub bitcoin_htlc_fund_txid: Option<String>,
    /// EVM HTLC claim txid
    #[serde(default)]
    pub evm_htlc_claim_txid: Option<String>,
    /// EVM HTLC fund txid
    #[serde(default)]
    pub evm_htlc_fund_txid: Option<String>,
}

/// EVM to BTC swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmToBtcSwapResponse {
    /// Shared fields
    #[serde(flatten)]
    pub common: SwapCommonFields,
    /// EVM HTLC contract
    pub htlc_address_evm: String,
    /// Arkade VHTLC address
    pub htlc_address_arkade: String,
    /// EVM address sending the tokens
    pub user_address_evm: String,
    /// Arkade address receiving the BTC
    #[serde(default)]
    pub user_address_arkade: Option<String>,
    /// Lightning invoice
    pub ln_invoice: String,
    /// Source token
    pub source_token: TokenId,
    /// Target token
    pub target_token: TokenId,
    /// Net sats received
    pub sats_receive: i64,
    /// Bitcoin HTLC fund txid
    #[serde(default)]
    pub bitcoin_htlc_fund_txid: Option<String>,
    /// Bitcoin HTLC claim txid
    #[serde(default)]
    pub bitcoin_htlc_claim_txid: Option<String>,
    /// EVM HTLC claim txid
    #[serde(default)]
    pub evm_htlc_claim_txid: Option<String>,
    /// EVM HTLC fund txid
    #[serde(default)]
    pub evm_htlc_fund_txid: Option<String>,
    /// Create swap transaction hash
    #[serde(default)]
    pub create_swap_tx: Option<String>,
    /// Token approval transaction hash
    #[serde(default)]
    pub approve_tx: Option<String>,
    /// Gelato forwarder contract
    #[serde(default)]
    pub gelato_forwarder_address: Option<String>,
    /// Gelato user nonce
    #[serde(default)]
    pub gelato_user_nonce: Option<String>,
    /// Gelato user deadline
    #[serde(default)]
    pub gelato_user_deadline: Option<String>,
    /// ERC20 token approved for the swap
    pub source_token_address: String,
}

/// Swap direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// BTC to EVM token
    BtcToEvm,
    /// EVM token to BTC
    EvmToBtc,
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::BtcToEvm => write!(f, "btc_to_evm"),
            SwapDirection::EvmToBtc => write!(f, "evm_to_btc"),
        }
    }
}

/// Swap of either direction, tagged on `direction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
#[allow(clippy::large_enum_variant)]
pub enum GetSwapResponse {
    /// BTC to EVM
    BtcToEvm(BtcToEvmSwapResponse),
    /// EVM to BTC
    EvmToBtc(EvmToBtcSwapResponse),
}

impl GetSwapResponse {
    /// Shared fields
    pub fn common(&self) -> &SwapCommonFields {
        match self {
            GetSwapResponse::BtcToEvm(r) => &r.common,
            GetSwapResponse::EvmToBtc(r) => &r.common,
        }
    }

    /// Swap id
    pub fn id(&self) -> String {
        self.common().id.to_string()
    }

    /// Lifecycle status
    pub fn status(&self) -> SwapStatus {
        self.common().status
    }

    /// Direction
    pub fn direction(&self) -> SwapDirection {
        match self {
            GetSwapResponse::BtcToEvm(_) => SwapDirection::BtcToEvm,
            GetSwapResponse::EvmToBtc(_) => SwapDirection::EvmToBtc,
        }
    }
}

impl From<BtcToEvmSwapResponse> for GetSwapResponse {
    fn from(response: BtcToEvmSwapResponse) -> Self {
        GetSwapResponse::BtcToEvm(response)
    }
}

impl From<EvmToBtcSwapResponse> for GetSwapResponse {
    fn from(response: EvmToBtcSwapResponse) -> Self {
        GetSwapResponse::EvmToBtc(response)
    }
}

/// Backend version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Release tag
    pub tag: String,
    /// Commit
    pub commit_hash: String,
}

/// Quote request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Source token
    pub from: TokenId,
    /// Target token
    pub to: TokenId,
    /// Amount in sats
    pub base_amount: u64,
}

/// Quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Fiat per BTC
    pub exchange_rate: String,
    /// Network fee estimate in sats
    pub network_fee: u64,
    /// Protocol fee in sats
    pub protocol_fee: u64,
    /// Protocol fee rate, `0.0025` is 0.25%
    pub protocol_fee_rate: f64,
    /// Minimum swap amount in sats
    pub min_amount: u64,
    /// Maximum swap amount in sats
    pub max_amount: u64,
}

/// Reveal the preimage to the backend relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimGelatoRequest {
    /// Hex preimage
    pub secret: String,
}

/// Ask for every swap created under an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverSwapsRequest {
    /// Identity xpub
    pub xpub: String,
}

/// Swap together with the index it was derived at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveredSwap {
    /// Swap
    #[serde(flatten)]
    pub swap: GetSwapResponse,
    /// Derivation index
    pub index: u32,
}

/// Swap history of an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoverSwapsResponse {
    /// Swaps
    pub swaps: Vec<RecoveredSwap>,
    /// Highest index the backend has seen for the identity
    pub highest_index: u32,
}

/// Error body returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Message
    pub error: String,
}

impl ErrorResponse {
    /// Error response from json
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;

        Self::from_value(value)
    }

    /// Error response from json Value
    ///
    /// Bodies without an `error` string are kept verbatim.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match serde_json::from_value::<ErrorResponse>(value.clone()) {
            Ok(res) => Ok(res),
            Err(_) => Ok(Self {
                error: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn common_json(status: &str) -> Value {
        json!({
            "id": "5d0f6c42-8a3b-4c7e-9e0f-7c1d2b3a4f50",
            "status": status,
            "hash_lock": "0xf9c3585ad8e0345d1ab9539731fcbd5bee5aabba3b4aa82567983ed9aca173b3",
            "fee_sats": 250,
            "asset_amount": 99.5,
            "sender_pk": "02fc7ee54d9b381d373dd8911247a42d88fb3ee7521c17cbe638a579c569bfc19b",
            "receiver_pk": "0265393346c0188676593f4335afd3bdba6d506522278fd1f1ecf8b2177be4c833",
            "server_pk": "03493441df4aeffeae06e03db0cbaeebb9c4b66814ceeda19e64eab07efd02e016",
            "refund_locktime": 1_700_000_000u32,
            "unilateral_claim_delay": 512,
            "unilateral_refund_delay": 1024,
            "unilateral_refund_without_receiver_delay": 2048,
            "network": "signet",
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_tagged_btc_to_evm() {
        let mut body = common_json("serverfunded");
        let extra = json!({
            "direction": "btc_to_evm",
            "htlc_address_evm": "0xabc",
            "htlc_address_arkade": "tark1q",
            "user_address_evm": "0xdef",
            "ln_invoice": "lnbc1",
            "sats_receive": 100_000,
            "source_token": "btc_arkade",
            "target_token": "usdc_pol",
            "bitcoin_htlc_claim_txid": null,
            "bitcoin_htlc_fund_txid": null,
            "evm_htlc_claim_txid": null,
            "evm_htlc_fund_txid": "0x01"
        });
        if let (Value::Object(body), Value::Object(extra)) = (&mut body, extra) {
            body.extend(extra);
        }

        let swap: GetSwapResponse = serde_json::from_value(body).unwrap();

        assert_eq!(swap.direction(), SwapDirection::BtcToEvm);
        assert_eq!(swap.status(), SwapStatus::ServerFunded);
        assert_eq!(swap.id(), "5d0f6c42-8a3b-4c7e-9e0f-7c1d2b3a4f50");
        match &swap {
            GetSwapResponse::BtcToEvm(r) => {
                assert_eq!(r.target_token, TokenId::Coin("usdc_pol".to_string()));
                assert_eq!(r.source_token, TokenId::BtcArkade);
                assert_eq!(r.evm_htlc_fund_txid.as_deref(), Some("0x01"));
            }
            GetSwapResponse::EvmToBtc(_) => panic!("wrong direction"),
        }

        let reencoded = serde_json::to_value(&swap).unwrap();
        assert_eq!(reencoded["direction"], "btc_to_evm");
        assert_eq!(reencoded["status"], "serverfunded");
    }

    #[test]
    fn test_recovered_swap_with_index() {
        let mut body = common_json("clientfunded");
        let extra = json!({
            "direction": "evm_to_btc",
            "index": 7,
            "htlc_address_evm": "0xabc",
            "htlc_address_arkade": "tark1q",
            "user_address_evm": "0xdef",
            "ln_invoice": "",
            "source_token": "usdc_pol",
            "target_token": "btc_lightning",
            "sats_receive": 90_000,
            "source_token_address": "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"
        });
        if let (Value::Object(body), Value::Object(extra)) = (&mut body, extra) {
            body.extend(extra);
        }

        let response: RecoverSwapsResponse = serde_json::from_value(json!({
            "swaps": [body],
            "highest_index": 7
        }))
        .unwrap();

        assert_eq!(response.highest_index, 7);
        assert_eq!(response.swaps[0].index, 7);
        assert_eq!(response.swaps[0].swap.direction(), SwapDirection::EvmToBtc);
        match &response.swaps[0].swap {
            GetSwapResponse::EvmToBtc(r) => assert!(r.user_address_arkade.is_none()),
            GetSwapResponse::BtcToEvm(_) => panic!("wrong direction"),
        }
    }

    #[test]
    fn test_unknown_status_rejects_swap() {
        let mut body = common_json("halfway");
        if let Value::Object(body) = &mut body {
            body.insert("direction".to_string(), json!("btc_to_evm"));
        }

        assert!(serde_json::from_value::<GetSwapResponse>(body).is_err());
    }

    #[test]
    fn test_error_response_fallback() {
        let err = ErrorResponse::from_json(r#"{"error":"swap not found"}"#).unwrap();
        assert_eq!(err.error, "swap not found");

        let err = ErrorResponse::from_json(r#"{"message":"bad gateway"}"#).unwrap();
        assert_eq!(err.error, r#"{"message":"bad gateway"}"#);
    }

    #[test]
    fn test_token_and_chain_parsing() {
        assert_eq!(
            TokenId::from_str("btc_lightning").unwrap(),
            TokenId::BtcLightning
        );
        assert_eq!(
            serde_json::to_string(&TokenId::Coin("usdt0_pol".to_string())).unwrap(),
            "\"usdt0_pol\""
        );
        assert_eq!(EvmChain::from_str("Polygon").unwrap(), EvmChain::Polygon);
        assert!(matches!(
            EvmChain::from_str("solana"),
            Err(Error::UnknownEvmChain(_))
        ));
    }
}
