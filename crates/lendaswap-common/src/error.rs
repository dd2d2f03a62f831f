//! Errors

use thiserror::Error;

/// Common error
#[derive(Debug, Error)]
pub enum Error {
    /// Status string outside the known lifecycle vocabulary
    #[error("Unknown swap status: `{0}`")]
    UnknownSwapStatus(String),
    /// Unknown network name
    #[error("Unknown network: `{0}`")]
    UnknownNetwork(String),
    /// Unknown EVM chain name
    #[error("Unknown EVM chain: `{0}`. Expected `ethereum` or `polygon`")]
    UnknownEvmChain(String),
    /// Invalid API url
    #[error("Invalid URL")]
    InvalidUrl,
    /// Url Error
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Hex Error
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    /// Serde Json Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
