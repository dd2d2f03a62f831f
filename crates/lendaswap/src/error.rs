//! Lendaswap Errors

use lendaswap_common::api::{ErrorResponse, SwapDirection};
use lendaswap_common::{database, SwapStatus};
use thiserror::Error;

/// Lendaswap Error
#[derive(Debug, Error)]
pub enum Error {
    /// No seed stored yet
    #[error("No seed found in storage. Generate or import one first")]
    NoSeed,
    /// Seed phrase could not be parsed
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
    /// Index beyond the hardened derivation range
    #[error("Key index {0} out of range")]
    IndexOutOfRange(u32),
    /// BIP32 derivation error
    #[error(transparent)]
    KeyDerivation(#[from] bitcoin::bip32::Error),
    /// Swap not found locally
    #[error("Swap not found: `{0}`")]
    SwapNotFound(String),
    /// Swap status does not permit a claim
    #[error("Swap `{id}` cannot be claimed in status `{status}`")]
    ClaimNotPermitted {
        /// Swap id
        id: String,
        /// Status
        status: SwapStatus,
    },
    /// Swap status or time does not permit a refund
    #[error("Swap `{id}` cannot be refunded in status `{status}` (refund locktime {refund_locktime})")]
    RefundNotPermitted {
        /// Swap id
        id: String,
        /// Status
        status: SwapStatus,
        /// Absolute refund locktime
        refund_locktime: u32,
    },
    /// Operation not available for the swap direction
    #[error("Swap `{id}` is {direction}, operation not supported")]
    WrongDirection {
        /// Swap id
        id: String,
        /// Direction
        direction: SwapDirection,
    },
    /// Stored record failed validation
    #[error("Swap record `{0}` is corrupt: secret bundle does not match hash lock")]
    CorruptRecord(String),
    /// Backend locked the swap to a different hash than the one sent
    #[error("Swap `{id}` is locked to `{found}`, expected `{expected}`")]
    HashLockMismatch {
        /// Swap id
        id: String,
        /// Hash lock sent
        expected: String,
        /// Hash lock in the response
        found: String,
    },
    /// Claim or refund needs an [`HtlcSettler`](crate::HtlcSettler)
    #[error("No HTLC settler configured")]
    NoSettler,
    /// Required field missing in a swap response
    #[error("Missing field `{0}`")]
    MissingField(&'static str),
    /// Transport error
    #[error("HTTP error ({0:?}): {1}")]
    HttpError(Option<u16>, String),
    /// Backend returned an error body
    #[error("Backend error: {0}")]
    ErrorResponse(String),
    /// Chain settlement failed
    #[error("Settlement error: {0}")]
    Settlement(String),
    /// Price feed error
    #[error("Price feed error: {0}")]
    PriceFeed(String),
    /// Reqwest error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// Database Error
    #[error(transparent)]
    Database(#[from] database::Error),
    /// Common Error
    #[error(transparent)]
    Common(#[from] lendaswap_common::Error),
    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// Custom Error
    #[error("`{0}`")]
    Custom(String),
}

impl From<Error> for database::Error {
    fn from(e: Error) -> Self {
        Self::Database(Box::new(e))
    }
}

impl From<ErrorResponse> for Error {
    fn from(err: ErrorResponse) -> Error {
        Self::ErrorResponse(err.error)
    }
}

impl From<bip39::Error> for Error {
    fn from(err: bip39::Error) -> Error {
        Self::InvalidSeed(err.to_string())
    }
}
