//! Lendaswap client core
//!
//! Derives per-swap secrets from a single seed, tracks every swap through its cross-chain
//! lifecycle and rebuilds the local swap history from the seed alone.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod client;
pub mod counter;
pub mod derivation;
pub mod error;
pub mod memory;
#[cfg(all(feature = "price-feed", not(target_arch = "wasm32")))]
pub mod price_feed;
pub mod settlement;
pub mod wallet;

#[doc(hidden)]
pub use lendaswap_common::{self as common, api, database, status, Network, SwapStatus};
#[doc(hidden)]
pub use lendaswap_common::{ApiUrl, SwapRecord, SwapSecretBundle};

#[doc(hidden)]
pub use self::client::{HttpClient, SwapConnector};
#[doc(hidden)]
pub use self::error::Error;
#[cfg(all(feature = "price-feed", not(target_arch = "wasm32")))]
#[doc(hidden)]
pub use self::price_feed::PriceFeed;
#[doc(hidden)]
pub use self::settlement::{HtlcSettler, VhtlcAmounts, VhtlcParams};
#[doc(hidden)]
pub use self::wallet::{SwapWallet, SwapWalletBuilder};

/// Result type with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
