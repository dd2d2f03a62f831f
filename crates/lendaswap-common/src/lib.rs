//! Lendaswap shared types and functions.
//!
//! This crate is the base foundation for the Lendaswap client crates. It holds the backend wire
//! types, the swap lifecycle vocabulary, the locally persisted swap record and the storage traits
//! every database backend implements.

pub mod api;
pub mod api_url;
pub mod database;
pub mod error;
pub mod network;
pub mod status;
pub mod swap;
pub mod util;

// re-exporting external crates
pub use bitcoin;

pub use self::api_url::ApiUrl;
pub use self::error::Error;
pub use self::network::Network;
pub use self::status::SwapStatus;
pub use self::swap::{SwapRecord, SwapSecretBundle};
