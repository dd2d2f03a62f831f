//! Redb storage backend for the Lendaswap client

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod error;
pub mod wallet;

pub use wallet::WalletRedbDatabase;
