//! Bitcoin network selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Bitcoin network a wallet operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Mainnet
    Bitcoin,
    /// Testnet
    Testnet,
    /// Local regtest
    Regtest,
    /// Mutinynet (signet)
    Mutinynet,
}

impl Network {
    /// Matching [`bitcoin::Network`]
    pub fn to_bitcoin_network(self) -> bitcoin::Network {
        match self {
            Network::Bitcoin => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
            Network::Regtest => bitcoin::Network::Regtest,
            Network::Mutinynet => bitcoin::Network::Signet,
        }
    }
}

impl From<Network> for bitcoin::Network {
    fn from(network: Network) -> Self {
        network.to_bitcoin_network()
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "mainnet" => Ok(Network::Bitcoin),
            "testnet" | "testnet3" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            "mutinynet" | "signet" => Ok(Network::Mutinynet),
            _ => Err(Error::UnknownNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Bitcoin => write!(f, "bitcoin"),
            Network::Testnet => write!(f, "testnet"),
            Network::Regtest => write!(f, "regtest"),
            Network::Mutinynet => write!(f, "mutinynet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_aliases() {
        assert_eq!(Network::from_str("mainnet").unwrap(), Network::Bitcoin);
        assert_eq!(Network::from_str("Signet").unwrap(), Network::Mutinynet);
        assert_eq!(Network::from_str("testnet3").unwrap(), Network::Testnet);
        assert!(matches!(
            Network::from_str("liquid"),
            Err(Error::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_signet_mapping() {
        assert_eq!(
            Network::Mutinynet.to_bitcoin_network(),
            bitcoin::Network::Signet
        );
        assert_eq!(Network::Regtest.to_string(), "regtest");
    }
}
