//! Locally persisted swap data

use std::fmt;

use bitcoin::hashes::{sha256, Hash};
use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};

use crate::api::{GetSwapResponse, SwapDirection};
use crate::status::SwapStatus;

/// `[u8; 32]` as a hex string
mod hex_bytes32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(bytes)
    }
}

/// Secret material of one swap
///
/// Derived once from the wallet seed at `key_index` and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapSecretBundle {
    /// Own secret key
    pub secret_key: SecretKey,
    /// Own public key
    pub public_key: PublicKey,
    /// Preimage
    #[serde(with = "hex_bytes32")]
    pub preimage: [u8; 32],
    /// `sha256(preimage)`
    #[serde(with = "hex_bytes32")]
    pub preimage_hash: [u8; 32],
    /// Per-swap identity key the backend indexes the swap by
    pub user_id: PublicKey,
    /// Derivation index
    pub key_index: u32,
}

impl SwapSecretBundle {
    /// `0x` prefixed hex of the preimage hash, as sent in `hash_lock`
    pub fn hash_lock(&self) -> String {
        format!("0x{}", hex::encode(self.preimage_hash))
    }

    /// Hex of the preimage
    pub fn preimage_hex(&self) -> String {
        hex::encode(self.preimage)
    }

    /// Hex of the compressed own public key
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Hex of the compressed identity key
    pub fn user_id_hex(&self) -> String {
        hex::encode(self.user_id.serialize())
    }

    /// Whether `preimage_hash` is the hash of `preimage` and `public_key` belongs to `secret_key`
    pub fn is_consistent(&self) -> bool {
        let secp = Secp256k1::signing_only();
        sha256::Hash::hash(&self.preimage).to_byte_array() == self.preimage_hash
            && self.secret_key.public_key(&secp) == self.public_key
    }
}

impl fmt::Debug for SwapSecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapSecretBundle")
            .field("secret_key", &"[redacted]")
            .field("public_key", &self.public_key)
            .field("preimage", &"[redacted]")
            .field("preimage_hash", &hex::encode(self.preimage_hash))
            .field("user_id", &self.user_id)
            .field("key_index", &self.key_index)
            .finish()
    }
}

/// Swap as stored locally: the latest server response plus the secret bundle it was created with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
    /// Last server response, replaced on every refresh
    pub response: GetSwapResponse,
    /// Secret bundle, fixed at creation
    #[serde(rename = "swap_params")]
    pub secret_bundle: SwapSecretBundle,
}

impl SwapRecord {
    /// Create new [`SwapRecord`]
    pub fn new(response: GetSwapResponse, secret_bundle: SwapSecretBundle) -> Self {
        Self {
            response,
            secret_bundle,
        }
    }

    /// Swap id
    pub fn id(&self) -> String {
        self.response.id()
    }

    /// Direction
    pub fn direction(&self) -> SwapDirection {
        self.response.direction()
    }

    /// Status of the last server response
    pub fn status(&self) -> SwapStatus {
        self.response.status()
    }

    /// Same record with a newer server response
    pub fn with_response(self, response: GetSwapResponse) -> Self {
        Self {
            response,
            secret_bundle: self.secret_bundle,
        }
    }
}
