//! Swap secret derivation
//!
//! Every swap gets its own keypair and preimage, derived from the wallet seed at a key index:
//!
//! * swap key: `m/83696968'/121923'/{index}'`
//! * preimage: BIP340 style tagged hash of the swap secret key with tag `lendaswap/preimage`
//! * identity: the xpub at `m/9419'/121923'/0'`, shared with the backend for recovery. The
//!   per-swap `user_id` is its non-hardened child `9419/121923/{index}`.
//!
//! The index sits in a hardened path element, so it is part of the HMAC input of the final
//! derivation step and distinct indices give unrelated keys.

use std::fmt;
use std::str::FromStr;

use bip39::Mnemonic;
use bitcoin::bip32::{ChildNumber, DerivationPath, Xpriv, Xpub};
use bitcoin::hashes::{sha256, Hash, HashEngine};
use bitcoin::secp256k1::{All, PublicKey, Secp256k1};
use lendaswap_common::{Network, SwapSecretBundle};

use crate::error::Error;

/// Purpose of swap signing keys
pub const SIGNING_PREFIX: u32 = 83_696_968;
/// Purpose of identity keys
pub const ID_PREFIX: u32 = 9419;
/// "LSW"
pub const LSW_IDENTIFIER: u32 = 121_923;
/// Highest usable key index
pub const MAX_KEY_INDEX: u32 = (1 << 31) - 1;

const PREIMAGE_TAG: &str = "lendaswap/preimage";

/// Derives swap secrets from a seed
///
/// Pure: no storage, no network and no index bookkeeping.
#[derive(Clone)]
pub struct SwapKeyDeriver {
    secp: Secp256k1<All>,
    master: Xpriv,
}

impl fmt::Debug for SwapKeyDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapKeyDeriver")
            .field("network", &self.master.network)
            .finish_non_exhaustive()
    }
}

impl SwapKeyDeriver {
    /// Create new [`SwapKeyDeriver`] from a BIP39 mnemonic
    pub fn from_mnemonic(phrase: &str, network: Network) -> Result<Self, Error> {
        let mnemonic = Mnemonic::from_str(phrase)?;
        Self::from_seed(&mnemonic.to_seed_normalized(""), network)
    }

    /// Create new [`SwapKeyDeriver`] from raw seed bytes
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self, Error> {
        let master = Xpriv::new_master(network.to_bitcoin_network(), seed)
            .map_err(|e| Error::InvalidSeed(e.to_string()))?;

        Ok(Self {
            secp: Secp256k1::new(),
            master,
        })
    }

    /// Derive the secret bundle at `index`
    pub fn derive(&self, index: u32) -> Result<SwapSecretBundle, Error> {
        if index > MAX_KEY_INDEX {
            return Err(Error::IndexOutOfRange(index));
        }

        let path = DerivationPath::from(vec![
            ChildNumber::from_hardened_idx(SIGNING_PREFIX)?,
            ChildNumber::from_hardened_idx(LSW_IDENTIFIER)?,
            ChildNumber::from_hardened_idx(index)?,
        ]);

        let secret_key = self.master.derive_priv(&self.secp, &path)?.private_key;
        let public_key = secret_key.public_key(&self.secp);

        let preimage = tagged_hash(PREIMAGE_TAG, &secret_key.secret_bytes());
        let preimage_hash = sha256::Hash::hash(&preimage).to_byte_array();

        let user_id = self.derive_user_id(index)?;

        Ok(SwapSecretBundle {
            secret_key,
            public_key,
            preimage,
            preimage_hash,
            user_id,
            key_index: index,
        })
    }

    /// Identity xpub at `m/9419'/121923'/0'`
    ///
    /// Hardened, so a leaked per-swap `user_id` secret cannot reach the master key.
    pub fn identity_xpub(&self) -> Result<Xpub, Error> {
        let path = DerivationPath::from(vec![
            ChildNumber::from_hardened_idx(ID_PREFIX)?,
            ChildNumber::from_hardened_idx(LSW_IDENTIFIER)?,
            ChildNumber::from_hardened_idx(0)?,
        ]);

        let xpriv = self.master.derive_priv(&self.secp, &path)?;
        Ok(Xpub::from_priv(&self.secp, &xpriv))
    }

    fn derive_user_id(&self, index: u32) -> Result<PublicKey, Error> {
        let path = DerivationPath::from(vec![
            ChildNumber::from_normal_idx(ID_PREFIX)?,
            ChildNumber::from_normal_idx(LSW_IDENTIFIER)?,
            ChildNumber::from_normal_idx(index)?,
        ]);

        Ok(self
            .identity_xpub()?
            .derive_pub(&self.secp, &path)?
            .public_key)
    }
}

/// `sha256(sha256(tag) || sha256(tag) || msg)`
fn tagged_hash(tag: &str, msg: &[u8]) -> [u8; 32] {
    let tag_hash = sha256::Hash::hash(tag.as_bytes());

    let mut engine = sha256::Hash::engine();
    engine.input(tag_hash.as_ref());
    engine.input(tag_hash.as_ref());
    engine.input(msg);

    sha256::Hash::from_engine(engine).to_byte_array()
}
