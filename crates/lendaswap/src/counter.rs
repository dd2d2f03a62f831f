//! Key index counter
//!
//! The one integer that must never hand out the same value twice for a seed. The increment is
//! persisted before the reserved index is returned, so a crash between the two leaks an index
//! instead of reusing it.

use std::fmt;

use lendaswap_common::database::DynWalletDatabase;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::derivation::MAX_KEY_INDEX;
use crate::error::Error;

/// Serialized access to the persisted key index
pub struct KeyIndexCounter {
    localstore: DynWalletDatabase,
    lock: Mutex<()>,
}

impl fmt::Debug for KeyIndexCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIndexCounter")
            .field("localstore", &self.localstore)
            .finish_non_exhaustive()
    }
}

impl KeyIndexCounter {
    /// Create new [`KeyIndexCounter`]
    pub fn new(localstore: DynWalletDatabase) -> Self {
        Self {
            localstore,
            lock: Mutex::new(()),
        }
    }

    /// Next index that would be reserved
    pub async fn current(&self) -> Result<u32, Error> {
        Ok(self.localstore.get_key_index().await?)
    }

    /// Reserve the next unused index
    ///
    /// Reads the current value, persists `current + 1` and only then returns `current`. If the
    /// persist fails nothing is returned and the caller must not derive anything.
    #[instrument(skip(self))]
    pub async fn reserve_next_index(&self) -> Result<u32, Error> {
        let _guard = self.lock.lock().await;

        let current = self.localstore.get_key_index().await?;
        if current > MAX_KEY_INDEX {
            return Err(Error::IndexOutOfRange(current));
        }

        self.localstore.set_key_index(current + 1).await?;

        tracing::debug!("Reserved key index {}", current);

        Ok(current)
    }

    /// Raise the counter to at least `floor`, returns the resulting value
    ///
    /// Never lowers the counter.
    #[instrument(skip(self))]
    pub async fn set_floor(&self, floor: u32) -> Result<u32, Error> {
        let _guard = self.lock.lock().await;

        let current = self.localstore.get_key_index().await?;
        if floor <= current {
            return Ok(current);
        }

        self.localstore.set_key_index(floor).await?;

        tracing::debug!("Raised key index from {} to {}", current, floor);

        Ok(floor)
    }

    /// Start over at `0` for a seed that was just replaced
    pub(crate) async fn reset_for_new_seed(&self) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        self.localstore.set_key_index(0).await?;
        Ok(())
    }
}
