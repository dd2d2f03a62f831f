//! Swap history recovery
//!
//! Rebuilds the local swap records from the seed alone: the backend lists every swap created under
//! the identity xpub together with the key index it was derived at, and the wallet re-derives each
//! secret bundle at that index.
//!
//! Recovery commits all or nothing. Every bundle is derived before the first write. Each write
//! registers a compensation restoring the record it replaced, and if a later write or the final
//! counter update fails the compensations run in reverse order (LIFO) so the store looks as it did
//! before the call. Callers retry the whole recovery.

use std::collections::VecDeque;

use async_trait::async_trait;
use lendaswap_common::database::DynSwapDatabase;
use lendaswap_common::SwapRecord;
use tracing::instrument;

use super::SwapWallet;
use crate::error::Error;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
trait CompensatingAction: Send + Sync {
    async fn execute(&self, db: &DynSwapDatabase) -> Result<(), Error>;
    fn name(&self) -> &'static str;
}

/// Put back whatever was stored under `id` before recovery overwrote it
struct RestoreSwapRecord {
    id: String,
    previous: Option<SwapRecord>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CompensatingAction for RestoreSwapRecord {
    #[instrument(skip_all)]
    async fn execute(&self, db: &DynSwapDatabase) -> Result<(), Error> {
        match &self.previous {
            Some(previous) => db.store_swap(&self.id, previous.clone()).await?,
            None => db.delete_swap(&self.id).await?,
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RestoreSwapRecord"
    }
}

async fn compensate_all(
    db: &DynSwapDatabase,
    mut compensations: VecDeque<Box<dyn CompensatingAction>>,
) {
    tracing::warn!("Running {} compensating actions", compensations.len());

    while let Some(compensation) = compensations.pop_front() {
        tracing::debug!("Running compensation: {}", compensation.name());
        if let Err(e) = compensation.execute(db).await {
            tracing::error!(
                "Compensation {} failed: {}. Continuing...",
                compensation.name(),
                e
            );
        }
    }
}

impl SwapWallet {
    /// Restore every swap the backend knows for this seed
    ///
    /// Overwrites local copies of returned swaps and never deletes local-only records. Raises the
    /// key index past every recovered index and past the backend's `highest_index`, which still
    /// counts swaps it no longer returns. Returns the recovered records.
    #[instrument(skip(self))]
    pub async fn recover_swaps(&self) -> Result<Vec<SwapRecord>, Error> {
        // A seed import waits until the floor is raised
        let mut cached = self.deriver.write().await;
        let deriver = self.load_deriver(&mut cached).await?;
        let xpub = deriver.identity_xpub()?;

        let response = self.client.recover_swaps(&xpub.to_string()).await?;

        if response.swaps.is_empty() && response.highest_index == 0 {
            tracing::info!("Backend has no swaps for this seed");
            return Ok(Vec::new());
        }

        let max_swap_index = response
            .swaps
            .iter()
            .map(|swap| swap.index)
            .max()
            .unwrap_or_default();
        let highest_index = response.highest_index.max(max_swap_index);
        let floor = highest_index
            .checked_add(1)
            .ok_or(Error::IndexOutOfRange(highest_index))?;

        let records = response
            .swaps
            .into_iter()
            .map(|recovered| {
                let bundle = deriver.derive(recovered.index)?;
                Ok(SwapRecord::new(recovered.swap, bundle))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let mut compensations: VecDeque<Box<dyn CompensatingAction>> = VecDeque::new();

        for record in &records {
            let id = record.id();

            let previous = match self.swapstore.get_swap(&id).await {
                Ok(previous) => previous,
                Err(err) => {
                    compensate_all(&self.swapstore, compensations).await;
                    return Err(err.into());
                }
            };

            if let Err(err) = self.swapstore.store_swap(&id, record.clone()).await {
                tracing::warn!("Failed to store recovered swap {}: {}", id, err);
                compensate_all(&self.swapstore, compensations).await;
                return Err(err.into());
            }

            compensations.push_front(Box::new(RestoreSwapRecord { id, previous }));
        }

        let key_index = match self.counter.set_floor(floor).await {
            Ok(key_index) => key_index,
            Err(err) => {
                compensate_all(&self.swapstore, compensations).await;
                return Err(err);
            }
        };

        tracing::info!(
            "Recovered {} swaps, next key index {}",
            records.len(),
            key_index
        );

        Ok(records)
    }
}
