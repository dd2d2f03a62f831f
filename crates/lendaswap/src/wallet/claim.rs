use lendaswap_common::api::{GetSwapResponse, SwapDirection};
use lendaswap_common::util::unix_time;
use lendaswap_common::SwapRecord;
use tracing::instrument;

use super::SwapWallet;
use crate::error::Error;
use crate::settlement::{VhtlcAmounts, VhtlcParams};

impl SwapWallet {
    /// Claim a swap whose server leg is funded
    ///
    /// BTC to EVM swaps reveal the preimage to the backend relay, which claims the EVM HTLC for
    /// the user; the returned value is then empty. EVM to BTC swaps claim the Arkade VHTLC through
    /// the settler and return its txid.
    #[instrument(skip(self))]
    pub async fn claim(&self, id: &str) -> Result<Option<String>, Error> {
        let record = self.load_for_settlement(id).await?;

        let status = record.status();
        if !status.can_claim() {
            return Err(Error::ClaimNotPermitted {
                id: id.to_string(),
                status,
            });
        }

        match &record.response {
            GetSwapResponse::BtcToEvm(_) => {
                self.client
                    .claim_gelato(id, &record.secret_bundle.preimage_hex())
                    .await?;

                tracing::info!("Revealed preimage of swap {} to the relay", id);

                Ok(None)
            }
            GetSwapResponse::EvmToBtc(response) => {
                let destination = response
                    .user_address_arkade
                    .as_deref()
                    .ok_or(Error::MissingField("user_address_arkade"))?;
                let params = VhtlcParams::from_record(&record)?;

                let txid = self
                    .settler()?
                    .claim(&record, &params, destination)
                    .await?;

                tracing::info!("Claimed swap {} in {}", id, txid);

                Ok(Some(txid))
            }
        }
    }

    /// Refund the client leg of a BTC to EVM swap once its locktime has passed
    #[instrument(skip(self))]
    pub async fn refund(&self, id: &str, refund_address: &str) -> Result<String, Error> {
        let record = self.load_for_settlement(id).await?;

        let direction = record.direction();
        if direction != SwapDirection::BtcToEvm {
            return Err(Error::WrongDirection {
                id: id.to_string(),
                direction,
            });
        }

        let status = record.status();
        let refund_locktime = record.response.common().refund_locktime;
        if !status.can_refund(unix_time(), refund_locktime) {
            return Err(Error::RefundNotPermitted {
                id: id.to_string(),
                status,
                refund_locktime,
            });
        }

        let params = VhtlcParams::from_record(&record)?;
        let txid = self
            .settler()?
            .refund(&record, &params, refund_address)
            .await?;

        tracing::info!("Refunded swap {} in {}", id, txid);

        Ok(txid)
    }

    /// VHTLC parameters of a stored swap
    pub async fn vhtlc_params(&self, id: &str) -> Result<VhtlcParams, Error> {
        let record = self
            .swapstore
            .get_swap(id)
            .await?
            .ok_or_else(|| Error::SwapNotFound(id.to_string()))?;

        VhtlcParams::from_record(&record)
    }

    /// Amounts currently locked in the VHTLC of a BTC to EVM swap
    ///
    /// Only BTC to EVM swaps have a VHTLC funded by the client.
    pub async fn amounts_for_swap(&self, id: &str) -> Result<VhtlcAmounts, Error> {
        let record = self
            .swapstore
            .get_swap(id)
            .await?
            .ok_or_else(|| Error::SwapNotFound(id.to_string()))?;

        let direction = record.direction();
        if direction != SwapDirection::BtcToEvm {
            return Err(Error::WrongDirection {
                id: id.to_string(),
                direction,
            });
        }

        let params = VhtlcParams::from_record(&record)?;
        self.settler()?.amounts(&params).await
    }

    async fn load_for_settlement(&self, id: &str) -> Result<SwapRecord, Error> {
        let record = self
            .swapstore
            .get_swap(id)
            .await?
            .ok_or_else(|| Error::SwapNotFound(id.to_string()))?;

        if !record.secret_bundle.is_consistent() {
            tracing::warn!("Swap {} has an inconsistent secret bundle", id);
            return Err(Error::CorruptRecord(id.to_string()));
        }

        Ok(record)
    }
}
