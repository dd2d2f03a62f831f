use std::sync::Arc;

use lendaswap_common::database::{self, SwapDatabase, WalletDatabase};
use lendaswap_common::{ApiUrl, Network};

use crate::client::{HttpClient, SwapConnector};
use crate::error::Error;
use crate::settlement::HtlcSettler;
use crate::wallet::SwapWallet;

/// Builder for creating a new [`SwapWallet`]
#[derive(Default)]
pub struct SwapWalletBuilder {
    network: Option<Network>,
    api_url: Option<ApiUrl>,
    localstore: Option<Arc<dyn WalletDatabase<database::Error> + Send + Sync>>,
    swapstore: Option<Arc<dyn SwapDatabase<database::Error> + Send + Sync>>,
    client: Option<Arc<dyn SwapConnector + Send + Sync>>,
    settler: Option<Arc<dyn HtlcSettler + Send + Sync>>,
    referral_code: Option<String>,
}

impl SwapWalletBuilder {
    /// Create a new SwapWalletBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the network
    pub fn network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Set the backend URL, used when no custom client is set
    pub fn api_url(mut self, api_url: ApiUrl) -> Self {
        self.api_url = Some(api_url);
        self
    }

    /// Set the seed and key index storage
    pub fn localstore(
        mut self,
        localstore: Arc<dyn WalletDatabase<database::Error> + Send + Sync>,
    ) -> Self {
        self.localstore = Some(localstore);
        self
    }

    /// Set the swap record storage
    pub fn swapstore(
        mut self,
        swapstore: Arc<dyn SwapDatabase<database::Error> + Send + Sync>,
    ) -> Self {
        self.swapstore = Some(swapstore);
        self
    }

    /// Use one backend for both the seed and the swap storage
    pub fn store<D>(self, store: Arc<D>) -> Self
    where
        D: WalletDatabase<database::Error> + SwapDatabase<database::Error> + Send + Sync + 'static,
    {
        self.localstore(store.clone()).swapstore(store)
    }

    /// Set a custom client connector
    pub fn client<C: SwapConnector + 'static + Send + Sync>(mut self, client: C) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Set a custom client connector from Arc
    pub fn shared_client(mut self, client: Arc<dyn SwapConnector + Send + Sync>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the chain collaborator for claims and refunds
    pub fn settler<S: HtlcSettler + 'static + Send + Sync>(mut self, settler: S) -> Self {
        self.settler = Some(Arc::new(settler));
        self
    }

    /// Set the chain collaborator from Arc
    pub fn shared_settler(mut self, settler: Arc<dyn HtlcSettler + Send + Sync>) -> Self {
        self.settler = Some(settler);
        self
    }

    /// Set the referral code attached to created swaps
    pub fn referral_code(mut self, referral_code: Option<String>) -> Self {
        self.referral_code = referral_code;
        self
    }

    /// Build the wallet
    pub fn build(self) -> Result<SwapWallet, Error> {
        let network = self
            .network
            .ok_or(Error::Custom("Network required".to_string()))?;
        let localstore = self
            .localstore
            .ok_or(Error::Custom("Localstore required".to_string()))?;
        let swapstore = self
            .swapstore
            .ok_or(Error::Custom("Swapstore required".to_string()))?;

        let client = match self.client {
            Some(client) => client,
            None => {
                let api_url = self
                    .api_url
                    .ok_or(Error::Custom("Api url or client required".to_string()))?;
                Arc::new(HttpClient::new(api_url)) as Arc<dyn SwapConnector + Send + Sync>
            }
        };

        let mut wallet = SwapWallet::new(network, localstore, swapstore, client);
        wallet.settler = self.settler;
        wallet.referral_code = self.referral_code;

        Ok(wallet)
    }
}
