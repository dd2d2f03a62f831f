//! Backend client

use std::fmt::Debug;

use async_trait::async_trait;
use lendaswap_common::api::{
    AssetPair, BtcToEvmSwapRequest, BtcToEvmSwapResponse, ClaimGelatoRequest, ErrorResponse,
    EvmChain, EvmToArkadeSwapRequest, EvmToBtcSwapResponse, EvmToLightningSwapRequest,
    GetSwapResponse, QuoteRequest, QuoteResponse, RecoverSwapsRequest, RecoverSwapsResponse,
    TokenInfo, Version,
};
use lendaswap_common::ApiUrl;
use reqwest::{Client, IntoUrl, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::error::Error;

/// Interface that connects a wallet to the Lendaswap backend. Typically represents an
/// [`HttpClient`].
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SwapConnector: Debug {
    /// Backend liveness
    async fn health(&self) -> Result<String, Error>;
    /// Tokens the backend can swap
    async fn get_tokens(&self) -> Result<Vec<TokenInfo>, Error>;
    /// Tradable pairs
    async fn get_asset_pairs(&self) -> Result<Vec<AssetPair>, Error>;
    /// Quote for swapping `base_amount` sats
    async fn get_quote(&self, request: QuoteRequest) -> Result<QuoteResponse, Error>;
    /// Current state of a swap
    async fn get_swap(&self, id: &str) -> Result<GetSwapResponse, Error>;
    /// Create a BTC (Arkade) to EVM swap
    async fn create_btc_to_evm_swap(
        &self,
        request: BtcToEvmSwapRequest,
        chain: EvmChain,
    ) -> Result<BtcToEvmSwapResponse, Error>;
    /// Create an EVM to Arkade swap
    async fn create_evm_to_arkade_swap(
        &self,
        request: EvmToArkadeSwapRequest,
        chain: EvmChain,
    ) -> Result<EvmToBtcSwapResponse, Error>;
    /// Create an EVM to Lightning swap
    async fn create_evm_to_lightning_swap(
        &self,
        request: EvmToLightningSwapRequest,
        chain: EvmChain,
    ) -> Result<EvmToBtcSwapResponse, Error>;
    /// Hand the preimage to the backend relay, which claims the EVM HTLC on the user's behalf
    async fn claim_gelato(&self, id: &str, secret: &str) -> Result<(), Error>;
    /// Backend version
    async fn get_version(&self) -> Result<Version, Error>;
    /// Every swap the backend knows for an identity xpub
    async fn recover_swaps(&self, xpub: &str) -> Result<RecoverSwapsResponse, Error>;
}

fn http_error(e: reqwest::Error) -> Error {
    Error::HttpError(e.status().map(|status_code| status_code.as_u16()), e.to_string())
}

/// Error of a non-2xx response, the backend's message when the body carries one
fn status_error(status: StatusCode, body: String) -> Error {
    tracing::warn!("Http Response error: {} {}", status, body);

    match ErrorResponse::from_json(&body) {
        Ok(err) => err.into(),
        Err(_) => Error::HttpError(Some(status.as_u16()), body),
    }
}

fn decode_response<R: DeserializeOwned>(status: StatusCode, body: &str) -> Result<R, Error> {
    if !status.is_success() {
        return Err(status_error(status, body.to_string()));
    }

    serde_json::from_str::<R>(body).map_err(|err| {
        tracing::warn!("Http Response error: {}", err);
        match ErrorResponse::from_json(body) {
            Ok(ok) => <ErrorResponse as Into<Error>>::into(ok),
            Err(err) => err.into(),
        }
    })
}

/// Http Client
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    api_url: ApiUrl,
}

impl HttpClient {
    /// Create new [`HttpClient`]
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            inner: Client::new(),
            api_url,
        }
    }

    /// Create new [`HttpClient`] on top of a configured [`reqwest::Client`]
    pub fn with_client(api_url: ApiUrl, inner: Client) -> Self {
        Self { inner, api_url }
    }

    /// Backend url
    pub fn api_url(&self) -> &ApiUrl {
        &self.api_url
    }

    async fn http_get<U: IntoUrl + Send, R: DeserializeOwned>(&self, url: U) -> Result<R, Error> {
        let response = self.inner.get(url).send().await.map_err(http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        decode_response(status, &body)
    }

    async fn http_post<U: IntoUrl + Send, P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: U,
        payload: &P,
    ) -> Result<R, Error> {
        let response = self
            .inner
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        decode_response(status, &body)
    }

    /// Post where only the status code matters; the body may be empty on success
    async fn http_post_empty<U: IntoUrl + Send, P: Serialize + ?Sized>(
        &self,
        url: U,
        payload: &P,
    ) -> Result<(), Error> {
        let response = self
            .inner
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.map_err(http_error)?;

        Err(status_error(status, body))
    }

    fn quote_url(&self, request: &QuoteRequest) -> Result<Url, Error> {
        let mut url = self.api_url.join_paths(&["quote"])?;
        url.query_pairs_mut()
            .append_pair("from", request.from.as_str())
            .append_pair("to", request.to.as_str())
            .append_pair("base_amount", &request.base_amount.to_string());
        Ok(url)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SwapConnector for HttpClient {
    #[instrument(skip(self), fields(api_url = %self.api_url))]
    async fn health(&self) -> Result<String, Error> {
        let url = self.api_url.join_paths(&["health"])?;

        self.inner
            .get(url)
            .send()
            .await
            .map_err(http_error)?
            .error_for_status()
            .map_err(http_error)?
            .text()
            .await
            .map_err(http_error)
    }

    #[instrument(skip(self), fields(api_url = %self.api_url))]
    async fn get_tokens(&self) -> Result<Vec<TokenInfo>, Error> {
        let url = self.api_url.join_paths(&["tokens"])?;
        self.http_get(url).await
    }

    #[instrument(skip(self), fields(api_url = %self.api_url))]
    async fn get_asset_pairs(&self) -> Result<Vec<AssetPair>, Error> {
        let url = self.api_url.join_paths(&["asset-pairs"])?;
        self.http_get(url).await
    }

    #[instrument(skip(self), fields(api_url = %self.api_url))]
    async fn get_quote(&self, request: QuoteRequest) -> Result<QuoteResponse, Error> {
        let url = self.quote_url(&request)?;
        self.http_get(url).await
    }

    #[instrument(skip(self), fields(api_url = %self.api_url))]
    async fn get_swap(&self, id: &str) -> Result<GetSwapResponse, Error> {
        let url = self.api_url.join_paths(&["swap", id])?;
        self.http_get(url).await
    }

    #[instrument(skip(self, request), fields(api_url = %self.api_url))]
    async fn create_btc_to_evm_swap(
        &self,
        request: BtcToEvmSwapRequest,
        chain: EvmChain,
    ) -> Result<BtcToEvmSwapResponse, Error> {
        let chain = chain.to_string();
        let url = self.api_url.join_paths(&["swap", "arkade", &chain])?;
        self.http_post(url, &request).await
    }

    #[instrument(skip(self, request), fields(api_url = %self.api_url))]
    async fn create_evm_to_arkade_swap(
        &self,
        request: EvmToArkadeSwapRequest,
        chain: EvmChain,
    ) -> Result<EvmToBtcSwapResponse, Error> {
        let chain = chain.to_string();
        let url = self.api_url.join_paths(&["swap", &chain, "arkade"])?;
        self.http_post(url, &request).await
    }

    #[instrument(skip(self, request), fields(api_url = %self.api_url))]
    async fn create_evm_to_lightning_swap(
        &self,
        request: EvmToLightningSwapRequest,
        chain: EvmChain,
    ) -> Result<EvmToBtcSwapResponse, Error> {
        let chain = chain.to_string();
        let url = self.api_url.join_paths(&["swap", &chain, "lightning"])?;
        self.http_post(url, &request).await
    }

    #[instrument(skip(self, secret), fields(api_url = %self.api_url))]
    async fn claim_gelato(&self, id: &str, secret: &str) -> Result<(), Error> {
        let url = self.api_url.join_paths(&["swap", id, "claim-gelato"])?;
        let request = ClaimGelatoRequest {
            secret: secret.to_string(),
        };
        self.http_post_empty(url, &request).await
    }

    #[instrument(skip(self), fields(api_url = %self.api_url))]
    async fn get_version(&self) -> Result<Version, Error> {
        let url = self.api_url.join_paths(&["version"])?;
        self.http_get(url).await
    }

    #[instrument(skip(self, xpub), fields(api_url = %self.api_url))]
    async fn recover_swaps(&self, xpub: &str) -> Result<RecoverSwapsResponse, Error> {
        let url = self.api_url.join_paths(&["swap", "recover"])?;
        let request = RecoverSwapsRequest {
            xpub: xpub.to_string(),
        };
        self.http_post(url, &request).await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use lendaswap_common::api::TokenId;

    use super::*;

    #[test]
    fn test_quote_url() {
        let client = HttpClient::new(ApiUrl::from_str("https://api.lendaswap.com/").unwrap());

        let url = client
            .quote_url(&QuoteRequest {
                from: TokenId::BtcArkade,
                to: TokenId::Coin("usdc_pol".to_string()),
                base_amount: 100_000,
            })
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.lendaswap.com/quote?from=btc_arkade&to=usdc_pol&base_amount=100000"
        );
    }

    #[test]
    fn test_error_status_keeps_code() {
        let result: Result<Version, Error> =
            decode_response(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");

        match result {
            Err(Error::HttpError(Some(code), body)) => {
                assert_eq!(code, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_status_with_backend_message() {
        let result: Result<Version, Error> = decode_response(
            StatusCode::NOT_FOUND,
            r#"{"error": "swap not found"}"#,
        );

        assert!(matches!(result, Err(Error::ErrorResponse(msg)) if msg == "swap not found"));
    }

    #[test]
    fn test_success_body_decoded() {
        let version: Version = decode_response(
            StatusCode::OK,
            r#"{"tag": "v0.3.0", "commit_hash": "abcdef0"}"#,
        )
        .unwrap();

        assert_eq!(version.tag, "v0.3.0");
    }

    #[test]
    fn test_api_url_kept() {
        let api_url = ApiUrl::from_str("http://localhost:3333/api").unwrap();
        let client = HttpClient::new(api_url.clone());

        assert_eq!(client.api_url(), &api_url);
        assert_eq!(
            client.api_url().join_paths(&["swap", "recover"]).unwrap().as_str(),
            "http://localhost:3333/api/swap/recover"
        );
    }
}
