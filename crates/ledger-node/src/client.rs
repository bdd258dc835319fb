use anyhow::Result;
use ledger_core::{ChainFetcher, ChainResponse};
use reqwest::Client;
use std::time::Duration;

/// Fetches `GET http://<peer>/chain`. Peers are always spoken to over plain
/// HTTP.
#[derive(Clone, Debug)]
pub struct HttpChainFetcher {
    http: Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        let response = self
            .http
            .get(format!("http://{peer}/chain"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<ChainResponse>().await?)
    }
}
