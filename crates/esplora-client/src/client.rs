use std::time::Duration;

use chain_btc::ledger::{AddressLedger, LedgerError, LedgerTx, Utxo};
use chain_btc::{BtcNetwork, Txid};
use serde::de::DeserializeOwned;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Esplora REST client. Requests are not retried.
#[derive(Debug, Clone)]
pub struct EsploraClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl EsploraClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `https://blockstream.info/testnet/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, LedgerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Network(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Client for the network's public default endpoint.
    pub fn for_network(network: BtcNetwork) -> Result<Self, LedgerError> {
        Self::new(network.default_esplora_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LedgerError> {
        let url = self.url(path);
        tracing::debug!(%url, "esplora request");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| LedgerError::Network(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| LedgerError::Network(format!("couldn't read body of {url}: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%url, code = status.as_u16(), "esplora request rejected");
            return Err(LedgerError::HttpStatus {
                code: status.as_u16(),
                body,
            });
        }

        decode_body(&body)
    }
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, LedgerError> {
    serde_json::from_str(body).map_err(|e| LedgerError::Decode(e.to_string()))
}

/// Addresses are base58 or bech32, both plain alphanumerics.
fn address_segment(address: &str) -> Result<&str, LedgerError> {
    if address.is_empty() || !address.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(LedgerError::InvalidRequest(format!(
            "{address:?} is not an address"
        )));
    }
    Ok(address)
}

fn txid_segment(txid: &str) -> Result<String, LedgerError> {
    txid.parse::<Txid>()
        .map(|txid| txid.to_string())
        .map_err(|e| LedgerError::InvalidRequest(e.to_string()))
}

impl AddressLedger for EsploraClient {
    fn list_unspent_outputs(&self, address: &str) -> Result<Vec<Utxo>, LedgerError> {
        let address = address_segment(address)?;
        self.get_json(&format!("address/{address}/utxo"))
    }

    fn get_transaction(&self, txid: &str) -> Result<LedgerTx, LedgerError> {
        let txid = txid_segment(txid)?;
        self.get_json(&format!("tx/{txid}"))
    }
}
