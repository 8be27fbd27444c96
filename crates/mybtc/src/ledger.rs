//! Ledger handed to commands.
//!
//! The HTTP client is only built when a command first queries the ledger,
//! so the offline commands never depend on it.

use std::sync::OnceLock;

use chain_btc::ledger::{AddressLedger, LedgerError, LedgerTx, Utxo};
use esplora_client::EsploraClient;

/// An [`EsploraClient`] created on first use.
#[derive(Debug)]
pub struct LazyEsploraLedger {
    base_url: String,
    client: OnceLock<EsploraClient>,
}

impl LazyEsploraLedger {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: OnceLock::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the HTTP client has been built yet.
    pub fn is_connected(&self) -> bool {
        self.client.get().is_some()
    }

    fn client(&self) -> Result<&EsploraClient, LedgerError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = EsploraClient::new(self.base_url.as_str())?;
        tracing::debug!(base_url = %client.base_url(), "esplora client ready");
        Ok(self.client.get_or_init(|| client))
    }
}

impl AddressLedger for LazyEsploraLedger {
    fn list_unspent_outputs(&self, address: &str) -> Result<Vec<Utxo>, LedgerError> {
        self.client()?.list_unspent_outputs(address)
    }

    fn get_transaction(&self, txid: &str) -> Result<LedgerTx, LedgerError> {
        self.client()?.get_transaction(txid)
    }
}
