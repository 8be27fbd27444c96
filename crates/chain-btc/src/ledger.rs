//! Address ledger boundary.
//!
//! [`AddressLedger`] abstracts a block explorer that can list an address's
//! unspent outputs and return transaction details. The types mirror the
//! Esplora JSON schema; an HTTP implementation lives in `esplora-client`.

use serde::{Deserialize, Serialize};

pub use crate::error::LedgerError;

/// Confirmation status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    pub confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_time: Option<u64>,
}

/// An unspent output held by an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub status: TxStatus,
    pub value: u64,
}

/// A transaction output as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerVout {
    pub scriptpubkey: String,
    /// Absent for scripts that have no address form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

/// A transaction input as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerVin {
    pub txid: String,
    pub vout: u32,
    /// `null` for coinbase inputs.
    #[serde(default)]
    pub prevout: Option<LedgerVout>,
    #[serde(default)]
    pub is_coinbase: bool,
    pub sequence: u32,
}

/// A transaction as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTx {
    pub txid: String,
    pub version: i32,
    pub locktime: u32,
    pub vin: Vec<LedgerVin>,
    pub vout: Vec<LedgerVout>,
    pub fee: u64,
    pub status: TxStatus,
}

/// Read-only view of a block explorer.
pub trait AddressLedger {
    /// Unspent outputs currently held by `address`.
    fn list_unspent_outputs(&self, address: &str) -> Result<Vec<Utxo>, LedgerError>;

    /// Full details of the transaction `txid` (display-order hex).
    fn get_transaction(&self, txid: &str) -> Result<LedgerTx, LedgerError>;
}

/// An unspent output with the scriptPubKey needed to spend it.
///
/// Serializes to the shape of one entry of a signing request's `in` array,
/// plus the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendableOutput {
    pub txid: String,
    pub vout: u32,
    pub scriptpubkey: String,
    pub value: u64,
}

/// Resolve every UTXO of `address` to a [`SpendableOutput`].
///
/// Fetches each UTXO's transaction and takes the output it names. The
/// output must pay `address`; anything else means the ledger contradicted
/// itself.
pub fn spendable_outputs(
    ledger: &dyn AddressLedger,
    address: &str,
) -> Result<Vec<SpendableOutput>, LedgerError> {
    let utxos = ledger.list_unspent_outputs(address)?;
    tracing::debug!(address, count = utxos.len(), "listed unspent outputs");

    let mut spendable = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        let tx = ledger.get_transaction(&utxo.txid)?;
        let output = tx.vout.get(utxo.vout as usize).ok_or_else(|| {
            LedgerError::Inconsistent(format!(
                "transaction {} has {} outputs, UTXO names output {}",
                utxo.txid,
                tx.vout.len(),
                utxo.vout
            ))
        })?;

        if output.scriptpubkey_address.as_deref() != Some(address) {
            return Err(LedgerError::Inconsistent(format!(
                "output {}:{} does not pay {address}",
                utxo.txid, utxo.vout
            )));
        }

        spendable.push(SpendableOutput {
            txid: utxo.txid,
            vout: utxo.vout,
            scriptpubkey: output.scriptpubkey.clone(),
            value: output.value,
        });
    }
    Ok(spendable)
}
