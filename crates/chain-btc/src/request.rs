//! JSON signing requests.
//!
//! A request names the outputs being spent, the outputs to create, and a
//! pool of WIF keys:
//!
//! ```json
//! {"in":   [{"txid": "<64 hex>", "vout": 0, "scriptpubkey": "<hex>"}],
//!  "outs": [{"addr": "<address>", "value": 1000}],
//!  "wifs": ["<wif>"]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BtcError;
use crate::ledger::SpendableOutput;
use crate::network::BtcNetwork;
use crate::script::pay_to_address_script;
use crate::signer::{sign_all, KeyLookup, PrevOutput};
use crate::transaction::{OutPoint, Transaction, TxInput, TxOutput, Txid};

/// One output to spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub txid: String,
    pub vout: u32,
    /// Hex of the scriptPubKey being spent.
    pub scriptpubkey: String,
}

impl From<SpendableOutput> for InputSpec {
    fn from(out: SpendableOutput) -> Self {
        Self {
            txid: out.txid,
            vout: out.vout,
            scriptpubkey: out.scriptpubkey,
        }
    }
}

/// One output to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub addr: String,
    /// Amount in satoshis.
    pub value: i64,
}

/// A complete signing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    #[serde(rename = "in", default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub outs: Vec<OutputSpec>,
    #[serde(default)]
    pub wifs: Vec<String>,
}

impl TxRequest {
    pub fn from_json(json: &[u8]) -> Result<Self, BtcError> {
        serde_json::from_slice(json)
            .map_err(|e| BtcError::MalformedInput(format!("couldn't parse request: {e}")))
    }

    /// Build the unsigned transaction and the previous outputs it spends.
    pub fn build(&self, network: BtcNetwork) -> Result<(Transaction, Vec<PrevOutput>), BtcError> {
        if self.inputs.is_empty() {
            return Err(BtcError::EmptyInputs);
        }
        if self.outs.is_empty() {
            return Err(BtcError::EmptyOutputs);
        }

        let outputs = self
            .outs
            .iter()
            .map(|out| build_output(out, network))
            .collect::<Result<Vec<_>, _>>()?;

        let mut inputs = Vec::with_capacity(self.inputs.len());
        let mut prevouts = Vec::with_capacity(self.inputs.len());
        for (i, spec) in self.inputs.iter().enumerate() {
            let txid: Txid = spec.txid.parse()?;
            let script_pubkey = hex::decode(&spec.scriptpubkey).map_err(|e| {
                BtcError::MalformedInput(format!("input {i}: scriptpubkey is not hex: {e}"))
            })?;
            inputs.push(TxInput::new(OutPoint::new(txid, spec.vout)));
            prevouts.push(PrevOutput::new(script_pubkey));
        }

        let tx = Transaction::new_unsigned(outputs, inputs)?;
        Ok((tx, prevouts))
    }
}

fn build_output(out: &OutputSpec, network: BtcNetwork) -> Result<TxOutput, BtcError> {
    if out.value < 0 {
        return Err(BtcError::MalformedInput(format!(
            "output to {} has negative value {}",
            out.addr, out.value
        )));
    }
    let script = pay_to_address_script(&out.addr, network)?;
    Ok(TxOutput::new(out.value, script))
}

/// Parse a JSON request, sign every input from the WIF pool, and return the
/// serialized transaction.
pub fn generate_signed_transaction(json: &[u8], network: BtcNetwork) -> Result<Vec<u8>, BtcError> {
    let request = TxRequest::from_json(json)?;
    let (mut tx, prevouts) = request.build(network)?;
    let lookup = KeyLookup::from_wifs(&request.wifs, network)?;

    sign_all(&mut tx, &prevouts, &lookup)?;

    tracing::debug!(
        inputs = tx.inputs().len(),
        outputs = tx.outputs().len(),
        txid = %tx.txid(),
        "signed transaction"
    );
    Ok(tx.serialize())
}
