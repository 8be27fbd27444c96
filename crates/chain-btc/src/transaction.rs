use std::fmt;
use std::str::FromStr;

use crypto_utils::hash::sha256d;

use crate::error::BtcError;

/// Transaction format version written by this crate.
pub const TX_VERSION: i32 = 1;

/// Final sequence number: no relative lock time, no replacement signalling.
pub const DEFAULT_SEQUENCE: u32 = 0xFFFF_FFFF;

/// A transaction id in display (RPC / block explorer) byte order.
///
/// The wire format carries the bytes reversed; see [`Txid::to_wire_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Txid([u8; 32]);

impl Txid {
    pub fn from_display_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_display_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Internal byte order, as serialized inside an outpoint.
    pub fn to_wire_bytes(&self) -> [u8; 32] {
        let mut wire = self.0;
        wire.reverse();
        wire
    }
}

impl FromStr for Txid {
    type Err = BtcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(BtcError::InvalidTxId(format!(
                "expected 64 hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| BtcError::InvalidTxId(format!("'{s}' is not hex: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub txid: Txid,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Txid, vout: u32) -> Self {
        Self { txid, vout }
    }
}

/// A transaction input. Its scriptSig starts empty and can be written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    pub previous_output: OutPoint,
    script_sig: Option<Vec<u8>>,
    pub sequence: u32,
}

impl TxInput {
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: None,
            sequence: DEFAULT_SEQUENCE,
        }
    }

    /// The attached scriptSig, or an empty script while unsigned.
    pub fn script_sig(&self) -> &[u8] {
        self.script_sig.as_deref().unwrap_or_default()
    }

    pub fn is_signed(&self) -> bool {
        self.script_sig.is_some()
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    value: i64,
    script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: i64, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    /// Amount in satoshis.
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn script_pubkey(&self) -> &[u8] {
        &self.script_pubkey
    }
}

/// Progress of signing across a transaction's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningState {
    Unsigned,
    PartiallySigned { signed: usize },
    FullySigned,
}

/// Which scriptSigs to write while encoding.
#[derive(Clone, Copy)]
enum ScriptSigs<'a> {
    /// Each input's attached scriptSig.
    Attached,
    /// All scriptSigs empty except `index`, which carries `script_code`.
    ScriptCode { index: usize, script_code: &'a [u8] },
}

/// A legacy (non-witness) Bitcoin transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    version: i32,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    lock_time: u32,
}

impl Transaction {
    /// Build an unsigned version 1 transaction with lock time 0.
    ///
    /// Outputs are validated before inputs: with both empty, the error is
    /// `EmptyOutputs`.
    pub fn new_unsigned(outputs: Vec<TxOutput>, inputs: Vec<TxInput>) -> Result<Self, BtcError> {
        if outputs.is_empty() {
            return Err(BtcError::EmptyOutputs);
        }
        if inputs.is_empty() {
            return Err(BtcError::EmptyInputs);
        }
        Ok(Self {
            version: TX_VERSION,
            inputs,
            outputs,
            lock_time: 0,
        })
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.lock_time
    }

    pub fn signing_state(&self) -> SigningState {
        match self.signed_count() {
            0 => SigningState::Unsigned,
            n if n == self.inputs.len() => SigningState::FullySigned,
            signed => SigningState::PartiallySigned { signed },
        }
    }

    /// Inputs are signed front to back, so the signed ones form a prefix.
    fn signed_count(&self) -> usize {
        self.inputs.iter().take_while(|input| input.is_signed()).count()
    }

    /// Check that input `index` is the next one due for a scriptSig.
    pub(crate) fn ensure_signable(&self, index: usize) -> Result<(), BtcError> {
        let input = self.inputs.get(index).ok_or_else(|| {
            BtcError::MalformedInput(format!(
                "input index {index} out of range for {} inputs",
                self.inputs.len()
            ))
        })?;
        if input.is_signed() {
            return Err(BtcError::ScriptSigAlreadySet(index));
        }
        let expected = self.signed_count();
        if index != expected {
            return Err(BtcError::OutOfOrderSigning {
                expected,
                got: index,
            });
        }
        Ok(())
    }

    /// Attach the scriptSig of input `index`. Each input accepts exactly one.
    pub(crate) fn attach_script_sig(
        &mut self,
        index: usize,
        script_sig: Vec<u8>,
    ) -> Result<(), BtcError> {
        self.ensure_signable(index)?;
        self.inputs[index].script_sig = Some(script_sig);
        Ok(())
    }

    /// Canonical wire serialization.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.estimated_size());
        self.encode_into(&mut buf, ScriptSigs::Attached);
        buf
    }

    /// Lowercase hex of [`Transaction::serialize`].
    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    pub fn txid(&self) -> Txid {
        let mut hash = sha256d(&self.serialize());
        hash.reverse();
        Txid(hash)
    }

    /// Serialization used by the legacy signature digest: every scriptSig is
    /// blanked and input `index` carries `script_code` instead.
    pub(crate) fn serialize_with_script_code(&self, index: usize, script_code: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.estimated_size() + script_code.len() + 4);
        self.encode_into(&mut buf, ScriptSigs::ScriptCode { index, script_code });
        buf
    }

    fn estimated_size(&self) -> usize {
        // version + locktime + counts, then per-item fixed parts.
        let inputs: usize = self.inputs.iter().map(|i| 41 + i.script_sig().len()).sum();
        let outputs: usize = self.outputs.iter().map(|o| 9 + o.script_pubkey.len()).sum();
        8 + 2 + inputs + outputs
    }

    fn encode_into(&self, buf: &mut Vec<u8>, script_sigs: ScriptSigs<'_>) {
        buf.extend_from_slice(&self.version.to_le_bytes());

        write_compact_size(buf, self.inputs.len() as u64);
        for (i, input) in self.inputs.iter().enumerate() {
            buf.extend_from_slice(&input.previous_output.txid.to_wire_bytes());
            buf.extend_from_slice(&input.previous_output.vout.to_le_bytes());
            let script_sig = match script_sigs {
                ScriptSigs::Attached => input.script_sig(),
                ScriptSigs::ScriptCode { index, script_code } if index == i => script_code,
                ScriptSigs::ScriptCode { .. } => &[],
            };
            write_compact_size(buf, script_sig.len() as u64);
            buf.extend_from_slice(script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(buf, self.outputs.len() as u64);
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            write_compact_size(buf, output.script_pubkey.len() as u64);
            buf.extend_from_slice(&output.script_pubkey);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
    }
}

/// Write a Bitcoin CompactSize (variable-length integer).
pub fn write_compact_size(buf: &mut Vec<u8>, val: u64) {
    if val < 0xFD {
        buf.push(val as u8);
    } else if val <= 0xFFFF {
        buf.push(0xFD);
        buf.extend_from_slice(&(val as u16).to_le_bytes());
    } else if val <= 0xFFFF_FFFF {
        buf.push(0xFE);
        buf.extend_from_slice(&(val as u32).to_le_bytes());
    } else {
        buf.push(0xFF);
        buf.extend_from_slice(&val.to_le_bytes());
    }
}
