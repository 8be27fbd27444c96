use thiserror::Error;

/// WIF decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WifError {
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("invalid payload length: {0} bytes")]
    InvalidLength(usize),

    #[error("invalid version byte: expected {expected:#04x}, got {actual:#04x}")]
    InvalidVersion { expected: u8, actual: u8 },

    #[error("invalid private key scalar")]
    InvalidKey,
}

impl From<crypto_utils::CryptoError> for WifError {
    fn from(e: crypto_utils::CryptoError) -> Self {
        match e {
            crypto_utils::CryptoError::InvalidChecksum => WifError::InvalidChecksum,
            other => WifError::InvalidBase58(other.to_string()),
        }
    }
}

/// Bitcoin key, script and transaction errors.
#[derive(Debug, Error)]
pub enum BtcError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("there are no inputs in the transaction")]
    EmptyInputs,

    #[error("there are no outputs in the transaction")]
    EmptyOutputs,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid WIF at position {index}: {source}")]
    InvalidWif {
        index: usize,
        #[source]
        source: WifError,
    },

    #[error("invalid txid: {0}")]
    InvalidTxId(String),

    #[error("input {input}: scriptPubKey is not a standard P2PKH script")]
    NonStandardScript { input: usize },

    #[error("input {input}: no supplied key matches public key hash {pubkey_hash}")]
    KeyNotFound { input: usize, pubkey_hash: String },

    #[error("random source failed: {0}")]
    RandomSource(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("input {got} signed out of order: input {expected} is next")]
    OutOfOrderSigning { expected: usize, got: usize },

    #[error("input {0} already carries a scriptSig")]
    ScriptSigAlreadySet(usize),
}

/// Failures talking to an address ledger (block explorer).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("ledger returned HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("could not decode ledger response: {0}")]
    Decode(String),

    #[error("inconsistent ledger data: {0}")]
    Inconsistent(String),

    /// A query argument that cannot be placed in a request path.
    #[error("invalid ledger request: {0}")]
    InvalidRequest(String),
}
