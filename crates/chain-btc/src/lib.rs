//! Bitcoin legacy (pre-SegWit) P2PKH support.
//!
//! Provides WIF key encoding, P2PKH address derivation, canonical script
//! construction, transaction serialization, and legacy SIGHASH_ALL signing
//! of inputs matched to a pool of keys by public key hash.

pub mod address;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod network;
pub mod request;
pub mod script;
pub mod sighash;
pub mod signer;
pub mod transaction;

pub use error::{BtcError, LedgerError, WifError};
pub use keys::{PrivateKey, PublicKey};
pub use ledger::{AddressLedger, SpendableOutput};
pub use network::BtcNetwork;
pub use request::{generate_signed_transaction, TxRequest};
pub use signer::{sign_all, KeyLookup, PrevOutput};
pub use transaction::{OutPoint, SigningState, Transaction, TxInput, TxOutput, Txid};
