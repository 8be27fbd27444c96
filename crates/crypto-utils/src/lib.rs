//! # crypto-utils
//!
//! Hashing, Base58Check, and randomness primitives shared by the Bitcoin
//! key codec and transaction signer. Everything here is a thin layer over
//! vetted crates (`sha2`, `ripemd`, `bs58`, `rand_core`).

pub mod base58check;
pub mod error;
pub mod hash;
pub mod random;

pub use error::CryptoError;
