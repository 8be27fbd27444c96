use thiserror::Error;

/// Cryptographic primitive errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid checksum")]
    InvalidChecksum,

    #[error("random source failed: {0}")]
    RandomSource(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
