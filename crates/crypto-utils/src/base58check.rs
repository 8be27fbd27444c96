use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Base58Check-encode `payload`, appending the 4-byte SHA-256d checksum.
pub fn encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode a Base58Check string and verify its checksum.
///
/// Returns the payload with the checksum stripped. The buffer is wiped on
/// drop since WIF payloads carry private key material.
pub fn decode(s: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map(Zeroizing::new)
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } => CryptoError::InvalidChecksum,
            bs58::decode::Error::NoChecksum => {
                CryptoError::InvalidInput("too short to carry a checksum".into())
            }
            other => CryptoError::InvalidBase58(other.to_string()),
        })
}
