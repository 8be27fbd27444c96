use crypto_utils::base58check;

use crate::error::BtcError;
use crate::keys::PrivateKey;
use crate::network::BtcNetwork;

/// Decoded P2PKH address payload length: version + 20-byte hash.
const P2PKH_PAYLOAD_LEN: usize = 21;

/// Derive the P2PKH address of `key`.
///
/// The public key is serialized in the form selected by `compressed`, which
/// must match the WIF the key came from; the two forms yield different
/// addresses.
pub fn derive_address(key: &PrivateKey, compressed: bool, network: BtcNetwork) -> String {
    pubkey_hash_to_address(&key.public_key().pubkey_hash(compressed), network)
}

/// Encode a 20-byte public key hash as a P2PKH address.
pub fn pubkey_hash_to_address(pubkey_hash: &[u8; 20], network: BtcNetwork) -> String {
    let mut payload = Vec::with_capacity(P2PKH_PAYLOAD_LEN);
    payload.push(network.p2pkh_version());
    payload.extend_from_slice(pubkey_hash);
    base58check::encode(&payload)
}

/// Extract the 20-byte public key hash from a P2PKH address.
///
/// Fails on bad Base58Check, a payload that is not 21 bytes, or a version
/// byte belonging to another network or address type.
pub fn address_to_pubkey_hash(address: &str, network: BtcNetwork) -> Result<[u8; 20], BtcError> {
    let payload = base58check::decode(address)
        .map_err(|e| BtcError::InvalidAddress(format!("couldn't decode '{address}': {e}")))?;

    if payload.len() != P2PKH_PAYLOAD_LEN {
        return Err(BtcError::InvalidAddress(format!(
            "expected {P2PKH_PAYLOAD_LEN} payload bytes, got {}",
            payload.len()
        )));
    }

    if payload[0] != network.p2pkh_version() {
        return Err(BtcError::InvalidAddress(format!(
            "version byte {:#04x} is not a {network} P2PKH address",
            payload[0]
        )));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(hash)
}

/// Whether `address` is a well-formed P2PKH address for `network`.
pub fn validate_address(address: &str, network: BtcNetwork) -> bool {
    address_to_pubkey_hash(address, network).is_ok()
}
