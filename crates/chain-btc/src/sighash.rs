//! Legacy (pre-SegWit) signature digest.

use crypto_utils::hash::sha256d;

use crate::error::BtcError;
use crate::transaction::Transaction;

/// SIGHASH_ALL: the signature commits to every input and output.
pub const SIGHASH_ALL: u32 = 1;

/// Compute the legacy signature digest of input `input_index`.
///
/// The transaction is reserialized with every scriptSig emptied except the
/// one being signed, which is replaced by `script_code` (the previous
/// output's scriptPubKey). The 4-byte sighash type is appended and the
/// result double-SHA256 hashed.
///
/// Only [`SIGHASH_ALL`] is supported. `script_code` is used as given;
/// canonical P2PKH scripts contain no OP_CODESEPARATOR to strip.
pub fn legacy_signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    sighash_type: u32,
) -> Result<[u8; 32], BtcError> {
    if sighash_type != SIGHASH_ALL {
        return Err(BtcError::SigningError(format!(
            "unsupported sighash type {sighash_type:#x}"
        )));
    }
    if input_index >= tx.inputs().len() {
        return Err(BtcError::MalformedInput(format!(
            "input index {input_index} out of range for {} inputs",
            tx.inputs().len()
        )));
    }

    let mut preimage = tx.serialize_with_script_code(input_index, script_code);
    preimage.extend_from_slice(&sighash_type.to_le_bytes());
    let digest = sha256d(&preimage);

    tracing::debug!(
        input = input_index,
        preimage_len = preimage.len(),
        digest = %hex::encode(digest),
        "computed legacy sighash"
    );

    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::p2pkh_script;
    use crate::transaction::{OutPoint, TxInput, TxOutput, Txid};
    use bitcoin::hashes::Hash;

    fn txid(byte: u8) -> Txid {
        Txid::from_display_bytes([byte; 32])
    }

    fn three_in_two_out() -> Transaction {
        Transaction::new_unsigned(
            vec![
                TxOutput::new(70_000, p2pkh_script(&[0xA1; 20])),
                TxOutput::new(12_345, p2pkh_script(&[0xA2; 20])),
            ],
            vec![
                TxInput::new(OutPoint::new(txid(0x11), 0)),
                TxInput::new(OutPoint::new(txid(0x22), 3)),
                TxInput::new(OutPoint::new(txid(0x33), 1)),
            ],
        )
        .unwrap()
    }

    fn reference_digest(tx: &Transaction, index: usize, script_code: &[u8]) -> [u8; 32] {
        let parsed: bitcoin::Transaction = bitcoin::consensus::deserialize(&tx.serialize()).unwrap();
        let cache = bitcoin::sighash::SighashCache::new(&parsed);
        cache
            .legacy_signature_hash(index, bitcoin::Script::from_bytes(script_code), SIGHASH_ALL)
            .unwrap()
            .to_byte_array()
    }

    #[test]
    fn digest_matches_bitcoin_crate_for_every_input() {
        let tx = three_in_two_out();
        let prev_scripts = [
            p2pkh_script(&[0xB1; 20]),
            p2pkh_script(&[0xB2; 20]),
            p2pkh_script(&[0xB3; 20]),
        ];
        for (i, script_code) in prev_scripts.iter().enumerate() {
            let ours = legacy_signature_hash(&tx, i, script_code, SIGHASH_ALL).unwrap();
            assert_eq!(ours, reference_digest(&tx, i, script_code), "input {i}");
        }
    }

    #[test]
    fn digest_depends_on_input_index() {
        let tx = three_in_two_out();
        let script_code = p2pkh_script(&[0xB1; 20]);
        let d0 = legacy_signature_hash(&tx, 0, &script_code, SIGHASH_ALL).unwrap();
        let d1 = legacy_signature_hash(&tx, 1, &script_code, SIGHASH_ALL).unwrap();
        assert_ne!(d0, d1);
    }

    #[test]
    fn digest_depends_on_outputs() {
        let script_code = p2pkh_script(&[0xB1; 20]);
        let a = three_in_two_out();
        let b = Transaction::new_unsigned(
            vec![TxOutput::new(70_001, p2pkh_script(&[0xA1; 20]))],
            a.inputs().to_vec(),
        )
        .unwrap();
        assert_ne!(
            legacy_signature_hash(&a, 0, &script_code, SIGHASH_ALL).unwrap(),
            legacy_signature_hash(&b, 0, &script_code, SIGHASH_ALL).unwrap()
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let tx = three_in_two_out();
        let script_code = p2pkh_script(&[0xB2; 20]);
        assert_eq!(
            legacy_signature_hash(&tx, 1, &script_code, SIGHASH_ALL).unwrap(),
            legacy_signature_hash(&tx, 1, &script_code, SIGHASH_ALL).unwrap()
        );
    }

    #[test]
    fn out_of_range_input_rejected() {
        let tx = three_in_two_out();
        let err = legacy_signature_hash(&tx, 3, &[], SIGHASH_ALL).unwrap_err();
        assert!(matches!(err, BtcError::MalformedInput(_)));
    }

    #[test]
    fn only_sighash_all_supported() {
        let tx = three_in_two_out();
        let err = legacy_signature_hash(&tx, 0, &[], 0x03).unwrap_err();
        assert!(matches!(err, BtcError::SigningError(_)));
    }
}
