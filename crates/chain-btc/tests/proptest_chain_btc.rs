use bitcoin::hashes::Hash;
use proptest::prelude::*;

use chain_btc::address::{address_to_pubkey_hash, pubkey_hash_to_address};
use chain_btc::script::{extract_pubkey_hash, p2pkh_script, pay_to_address_script};
use chain_btc::sighash::{legacy_signature_hash, SIGHASH_ALL};
use chain_btc::{BtcNetwork, OutPoint, PrivateKey, Transaction, TxInput, TxOutput, Txid};

fn network() -> impl Strategy<Value = BtcNetwork> {
    prop_oneof![
        Just(BtcNetwork::Mainnet),
        Just(BtcNetwork::Testnet),
        Just(BtcNetwork::Signet),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wif_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        compressed in any::<bool>(),
        net in network(),
    ) {
        if let Ok(key) = PrivateKey::from_bytes(&seed) {
            let wif = key.to_wif(compressed, net);
            let (decoded, decoded_compressed) = PrivateKey::from_wif(&wif, net).unwrap();
            prop_assert_eq!(&decoded.to_bytes()[..], &seed[..]);
            prop_assert_eq!(decoded_compressed, compressed);

            // Independent decoder agrees.
            let reference = bitcoin::PrivateKey::from_wif(&wif).unwrap();
            prop_assert_eq!(reference.compressed, compressed);
            prop_assert_eq!(reference.inner.secret_bytes(), seed);
        }
    }

    #[test]
    fn address_script_roundtrip(hash in prop::array::uniform20(any::<u8>()), net in network()) {
        let address = pubkey_hash_to_address(&hash, net);
        prop_assert_eq!(address_to_pubkey_hash(&address, net).unwrap(), hash);
        let script = pay_to_address_script(&address, net).unwrap();
        prop_assert_eq!(extract_pubkey_hash(&script), Some(hash));
    }

    #[test]
    fn legacy_digest_matches_reference(
        txids in prop::collection::vec(prop::array::uniform32(any::<u8>()), 1..5),
        values in prop::collection::vec(0i64..2_100_000_000_000_000, 1..4),
        code_hash in prop::array::uniform20(any::<u8>()),
        pick in any::<prop::sample::Index>(),
    ) {
        let inputs: Vec<_> = txids
            .iter()
            .enumerate()
            .map(|(i, id)| TxInput::new(OutPoint::new(Txid::from_display_bytes(*id), i as u32)))
            .collect();
        let outputs: Vec<_> = values
            .iter()
            .map(|v| TxOutput::new(*v, p2pkh_script(&[(*v % 251) as u8; 20])))
            .collect();
        let tx = Transaction::new_unsigned(outputs, inputs).unwrap();
        let index = pick.index(txids.len());
        let script_code = p2pkh_script(&code_hash);

        let ours = legacy_signature_hash(&tx, index, &script_code, SIGHASH_ALL).unwrap();

        let parsed: bitcoin::Transaction = bitcoin::consensus::deserialize(&tx.serialize()).unwrap();
        let reference = bitcoin::sighash::SighashCache::new(&parsed)
            .legacy_signature_hash(index, bitcoin::Script::from_bytes(&script_code), SIGHASH_ALL)
            .unwrap();
        prop_assert_eq!(ours, reference.to_byte_array());
    }
}
