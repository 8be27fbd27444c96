//! Matching inputs to keys and attaching P2PKH scriptSigs.
//!
//! Keys are supplied as a pool of WIFs indexed by public key hash; each input
//! is signed by whichever key its previous scriptPubKey pays to.

use std::collections::HashMap;

use crate::error::BtcError;
use crate::keys::PrivateKey;
use crate::network::BtcNetwork;
use crate::script::{extract_pubkey_hash, p2pkh_script_sig};
use crate::sighash::{legacy_signature_hash, SIGHASH_ALL};
use crate::transaction::Transaction;

/// A private key together with the public key form its WIF selected.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    key: PrivateKey,
    compressed: bool,
}

impl KeyEntry {
    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn compressed(&self) -> bool {
        self.compressed
    }

    /// Serialized public key in the recorded form.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.key.public_key().serialize(self.compressed)
    }
}

/// Signing keys indexed by hex-encoded hash160 of their public key.
///
/// Read-only once built, so a single lookup can be shared between threads
/// signing different transactions.
#[derive(Debug, Clone, Default)]
pub struct KeyLookup {
    entries: HashMap<String, KeyEntry>,
}

impl KeyLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every WIF and index it by public key hash.
    ///
    /// Stops at the first undecodable WIF and reports its zero-based
    /// position. Two WIFs for the same hash keep the later one.
    pub fn from_wifs<I, S>(wifs: I, network: BtcNetwork) -> Result<Self, BtcError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lookup = Self::new();
        for (index, wif) in wifs.into_iter().enumerate() {
            let (key, compressed) = PrivateKey::from_wif(wif.as_ref().trim(), network)
                .map_err(|source| BtcError::InvalidWif { index, source })?;
            lookup.insert(key, compressed);
        }
        tracing::debug!(keys = lookup.len(), "built key lookup");
        Ok(lookup)
    }

    /// Add a key, returning the hash it is stored under.
    ///
    /// An existing entry for the same hash is replaced.
    pub fn insert(&mut self, key: PrivateKey, compressed: bool) -> [u8; 20] {
        let pubkey_hash = key.public_key().pubkey_hash(compressed);
        let hex_hash = hex::encode(pubkey_hash);
        if self
            .entries
            .insert(hex_hash.clone(), KeyEntry { key, compressed })
            .is_some()
        {
            tracing::warn!(pubkey_hash = %hex_hash, "duplicate key supplied, keeping the last one");
        }
        pubkey_hash
    }

    pub fn get(&self, pubkey_hash: &[u8; 20]) -> Option<&KeyEntry> {
        self.entries.get(&hex::encode(pubkey_hash))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The output being spent by an input, as far as signing needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrevOutput {
    pub script_pubkey: Vec<u8>,
}

impl PrevOutput {
    pub fn new(script_pubkey: Vec<u8>) -> Self {
        Self { script_pubkey }
    }
}

/// Sign input `index` against the scriptPubKey it spends.
///
/// Inputs must be signed in order; every earlier input has to carry its
/// scriptSig already.
pub fn sign_input(
    tx: &mut Transaction,
    index: usize,
    prev_script_pubkey: &[u8],
    lookup: &KeyLookup,
) -> Result<(), BtcError> {
    tx.ensure_signable(index)?;

    let pubkey_hash = extract_pubkey_hash(prev_script_pubkey)
        .ok_or(BtcError::NonStandardScript { input: index })?;

    let entry = lookup
        .get(&pubkey_hash)
        .ok_or_else(|| BtcError::KeyNotFound {
            input: index,
            pubkey_hash: hex::encode(pubkey_hash),
        })?;

    let digest = legacy_signature_hash(tx, index, prev_script_pubkey, SIGHASH_ALL)?;

    let mut signature = entry.key().sign_digest_der(&digest)?;
    signature.push(SIGHASH_ALL as u8);

    let script_sig = p2pkh_script_sig(&signature, &entry.public_key_bytes());
    tracing::debug!(
        input = index,
        compressed = entry.compressed(),
        script_sig_len = script_sig.len(),
        "signed input"
    );
    tx.attach_script_sig(index, script_sig)
}

/// Sign every input in order.
///
/// `prevouts[i]` describes the output spent by input `i`. Stops at the first
/// input that cannot be signed, leaving earlier inputs signed.
pub fn sign_all(
    tx: &mut Transaction,
    prevouts: &[PrevOutput],
    lookup: &KeyLookup,
) -> Result<(), BtcError> {
    if prevouts.len() != tx.inputs().len() {
        return Err(BtcError::MalformedInput(format!(
            "{} previous outputs supplied for {} inputs",
            prevouts.len(),
            tx.inputs().len()
        )));
    }

    for (index, prevout) in prevouts.iter().enumerate() {
        sign_input(tx, index, &prevout.script_pubkey, lookup)?;
    }
    Ok(())
}
