use crypto_utils::{base58check, hash, random};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::error::{BtcError, WifError};
use crate::network::BtcNetwork;

/// WIF payload length without the compression marker: version + 32-byte key.
const WIF_UNCOMPRESSED_LEN: usize = 33;
/// WIF payload length with the trailing 0x01 compression marker.
const WIF_COMPRESSED_LEN: usize = 34;
const WIF_COMPRESSION_MARKER: u8 = 0x01;

/// A secp256k1 private key.
///
/// The scalar never leaves this type except through [`PrivateKey::to_wif`]
/// or a signature.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a fresh key from the caller's randomness source.
    ///
    /// Draws 32 bytes at a time and re-draws when the value is zero or not
    /// below the curve order. A failing source is reported immediately.
    pub fn generate<R>(rng: &mut R) -> Result<Self, BtcError>
    where
        R: CryptoRngCore + ?Sized,
    {
        loop {
            let bytes: Zeroizing<[u8; 32]> = random::random_bytes_fixed(rng)
                .map_err(|e| BtcError::RandomSource(e.to_string()))?;

            match Self::from_bytes(&bytes) {
                Ok(key) => return Ok(key),
                Err(_) => tracing::debug!("drawn scalar outside [1, n), drawing again"),
            }
        }
    }

    /// Parse a big-endian 32-byte scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, BtcError> {
        SigningKey::from_bytes(bytes.into())
            .map(|inner| Self { inner })
            .map_err(|e| BtcError::InvalidPrivateKey(format!("invalid secp256k1 scalar: {e}")))
    }

    /// Big-endian scalar bytes, wiped on drop.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Encode as WIF: `version || key || [0x01 if compressed]`, Base58Check.
    pub fn to_wif(&self, compressed: bool, network: BtcNetwork) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(WIF_COMPRESSED_LEN));
        payload.push(network.wif_version());
        payload.extend_from_slice(&self.to_bytes()[..]);
        if compressed {
            payload.push(WIF_COMPRESSION_MARKER);
        }
        base58check::encode(&payload)
    }

    /// Decode a WIF string, returning the key and its compression flag.
    ///
    /// The version byte must match `network`; the compression flag comes
    /// from the payload length.
    pub fn from_wif(wif: &str, network: BtcNetwork) -> Result<(Self, bool), WifError> {
        let payload = base58check::decode(wif)?;

        let Some(&version) = payload.first() else {
            return Err(WifError::InvalidLength(0));
        };
        if version != network.wif_version() {
            return Err(WifError::InvalidVersion {
                expected: network.wif_version(),
                actual: version,
            });
        }

        let compressed = match payload.len() {
            WIF_UNCOMPRESSED_LEN => false,
            WIF_COMPRESSED_LEN if payload[WIF_COMPRESSED_LEN - 1] == WIF_COMPRESSION_MARKER => true,
            n => return Err(WifError::InvalidLength(n)),
        };

        let mut scalar = Zeroizing::new([0u8; 32]);
        scalar.copy_from_slice(&payload[1..WIF_UNCOMPRESSED_LEN]);
        let key = Self::from_bytes(&scalar).map_err(|_| WifError::InvalidKey)?;

        Ok((key, compressed))
    }

    /// ECDSA-sign a 32-byte digest and return the DER encoding.
    ///
    /// Nonces are RFC 6979 deterministic and `s` is normalized to the lower
    /// half of the curve order, as relay policy requires.
    pub fn sign_digest_der(&self, digest: &[u8; 32]) -> Result<Vec<u8>, BtcError> {
        let sig: Signature = self
            .inner
            .sign_prehash(digest)
            .map_err(|e| BtcError::SigningError(format!("ECDSA signing failed: {e}")))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(sig.to_der().as_bytes().to_vec())
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &hex::encode(self.public_key().serialize(true)))
            .finish_non_exhaustive()
    }
}

/// A secp256k1 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1-encoded key (33-byte compressed or 65-byte uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, BtcError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| BtcError::InvalidPublicKey(format!("not a secp256k1 point: {e}")))
    }

    /// SEC1 encoding: 33 bytes when `compressed`, 65 bytes otherwise.
    pub fn serialize(&self, compressed: bool) -> Vec<u8> {
        self.inner
            .as_affine()
            .to_encoded_point(compressed)
            .as_bytes()
            .to_vec()
    }

    /// Hash160 of the serialized key in the requested form.
    pub fn pubkey_hash(&self, compressed: bool) -> [u8; 20] {
        hash::hash160(&self.serialize(compressed))
    }

    /// Verify a DER-encoded ECDSA signature over a 32-byte digest.
    pub fn verify_digest_der(&self, digest: &[u8; 32], der: &[u8]) -> Result<(), BtcError> {
        let sig = Signature::from_der(der)
            .map_err(|e| BtcError::SigningError(format!("malformed DER signature: {e}")))?;
        self.inner
            .verify_prehash(digest, &sig)
            .map_err(|e| BtcError::SigningError(format!("signature does not verify: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_core::{CryptoRng, OsRng, RngCore};

    const GO_WIF_1: &str = "91kiSsVtKYWBFJePnqk51k9yafKPJBpP52ZDxWc4em2KXtF82B3";
    const GO_KEY_1: &str = "163f5f0f9a621d72fedd85ffca3d08d131ab4e812181e0d30ffd1c885d20aac7";

    fn key_one() -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        PrivateKey::from_bytes(&bytes).unwrap()
    }

    /// Hands out a zero scalar first, then all-0xFF (above the order), then
    /// defers to a seeded generator.
    struct OutOfRangeFirst {
        calls: usize,
        fallback: StdRng,
    }

    impl RngCore for OutOfRangeFirst {
        fn next_u32(&mut self) -> u32 {
            self.fallback.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.fallback.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.calls += 1;
            match self.calls {
                1 => dest.fill(0x00),
                2 => dest.fill(0xFF),
                _ => self.fallback.fill_bytes(dest),
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for OutOfRangeFirst {}

    struct ClosedSource;

    impl RngCore for ClosedSource {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::new("device closed"))
        }
    }

    impl CryptoRng for ClosedSource {}

    #[test]
    fn known_uncompressed_testnet_wif_decodes() {
        let (key, compressed) = PrivateKey::from_wif(GO_WIF_1, BtcNetwork::Testnet).unwrap();
        assert!(!compressed);
        assert_eq!(hex::encode(*key.to_bytes()), GO_KEY_1);
    }

    #[test]
    fn key_one_wif_vectors() {
        let key = key_one();
        assert_eq!(
            key.to_wif(false, BtcNetwork::Mainnet),
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf"
        );
        assert_eq!(
            key.to_wif(true, BtcNetwork::Mainnet),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
        assert_eq!(
            key.to_wif(false, BtcNetwork::Testnet),
            "91avARGdfge8E4tZfYLoxeJ5sGBdNJQH4kvjJoQFacbgwmaKkrx"
        );
        assert_eq!(
            key.to_wif(true, BtcNetwork::Testnet),
            "cMahea7zqjxrtgAbB7LSGbcQUr1uX1ojuat9jZodMN87JcbXMTcA"
        );
    }

    #[test]
    fn compressed_flag_roundtrips() {
        let key = key_one();
        for compressed in [false, true] {
            let wif = key.to_wif(compressed, BtcNetwork::Testnet);
            let (decoded, flag) = PrivateKey::from_wif(&wif, BtcNetwork::Testnet).unwrap();
            assert_eq!(flag, compressed);
            assert_eq!(*decoded.to_bytes(), *key.to_bytes());
        }
    }

    #[test]
    fn mainnet_wif_rejected_on_testnet() {
        let err = PrivateKey::from_wif(
            "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf",
            BtcNetwork::Testnet,
        )
        .unwrap_err();
        assert_eq!(
            err,
            WifError::InvalidVersion {
                expected: 0xEF,
                actual: 0x80
            }
        );
    }

    #[test]
    fn corrupted_wif_fails_checksum() {
        // Final character of the key-one testnet WIF changed.
        let err = PrivateKey::from_wif(
            "91avARGdfge8E4tZfYLoxeJ5sGBdNJQH4kvjJoQFacbgwmaKkry",
            BtcNetwork::Testnet,
        )
        .unwrap_err();
        assert_eq!(err, WifError::InvalidChecksum);
    }

    #[test]
    fn bad_compression_marker_is_invalid_length() {
        // Valid checksum, 34-byte payload ending in 0x02.
        let err = PrivateKey::from_wif(
            "cMahea7zqjxrtgAbB7LSGbcQUr1uX1ojuat9jZodMN87JcgKTQmd",
            BtcNetwork::Testnet,
        )
        .unwrap_err();
        assert_eq!(err, WifError::InvalidLength(34));
    }

    #[test]
    fn short_payload_is_invalid_length() {
        // Valid checksum over version + 31 bytes.
        let err = PrivateKey::from_wif(
            "2pFwBk7G73dxZQzSymFunESAiJ2xN92CLtBpCHQPngLC3PDxNB",
            BtcNetwork::Testnet,
        )
        .unwrap_err();
        assert_eq!(err, WifError::InvalidLength(32));
    }

    #[test]
    fn zero_scalar_is_invalid_key() {
        let err = PrivateKey::from_wif(
            "91avARGdfge8E4tZfYLoxeJ5sGBdNJQH4kvjJoQFacbgwi1C2GD",
            BtcNetwork::Testnet,
        )
        .unwrap_err();
        assert_eq!(err, WifError::InvalidKey);
    }

    #[test]
    fn curve_order_scalar_is_invalid_key() {
        let err = PrivateKey::from_wif(
            "93XfLeifX7KMMtUGa7xouxtnFWSSUyzNPgjrJ6Npsyahfwcd8gd",
            BtcNetwork::Testnet,
        )
        .unwrap_err();
        assert_eq!(err, WifError::InvalidKey);
    }

    #[test]
    fn garbage_wif_is_invalid_base58() {
        let err = PrivateKey::from_wif("broken!", BtcNetwork::Testnet).unwrap_err();
        assert!(matches!(err, WifError::InvalidBase58(_)), "got {err:?}");
    }

    #[test]
    fn generate_skips_out_of_range_draws() {
        let mut rng = OutOfRangeFirst {
            calls: 0,
            fallback: StdRng::seed_from_u64(42),
        };
        let key = PrivateKey::generate(&mut rng).unwrap();
        assert_eq!(rng.calls, 3);
        assert!(key.to_bytes().iter().any(|&b| b != 0));
    }

    #[test]
    fn generate_reports_failing_source() {
        let err = PrivateKey::generate(&mut ClosedSource).unwrap_err();
        match err {
            BtcError::RandomSource(msg) => assert!(msg.contains("device closed")),
            other => panic!("expected RandomSource, got {other}"),
        }
    }

    #[test]
    fn generate_is_deterministic_for_seeded_source() {
        let a = PrivateKey::generate(&mut StdRng::seed_from_u64(1)).unwrap();
        let b = PrivateKey::generate(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(
            a.to_wif(false, BtcNetwork::Testnet),
            b.to_wif(false, BtcNetwork::Testnet)
        );
    }

    #[test]
    fn generated_keys_differ() {
        let a = PrivateKey::generate(&mut OsRng).unwrap();
        let b = PrivateKey::generate(&mut OsRng).unwrap();
        assert_ne!(*a.to_bytes(), *b.to_bytes());
    }

    #[test]
    fn public_key_serialization_forms() {
        let pubkey = key_one().public_key();
        assert_eq!(
            hex::encode(pubkey.serialize(true)),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        let uncompressed = pubkey.serialize(false);
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(
            hex::encode(&uncompressed[33..]),
            "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn public_key_sec1_roundtrip() {
        let pubkey = key_one().public_key();
        for compressed in [false, true] {
            let parsed = PublicKey::from_sec1_bytes(&pubkey.serialize(compressed)).unwrap();
            assert_eq!(parsed, pubkey);
        }
    }

    #[test]
    fn invalid_sec1_bytes_rejected() {
        assert!(PublicKey::from_sec1_bytes(&[0u8; 33]).is_err());
    }

    #[test]
    fn signature_is_low_s_der_and_verifies() {
        let key = key_one();
        let digest = crypto_utils::hash::sha256d(b"digest to sign");
        let der = key.sign_digest_der(&digest).unwrap();

        assert_eq!(der[0], 0x30);
        let sig = Signature::from_der(&der).unwrap();
        assert!(sig.normalize_s().is_none(), "signature must already be low-S");
        key.public_key().verify_digest_der(&digest, &der).unwrap();
    }

    #[test]
    fn signing_is_deterministic() {
        let key = key_one();
        let digest = [7u8; 32];
        assert_eq!(
            key.sign_digest_der(&digest).unwrap(),
            key.sign_digest_der(&digest).unwrap()
        );
    }

    #[test]
    fn verification_fails_for_other_digest() {
        let key = key_one();
        let der = key.sign_digest_der(&[1u8; 32]).unwrap();
        assert!(key.public_key().verify_digest_der(&[2u8; 32], &der).is_err());
    }

    #[test]
    fn debug_does_not_leak_scalar() {
        let debug = format!("{:?}", key_one());
        assert!(!debug.contains(&"00".repeat(31)));
        assert!(debug.contains("PrivateKey"));
    }
}
