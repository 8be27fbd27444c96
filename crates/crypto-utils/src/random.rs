use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Draws a fixed-size array of random bytes from the caller's source.
///
/// The source is used exactly once; a failure is reported, never retried.
pub fn random_bytes_fixed<const N: usize, R>(rng: &mut R) -> Result<Zeroizing<[u8; N]>, CryptoError>
where
    R: CryptoRngCore + ?Sized,
{
    let mut buf = Zeroizing::new([0u8; N]);
    rng.try_fill_bytes(&mut buf[..])
        .map_err(|e| CryptoError::RandomSource(e.to_string()))?;
    Ok(buf)
}
