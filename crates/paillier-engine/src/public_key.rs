//! Paillier public key and batch encryption entry points.

use paillier_bignum::{BigNum, MontgomeryCtx};
use paillier_types::{Backend, ExecutionConfig, PaillierError};
use rand_core::{OsRng, RngCore};

use crate::device::Device;
use crate::request::{BatchOutput, EncryptRequest};

/// A Paillier public key with generator `g = n + 1`.
///
/// Immutable once created; share it freely across threads and backends.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The public modulus n = p * q.
    n: BigNum,
    /// n^2, the ciphertext modulus.
    n_sq: BigNum,
    /// The generator g = n + 1.
    g: BigNum,
    /// Montgomery context for n^2, used by the optimized engines.
    mont: MontgomeryCtx,
}

impl PublicKey {
    /// Rebuild a public key from its modulus.
    ///
    /// The modulus must be odd and greater than one.
    pub fn from_modulus(n: &BigNum) -> Result<Self, PaillierError> {
        if n.is_negative() || n <= &BigNum::one() {
            return Err(PaillierError::InvalidKey("modulus must be greater than one"));
        }
        if n.is_even() {
            return Err(PaillierError::InvalidKey("modulus must be odd"));
        }

        let n_sq = n.sqr();
        let g = n.add(&BigNum::one());
        let mont = MontgomeryCtx::new(&n_sq)?;

        Ok(Self {
            n: n.clone(),
            n_sq,
            g,
            mont,
        })
    }

    /// The public modulus n.
    pub fn n(&self) -> &BigNum {
        &self.n
    }

    /// The ciphertext modulus n².
    pub fn n_sq(&self) -> &BigNum {
        &self.n_sq
    }

    /// The generator g = n + 1.
    pub fn g(&self) -> &BigNum {
        &self.g
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.n.bit_len()
    }

    pub(crate) fn montgomery(&self) -> &MontgomeryCtx {
        &self.mont
    }

    /// `g^m mod n²` via the binomial shortcut `(n + 1)^m ≡ 1 + m·n (mod n²)`.
    pub(crate) fn g_pow(&self, m: &BigNum) -> Result<BigNum, PaillierError> {
        BigNum::one().add(&m.mul(&self.n)).mod_reduce(&self.n_sq)
    }

    /// Verify `0 <= m < n`; `index` labels the error.
    pub(crate) fn check_plaintext(&self, m: &BigNum, index: usize) -> Result<(), PaillierError> {
        if m.is_negative() || m >= &self.n {
            return Err(PaillierError::OutOfRange { index });
        }
        Ok(())
    }

    /// Verify `0 <= c < n²`; `index` labels the error.
    pub(crate) fn check_ciphertext(&self, c: &BigNum, index: usize) -> Result<(), PaillierError> {
        if c.is_negative() || c >= &self.n_sq {
            return Err(PaillierError::OutOfRange { index });
        }
        Ok(())
    }

    /// Encrypt a batch with OS randomness on the global device.
    ///
    /// Output index `i` holds the encryption of `plaintexts[i]`. Fails before
    /// touching any element if a plaintext is outside `[0, n)` or, for the
    /// parallel backends, if the lane grid does not match the batch length.
    pub fn encrypt(
        &self,
        plaintexts: &[BigNum],
        backend: Backend,
        config: &ExecutionConfig,
    ) -> Result<BatchOutput, PaillierError> {
        self.encrypt_with_rng(plaintexts, backend, config, &mut OsRng)
    }

    /// Encrypt a batch drawing randomizers from `rng`.
    ///
    /// With a seeded generator the output is reproducible for a given backend.
    pub fn encrypt_with_rng(
        &self,
        plaintexts: &[BigNum],
        backend: Backend,
        config: &ExecutionConfig,
        rng: &mut dyn RngCore,
    ) -> Result<BatchOutput, PaillierError> {
        EncryptRequest::new(self, plaintexts, backend, *config).run(&Device::global(), rng)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
    }
}

impl Eq for PublicKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_key() -> PublicKey {
        PublicKey::from_modulus(&BigNum::from_u64(709 * 919)).unwrap()
    }

    #[test]
    fn test_from_modulus() {
        let pk = test_key();
        assert_eq!(pk.n_sq(), &pk.n().sqr());
        assert_eq!(pk.g(), &BigNum::from_u64(709 * 919 + 1));
        assert_eq!(pk.bits(), 20);
    }

    #[test]
    fn test_from_modulus_rejects_degenerate() {
        assert!(matches!(
            PublicKey::from_modulus(&BigNum::one()),
            Err(PaillierError::InvalidKey(_))
        ));
        assert!(matches!(
            PublicKey::from_modulus(&BigNum::from_u64(10)),
            Err(PaillierError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_g_pow_matches_mod_exp() {
        let pk = test_key();
        for m in [0u64, 1, 2, 100, 651_570] {
            let m = BigNum::from_u64(m);
            assert_eq!(pk.g_pow(&m).unwrap(), pk.g().mod_exp(&m, pk.n_sq()).unwrap());
        }
    }

    #[test]
    fn test_range_checks() {
        let pk = test_key();
        assert!(pk.check_plaintext(&BigNum::zero(), 0).is_ok());
        assert_eq!(
            pk.check_plaintext(pk.n(), 4).unwrap_err(),
            PaillierError::OutOfRange { index: 4 }
        );
        assert!(pk.check_ciphertext(pk.n(), 0).is_ok());
        assert_eq!(
            pk.check_ciphertext(pk.n_sq(), 1).unwrap_err(),
            PaillierError::OutOfRange { index: 1 }
        );
    }

    #[test]
    fn test_out_of_range_aborts_whole_batch() {
        let pk = test_key();
        let batch = vec![BigNum::from_u64(1), BigNum::from_u64(2), pk.n().clone()];
        let config = ExecutionConfig::for_batch(3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for backend in Backend::ALL {
            assert_eq!(
                pk.encrypt_with_rng(&batch, backend, &config, &mut rng).unwrap_err(),
                PaillierError::OutOfRange { index: 2 }
            );
        }
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let pk = test_key();
        let batch = vec![BigNum::from_u64(77); 4];
        let config = ExecutionConfig::for_batch(4).unwrap();
        let a = pk.encrypt(&batch, Backend::Optimized, &config).unwrap();
        let b = pk.encrypt(&batch, Backend::Optimized, &config).unwrap();
        assert_ne!(a.values(), b.values());
    }

    #[test]
    fn test_seeded_encryption_reproducible() {
        let pk = test_key();
        let batch: Vec<BigNum> = (1..=8).map(BigNum::from_u64).collect();
        let config = ExecutionConfig::new(4, 2).unwrap();
        for backend in Backend::ALL {
            let a = pk
                .encrypt_with_rng(&batch, backend, &config, &mut ChaCha8Rng::seed_from_u64(21))
                .unwrap();
            let b = pk
                .encrypt_with_rng(&batch, backend, &config, &mut ChaCha8Rng::seed_from_u64(21))
                .unwrap();
            assert_eq!(a.values(), b.values(), "{backend} not reproducible");
        }
    }
}
