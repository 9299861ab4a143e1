//! Paillier private key and batch decryption entry points.

use std::fmt;

use paillier_bignum::BigNum;
use paillier_types::{Backend, ExecutionConfig, PaillierError};

use crate::device::Device;
use crate::public_key::PublicKey;
use crate::request::{BatchOutput, DecryptRequest};

/// A Paillier private key: `lambda = lcm(p-1, q-1)` and `mu = lambda^-1 mod n`.
///
/// Immutable once created. The secret components are `BigNum`s and so are
/// zeroized when the key is dropped.
#[derive(Clone)]
pub struct PrivateKey {
    /// The matching public key.
    public: PublicKey,
    /// lambda = lcm(p-1, q-1).
    lambda: BigNum,
    /// mu = lambda^{-1} mod n.
    mu: BigNum,
}

impl PrivateKey {
    pub(crate) fn new(public: PublicKey, lambda: BigNum, mu: BigNum) -> Self {
        Self { public, lambda, mu }
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub(crate) fn lambda(&self) -> &BigNum {
        &self.lambda
    }

    pub(crate) fn mu(&self) -> &BigNum {
        &self.mu
    }

    /// Decrypt a batch on the global device.
    ///
    /// Output index `i` holds the plaintext of `ciphertexts[i]`. Fails before
    /// touching any element if a ciphertext is outside `[0, n²)` or, for the
    /// parallel backends, if the lane grid does not match the batch length.
    /// A ciphertext that was not produced under this key fails the whole
    /// batch with `InvalidCiphertext`.
    pub fn decrypt(
        &self,
        ciphertexts: &[BigNum],
        backend: Backend,
        config: &ExecutionConfig,
    ) -> Result<BatchOutput, PaillierError> {
        DecryptRequest::new(self, ciphertexts, backend, *config).run(&Device::global())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("n", self.public.n())
            .field("lambda", &"[redacted]")
            .field("mu", &"[redacted]")
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        let secrets_eq = self.lambda.ct_eq(&other.lambda) & self.mu.ct_eq(&other.mu);
        self.public == other.public && bool::from(secrets_eq)
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::KeyPairGenerator;

    fn keys() -> (PublicKey, PrivateKey) {
        KeyPairGenerator::from_primes(&BigNum::from_u64(709), &BigNum::from_u64(919)).unwrap()
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let (_, sk) = keys();
        let dbg = format!("{sk:?}");
        assert!(dbg.contains("redacted"));
        assert!(!dbg.contains(&format!("{:?}", sk.lambda())));
    }

    #[test]
    fn test_key_equality() {
        let (_, a) = keys();
        let (_, b) = keys();
        let (_, c) =
            KeyPairGenerator::from_primes(&BigNum::from_u64(1009), &BigNum::from_u64(1013))
                .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_decrypt_trivial_ciphertexts() {
        let (pk, sk) = keys();
        // 1 = E(0) with r = 1, and g = E(1) with r = 1
        let batch = vec![BigNum::one(), pk.g().clone()];
        let config = ExecutionConfig::for_batch(2).unwrap();
        for backend in Backend::ALL {
            let (values, _) = sk.decrypt(&batch, backend, &config).unwrap().into_parts();
            assert_eq!(values, vec![BigNum::zero(), BigNum::one()], "{backend}");
        }
    }

    #[test]
    fn test_malformed_ciphertext_fails_batch() {
        let (pk, sk) = keys();
        let batch = vec![BigNum::one(), BigNum::from_u64(919), pk.g().clone()];
        let config = ExecutionConfig::for_batch(3).unwrap();
        for backend in Backend::ALL {
            assert_eq!(
                sk.decrypt(&batch, backend, &config).unwrap_err(),
                PaillierError::InvalidCiphertext { index: 1 },
                "{backend}"
            );
        }
    }

    #[test]
    fn test_ciphertext_out_of_range() {
        let (pk, sk) = keys();
        let batch = vec![pk.n_sq().clone()];
        let config = ExecutionConfig::for_batch(1).unwrap();
        assert_eq!(
            sk.decrypt(&batch, Backend::Naive, &config).unwrap_err(),
            PaillierError::OutOfRange { index: 0 }
        );
    }
}
