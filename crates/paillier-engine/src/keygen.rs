//! Key pair derivation from supplied primes.

use log::debug;
use paillier_bignum::BigNum;
use paillier_types::PaillierError;

use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;

/// Derives Paillier key pairs from two caller-supplied primes.
///
/// Uses g = n + 1, for which L(g^lambda mod n^2) = lambda mod n, so
/// mu = lambda^{-1} mod n.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPairGenerator;

impl KeyPairGenerator {
    /// Create a key pair from two primes p and q.
    ///
    /// Fails with `InvalidKey` when the primes are equal, smaller than 3,
    /// have a small factor, or give a modulus sharing a factor with
    /// (p-1)(q-1).
    pub fn from_primes(p: &BigNum, q: &BigNum) -> Result<(PublicKey, PrivateKey), PaillierError> {
        if let Err(e) = check_primes(p, q) {
            debug!("rejecting key material: {e}");
            return Err(e);
        }

        let one = BigNum::one();
        let n = p.mul(q);
        let p_minus_1 = p.sub(&one);
        let q_minus_1 = q.sub(&one);

        if !n.gcd(&p_minus_1.mul(&q_minus_1))?.is_one() {
            debug!("rejecting key material: gcd(n, phi) != 1");
            return Err(PaillierError::InvalidKey("modulus shares a factor with (p-1)(q-1)"));
        }

        let lambda = p_minus_1.lcm(&q_minus_1)?;
        let mu = lambda.mod_inv(&n)?;

        let public = PublicKey::from_modulus(&n)?;
        debug!("derived {}-bit Paillier key pair", public.bits());
        let private = PrivateKey::new(public.clone(), lambda, mu);
        Ok((public, private))
    }
}

/// Derive a key pair from two primes; see `KeyPairGenerator::from_primes`.
pub fn generate_key_pair(p: &BigNum, q: &BigNum) -> Result<(PublicKey, PrivateKey), PaillierError> {
    KeyPairGenerator::from_primes(p, q)
}

fn check_primes(p: &BigNum, q: &BigNum) -> Result<(), PaillierError> {
    let three = BigNum::from_u64(3);
    if p < &three || q < &three {
        return Err(PaillierError::InvalidKey("primes must be at least 3"));
    }
    if p == q {
        return Err(PaillierError::InvalidKey("p and q must differ"));
    }
    if !p.is_prime_like()? || !q.is_prime_like()? {
        return Err(PaillierError::InvalidKey("p and q must be prime"));
    }
    Ok(())
}
