//! Per-element encryption and decryption programs.
//!
//! Every engine runs these same programs; engines differ only in which
//! `Arithmetic` they select and how they schedule elements.

use log::debug;
use paillier_bignum::BigNum;
use paillier_types::{Backend, PaillierError};
use rand_core::RngCore;

use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;

/// Exponentiation strategy of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arithmetic {
    /// `g^m` and every power by square-and-multiply with a division per step.
    SquareMultiply,
    /// `g^m = 1 + m·n` and every power by windowed Montgomery exponentiation.
    Montgomery,
}

impl Arithmetic {
    pub(crate) fn for_backend(backend: Backend) -> Self {
        if backend.is_optimized() {
            Arithmetic::Montgomery
        } else {
            Arithmetic::SquareMultiply
        }
    }
}

/// Reject the batch if any plaintext lies outside `[0, n)`.
pub(crate) fn check_plaintexts(
    key: &PublicKey,
    plaintexts: &[BigNum],
) -> Result<(), PaillierError> {
    for (index, m) in plaintexts.iter().enumerate() {
        key.check_plaintext(m, index)?;
    }
    Ok(())
}

/// Reject the batch if any ciphertext lies outside `[0, n²)`.
pub(crate) fn check_ciphertexts(
    key: &PublicKey,
    ciphertexts: &[BigNum],
) -> Result<(), PaillierError> {
    for (index, c) in ciphertexts.iter().enumerate() {
        key.check_ciphertext(c, index)?;
    }
    Ok(())
}

/// Draw `r ∈ [1, n)` with `gcd(r, n) = 1`, giving up after `budget` draws.
pub(crate) fn sample_randomizer<R: RngCore + ?Sized>(
    n: &BigNum,
    budget: usize,
    rng: &mut R,
) -> Result<BigNum, PaillierError> {
    for _ in 0..budget {
        let r = BigNum::random_range(n, rng)?;
        if r.gcd(n)?.is_one() {
            return Ok(r);
        }
    }
    debug!("randomizer resampling exhausted after {budget} draws");
    Err(PaillierError::RandomnessExhausted { attempts: budget })
}

/// `c = g^m · r^n mod n²` for a plaintext already checked against `n`.
pub(crate) fn encrypt_element<R: RngCore + ?Sized>(
    key: &PublicKey,
    m: &BigNum,
    arith: Arithmetic,
    budget: usize,
    rng: &mut R,
) -> Result<BigNum, PaillierError> {
    let r = sample_randomizer(key.n(), budget, rng)?;
    match arith {
        Arithmetic::SquareMultiply => {
            let gm = key.g().mod_exp(m, key.n_sq())?;
            let rn = r.mod_exp(key.n(), key.n_sq())?;
            gm.mod_mul(&rn, key.n_sq())
        }
        Arithmetic::Montgomery => {
            let gm = key.g_pow(m)?;
            let rn = key.montgomery().mont_exp(&r, key.n())?;
            gm.mod_mul(&rn, key.n_sq())
        }
    }
}

/// `m = L(c^λ mod n²) · μ mod n` for a ciphertext already checked against `n²`.
///
/// `index` is only used to label the error for a malformed ciphertext.
pub(crate) fn decrypt_element(
    key: &PrivateKey,
    c: &BigNum,
    index: usize,
    arith: Arithmetic,
) -> Result<BigNum, PaillierError> {
    let n = key.public_key().n();
    let n_sq = key.public_key().n_sq();
    let u = match arith {
        Arithmetic::SquareMultiply => c.mod_exp(key.lambda(), n_sq)?,
        Arithmetic::Montgomery => key.public_key().montgomery().mont_exp(c, key.lambda())?,
    };

    // Well-formed ciphertexts give u ≡ 1 (mod n)
    if u.is_zero() {
        return Err(PaillierError::InvalidCiphertext { index });
    }
    let (l, rem) = u.sub(&BigNum::one()).div_rem(n)?;
    if !rem.is_zero() {
        return Err(PaillierError::InvalidCiphertext { index });
    }

    l.mod_mul(key.mu(), n)
}
