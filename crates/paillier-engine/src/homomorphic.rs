//! Additive homomorphic operators on Paillier ciphertexts.
//!
//! `E(a) · E(b) = E(a + b)` and `E(a)^k = E(a · k)`, all modulo `n²`.
//! Results remain valid ciphertexts under the same key.

use paillier_bignum::BigNum;
use paillier_types::PaillierError;

use crate::public_key::PublicKey;

/// Homomorphic operations over ciphertexts of one public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Homomorphic;

impl Homomorphic {
    /// `c1 · c2 mod n²`, an encryption of the sum of the plaintexts.
    ///
    /// `OutOfRange` names the offending operand: 0 for `c1`, 1 for `c2`.
    pub fn add(key: &PublicKey, c1: &BigNum, c2: &BigNum) -> Result<BigNum, PaillierError> {
        key.check_ciphertext(c1, 0)?;
        key.check_ciphertext(c2, 1)?;
        c1.mod_mul(c2, key.n_sq())
    }

    /// `c^k mod n²`, an encryption of the plaintext times `k`.
    ///
    /// `k` may be any non-negative size; a negative scalar is `InvalidArg`.
    pub fn scalar_multiply(
        key: &PublicKey,
        c: &BigNum,
        k: &BigNum,
    ) -> Result<BigNum, PaillierError> {
        key.check_ciphertext(c, 0)?;
        if k.is_negative() {
            return Err(PaillierError::InvalidArg);
        }
        key.montgomery().mont_exp(c, k)
    }

    /// `c · g^m mod n²`, adding a known plaintext `m ∈ [0, n)` to `c`.
    pub fn add_plaintext(key: &PublicKey, c: &BigNum, m: &BigNum) -> Result<BigNum, PaillierError> {
        key.check_ciphertext(c, 0)?;
        key.check_plaintext(m, 1)?;
        c.mod_mul(&key.g_pow(m)?, key.n_sq())
    }

    /// Element-wise `add` over two index-aligned batches.
    ///
    /// Batches of different lengths are `InvalidArg`; `OutOfRange` names the
    /// element index.
    pub fn add_batch(
        key: &PublicKey,
        a: &[BigNum],
        b: &[BigNum],
    ) -> Result<Vec<BigNum>, PaillierError> {
        if a.len() != b.len() {
            return Err(PaillierError::InvalidArg);
        }
        for (index, (x, y)) in a.iter().zip(b).enumerate() {
            key.check_ciphertext(x, index)?;
            key.check_ciphertext(y, index)?;
        }
        a.iter().zip(b).map(|(x, y)| x.mod_mul(y, key.n_sq())).collect()
    }

    /// Element-wise `scalar_multiply` with one scalar per ciphertext.
    pub fn scalar_multiply_batch(
        key: &PublicKey,
        ciphertexts: &[BigNum],
        scalars: &[BigNum],
    ) -> Result<Vec<BigNum>, PaillierError> {
        if ciphertexts.len() != scalars.len() {
            return Err(PaillierError::InvalidArg);
        }
        for (index, (c, k)) in ciphertexts.iter().zip(scalars).enumerate() {
            key.check_ciphertext(c, index)?;
            if k.is_negative() {
                return Err(PaillierError::InvalidArg);
            }
        }
        let mont = key.montgomery();
        ciphertexts
            .iter()
            .zip(scalars)
            .map(|(c, k)| mont.mont_exp(c, k))
            .collect()
    }
}
