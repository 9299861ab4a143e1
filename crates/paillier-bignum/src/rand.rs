//! Uniform random big number sampling from a caller-supplied generator.
//!
//! Every function takes the RNG explicitly so callers choose between OS
//! randomness in production and seeded generators in tests.

use crate::bignum::BigNum;
use paillier_types::PaillierError;
use rand_core::RngCore;

/// Rejection sampling gives up after this many draws. Each draw succeeds with
/// probability at least 1/4, so reaching it means the generator is broken.
const MAX_REJECTIONS: usize = 1024;

impl BigNum {
    /// Generate a random BigNum uniformly in `[0, 2^bits)`.
    pub fn random_bits<R: RngCore + ?Sized>(
        bits: usize,
        rng: &mut R,
    ) -> Result<BigNum, PaillierError> {
        if bits == 0 {
            return Ok(BigNum::zero());
        }

        let num_bytes = bits.div_ceil(8);
        let mut buf = vec![0u8; num_bytes];
        rng.try_fill_bytes(&mut buf)
            .map_err(|_| PaillierError::BnRandGenFail)?;

        // Mask excess bits in the most significant byte
        let excess = num_bytes * 8 - bits;
        if excess > 0 {
            buf[0] &= 0xFF >> excess;
        }

        Ok(BigNum::from_bytes_be(&buf))
    }

    /// Generate a random BigNum uniformly in `[0, upper)`.
    pub fn random_below<R: RngCore + ?Sized>(
        upper: &BigNum,
        rng: &mut R,
    ) -> Result<BigNum, PaillierError> {
        if upper.is_zero() || upper.is_negative() {
            return Err(PaillierError::InvalidArg);
        }

        let bits = upper.bit_len();
        for _ in 0..MAX_REJECTIONS {
            let candidate = BigNum::random_bits(bits, rng)?;
            if candidate < *upper {
                return Ok(candidate);
            }
        }
        Err(PaillierError::BnRandGenFail)
    }

    /// Generate a random BigNum uniformly in `[1, upper)`.
    pub fn random_range<R: RngCore + ?Sized>(
        upper: &BigNum,
        rng: &mut R,
    ) -> Result<BigNum, PaillierError> {
        if upper.is_negative() || upper.is_zero() || upper.is_one() {
            return Err(PaillierError::InvalidArg);
        }

        let bits = upper.bit_len();
        for _ in 0..MAX_REJECTIONS {
            let candidate = BigNum::random_bits(bits, rng)?;
            if !candidate.is_zero() && candidate < *upper {
                return Ok(candidate);
            }
        }
        Err(PaillierError::BnRandGenFail)
    }

    /// Generate a random BigNum uniformly in `[low, high)`.
    pub fn random_between<R: RngCore + ?Sized>(
        low: &BigNum,
        high: &BigNum,
        rng: &mut R,
    ) -> Result<BigNum, PaillierError> {
        if low >= high {
            return Err(PaillierError::InvalidArg);
        }
        let offset = BigNum::random_below(&high.sub(low), rng)?;
        Ok(low.add(&offset))
    }
}
