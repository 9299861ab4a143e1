//! Small-factor screening of supplied primes.
//!
//! Prime generation and probabilistic primality testing are out of scope:
//! primes are supplied by the caller. This only rejects values that are
//! obviously composite.

use crate::bignum::BigNum;
use paillier_types::PaillierError;

/// Small primes for trial division.
const SMALL_PRIMES: [u64; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

impl BigNum {
    /// Return true if this value is at least 2 and has no factor among the
    /// primes below 50, other than itself.
    pub fn is_prime_like(&self) -> Result<bool, PaillierError> {
        if self.is_negative() || self < &BigNum::from_u64(2) {
            return Ok(false);
        }

        for &p in &SMALL_PRIMES {
            let p_bn = BigNum::from_u64(p);
            if *self == p_bn {
                return Ok(true);
            }
            let (_, rem) = self.div_rem(&p_bn)?;
            if rem.is_zero() {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
