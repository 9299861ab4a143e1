//! GCD, LCM and modular inverse operations.

use crate::bignum::BigNum;
use paillier_types::PaillierError;

impl BigNum {
    /// Compute the greatest common divisor of self and other using the Euclidean algorithm.
    pub fn gcd(&self, other: &BigNum) -> Result<BigNum, PaillierError> {
        if self.is_zero() && other.is_zero() {
            return Err(PaillierError::InvalidArg);
        }

        // Work with absolute values
        let mut a = self.clone();
        a.set_negative(false);
        let mut b = other.clone();
        b.set_negative(false);

        if a.is_zero() {
            return Ok(b);
        }
        if b.is_zero() {
            return Ok(a);
        }
        if a < b {
            std::mem::swap(&mut a, &mut b);
        }

        loop {
            let (_, rem) = a.div_rem(&b)?;
            if rem.is_zero() {
                return Ok(b);
            }
            a = b;
            b = rem;
        }
    }

    /// Compute the least common multiple: |self * other| / gcd(self, other).
    pub fn lcm(&self, other: &BigNum) -> Result<BigNum, PaillierError> {
        if self.is_zero() || other.is_zero() {
            return Ok(BigNum::zero());
        }
        let g = self.gcd(other)?;
        // Divide first to keep the intermediate small
        let (q, _) = self.div_rem(&g)?;
        let mut l = q.mul(other);
        l.set_negative(false);
        Ok(l)
    }

    /// Compute the modular inverse: self^(-1) mod modulus.
    ///
    /// Returns `Err(BnNoInverse)` if gcd(self, modulus) != 1.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, PaillierError> {
        if modulus.is_zero() || modulus.is_one() {
            return Err(PaillierError::InvalidArg);
        }

        // Extended Euclid tracking only the coefficient of self:
        // old_r = old_s * self (mod modulus)
        let mut old_r = self.mod_reduce(modulus)?;
        if old_r.is_zero() {
            return Err(PaillierError::BnNoInverse);
        }
        let mut r = modulus.clone();

        let mut old_s = BigNum::one();
        let mut s = BigNum::zero();

        while !r.is_zero() {
            let (quotient, remainder) = old_r.div_rem(&r)?;
            old_r = r;
            r = remainder;

            let new_s = old_s.sub(&quotient.mul(&s));
            old_s = s;
            s = new_s;
        }

        if !old_r.is_one() {
            return Err(PaillierError::BnNoInverse);
        }

        old_s.mod_reduce(modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd_basic() {
        let a = BigNum::from_u64(12);
        let b = BigNum::from_u64(8);
        assert_eq!(a.gcd(&b).unwrap(), BigNum::from_u64(4));
    }

    #[test]
    fn test_gcd_coprime() {
        let a = BigNum::from_u64(17);
        let b = BigNum::from_u64(13);
        assert_eq!(a.gcd(&b).unwrap(), BigNum::one());
    }

    #[test]
    fn test_gcd_one_zero() {
        let a = BigNum::from_u64(42);
        let z = BigNum::zero();
        assert_eq!(a.gcd(&z).unwrap(), BigNum::from_u64(42));
        assert_eq!(z.gcd(&a).unwrap(), BigNum::from_u64(42));
    }

    #[test]
    fn test_gcd_both_zero() {
        let z = BigNum::zero();
        assert_eq!(z.gcd(&z).unwrap_err(), PaillierError::InvalidArg);
    }

    #[test]
    fn test_lcm() {
        // lcm(708, 918) for the primes 709 and 919
        let a = BigNum::from_u64(708);
        let b = BigNum::from_u64(918);
        assert_eq!(a.lcm(&b).unwrap(), BigNum::from_u64(108_324));
        assert!(a.lcm(&BigNum::zero()).unwrap().is_zero());
    }

    #[test]
    fn test_lcm_is_common_multiple() {
        let a = BigNum::from_u64(1_000_000_006);
        let b = BigNum::from_u64(1_000_000_008);
        let l = a.lcm(&b).unwrap();
        assert!(l.mod_reduce(&a).unwrap().is_zero());
        assert!(l.mod_reduce(&b).unwrap().is_zero());
        assert!(l < a.mul(&b));
    }

    #[test]
    fn test_mod_inv_basic() {
        // 3 * 5 = 15 ≡ 1 (mod 7)
        let a = BigNum::from_u64(3);
        let m = BigNum::from_u64(7);
        assert_eq!(a.mod_inv(&m).unwrap(), BigNum::from_u64(5));
    }

    #[test]
    fn test_mod_inv_verify() {
        let a = BigNum::from_u64(108_324);
        let m = BigNum::from_u64(709 * 919);
        let inv = a.mod_inv(&m).unwrap();
        assert_eq!(a.mod_mul(&inv, &m).unwrap(), BigNum::one());
    }

    #[test]
    fn test_mod_inv_no_inverse() {
        // gcd(6, 9) = 3 ≠ 1, no inverse
        let a = BigNum::from_u64(6);
        let m = BigNum::from_u64(9);
        assert_eq!(a.mod_inv(&m).unwrap_err(), PaillierError::BnNoInverse);
        assert_eq!(
            BigNum::from_u64(9).mod_inv(&m).unwrap_err(),
            PaillierError::BnNoInverse
        );
    }
}
