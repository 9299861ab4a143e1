//! Constant-time operations for big numbers.
//!
//! These operations avoid data-dependent branching to prevent timing side-channel attacks.

use crate::bignum::BigNum;
use subtle::{Choice, ConstantTimeEq};

impl BigNum {
    /// Constant-time equality comparison.
    pub fn ct_eq(&self, other: &BigNum) -> Choice {
        let max_len = self.limbs().len().max(other.limbs().len());
        let mut result = (self.is_negative() as u8).ct_eq(&(other.is_negative() as u8));

        for i in 0..max_len {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = other.limbs().get(i).copied().unwrap_or(0);
            result &= a.ct_eq(&b);
        }

        result
    }

    /// Constant-time conditional select: returns `a` if choice == 0, `b` if choice == 1.
    pub fn ct_select(a: &BigNum, b: &BigNum, choice: Choice) -> BigNum {
        let mask = (choice.unwrap_u8() as u64).wrapping_neg(); // 0 or 0xFFFF...
        let max_len = a.limbs().len().max(b.limbs().len());
        let mut limbs = vec![0u64; max_len];

        for (i, limb) in limbs.iter_mut().enumerate() {
            let av = a.limbs().get(i).copied().unwrap_or(0);
            let bv = b.limbs().get(i).copied().unwrap_or(0);
            *limb = av ^ (mask & (av ^ bv));
        }

        let neg_a = a.is_negative() as u64;
        let neg_b = b.is_negative() as u64;
        let neg = neg_a ^ (mask & (neg_a ^ neg_b));

        let mut result = BigNum::from_limbs(limbs);
        result.set_negative(neg != 0);
        result
    }

    /// Constant-time conditional subtraction of non-negative values: if
    /// self >= modulus, return self - modulus, otherwise return self.
    pub fn ct_sub_if_gte(&self, modulus: &BigNum) -> BigNum {
        let max_len = self.limbs().len().max(modulus.limbs().len());

        let mut diff = vec![0u64; max_len];
        let mut borrow: u64 = 0;
        for (i, d) in diff.iter_mut().enumerate() {
            let a = self.limbs().get(i).copied().unwrap_or(0);
            let b = modulus.limbs().get(i).copied().unwrap_or(0);
            let (d1, b1) = a.overflowing_sub(b);
            let (d2, b2) = d1.overflowing_sub(borrow);
            *d = d2;
            borrow = (b1 as u64) + (b2 as u64);
        }

        // No final borrow means self >= modulus
        let use_diff = Choice::from((borrow == 0) as u8);
        BigNum::ct_select(self, &BigNum::from_limbs(diff), use_diff)
    }
}

impl ConstantTimeEq for BigNum {
    fn ct_eq(&self, other: &Self) -> Choice {
        BigNum::ct_eq(self, other)
    }
}
