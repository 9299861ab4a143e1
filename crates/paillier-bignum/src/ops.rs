//! Basic and modular arithmetic for BigNum.

use std::cmp::Ordering;

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use paillier_types::PaillierError;

impl BigNum {
    /// Add two BigNums: self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        if self.is_negative() == other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result
        } else if self.is_negative() {
            // (-a) + b = b - a
            sub_unsigned(other.limbs(), self.limbs())
        } else {
            // a + (-b) = a - b
            sub_unsigned(self.limbs(), other.limbs())
        }
    }

    /// Subtract: self - other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        if self.is_negative() != other.is_negative() {
            let mut result = add_unsigned(self.limbs(), other.limbs());
            result.set_negative(self.is_negative());
            result
        } else if self.is_negative() {
            // (-a) - (-b) = b - a
            sub_unsigned(other.limbs(), self.limbs())
        } else {
            sub_unsigned(self.limbs(), other.limbs())
        }
    }

    /// Multiply: self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        let mut result = mul_unsigned(self.limbs(), other.limbs());
        result.set_negative(self.is_negative() != other.is_negative());
        result
    }

    /// Square: self * self.
    pub fn sqr(&self) -> BigNum {
        mul_unsigned(self.limbs(), self.limbs())
    }

    /// Shift the magnitude left by `bits`.
    pub fn shl(&self, bits: usize) -> BigNum {
        let limb_shift = bits / LIMB_BITS;
        let bit_shift = bits % LIMB_BITS;
        let src = self.limbs();
        let mut limbs = vec![0u64; src.len() + limb_shift + 1];

        for (i, &l) in src.iter().enumerate() {
            limbs[i + limb_shift] |= l << bit_shift;
            if bit_shift != 0 {
                limbs[i + limb_shift + 1] |= l >> (LIMB_BITS - bit_shift);
            }
        }

        let mut result = BigNum::from_limbs(limbs);
        result.set_negative(self.is_negative());
        result
    }

    /// Shift the magnitude right by `bits`.
    pub fn shr(&self, bits: usize) -> BigNum {
        let limb_shift = bits / LIMB_BITS;
        let bit_shift = bits % LIMB_BITS;
        let src = self.limbs();
        if limb_shift >= src.len() {
            return BigNum::zero();
        }

        let mut limbs = vec![0u64; src.len() - limb_shift];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let lo = src[i + limb_shift] >> bit_shift;
            let hi = if bit_shift != 0 && i + limb_shift + 1 < src.len() {
                src[i + limb_shift + 1] << (LIMB_BITS - bit_shift)
            } else {
                0
            };
            *limb = lo | hi;
        }

        let mut result = BigNum::from_limbs(limbs);
        result.set_negative(self.is_negative());
        result
    }

    /// Truncated division with remainder: returns (quotient, remainder).
    ///
    /// The remainder carries the sign of the dividend.
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), PaillierError> {
        if divisor.is_zero() {
            return Err(PaillierError::BnDivisionByZero);
        }
        let fits_u128 = self.bit_len() <= 2 * LIMB_BITS && divisor.bit_len() <= 2 * LIMB_BITS;
        let (mut q, mut r) = if fits_u128 {
            div_rem_u128(self.limbs(), divisor.limbs())
        } else {
            div_rem_unsigned(self.limbs(), divisor.limbs())
        };
        q.set_negative(self.is_negative() != divisor.is_negative());
        r.set_negative(self.is_negative());
        Ok((q, r))
    }

    /// Modular reduction into `[0, |modulus|)`.
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, PaillierError> {
        let (_, r) = self.div_rem(modulus)?;
        if r.is_negative() {
            let mut m = modulus.clone();
            m.set_negative(false);
            return Ok(m.add(&r));
        }
        Ok(r)
    }

    /// Modular multiplication: self * other mod modulus.
    pub fn mod_mul(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, PaillierError> {
        self.mul(other).mod_reduce(modulus)
    }

    /// Modular exponentiation: self^exp mod modulus.
    ///
    /// Plain right-to-left square-and-multiply with a division per step.
    /// See `MontgomeryCtx::mont_exp` for the faster path on odd moduli.
    pub fn mod_exp(&self, exp: &BigNum, modulus: &BigNum) -> Result<BigNum, PaillierError> {
        if modulus.is_zero() {
            return Err(PaillierError::BnDivisionByZero);
        }
        if exp.is_negative() {
            return Err(PaillierError::InvalidArg);
        }
        let mut result = BigNum::one().mod_reduce(modulus)?;
        let mut base = self.mod_reduce(modulus)?;
        let exp_bits = exp.bit_len();

        for i in 0..exp_bits {
            if exp.get_bit(i) == 1 {
                result = result.mod_mul(&base, modulus)?;
            }
            if i + 1 < exp_bits {
                base = base.sqr().mod_reduce(modulus)?;
            }
        }

        Ok(result)
    }

    /// Compare absolute values.
    pub fn cmp_abs(&self, other: &BigNum) -> Ordering {
        let a_bits = self.bit_len();
        let b_bits = other.bit_len();
        if a_bits != b_bits {
            return a_bits.cmp(&b_bits);
        }
        let len = a_bits.div_ceil(LIMB_BITS);
        for i in (0..len).rev() {
            let a = self.limbs()[i];
            let b = other.limbs()[i];
            if a != b {
                return a.cmp(&b);
            }
        }
        Ordering::Equal
    }
}

/// Add two unsigned limb arrays.
fn add_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let max_len = a.len().max(b.len());
    let mut limbs = vec![0u64; max_len + 1];
    let mut carry: u64 = 0;

    for (i, limb) in limbs.iter_mut().take(max_len).enumerate() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        let sum = av as DoubleLimb + bv as DoubleLimb + carry as DoubleLimb;
        *limb = sum as Limb;
        carry = (sum >> LIMB_BITS) as u64;
    }
    limbs[max_len] = carry;

    BigNum::from_limbs(limbs)
}

/// Subtract unsigned magnitudes: a - b, negative if b > a.
fn sub_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    let mut cmp = Ordering::Equal;
    let max_len = a.len().max(b.len());
    for i in (0..max_len).rev() {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        if av != bv {
            cmp = av.cmp(&bv);
            break;
        }
    }

    let (larger, smaller, negative) = match cmp {
        Ordering::Less => (b, a, true),
        Ordering::Equal => return BigNum::zero(),
        Ordering::Greater => (a, b, false),
    };

    let mut limbs = vec![0u64; larger.len()];
    let mut borrow: u64 = 0;

    for (i, limb) in limbs.iter_mut().enumerate() {
        let sv = smaller.get(i).copied().unwrap_or(0);
        let (diff, b1) = larger[i].overflowing_sub(sv);
        let (diff2, b2) = diff.overflowing_sub(borrow);
        *limb = diff2;
        borrow = (b1 as u64) + (b2 as u64);
    }

    let mut bn = BigNum::from_limbs(limbs);
    bn.set_negative(negative);
    bn
}

/// Multiply two unsigned limb arrays (schoolbook).
fn mul_unsigned(a: &[Limb], b: &[Limb]) -> BigNum {
    if a.iter().all(|&l| l == 0) || b.iter().all(|&l| l == 0) {
        return BigNum::zero();
    }

    let mut limbs = vec![0u64; a.len() + b.len()];

    for (i, &ai) in a.iter().enumerate() {
        let mut carry: u64 = 0;
        for (j, &bj) in b.iter().enumerate() {
            let prod = ai as DoubleLimb * bj as DoubleLimb
                + limbs[i + j] as DoubleLimb
                + carry as DoubleLimb;
            limbs[i + j] = prod as Limb;
            carry = (prod >> LIMB_BITS) as u64;
        }
        limbs[i + b.len()] = carry;
    }

    BigNum::from_limbs(limbs)
}

fn to_u128(limbs: &[Limb]) -> u128 {
    let lo = limbs.first().copied().unwrap_or(0) as u128;
    let hi = limbs.get(1).copied().unwrap_or(0) as u128;
    lo | (hi << LIMB_BITS)
}

fn from_u128(value: u128) -> BigNum {
    BigNum::from_limbs(vec![value as Limb, (value >> LIMB_BITS) as Limb])
}

/// Native division for operands of at most two significant limbs.
fn div_rem_u128(a: &[Limb], b: &[Limb]) -> (BigNum, BigNum) {
    let a = to_u128(a);
    let b = to_u128(b);
    (from_u128(a / b), from_u128(a % b))
}

/// Strip high zero limbs, keeping at least one.
fn significant(limbs: &[Limb]) -> &[Limb] {
    let len = limbs.iter().rposition(|&l| l != 0).map_or(1, |i| i + 1);
    &limbs[..len.min(limbs.len())]
}

/// Divide by a single limb.
fn div_rem_limb(a: &[Limb], d: Limb) -> (BigNum, BigNum) {
    let mut quotient = vec![0u64; a.len()];
    let mut rem: DoubleLimb = 0;
    for i in (0..a.len()).rev() {
        let cur = (rem << LIMB_BITS) | a[i] as DoubleLimb;
        quotient[i] = (cur / d as DoubleLimb) as Limb;
        rem = cur % d as DoubleLimb;
    }
    (BigNum::from_limbs(quotient), BigNum::from_u64(rem as Limb))
}

/// Shift a limb array left by `shift < LIMB_BITS` into `len` limbs.
fn shl_limbs(x: &[Limb], shift: u32, len: usize) -> Vec<Limb> {
    let mut out = vec![0u64; len];
    for (i, &l) in x.iter().enumerate() {
        out[i] |= l << shift;
        if shift != 0 && i + 1 < len {
            out[i + 1] |= l >> (LIMB_BITS as u32 - shift);
        }
    }
    out
}

/// Knuth's Algorithm D (TAOCP 4.3.1) on unsigned magnitudes.
fn div_rem_unsigned(a: &[Limb], b: &[Limb]) -> (BigNum, BigNum) {
    let a = significant(a);
    let b = significant(b);
    if BigNum::from_limbs(a.to_vec()).cmp_abs(&BigNum::from_limbs(b.to_vec())) == Ordering::Less {
        return (BigNum::zero(), BigNum::from_limbs(a.to_vec()));
    }
    if b.len() == 1 {
        return div_rem_limb(a, b[0]);
    }

    let n = b.len();
    let m = a.len() - n;
    let base: DoubleLimb = 1 << LIMB_BITS;

    // Normalize so the divisor's top bit is set
    let shift = b[n - 1].leading_zeros();
    let v = shl_limbs(b, shift, n);
    let mut u = shl_limbs(a, shift, a.len() + 1);
    let mut quotient = vec![0u64; m + 1];

    for j in (0..=m).rev() {
        let num = ((u[j + n] as DoubleLimb) << LIMB_BITS) | u[j + n - 1] as DoubleLimb;
        let mut qhat = num / v[n - 1] as DoubleLimb;
        let mut rhat = num % v[n - 1] as DoubleLimb;
        while qhat >= base
            || qhat * v[n - 2] as DoubleLimb > ((rhat << LIMB_BITS) | u[j + n - 2] as DoubleLimb)
        {
            qhat -= 1;
            rhat += v[n - 1] as DoubleLimb;
            if rhat >= base {
                break;
            }
        }

        // u[j..=j+n] -= qhat * v
        let mut carry: DoubleLimb = 0;
        let mut borrow: u64 = 0;
        for i in 0..n {
            let p = qhat * v[i] as DoubleLimb + carry;
            carry = p >> LIMB_BITS;
            let (t, b1) = u[i + j].overflowing_sub(p as Limb);
            let (t, b2) = t.overflowing_sub(borrow);
            u[i + j] = t;
            borrow = (b1 as u64) + (b2 as u64);
        }
        let (t, b1) = u[j + n].overflowing_sub(carry as Limb);
        let (t, b2) = t.overflowing_sub(borrow);
        u[j + n] = t;

        // qhat was one too large: add the divisor back
        if b1 || b2 {
            qhat -= 1;
            let mut carry: DoubleLimb = 0;
            for i in 0..n {
                let sum = u[i + j] as DoubleLimb + v[i] as DoubleLimb + carry;
                u[i + j] = sum as Limb;
                carry = sum >> LIMB_BITS;
            }
            u[j + n] = u[j + n].wrapping_add(carry as Limb);
        }
        quotient[j] = qhat as Limb;
    }

    // Denormalize the remainder held in u[..n]
    let mut remainder = vec![0u64; n];
    for (i, limb) in remainder.iter_mut().enumerate() {
        *limb = u[i] >> shift;
        if shift != 0 {
            *limb |= u[i + 1] << (LIMB_BITS as u32 - shift);
        }
    }

    (BigNum::from_limbs(quotient), BigNum::from_limbs(remainder))
}
