//! Montgomery multiplication context for modular exponentiation.

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use paillier_types::PaillierError;

/// Montgomery multiplication context.
///
/// Precomputes values needed for efficient modular multiplication
/// using the Montgomery form: R = 2^(m_size * LIMB_BITS). Read-only after
/// construction, so one context can be shared by any number of threads.
#[derive(Clone, Debug)]
pub struct MontgomeryCtx {
    /// The modulus N (must be odd).
    modulus: BigNum,
    /// Number of limbs in the modulus.
    m_size: usize,
    /// N' such that N[0] * N' ≡ -1 (mod 2^64).
    n_prime: u64,
    /// R² mod N, used for encoding into Montgomery form.
    r_squared: BigNum,
    /// R mod N, the Montgomery form of 1.
    one_mont: BigNum,
}

impl MontgomeryCtx {
    /// Create a new Montgomery context for the given odd modulus.
    pub fn new(modulus: &BigNum) -> Result<Self, PaillierError> {
        if modulus.is_zero() {
            return Err(PaillierError::BnDivisionByZero);
        }
        if !modulus.is_odd() || modulus.is_negative() {
            return Err(PaillierError::InvalidArg);
        }

        let m_size = modulus.num_limbs();
        let n_prime = compute_n_prime(modulus.limbs()[0]);
        let r = BigNum::one().shl(m_size * LIMB_BITS);
        let one_mont = r.mod_reduce(modulus)?;
        let r_squared = r.sqr().mod_reduce(modulus)?;

        Ok(MontgomeryCtx {
            modulus: modulus.clone(),
            m_size,
            n_prime,
            r_squared,
            one_mont,
        })
    }

    /// Return a reference to the modulus.
    pub fn modulus(&self) -> &BigNum {
        &self.modulus
    }

    /// Convert a value into Montgomery form: aR mod N.
    pub fn to_mont(&self, a: &BigNum) -> Result<BigNum, PaillierError> {
        let a_reduced = a.mod_reduce(&self.modulus)?;
        Ok(self.mont_reduce(&a_reduced.mul(&self.r_squared)))
    }

    /// Convert from Montgomery form back to normal: a * R^(-1) mod N.
    pub fn from_mont(&self, a_mont: &BigNum) -> BigNum {
        self.mont_reduce(a_mont)
    }

    /// Montgomery multiplication: (a * b * R^(-1)) mod N.
    /// Both a and b must be in Montgomery form.
    pub fn mont_mul(&self, a: &BigNum, b: &BigNum) -> BigNum {
        self.mont_reduce(&a.mul(b))
    }

    /// Montgomery squaring: (a² * R^(-1)) mod N.
    pub fn mont_sqr(&self, a: &BigNum) -> BigNum {
        self.mont_reduce(&a.sqr())
    }

    /// Montgomery REDC: given T < N·R, compute T * R^(-1) mod N.
    ///
    /// ```text
    /// for i = 0 to m_size-1:
    ///   q_i = t[i] * n_prime mod 2^64
    ///   T = T + q_i * N * 2^(i*64)
    /// T = T >> (m_size * 64)
    /// if T >= N: T = T - N
    /// ```
    fn mont_reduce(&self, t: &BigNum) -> BigNum {
        let m = self.m_size;
        let mod_limbs = self.modulus.limbs();

        let mut work = vec![0u64; 2 * m + 2];
        let t_limbs = t.limbs();
        let copy_len = t_limbs.len().min(work.len());
        work[..copy_len].copy_from_slice(&t_limbs[..copy_len]);

        for i in 0..m {
            let q = work[i].wrapping_mul(self.n_prime);

            let mut carry: u64 = 0;
            for j in 0..m {
                let prod = q as DoubleLimb * mod_limbs[j] as DoubleLimb
                    + work[i + j] as DoubleLimb
                    + carry as DoubleLimb;
                work[i + j] = prod as Limb;
                carry = (prod >> LIMB_BITS) as u64;
            }
            let mut k = i + m;
            while carry != 0 && k < work.len() {
                let sum = work[k] as DoubleLimb + carry as DoubleLimb;
                work[k] = sum as Limb;
                carry = (sum >> LIMB_BITS) as u64;
                k += 1;
            }
        }

        // The shifted value is below 2N, which may need the carry limb work[2m]
        let result = BigNum::from_limbs(work[m..=2 * m].to_vec());
        result.ct_sub_if_gte(&self.modulus)
    }

    /// Windowed Montgomery exponentiation: base^exp mod N.
    ///
    /// Uses variable window size based on exponent length for efficiency.
    pub fn mont_exp(&self, base: &BigNum, exp: &BigNum) -> Result<BigNum, PaillierError> {
        if exp.is_negative() {
            return Err(PaillierError::InvalidArg);
        }
        if exp.is_zero() {
            return BigNum::one().mod_reduce(&self.modulus);
        }

        let exp_bits = exp.bit_len();
        let w = get_window_size(exp_bits);
        let table_size = 1usize << w;

        // table[i] = base^i in Montgomery form
        let base_mont = self.to_mont(base)?;
        let mut table = Vec::with_capacity(table_size);
        table.push(self.one_mont.clone());
        table.push(base_mont.clone());
        for i in 2..table_size {
            let val = self.mont_mul(&table[i - 1], &base_mont);
            table.push(val);
        }

        let mut result = self.one_mont.clone();

        // Most significant window first
        let mut i = exp_bits;
        while i > 0 {
            let window_bits = w.min(i);
            i -= window_bits;

            for _ in 0..window_bits {
                result = self.mont_sqr(&result);
            }

            let mut window_val = 0u64;
            for b in 0..window_bits {
                window_val |= exp.get_bit(i + b) << b;
            }

            if window_val != 0 {
                result = self.mont_mul(&result, &table[window_val as usize]);
            }
        }

        Ok(self.from_mont(&result))
    }
}

/// Compute N' such that N[0] * N' ≡ -1 (mod 2^64).
///
/// Uses Newton's method: x = x * (2 - n0 * x), iterated to converge mod 2^64.
fn compute_n_prime(n0: u64) -> u64 {
    let mut x: u64 = 1;
    for _ in 0..6 {
        x = x.wrapping_mul(2u64.wrapping_sub(n0.wrapping_mul(x)));
    }
    x.wrapping_neg()
}

/// Determine window size for modular exponentiation based on exponent bit length.
fn get_window_size(bits: usize) -> usize {
    if bits > 512 {
        6
    } else if bits > 256 {
        5
    } else if bits > 128 {
        4
    } else if bits > 64 {
        3
    } else if bits > 32 {
        2
    } else {
        1
    }
}
