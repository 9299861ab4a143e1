//! Big number type and basic accessors.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Limb type for big number representation (64-bit on 64-bit platforms).
pub type Limb = u64;
/// Double-width type for multiplication intermediates.
pub type DoubleLimb = u128;

/// Bits per limb.
pub const LIMB_BITS: usize = 64;

/// A heap-allocated big number that is zeroized on drop.
///
/// Internally represented as a little-endian array of `u64` limbs. Ciphertexts
/// live modulo `n²`, so values routinely span twice the key size; there is no
/// fixed upper bound.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BigNum {
    /// Little-endian limbs (limbs[0] is the least significant).
    limbs: Vec<Limb>,
    /// True if the number is negative.
    negative: bool,
}

impl BigNum {
    /// Create a zero-valued BigNum.
    pub fn zero() -> Self {
        Self {
            limbs: vec![0],
            negative: false,
        }
    }

    /// Create a BigNum equal to one.
    pub fn one() -> Self {
        Self::from_u64(1)
    }

    /// Create a BigNum from a `u64` value.
    pub fn from_u64(value: u64) -> Self {
        Self {
            limbs: vec![value],
            negative: false,
        }
    }

    /// Return the value as `u64` if it is non-negative and fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() || self.bit_len() > LIMB_BITS {
            return None;
        }
        Some(self.limbs[0])
    }

    /// Create a BigNum from big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::zero();
        }

        let num_limbs = bytes.len().div_ceil(8);
        let mut limbs = vec![0u64; num_limbs];

        for (i, &byte) in bytes.iter().rev().enumerate() {
            limbs[i / 8] |= (byte as u64) << ((i % 8) * 8);
        }

        Self::from_limbs(limbs)
    }

    /// Export to big-endian bytes (minimal length, at least one byte).
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let bits = self.bit_len();
        if bits == 0 {
            return vec![0];
        }

        let num_bytes = bits.div_ceil(8);
        let mut bytes = vec![0u8; num_bytes];

        for (i, byte) in bytes.iter_mut().rev().enumerate() {
            *byte = (self.limbs[i / 8] >> ((i % 8) * 8)) as u8;
        }

        bytes
    }

    /// Return the number of significant bits.
    pub fn bit_len(&self) -> usize {
        for i in (0..self.limbs.len()).rev() {
            if self.limbs[i] != 0 {
                return i * LIMB_BITS + (LIMB_BITS - self.limbs[i].leading_zeros() as usize);
            }
        }
        0
    }

    /// Return the number of limbs.
    pub fn num_limbs(&self) -> usize {
        self.limbs.len()
    }

    /// Return true if this number is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Return true if this number is negative.
    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// Return the limbs as a slice.
    pub fn limbs(&self) -> &[Limb] {
        &self.limbs
    }

    /// Set the sign. Zero is never negative.
    pub fn set_negative(&mut self, neg: bool) {
        self.negative = neg && !self.is_zero();
    }

    /// Create a BigNum from a vector of little-endian limbs.
    pub fn from_limbs(limbs: Vec<Limb>) -> Self {
        let mut bn = Self {
            limbs: if limbs.is_empty() { vec![0] } else { limbs },
            negative: false,
        };
        bn.normalize();
        bn
    }

    /// Return true if this number equals 1.
    pub fn is_one(&self) -> bool {
        !self.negative && self.bit_len() == 1
    }

    /// Return true if this number is even.
    pub fn is_even(&self) -> bool {
        self.limbs[0] & 1 == 0
    }

    /// Return true if this number is odd.
    pub fn is_odd(&self) -> bool {
        self.limbs[0] & 1 == 1
    }

    /// Get bit at position `idx` (0-indexed from LSB).
    pub fn get_bit(&self, idx: usize) -> u64 {
        let limb_idx = idx / LIMB_BITS;
        let bit_idx = idx % LIMB_BITS;
        if limb_idx >= self.limbs.len() {
            0
        } else {
            (self.limbs[limb_idx] >> bit_idx) & 1
        }
    }

    /// Set bit at position `idx` (0-indexed from LSB).
    pub fn set_bit(&mut self, idx: usize) {
        let limb_idx = idx / LIMB_BITS;
        let bit_idx = idx % LIMB_BITS;
        if limb_idx >= self.limbs.len() {
            self.limbs.resize(limb_idx + 1, 0);
        }
        self.limbs[limb_idx] |= 1u64 << bit_idx;
    }

    /// Remove leading zero limbs.
    pub(crate) fn normalize(&mut self) {
        while self.limbs.len() > 1 && self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
        if self.is_zero() {
            self.negative = false;
        }
    }
}

impl From<u64> for BigNum {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl std::fmt::Debug for BigNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let hex = self
            .to_bytes_be()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();
        write!(f, "BigNum({sign}0x{hex})")
    }
}

impl PartialEq for BigNum {
    fn eq(&self, other: &Self) -> bool {
        self.is_negative() == other.is_negative()
            && self.cmp_abs(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for BigNum {}

impl PartialOrd for BigNum {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNum {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_abs(other),
            // Both negative: larger absolute value is smaller
            (true, true) => other.cmp_abs(self),
        }
    }
}
