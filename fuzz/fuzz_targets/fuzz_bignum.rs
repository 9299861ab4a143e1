#![no_main]
use libfuzzer_sys::fuzz_target;
use paillier_bignum::{BigNum, MontgomeryCtx};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 || data.len() > 192 {
        return;
    }
    let third = data.len() / 3;
    let base = BigNum::from_bytes_be(&data[..third]);
    let exp = BigNum::from_bytes_be(&data[third..2 * third]);
    let mut modulus = BigNum::from_bytes_be(&data[2 * third..]);
    modulus.set_bit(0);
    if modulus.is_one() {
        return;
    }

    // Division identity: base = q * m + r with 0 <= r < m
    let (q, r) = base.div_rem(&modulus).unwrap();
    assert!(r < modulus);
    assert_eq!(q.mul(&modulus).add(&r), base);

    // Both exponentiation strategies agree
    if let Ok(ctx) = MontgomeryCtx::new(&modulus) {
        let plain = base.mod_exp(&exp, &modulus).unwrap();
        let mont = ctx.mont_exp(&r, &exp).unwrap();
        assert_eq!(plain, mont);
    }
});
