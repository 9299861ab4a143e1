#![no_main]
use libfuzzer_sys::fuzz_target;
use paillier_engine::{generate_key_pair, Backend, BigNum, ExecutionConfig, PaillierError};

fuzz_target!(|data: &[u8]| {
    let (pk, sk) = generate_key_pair(&BigNum::from_u64(709), &BigNum::from_u64(919)).unwrap();
    let batch: Vec<BigNum> = data.chunks(5).map(BigNum::from_bytes_be).collect();
    if batch.is_empty() {
        return;
    }
    let config = ExecutionConfig::for_batch(batch.len()).unwrap();

    // Every backend must agree on the result or on the error
    let expected = sk.decrypt(&batch, Backend::Naive, &config);
    for backend in [Backend::Optimized, Backend::Parallel, Backend::ParallelOptimized] {
        let got = sk.decrypt(&batch, backend, &config);
        match (&expected, &got) {
            (Ok(a), Ok(b)) => assert_eq!(a.values(), b.values()),
            (Err(a), Err(b)) => assert_eq!(a, b),
            _ => panic!("{backend} disagrees with naive"),
        }
    }
    if let Err(err) = expected {
        assert!(matches!(
            err,
            PaillierError::OutOfRange { .. } | PaillierError::InvalidCiphertext { .. }
        ));
    } else {
        assert!(batch.iter().all(|c| c < pk.n_sq()));
    }
});
