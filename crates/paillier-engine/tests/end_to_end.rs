//! End-to-end batch tests across every backend.

use paillier_engine::{
    generate_key_pair, Backend, BigNum, DecryptRequest, Device, EncryptRequest, ExecutionConfig,
    Homomorphic, PaillierError, PrivateKey, PublicKey,
};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn keys() -> (PublicKey, PrivateKey) {
    generate_key_pair(&BigNum::from_u64(709), &BigNum::from_u64(919)).unwrap()
}

fn random_plaintexts(pk: &PublicKey, count: usize, seed: u64) -> Vec<BigNum> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let low = BigNum::from_u64(100);
    (0..count)
        .map(|_| BigNum::random_between(&low, pk.n(), &mut rng).unwrap())
        .collect()
}

// -------------------------------------------------------
// 1. Full default grid, every backend
// -------------------------------------------------------
#[test]
fn test_full_grid_roundtrip_all_backends() {
    let (pk, sk) = keys();
    assert_eq!(pk.n(), &BigNum::from_u64(651_571));

    let config = ExecutionConfig::default();
    assert_eq!(config.lanes(), 128 * 128);
    let plaintexts = random_plaintexts(&pk, config.lanes(), 2024);
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    for backend in Backend::ALL {
        let encrypted = pk
            .encrypt_with_rng(&plaintexts, backend, &config, &mut rng)
            .unwrap();
        assert_eq!(encrypted.len(), plaintexts.len(), "{backend}");
        for c in encrypted.values() {
            assert!(c < pk.n_sq());
        }

        let (decrypted, _) = sk
            .decrypt(encrypted.values(), backend, &config)
            .unwrap()
            .into_parts();
        assert_eq!(decrypted, plaintexts, "{backend}");
    }
}

// -------------------------------------------------------
// 2. Ciphertexts from one backend decrypt on every other
// -------------------------------------------------------
#[test]
fn test_cross_backend_consistency() {
    let (pk, sk) = keys();
    let config = ExecutionConfig::new(16, 4).unwrap();
    let plaintexts = random_plaintexts(&pk, config.lanes(), 11);
    let mut rng = ChaCha20Rng::seed_from_u64(12);

    for producer in Backend::ALL {
        let encrypted = pk
            .encrypt_with_rng(&plaintexts, producer, &config, &mut rng)
            .unwrap();
        for consumer in Backend::ALL {
            let decrypted = sk.decrypt(encrypted.values(), consumer, &config).unwrap();
            assert_eq!(
                decrypted.values(),
                plaintexts.as_slice(),
                "{producer} -> {consumer}"
            );
        }
    }
}

// -------------------------------------------------------
// 3. Output order follows input order
// -------------------------------------------------------
#[test]
fn test_order_preserved_with_many_workers() {
    let (pk, sk) = keys();
    let device = Device::builder().worker_threads(8).build().unwrap();
    // Strictly increasing plaintexts make any reordering visible
    let plaintexts: Vec<BigNum> = (0..256u64).map(|i| BigNum::from_u64(100 + i * 2500)).collect();
    let config = ExecutionConfig::new(32, 8).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(3);

    for backend in [Backend::Parallel, Backend::ParallelOptimized] {
        let encrypted = EncryptRequest::new(&pk, &plaintexts, backend, config)
            .run(&device, &mut rng)
            .unwrap();
        let decrypted = DecryptRequest::new(&sk, encrypted.values(), backend, config)
            .run(&device)
            .unwrap();
        assert_eq!(decrypted.values(), plaintexts.as_slice(), "{backend}");
    }
}

// -------------------------------------------------------
// 4. Encryption is randomized
// -------------------------------------------------------
#[test]
fn test_equal_plaintexts_encrypt_differently() {
    let (pk, sk) = keys();
    let plaintexts = vec![BigNum::from_u64(31_337); 8];
    let config = ExecutionConfig::new(8, 1).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(4);

    for backend in Backend::ALL {
        let encrypted = pk
            .encrypt_with_rng(&plaintexts, backend, &config, &mut rng)
            .unwrap();
        let values = encrypted.values();
        for i in 0..values.len() {
            for j in i + 1..values.len() {
                assert_ne!(values[i], values[j], "{backend}: lanes {i} and {j}");
            }
        }
        let decrypted = sk.decrypt(values, backend, &config).unwrap();
        assert_eq!(decrypted.values(), plaintexts.as_slice());
    }
}

// -------------------------------------------------------
// 5. Grid must match the batch on parallel backends only
// -------------------------------------------------------
#[test]
fn test_config_mismatch() {
    let (pk, sk) = keys();
    let plaintexts = random_plaintexts(&pk, 100, 5);
    let config = ExecutionConfig::default();

    for backend in [Backend::Parallel, Backend::ParallelOptimized] {
        assert_eq!(
            pk.encrypt(&plaintexts, backend, &config).unwrap_err(),
            PaillierError::ConfigMismatch {
                lanes: 16_384,
                batch: 100
            }
        );
        assert_eq!(
            sk.decrypt(&plaintexts, backend, &config).unwrap_err(),
            PaillierError::ConfigMismatch {
                lanes: 16_384,
                batch: 100
            }
        );
    }
    for backend in [Backend::Naive, Backend::Optimized] {
        assert_eq!(pk.encrypt(&plaintexts, backend, &config).unwrap().len(), 100);
    }
}

// -------------------------------------------------------
// 6. Homomorphic laws over a whole batch
// -------------------------------------------------------
#[test]
fn test_homomorphic_laws() {
    let (pk, sk) = keys();
    let n = pk.n().to_u64().unwrap();
    let config = ExecutionConfig::new(8, 8).unwrap();
    let a = random_plaintexts(&pk, config.lanes(), 21);
    let b = random_plaintexts(&pk, config.lanes(), 22);
    let mut rng = ChaCha20Rng::seed_from_u64(23);

    let ea = pk
        .encrypt_with_rng(&a, Backend::ParallelOptimized, &config, &mut rng)
        .unwrap();
    let eb = pk
        .encrypt_with_rng(&b, Backend::Parallel, &config, &mut rng)
        .unwrap();

    let sums = Homomorphic::add_batch(&pk, ea.values(), eb.values()).unwrap();
    let k = BigNum::from_u64(12_345);
    let scaled: Vec<BigNum> = ea
        .values()
        .iter()
        .map(|c| Homomorphic::scalar_multiply(&pk, c, &k).unwrap())
        .collect();

    let sums = sk.decrypt(&sums, Backend::Optimized, &config).unwrap();
    let scaled = sk.decrypt(&scaled, Backend::ParallelOptimized, &config).unwrap();
    for i in 0..config.lanes() {
        let x = a[i].to_u64().unwrap();
        let y = b[i].to_u64().unwrap();
        assert_eq!(sums.values()[i].to_u64().unwrap(), (x + y) % n);
        assert_eq!(scaled.values()[i].to_u64().unwrap(), (x * 12_345) % n);
    }
}

// -------------------------------------------------------
// 7. Device buffers are released when a lane fails
// -------------------------------------------------------
#[test]
fn test_buffers_released_after_lane_failure() {
    let (pk, sk) = keys();
    let device = Device::builder().worker_threads(2).build().unwrap();
    let config = ExecutionConfig::new(4, 1).unwrap();
    let plaintexts = random_plaintexts(&pk, 4, 31);
    let mut rng = ChaCha20Rng::seed_from_u64(32);

    let mut ciphertexts = EncryptRequest::new(&pk, &plaintexts, Backend::Parallel, config)
        .run(&device, &mut rng)
        .unwrap()
        .into_parts()
        .0;
    assert_eq!(device.live_buffers(), 0);

    ciphertexts[3] = BigNum::from_u64(709 * 5);
    let err = DecryptRequest::new(&sk, &ciphertexts, Backend::ParallelOptimized, config)
        .run(&device)
        .unwrap_err();
    assert_eq!(err, PaillierError::InvalidCiphertext { index: 3 });
    assert_eq!(device.live_buffers(), 0);
}

// -------------------------------------------------------
// 8. Out-of-range input aborts the whole batch
// -------------------------------------------------------
#[test]
fn test_out_of_range_rejected_on_every_backend() {
    let (pk, sk) = keys();
    let config = ExecutionConfig::new(3, 1).unwrap();
    let plaintexts = vec![BigNum::from_u64(1), BigNum::from_u64(2), pk.n().clone()];
    let ciphertexts = vec![BigNum::one(), pk.n_sq().clone(), BigNum::one()];

    for backend in Backend::ALL {
        assert_eq!(
            pk.encrypt(&plaintexts, backend, &config).unwrap_err(),
            PaillierError::OutOfRange { index: 2 }
        );
        assert_eq!(
            sk.decrypt(&ciphertexts, backend, &config).unwrap_err(),
            PaillierError::OutOfRange { index: 1 }
        );
    }
}

// -------------------------------------------------------
// 9. Exhausted randomizer budget fails the whole batch
// -------------------------------------------------------
#[test]
fn test_randomness_exhausted_on_every_backend() {
    // n = 15: almost half of [1, n) shares a factor with n
    let (pk, _) = generate_key_pair(&BigNum::from_u64(3), &BigNum::from_u64(5)).unwrap();
    let device = Device::builder().worker_threads(4).build().unwrap();
    let config = ExecutionConfig::builder()
        .threads_per_block(32)
        .blocks(1)
        .resample_budget(1)
        .build()
        .unwrap();
    let plaintexts: Vec<BigNum> = (0..32u64).map(|i| BigNum::from_u64(i % 15)).collect();
    let mut rng = ChaCha20Rng::seed_from_u64(41);

    for backend in Backend::ALL {
        let result = EncryptRequest::new(&pk, &plaintexts, backend, config).run(&device, &mut rng);
        assert_eq!(
            result.unwrap_err(),
            PaillierError::RandomnessExhausted { attempts: 1 },
            "{backend}"
        );
        assert_eq!(device.live_buffers(), 0, "{backend}");
    }
}
