//! Immutable per-call request records and the batch result type.

use std::time::Duration;

use log::debug;
use paillier_bignum::BigNum;
use paillier_types::{Backend, ExecutionConfig, PaillierError};
use rand_core::RngCore;

use crate::backend::engine_for;
use crate::device::Device;
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;

/// Result of one batch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    values: Vec<BigNum>,
    compute_time: Duration,
}

impl BatchOutput {
    pub(crate) fn new(values: Vec<BigNum>, compute_time: Duration) -> Self {
        Self {
            values,
            compute_time,
        }
    }

    /// Output batch, index-aligned with the input batch.
    pub fn values(&self) -> &[BigNum] {
        &self.values
    }

    /// Time spent in arithmetic only, excluding allocation and transfers.
    pub fn compute_time(&self) -> Duration {
        self.compute_time
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Split into the output batch and the pure compute duration.
    pub fn into_parts(self) -> (Vec<BigNum>, Duration) {
        (self.values, self.compute_time)
    }
}

/// One batch encryption call.
#[derive(Debug, Clone, Copy)]
pub struct EncryptRequest<'a> {
    pub key: &'a PublicKey,
    pub plaintexts: &'a [BigNum],
    pub backend: Backend,
    pub config: ExecutionConfig,
}

impl<'a> EncryptRequest<'a> {
    pub fn new(
        key: &'a PublicKey,
        plaintexts: &'a [BigNum],
        backend: Backend,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            key,
            plaintexts,
            backend,
            config,
        }
    }

    /// Run on `device`, drawing randomizers from `rng`.
    pub fn run(
        &self,
        device: &Device,
        rng: &mut dyn RngCore,
    ) -> Result<BatchOutput, PaillierError> {
        debug!(
            "encrypt: backend={} batch={} grid={}x{}",
            self.backend,
            self.plaintexts.len(),
            self.config.blocks(),
            self.config.threads_per_block()
        );
        let output = engine_for(self.backend).encrypt_batch(
            self.key,
            self.plaintexts,
            &self.config,
            device,
            rng,
        )?;
        debug!(
            "encrypt: backend={} done in {:?}",
            self.backend,
            output.compute_time()
        );
        Ok(output)
    }
}

/// One batch decryption call.
#[derive(Debug, Clone, Copy)]
pub struct DecryptRequest<'a> {
    pub key: &'a PrivateKey,
    pub ciphertexts: &'a [BigNum],
    pub backend: Backend,
    pub config: ExecutionConfig,
}

impl<'a> DecryptRequest<'a> {
    pub fn new(
        key: &'a PrivateKey,
        ciphertexts: &'a [BigNum],
        backend: Backend,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            key,
            ciphertexts,
            backend,
            config,
        }
    }

    /// Run on `device`.
    pub fn run(&self, device: &Device) -> Result<BatchOutput, PaillierError> {
        debug!(
            "decrypt: backend={} batch={} grid={}x{}",
            self.backend,
            self.ciphertexts.len(),
            self.config.blocks(),
            self.config.threads_per_block()
        );
        let output = engine_for(self.backend).decrypt_batch(
            self.key,
            self.ciphertexts,
            &self.config,
            device,
        )?;
        debug!(
            "decrypt: backend={} done in {:?}",
            self.backend,
            output.compute_time()
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::generate_key_pair;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_request_roundtrip_on_dedicated_device() {
        let (pk, sk) = generate_key_pair(&BigNum::from_u64(709), &BigNum::from_u64(919)).unwrap();
        let device = Device::builder().worker_threads(3).build().unwrap();
        let plaintexts: Vec<BigNum> = (0..12u64).map(|i| BigNum::from_u64(i * 5000)).collect();
        let config = ExecutionConfig::new(4, 3).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(99);

        for backend in Backend::ALL {
            let encrypted = EncryptRequest::new(&pk, &plaintexts, backend, config)
                .run(&device, &mut rng)
                .unwrap();
            assert_eq!(encrypted.len(), plaintexts.len());
            let decrypted = DecryptRequest::new(&sk, encrypted.values(), backend, config)
                .run(&device)
                .unwrap();
            assert_eq!(decrypted.values(), plaintexts.as_slice(), "{backend}");
        }
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn test_empty_batch_sequential() {
        let (pk, _) = generate_key_pair(&BigNum::from_u64(709), &BigNum::from_u64(919)).unwrap();
        let config = ExecutionConfig::default();
        let out = EncryptRequest::new(&pk, &[], Backend::Naive, config)
            .run(&Device::global(), &mut ChaCha20Rng::seed_from_u64(1))
            .unwrap();
        assert!(out.is_empty());
    }
}
