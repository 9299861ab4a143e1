//! Single-threaded engines processing elements in index order.

use std::time::Instant;

use log::trace;
use paillier_bignum::BigNum;
use paillier_types::{Backend, ExecutionConfig, PaillierError};
use rand_core::RngCore;

use super::BatchEngine;
use crate::device::Device;
use crate::kernel::{self, Arithmetic};
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::request::BatchOutput;

/// Runs on the calling thread; the lane grid and device are ignored.
#[derive(Debug)]
pub struct SequentialEngine {
    backend: Backend,
}

impl SequentialEngine {
    pub(crate) const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn arithmetic(&self) -> Arithmetic {
        Arithmetic::for_backend(self.backend)
    }
}

impl BatchEngine for SequentialEngine {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn encrypt_batch(
        &self,
        key: &PublicKey,
        plaintexts: &[BigNum],
        config: &ExecutionConfig,
        _device: &Device,
        rng: &mut dyn RngCore,
    ) -> Result<BatchOutput, PaillierError> {
        kernel::check_plaintexts(key, plaintexts)?;
        let arith = self.arithmetic();
        let budget = config.resample_budget();
        let mut values = Vec::with_capacity(plaintexts.len());
        trace!("{}: encrypting {} elements in order", self.backend, plaintexts.len());

        let start = Instant::now();
        for m in plaintexts {
            values.push(kernel::encrypt_element(key, m, arith, budget, rng)?);
        }
        let compute_time = start.elapsed();

        Ok(BatchOutput::new(values, compute_time))
    }

    fn decrypt_batch(
        &self,
        key: &PrivateKey,
        ciphertexts: &[BigNum],
        _config: &ExecutionConfig,
        _device: &Device,
    ) -> Result<BatchOutput, PaillierError> {
        kernel::check_ciphertexts(key.public_key(), ciphertexts)?;
        let arith = self.arithmetic();
        let mut values = Vec::with_capacity(ciphertexts.len());
        trace!("{}: decrypting {} elements in order", self.backend, ciphertexts.len());

        let start = Instant::now();
        for (index, c) in ciphertexts.iter().enumerate() {
            values.push(kernel::decrypt_element(key, c, index, arith)?);
        }
        let compute_time = start.elapsed();

        Ok(BatchOutput::new(values, compute_time))
    }
}
