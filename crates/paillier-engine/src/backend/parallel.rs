//! Data-parallel engines: one lane per element on a `Device`.
//!
//! A launch uploads the batch into a fixed-width device buffer, runs the
//! per-element program on every lane, and downloads the result buffer.
//! The lane grid of the `ExecutionConfig` must cover the batch exactly.

use std::time::Instant;

use log::{debug, trace};
use paillier_bignum::BigNum;
use paillier_types::{Backend, ExecutionConfig, PaillierError};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_core::RngCore;
use rayon::prelude::*;
use zeroize::Zeroizing;

use super::BatchEngine;
use crate::device::{write_slot, Device};
use crate::kernel::{self, Arithmetic};
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::request::BatchOutput;

/// Seed size of a lane's randomness stream.
const LANE_SEED_LEN: usize = 32;

/// Schedules one lane per element on the device's worker pool.
#[derive(Debug)]
pub struct ParallelEngine {
    backend: Backend,
}

impl ParallelEngine {
    pub(crate) const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    fn arithmetic(&self) -> Arithmetic {
        Arithmetic::for_backend(self.backend)
    }
}

/// Reject a grid that does not have exactly one lane per element.
fn check_grid(config: &ExecutionConfig, batch: usize) -> Result<(), PaillierError> {
    let lanes = config.lanes();
    if lanes != batch {
        debug!("grid of {lanes} lanes does not match batch of {batch}");
        return Err(PaillierError::ConfigMismatch { lanes, batch });
    }
    Ok(())
}

/// Label a failing lane with its block and thread coordinates.
fn lane_failed(config: &ExecutionConfig, lane: usize, err: &PaillierError) {
    let tpb = config.threads_per_block();
    debug!("lane {lane} (block {}, thread {}) failed: {err}", lane / tpb, lane % tpb);
}

/// Keep the error of the lowest failing lane so results do not depend on
/// scheduling.
fn first_failure(results: Vec<Result<(), PaillierError>>) -> Result<(), PaillierError> {
    results.into_iter().collect()
}

impl BatchEngine for ParallelEngine {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn encrypt_batch(
        &self,
        key: &PublicKey,
        plaintexts: &[BigNum],
        config: &ExecutionConfig,
        device: &Device,
        rng: &mut dyn RngCore,
    ) -> Result<BatchOutput, PaillierError> {
        kernel::check_plaintexts(key, plaintexts)?;
        check_grid(config, plaintexts.len())?;

        let arith = self.arithmetic();
        let budget = config.resample_budget();
        let width = key.n_sq().num_limbs();

        // Lane streams are seeded in index order before launch, so a seeded
        // caller RNG gives the same ciphertexts on any pool size.
        let mut seeds = Zeroizing::new(vec![[0u8; LANE_SEED_LEN]; plaintexts.len()]);
        for seed in seeds.iter_mut() {
            rng.try_fill_bytes(seed)
                .map_err(|_| PaillierError::BnRandGenFail)?;
        }

        let input = device.upload(plaintexts, width)?;
        let mut output = device.alloc(plaintexts.len(), width);
        trace!(
            "{}: launching {} blocks x {} threads",
            self.backend,
            config.blocks(),
            config.threads_per_block()
        );

        let start = Instant::now();
        let results: Vec<Result<(), PaillierError>> = device.launch(|| {
            output
                .as_mut_slice()
                .par_chunks_mut(width)
                .zip(input.as_slice().par_chunks(width))
                .zip(seeds.as_slice().par_iter())
                .enumerate()
                .map(|(lane, ((out_slot, in_slot), seed))| {
                    let mut lane_rng = ChaCha20Rng::from_seed(*seed);
                    let m = BigNum::from_limbs(in_slot.to_vec());
                    kernel::encrypt_element(key, &m, arith, budget, &mut lane_rng)
                        .and_then(|c| write_slot(out_slot, &c))
                        .map_err(|e| {
                            lane_failed(config, lane, &e);
                            e
                        })
                })
                .collect()
        });
        let compute_time = start.elapsed();
        first_failure(results)?;

        Ok(BatchOutput::new(output.download(), compute_time))
    }

    fn decrypt_batch(
        &self,
        key: &PrivateKey,
        ciphertexts: &[BigNum],
        config: &ExecutionConfig,
        device: &Device,
    ) -> Result<BatchOutput, PaillierError> {
        kernel::check_ciphertexts(key.public_key(), ciphertexts)?;
        check_grid(config, ciphertexts.len())?;

        let arith = self.arithmetic();
        let width = key.public_key().n_sq().num_limbs();

        let input = device.upload(ciphertexts, width)?;
        let mut output = device.alloc(ciphertexts.len(), width);
        trace!(
            "{}: launching {} blocks x {} threads",
            self.backend,
            config.blocks(),
            config.threads_per_block()
        );

        let start = Instant::now();
        let results: Vec<Result<(), PaillierError>> = device.launch(|| {
            output
                .as_mut_slice()
                .par_chunks_mut(width)
                .zip(input.as_slice().par_chunks(width))
                .enumerate()
                .map(|(lane, (out_slot, in_slot))| {
                    let c = BigNum::from_limbs(in_slot.to_vec());
                    kernel::decrypt_element(key, &c, lane, arith)
                        .and_then(|m| write_slot(out_slot, &m))
                        .map_err(|e| {
                            lane_failed(config, lane, &e);
                            e
                        })
                })
                .collect()
        });
        let compute_time = start.elapsed();
        first_failure(results)?;

        Ok(BatchOutput::new(output.download(), compute_time))
    }
}
