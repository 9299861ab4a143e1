//! Batch engines, one per `Backend`.
//!
//! Engines share the per-element programs in `kernel` and differ in
//! arithmetic strategy and scheduling:
//!
//! | Backend | g^m | powers | scheduling |
//! |---|---|---|---|
//! | naive | square-and-multiply | square-and-multiply | sequential |
//! | optimized | `1 + m·n` | Montgomery | sequential |
//! | parallel | square-and-multiply | square-and-multiply | one lane per element |
//! | parallel-optimized | `1 + m·n` | Montgomery | one lane per element |

mod parallel;
mod sequential;

use paillier_bignum::BigNum;
use paillier_types::{Backend, ExecutionConfig, PaillierError};
use rand_core::RngCore;

use crate::device::Device;
use crate::private_key::PrivateKey;
use crate::public_key::PublicKey;
use crate::request::BatchOutput;

pub use parallel::ParallelEngine;
pub use sequential::SequentialEngine;

/// Batch encryption and decryption capability shared by every backend.
///
/// Implementations validate the whole batch before processing any element
/// and never return partial output.
pub trait BatchEngine: Send + Sync {
    /// The backend this engine implements.
    fn backend(&self) -> Backend;

    /// Encrypt `plaintexts`, drawing randomizers from `rng`.
    fn encrypt_batch(
        &self,
        key: &PublicKey,
        plaintexts: &[BigNum],
        config: &ExecutionConfig,
        device: &Device,
        rng: &mut dyn RngCore,
    ) -> Result<BatchOutput, PaillierError>;

    /// Decrypt `ciphertexts`.
    fn decrypt_batch(
        &self,
        key: &PrivateKey,
        ciphertexts: &[BigNum],
        config: &ExecutionConfig,
        device: &Device,
    ) -> Result<BatchOutput, PaillierError>;
}

static NAIVE: SequentialEngine = SequentialEngine::new(Backend::Naive);
static OPTIMIZED: SequentialEngine = SequentialEngine::new(Backend::Optimized);
static PARALLEL: ParallelEngine = ParallelEngine::new(Backend::Parallel);
static PARALLEL_OPTIMIZED: ParallelEngine = ParallelEngine::new(Backend::ParallelOptimized);

/// Resolve the engine implementing `backend`.
pub fn engine_for(backend: Backend) -> &'static dyn BatchEngine {
    match backend {
        Backend::Naive => &NAIVE,
        Backend::Optimized => &OPTIMIZED,
        Backend::Parallel => &PARALLEL,
        Backend::ParallelOptimized => &PARALLEL_OPTIMIZED,
    }
}
