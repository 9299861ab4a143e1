//! Simulated accelerator: a worker pool plus fixed-width device buffers.
//!
//! Parallel engines copy a batch into a `DeviceBuffer`, launch one lane per
//! element on the device's pool, then copy results back. Buffers are RAII
//! values, so they are released (and zeroized) on every exit path.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::trace;
use paillier_bignum::{BigNum, Limb};
use paillier_types::PaillierError;
use zeroize::Zeroize;

/// Handle to the execution device used by the parallel engines.
///
/// Cloning a device shares its pool and its buffer accounting.
#[derive(Clone)]
pub struct Device {
    /// Dedicated pool, or `None` to run on the rayon global pool.
    pool: Option<Arc<rayon::ThreadPool>>,
    /// Number of device buffers currently allocated.
    live_buffers: Arc<AtomicUsize>,
}

impl Device {
    /// A device running on the rayon global pool.
    pub fn global() -> Self {
        Self {
            pool: None,
            live_buffers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a builder for a device with a dedicated pool.
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Number of worker threads lanes are scheduled on.
    pub fn worker_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Number of device buffers currently allocated on this device.
    pub fn live_buffers(&self) -> usize {
        self.live_buffers.load(Ordering::SeqCst)
    }

    /// Run `op` on the device's pool and block until it returns.
    pub(crate) fn launch<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Allocate a zero-filled buffer of `len` elements, `width` limbs each.
    pub(crate) fn alloc(&self, len: usize, width: usize) -> DeviceBuffer {
        self.live_buffers.fetch_add(1, Ordering::SeqCst);
        trace!("device alloc: {len} x {width} limbs");
        DeviceBuffer {
            width,
            limbs: vec![0; len * width],
            live_buffers: Arc::clone(&self.live_buffers),
        }
    }

    /// Copy a host batch into a new device buffer.
    ///
    /// Every value must fit in `width` limbs; `OutOfRange` names the first
    /// that does not.
    pub(crate) fn upload(
        &self,
        values: &[BigNum],
        width: usize,
    ) -> Result<DeviceBuffer, PaillierError> {
        let mut buffer = self.alloc(values.len(), width);
        for (index, value) in values.iter().enumerate() {
            buffer.store(index, value)?;
        }
        trace!("device upload: {} elements", values.len());
        Ok(buffer)
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("dedicated_pool", &self.pool.is_some())
            .field("worker_threads", &self.worker_threads())
            .field("live_buffers", &self.live_buffers())
            .finish()
    }
}

/// Builder for `Device`.
#[derive(Debug, Clone, Default)]
pub struct DeviceBuilder {
    worker_threads: Option<usize>,
    thread_name: Option<String>,
}

impl DeviceBuilder {
    /// Number of worker threads; defaults to rayon's choice.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Prefix for worker thread names.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = Some(prefix.into());
        self
    }

    pub fn build(self) -> Result<Device, PaillierError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = self.worker_threads {
            if threads == 0 {
                return Err(PaillierError::InvalidConfig("worker_threads must be positive"));
            }
            builder = builder.num_threads(threads);
        }
        if let Some(prefix) = self.thread_name {
            builder = builder.thread_name(move |i| format!("{prefix}-{i}"));
        }
        let pool = builder
            .build()
            .map_err(|e| PaillierError::DeviceUnavailable(e.to_string()))?;

        Ok(Device {
            pool: Some(Arc::new(pool)),
            live_buffers: Arc::new(AtomicUsize::new(0)),
        })
    }
}

/// A flat array of fixed-width limb slots, one slot per lane.
pub(crate) struct DeviceBuffer {
    /// Limbs per element.
    width: usize,
    limbs: Vec<Limb>,
    live_buffers: Arc<AtomicUsize>,
}

impl DeviceBuffer {
    pub(crate) fn as_slice(&self) -> &[Limb] {
        &self.limbs
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Limb] {
        &mut self.limbs
    }

    /// Write `value` into slot `index`.
    fn store(&mut self, index: usize, value: &BigNum) -> Result<(), PaillierError> {
        let width = self.width;
        let slot = &mut self.limbs[index * width..(index + 1) * width];
        write_slot(slot, value).map_err(|_| PaillierError::OutOfRange { index })
    }

    /// Copy every slot back to the host.
    pub(crate) fn download(&self) -> Vec<BigNum> {
        trace!("device download: {} elements", self.limbs.len() / self.width);
        self.limbs
            .chunks(self.width)
            .map(|slot| BigNum::from_limbs(slot.to_vec()))
            .collect()
    }
}

impl fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("width", &self.width)
            .field("slots", &self.limbs.len().checked_div(self.width).unwrap_or(0))
            .finish_non_exhaustive()
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.limbs.zeroize();
        self.live_buffers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Write `value` into a zero-padded slot; fails if it needs more limbs.
pub(crate) fn write_slot(slot: &mut [Limb], value: &BigNum) -> Result<(), PaillierError> {
    let src = value.limbs();
    let used = src.len().min(slot.len());
    if src[used..].iter().any(|&l| l != 0) {
        return Err(PaillierError::InvalidArg);
    }
    slot.fill(0);
    slot[..used].copy_from_slice(&src[..used]);
    Ok(())
}
