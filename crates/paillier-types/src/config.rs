//! Per-call execution parameters with builder pattern.

use crate::error::PaillierError;

/// Default threads per block.
pub const DEFAULT_THREADS_PER_BLOCK: usize = 128;
/// Default blocks per grid.
pub const DEFAULT_BLOCKS: usize = 128;
/// Default number of attempts at drawing a randomizer coprime to n.
pub const DEFAULT_RESAMPLE_BUDGET: usize = 1000;

/// Execution parameters for one batch call.
///
/// The lane grid is `threads_per_block × blocks`; parallel backends require
/// it to match the batch length exactly. Sequential backends ignore the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    threads_per_block: usize,
    blocks: usize,
    resample_budget: usize,
}

impl ExecutionConfig {
    /// Create a config with the given grid and the default resampling budget.
    pub fn new(threads_per_block: usize, blocks: usize) -> Result<Self, PaillierError> {
        Self::builder()
            .threads_per_block(threads_per_block)
            .blocks(blocks)
            .build()
    }

    /// Create a builder for execution configuration.
    pub fn builder() -> ExecutionConfigBuilder {
        ExecutionConfigBuilder::default()
    }

    /// A grid of `lanes` threads in a single block.
    pub fn for_batch(lanes: usize) -> Result<Self, PaillierError> {
        Self::new(lanes, 1)
    }

    pub fn threads_per_block(&self) -> usize {
        self.threads_per_block
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Total lane count, `threads_per_block × blocks`.
    pub fn lanes(&self) -> usize {
        self.threads_per_block * self.blocks
    }

    /// Maximum number of randomizer draws per element.
    pub fn resample_budget(&self) -> usize {
        self.resample_budget
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            threads_per_block: DEFAULT_THREADS_PER_BLOCK,
            blocks: DEFAULT_BLOCKS,
            resample_budget: DEFAULT_RESAMPLE_BUDGET,
        }
    }
}

/// Builder for `ExecutionConfig`.
#[derive(Debug, Clone)]
pub struct ExecutionConfigBuilder {
    threads_per_block: usize,
    blocks: usize,
    resample_budget: usize,
}

impl Default for ExecutionConfigBuilder {
    fn default() -> Self {
        let config = ExecutionConfig::default();
        Self {
            threads_per_block: config.threads_per_block,
            blocks: config.blocks,
            resample_budget: config.resample_budget,
        }
    }
}

impl ExecutionConfigBuilder {
    pub fn threads_per_block(mut self, threads: usize) -> Self {
        self.threads_per_block = threads;
        self
    }

    pub fn blocks(mut self, blocks: usize) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn resample_budget(mut self, attempts: usize) -> Self {
        self.resample_budget = attempts;
        self
    }

    /// Validate and build. All three values must be positive and the lane
    /// count must not overflow.
    pub fn build(self) -> Result<ExecutionConfig, PaillierError> {
        if self.threads_per_block == 0 {
            return Err(PaillierError::InvalidConfig("threads_per_block must be positive"));
        }
        if self.blocks == 0 {
            return Err(PaillierError::InvalidConfig("blocks must be positive"));
        }
        if self.resample_budget == 0 {
            return Err(PaillierError::InvalidConfig("resample_budget must be positive"));
        }
        if self.threads_per_block.checked_mul(self.blocks).is_none() {
            return Err(PaillierError::InvalidConfig("lane count overflows"));
        }
        Ok(ExecutionConfig {
            threads_per_block: self.threads_per_block,
            blocks: self.blocks,
            resample_budget: self.resample_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let config = ExecutionConfig::default();
        assert_eq!(config.lanes(), 128 * 128);
        assert_eq!(config.resample_budget(), DEFAULT_RESAMPLE_BUDGET);
    }

    #[test]
    fn test_new_computes_lanes() {
        let config = ExecutionConfig::new(32, 4).unwrap();
        assert_eq!(config.threads_per_block(), 32);
        assert_eq!(config.blocks(), 4);
        assert_eq!(config.lanes(), 128);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            ExecutionConfig::new(0, 4),
            Err(PaillierError::InvalidConfig(_))
        ));
        assert!(matches!(
            ExecutionConfig::new(4, 0),
            Err(PaillierError::InvalidConfig(_))
        ));
        assert!(ExecutionConfig::builder().resample_budget(0).build().is_err());
    }

    #[test]
    fn test_overflowing_grid_rejected() {
        assert!(ExecutionConfig::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_builder_overrides_budget() {
        let config = ExecutionConfig::builder()
            .threads_per_block(8)
            .blocks(2)
            .resample_budget(3)
            .build()
            .unwrap();
        assert_eq!(config.resample_budget(), 3);
        assert_eq!(ExecutionConfig::for_batch(5).unwrap().lanes(), 5);
    }
}
