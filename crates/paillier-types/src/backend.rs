//! Execution backend identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::PaillierError;

/// Execution backend for batch encryption and decryption.
///
/// The numeric ids match the `mode` values of the benchmark harness
/// (0: cpu-naive, 1: cpu-normal, 2: cuda-original, 3: cuda-plus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Sequential, square-and-multiply everywhere.
    Naive,
    /// Sequential, `g^m` shortcut and Montgomery exponentiation.
    Optimized,
    /// One lane per element, square-and-multiply everywhere.
    Parallel,
    /// One lane per element, `g^m` shortcut and Montgomery exponentiation.
    ParallelOptimized,
}

impl Backend {
    /// All backends, in mode id order.
    pub const ALL: [Backend; 4] = [
        Backend::Naive,
        Backend::Optimized,
        Backend::Parallel,
        Backend::ParallelOptimized,
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Naive => "naive",
            Backend::Optimized => "optimized",
            Backend::Parallel => "parallel",
            Backend::ParallelOptimized => "parallel-optimized",
        }
    }

    /// Numeric mode id.
    pub fn mode_id(self) -> u8 {
        match self {
            Backend::Naive => 0,
            Backend::Optimized => 1,
            Backend::Parallel => 2,
            Backend::ParallelOptimized => 3,
        }
    }

    /// True for the lane-per-element backends.
    pub fn is_parallel(self) -> bool {
        matches!(self, Backend::Parallel | Backend::ParallelOptimized)
    }

    /// True for the backends using the `g = n + 1` shortcut and Montgomery
    /// exponentiation.
    pub fn is_optimized(self) -> bool {
        matches!(self, Backend::Optimized | Backend::ParallelOptimized)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = PaillierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" | "cpu-naive" => Ok(Backend::Naive),
            "optimized" | "cpu-normal" => Ok(Backend::Optimized),
            "parallel" | "cuda-original" => Ok(Backend::Parallel),
            "parallel-optimized" | "cuda-plus" => Ok(Backend::ParallelOptimized),
            _ => Err(PaillierError::InvalidArg),
        }
    }
}

impl TryFrom<u8> for Backend {
    type Error = PaillierError;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        Backend::ALL
            .get(mode as usize)
            .copied()
            .ok_or(PaillierError::InvalidArg)
    }
}
