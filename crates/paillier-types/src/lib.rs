//! Common types, error codes, backend identifiers, and execution parameters
//! for the Paillier batch engine.

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;

pub use backend::*;
pub use config::*;
pub use error::*;
