#![forbid(unsafe_code)]
#![doc = "Batched Paillier encryption with interchangeable sequential and data-parallel backends."]

pub mod backend;
pub mod device;
pub mod homomorphic;
mod kernel;
pub mod keygen;
pub mod private_key;
pub mod public_key;
pub mod request;

pub use backend::{engine_for, BatchEngine};
pub use device::{Device, DeviceBuilder};
pub use homomorphic::Homomorphic;
pub use keygen::{generate_key_pair, KeyPairGenerator};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use request::{BatchOutput, DecryptRequest, EncryptRequest};

pub use paillier_bignum::BigNum;
pub use paillier_types::{Backend, ExecutionConfig, ExecutionConfigBuilder, PaillierError};
