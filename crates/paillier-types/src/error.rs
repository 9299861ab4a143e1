/// Errors raised by key derivation, batch encryption/decryption and the
/// underlying big number arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaillierError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("invalid execution config: {0}")]
    InvalidConfig(&'static str),

    // BigNum errors
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,
    #[error("big number: random generation failed")]
    BnRandGenFail,

    // Key errors
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    // Batch errors
    #[error("value at index {index} is outside its modulus")]
    OutOfRange { index: usize },
    #[error("ciphertext at index {index} is malformed")]
    InvalidCiphertext { index: usize },
    #[error("lane count {lanes} does not match batch length {batch}")]
    ConfigMismatch { lanes: usize, batch: usize },
    #[error("no randomizer coprime to n after {attempts} attempts")]
    RandomnessExhausted { attempts: usize },

    // Device errors
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
}
