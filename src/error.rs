// SS Errors
// Error type shared by the number theory engine, key generation, codec and block cipher

use std::io;

use thiserror::Error;

/// Errors that can occur during SS operations
#[derive(Debug, Error)]
pub enum SsError {
    #[error("modulus must be greater than one")]
    InvalidModulus,

    #[error("no modular inverse exists")]
    NoInverse,

    #[error("invalid prime bit length {0}: must be at least 2")]
    InvalidBitLength(u64),

    #[error("Miller-Rabin iterations must be at least 1")]
    InvalidIterations,

    #[error("invalid key size: must be at least {min} bits, got {actual}")]
    InvalidKeySize { min: u64, actual: u64 },

    #[error("primes p and q must be distinct")]
    IdenticalPrimes,

    #[error("public value n is not invertible modulo lambda")]
    NonInvertibleModulus,

    #[error("plaintext block is not smaller than the modulus")]
    PlaintextTooLarge,

    #[error("modulus of {bits} bits is too small for block encryption")]
    ModulusTooSmall { bits: u64 },

    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line} exceeds {limit} bytes")]
    LineTooLong { line: usize, limit: usize },

    #[error("missing {field} on line {line}")]
    MissingField { line: usize, field: &'static str },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for SS operations
pub type SsResult<T> = Result<T, SsError>;
