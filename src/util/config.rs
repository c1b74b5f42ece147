// Configuration for key generation and file encryption/decryption
// Defaults follow the classic keygen/encrypt/decrypt tools

use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_PUBLIC_KEY: &str = "ss.pub";
pub const DEFAULT_PRIVATE_KEY: &str = "ss.priv";
pub const DEFAULT_BITS: u64 = 256;
pub const DEFAULT_ITERATIONS: u32 = 50;

/// Configuration for key generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeygenConfig {
    pub bits: u64,
    pub iterations: u32,
    pub public_key: PathBuf,
    pub private_key: PathBuf,
    pub seed: Option<u64>,
    pub owner: Option<String>,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_BITS,
            iterations: DEFAULT_ITERATIONS,
            public_key: PathBuf::from(DEFAULT_PUBLIC_KEY),
            private_key: PathBuf::from(DEFAULT_PRIVATE_KEY),
            seed: None,
            owner: None,
        }
    }
}

impl KeygenConfig {
    pub fn with_bits(mut self, bits: u64) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_public_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.public_key = path.into();
        self
    }

    pub fn with_private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key = path.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Explicit seed, or the current Unix time in seconds
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default()
        })
    }

    /// Explicit owner, or `$USER`, or "unknown"
    pub fn resolve_owner(&self) -> String {
        self.owner
            .clone()
            .or_else(|| env::var("USER").ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Configuration for file encryption/decryption
/// `None` input/output means stdin/stdout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub key: PathBuf,
}

impl CipherConfig {
    /// Encrypt with the public key in ss.pub
    pub fn for_encrypt() -> Self {
        Self {
            input: None,
            output: None,
            key: PathBuf::from(DEFAULT_PUBLIC_KEY),
        }
    }

    /// Decrypt with the private key in ss.priv
    pub fn for_decrypt() -> Self {
        Self {
            input: None,
            output: None,
            key: PathBuf::from(DEFAULT_PRIVATE_KEY),
        }
    }

    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn with_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.key = path.into();
        self
    }
}
