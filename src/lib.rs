//! Schmidt-Samoa public key cryptosystem.
//!
//! Key generation derives `n = p²q` for the public key and `(pq, d)` for the
//! private key. Files are encrypted block by block as `c = m^n mod n`, one hex
//! line per block, and decrypted as `m = c^d mod pq`.
//!
//! The scheme gives confidentiality only. Ciphertext carries no integrity
//! check, so a damaged line silently decrypts to wrong bytes.
//!
//! ```rust,no_run
//! use ss_crypt::ss::{generate_keypair, SeededRandom};
//!
//! let mut rng = SeededRandom::from_seed(42);
//! let keypair = generate_keypair(256, 50, "alice", &mut rng).expect("key generation failed");
//!
//! let blocks = keypair.public_key.encrypt(b"Hello, world!\n").expect("encryption failed");
//! let plaintext = keypair.private_key.decrypt(&blocks).expect("decryption failed");
//! assert_eq!(plaintext, b"Hello, world!\n");
//! ```

pub mod error;
pub mod ss;
pub mod util;

pub use error::{SsError, SsResult};
