// SS Module - Main module file
// Exports all Schmidt-Samoa functionality

pub mod codec;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod numtheory;
pub mod random;

pub use codec::{
    read_private_key, read_public_key, write_ciphertext_line, write_private_key,
    write_public_key, CiphertextLines,
};
pub use decrypt::{decrypt_block, decrypt_file, decrypt_stream};
pub use encrypt::{block_size, encrypt_block, encrypt_file, encrypt_stream, EncryptBlocks};
pub use keygen::{
    generate_keypair, make_private_key, make_public_key, SsKeyPair, SsPrivateKey, SsPublicKey,
};
pub use numtheory::{gcd, generate_prime, is_probable_prime, lcm, mod_inverse, mod_pow, SsBigInt};
pub use random::{RandomSource, SeededRandom};
