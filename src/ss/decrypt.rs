// SS Decryption
// Recovers each block as m = c^d mod pq and strips the sentinel byte

use std::borrow::Borrow;
use std::io::{BufRead, Write};

use log::{debug, trace};

use super::codec::CiphertextLines;
use super::keygen::SsPrivateKey;
use super::numtheory::{mod_pow, SsBigInt};
use crate::error::SsResult;

/// Decrypt one ciphertext block into its data bytes
///
/// The first byte of the recovered block is assumed to be the sentinel and
/// is dropped unchecked. There is no integrity protection: a corrupted or
/// foreign block decrypts to garbage without an error.
pub fn decrypt_block(c: &SsBigInt, private_key: &SsPrivateKey) -> SsResult<Vec<u8>> {
    let m = mod_pow(c, &private_key.d, &private_key.pq)?;
    let bytes = m.to_bytes_be();
    trace!("recovered block {}", hex::encode(&bytes));

    Ok(bytes.get(1..).map(<[u8]>::to_vec).unwrap_or_default())
}

/// Decrypt a sequence of ciphertext blocks and concatenate the data
pub fn decrypt_stream<I, B>(blocks: I, private_key: &SsPrivateKey) -> SsResult<Vec<u8>>
where
    I: IntoIterator<Item = B>,
    B: Borrow<SsBigInt>,
{
    let mut plaintext = Vec::new();
    for c in blocks {
        plaintext.extend_from_slice(&decrypt_block(c.borrow(), private_key)?);
    }
    Ok(plaintext)
}

/// Decrypt hex ciphertext lines from `input` into `output`
/// Returns the number of blocks read
pub fn decrypt_file<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    private_key: &SsPrivateKey,
) -> SsResult<usize> {
    let mut count = 0;

    for c in CiphertextLines::new(input) {
        output.write_all(&decrypt_block(&c?, private_key)?)?;
        count += 1;
    }
    output.flush()?;

    debug!("decrypted {} ciphertext blocks", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SsError;
    use crate::ss::encrypt::encrypt_stream;
    use crate::ss::keygen::generate_keypair;
    use crate::ss::numtheory::from_u64;
    use crate::ss::random::SeededRandom;
    use crate::ss::test_support::{hello_ciphertext, test_private_key, test_public_key};
    use proptest::prelude::*;

    #[test]
    fn test_decrypt_reference_vector() {
        let plaintext = decrypt_stream(hello_ciphertext(), &test_private_key()).unwrap();
        assert_eq!(plaintext, b"Hello, world!\n");
    }

    #[test]
    fn test_decrypt_file() {
        let input = "1d800b9a6f3e18995ce6010d8213f735c\n\
                     1cd8049d297a5654dbcc826b4b34bc82a\n\
                     \n\
                     1d7ef5fcb7d7b883dcd644346c4b2603c\n";
        let mut out = Vec::new();

        let count = decrypt_file(input.as_bytes(), &mut out, &test_private_key()).unwrap();
        assert_eq!(count, 3);
        assert_eq!(out, b"Hello, world!\n");
    }

    #[test]
    fn test_decrypt_empty_input() {
        let mut out = Vec::new();
        let count = decrypt_file(&b""[..], &mut out, &test_private_key()).unwrap();
        assert_eq!(count, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_decrypt_malformed_line() {
        let input = "1d800b9a6f3e18995ce6010d8213f735c\nnot-hex\n";
        let mut out = Vec::new();
        let result = decrypt_file(input.as_bytes(), &mut out, &test_private_key());
        assert!(matches!(result, Err(SsError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_zero_block_yields_nothing() {
        let block = decrypt_block(&from_u64(0), &test_private_key()).unwrap();
        assert!(block.is_empty());
    }

    #[test]
    fn test_corrupted_block_decrypts_to_garbage() {
        let key = test_private_key();
        let mut blocks = hello_ciphertext();
        blocks[0] += 1u8;

        let plaintext = decrypt_stream(&blocks, &key).unwrap();
        assert_ne!(plaintext, b"Hello, world!\n");
    }

    #[test]
    fn test_leading_zero_bytes_survive() {
        let public_key = test_public_key();
        let message = [0u8, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0];

        let blocks = encrypt_stream(&message[..], &public_key).unwrap();
        let plaintext = decrypt_stream(&blocks, &test_private_key()).unwrap();
        assert_eq!(plaintext, message);
    }

    #[test]
    fn test_roundtrip_various_sizes() {
        let mut rng = SeededRandom::from_seed(17);
        let keypair = generate_keypair(512, 20, "dave", &mut rng).unwrap();

        let test_cases: Vec<Vec<u8>> = vec![
            b"A".to_vec(),
            b"Hello, World!".to_vec(),
            vec![0u8; 100],
            vec![255u8; 100],
            (0..=255u8).collect(),
        ];

        for message in test_cases {
            let blocks = keypair.public_key.encrypt(&message).unwrap();
            let decrypted = keypair.private_key.decrypt(&blocks).unwrap();
            assert_eq!(message, decrypted);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_roundtrip(message in proptest::collection::vec(any::<u8>(), 0..300)) {
            let mut rng = SeededRandom::from_seed(256);
            let keypair = generate_keypair(256, 20, "prop", &mut rng).unwrap();

            let blocks = encrypt_stream(message.as_slice(), &keypair.public_key).unwrap();
            let decrypted = decrypt_stream(&blocks, &keypair.private_key).unwrap();
            prop_assert_eq!(decrypted, message);
        }
    }
}
