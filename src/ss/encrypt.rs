// SS Encryption
// Splits a byte stream into sentinel-prefixed blocks and encrypts each as c = m^n mod n

use std::io::{Read, Write};

use log::{debug, trace};

use super::codec::write_ciphertext_line;
use super::keygen::SsPublicKey;
use super::numtheory::{mod_pow, SsBigInt};
use crate::error::{SsError, SsResult};

/// Leading byte of every plaintext block, keeps leading zero bytes alive
pub const SENTINEL: u8 = 0xFF;

/// Block size in bytes for a modulus, sentinel included
///
/// `k = ((bits(n) - 1) / 2 - 1) / 8`, so a full block stays below the
/// square root of n and therefore below pq. At least two bytes are needed
/// to carry any data.
pub fn block_size(n: &SsBigInt) -> SsResult<usize> {
    let bits = n.bits();
    let k = (bits.saturating_sub(1) / 2).saturating_sub(1) / 8;

    if k < 2 {
        return Err(SsError::ModulusTooSmall { bits });
    }
    Ok(k as usize)
}

/// Encrypt one block integer: c = m^n mod n
pub fn encrypt_block(m: &SsBigInt, public_key: &SsPublicKey) -> SsResult<SsBigInt> {
    let n = &public_key.n;
    if m >= n {
        return Err(SsError::PlaintextTooLarge);
    }
    mod_pow(m, n, n)
}

/// Iterator over the ciphertext blocks of a byte stream
///
/// Each block holds the sentinel followed by up to `k - 1` input bytes; the
/// last block may be shorter. No block is produced for empty input.
pub struct EncryptBlocks<'k, R> {
    input: R,
    public_key: &'k SsPublicKey,
    block_size: usize,
    done: bool,
}

impl<'k, R: Read> EncryptBlocks<'k, R> {
    pub fn new(input: R, public_key: &'k SsPublicKey) -> SsResult<Self> {
        let block_size = block_size(&public_key.n)?;
        debug!("encrypting with {}-byte blocks", block_size);

        Ok(Self {
            input,
            public_key,
            block_size,
            done: false,
        })
    }

    fn next_block(&mut self) -> SsResult<Option<SsBigInt>> {
        let mut block = Vec::with_capacity(self.block_size);
        block.push(SENTINEL);

        let limit = (self.block_size - 1) as u64;
        self.input.by_ref().take(limit).read_to_end(&mut block)?;

        if block.len() == 1 {
            return Ok(None);
        }
        trace!("plaintext block {}", hex::encode(&block));

        let m = SsBigInt::from_bytes_be(&block);
        encrypt_block(&m, self.public_key).map(Some)
    }
}

impl<R: Read> Iterator for EncryptBlocks<'_, R> {
    type Item = SsResult<SsBigInt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_block() {
            Ok(Some(c)) => Some(Ok(c)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Encrypt a whole stream into ciphertext blocks
pub fn encrypt_stream<R: Read>(input: R, public_key: &SsPublicKey) -> SsResult<Vec<SsBigInt>> {
    EncryptBlocks::new(input, public_key)?.collect()
}

/// Encrypt `input` into `output`, one hex line per block
/// Returns the number of blocks written
pub fn encrypt_file<R: Read, W: Write>(
    input: R,
    mut output: W,
    public_key: &SsPublicKey,
) -> SsResult<usize> {
    let mut count = 0;

    for c in EncryptBlocks::new(input, public_key)? {
        write_ciphertext_line(&mut output, &c?)?;
        count += 1;
    }
    output.flush()?;

    debug!("wrote {} ciphertext blocks", count);
    Ok(count)
}
