// SS Key Generation
// Derives the public value n = p²q and the private pair (pq, d) from two random primes

use log::debug;
use num_integer::Integer;
use num_traits::{One, Zero};

use super::numtheory::{generate_prime, lcm, mod_inverse, SsBigInt};
use super::random::RandomSource;
use crate::error::{SsError, SsResult};

/// Smallest accepted target size for n, keeps both prime widths and the block size usable
pub const MIN_KEY_BITS: u64 = 64;

/// SS Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsPublicKey {
    pub n: SsBigInt,     // Public modulus and exponent, p²q
    pub owner: String,   // Key holder, not authenticated
}

/// SS Private Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsPrivateKey {
    pub pq: SsBigInt,    // Private modulus
    pub d: SsBigInt,     // n^(-1) mod lambda
}

/// SS Key Pair, keeps the primes around for reporting
#[derive(Debug, Clone)]
pub struct SsKeyPair {
    pub public_key: SsPublicKey,
    pub private_key: SsPrivateKey,
    pub p: SsBigInt,
    pub q: SsBigInt,
}

impl SsPublicKey {
    /// Build a public key, rejecting n <= 1
    pub fn new(n: SsBigInt, owner: impl Into<String>) -> SsResult<Self> {
        if n <= SsBigInt::one() {
            return Err(SsError::InvalidPublicKey);
        }
        Ok(Self {
            n,
            owner: owner.into(),
        })
    }

    /// Get the bit length of n
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt a byte slice into ciphertext blocks
    pub fn encrypt(&self, plaintext: &[u8]) -> SsResult<Vec<SsBigInt>> {
        use super::encrypt::encrypt_stream;
        encrypt_stream(plaintext, self)
    }
}

impl SsPrivateKey {
    /// Build a private key, rejecting pq <= 1 and d == 0
    pub fn new(pq: SsBigInt, d: SsBigInt) -> SsResult<Self> {
        if pq <= SsBigInt::one() || d.is_zero() {
            return Err(SsError::InvalidPrivateKey);
        }
        Ok(Self { pq, d })
    }

    /// Get the bit length of pq
    pub fn bit_length(&self) -> u64 {
        self.pq.bits()
    }

    /// Decrypt ciphertext blocks back into bytes
    pub fn decrypt(&self, blocks: &[SsBigInt]) -> SsResult<Vec<u8>> {
        use super::decrypt::decrypt_stream;
        decrypt_stream(blocks.iter(), self)
    }
}

impl SsKeyPair {
    /// Get the bit length of the public value
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }
}

/// Generate p, q and n = p²q
///
/// p gets a random width in `[nbits/5 + 1, 2 * (nbits/5 + 1))`, q gets the
/// remaining `nbits - 2 * bits(p)`. q is redrawn until it differs from p and
/// neither of p-1, q-1 divides the other.
pub fn make_public_key<R>(
    nbits: u64,
    iterations: u32,
    rng: &mut R,
) -> SsResult<(SsBigInt, SsBigInt, SsBigInt)>
where
    R: RandomSource + ?Sized,
{
    if nbits < MIN_KEY_BITS {
        return Err(SsError::InvalidKeySize {
            min: MIN_KEY_BITS,
            actual: nbits,
        });
    }
    if iterations == 0 {
        return Err(SsError::InvalidIterations);
    }

    let base = nbits / 5 + 1;
    let p_bits = base + rng.uniform_below_u64(base);
    let q_bits = nbits - 2 * p_bits;
    debug!("splitting {} bits: p = {} bits, q = {} bits", nbits, p_bits, q_bits);

    let p = generate_prime(p_bits, iterations, rng)?;
    let p_minus_1 = &p - 1u8;

    let q = loop {
        let q = generate_prime(q_bits, iterations, rng)?;
        let q_minus_1 = &q - 1u8;

        if q != p
            && !q_minus_1.is_multiple_of(&p_minus_1)
            && !p_minus_1.is_multiple_of(&q_minus_1)
        {
            break q;
        }
        debug!("rejected q candidate, resampling");
    };

    let n = &p * &p * &q;
    Ok((p, q, n))
}

/// Derive (pq, d) from the primes
///
/// `d` inverts the public value n = p²q modulo
/// `lambda = (p-1)(q-1) / gcd(p-1, q-1)`. Fails with
/// [`SsError::NonInvertibleModulus`] when `gcd(n, lambda) != 1`, which
/// happens when p divides q-1 or q divides p-1.
pub fn make_private_key(p: &SsBigInt, q: &SsBigInt) -> SsResult<SsPrivateKey> {
    let two = SsBigInt::from(2u8);
    if p < &two || q < &two {
        return Err(SsError::InvalidPrivateKey);
    }
    if p == q {
        return Err(SsError::IdenticalPrimes);
    }

    let pq = p * q;
    let lambda = lcm(&(p - 1u8), &(q - 1u8));
    let n = p * p * q;

    let d = mod_inverse(&n, &lambda).map_err(|e| match e {
        SsError::NoInverse => SsError::NonInvertibleModulus,
        other => other,
    })?;

    debug!("derived private key: pq = {} bits, d = {} bits", pq.bits(), d.bits());
    Ok(SsPrivateKey { pq, d })
}

/// Generate an SS key pair
/// nbits: target size of n in bits (at least MIN_KEY_BITS)
/// iterations: Miller-Rabin rounds per prime candidate
pub fn generate_keypair<R>(
    nbits: u64,
    iterations: u32,
    owner: impl Into<String>,
    rng: &mut R,
) -> SsResult<SsKeyPair>
where
    R: RandomSource + ?Sized,
{
    let (p, q, n) = make_public_key(nbits, iterations, rng)?;
    let private_key = make_private_key(&p, &q)?;
    let public_key = SsPublicKey::new(n, owner)?;

    Ok(SsKeyPair {
        public_key,
        private_key,
        p,
        q,
    })
}
