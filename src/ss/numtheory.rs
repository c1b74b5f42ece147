// SS Number Theory
// Arbitrary-precision helpers on top of num-bigint: gcd, inverses, exponentiation, primes

use log::debug;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use super::random::RandomSource;
use crate::error::{SsError, SsResult};

/// SS Big Integer type alias
pub type SsBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> SsBigInt {
    SsBigInt::from(n)
}

/// Parse a big integer from hexadecimal digits
pub fn from_hex(digits: &str) -> Option<SsBigInt> {
    SsBigInt::parse_bytes(digits.as_bytes(), 16)
}

/// Greatest common divisor (iterative Euclid)
pub fn gcd(a: &SsBigInt, b: &SsBigInt) -> SsBigInt {
    let mut a = a.clone();
    let mut b = b.clone();

    while !b.is_zero() {
        let r = &a % &b;
        a = std::mem::replace(&mut b, r);
    }

    a
}

/// Least common multiple
pub fn lcm(a: &SsBigInt, b: &SsBigInt) -> SsBigInt {
    if a.is_zero() || b.is_zero() {
        return SsBigInt::zero();
    }
    (a * b) / gcd(a, b)
}

/// Compute modular inverse: a^(-1) mod n
///
/// Runs the extended Euclidean algorithm and returns the representative in
/// `[0, n)`. Fails with [`SsError::NoInverse`] when `gcd(a, n) != 1`.
pub fn mod_inverse(a: &SsBigInt, n: &SsBigInt) -> SsResult<SsBigInt> {
    if n <= &SsBigInt::one() {
        return Err(SsError::InvalidModulus);
    }

    let modulus = BigInt::from_biguint(Sign::Plus, n.clone());
    let mut r = modulus.clone();
    let mut r_next = BigInt::from_biguint(Sign::Plus, a.clone());
    let mut t = BigInt::zero();
    let mut t_next = BigInt::one();

    while !r_next.is_zero() {
        let q = &r / &r_next;

        let r_new = &r - &q * &r_next;
        r = std::mem::replace(&mut r_next, r_new);

        let t_new = &t - &q * &t_next;
        t = std::mem::replace(&mut t_next, t_new);
    }

    if !r.is_one() {
        return Err(SsError::NoInverse);
    }

    // Bezout coefficient may be negative
    t.mod_floor(&modulus)
        .to_biguint()
        .ok_or(SsError::NoInverse)
}

/// Modular exponentiation: base^exp mod modulus
///
/// Fails with [`SsError::InvalidModulus`] unless `modulus > 1`.
pub fn mod_pow(base: &SsBigInt, exp: &SsBigInt, modulus: &SsBigInt) -> SsResult<SsBigInt> {
    if modulus <= &SsBigInt::one() {
        return Err(SsError::InvalidModulus);
    }
    Ok(pow_mod(base, exp, modulus))
}

/// Square-and-multiply, modulus already known to be > 1
fn pow_mod(base: &SsBigInt, exp: &SsBigInt, modulus: &SsBigInt) -> SsBigInt {
    let mut result = SsBigInt::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    result
}

/// Miller-Rabin primality test
/// Returns true if n is probably prime
///
/// Each round draws a witness in `[2, n-2]` from `rng`; a composite survives
/// all rounds with probability at most `4^(-iterations)`.
pub fn is_probable_prime<R>(n: &SsBigInt, iterations: u32, rng: &mut R) -> bool
where
    R: RandomSource + ?Sized,
{
    let two = from_u64(2);
    let three = from_u64(3);

    if n < &two {
        return false;
    }
    if n == &two || n == &three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as r * 2^s with r odd
    let n_minus_one = n - 1u8;
    let mut r = n_minus_one.clone();
    let mut s = 0u64;
    while r.is_even() {
        r >>= 1;
        s += 1;
    }

    let witness_span = n - &three;

    for _ in 0..iterations {
        let a = rng.uniform_below(&witness_span) + &two;
        let mut y = pow_mod(&a, &r, n);

        if y.is_one() || y == n_minus_one {
            continue;
        }

        let mut j = 1;
        while j < s && y != n_minus_one {
            y = pow_mod(&y, &two, n);
            if y.is_one() {
                return false;
            }
            j += 1;
        }

        if y != n_minus_one {
            return false;
        }
    }

    true
}

/// Generate a random prime of exactly `bits` significant bits
///
/// Draws odd candidates with the top bit set until one passes
/// [`is_probable_prime`]. The loop is not capped.
pub fn generate_prime<R>(bits: u64, iterations: u32, rng: &mut R) -> SsResult<SsBigInt>
where
    R: RandomSource + ?Sized,
{
    if bits < 2 {
        return Err(SsError::InvalidBitLength(bits));
    }
    if iterations == 0 {
        return Err(SsError::InvalidIterations);
    }

    let span = SsBigInt::one() << bits;
    let top = SsBigInt::one() << (bits - 1);
    let mut attempts = 0u64;

    loop {
        attempts += 1;

        let mut candidate = rng.uniform_below(&span);
        candidate |= &top;
        candidate |= SsBigInt::one();

        if is_probable_prime(&candidate, iterations, rng) {
            debug!("{}-bit prime found after {} candidates", bits, attempts);
            return Ok(candidate);
        }
    }
}
