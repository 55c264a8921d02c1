//! Reference MT19937 generator, bit-compatible with CPython's `random`
//! module. The predictor never calls into this; it exists to feed observed
//! words into a session and to cross-check predictions in tests and demos.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::predict::{randbits_width, Variant};

pub const N: usize = 624;

pub type Mt19937 = (usize, [u32; N]);

pub fn seed_mt(seed: u32) -> Mt19937 {
    const W: u32 = 32;
    const F: u32 = 1812433253;
    let mut arr = [seed; N];
    for i in 1..N {
        arr[i] = arr[i - 1] ^ (arr[i - 1] >> (W - 2));
        arr[i] = arr[i].wrapping_mul(F);
        arr[i] = arr[i].wrapping_add(i as u32);
    }
    (N, arr)
}

fn twist(arr: &mut [u32; N]) {
    const M: usize = 397;
    const A: u32 = 0x9908B0DF;
    const R: u32 = 31;
    for i in 0..N {
        let x = (arr[i] & 1u32 << R) | (arr[(i + 1) % N] & (1u32 << R) - 1);
        arr[i] = arr[(i + M) % N] ^ x >> 1;
        if x % 2 != 0 {
            arr[i] ^= A;
        }
    }
}

pub fn nxt((n, arr): &mut Mt19937) -> u32 {
    if *n == N {
        twist(arr);
        *n = 0;
    }
    let y = arr[*n];
    *n += 1;
    crate::temper::temper(y)
}

/// `getrandbits(bits)`: raw words packed least-significant first, the final
/// word truncated to the remaining width.
pub fn getrandbits(state: &mut Mt19937, bits: u64) -> BigUint {
    let mut digits = Vec::with_capacity(bits.div_ceil(32) as usize);
    let mut left = bits;
    while left > 0 {
        let mut t = nxt(state);
        if left < 32 {
            t >>= 32 - left;
        }
        digits.push(t);
        left = left.saturating_sub(32);
    }
    BigUint::new(digits)
}

/// A 53-bit double in `[0, 1)` from two raw words.
pub fn random64(state: &mut Mt19937) -> f64 {
    let a = nxt(state) >> 5;
    let b = nxt(state) >> 6;
    (a as f64 * 67108864.0 + b as f64) * (1.0 / 9007199254740992.0)
}

pub fn uniform(state: &mut Mt19937, a: f64, b: f64) -> f64 {
    a + (b - a) * random64(state)
}

/// Rejection-samples an integer in `[0, n)`, drawing the variant's bit width.
pub fn randbelow(state: &mut Mt19937, n: &BigUint, variant: Variant) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }
    let k = randbits_width(n, variant);
    let mut r = getrandbits(state, k);
    while &r >= n {
        r = getrandbits(state, k);
    }
    r
}

/// `randrange(0, n)` under the given variant, including the legacy
/// floating-point shortcut below 2^53.
pub fn randrange0(state: &mut Mt19937, n: &BigUint, variant: Variant) -> BigUint {
    match variant {
        Variant::Modern => randbelow(state, n, variant),
        Variant::Legacy => {
            if n.bits() > 53 {
                randbelow(state, n, variant)
            } else {
                let scaled = random64(state) * n.to_f64().expect("below 2^53");
                BigUint::from(scaled as u64)
            }
        }
    }
}

/// `randbytes(n)`: `getrandbits(8 * n)` serialized little-endian.
pub fn randbytes(state: &mut Mt19937, n: usize) -> Vec<u8> {
    let mut bytes = getrandbits(state, 8 * n as u64).to_bytes_le();
    bytes.resize(n, 0);
    bytes
}
