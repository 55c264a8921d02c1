use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::Error;
use crate::state::StateBuffer;

/// Which generation of range-sampling rules to emulate. Python 2 picked the
/// draw width from a logarithm and short-cut small ranges through a double;
/// Python 3 always rejection-samples at the exact bit length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    Legacy,
    Modern,
}

// widths below 2^53 take the legacy floating-point shortcut
const BPF: u64 = 53;

/// A predictor session: one [`StateBuffer`] plus the verification mode and
/// algorithm variant, both fixed at construction.
///
/// Feed it 624 consecutive raw outputs of the target generator via
/// [`absorb_words`](Predictor::absorb_words); afterwards every `predict_*`
/// call reproduces the value the target would emit next and every
/// `backtrack_*` call reproduces the value it emitted before, in mirrored
/// word and bit order.
pub struct Predictor {
    state: StateBuffer,
    check: bool,
    variant: Variant,
}

impl Predictor {
    pub fn new(check: bool, variant: Variant) -> Self {
        Predictor {
            state: StateBuffer::new(),
            check,
            variant,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Absorbs `bits / 32` observed raw words packed into `value`,
    /// least-significant word first.
    pub fn absorb_words(&mut self, value: &BigUint, bits: u64) -> Result<(), Error> {
        if bits == 0 || bits % 32 != 0 {
            return Err(Error::InvalidArgument(
                "bit width must be a positive multiple of 32",
            ));
        }
        if value.bits() > bits {
            return Err(Error::InvalidArgument(
                "value does not fit in the given bit width",
            ));
        }
        let mut digits = value.iter_u32_digits();
        for _ in 0..bits / 32 {
            self.state.absorb(digits.next().unwrap_or(0), self.check)?;
        }
        Ok(())
    }

    /// Predicts the target's next `getrandbits(bits)` draw: `bits / 32` raw
    /// words consumed least-significant first, the final word truncated to
    /// the remaining width.
    pub fn predict_getrandbits(&mut self, bits: u64) -> Result<BigUint, Error> {
        if !self.state.is_ready() {
            return Err(Error::NotReady);
        }
        let mut digits = Vec::with_capacity(bits.div_ceil(32) as usize);
        let mut left = bits;
        while left > 0 {
            let mut t = self.state.next_word()?;
            if left < 32 {
                t >>= 32 - left;
            }
            digits.push(t);
            left = left.saturating_sub(32);
        }
        Ok(BigUint::new(digits))
    }

    /// Recovers the target's previous `getrandbits(bits)` draw. Words pop in
    /// reverse, so the first popped one is the most significant and carries
    /// the boundary truncation.
    pub fn backtrack_getrandbits(&mut self, bits: u64) -> Result<BigUint, Error> {
        if !self.state.is_ready() {
            return Err(Error::NotReady);
        }
        let words = bits.div_ceil(32) as usize;
        let mut digits = vec![0u32; words];
        let mut left = bits;
        for i in (0..words).rev() {
            let mut t = self.state.prev_word()?;
            let take = left - 32 * i as u64;
            if take < 32 {
                t >>= 32 - take;
            }
            digits[i] = t;
            left -= take;
        }
        Ok(BigUint::new(digits))
    }

    /// Predicts the next 53-bit double in `[0, 1)`.
    pub fn predict_random(&mut self) -> Result<f64, Error> {
        let a = self.state.next_word()? >> 5;
        let b = self.state.next_word()? >> 6;
        Ok((a as f64 * 67108864.0 + b as f64) * (1.0 / 9007199254740992.0))
    }

    /// Recovers the previous 53-bit double, popping the low word first.
    pub fn backtrack_random(&mut self) -> Result<f64, Error> {
        let b = self.state.prev_word()? >> 6;
        let a = self.state.prev_word()? >> 5;
        Ok((a as f64 * 67108864.0 + b as f64) * (1.0 / 9007199254740992.0))
    }

    pub fn predict_uniform(&mut self, a: f64, b: f64) -> Result<f64, Error> {
        Ok(a + (b - a) * self.predict_random()?)
    }

    pub fn backtrack_uniform(&mut self, a: f64, b: f64) -> Result<f64, Error> {
        Ok(a + (b - a) * self.backtrack_random()?)
    }

    /// Rejection-samples an integer in `[0, n)`; `n == 0` yields 0 without
    /// consuming any words.
    pub fn predict_randbelow(&mut self, n: &BigUint) -> Result<BigUint, Error> {
        if n.is_zero() {
            return Ok(BigUint::zero());
        }
        let k = randbits_width(n, self.variant);
        let mut r = self.predict_getrandbits(k)?;
        while &r >= n {
            r = self.predict_getrandbits(k)?;
        }
        Ok(r)
    }

    /// Predicts `randrange(start, stop, step)` under the session's variant.
    /// `stop == None` is the single-argument form over `[0, start)`.
    pub fn predict_randrange(
        &mut self,
        start: &BigInt,
        stop: Option<&BigInt>,
        step: &BigInt,
    ) -> Result<BigInt, Error> {
        let stop = match stop {
            Some(stop) => stop,
            None => {
                if start.is_positive() {
                    let n = start.to_biguint().expect("positive");
                    return Ok(self.sample_width(&n)?.into());
                }
                return Err(Error::EmptyRange);
            }
        };
        let width = stop - start;
        if step.is_one() {
            if !width.is_positive() {
                return Err(Error::EmptyRange);
            }
            let w = width.to_biguint().expect("positive");
            return Ok(start + BigInt::from(self.sample_width(&w)?));
        }
        if step.is_zero() {
            return Err(Error::InvalidArgument("zero step for randrange"));
        }
        // truncating division agrees with floor division whenever the
        // quotient comes out positive, and a non-positive n is rejected
        let n = if step.is_positive() {
            (&width + step - 1u8) / step
        } else {
            (&width + step + 1u8) / step
        };
        if !n.is_positive() {
            return Err(Error::EmptyRange);
        }
        let n = n.to_biguint().expect("positive");
        Ok(start + step * BigInt::from(self.sample_width(&n)?))
    }

    /// Predicts `randint(a, b)`, both endpoints included.
    pub fn predict_randint(&mut self, a: &BigInt, b: &BigInt) -> Result<BigInt, Error> {
        self.predict_randrange(a, Some(&(b + 1u8)), &BigInt::one())
    }

    /// Predicts the next `n` random bytes: successive raw words packed
    /// little-endian, the tail word truncated to the remaining byte count.
    pub fn predict_randbytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let x = self.predict_getrandbits(8 * n as u64)?;
        let mut bytes = x.to_bytes_le();
        bytes.resize(n, 0);
        Ok(bytes)
    }

    /// Recovers the previous `n` random bytes, mirroring word and byte order.
    pub fn backtrack_randbytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let x = self.backtrack_getrandbits(8 * n as u64)?;
        let mut bytes = x.to_bytes_le();
        bytes.resize(n, 0);
        Ok(bytes)
    }

    // One bounded draw in [0, n): rejection sampling, except that the legacy
    // rules replace it with floor(random() * n) below the 2^53 threshold.
    fn sample_width(&mut self, n: &BigUint) -> Result<BigUint, Error> {
        match self.variant {
            Variant::Modern => self.predict_randbelow(n),
            Variant::Legacy => {
                if n.bits() > BPF {
                    self.predict_randbelow(n)
                } else {
                    let scaled = self.predict_random()? * n.to_f64().expect("below 2^53");
                    Ok(BigUint::from(scaled as u64))
                }
            }
        }
    }
}

/// Bit width of one rejection-sampling draw for an upper bound `n > 0`.
///
/// The legacy rules computed `int(1.00001 + log(n - 1, 2.0))`, which drifts
/// from the plain bit length near powers of two; reproducing the drift is
/// essential or the predictor desynchronizes from the target.
pub(crate) fn randbits_width(n: &BigUint, variant: Variant) -> u64 {
    match variant {
        Variant::Modern => n.bits(),
        Variant::Legacy => {
            let m = n - 1u32;
            if m.is_zero() {
                1
            } else {
                (1.00001 + big_ln(&m) / std::f64::consts::LN_2) as u64
            }
        }
    }
}

// ln of an arbitrary-width integer the way a double-precision log computes
// it: top 53 bits as the mantissa, the rest as a power-of-two exponent.
fn big_ln(x: &BigUint) -> f64 {
    let bits = x.bits();
    if bits <= 53 {
        x.to_f64().expect("fits in f64").ln()
    } else {
        let top = (x >> (bits - 53)).to_f64().expect("fits in f64");
        top.ln() + (bits - 53) as f64 * std::f64::consts::LN_2
    }
}
