use crate::error::Error;
use crate::temper::{temper, untemper};

pub const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908B0DF;
const UPPER_MASK: u32 = 0x80000000;
const LOWER_MASK: u32 = 0x7FFFFFFF;

/// The reconstructed 624-word generator state plus its wrap-around cursor.
///
/// The buffer starts empty and becomes ready the instant the cursor completes
/// its first full wrap during absorption; readiness never resets. Once ready,
/// [`next_word`](StateBuffer::next_word) and
/// [`prev_word`](StateBuffer::prev_word) walk the output stream forward and
/// backward, rewriting the whole buffer in place whenever the cursor crosses
/// a generation boundary.
pub struct StateBuffer {
    mt: [u32; N],
    mti: usize,
    ready: bool,
}

impl StateBuffer {
    pub fn new() -> Self {
        StateBuffer {
            mt: [0; N],
            mti: 0,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Absorbs one observed raw output word.
    ///
    /// Until the buffer is full this untempers the word into the state. Once
    /// ready, `check` selects between verifying the word against our own
    /// prediction (the cursor still moves, so the session stays usable after
    /// a [`Error::ConsistencyMismatch`]) and overwriting the state as if the
    /// buffer were still filling.
    pub fn absorb(&mut self, raw: u32, check: bool) -> Result<(), Error> {
        if self.ready {
            if check {
                let predicted = self.next_word()?;
                if raw != predicted {
                    return Err(Error::ConsistencyMismatch {
                        observed: raw,
                        predicted,
                    });
                }
                return Ok(());
            }
            if self.mti == 0 {
                self.twist();
            }
        }
        self.mt[self.mti] = untemper(raw);
        self.mti = (self.mti + 1) % N;
        if self.mti == 0 && !self.ready {
            self.ready = true;
        }
        Ok(())
    }

    /// Produces the next raw 32-bit output, advancing a generation first when
    /// the cursor sits on 0.
    pub fn next_word(&mut self) -> Result<u32, Error> {
        if !self.ready {
            return Err(Error::NotReady);
        }
        if self.mti == 0 {
            self.twist();
        }
        let y = temper(self.mt[self.mti]);
        self.mti = (self.mti + 1) % N;
        Ok(y)
    }

    /// Produces the previous raw 32-bit output, rewinding a generation after
    /// the cursor lands back on 0.
    pub fn prev_word(&mut self) -> Result<u32, Error> {
        if !self.ready {
            return Err(Error::NotReady);
        }
        self.mti = (self.mti + N - 1) % N;
        let y = temper(self.mt[self.mti]);
        if self.mti == 0 {
            self.untwist();
        }
        Ok(y)
    }

    fn twist(&mut self) {
        for i in 0..N {
            let y = (self.mt[i] & UPPER_MASK) | (self.mt[(i + 1) % N] & LOWER_MASK);
            self.mt[i] = self.mt[(i + M) % N] ^ (y >> 1);
            if y & 1 != 0 {
                self.mt[i] ^= MATRIX_A;
            }
        }
    }

    // Exact algebraic inverse of twist. Walking the indices strictly
    // downwards means mt[(i + M) % N] holds the pre-twist value exactly when
    // the forward pass read a pre-update one, and vice versa.
    fn untwist(&mut self) {
        for i in (0..N).rev() {
            let mut t = self.mt[i] ^ self.mt[(i + M) % N];
            if t & UPPER_MASK != 0 {
                t ^= MATRIX_A;
            }
            let high = (t >> 30) & 1;

            let mut t = self.mt[(i + N - 1) % N] ^ self.mt[(i + M - 1) % N];
            let mut low = 0;
            if t & UPPER_MASK != 0 {
                t ^= MATRIX_A;
                low = 1;
            }
            let mid = t & 0x3FFFFFFF;

            self.mt[i] = (high << 31) | (mid << 1) | low;
        }
    }
}

impl Default for StateBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mersenne::{nxt, seed_mt, Mt19937};
    use rand::Rng;

    fn absorbed() -> (StateBuffer, Mt19937) {
        let mut rng = rand::thread_rng();
        let mut gen = seed_mt(rng.gen());
        let mut buf = StateBuffer::new();
        for _ in 0..N {
            buf.absorb(nxt(&mut gen), false).unwrap();
        }
        (buf, gen)
    }

    #[test]
    fn twist_untwist_roundtrip() {
        let (mut buf, _) = absorbed();
        for _ in 0..1024 {
            let before = buf.mt;
            buf.twist();
            buf.untwist();
            assert_eq!(before, buf.mt);
        }
    }

    #[test]
    fn untwist_twist_roundtrip() {
        let (mut buf, _) = absorbed();
        for _ in 0..1024 {
            let before = buf.mt;
            buf.untwist();
            buf.twist();
            assert_eq!(before, buf.mt);
        }
    }

    #[test]
    fn absorb_tracks_generator() {
        let (mut buf, mut gen) = absorbed();
        for _ in 0..1024 {
            assert_eq!(buf.next_word().unwrap(), nxt(&mut gen));
        }
    }

    #[test]
    fn prev_word_mirrors_next_word() {
        let (mut buf, _) = absorbed();
        let forward: Vec<u32> = (0..2048).map(|_| buf.next_word().unwrap()).collect();
        let backward: Vec<u32> = (0..2048).map(|_| buf.prev_word().unwrap()).collect();
        let mut mirrored = backward;
        mirrored.reverse();
        assert_eq!(forward, mirrored);
        // rewinding past the absorbed stream is fine, twist is a bijection
        for _ in 0..1000 {
            buf.prev_word().unwrap();
        }
    }

    #[test]
    fn backtrack_recovers_absorbed_words() {
        let mut rng = rand::thread_rng();
        let mut gen = seed_mt(rng.gen());
        let observed: Vec<u32> = (0..N).map(|_| nxt(&mut gen)).collect();
        let mut buf = StateBuffer::new();
        for w in &observed {
            buf.absorb(*w, false).unwrap();
        }
        for w in observed.iter().rev() {
            assert_eq!(buf.prev_word().unwrap(), *w);
        }
    }

    #[test]
    fn not_ready_before_first_wrap() {
        let mut buf = StateBuffer::new();
        assert_eq!(buf.next_word(), Err(Error::NotReady));
        assert_eq!(buf.prev_word(), Err(Error::NotReady));
        for _ in 0..N - 1 {
            buf.absorb(1, false).unwrap();
        }
        assert!(!buf.is_ready());
        assert_eq!(buf.next_word(), Err(Error::NotReady));
        buf.absorb(1, false).unwrap();
        assert!(buf.is_ready());
        buf.next_word().unwrap();
    }

    #[test]
    fn checked_absorb_accepts_own_prediction() {
        let (mut buf, mut gen) = absorbed();
        for _ in 0..2 * N {
            buf.absorb(nxt(&mut gen), true).unwrap();
        }
        for _ in 0..16 {
            assert_eq!(buf.next_word().unwrap(), nxt(&mut gen));
        }
    }

    #[test]
    fn checked_absorb_rejects_divergent_word() {
        let (mut buf, mut gen) = absorbed();
        let next = nxt(&mut gen);
        let err = buf.absorb(next ^ 1, true).unwrap_err();
        assert_eq!(
            err,
            Error::ConsistencyMismatch {
                observed: next ^ 1,
                predicted: next
            }
        );
        // the mismatch consumed one predicted word, the stream continues
        assert_eq!(buf.next_word().unwrap(), nxt(&mut gen));
    }

    #[test]
    fn unchecked_absorb_overwrites_state() {
        let (mut buf, _) = absorbed();
        let mut other = seed_mt(4711);
        for _ in 0..N {
            buf.absorb(nxt(&mut other), false).unwrap();
        }
        for _ in 0..64 {
            assert_eq!(buf.next_word().unwrap(), nxt(&mut other));
        }
    }
}
