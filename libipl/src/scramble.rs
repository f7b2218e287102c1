/// Reset value of the `t` register
const T_RESET: u16 = 0x2953;
/// Reset value of the `u` register
const U_RESET: u16 = 0xD9C2;
/// Reset value of the `v` register
const V_RESET: u16 = 0x3FF1;

/// Feedback mask applied when a 1-bit is shifted out of `t`
const T_FEEDBACK: u16 = 0xA740;
/// Feedback mask applied when a 1-bit is shifted out of `u`
const U_FEEDBACK: u16 = 0xFB10;
/// Feedback mask applied when a 1-bit is shifted out of `v`
const V_FEEDBACK: u16 = 0xB3D0;

/// Keystream state of the bootrom scrambling algorithm.
///
/// Three 16-bit shift registers plus a working bit produce one keystream
/// bit per clock; every eighth clock completes a byte. The keystream
/// depends only on this state, never on the data, so XOR-ing it in is its
/// own inverse as long as every call starts from a fresh state.
pub struct Scrambler {
    t: u16,
    u: u16,
    v: u16,
    /// Working bit xored into the accumulator
    x: u8,
    /// Accumulator for the keystream byte being built
    acc: u8,
    /// Bits accumulated so far
    nacc: u8,
}

impl Scrambler {
    pub fn new() -> Self {
        Self {
            t: T_RESET,
            u: U_RESET,
            v: V_RESET,
            x: 1,
            acc: 0,
            nacc: 0,
        }
    }

    /// Advance the registers by one bit-step.
    ///
    /// Returns the completed keystream byte on every eighth call, `None`
    /// otherwise.
    pub fn clock(&mut self) -> Option<u8> {
        let t0 = self.t & 1;
        let t1 = (self.t >> 1) & 1;
        let u0 = self.u & 1;
        let u1 = (self.u >> 1) & 1;
        let v0 = self.v & 1;

        self.x ^= (t1 ^ v0) as u8;
        self.x ^= (u0 | u1) as u8;
        self.x ^= ((t0 ^ u1 ^ v0) & (t0 ^ u0)) as u8;

        if t0 == u0 {
            self.v >>= 1;
            if v0 == 1 {
                self.v ^= V_FEEDBACK;
            }
        }

        if t0 == 0 {
            self.u >>= 1;
            if u0 == 1 {
                self.u ^= U_FEEDBACK;
            }
        }

        self.t >>= 1;
        if t0 == 1 {
            self.t ^= T_FEEDBACK;
        }

        self.acc = self.acc.wrapping_mul(2).wrapping_add(self.x);
        self.nacc += 1;

        if self.nacc == 8 {
            self.nacc = 0;
            Some(self.acc)
        } else {
            None
        }
    }

    /// Produce the next keystream byte (eight bit-steps).
    pub fn next_byte(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.clock() {
                return byte;
            }
        }
    }

    /// Scramble (or descramble) a buffer in place from a fresh state.
    ///
    /// The state is always constructed here rather than passed in: the
    /// transform is only an involution when no residual state leaks
    /// between calls.
    pub fn apply(data: &mut [u8]) {
        let mut state = Scrambler::new();

        for byte in data.iter_mut() {
            *byte ^= state.next_byte();
        }
    }
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::new()
    }
}
