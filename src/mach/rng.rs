/// Multiplicative congruential generator.
///
/// The pattern engine depends on this generator byte for byte, so the exact
/// reduction is part of the contract: multiply the 31-bit seed by 33614,
/// split the 64-bit product, add the high word to the halved low word, and
/// fold the top bit back in. Do not substitute a library PRNG.
#[derive(Debug, Clone)]
pub struct Lcg {
    seed: u32,
}

/// Seed the pattern and compare passes run under, and the value the `srand`
/// verb resets to, so scripted `rand` use can reproduce pattern streams.
pub const PATTERN_SEED: u32 = 42;

impl Default for Lcg {
    fn default() -> Lcg {
        Lcg { seed: 1 }
    }
}

impl Lcg {
    pub fn new() -> Lcg {
        Lcg::default()
    }

    pub fn reseed(&mut self, seed: u32) {
        self.seed = seed;
    }

    pub fn rand32(&mut self) -> u32 {
        let t = 33614u64 * u64::from(self.seed);
        let q = (t as u32) >> 1;
        let p = (t >> 32) as u32;
        let mut m = p.wrapping_add(q);
        if m & 0x8000_0000 != 0 {
            m = (m & 0x7fff_ffff) + 1;
        }
        self.seed = m;
        m
    }

    /// Two draws, high word first and masked to 31 bits, concatenated.
    pub fn rand64(&mut self) -> i64 {
        let hi = i64::from(self.rand32() & 0x7fff_ffff);
        let lo = i64::from(self.rand32());
        hi << 32 | lo
    }
}
