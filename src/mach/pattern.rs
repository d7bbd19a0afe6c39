use super::rng::{Lcg, PATTERN_SEED};
use crate::disc::SECTOR_SIZE;

/// Sector test patterns. The write side fills the write buffer; the read
/// side verifies the read buffer against the identical byte stream, so both
/// are driven off one generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Byte incrementing count.
    Cnt,
    /// Successive 32-bit big-endian counter.
    Dwcnt,
    /// One 32-bit big-endian value in every dword.
    Val,
    /// Per-sector random stream, seed reset for every sector.
    Rand,
    /// First dword of each sector gets the LBA, incrementing across the
    /// buffer. The rest of each sector is left untouched so another pattern
    /// can fill the background.
    Lba,
    /// Compare the read buffer to the write buffer (compare only).
    Buffs,
}

impl Pattern {
    pub fn from_name(name: &str) -> Option<Pattern> {
        match name {
            "cnt" => Some(Pattern::Cnt),
            "dwcnt" => Some(Pattern::Dwcnt),
            "val" => Some(Pattern::Val),
            "rand" => Some(Pattern::Rand),
            "lba" => Some(Pattern::Lba),
            "buffs" => Some(Pattern::Buffs),
            _ => None,
        }
    }
}

/// The deterministic `(offset, byte)` stream for one pattern over `sectors`
/// sectors. `Lba` visits only the first four bytes of each sector; every
/// other pattern visits each offset once, in order.
///
/// The random pattern draws from its own generator, so the process RNG the
/// `rand` variable reads stays untouched by pattern and compare work.
pub struct PatternBytes {
    pattern: Pattern,
    val: i64,
    sectors: usize,
    pos: usize,
    sector: usize,
    rng: Lcg,
}

impl PatternBytes {
    pub fn new(pattern: Pattern, val: i64, sectors: i64) -> PatternBytes {
        PatternBytes {
            pattern,
            val,
            sectors: sectors.max(0) as usize,
            pos: 0,
            sector: 0,
            rng: Lcg::new(),
        }
    }
}

fn be_byte(value: u32, index: usize) -> u8 {
    (value >> (24 - 8 * (index & 3))) as u8
}

impl Iterator for PatternBytes {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<(usize, u8)> {
        match self.pattern {
            Pattern::Cnt => {
                if self.pos >= SECTOR_SIZE * self.sectors {
                    return None;
                }
                let item = (self.pos, self.pos as u8);
                self.pos += 1;
                Some(item)
            }
            Pattern::Dwcnt => {
                if self.pos >= SECTOR_SIZE * self.sectors {
                    return None;
                }
                let counter = (self.pos / 4) as u32;
                let item = (self.pos, be_byte(counter, self.pos));
                self.pos += 1;
                Some(item)
            }
            Pattern::Val => {
                if self.pos >= SECTOR_SIZE * self.sectors {
                    return None;
                }
                let item = (self.pos, be_byte(self.val as u32, self.pos));
                self.pos += 1;
                Some(item)
            }
            Pattern::Rand => {
                if self.pos >= SECTOR_SIZE * self.sectors {
                    return None;
                }
                if self.pos % SECTOR_SIZE == 0 {
                    // the random pattern is the same for each sector
                    self.rng.reseed(PATTERN_SEED);
                }
                let item = (self.pos, (self.rng.rand64() & 0xff) as u8);
                self.pos += 1;
                Some(item)
            }
            Pattern::Lba => {
                if self.sector >= self.sectors {
                    return None;
                }
                let lba = self.val.wrapping_add(self.sector as i64) as u32;
                let item = (self.sector * SECTOR_SIZE + self.pos, be_byte(lba, self.pos));
                self.pos += 1;
                if self.pos == 4 {
                    self.pos = 0;
                    self.sector += 1;
                }
                Some(item)
            }
            Pattern::Buffs => None,
        }
    }
}

/// Fill a buffer with a write-side pattern. `Lba` leaves the background
/// bytes alone; `Buffs` has no write side and fills nothing.
pub fn fill(pattern: Pattern, val: i64, sectors: i64, buf: &mut [u8]) {
    for (offset, byte) in PatternBytes::new(pattern, val, sectors) {
        buf[offset] = byte;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECS: i64 = 3;

    fn filled(pattern: Pattern, val: i64) -> Vec<u8> {
        let mut buf = vec![0u8; SECTOR_SIZE * SECS as usize];
        fill(pattern, val, SECS, &mut buf);
        buf
    }

    #[test]
    fn test_cnt_wraps_every_256() {
        let buf = filled(Pattern::Cnt, 0);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[255], 255);
        assert_eq!(buf[256], 0);
        assert_eq!(buf[SECTOR_SIZE], 0);
        assert_eq!(buf[SECTOR_SIZE + 1], 1);
    }

    #[test]
    fn test_dwcnt_big_endian() {
        let buf = filled(Pattern::Dwcnt, 0);
        assert_eq!(&buf[0..4], &[0, 0, 0, 0]);
        assert_eq!(&buf[4..8], &[0, 0, 0, 1]);
        assert_eq!(&buf[1024..1028], &[0, 0, 1, 0]);
    }

    #[test]
    fn test_val_big_endian() {
        let buf = filled(Pattern::Val, 0xdeadbeef);
        assert_eq!(&buf[0..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&buf[4..8], &[0xde, 0xad, 0xbe, 0xef]);
        let last = SECTOR_SIZE * SECS as usize - 4;
        assert_eq!(&buf[last..], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_val_truncates_to_32_bits() {
        let buf = filled(Pattern::Val, 0x1_2345_6789);
        assert_eq!(&buf[0..4], &[0x23, 0x45, 0x67, 0x89]);
    }

    #[test]
    fn test_rand_repeats_per_sector() {
        let buf = filled(Pattern::Rand, 0);
        assert_eq!(&buf[0..SECTOR_SIZE], &buf[SECTOR_SIZE..2 * SECTOR_SIZE]);
        // and is not constant
        assert!(buf[0..SECTOR_SIZE].iter().any(|&b| b != buf[0]));
    }

    #[test]
    fn test_lba_touches_first_dword_only() {
        let mut buf = vec![0xaau8; SECTOR_SIZE * SECS as usize];
        fill(Pattern::Lba, 0x10, SECS, &mut buf);
        assert_eq!(&buf[0..4], &[0, 0, 0, 0x10]);
        assert_eq!(&buf[SECTOR_SIZE..SECTOR_SIZE + 4], &[0, 0, 0, 0x11]);
        assert_eq!(&buf[2 * SECTOR_SIZE..2 * SECTOR_SIZE + 4], &[0, 0, 0, 0x12]);
        // background untouched
        assert_eq!(buf[4], 0xaa);
        assert_eq!(buf[SECTOR_SIZE - 1], 0xaa);
    }

    #[test]
    fn test_stream_matches_fill() {
        for &pattern in &[Pattern::Cnt, Pattern::Dwcnt, Pattern::Val, Pattern::Rand] {
            let buf = filled(pattern, 0x55aa);
            for (offset, byte) in PatternBytes::new(pattern, 0x55aa, SECS) {
                assert_eq!(buf[offset], byte);
            }
        }
    }

    #[test]
    fn test_buffs_has_no_write_side() {
        let mut buf = vec![0x11u8; SECTOR_SIZE];
        fill(Pattern::Buffs, 0, 1, &mut buf);
        assert!(buf.iter().all(|&b| b == 0x11));
    }

    #[test]
    fn test_names() {
        assert_eq!(Pattern::from_name("cnt"), Some(Pattern::Cnt));
        assert_eq!(Pattern::from_name("buffs"), Some(Pattern::Buffs));
        assert_eq!(Pattern::from_name("nope"), None);
    }
}
