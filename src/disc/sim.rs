use super::{DiscIo, SECTOR_SIZE};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// Default simulated drive size in sectors.
pub const SIM_SECTORS: usize = 1024;

const SIM_NAMES: [&str; 10] = [
    "Drive0", "Drive1", "Drive2", "Drive3", "Drive4", "Drive5", "Drive6", "Drive7", "Drive8",
    "Drive9",
];

/// In-memory backend: ten drives of `sectors` sectors each, all present.
/// Exists so the interpreter, pattern, and I/O paths can run end to end
/// without a disc to destroy.
pub struct SimDisc {
    discs: Vec<Vec<u8>>,
    current: Option<usize>,
    sectors: usize,
}

impl Default for SimDisc {
    fn default() -> SimDisc {
        SimDisc::with_sectors(SIM_SECTORS)
    }
}

impl SimDisc {
    pub fn new() -> SimDisc {
        SimDisc::default()
    }

    pub fn with_sectors(sectors: usize) -> SimDisc {
        SimDisc {
            discs: (0..10).map(|_| vec![0u8; sectors * SECTOR_SIZE]).collect(),
            current: None,
            sectors,
        }
    }

    fn range(&self, lba: i64, count: i64) -> Result<std::ops::Range<usize>> {
        if lba < 0 || count < 0 || (lba + count) as usize > self.sectors {
            return error!(Io; "Transfer beyond end of simulated drive");
        }
        let start = lba as usize * SECTOR_SIZE;
        Ok(start..start + count as usize * SECTOR_SIZE)
    }

    fn current(&self) -> Result<usize> {
        match self.current {
            Some(d) => Ok(d),
            None => error!(Io; "Physical drive not set"),
        }
    }
}

impl DiscIo for SimDisc {
    fn set_drive(&mut self, drive: u32) -> Result<()> {
        if drive > 9 {
            return error!(Io; "Invalid drive number");
        }
        self.current = Some(drive as usize);
        Ok(())
    }

    fn test_drive(&mut self, _drive: u32) -> bool {
        true
    }

    fn read_sectors(&mut self, buf: &mut [u8], lba: i64, count: i64) -> Result<()> {
        let drive = self.current()?;
        let range = self.range(lba, count)?;
        let len = range.len();
        buf[..len].copy_from_slice(&self.discs[drive][range]);
        Ok(())
    }

    fn write_sectors(&mut self, buf: &[u8], lba: i64, count: i64) -> Result<()> {
        let drive = self.current()?;
        let range = self.range(lba, count)?;
        let len = range.len();
        self.discs[drive][range].copy_from_slice(&buf[..len]);
        Ok(())
    }

    fn size_current(&mut self) -> Result<i64> {
        self.current()?;
        Ok((self.sectors * SECTOR_SIZE) as i64)
    }

    fn size_of(&mut self, drive: u32) -> Result<i64> {
        if drive > 9 {
            return error!(Io; "Invalid drive number");
        }
        Ok((self.sectors * SECTOR_SIZE) as i64)
    }

    fn close_drive(&mut self) {
        self.current = None;
    }

    fn drive_name(&self, drive: u32) -> Option<&str> {
        SIM_NAMES.get(drive as usize).copied()
    }
}
