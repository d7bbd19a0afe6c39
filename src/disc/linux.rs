use super::{DiscIo, SECTOR_SIZE};
use crate::error;
use crate::lang::Error;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

type Result<T> = std::result::Result<T, Error>;

/// Device paths for the ten logical drives.
const DRIVE_NAMES: [&str; 10] = [
    "/dev/sda", "/dev/sdb", "/dev/sdc", "/dev/sdd", "/dev/sde", "/dev/sdf", "/dev/sdg",
    "/dev/sdh", "/dev/sdi", "/dev/sdj",
];

/// Raw Linux block-device backend. Requires privileged access; the machine's
/// write protect is the only thing between a typo and a wiped system drive.
#[derive(Default)]
pub struct LinuxDisc {
    handle: Option<File>,
}

impl LinuxDisc {
    pub fn new() -> LinuxDisc {
        LinuxDisc::default()
    }

    fn open(drive: u32) -> Result<File> {
        let name = match DRIVE_NAMES.get(drive as usize) {
            Some(name) => name,
            None => return error!(Io; "Invalid drive number"),
        };
        match OpenOptions::new().read(true).write(true).open(name) {
            Ok(file) => Ok(file),
            Err(e) => error!(Io; "Could not open drive: {}", e),
        }
    }

    fn handle(&mut self) -> Result<&mut File> {
        match self.handle.as_mut() {
            Some(file) => Ok(file),
            None => error!(Io; "Physical drive not set"),
        }
    }

    fn seek_lba(file: &mut File, lba: i64) -> Result<()> {
        if lba < 0 {
            return error!(Io; "Invalid lba");
        }
        let offset = (lba as u64) * SECTOR_SIZE as u64;
        match file.seek(SeekFrom::Start(offset)) {
            Ok(_) => Ok(()),
            Err(e) => error!(Io; "Could not seek: {}", e),
        }
    }
}

impl DiscIo for LinuxDisc {
    fn set_drive(&mut self, drive: u32) -> Result<()> {
        self.close_drive();
        self.handle = Some(Self::open(drive)?);
        Ok(())
    }

    fn test_drive(&mut self, drive: u32) -> bool {
        Self::open(drive).is_ok()
    }

    fn read_sectors(&mut self, buf: &mut [u8], lba: i64, count: i64) -> Result<()> {
        let file = self.handle()?;
        Self::seek_lba(file, lba)?;
        let size = (count.max(0) as usize) * SECTOR_SIZE;
        match file.read_exact(&mut buf[..size]) {
            Ok(()) => Ok(()),
            Err(e) => error!(Io; "Could not read: {}", e),
        }
    }

    fn write_sectors(&mut self, buf: &[u8], lba: i64, count: i64) -> Result<()> {
        let file = self.handle()?;
        Self::seek_lba(file, lba)?;
        let size = (count.max(0) as usize) * SECTOR_SIZE;
        match file.write_all(&buf[..size]) {
            Ok(()) => Ok(()),
            Err(e) => error!(Io; "Could not write: {}", e),
        }
    }

    fn size_current(&mut self) -> Result<i64> {
        let file = self.handle()?;
        match file.seek(SeekFrom::End(0)) {
            Ok(bytes) => Ok(bytes as i64),
            Err(e) => error!(Io; "Could not size drive: {}", e),
        }
    }

    fn size_of(&mut self, drive: u32) -> Result<i64> {
        let mut file = Self::open(drive)?;
        match file.seek(SeekFrom::End(0)) {
            Ok(bytes) => Ok(bytes as i64),
            Err(e) => error!(Io; "Could not size drive: {}", e),
        }
    }

    fn close_drive(&mut self) {
        self.handle = None;
    }

    fn drive_name(&self, drive: u32) -> Option<&str> {
        DRIVE_NAMES.get(drive as usize).copied()
    }
}
