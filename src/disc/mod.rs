/*!
## Disc module

The block-device boundary the interpreter drives. Drives are identified by a
small logical number in 0..9; sectors are the indivisible 512-byte I/O unit.
Any conforming backend works: the Linux raw-device backend for real drives,
or the in-memory simulator the tests run against.

*/

use crate::lang::Error;

mod linux;
mod sim;

pub use linux::LinuxDisc;
pub use sim::SimDisc;

/// Size of a sector, unchanged since the PDP-11 days.
pub const SECTOR_SIZE: usize = 512;

/// Sectors held by each of the two I/O buffers.
pub const BUF_SECTORS: usize = 256;

type Result<T> = std::result::Result<T, Error>;

/// Raw access to one drive at a time. Changing the drive closes the prior
/// handle unconditionally; all transfers are whole sectors and synchronous.
/// Failures carry the *io* error kind and whatever detail the backend has.
pub trait DiscIo {
    /// Open the drive with the given logical number and make it current.
    fn set_drive(&mut self, drive: u32) -> Result<()>;

    /// Probe whether a drive exists without making it current.
    fn test_drive(&mut self, drive: u32) -> bool;

    /// Read `count` sectors starting at `lba` into the buffer.
    fn read_sectors(&mut self, buf: &mut [u8], lba: i64, count: i64) -> Result<()>;

    /// Write `count` sectors starting at `lba` from the buffer.
    fn write_sectors(&mut self, buf: &[u8], lba: i64, count: i64) -> Result<()>;

    /// Total size of the current drive in bytes.
    fn size_current(&mut self) -> Result<i64>;

    /// Total size of an arbitrary drive in bytes, without making it current.
    fn size_of(&mut self, drive: u32) -> Result<i64>;

    /// Close any open handle.
    fn close_drive(&mut self);

    /// Backend name for a logical drive number, 0..9 only.
    fn drive_name(&self, drive: u32) -> Option<&str>;
}
