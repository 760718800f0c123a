use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::util::checked_span;
use crate::{Result, StorageDevice, StorageError};

/// Host-file-backed storage device with a fixed capacity.
///
/// All I/O is positioned (pread/pwrite style) and does not disturb the file
/// cursor, so a caller can hand over an already-seeked `File` and get it back
/// with `into_file` unchanged.
#[derive(Debug)]
pub struct FileDevice {
    file: File,
    capacity: u32,
}

impl FileDevice {
    /// Create a new zero-filled image file of the given capacity.
    ///
    /// Refuses to overwrite an existing file.
    pub fn create<P: AsRef<Path>>(path: P, capacity: u32) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(io_err)?;
        file.set_len(u64::from(capacity)).map_err(io_err)?;
        Ok(Self { file, capacity })
    }

    /// Open an existing image file; the device capacity is the file length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(io_err)?;
        Self::from_file(file)
    }

    /// Wrap an already-open file; the device capacity is the file length.
    pub fn from_file(file: File) -> Result<Self> {
        let len = file.metadata().map_err(io_err)?.len();
        let capacity = u32::try_from(len).map_err(|_| {
            StorageError::InvalidConfig("file larger than the 32-bit address space")
        })?;
        Ok(Self { file, capacity })
    }

    pub fn into_file(self) -> File {
        self.file
    }

    /// Flush file contents and metadata to the underlying disk.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().map_err(io_err)
    }
}

impl StorageDevice for FileDevice {
    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn read_at(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        checked_span(addr, buf.len(), self.capacity)?;
        read_exact_at(&self.file, u64::from(addr), buf).map_err(io_err)
    }

    fn write_at(&mut self, addr: u32, buf: &[u8]) -> Result<()> {
        checked_span(addr, buf.len(), self.capacity)?;
        write_all_at(&self.file, u64::from(addr), buf).map_err(io_err)
    }
}

fn io_err(e: std::io::Error) -> StorageError {
    StorageError::Io(e.to_string())
}

#[cfg(unix)]
fn read_exact_at(file: &File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, offset: u64, buf: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut offset: u64, mut buf: &mut [u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        let n = file.seek_read(buf, offset)?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        offset += n as u64;
        buf = &mut buf[n..];
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut offset: u64, mut buf: &[u8]) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        let n = file.seek_write(buf, offset)?;
        if n == 0 {
            return Err(std::io::ErrorKind::WriteZero.into());
        }
        offset += n as u64;
        buf = &buf[n..];
    }
    Ok(())
}
