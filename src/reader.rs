//! Random-access byte reader abstraction
//!
//! VGM playback needs cheap random access to the backing file: the command
//! dispatcher walks forward (and jumps back on loop), while the DMC sample
//! cache refills windows from arbitrary offsets. Both go through the
//! `ByteReader` trait so the player can run over a file on disk or a byte
//! slice in tests.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Synchronous random-access byte source
///
/// Short reads are reported through the return count rather than an error;
/// callers decide whether a short read is fatal (command stream) or local
/// (DMC sample cache).
pub trait ByteReader {
    /// Read up to `dest.len()` bytes starting at `offset`
    ///
    /// Returns the number of bytes actually read, which is less than
    /// `dest.len()` at end of data or on failure.
    fn read(&mut self, dest: &mut [u8], offset: u64) -> usize;

    /// Total size of the underlying data in bytes
    fn size(&mut self) -> u64;
}

/// Reader over a borrowed byte slice
pub struct SliceReader<'a> {
    data: &'a [u8],
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteReader for SliceReader<'_> {
    fn read(&mut self, dest: &mut [u8], offset: u64) -> usize {
        if offset >= self.data.len() as u64 {
            return 0;
        }
        let start = offset as usize;
        let count = dest.len().min(self.data.len() - start);
        dest[..count].copy_from_slice(&self.data[start..start + count]);
        count
    }

    fn size(&mut self) -> u64 {
        self.data.len() as u64
    }
}

/// Reader over a file on disk
pub struct FileReader {
    file: File,
    len: u64,
}

impl FileReader {
    /// Open a file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl ByteReader for FileReader {
    fn read(&mut self, dest: &mut [u8], offset: u64) -> usize {
        if self.file.seek(SeekFrom::Start(offset)).is_err() {
            return 0;
        }
        let mut total = 0;
        while total < dest.len() {
            match self.file.read(&mut dest[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        total
    }

    fn size(&mut self) -> u64 {
        self.len
    }
}
