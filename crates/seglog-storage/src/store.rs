//! The store file: append-only, length-prefixed record bytes.
//!
//! Every record is written as an 8-byte big-endian length followed by the
//! payload. Appends go through a buffered writer so many small records
//! amortize into few syscalls; `size` counts buffered bytes as committed.
//! Any read flushes the buffer first so the requested position is visible
//! to positional I/O.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::Path;
use std::sync::Mutex;

/// Width of the big-endian length prefix framing each record.
pub const LEN_WIDTH: u64 = 8;

/// An append-only framed byte file. All operations are serialized by an
/// internal mutex, so a store can be shared behind an `Arc`; the log's
/// concatenating reader does exactly that.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    reader: File,
    writer: BufWriter<File>,
    /// Bytes logically committed, including buffered-but-unflushed bytes.
    size: u64,
}

impl Store {
    /// Open (or create) the store file at `path`. An existing tail is
    /// preserved; `size` starts at the current file length.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let size = file.metadata()?.len();
        let reader = file.try_clone()?;

        Ok(Self {
            inner: Mutex::new(Inner {
                reader,
                writer: BufWriter::new(file),
                size,
            }),
        })
    }

    /// Append `p` as a framed record. Returns the number of bytes written
    /// (length prefix included) and the position the record starts at.
    pub fn append(&self, p: &[u8]) -> io::Result<(u64, u64)> {
        let mut inner = self.lock();

        let pos = inner.size;
        inner.writer.write_all(&(p.len() as u64).to_be_bytes())?;
        inner.writer.write_all(p)?;

        let n = LEN_WIDTH + p.len() as u64;
        inner.size += n;
        Ok((n, pos))
    }

    /// Read the record whose length prefix begins at `pos`.
    pub fn read(&self, pos: u64) -> io::Result<Vec<u8>> {
        let mut inner = self.lock();
        inner.writer.flush()?;

        let mut len = [0u8; LEN_WIDTH as usize];
        inner.reader.read_exact_at(&mut len, pos)?;

        let mut payload = vec![0u8; u64::from_be_bytes(len) as usize];
        inner.reader.read_exact_at(&mut payload, pos + LEN_WIDTH)?;
        Ok(payload)
    }

    /// Positional read into a caller-provided buffer, flushing first.
    pub fn read_at(&self, buf: &mut [u8], off: u64) -> io::Result<usize> {
        let mut inner = self.lock();
        inner.writer.flush()?;
        inner.reader.read_at(buf, off)
    }

    /// Bytes logically committed so far, buffered bytes included.
    pub fn size(&self) -> u64 {
        self.lock().size
    }

    /// Flush buffered writes down to the file. The handles themselves close
    /// when the last reference to the store drops.
    pub fn flush(&self) -> io::Result<()> {
        self.lock().writer.flush()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
