//! The index file: a memory-mapped table of offset→position entries.
//!
//! Each entry is 12 bytes, big-endian: a `u32` offset relative to the
//! segment's base, then the `u64` byte position of that record in the store.
//! Entry `k` describes the `k`-th record of the segment, so lookups are pure
//! pointer arithmetic over the map.
//!
//! The file is pre-grown to its configured capacity before mapping, because
//! a map cannot grow afterwards. `size` tracks the bytes actually in use. On
//! a clean close the map is flushed, the file synced and then truncated back
//! to `size`, so the on-disk length equals `entries × 12` again.

use std::fs::{File, OpenOptions};
use std::path::Path;

use memmap2::MmapMut;

use seglog_core::{Error, Result};

/// Width of the relative-offset field.
pub const OFF_WIDTH: u64 = 4;
/// Width of the position field.
pub const POS_WIDTH: u64 = 8;
/// Width of one index entry.
pub const ENT_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

#[derive(Debug)]
pub struct Index {
    file: File,
    mmap: MmapMut,
    /// Bytes in use: `entries × 12`. Not the map length.
    size: u64,
}

impl Index {
    /// Open (or create) the index file at `path`, pre-sized to
    /// `max_index_bytes` and mapped read/write, shared.
    pub fn open(path: &Path, max_index_bytes: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;

        // On a cleanly closed index the file length is the logical size.
        // After a crash it is still the full reservation from the previous
        // open, so this over-reads; recovering the true entry count would
        // need a backward scan or a committed header. Known limitation.
        let size = file.metadata()?.len();

        file.set_len(max_index_bytes)?;

        // SAFETY: the owning segment holds the only handles to this file;
        // nothing remaps or truncates it while the map is live.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self { file, mmap, size })
    }

    /// Append one entry. Fails with [`Error::IndexFull`] when the map has no
    /// room for another 12 bytes.
    pub fn write(&mut self, off: u32, pos: u64) -> Result<()> {
        if self.size + ENT_WIDTH > self.mmap.len() as u64 {
            return Err(Error::IndexFull);
        }

        let at = self.size as usize;
        self.mmap[at..at + OFF_WIDTH as usize].copy_from_slice(&off.to_be_bytes());
        self.mmap[at + OFF_WIDTH as usize..at + ENT_WIDTH as usize]
            .copy_from_slice(&pos.to_be_bytes());

        self.size += ENT_WIDTH;
        Ok(())
    }

    /// Read the entry in slot `slot`; `-1` addresses the last entry. Fails
    /// with [`Error::EndOfIndex`] when the index is empty or the slot is
    /// past the last written entry.
    pub fn read(&self, slot: i64) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::EndOfIndex);
        }

        let slot = if slot == -1 {
            self.size / ENT_WIDTH - 1
        } else {
            slot as u32 as u64
        };

        let at = slot * ENT_WIDTH;
        if at >= self.size {
            return Err(Error::EndOfIndex);
        }

        let at = at as usize;
        let mut off = [0u8; OFF_WIDTH as usize];
        off.copy_from_slice(&self.mmap[at..at + OFF_WIDTH as usize]);
        let mut pos = [0u8; POS_WIDTH as usize];
        pos.copy_from_slice(&self.mmap[at + OFF_WIDTH as usize..at + ENT_WIDTH as usize]);

        Ok((u32::from_be_bytes(off), u64::from_be_bytes(pos)))
    }

    /// Whether another entry would overflow the map.
    pub fn is_full(&self) -> bool {
        self.size + ENT_WIDTH > self.mmap.len() as u64
    }

    /// Bytes in use.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Flush the map, sync the file, and truncate it back to the logical
    /// size so the on-disk file holds only the entries actually written.
    pub fn close(self) -> Result<()> {
        let Index { file, mmap, size } = self;
        mmap.flush()?;
        file.sync_all()?;
        // Unmap before shrinking the file underneath the mapping.
        drop(mmap);
        file.set_len(size)?;
        Ok(())
    }
}
