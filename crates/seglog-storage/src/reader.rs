//! A sequential reader over the log's concatenated store bytes.
//!
//! Useful for snapshotting or shipping the raw backing stream elsewhere:
//! the bytes come out exactly as framed on disk, length prefixes included.

use std::io::{self, Read};
use std::sync::Arc;

use crate::store::Store;

/// Reads each segment store in order, up to the size pinned when the reader
/// was created. The reader shares the store handles, so truncation may
/// unlink files underneath it; already-open handles keep reading.
#[derive(Debug)]
pub struct LogReader {
    stores: Vec<StoreSlice>,
    current: usize,
}

#[derive(Debug)]
struct StoreSlice {
    store: Arc<Store>,
    /// Store size at snapshot time; bytes past this are not observed.
    size: u64,
    pos: u64,
}

impl LogReader {
    pub(crate) fn new(stores: Vec<(Arc<Store>, u64)>) -> Self {
        Self {
            stores: stores
                .into_iter()
                .map(|(store, size)| StoreSlice {
                    store,
                    size,
                    pos: 0,
                })
                .collect(),
            current: 0,
        }
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(slice) = self.stores.get_mut(self.current) {
            if slice.pos >= slice.size {
                self.current += 1;
                continue;
            }

            let want = buf.len().min((slice.size - slice.pos) as usize);
            let n = slice.store.read_at(&mut buf[..want], slice.pos)?;
            if n == 0 {
                // The file ended short of the pinned size; move on.
                self.current += 1;
                continue;
            }

            slice.pos += n as u64;
            return Ok(n);
        }

        Ok(0)
    }
}
