//! A segment: one store and one index sharing a base offset.
//!
//! The segment owns offset arithmetic. It assigns absolute offsets on
//! append, translates them to index-relative offsets, and resolves reads
//! back through the index to a store position. Records cross this boundary
//! as their binary encoding; the store never looks inside them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prost::Message;

use seglog_core::{Error, Record, Result};

use crate::config::Config;
use crate::index::Index;
use crate::store::Store;

#[derive(Debug)]
pub struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: Config,
    store_path: PathBuf,
    index_path: PathBuf,
}

impl Segment {
    /// Open (or create) the `<base_offset>.store` / `<base_offset>.index`
    /// pair under `dir`. If the index already holds entries, `next_offset`
    /// resumes one past the last of them.
    pub fn open(dir: &Path, base_offset: u64, config: Config) -> Result<Self> {
        let store_path = dir.join(format!("{base_offset}.store"));
        let index_path = dir.join(format!("{base_offset}.index"));

        let store = Arc::new(Store::open(&store_path)?);
        let index = Index::open(&index_path, config.segment.max_index_bytes)?;

        let next_offset = match index.read(-1) {
            Ok((off, _)) => base_offset + u64::from(off) + 1,
            Err(Error::EndOfIndex) => base_offset,
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
            store_path,
            index_path,
        })
    }

    /// Append a record, assigning it the segment's next offset. The store
    /// write lands first; only once the entry is indexed does `next_offset`
    /// advance, so a full index leaves at most an unindexed store frame
    /// behind. The log avoids even that by rolling before the append.
    pub fn append(&mut self, mut record: Record) -> Result<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let encoded = record.encode_to_vec();
        let (_, pos) = self.store.append(&encoded)?;
        self.index
            .write((offset - self.base_offset) as u32, pos)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at absolute offset `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let (_, pos) = self.index.read((offset - self.base_offset) as i64)?;
        let encoded = self.store.read(pos)?;

        let mut record = Record::decode(&encoded[..])?;
        record.offset = offset;
        Ok(record)
    }

    /// Whether either half has reached its configured limit.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.segment.max_store_bytes || self.index.is_full()
    }

    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// The offset the segment would assign on its next append.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    pub(crate) fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Close both halves: the index flushes its map and truncates to its
    /// logical size, the store flushes its write buffer. Both release steps
    /// run even if one fails; the first failure is returned.
    pub fn close(self) -> Result<()> {
        let index_result = self.index.close();
        let store_result = self.store.flush();
        index_result?;
        store_result?;
        Ok(())
    }

    /// Close, then unlink both files.
    pub fn remove(self) -> Result<()> {
        let store_path = self.store_path.clone();
        let index_path = self.index_path.clone();
        self.close()?;
        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentConfig;
    use crate::index::ENT_WIDTH;
    use bytes::Bytes;
    use tempfile::TempDir;

    const BASE_OFFSET: u64 = 16;

    fn record() -> Record {
        Record::new(Bytes::from("hello world!"))
    }

    #[test]
    fn append_read_and_roll_by_index() {
        let dir = TempDir::new().expect("tempdir");

        let mut config = Config::default();
        config.segment = SegmentConfig {
            max_store_bytes: 1024,
            max_index_bytes: ENT_WIDTH * 3,
            initial_offset: 0,
        };

        let mut segment = Segment::open(dir.path(), BASE_OFFSET, config.clone()).expect("open");
        assert_eq!(
            segment.next_offset(),
            BASE_OFFSET,
            "next offset is the base offset for an empty segment"
        );
        assert!(!segment.is_maxed());

        for i in 0..3 {
            let offset = segment.append(record()).expect("append");
            assert_eq!(offset, BASE_OFFSET + i);

            let got = segment.read(offset).expect("read");
            assert_eq!(got.value, record().value);
            assert_eq!(got.offset, offset);
        }

        // Index is full; the fourth append fails.
        assert!(matches!(segment.append(record()), Err(Error::IndexFull)));
        assert!(segment.is_maxed());

        // Reopen with a store limit three records can already exceed.
        let encoded_len = record().encode_to_vec().len() as u64;
        config.segment.max_store_bytes = encoded_len * 3;
        config.segment.max_index_bytes = 1024;

        let segment = Segment::open(dir.path(), BASE_OFFSET, config.clone()).expect("reopen");
        assert!(segment.is_maxed());

        // Remove unlinks both files; a fresh segment starts empty.
        segment.remove().expect("remove");
        let segment = Segment::open(dir.path(), BASE_OFFSET, config).expect("recreate");
        assert!(!segment.is_maxed());
        assert_eq!(segment.next_offset(), BASE_OFFSET);
    }

    #[test]
    fn reopen_resumes_next_offset() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::default();

        let mut segment = Segment::open(dir.path(), BASE_OFFSET, config.clone()).expect("open");
        for _ in 0..3 {
            segment.append(record()).expect("append");
        }
        segment.close().expect("close");

        let segment = Segment::open(dir.path(), BASE_OFFSET, config).expect("reopen");
        assert_eq!(segment.next_offset(), BASE_OFFSET + 3);
    }
}
