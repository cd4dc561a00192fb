//! The log: an ordered collection of segments behind one lock.
//!
//! Appends always land in the active (tail) segment; when that segment is
//! maxed the log rolls first, so an append never half-lands in a full
//! segment. Reads route to whichever segment covers the offset. Truncation
//! drops whole segments from the front. Startup rebuilds the segment list
//! from the data directory alone; the file names carry the base offsets.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use seglog_core::{CommitLog, Error, Record, Result};

use crate::config::Config;
use crate::reader::LogReader;
use crate::segment::Segment;

#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: Config,
    /// Ordered by base offset ascending; the last segment is the active one.
    /// Non-empty from open until close.
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open the log rooted at `dir`, creating the directory if needed.
    ///
    /// Every `<base>.store` / `<base>.index` pair found is reopened as a
    /// segment, sorted by base offset. Files whose stem does not parse as an
    /// offset are ignored. An empty directory is seeded with one segment at
    /// `config.segment.initial_offset`.
    pub fn open(dir: impl AsRef<Path>, mut config: Config) -> Result<Self> {
        // Zero limits mean "use the default"; a zero-byte index could not
        // even be mapped.
        let defaults = crate::config::SegmentConfig::default();
        if config.segment.max_store_bytes == 0 {
            config.segment.max_store_bytes = defaults.max_store_bytes;
        }
        if config.segment.max_index_bytes == 0 {
            config.segment.max_index_bytes = defaults.max_index_bytes;
        }

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut bases = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(base) = stem.parse::<u64>() else {
                continue;
            };
            bases.push(base);
        }
        bases.sort_unstable();
        // Each base offset appears twice, once per file extension.
        bases.dedup();

        let mut segments = Vec::with_capacity(bases.len().max(1));
        for base in bases {
            segments.push(Segment::open(&dir, base, config.clone())?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(
                &dir,
                config.segment.initial_offset,
                config.clone(),
            )?);
        }

        info!(
            dir = %dir.display(),
            segments = segments.len(),
            next_offset = segments.last().map(Segment::next_offset),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Append a record to the active segment, rolling first if it is maxed.
    /// Returns the offset assigned to the record.
    pub fn append(&self, record: Record) -> Result<u64> {
        let mut segments = self.write_lock();

        let active = segments.last().expect("log always has an active segment");
        if active.is_maxed() {
            let base = active.next_offset();
            debug!(base_offset = base, "rolling to a new segment");
            segments.push(Segment::open(&self.dir, base, self.config.clone())?);
        }

        segments
            .last_mut()
            .expect("log always has an active segment")
            .append(record)
    }

    /// Read the record at `offset` from whichever segment covers it.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.read_lock();
        segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset())
            .ok_or(Error::OffsetOutOfRange(offset))?
            .read(offset)
    }

    /// Base offset of the oldest retained segment.
    pub fn lowest_offset(&self) -> u64 {
        self.read_lock()
            .first()
            .expect("log always has an active segment")
            .base_offset()
    }

    /// Offset of the most recently appended record, or 0 when nothing has
    /// ever been appended.
    pub fn highest_offset(&self) -> u64 {
        let next = self
            .read_lock()
            .last()
            .expect("log always has an active segment")
            .next_offset();
        if next == 0 {
            0
        } else {
            next - 1
        }
    }

    /// Drop and unlink every segment whose highest offset is below `lowest`.
    /// The segment containing `lowest` is kept whole, and the active segment
    /// is never dropped, so the log always retains a tail to append into.
    /// Removal is attempted for every dropped segment; the first error is
    /// returned.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.write_lock();

        let old = std::mem::take(&mut *segments);
        let count = old.len();
        let mut first_err = None;

        for (i, segment) in old.into_iter().enumerate() {
            if segment.next_offset() > lowest || i + 1 == count {
                segments.push(segment);
                continue;
            }
            if let Err(e) = segment.remove() {
                warn!(error = %e, "failed to remove truncated segment");
                first_err.get_or_insert(e);
            }
        }

        info!(lowest, segments = segments.len(), "log truncated");
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// A reader over the concatenation of every segment's raw store bytes,
    /// in segment order. Sizes are pinned at snapshot time: bytes appended
    /// after this call are not observed through the returned reader.
    pub fn reader(&self) -> LogReader {
        let segments = self.write_lock();
        LogReader::new(
            segments
                .iter()
                .map(|s| (s.store().clone(), s.store().size()))
                .collect(),
        )
    }

    /// Close every segment, best-effort: all closes are attempted and the
    /// first error is returned.
    pub fn close(self) -> Result<()> {
        let segments = self
            .segments
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let mut first_err = None;
        for segment in segments {
            if let Err(e) = segment.close() {
                warn!(error = %e, "failed to close segment");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close the log, then delete its directory.
    pub fn remove(self) -> Result<()> {
        let dir = self.dir.clone();
        self.close()?;
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Vec<Segment>> {
        self.segments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Vec<Segment>> {
        self.segments
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> Result<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> Result<Record> {
        Log::read(self, offset)
    }

    fn lowest_offset(&self) -> u64 {
        Log::lowest_offset(self)
    }
}
