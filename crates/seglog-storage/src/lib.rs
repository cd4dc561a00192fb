//! Segmented Storage Engine
//!
//! This crate implements the on-disk layout of the commit log: an ordered
//! collection of segments, each pairing an append-only record file (the
//! store) with a memory-mapped offset table (the index).
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ Log                                           │
//! │  routes appends to the active (tail) segment, │
//! │  rolls when it fills, routes reads by offset  │
//! ├──────────────┬──────────────┬─────────────────┤
//! │ Segment 0    │ Segment 1    │ Segment 2 (tail)│
//! │ 0.store      │ 7.store      │ 14.store        │
//! │ 0.index      │ 7.index      │ 14.index        │
//! └──────────────┴──────────────┴─────────────────┘
//! ```
//!
//! Data flow on append: `Log` → active `Segment` → (`Store::append` →
//! `Index::write`). Data flow on read: `Log` (segment lookup by offset) →
//! `Segment::read` → `Index::read` (relative offset → byte position) →
//! `Store::read` (length-prefixed bytes) → decoded record.
//!
//! ## File formats
//!
//! Both files use big-endian encoding throughout, with no per-file header
//! and no per-record checksum:
//!
//! - `<base_offset>.store`: a concatenation of `u64 length || payload`
//!   frames, where the payload is the record's binary encoding.
//! - `<base_offset>.index`: a concatenation of fixed 12-byte entries,
//!   `u32 relative_offset || u64 position`, memory-mapped over a file
//!   pre-sized to its capacity.
//!
//! ## Concurrency
//!
//! The engine is blocking: every public operation completes under a lock
//! with ordinary file I/O and no suspension points. The [`Log`] holds a
//! readers-writer lock (appends, truncation and the byte-stream reader take
//! the write side; offset reads take the read side), and each [`Store`]
//! serializes its own operations with a mutex. The index needs no lock of
//! its own; all of its callers already hold the log lock.

pub mod config;
pub mod index;
pub mod log;
pub mod reader;
pub mod segment;
pub mod store;

pub use config::{Config, SegmentConfig};
pub use index::Index;
pub use log::Log;
pub use reader::LogReader;
pub use segment::Segment;
pub use store::Store;

pub use seglog_core::{CommitLog, Error, Record, Result};
