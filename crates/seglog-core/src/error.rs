//! Error Types
//!
//! One error enum covers the whole workspace. All functions return
//! `Result<T>`, aliased to `Result<T, Error>`, so `?` propagates cleanly
//! across crate boundaries. The engine never retries internally; I/O errors
//! surface verbatim.
//!
//! `OffsetOutOfRange` is the only domain error a reader sees: the requested
//! offset is below the lowest retained offset or at/above the next one. At
//! the HTTP boundary it maps to `out_of_range`; everything else maps to
//! `internal`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Offset out of range: {0}")]
    OffsetOutOfRange(u64),

    /// The index has no room for another entry. Trips segment roll-over;
    /// never escapes the log's append path.
    #[error("Index full")]
    IndexFull,

    /// Read past the last index entry (or from an empty index).
    #[error("End of index")]
    EndOfIndex,

    #[error("Record decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}
