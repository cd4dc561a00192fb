//! Record Data Structure
//!
//! A record is the unit of data in the log: an opaque byte payload together
//! with the 64-bit offset the log assigned to it. The offset is owned by the
//! log: a producer may set it, but the log overwrites it with the assigned
//! value on both append and read.
//!
//! ## Wire format
//!
//! The on-disk and over-the-wire binary form of a record is its
//! length-delimited protobuf encoding (`value` on field 1, `offset` on
//! field 2), produced and consumed via `prost::Message`. The storage engine
//! treats the encoded bytes as opaque; this schema is the contract between
//! the producer and consumer surfaces.
//!
//! JSON (for the HTTP API) comes from the serde derives; the payload
//! serializes as a byte array.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single record in the commit log.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
pub struct Record {
    /// Opaque payload bytes.
    #[prost(bytes = "bytes", tag = "1")]
    #[serde(default)]
    pub value: Bytes,

    /// Offset assigned by the log at append time.
    #[prost(uint64, tag = "2")]
    #[serde(default)]
    pub offset: u64,
}

impl Record {
    /// Create a record from a payload. The offset is assigned by the log on
    /// append; the zero placeholder here is overwritten.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }
}
