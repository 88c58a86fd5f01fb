//! types.rs
//! Unified bridge error.
//!
//! Every call surface reports through `BridgeError`; the Python layer maps the
//! variants onto runtime exceptions and the result encoder maps them onto
//! scalar sentinels where the call surface demands one.

use std::fmt;

use thiserror::Error;

use crate::buffer::BufferOrigin;
use crate::format::Format;

/// Which kind of native context failed to allocate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandleKind {
    Compressor,
    Decompressor,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Compressor => write!(f, "compressor"),
            HandleKind::Decompressor => write!(f, "decompressor"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The runtime could not produce a stable view over a buffer.
    #[error("could not acquire a stable view over {len} bytes of {origin} memory")]
    AcquisitionFailure { origin: BufferOrigin, len: usize },

    /// libdeflate rejected the source bytes for the declared framing.
    #[error("malformed {format} input")]
    MalformedInput { format: Format },

    #[error("region [{offset}, {offset}+{length}) is outside a buffer of {capacity} bytes")]
    OutOfBounds { offset: i64, length: i64, capacity: usize },

    #[error("destination buffer is read-only")]
    ReadOnlyDestination,

    #[error("source and destination regions overlap")]
    OverlappingRegions,

    #[error("compression level {level} is outside 0..=12")]
    InvalidLevel { level: i32 },

    #[error("libdeflate could not allocate a {kind}")]
    HandleAllocation { kind: HandleKind },

    /// The handle was already destroyed or returned.
    #[error("{kind} handle already destroyed")]
    HandleDestroyed { kind: HandleKind },

    #[error("unknown format tag: {tag}")]
    UnknownFormat { tag: i32 },

    /// Growing decompression hit the configured output ceiling.
    #[error("decompressed output would exceed {limit} bytes")]
    OutputLimitExceeded { limit: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
