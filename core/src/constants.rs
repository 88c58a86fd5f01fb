//! constants.rs
//! Stable format tags, result-encoding masks and defaults.

/// Stable format tags (i32) used on the call surface.
pub mod format_tags {
    pub const DEFLATE: i32 = 0;
    pub const ZLIB: i32    = 1;
    pub const GZIP: i32    = 2;
}

/// Framing bytes added on top of the raw DEFLATE stream.
pub const ZLIB_FRAMING_OVERHEAD: usize = 6;  // 2-byte header + adler32
pub const GZIP_FRAMING_OVERHEAD: usize = 18; // 10-byte header + crc32 + isize

/// libdeflate accepts levels 0 (store only) through 12.
pub const MIN_LEVEL: i32 = 0;
pub const MAX_LEVEL: i32 = 12;
pub const DEFAULT_LEVEL: i32 = 6;

/// Largest region one call may touch; counts are reported in 31 bits.
pub const MAX_REGION_LEN: usize = i32::MAX as usize;

/// Result encoding for the compress call surface.
pub const COMPRESS_ACQUISITION_FAILED: i32 = -1;

/// Result encoding for the decompress call surface.
/// High half: bytes consumed. Low half: bytes produced, top bit = insufficient space.
pub const INSUFFICIENT_SPACE_FLAG: u32 = 0x8000_0000;
pub const PRODUCED_MASK: u32 = 0x7fff_ffff;

/// Block size used by the cheap destination size estimate.
pub const SIZE_HINT_BLOCK: usize = 5000;
pub const SIZE_HINT_BLOCK_OVERHEAD: usize = 5;

/// Decompression growth defaults.
pub const DEFAULT_GROWTH_FACTOR: usize = 4;
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 256 * 1024 * 1024;

/// Idle handles kept per compression level (and for decompressors).
pub const DEFAULT_POOL_CAPACITY: usize = 8;
