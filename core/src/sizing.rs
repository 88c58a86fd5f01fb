//! sizing.rs
//! Destination size estimates for compression.

use crate::constants::{SIZE_HINT_BLOCK, SIZE_HINT_BLOCK_OVERHEAD};
use crate::format::Format;

/// Cheap worst-case compressed size for `len` input bytes, without a context.
///
/// Stored DEFLATE blocks cost 5 bytes per 5000-byte block, at least one block,
/// plus the framing header and trailer. For the exact libdeflate bound use
/// [`crate::handle::CompressorHandle::compress_bound`].
pub fn buffer_size_hint(len: usize, format: Format) -> usize {
    let blocks = len.div_ceil(SIZE_HINT_BLOCK).max(1);
    len.saturating_add(blocks * SIZE_HINT_BLOCK_OVERHEAD)
        .saturating_add(format.framing_overhead())
}
