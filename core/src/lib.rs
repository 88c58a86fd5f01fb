//! deflate-bridge-core
//!
//! Zero-copy-where-possible buffer bridge between a managed runtime and
//! libdeflate: checksums, compression and decompression over heap-resident
//! and fixed-address buffers.
//! No Python, no PyO3.

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod format;

// Views, contexts and the call surfaces over them
pub mod buffer;
pub mod handle;
pub mod bridge;
pub mod result;

// Conveniences on top of the call surfaces
pub mod checksum;
pub mod pool;
pub mod sizing;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::bridge::{
        adler32, adler32_with, compress, compress_to_vec, compress_to_vec_with, compress_with,
        crc32, crc32_with, decompress, decompress_to_vec, decompress_to_vec_with,
        decompress_with, Inline, NativeRunner,
    };
    pub use crate::buffer::{
        tail_length, BufferOrigin, BufferView, FixedBuffer, HeapBuffer, ManagedArray, RawSpan,
        Region, ReleaseMode,
    };
    pub use crate::checksum::{Adler32, Crc32};
    pub use crate::config::BridgeConfig;
    pub use crate::format::Format;
    pub use crate::handle::{CompressorHandle, DecompressorHandle, HandleSlot, NativeHandle};
    pub use crate::pool::HandlePool;
    pub use crate::result::{encode_compress, encode_decompress, DecompressOutcome};
    pub use crate::sizing::buffer_size_hint;
    pub use crate::types::{BridgeError, Result};
}
