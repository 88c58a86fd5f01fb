//! buffer/mod.rs
//! Views over caller-owned bytes.
//!
//! - `HeapBuffer`: relocatable runtime memory, staged for the call.
//! - `FixedBuffer`: stable-address memory, passed straight through.
//! - `Region`: the `{view, offset, length}` slice of a view one call touches.

pub mod fixed;
pub mod heap;
pub mod types;

pub use fixed::FixedBuffer;
pub use heap::HeapBuffer;
pub use types::*;
