//! buffer/types.rs
//! The view capability shared by relocatable and fixed-address buffers.
//!
//! A view is acquired for exactly one native call and released exactly once,
//! either committing writes back to the owner or discarding them. Only the
//! window a call actually touches is acquired. Callers of the bridge only see
//! `BufferView`; which implementation they hold decides the acquisition cost,
//! not the contract.

use std::fmt;

use crate::constants::MAX_REGION_LEN;
use crate::types::{BridgeError, Result};

/// What happens to writes made through a view when it is released.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Propagate writes back to the owning buffer.
    Commit,
    /// Discard writes (read-only use, or nothing was produced).
    Abort,
}

/// Where the bytes behind a view live.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferOrigin {
    /// Runtime-managed memory whose address may move between calls.
    Heap,
    /// Memory with an address that is stable for its whole lifetime.
    Fixed,
}

impl fmt::Display for BufferOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferOrigin::Heap => write!(f, "heap"),
            BufferOrigin::Fixed => write!(f, "fixed-address"),
        }
    }
}

/// Base pointer and length of an acquired window. Valid until the view is released.
#[derive(Copy, Clone, Debug)]
pub struct RawSpan {
    pub ptr: *mut u8,
    pub len: usize,
}

// A span is only handed out while its view stays acquired, and the view owns
// or pins the memory, not the thread that acquired it.
unsafe impl Send for RawSpan {}

/// "Give me a stable pointer to these N bytes" for the duration of one native call.
pub trait BufferView {
    /// Pins `len` bytes starting at `offset` and returns a span over them.
    /// Windows outside `0..self.len()` are `OutOfBounds`.
    fn acquire(&mut self, offset: usize, len: usize) -> Result<RawSpan>;

    /// Ends the acquisition. Calling it without a live acquisition is a no-op.
    fn release(&mut self, mode: ReleaseMode);

    /// Total bytes addressable through this view.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_writable(&self) -> bool;

    fn origin(&self) -> BufferOrigin;
}

/// A relocatable, runtime-owned byte container.
///
/// The bridge never holds a pointer into one of these across a call; it only
/// copies a window in and out while the owner is quiescent.
pub trait ManagedArray {
    fn len(&self) -> usize;

    /// Copies `staging.len()` bytes starting at `offset` into `staging`.
    fn read_into(&self, offset: usize, staging: &mut [u8]);

    /// Copies `staging` back over the bytes starting at `offset`. Only called
    /// when writable.
    fn write_back(&mut self, _offset: usize, _staging: &[u8]) {}

    fn is_writable(&self) -> bool {
        false
    }
}

impl ManagedArray for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_into(&self, offset: usize, staging: &mut [u8]) {
        staging.copy_from_slice(&self[offset..offset + staging.len()]);
    }

    fn write_back(&mut self, offset: usize, staging: &[u8]) {
        self[offset..offset + staging.len()].copy_from_slice(staging);
    }

    fn is_writable(&self) -> bool {
        true
    }
}

impl ManagedArray for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn read_into(&self, offset: usize, staging: &mut [u8]) {
        self.as_slice().read_into(offset, staging)
    }

    fn write_back(&mut self, offset: usize, staging: &[u8]) {
        self.as_mut_slice().write_back(offset, staging)
    }

    fn is_writable(&self) -> bool {
        true
    }
}

impl<T: ManagedArray + ?Sized> ManagedArray for &mut T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_into(&self, offset: usize, staging: &mut [u8]) {
        (**self).read_into(offset, staging)
    }

    fn write_back(&mut self, offset: usize, staging: &[u8]) {
        (**self).write_back(offset, staging)
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }
}

/// Shared slices are source-only.
impl ManagedArray for &[u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_into(&self, offset: usize, staging: &mut [u8]) {
        (**self).read_into(offset, staging)
    }
}

/// `{view, offset, length}`: the part of a view one call may touch.
///
/// Offsets arrive as `i32` from the call surface. Lengths derived from the
/// view itself may be larger than any call accepts; they are rejected when the
/// region is acquired, never clamped.
#[derive(Debug)]
pub struct Region<V> {
    view: V,
    offset: i64,
    length: i64,
}

impl<V: BufferView> Region<V> {
    pub fn new(view: V, offset: i32, length: i32) -> Self {
        Self { view, offset: i64::from(offset), length: i64::from(length) }
    }

    /// The whole view, starting at offset 0.
    pub fn whole(view: V) -> Self {
        let length = i64::try_from(view.len()).unwrap_or(i64::MAX);
        Self { view, offset: 0, length }
    }

    /// From `offset` to `offset + length`, or to the end of the view when
    /// `length` is `None`.
    pub fn with_tail(view: V, offset: i32, length: Option<i32>) -> Self {
        let length = match length {
            Some(length) => i64::from(length),
            None => tail_length(view.len(), offset),
        };
        Self { view, offset: i64::from(offset), length }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// The checked `(offset, length)` of this region inside its view.
    pub fn window(&self) -> Result<(usize, usize)> {
        check_bounds(self.offset, self.length, self.view.len())
    }

    /// Acquires exactly the region's window of the view.
    pub(crate) fn acquire(&mut self) -> Result<RawSpan> {
        let (offset, length) = self.window()?;
        self.view.acquire(offset, length)
    }

    pub(crate) fn release(&mut self, mode: ReleaseMode) {
        self.view.release(mode);
    }
}

/// Bytes from `offset` to the end of a view of `view_len` bytes; 0 when the
/// offset is past the end. A negative offset counts from 0 and is rejected on
/// acquisition.
pub fn tail_length(view_len: usize, offset: i32) -> i64 {
    let view_len = i64::try_from(view_len).unwrap_or(i64::MAX);
    view_len.saturating_sub(i64::from(offset.max(0))).max(0)
}

fn check_bounds(offset: i64, length: i64, capacity: usize) -> Result<(usize, usize)> {
    let out_of_bounds = || BridgeError::OutOfBounds { offset, length, capacity };
    let off = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let len = usize::try_from(length).map_err(|_| out_of_bounds())?;
    if len > MAX_REGION_LEN {
        return Err(out_of_bounds());
    }
    match off.checked_add(len) {
        Some(end) if end <= capacity => Ok((off, len)),
        _ => Err(out_of_bounds()),
    }
}

/// Window check for `BufferView::acquire` implementations.
pub(crate) fn ensure_window(offset: usize, len: usize, capacity: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(BridgeError::OutOfBounds {
            offset: i64::try_from(offset).unwrap_or(i64::MAX),
            length: i64::try_from(len).unwrap_or(i64::MAX),
            capacity,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_accept_exact_fit() {
        assert_eq!(check_bounds(2, 3, 5), Ok((2, 3)));
        assert_eq!(check_bounds(5, 0, 5), Ok((5, 0)));
    }

    #[test]
    fn bounds_reject_negative_and_overflow() {
        assert!(check_bounds(-1, 3, 5).is_err());
        assert!(check_bounds(0, -3, 5).is_err());
        assert!(check_bounds(3, 3, 5).is_err());
        assert!(check_bounds(i64::from(i32::MAX), i64::from(i32::MAX), 5).is_err());
    }

    #[test]
    fn bounds_reject_lengths_past_the_call_limit() {
        let too_long = MAX_REGION_LEN as i64 + 1;
        assert_eq!(
            check_bounds(0, too_long, usize::MAX),
            Err(BridgeError::OutOfBounds { offset: 0, length: too_long, capacity: usize::MAX })
        );
        assert!(check_bounds(0, MAX_REGION_LEN as i64, usize::MAX).is_ok());
    }

    #[test]
    fn tail_length_edges() {
        assert_eq!(tail_length(10, 0), 10);
        assert_eq!(tail_length(10, 4), 6);
        assert_eq!(tail_length(10, 10), 0);
        // past the end
        assert_eq!(tail_length(10, 25), 0);
        // negative offsets measure from 0; acquisition rejects the offset itself
        assert_eq!(tail_length(10, -3), 10);
        // longer than any call accepts: reported as-is, not clamped
        let huge = MAX_REGION_LEN + 100;
        assert_eq!(tail_length(huge, 0), huge as i64);
    }

    #[test]
    fn with_tail_rejects_what_it_cannot_represent() {
        let data = [0u8; 8];
        let region = Region::with_tail(crate::buffer::FixedBuffer::from_slice(&data), 9, None);
        assert!(matches!(region.window(), Err(BridgeError::OutOfBounds { offset: 9, .. })));

        let region = Region::with_tail(crate::buffer::FixedBuffer::from_slice(&data), -1, None);
        assert!(matches!(region.window(), Err(BridgeError::OutOfBounds { offset: -1, .. })));

        let region = Region::with_tail(crate::buffer::FixedBuffer::from_slice(&data), 3, None);
        assert_eq!(region.window(), Ok((3, 5)));
    }

    #[test]
    fn window_reads_and_writes_only_touch_the_window() {
        let mut backing = vec![1u8, 2, 3, 4, 5];
        let mut staging = [0u8; 2];
        backing.read_into(1, &mut staging);
        assert_eq!(staging, [2, 3]);
        backing.write_back(3, &[9, 9]);
        assert_eq!(backing, vec![1, 2, 3, 9, 9]);
    }
}
