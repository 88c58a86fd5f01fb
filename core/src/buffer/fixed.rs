//! buffer/fixed.rs
//! Fixed-address buffer view: the pointer is used as-is, no copy, no lifecycle.

use std::marker::PhantomData;

use crate::buffer::types::{ensure_window, BufferOrigin, BufferView, RawSpan, ReleaseMode};
use crate::types::Result;

pub struct FixedBuffer<'a> {
    ptr: *mut u8,
    len: usize,
    writable: bool,
    _marker: PhantomData<&'a mut [u8]>,
}

// A FixedBuffer is a borrowed byte slice in raw form.
unsafe impl Send for FixedBuffer<'_> {}

impl<'a> FixedBuffer<'a> {
    /// Read-only view; usable as a source only.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self {
            ptr: bytes.as_ptr() as *mut u8,
            len: bytes.len(),
            writable: false,
            _marker: PhantomData,
        }
    }

    pub fn from_mut_slice(bytes: &'a mut [u8]) -> Self {
        Self {
            ptr: bytes.as_mut_ptr(),
            len: bytes.len(),
            writable: true,
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `ptr` must be valid for reads and writes of `len` bytes for `'a`, and
    /// nothing else may access that memory while the view is in use.
    pub unsafe fn from_raw_parts(ptr: *mut u8, len: usize) -> Self {
        Self { ptr, len, writable: true, _marker: PhantomData }
    }

    /// # Safety
    /// `ptr` must be valid for reads of `len` bytes for `'a`.
    pub unsafe fn from_raw_parts_readonly(ptr: *const u8, len: usize) -> Self {
        Self { ptr: ptr as *mut u8, len, writable: false, _marker: PhantomData }
    }
}

impl BufferView for FixedBuffer<'_> {
    fn acquire(&mut self, offset: usize, len: usize) -> Result<RawSpan> {
        ensure_window(offset, len, self.len)?;
        // SAFETY: offset + len <= self.len was checked above.
        let ptr = unsafe { self.ptr.add(offset) };
        Ok(RawSpan { ptr, len })
    }

    fn release(&mut self, _mode: ReleaseMode) {}

    fn len(&self) -> usize {
        self.len
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn origin(&self) -> BufferOrigin {
        BufferOrigin::Fixed
    }
}
