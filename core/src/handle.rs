//! handle.rs
//! Opaque libdeflate contexts with explicit, caller-owned lifetimes.
//!
//! A handle is created once, borrowed mutably by any number of bridge calls,
//! and destroyed once by its owner. Handles have no `Drop`: a handle that is
//! never passed to `destroy` is leaked.
//!
//! Handles are `Send` but not `Sync`: libdeflate mutates per-instance state in
//! place, so one handle serves one thread and one call at a time, while
//! distinct handles may run on distinct threads.

use std::ffi::c_void;
use std::ptr::NonNull;

use libdeflate_sys::{
    libdeflate_alloc_compressor, libdeflate_alloc_decompressor, libdeflate_compressor,
    libdeflate_decompressor, libdeflate_deflate_compress, libdeflate_deflate_compress_bound,
    libdeflate_deflate_decompress_ex, libdeflate_free_compressor, libdeflate_free_decompressor,
    libdeflate_gzip_compress, libdeflate_gzip_compress_bound, libdeflate_gzip_decompress_ex,
    libdeflate_result_LIBDEFLATE_BAD_DATA, libdeflate_result_LIBDEFLATE_INSUFFICIENT_SPACE,
    libdeflate_result_LIBDEFLATE_SUCCESS, libdeflate_zlib_compress,
    libdeflate_zlib_compress_bound, libdeflate_zlib_decompress_ex,
};
use log::{debug, warn};

use crate::buffer::RawSpan;
use crate::constants::{MAX_LEVEL, MIN_LEVEL};
use crate::format::Format;
use crate::types::{BridgeError, HandleKind, Result};

/// Outcome reported by libdeflate for one decompress call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NativeStatus {
    Ok,
    BadInput,
    InsufficientSpace,
}

pub struct CompressorHandle {
    ptr: NonNull<libdeflate_compressor>,
    level: i32,
}

unsafe impl Send for CompressorHandle {}

impl CompressorHandle {
    pub fn create(level: i32) -> Result<Self> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(BridgeError::InvalidLevel { level });
        }
        // SAFETY: plain allocation, NULL is handled below.
        let raw = unsafe { libdeflate_alloc_compressor(level) };
        let ptr = NonNull::new(raw).ok_or(BridgeError::HandleAllocation {
            kind: HandleKind::Compressor,
        })?;
        debug!("allocated compressor {:p} (level {level})", ptr.as_ptr());
        Ok(Self { ptr, level })
    }

    pub fn destroy(self) {
        debug!("freeing compressor {:p}", self.ptr.as_ptr());
        // SAFETY: `self` is consumed, so the context cannot be used again.
        unsafe { libdeflate_free_compressor(self.ptr.as_ptr()) };
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Worst-case compressed size of `len` input bytes with this context and framing.
    pub fn compress_bound(&self, format: Format, len: usize) -> usize {
        let ptr = self.ptr.as_ptr();
        // SAFETY: the bound functions only read the context's parameters.
        unsafe {
            match format {
                Format::Deflate => libdeflate_deflate_compress_bound(ptr, len),
                Format::Zlib => libdeflate_zlib_compress_bound(ptr, len),
                Format::Gzip => libdeflate_gzip_compress_bound(ptr, len),
            }
        }
    }

    /// Returns the compressed size, or 0 if `out` was too small.
    ///
    /// # Safety
    /// `input` must be readable and `output` writable for their full lengths,
    /// and the two spans must not overlap.
    pub(crate) unsafe fn compress_raw(
        &mut self,
        input: RawSpan,
        output: RawSpan,
        format: Format,
    ) -> usize {
        let ctx = self.ptr.as_ptr();
        let (in_len, out_len) = (input.len, output.len);
        let (input, out) = (input.ptr as *const c_void, output.ptr as *mut c_void);
        match format {
            Format::Deflate => libdeflate_deflate_compress(ctx, input, in_len, out, out_len),
            Format::Zlib => libdeflate_zlib_compress(ctx, input, in_len, out, out_len),
            Format::Gzip => libdeflate_gzip_compress(ctx, input, in_len, out, out_len),
        }
    }
}

pub struct DecompressorHandle {
    ptr: NonNull<libdeflate_decompressor>,
}

unsafe impl Send for DecompressorHandle {}

impl DecompressorHandle {
    pub fn create() -> Result<Self> {
        // SAFETY: plain allocation, NULL is handled below.
        let raw = unsafe { libdeflate_alloc_decompressor() };
        let ptr = NonNull::new(raw).ok_or(BridgeError::HandleAllocation {
            kind: HandleKind::Decompressor,
        })?;
        debug!("allocated decompressor {:p}", ptr.as_ptr());
        Ok(Self { ptr })
    }

    pub fn destroy(self) {
        debug!("freeing decompressor {:p}", self.ptr.as_ptr());
        // SAFETY: `self` is consumed, so the context cannot be used again.
        unsafe { libdeflate_free_decompressor(self.ptr.as_ptr()) };
    }

    /// Returns `(consumed, produced, status)`.
    ///
    /// # Safety
    /// Same pointer requirements as [`CompressorHandle::compress_raw`].
    pub(crate) unsafe fn decompress_raw(
        &mut self,
        input: RawSpan,
        output: RawSpan,
        format: Format,
    ) -> (usize, usize, NativeStatus) {
        let ctx = self.ptr.as_ptr();
        let (in_len, out_len) = (input.len, output.len);
        let (input, out) = (input.ptr as *const c_void, output.ptr as *mut c_void);
        let mut consumed: usize = 0;
        let mut produced: usize = 0;
        let ret = match format {
            Format::Deflate => libdeflate_deflate_decompress_ex(
                ctx, input, in_len, out, out_len, &mut consumed, &mut produced,
            ),
            Format::Zlib => libdeflate_zlib_decompress_ex(
                ctx, input, in_len, out, out_len, &mut consumed, &mut produced,
            ),
            Format::Gzip => libdeflate_gzip_decompress_ex(
                ctx, input, in_len, out, out_len, &mut consumed, &mut produced,
            ),
        };
        let status = match ret {
            r if r == libdeflate_result_LIBDEFLATE_SUCCESS => NativeStatus::Ok,
            r if r == libdeflate_result_LIBDEFLATE_INSUFFICIENT_SPACE => {
                NativeStatus::InsufficientSpace
            }
            r if r == libdeflate_result_LIBDEFLATE_BAD_DATA => NativeStatus::BadInput,
            // SHORT_OUTPUT cannot happen when the produced count is requested.
            _ => NativeStatus::BadInput,
        };
        (consumed, produced, status)
    }
}

/// A context whose release is an explicit call.
pub trait NativeHandle: Send {
    const KIND: HandleKind;

    fn destroy(self);
}

impl NativeHandle for CompressorHandle {
    const KIND: HandleKind = HandleKind::Compressor;

    fn destroy(self) {
        CompressorHandle::destroy(self)
    }
}

impl NativeHandle for DecompressorHandle {
    const KIND: HandleKind = HandleKind::Decompressor;

    fn destroy(self) {
        DecompressorHandle::destroy(self)
    }
}

/// Holder for a handle owned by a runtime object.
///
/// The slot is emptied only by `take` or `destroy`. Dropping a slot that
/// still holds a handle never frees it; the context is leaked and a warning
/// is logged, so release stays tied to an explicit call.
pub struct HandleSlot<H: NativeHandle> {
    handle: Option<H>,
}

impl<H: NativeHandle> HandleSlot<H> {
    pub fn new(handle: H) -> Self {
        Self { handle: Some(handle) }
    }

    pub fn get(&self) -> Result<&H> {
        self.handle.as_ref().ok_or(BridgeError::HandleDestroyed { kind: H::KIND })
    }

    pub fn get_mut(&mut self) -> Result<&mut H> {
        self.handle.as_mut().ok_or(BridgeError::HandleDestroyed { kind: H::KIND })
    }

    /// Moves the handle out, leaving the slot empty.
    pub fn take(&mut self) -> Option<H> {
        self.handle.take()
    }

    /// Destroys the held handle. Destroying an empty slot is a no-op.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.destroy();
        }
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}

impl<H: NativeHandle> Drop for HandleSlot<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            warn!("{} dropped without an explicit destroy; context leaked", H::KIND);
            std::mem::forget(handle);
        }
    }
}
