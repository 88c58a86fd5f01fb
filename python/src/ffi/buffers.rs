//! ffi/buffers.rs
//! Turns Python objects into bridge views.
//!
//! `bytes` and `bytearray` are relocatable runtime arrays and take the heap
//! path. Anything else exporting a C-contiguous byte buffer (memoryview,
//! mmap, numpy arrays, ...) takes the fixed-address path and is pinned by the
//! held `PyBuffer` for as long as the view lives.
//!
//! Views are built and acquired with the GIL held; `GilReleased` then runs
//! the native call itself without it.

use deflate_bridge_core::bridge::NativeRunner;
use deflate_bridge_core::buffer::{
    BufferOrigin, BufferView, FixedBuffer, HeapBuffer, ManagedArray, RawSpan, ReleaseMode,
};
use deflate_bridge_core::types::Result;
use pyo3::buffer::PyBuffer;
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyByteArray, PyBytes};

pub enum PyHeapArray<'py> {
    Bytes(Bound<'py, PyBytes>),
    ByteArray(Bound<'py, PyByteArray>),
}

impl ManagedArray for PyHeapArray<'_> {
    fn len(&self) -> usize {
        match self {
            PyHeapArray::Bytes(b) => b.as_bytes().len(),
            PyHeapArray::ByteArray(b) => b.len(),
        }
    }

    fn read_into(&self, offset: usize, staging: &mut [u8]) {
        let end = offset + staging.len();
        match self {
            PyHeapArray::Bytes(b) => staging.copy_from_slice(&b.as_bytes()[offset..end]),
            // SAFETY: the GIL is held and no Python code runs during the copy.
            PyHeapArray::ByteArray(b) => {
                staging.copy_from_slice(unsafe { &b.as_bytes()[offset..end] })
            }
        }
    }

    fn write_back(&mut self, offset: usize, staging: &[u8]) {
        if let PyHeapArray::ByteArray(b) = self {
            // SAFETY: as above. Another thread may have resized the array while
            // the GIL was released, so the window is looked up again.
            let target = unsafe { b.as_bytes_mut() };
            match target.get_mut(offset..offset + staging.len()) {
                Some(window) => window.copy_from_slice(staging),
                None => log::warn!("bytearray shrank during the call; output discarded"),
            }
        }
    }

    fn is_writable(&self) -> bool {
        matches!(self, PyHeapArray::ByteArray(_))
    }
}

/// A view over any byte-like Python object.
pub enum PyView<'py> {
    Heap(HeapBuffer<PyHeapArray<'py>>),
    Fixed {
        view: FixedBuffer<'static>,
        // Keeps the exporter's memory pinned; released on drop.
        _guard: PyBuffer<u8>,
    },
}

impl BufferView for PyView<'_> {
    fn acquire(&mut self, offset: usize, len: usize) -> Result<RawSpan> {
        match self {
            PyView::Heap(v) => v.acquire(offset, len),
            PyView::Fixed { view, .. } => view.acquire(offset, len),
        }
    }

    fn release(&mut self, mode: ReleaseMode) {
        match self {
            PyView::Heap(v) => v.release(mode),
            PyView::Fixed { view, .. } => view.release(mode),
        }
    }

    fn len(&self) -> usize {
        match self {
            PyView::Heap(v) => v.len(),
            PyView::Fixed { view, .. } => view.len(),
        }
    }

    fn is_writable(&self) -> bool {
        match self {
            PyView::Heap(v) => v.is_writable(),
            PyView::Fixed { view, .. } => view.is_writable(),
        }
    }

    fn origin(&self) -> BufferOrigin {
        match self {
            PyView::Heap(_) => BufferOrigin::Heap,
            PyView::Fixed { .. } => BufferOrigin::Fixed,
        }
    }
}

/// Builds a view over `obj`. `budget` caps heap staging copies.
pub fn view_for<'py>(obj: &Bound<'py, PyAny>, budget: Option<usize>) -> PyResult<PyView<'py>> {
    if let Ok(bytes) = obj.downcast::<PyBytes>() {
        let array = PyHeapArray::Bytes(bytes.clone());
        return Ok(PyView::Heap(HeapBuffer::with_budget(array, budget)));
    }
    if let Ok(bytearray) = obj.downcast::<PyByteArray>() {
        let array = PyHeapArray::ByteArray(bytearray.clone());
        return Ok(PyView::Heap(HeapBuffer::with_budget(array, budget)));
    }

    let guard = PyBuffer::<u8>::get_bound(obj)?;
    if !guard.is_c_contiguous() {
        return Err(PyTypeError::new_err("buffer must be C-contiguous"));
    }
    let ptr = guard.buf_ptr() as *mut u8;
    let len = guard.len_bytes();
    // SAFETY: the exporter keeps `ptr..ptr+len` alive and in place until
    // `guard` is dropped, which happens together with the view.
    let view = unsafe {
        if guard.readonly() {
            FixedBuffer::from_raw_parts_readonly(ptr, len)
        } else {
            FixedBuffer::from_raw_parts(ptr, len)
        }
    };
    Ok(PyView::Fixed { view, _guard: guard })
}

/// Runs native work with the GIL released so other Python threads proceed.
#[derive(Copy, Clone)]
pub struct GilReleased<'py>(pub Python<'py>);

impl NativeRunner for GilReleased<'_> {
    fn run<T, F>(&self, f: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        self.0.allow_threads(f)
    }
}
