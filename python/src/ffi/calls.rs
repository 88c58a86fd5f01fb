//! ffi/calls.rs
//! Low-level call surface: opaque handles plus one function per native call,
//! returning the same scalar encodings a native caller would see.
//!
//! A handle object is released only by `destroy_compressor` /
//! `destroy_decompressor`. One that is collected while still live leaks its
//! context and logs a warning.

use deflate_bridge_core::bridge;
use deflate_bridge_core::buffer::Region;
use deflate_bridge_core::format::Format;
use deflate_bridge_core::handle::{CompressorHandle, DecompressorHandle, HandleSlot};
use deflate_bridge_core::result::{encode_compress, encode_decompress};
use deflate_bridge_core::sizing;
use pyo3::prelude::*;

use super::buffers::{view_for, GilReleased};
use super::errors::into_py_err;
use super::state;

/// Opaque compressor context. Freed by `destroy_compressor`.
#[pyclass(name = "CompressorHandle", module = "deflate_bridge")]
pub struct PyCompressorHandle {
    inner: HandleSlot<CompressorHandle>,
}

impl PyCompressorHandle {
    fn get(&mut self) -> PyResult<&mut CompressorHandle> {
        self.inner.get_mut().map_err(into_py_err)
    }
}

#[pymethods]
impl PyCompressorHandle {
    #[getter]
    fn level(&self) -> Option<i32> {
        self.inner.get().ok().map(CompressorHandle::level)
    }

    #[getter]
    fn closed(&self) -> bool {
        !self.inner.is_live()
    }

    fn __repr__(&self) -> String {
        match self.inner.get() {
            Ok(h) => format!("<CompressorHandle level={}>", h.level()),
            Err(_) => "<CompressorHandle destroyed>".to_string(),
        }
    }
}

/// Opaque decompressor context. Freed by `destroy_decompressor`.
#[pyclass(name = "DecompressorHandle", module = "deflate_bridge")]
pub struct PyDecompressorHandle {
    inner: HandleSlot<DecompressorHandle>,
}

impl PyDecompressorHandle {
    fn get(&mut self) -> PyResult<&mut DecompressorHandle> {
        self.inner.get_mut().map_err(into_py_err)
    }
}

#[pymethods]
impl PyDecompressorHandle {
    #[getter]
    fn closed(&self) -> bool {
        !self.inner.is_live()
    }

    fn __repr__(&self) -> String {
        if self.inner.is_live() {
            "<DecompressorHandle>".to_string()
        } else {
            "<DecompressorHandle destroyed>".to_string()
        }
    }
}

fn checksum_call(
    py: Python<'_>,
    seed: u32,
    buf: &Bound<'_, PyAny>,
    offset: i32,
    length: i32,
    adler: bool,
) -> PyResult<u32> {
    let view = view_for(buf, state::current().staging_budget)?;
    let mut region = Region::new(view, offset, length);
    let runner = GilReleased(py);
    let result = if adler {
        bridge::adler32_with(&runner, seed, &mut region)
    } else {
        bridge::crc32_with(&runner, seed, &mut region)
    };
    result.map_err(into_py_err)
}

#[pyfunction]
pub fn crc32(
    py: Python<'_>,
    seed: u32,
    buf: &Bound<'_, PyAny>,
    offset: i32,
    length: i32,
) -> PyResult<u32> {
    checksum_call(py, seed, buf, offset, length, false)
}

#[pyfunction]
pub fn adler32(
    py: Python<'_>,
    seed: u32,
    buf: &Bound<'_, PyAny>,
    offset: i32,
    length: i32,
) -> PyResult<u32> {
    checksum_call(py, seed, buf, offset, length, true)
}

#[pyfunction]
pub fn create_compressor(level: i32) -> PyResult<PyCompressorHandle> {
    let handle = CompressorHandle::create(level).map_err(into_py_err)?;
    Ok(PyCompressorHandle { inner: HandleSlot::new(handle) })
}

/// Frees the context. Destroying twice is a no-op.
#[pyfunction]
pub fn destroy_compressor(mut handle: PyRefMut<'_, PyCompressorHandle>) {
    handle.inner.destroy();
}

#[pyfunction]
pub fn create_decompressor() -> PyResult<PyDecompressorHandle> {
    let handle = DecompressorHandle::create().map_err(into_py_err)?;
    Ok(PyDecompressorHandle { inner: HandleSlot::new(handle) })
}

#[pyfunction]
pub fn destroy_decompressor(mut handle: PyRefMut<'_, PyDecompressorHandle>) {
    handle.inner.destroy();
}

/// Returns bytes written, 0 if `dst` was too small, -1 if a buffer could not
/// be acquired. Unrecognized format tags compress as gzip.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
pub fn compress(
    py: Python<'_>,
    mut handle: PyRefMut<'_, PyCompressorHandle>,
    src: &Bound<'_, PyAny>,
    src_offset: i32,
    src_length: i32,
    dst: &Bound<'_, PyAny>,
    dst_offset: i32,
    dst_capacity: i32,
    format: i32,
) -> PyResult<i32> {
    let budget = state::current().staging_budget;
    let handle = handle.get()?;
    let mut src = Region::new(view_for(src, budget)?, src_offset, src_length);
    let mut dst = Region::new(view_for(dst, budget)?, dst_offset, dst_capacity);
    let format = Format::from_tag(format);
    let result = bridge::compress_with(&GilReleased(py), handle, &mut src, &mut dst, format);
    encode_compress(result).map_err(into_py_err)
}

/// Returns `consumed << 32 | produced`, with bit 31 set when `dst` was too small.
/// Malformed input raises `DataFormatError`.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
pub fn decompress(
    py: Python<'_>,
    mut handle: PyRefMut<'_, PyDecompressorHandle>,
    src: &Bound<'_, PyAny>,
    src_offset: i32,
    src_length: i32,
    dst: &Bound<'_, PyAny>,
    dst_offset: i32,
    dst_capacity: i32,
    format: i32,
) -> PyResult<i64> {
    let budget = state::current().staging_budget;
    let handle = handle.get()?;
    let mut src = Region::new(view_for(src, budget)?, src_offset, src_length);
    let mut dst = Region::new(view_for(dst, budget)?, dst_offset, dst_capacity);
    let format = Format::from_tag(format);
    let result = bridge::decompress_with(&GilReleased(py), handle, &mut src, &mut dst, format);
    encode_decompress(result).map_err(into_py_err)
}

/// libdeflate's exact worst-case compressed size for this context.
#[pyfunction]
pub fn compress_bound(
    mut handle: PyRefMut<'_, PyCompressorHandle>,
    length: usize,
    format: i32,
) -> PyResult<usize> {
    Ok(handle.get()?.compress_bound(Format::from_tag(format), length))
}

/// Context-free destination size estimate.
#[pyfunction]
pub fn buffer_size_hint(length: usize, format: i32) -> usize {
    sizing::buffer_size_hint(length, Format::from_tag(format))
}
