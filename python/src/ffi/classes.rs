//! ffi/classes.rs
//! High-level Python classes over the call surfaces.
//!
//! `Compressor` and `Decompressor` borrow their libdeflate context from the
//! module-wide pool and hand it back on `close()` or context-manager exit.
//! An object collected while still open leaks its context and logs a warning.
//! Errors are raised as exceptions; the `-1` sentinel of the low-level
//! `compress` is not used here. Native work runs with the GIL released.

use deflate_bridge_core::bridge;
use deflate_bridge_core::buffer::Region;
use deflate_bridge_core::checksum;
use deflate_bridge_core::format::Format;
use deflate_bridge_core::handle::{CompressorHandle, DecompressorHandle, HandleSlot};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use super::buffers::{view_for, GilReleased, PyView};
use super::errors::into_py_err;
use super::state;

fn resolve_format(format: Option<&str>) -> PyResult<Format> {
    match format {
        Some(name) => Format::from_name(name).map_err(into_py_err),
        None => Ok(state::current().default_format),
    }
}

fn region_for<'py>(
    obj: &Bound<'py, PyAny>,
    offset: i32,
    length: Option<i32>,
) -> PyResult<Region<PyView<'py>>> {
    let view = view_for(obj, state::current().staging_budget)?;
    Ok(Region::with_tail(view, offset, length))
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

#[pyclass(name = "Compressor", module = "deflate_bridge")]
pub struct PyCompressor {
    handle: HandleSlot<CompressorHandle>,
    level: i32,
    format: Format,
}

impl PyCompressor {
    fn handle(&mut self) -> PyResult<&mut CompressorHandle> {
        self.handle.get_mut().map_err(into_py_err)
    }
}

#[pymethods]
impl PyCompressor {
    #[new]
    #[pyo3(signature = (level = None, format = None))]
    fn new(level: Option<i32>, format: Option<&str>) -> PyResult<Self> {
        let level = level.unwrap_or_else(|| state::current().default_level);
        let format = resolve_format(format)?;
        let handle = state::pool().checkout_compressor(level).map_err(into_py_err)?;
        Ok(Self { handle: HandleSlot::new(handle), level, format })
    }

    /// Compresses `src[src_offset:src_offset+src_length]` into `dst` at
    /// `dst_offset`. Returns bytes written, 0 if `dst` was too small.
    #[pyo3(signature = (src, dst, src_offset = 0, src_length = None, dst_offset = 0, dst_length = None))]
    fn compress(
        &mut self,
        py: Python<'_>,
        src: &Bound<'_, PyAny>,
        dst: &Bound<'_, PyAny>,
        src_offset: i32,
        src_length: Option<i32>,
        dst_offset: i32,
        dst_length: Option<i32>,
    ) -> PyResult<usize> {
        let format = self.format;
        let handle = self.handle()?;
        let mut src = region_for(src, src_offset, src_length)?;
        let mut dst = region_for(dst, dst_offset, dst_length)?;
        bridge::compress_with(&GilReleased(py), handle, &mut src, &mut dst, format)
            .map_err(into_py_err)
    }

    /// Compresses `data` into a new `bytes` object.
    fn compress_bytes<'py>(
        &mut self,
        py: Python<'py>,
        data: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyBytes>> {
        let format = self.format;
        let handle = self.handle()?;
        let mut src = region_for(data, 0, None)?;
        let out = bridge::compress_to_vec_with(&GilReleased(py), handle, &mut src, format)
            .map_err(into_py_err)?;
        Ok(PyBytes::new_bound(py, &out))
    }

    /// Worst-case output size for `length` input bytes.
    fn compress_bound(&mut self, length: usize) -> PyResult<usize> {
        let format = self.format;
        Ok(self.handle()?.compress_bound(format, length))
    }

    /// Returns the context to the pool. Closing twice is a no-op.
    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            state::pool().checkin_compressor(handle);
        }
    }

    #[getter]
    fn level(&self) -> i32 {
        self.level
    }

    #[getter]
    fn format(&self) -> &'static str {
        self.format.name()
    }

    #[getter]
    fn closed(&self) -> bool {
        !self.handle.is_live()
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type = None, _exc_value = None, _traceback = None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_value: Option<&Bound<'_, PyAny>>,
        _traceback: Option<&Bound<'_, PyAny>>,
    ) -> bool {
        self.close();
        false
    }

    fn __repr__(&self) -> String {
        let state = if self.handle.is_live() { "open" } else { "closed" };
        format!("<Compressor level={} format={} {state}>", self.level, self.format)
    }
}

// ---------------------------------------------------------------------------
// Decompressor
// ---------------------------------------------------------------------------

#[pyclass(name = "Decompressor", module = "deflate_bridge")]
pub struct PyDecompressor {
    handle: HandleSlot<DecompressorHandle>,
    format: Format,
}

impl PyDecompressor {
    fn handle(&mut self) -> PyResult<&mut DecompressorHandle> {
        self.handle.get_mut().map_err(into_py_err)
    }
}

#[pymethods]
impl PyDecompressor {
    #[new]
    #[pyo3(signature = (format = None))]
    fn new(format: Option<&str>) -> PyResult<Self> {
        let format = resolve_format(format)?;
        let handle = state::pool().checkout_decompressor().map_err(into_py_err)?;
        Ok(Self { handle: HandleSlot::new(handle), format })
    }

    /// Decompresses into `dst`. Returns `(consumed, produced, insufficient_space)`.
    #[pyo3(signature = (src, dst, src_offset = 0, src_length = None, dst_offset = 0, dst_length = None))]
    fn decompress(
        &mut self,
        py: Python<'_>,
        src: &Bound<'_, PyAny>,
        dst: &Bound<'_, PyAny>,
        src_offset: i32,
        src_length: Option<i32>,
        dst_offset: i32,
        dst_length: Option<i32>,
    ) -> PyResult<(u32, u32, bool)> {
        let format = self.format;
        let handle = self.handle()?;
        let mut src = region_for(src, src_offset, src_length)?;
        let mut dst = region_for(dst, dst_offset, dst_length)?;
        let outcome =
            bridge::decompress_with(&GilReleased(py), handle, &mut src, &mut dst, format)
                .map_err(into_py_err)?;
        Ok((outcome.consumed, outcome.produced, outcome.insufficient_space))
    }

    /// Decompresses `data` into a new `bytes` object, growing the output as needed.
    #[pyo3(signature = (data, size_hint = None))]
    fn decompress_bytes<'py>(
        &mut self,
        py: Python<'py>,
        data: &Bound<'py, PyAny>,
        size_hint: Option<usize>,
    ) -> PyResult<Bound<'py, PyBytes>> {
        let format = self.format;
        let config = state::current();
        let handle = self.handle()?;
        let mut src = region_for(data, 0, None)?;
        let runner = GilReleased(py);
        let out = bridge::decompress_to_vec_with(&runner, handle, &mut src, format, size_hint, &config)
            .map_err(into_py_err)?;
        Ok(PyBytes::new_bound(py, &out))
    }

    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            state::pool().checkin_decompressor(handle);
        }
    }

    #[getter]
    fn format(&self) -> &'static str {
        self.format.name()
    }

    #[getter]
    fn closed(&self) -> bool {
        !self.handle.is_live()
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type = None, _exc_value = None, _traceback = None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_value: Option<&Bound<'_, PyAny>>,
        _traceback: Option<&Bound<'_, PyAny>>,
    ) -> bool {
        self.close();
        false
    }
}

// ---------------------------------------------------------------------------
// Running checksums
// ---------------------------------------------------------------------------

macro_rules! py_checksum {
    ($py_name:literal, $ty:ident, $inner:ty, $update:path) => {
        #[pyclass(name = $py_name, module = "deflate_bridge")]
        pub struct $ty {
            inner: $inner,
        }

        #[pymethods]
        impl $ty {
            #[new]
            #[pyo3(signature = (seed = None))]
            fn new(seed: Option<u32>) -> Self {
                let inner = seed.map_or_else(<$inner>::new, <$inner>::with_seed);
                Self { inner }
            }

            /// Folds `buf[offset:offset+length]` into the running value and returns it.
            #[pyo3(signature = (buf, offset = 0, length = None))]
            fn update(
                &mut self,
                py: Python<'_>,
                buf: &Bound<'_, PyAny>,
                offset: i32,
                length: Option<i32>,
            ) -> PyResult<u32> {
                let mut region = region_for(buf, offset, length)?;
                let value = $update(&GilReleased(py), self.inner.value(), &mut region)
                    .map_err(into_py_err)?;
                self.inner = <$inner>::with_seed(value);
                Ok(value)
            }

            #[getter]
            fn value(&self) -> u32 {
                self.inner.value()
            }

            fn reset(&mut self) {
                self.inner.reset();
            }

            fn __repr__(&self) -> String {
                format!("<{} {:#010x}>", $py_name, self.inner.value())
            }
        }
    };
}

py_checksum!("Crc32", PyCrc32, checksum::Crc32, bridge::crc32_with);
py_checksum!("Adler32", PyAdler32, checksum::Adler32, bridge::adler32_with);
